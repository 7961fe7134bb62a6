//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the Ctrl-C handler,
//! hands the requested operation to a background worker, and renders the
//! outcome it sends back.

use anyhow::{Context, Result, anyhow};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use dirswap::cli::{Args, Command};
use dirswap::output::{self as out, format_size};
use dirswap::worker::{self, Operation, Outcome};
use dirswap::{
    CONFIG_ENV, Classification, DirswapError, ForwardReport, LoadResult, Relocator, ReverseReport,
    default_config_path, load_or_init, shutdown,
};

use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<ExitCode> {
    if args.print_config {
        print_config_location();
        return Ok(ExitCode::SUCCESS);
    }

    let mut cfg = match load_or_init()? {
        LoadResult::Loaded(cfg, path) => {
            debug!(path = %path.display(), "loaded config");
            cfg
        }
        LoadResult::CreatedTemplate(path) => {
            out::print_success(&format!(
                "A template dirswap config was written to: {}",
                path.display()
            ));
            out::print_info(
                "Edit it to set `root_a`, `root_b`, `size_threshold_bytes` and `excluded_folder`, then re-run.",
            );
            out::print_info(&format!(
                "To use a different location set {CONFIG_ENV}."
            ));
            return Ok(ExitCode::SUCCESS);
        }
    };
    args.apply_overrides(&mut cfg);
    cfg.validate().context("invalid configuration")?;

    let guard = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).inspect_err(
        |e| out::print_error(&format!("Failed to initialize logging: {e}")),
    )?;

    // Dropped on Ctrl-C so the file layer is flushed even if the worker is mid-entry.
    let guard_slot = Arc::new(Mutex::new(guard));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; stopping after the current entry...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
        })
        .expect("failed to install signal handler");
    }

    debug!(?args, "starting dirswap");
    let relocator = Relocator::new(cfg);
    let command = args.command.unwrap_or(Command::Status);

    let code = match command {
        Command::Status => {
            let c = measure(&relocator)?;
            render_status(&c);
            ExitCode::SUCCESS
        }
        Command::Forward => match run_op(&relocator, Operation::Forward)? {
            Outcome::Forwarded(res) => {
                let moved = res.is_ok();
                let code = render_forward(res);
                if moved {
                    // Sizes changed; show the new classification.
                    render_status(&measure(&relocator)?);
                }
                code
            }
            other => return Err(anyhow!("unexpected worker outcome: {other:?}")),
        },
        Command::Back => match run_op(&relocator, Operation::Backward)? {
            Outcome::Reversed(res) => render_backward(res),
            other => return Err(anyhow!("unexpected worker outcome: {other:?}")),
        },
    };

    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }
    Ok(code)
}

fn print_config_location() {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV) {
        out::print_info(&format!(
            "Using {CONFIG_ENV} (explicit):\n  {}\n",
            explicit.to_string_lossy()
        ));
        out::print_info(&format!(
            "To override, unset {CONFIG_ENV} or set it to another file."
        ));
        return;
    }
    match default_config_path() {
        Ok(p) => {
            out::print_info(&format!("Default dirswap config path:\n  {}\n", p.display()));
            if p.exists() {
                out::print_info("A config file already exists at that location.");
            } else {
                out::print_info(
                    "No config file exists there yet. Run without --print-config to create a template.",
                );
            }
        }
        Err(e) => out::print_error(&format!("Could not determine a default config path: {e}")),
    }
}

fn run_op(relocator: &Relocator, op: Operation) -> Result<Outcome> {
    let task = worker::spawn(relocator.clone(), op).context("spawn worker thread")?;
    task.wait()
        .map_err(|_| anyhow!("worker thread exited without a result"))
}

fn measure(relocator: &Relocator) -> Result<Classification> {
    match run_op(relocator, Operation::Measure)? {
        Outcome::Measured(c) => Ok(c),
        other => Err(anyhow!("unexpected worker outcome: {other:?}")),
    }
}

fn render_status(c: &Classification) {
    out::print_user(&format!(
        "root A: {} ({})",
        format_size(c.size_a),
        c.root_a.display()
    ));
    out::print_user(&format!(
        "root B: {} ({})",
        format_size(c.size_b),
        c.root_b.display()
    ));
    out::print_info(&format!(
        "Active: {} (threshold {})",
        c.active,
        format_size(c.threshold)
    ));
    if c.inconsistent {
        out::print_warn("Both roots exceed the size threshold; the install may not have been migrated cleanly.");
    }
}

fn exit_for(e: &DirswapError) -> ExitCode {
    ExitCode::from(u8::try_from(e.code()).unwrap_or(1))
}

fn render_forward(res: Result<ForwardReport, DirswapError>) -> ExitCode {
    match res {
        Ok(r) => {
            info!(
                code = 0,
                moved = r.moved,
                failed = r.failed,
                already_present = r.already_present,
                "forward relocation completed"
            );
            out::print_success(&format!(
                "Moved {} entr{} from {} to {}",
                r.moved,
                if r.moved == 1 { "y" } else { "ies" },
                r.classification.active_path().display(),
                r.classification.inactive_path().display()
            ));
            if r.already_present > 0 {
                out::print_info(&format!(
                    "{} file(s) already present in the target were left in place",
                    r.already_present
                ));
            }
            if r.failed > 0 {
                out::print_warn(&format!(
                    "{} entr{} could not be fully moved; see the log",
                    r.failed,
                    if r.failed == 1 { "y" } else { "ies" }
                ));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(code = e.code(), error = %e, "forward relocation failed");
            match &e {
                DirswapError::Interrupted => out::print_warn(
                    "Interrupted; entries moved so far are recorded and can be undone with `back`.",
                ),
                _ => out::print_error(&format!("Move failed: {e}")),
            }
            exit_for(&e)
        }
    }
}

fn render_backward(res: Result<ReverseReport, DirswapError>) -> ExitCode {
    match res {
        Ok(r) => {
            info!(
                code = 0,
                restored = r.restored,
                unrecovered = r.unrecovered.len(),
                missing = r.missing,
                "reverse relocation completed"
            );
            out::print_success(&format!("Restored {} entr{}", r.restored, if r.restored == 1 { "y" } else { "ies" }));
            if r.missing > 0 {
                out::print_info(&format!(
                    "{} recorded entr{} no longer existed and were skipped",
                    r.missing,
                    if r.missing == 1 { "y" } else { "ies" }
                ));
            }
            if !r.unrecovered.is_empty() {
                out::print_warn(&format!(
                    "{} entr{} remain in the journal and can be retried with `back`:",
                    r.unrecovered.len(),
                    if r.unrecovered.len() == 1 { "y" } else { "ies" }
                ));
                for rec in &r.unrecovered {
                    out::print_user(&format!("  {}", rec.relocated().display()));
                }
            }
            if r.interrupted {
                exit_for(&DirswapError::Interrupted)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!(code = e.code(), error = %e, "reverse relocation failed");
            match &e {
                DirswapError::MissingJournal(_) => out::print_info("Nothing to undo: no move journal found."),
                DirswapError::CorruptJournal { .. } | DirswapError::UnsupportedJournalVersion { .. } => {
                    out::print_error(&format!("{e}. The journal was left untouched."))
                }
                _ => out::print_error(&format!("Undo failed: {e}")),
            }
            exit_for(&e)
        }
    }
}
