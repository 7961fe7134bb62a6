use std::process::ExitCode;

use dirswap::output as out;

mod app;
mod logging;

fn main() -> ExitCode {
    let args = dirswap::cli::parse();
    match app::run(args) {
        Ok(code) => code,
        Err(e) => {
            out::print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
