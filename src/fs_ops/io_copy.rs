//! Streaming copy with a caller-chosen, bounded transfer buffer.
//!
//! - Writes to a newly created destination file (O_EXCL semantics; never clobbers).
//! - Holds at most one buffer of `buf_size` bytes in memory regardless of file size.
//! - Flushes and fsyncs the destination before returning so a later source
//!   delete never races the data reaching stable storage.
//!
//! Snapshot semantics: the source file is read once from start to EOF; if it grows
//! concurrently, the additional bytes are not included.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

/// Result of a streaming copy operation.
#[derive(Debug, Clone, Copy)]
pub struct CopyResult {
    /// Total bytes copied from source to destination.
    pub bytes: u64,
    /// Number of read/write rounds (for perf metrics).
    pub chunks: u64,
}

/// Copy `src` -> `dst` in chunks of at most `buf_size` bytes, then fsync `dst`.
pub(crate) fn copy_streaming(src: &Path, dst: &Path, buf_size: usize) -> io::Result<CopyResult> {
    let mut reader = File::open(src)?;
    let mut writer = OpenOptions::new().write(true).create_new(true).open(dst)?;

    let mut buf = vec![0u8; buf_size.max(1)];
    let mut bytes = 0u64;
    let mut chunks = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        bytes += n as u64;
        chunks += 1;
    }
    writer.flush()?;
    writer.sync_all()?;

    Ok(CopyResult { bytes, chunks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn copy_small_file_ok() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dst = dir.path().join("dst.txt");
        fs::write(&src, b"hello world").unwrap();

        let res = copy_streaming(&src, &dst, 4096).unwrap();
        assert_eq!(res.bytes, 11);
        assert_eq!(res.chunks, 1);
        assert_eq!(fs::read(&dst).unwrap(), b"hello world");
    }

    #[test]
    fn copy_zero_length_ok() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("empty");
        let dst = dir.path().join("out");
        File::create(&src).unwrap();

        let res = copy_streaming(&src, &dst, 4096).unwrap();
        assert_eq!(res.bytes, 0);
        assert_eq!(res.chunks, 0);
        assert_eq!(fs::metadata(&dst).unwrap().len(), 0);
    }

    #[test]
    fn fails_if_dest_exists() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::write(&src, b"data").unwrap();
        fs::write(&dst, b"x").unwrap();

        let err = copy_streaming(&src, &dst, 4096).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&dst).unwrap(), b"x");
    }

    #[test]
    fn chunking_respects_buffer_size() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("big.bin");
        let dst = dir.path().join("big.out");

        const BUF: usize = 4096;
        let size = 3 * BUF + 123;
        let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        fs::write(&src, &data).unwrap();

        let res = copy_streaming(&src, &dst, BUF).unwrap();
        assert_eq!(res.bytes as usize, size);
        // A regular file read never returns more than the buffer holds.
        assert!(res.chunks >= 4);
        assert_eq!(fs::read(&dst).unwrap(), data);
    }
}
