//! Streaming copy into a freshly created file.
//!
//! Features:
//! - Writes to a newly created destination file (O_EXCL semantics; never clobbers).
//! - Linux: in-kernel `copy_file_range` when the filesystem supports it.
//! - Otherwise buffered I/O with large (1 MiB) buffers to reduce syscall count.
//!
//! Snapshot semantics: the source file is read once from start to EOF; if it grows
//! concurrently, the additional bytes are not included.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

const BUF_SIZE: usize = 1024 * 1024; // 1 MiB buffers

/// Copy `src` -> `dst`, returning the number of bytes written.
/// `dst` is created with `create_new(true)` so an existing file is never touched.
pub(super) fn copy_streaming(src: &Path, dst: &Path) -> io::Result<u64> {
    let src_f = File::open(src)?;
    let dst_f = OpenOptions::new().write(true).create_new(true).open(dst)?;

    #[cfg(target_os = "linux")]
    let (src_f, dst_f) = match copy_in_kernel(&src_f, &dst_f)? {
        Some(bytes) => return Ok(bytes),
        None => (src_f, dst_f),
    };

    let mut reader = BufReader::with_capacity(BUF_SIZE, src_f);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, dst_f);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    Ok(bytes)
}

/// Returns Ok(None) when the kernel path is unsupported and nothing was copied yet.
#[cfg(target_os = "linux")]
fn copy_in_kernel(src_f: &File, dst_f: &File) -> io::Result<Option<u64>> {
    use std::os::unix::io::AsRawFd;

    let chunk: usize = 16 * 1024 * 1024; // 16 MiB per call
    let mut total: u64 = 0;
    loop {
        let rc = unsafe {
            libc::copy_file_range(
                src_f.as_raw_fd(),
                std::ptr::null_mut(),
                dst_f.as_raw_fd(),
                std::ptr::null_mut(),
                chunk,
                0,
            )
        };
        if rc > 0 {
            total += rc as u64;
            continue;
        }
        if rc == 0 {
            return Ok(Some(total));
        }
        let err = io::Error::last_os_error();
        let unsupported = matches!(
            err.raw_os_error(),
            Some(code) if code == libc::EXDEV
                || code == libc::ENOSYS
                || code == libc::EINVAL
                || code == libc::EPERM
                || code == libc::EOPNOTSUPP
        );
        if total == 0 && unsupported {
            return Ok(None);
        }
        // Partial copy then error: caller removes the temp file.
        return Err(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn copy_small_file_ok() {
        let dir = tempdir().unwrap();
        let src_path = dir.path().join("src.txt");
        let dst_path = dir.path().join("dst.txt");

        let data = b"hello world";
        fs::write(&src_path, data).unwrap();

        let n = copy_streaming(&src_path, &dst_path).unwrap();
        assert_eq!(n, data.len() as u64);
        assert_eq!(fs::read(&dst_path).unwrap(), data);
    }

    #[test]
    fn copy_zero_length_ok() {
        let dir = tempdir().unwrap();
        let src_path = dir.path().join("empty");
        let dst_path = dir.path().join("out");
        File::create(&src_path).unwrap();

        let n = copy_streaming(&src_path, &dst_path).unwrap();
        assert_eq!(n, 0);
        assert_eq!(fs::metadata(&dst_path).unwrap().len(), 0);
    }

    #[test]
    fn fails_if_dest_exists() {
        let dir = tempdir().unwrap();
        let src_path = dir.path().join("src");
        let dst_path = dir.path().join("dst");
        fs::write(&src_path, b"data").unwrap();
        fs::write(&dst_path, b"x").unwrap();

        let err = copy_streaming(&src_path, &dst_path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&dst_path).unwrap(), b"x");
    }

    #[test]
    fn large_file_copy_boundary() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("big.bin");
        let dst = dir.path().join("big.out");

        let size = 2 * BUF_SIZE + 123;
        let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        fs::write(&src, &data).unwrap();

        let n = copy_streaming(&src, &dst).unwrap();
        assert_eq!(n as usize, size);
        assert_eq!(fs::read(&dst).unwrap(), data);
    }
}
