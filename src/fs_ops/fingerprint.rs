//! Content fingerprints.
//! A BLAKE3 digest over the full byte contents of a file, read in one streaming pass.
//! Equal fingerprints are treated as identical content.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

const READ_BUF: usize = 256 * 1024;

/// Fixed-length digest of a file's contents.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentFingerprint(blake3::Hash);

impl ContentFingerprint {
    /// Fingerprint an in-memory buffer.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes))
    }

    /// Lowercase hex rendering (64 chars); used in renamed file names and in the index.
    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.to_hex().as_str())
    }
}

impl fmt::Debug for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentFingerprint({})", &self.to_hex()[..16])
    }
}

/// Hash the whole file at `path`.
pub fn fingerprint_file(path: &Path) -> io::Result<ContentFingerprint> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(READ_BUF, file);
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(ContentFingerprint(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn same_bytes_same_fingerprint() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");
        fs::write(&a, b"payload").unwrap();
        fs::write(&b, b"payload").unwrap();
        assert_eq!(fingerprint_file(&a).unwrap(), fingerprint_file(&b).unwrap());
        assert_eq!(
            fingerprint_file(&a).unwrap(),
            ContentFingerprint::of_bytes(b"payload")
        );
    }

    #[test]
    fn different_bytes_differ() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");
        fs::write(&a, b"one").unwrap();
        fs::write(&b, b"two").unwrap();
        assert_ne!(fingerprint_file(&a).unwrap(), fingerprint_file(&b).unwrap());
    }

    #[test]
    fn hex_is_64_lowercase_chars() {
        let fp = ContentFingerprint::of_bytes(b"");
        let hex = fp.to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(format!("{fp}"), hex);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = fingerprint_file(&dir.path().join("nope")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
