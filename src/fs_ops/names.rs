//! Destination names for content-differing collisions.
//!
//! Policy: a file whose name is taken by different content is stored as
//! `<fingerprint>__<original name>`. If that would exceed the filename limit,
//! the original stem is shortened and its extension kept.

use std::ffi::{OsStr, OsString};
use std::path::Path;

use super::fingerprint::ContentFingerprint;

/// Separator between fingerprint and original name.
pub const COLLISION_SEPARATOR: &str = "__";

// Conservative filename limits (bytes/characters, platform-specific and approximate).
#[cfg(windows)]
const MAX_FILENAME_LEN: usize = 240; // leave headroom for legacy MAX_PATH
#[cfg(not(windows))]
const MAX_FILENAME_LEN: usize = 255; // typical POSIX/EXT limits

#[cfg(unix)]
fn name_len_units(s: &OsStr) -> usize {
    use std::os::unix::ffi::OsStrExt;
    s.as_bytes().len()
}

#[cfg(not(unix))]
fn name_len_units(s: &OsStr) -> usize {
    s.to_string_lossy().len()
}

/// Name used for a file whose original name collides with different content.
pub fn collision_name(fingerprint: &ContentFingerprint, name: &OsStr) -> OsString {
    let mut prefix = fingerprint.to_hex();
    prefix.push_str(COLLISION_SEPARATOR);

    let mut out = OsString::from(&prefix);
    let budget = MAX_FILENAME_LEN.saturating_sub(prefix.len());
    if name_len_units(name) <= budget {
        out.push(name);
        return out;
    }

    let base = Path::new(name);
    let stem = base.file_stem().unwrap_or(name);
    let ext = base.extension();
    out.push(shorten(stem, ext, budget));
    out
}

/// Truncate `stem` so that `stem + ["." + ext]` fits within `budget`.
fn shorten(stem: &OsStr, ext: Option<&OsStr>, budget: usize) -> OsString {
    let mut ext_part = OsString::new();
    if let Some(e) = ext {
        ext_part.push(".");
        ext_part.push(e);
    }
    let stem_budget = budget.saturating_sub(name_len_units(&ext_part));

    let mut stem_os = if stem_budget == 0 {
        OsString::from("f")
    } else if let Some(stem_str) = stem.to_str() {
        // UTF-8-aware truncation on char boundaries.
        let mut acc = String::new();
        for ch in stem_str.chars() {
            if acc.len() + ch.len_utf8() > stem_budget {
                break;
            }
            acc.push(ch);
        }
        if acc.is_empty() {
            acc.push('f');
        }
        OsString::from(acc)
    } else {
        truncate_raw(stem, stem_budget)
    };

    // An extension longer than the whole budget cannot be kept.
    if name_len_units(&stem_os) + name_len_units(&ext_part) > budget {
        return truncate_raw(&stem_os, budget);
    }
    stem_os.push(&ext_part);
    stem_os
}

#[cfg(unix)]
fn truncate_raw(s: &OsStr, budget: usize) -> OsString {
    use std::os::unix::ffi::{OsStrExt, OsStringExt};
    let bytes = s.as_bytes();
    OsString::from_vec(bytes[..bytes.len().min(budget.max(1))].to_vec())
}

#[cfg(not(unix))]
fn truncate_raw(s: &OsStr, budget: usize) -> OsString {
    let lossy = s.to_string_lossy();
    let mut acc = String::new();
    for ch in lossy.chars() {
        if acc.len() + ch.len_utf8() > budget.max(1) {
            break;
        }
        acc.push(ch);
    }
    OsString::from(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_is_prefixed_verbatim() {
        let fp = ContentFingerprint::of_bytes(b"x");
        let n = collision_name(&fp, OsStr::new("a.txt"));
        assert_eq!(n, OsString::from(format!("{}__a.txt", fp.to_hex())));
    }

    #[test]
    fn long_name_is_shortened_keeping_extension() {
        let fp = ContentFingerprint::of_bytes(b"x");
        let long = format!("{}.jpeg", "n".repeat(400));
        let n = collision_name(&fp, OsStr::new(&long));
        let s = n.to_str().unwrap();
        assert!(s.len() <= MAX_FILENAME_LEN);
        assert!(s.starts_with(&fp.to_hex()));
        assert!(s.ends_with("nnn.jpeg"));
    }

    #[test]
    fn multibyte_stem_cut_on_char_boundary() {
        let fp = ContentFingerprint::of_bytes(b"y");
        let long = format!("{}.txt", "é".repeat(200));
        let n = collision_name(&fp, OsStr::new(&long));
        let s = n.to_str().expect("still valid utf-8");
        assert!(s.len() <= MAX_FILENAME_LEN);
        assert!(s.ends_with(".txt"));
    }
}
