// src/fs.rs

//! Blocking filesystem primitives used by the snapshot builder and the
//! probers.
//!
//! Everything here distinguishes exactly one error condition: "does not
//! exist", which is recovered into a `None`/empty value. Any other I/O
//! failure (permissions, read errors mid-hash) propagates to the caller.

use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// 64-bit content hash: the leading eight bytes of the BLAKE3 digest,
/// little-endian. Stable across runs and platforms.
pub type FileHash = u64;

/// File modification time, compared for equality only.
///
/// Stored as signed whole seconds plus a nanosecond offset relative to the
/// Unix epoch, so the encoded form is identical on every platform whatever
/// the OS resolution is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModTime {
    secs: i64,
    nanos: u32,
}

impl ModTime {
    /// Sentinel for a directory that did not exist when the snapshot was
    /// taken. Real timestamps always carry `nanos < 1_000_000_000`, so no
    /// collision is possible.
    pub const MISSING: ModTime = ModTime {
        secs: i64::MIN,
        nanos: u32::MAX,
    };

    pub fn is_missing(self) -> bool {
        self == Self::MISSING
    }
}

impl From<SystemTime> for ModTime {
    fn from(t: SystemTime) -> Self {
        match t.duration_since(UNIX_EPOCH) {
            Ok(d) => ModTime {
                secs: d.as_secs() as i64,
                nanos: d.subsec_nanos(),
            },
            // Pre-epoch timestamp: count seconds backwards, keeping the
            // nanosecond offset non-negative.
            Err(e) => {
                let d = e.duration();
                if d.subsec_nanos() == 0 {
                    ModTime {
                        secs: -(d.as_secs() as i64),
                        nanos: 0,
                    }
                } else {
                    ModTime {
                        secs: -(d.as_secs() as i64) - 1,
                        nanos: 1_000_000_000 - d.subsec_nanos(),
                    }
                }
            }
        }
    }
}

/// Map a "not found" error to `None`, propagating anything else.
pub fn if_found<T>(res: std::io::Result<T>) -> std::io::Result<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Modification time of `path`, or `None` if it does not exist.
pub fn mtime(path: &Path) -> Result<Option<ModTime>> {
    match if_found(fs::metadata(path))? {
        Some(meta) => Ok(Some(ModTime::from(meta.modified()?))),
        None => Ok(None),
    }
}

pub fn exists_file(path: &Path) -> bool {
    path.is_file()
}

pub fn exists_dir(path: &Path) -> bool {
    path.is_dir()
}

/// Entry names of a directory, unsorted, without `.`/`..`.
///
/// A directory that does not exist lists as empty. Names that are not valid
/// UTF-8 are skipped; glob segments cannot match them anyway.
pub fn list_dir(path: &Path) -> Result<Vec<String>> {
    let Some(rd) = if_found(fs::read_dir(path))? else {
        return Ok(Vec::new());
    };
    let mut names = Vec::new();
    for entry in rd {
        let entry = entry?;
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    Ok(names)
}

/// Streaming content hash of `path`, or `None` if it does not exist.
///
/// The file is read through a fixed-size buffer so large inputs never sit
/// in memory whole.
pub fn hash_file(path: &Path) -> Result<Option<FileHash>> {
    let Some(mut file) = if_found(File::open(path))? else {
        return Ok(None);
    };
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    let digest = hasher.finalize();
    let mut lead = [0u8; 8];
    lead.copy_from_slice(&digest.as_bytes()[..8]);
    Ok(Some(u64::from_le_bytes(lead)))
}
