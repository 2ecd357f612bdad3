// src/state/codec.rs

//! Versioned binary encoding of the cache file.
//!
//! Layout (v1): a leading `u32` format version, then the snapshot, key and
//! result as one `bincode`-encoded triple. `bincode` writes fixed-width
//! little-endian integers, length-prefixed UTF-8 strings and `u32` variant
//! tags, and the single-path map is a `BTreeMap`, so equal states encode to
//! equal bytes. Glob segments encode as their pattern source text and are
//! recompiled on decode.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{MonitorError, Result};

use super::MonitorStateFileSet;

/// Cache format version. Bump on any schema or hash-algorithm change.
pub const CACHE_VERSION: u32 = 1;

/// Encode a snapshot with its key and result into cache-file bytes.
pub fn encode<K, V>(state: &MonitorStateFileSet, key: &K, result: &V) -> Result<Vec<u8>>
where
    K: Serialize,
    V: Serialize,
{
    let mut buf = Vec::new();
    bincode::serialize_into(&mut buf, &CACHE_VERSION)?;
    bincode::serialize_into(&mut buf, &(state, key, result))?;
    Ok(buf)
}

/// Decode cache-file bytes back into `(snapshot, key, result)`.
///
/// Any decode failure comes back as [`MonitorError::InvalidCache`], which
/// `check_monitor` treats as "everything changed".
pub fn decode<K, V>(bytes: &[u8]) -> Result<(MonitorStateFileSet, K, V)>
where
    K: DeserializeOwned,
    V: DeserializeOwned,
{
    let mut reader = bytes;
    let version: u32 = bincode::deserialize_from(&mut reader)
        .map_err(|e| MonitorError::InvalidCache(format!("unreadable version tag: {e}")))?;
    if version != CACHE_VERSION {
        return Err(MonitorError::InvalidCache(format!(
            "unsupported cache version {version} (expected {CACHE_VERSION})"
        )));
    }
    bincode::deserialize_from(&mut reader)
        .map_err(|e| MonitorError::InvalidCache(format!("malformed cache body: {e}")))
}
