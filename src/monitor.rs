// src/monitor.rs

//! Cache-file lifecycle.
//!
//! [`update_monitor`] takes a fresh snapshot of a dependency list and
//! writes it, together with an opaque key and result, to the cache file.
//! [`check_monitor`] reads that tuple back and probes it against the live
//! filesystem: any change, missing cache, stale schema or key mismatch
//! comes back as [`Check::Changed`]; otherwise the stored result is
//! returned together with the dependency list reconstructed from the
//! snapshot.
//!
//! The cache file is always written whole, to a sibling temp file renamed
//! over the target, so a reader never observes a half-written state. A
//! torn read decodes as garbage and reports `Changed`.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::errors::{MonitorError, Result};
use crate::fs;
use crate::glob::GlobPath;
use crate::probe::{probe_state, Probe, ProbeCx};
use crate::state::build::join_rel;
use crate::state::{build_state, codec, Dependency, MonitorStateFileSet};

/// Outcome of [`check_monitor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check<V> {
    /// Something the result depended on changed, or the cache itself is
    /// missing, stale or unreadable.
    Changed,
    /// Nothing changed. Carries the stored result and the dependency list
    /// reconstructed from the snapshot.
    Unchanged { result: V, deps: Vec<Dependency> },
}

/// Snapshot `deps` under `root` and persist `(snapshot, key, result)` to
/// `cache_path`, overwriting whatever was there.
///
/// A declared file that is already missing does not fail the update; it is
/// recorded as missing and every later check reports `Changed` until the
/// next update.
pub fn update_monitor<K, V>(
    cache_path: &Path,
    root: &Path,
    deps: &[Dependency],
    key: &K,
    result: &V,
) -> Result<()>
where
    K: Serialize,
    V: Serialize,
{
    let state = build_state(root, deps)?;
    let bytes = codec::encode(&state, key, result)?;
    write_atomic(cache_path, &bytes)?;
    debug!(cache = %cache_path.display(), deps = deps.len(), "monitor state written");
    Ok(())
}

/// Probe the snapshot stored at `cache_path` against the live filesystem
/// under `root`.
///
/// When directory metadata was refreshed without any material change (an
/// empty directory appeared inside a glob), the cache file is rewritten in
/// place so the next check skips the rescan. Only "does not exist"
/// conditions are absorbed into `Changed`; any other I/O error propagates.
pub fn check_monitor<K, V>(cache_path: &Path, root: &Path, key: &K) -> Result<Check<V>>
where
    K: Serialize + DeserializeOwned + PartialEq,
    V: Serialize + DeserializeOwned,
{
    let Some(bytes) = fs::if_found(std::fs::read(cache_path))? else {
        debug!(cache = %cache_path.display(), "no cache file");
        return Ok(Check::Changed);
    };
    let (state, cached_key, cached_result): (MonitorStateFileSet, K, V) =
        match codec::decode(&bytes) {
            Ok(decoded) => decoded,
            Err(MonitorError::InvalidCache(reason)) => {
                debug!(cache = %cache_path.display(), reason = %reason, "cache file unusable");
                return Ok(Check::Changed);
            }
            Err(e) => return Err(e),
        };
    if cached_key != *key {
        debug!(cache = %cache_path.display(), "cache key mismatch");
        return Ok(Check::Changed);
    }

    let mut cx = ProbeCx::new(root);
    let new_state = match probe_state(&mut cx, &state)? {
        Probe::Changed => return Ok(Check::Changed),
        Probe::Unchanged(s) => s,
    };

    if cx.is_dirty() {
        debug!(cache = %cache_path.display(), "rewriting cache with refreshed directory state");
        let bytes = codec::encode(&new_state, &cached_key, &cached_result)?;
        write_atomic(cache_path, &bytes)?;
    }

    let deps = new_state.dependencies();
    Ok(Check::Unchanged {
        result: cached_result,
        deps,
    })
}

/// All files under `root` matching `glob`, root-relative and sorted.
/// Purely a convenience walk; no cache is read or written.
pub fn match_file_glob(root: &Path, glob: &GlobPath) -> Result<Vec<String>> {
    let mut out = Vec::new();
    collect_matches(root, ".", glob, &mut out)?;
    Ok(out)
}

fn collect_matches(root: &Path, dir: &str, gp: &GlobPath, out: &mut Vec<String>) -> Result<()> {
    let mut names = fs::list_dir(&root.join(dir))?;
    names.sort();
    names.dedup();
    match gp.dirs().split_first() {
        Some((seg, rest_dirs)) => {
            let rest = GlobPath::new(rest_dirs.to_vec(), gp.file().clone());
            for name in names {
                if !seg.matches(&name) {
                    continue;
                }
                let child = join_rel(dir, &name);
                if fs::exists_dir(&root.join(&child)) {
                    collect_matches(root, &child, &rest, out)?;
                }
            }
        }
        None => {
            for name in names {
                if !gp.file().matches(&name) {
                    continue;
                }
                let rel = join_rel(dir, &name);
                if fs::exists_file(&root.join(&rel)) {
                    out.push(rel);
                }
            }
        }
    }
    Ok(())
}

/// Write `bytes` to a sibling temp file, then rename it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = temp_sibling(path);
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
