// src/probe/single.rs

use tracing::debug;

use crate::errors::Result;
use crate::fs;
use crate::state::SinglePathState;

use super::{Probe, ProbeCx};

/// Probe one concrete path against its cached snapshot.
///
/// The returned state always equals the cached one: single-path entries
/// are never refreshed in place, so a hashed file whose mtime drifted
/// while its content stayed put re-hashes on every probe.
pub fn probe_single(
    cx: &mut ProbeCx,
    path: &str,
    cached: &SinglePathState,
) -> Result<Probe<SinglePathState>> {
    let full = cx.root().join(path);
    let outcome = match cached {
        SinglePathState::File { mtime } => match fs::mtime(&full)? {
            None => {
                debug!(path, "monitored file disappeared");
                Probe::Changed
            }
            Some(live) if live != *mtime => {
                debug!(path, "file mtime changed");
                Probe::Changed
            }
            Some(_) => Probe::Unchanged(cached.clone()),
        },
        SinglePathState::HashedFile { mtime, hash } => match fs::mtime(&full)? {
            None => {
                debug!(path, "monitored file disappeared");
                Probe::Changed
            }
            Some(live) if live == *mtime => Probe::Unchanged(cached.clone()),
            Some(_) => match fs::hash_file(&full)? {
                Some(live_hash) if live_hash == *hash => {
                    debug!(path, "mtime drifted but content hash matches");
                    Probe::Unchanged(cached.clone())
                }
                Some(_) => {
                    debug!(path, "file content changed");
                    Probe::Changed
                }
                None => {
                    debug!(path, "monitored file disappeared");
                    Probe::Changed
                }
            },
        },
        SinglePathState::Absent => {
            if fs::mtime(&full)?.is_some() {
                debug!(path, "expected-absent path appeared");
                Probe::Changed
            } else {
                Probe::Unchanged(cached.clone())
            }
        }
        SinglePathState::Missing | SinglePathState::MissingHashed => {
            debug!(path, "file was missing when the snapshot was taken");
            Probe::Changed
        }
    };
    Ok(outcome)
}
