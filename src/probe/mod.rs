// src/probe/mod.rs

//! Probing cached state against the live filesystem.
//!
//! Probes short-circuit: the first detected change aborts the walk and the
//! caller reports `Changed` without a refreshed state. A probe that runs to
//! completion yields the refreshed state plus a dirty flag saying whether
//! the refresh is worth persisting.

pub mod glob;
pub mod single;

pub use glob::probe_glob;
pub use single::probe_single;

use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::state::MonitorStateFileSet;

/// Outcome of one probe step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    /// Something that could invalidate the cached result changed.
    Changed,
    /// Nothing material changed; carries the (possibly refreshed) state.
    Unchanged(T),
}

/// Shared context for one probe run: the monitor root and the cache-dirty
/// flag.
#[derive(Debug)]
pub struct ProbeCx {
    root: PathBuf,
    dirty: bool,
}

impl ProbeCx {
    pub fn new(root: &Path) -> Self {
        ProbeCx {
            root: root.to_path_buf(),
            dirty: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record that the refreshed state differs from the cached one in a way
    /// worth writing back. A bare directory-mtime advance is not: the
    /// rewrite would cost more than the directory scan it saves.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// Probe a full snapshot: single paths in stored order, then each glob
/// tree in declaration order.
pub fn probe_state(
    cx: &mut ProbeCx,
    state: &MonitorStateFileSet,
) -> Result<Probe<MonitorStateFileSet>> {
    let mut refreshed = MonitorStateFileSet::default();
    for (path, single) in &state.single_paths {
        match probe_single(cx, path, single)? {
            Probe::Changed => return Ok(Probe::Changed),
            Probe::Unchanged(s) => {
                refreshed.single_paths.insert(path.clone(), s);
            }
        }
    }
    for glob in &state.globs {
        match probe_glob(cx, ".", glob)? {
            Probe::Changed => return Ok(Probe::Changed),
            Probe::Unchanged(g) => refreshed.globs.push(g),
        }
    }
    Ok(Probe::Unchanged(refreshed))
}
