// src/state/mod.rs

//! Persisted monitor state: declared dependencies and the filesystem
//! snapshot taken for them.
//!
//! A [`MonitorStateFileSet`] is what lives inside the cache file. It is
//! built by [`build`] during an update, walked by the probers during a
//! check, and projected back into the [`Dependency`] list it came from.

pub mod build;
pub mod codec;

pub use build::{build_glob_state, build_state};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fs::{FileHash, ModTime};
use crate::glob::{GlobPath, GlobSegment};

/// A single declared thing on disk whose state may invalidate a cached
/// result. Paths are relative to the monitor root, `/`-separated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dependency {
    /// A file expected to exist, tracked by mtime.
    File(String),
    /// A file expected to exist, tracked by mtime and content hash. The
    /// mtime is a fast reject; the hash breaks ties.
    HashedFile(String),
    /// A path expected to not exist.
    Absent(String),
    /// The set of files matching a globbed relative path.
    Glob(GlobPath),
}

/// Dependencies for a file located by probing an ordered search path: every
/// earlier location that must stay empty, then the location it was found at.
pub fn monitor_search_path<I, S>(not_found_at: I, found_at: S) -> Vec<Dependency>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut deps: Vec<Dependency> = not_found_at
        .into_iter()
        .map(|p| Dependency::Absent(p.into()))
        .collect();
    deps.push(Dependency::File(found_at.into()));
    deps
}

/// Like [`monitor_search_path`], but the found file is tracked by content
/// hash as well as mtime.
pub fn monitor_hashed_search_path<I, S>(not_found_at: I, found_at: S) -> Vec<Dependency>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut deps: Vec<Dependency> = not_found_at
        .into_iter()
        .map(|p| Dependency::Absent(p.into()))
        .collect();
    deps.push(Dependency::HashedFile(found_at.into()));
    deps
}

/// Snapshot of one concrete path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SinglePathState {
    /// File existed; only the mtime is tracked.
    File { mtime: ModTime },
    /// File existed; mtime plus content hash.
    HashedFile { mtime: ModTime, hash: FileHash },
    /// Path was absent.
    Absent,
    /// An expected file was already missing when the snapshot was taken.
    /// The snapshot itself never fails because of this; instead, every
    /// later probe of this entry reports a change.
    Missing,
    /// Same as `Missing`, for a hash-tracked file.
    MissingHashed,
}

/// Metadata for one glob-matched file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub mtime: ModTime,
    /// Content hash taken at the moment `mtime` was observed.
    pub hash: FileHash,
}

/// Snapshot of one directory level of a glob path.
///
/// The tree mirrors the glob path: one `Dirs` node per directory segment,
/// one `Files` leaf for the final file segment. `children` and `entries`
/// are strictly sorted ascending by name, and every retained name matches
/// the node's segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlobState {
    /// Interior node: a directory whose matching subdirectories are
    /// monitored further down.
    Dirs {
        seg: GlobSegment,
        /// The glob path below `seg`. Needed to snapshot directories that
        /// appear after the fact.
        rest: GlobPath,
        dir_mtime: ModTime,
        children: Vec<(String, GlobState)>,
    },
    /// Leaf node: a directory whose matching files are monitored.
    Files {
        seg: GlobSegment,
        dir_mtime: ModTime,
        entries: Vec<FileEntry>,
    },
}

impl GlobState {
    /// Whether this subtree currently holds at least one matched file.
    pub fn has_matching_files(&self) -> bool {
        match self {
            GlobState::Files { entries, .. } => !entries.is_empty(),
            GlobState::Dirs { children, .. } => {
                children.iter().any(|(_, child)| child.has_matching_files())
            }
        }
    }

    /// Reassemble the glob path this subtree was built from.
    pub fn glob_path(&self) -> GlobPath {
        match self {
            GlobState::Files { seg, .. } => GlobPath::new(Vec::new(), seg.clone()),
            GlobState::Dirs { seg, rest, .. } => {
                let mut dirs = Vec::with_capacity(1 + rest.dirs().len());
                dirs.push(seg.clone());
                dirs.extend(rest.dirs().iter().cloned());
                GlobPath::new(dirs, rest.file().clone())
            }
        }
    }
}

/// The full persisted snapshot for one dependency set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorStateFileSet {
    /// Single-path snapshots keyed by root-relative path. A `BTreeMap`
    /// keeps the encoded form sorted and therefore byte-stable.
    pub single_paths: BTreeMap<String, SinglePathState>,
    /// Glob snapshots in declaration order.
    pub globs: Vec<GlobState>,
}

impl MonitorStateFileSet {
    /// Project the snapshot back into the dependency list that produced it.
    ///
    /// Missing-at-snapshot entries project back to the `File`/`HashedFile`
    /// declarations they stood in for.
    pub fn dependencies(&self) -> Vec<Dependency> {
        let mut deps = Vec::with_capacity(self.single_paths.len() + self.globs.len());
        for (path, state) in &self.single_paths {
            deps.push(match state {
                SinglePathState::File { .. } | SinglePathState::Missing => {
                    Dependency::File(path.clone())
                }
                SinglePathState::HashedFile { .. } | SinglePathState::MissingHashed => {
                    Dependency::HashedFile(path.clone())
                }
                SinglePathState::Absent => Dependency::Absent(path.clone()),
            });
        }
        for glob in &self.globs {
            deps.push(Dependency::Glob(glob.glob_path()));
        }
        deps
    }
}
