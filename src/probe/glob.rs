// src/probe/glob.rs

//! Recursive reconciliation of a cached glob subtree against the live
//! filesystem.
//!
//! The subtle part is that a directory's mtime can advance without the set
//! of matching entries changing (a scratch file created and deleted, an
//! empty sibling directory appearing), and the set can be unchanged while
//! individual files were rewritten. An untouched mtime skips the listing
//! entirely; a drifted one triggers a sorted merge of cached children
//! against a fresh filtered listing.

use tracing::{debug, trace};

use crate::errors::Result;
use crate::fs::{self, ModTime};
use crate::glob::{GlobPath, GlobSegment};
use crate::merge::{merge_sorted, Merged};
use crate::state::build::{build_glob_state, join_rel};
use crate::state::{FileEntry, GlobState, SinglePathState};

use super::{probe_single, Probe, ProbeCx};

/// Probe one glob subtree rooted at `dir` (relative to the monitor root).
pub fn probe_glob(cx: &mut ProbeCx, dir: &str, cached: &GlobState) -> Result<Probe<GlobState>> {
    match cached {
        GlobState::Dirs {
            seg,
            rest,
            dir_mtime,
            children,
        } => probe_dirs(cx, dir, seg, rest, *dir_mtime, children),
        GlobState::Files {
            seg,
            dir_mtime,
            entries,
        } => probe_files(cx, dir, seg, *dir_mtime, entries),
    }
}

fn probe_dirs(
    cx: &mut ProbeCx,
    dir: &str,
    seg: &GlobSegment,
    rest: &GlobPath,
    dir_mtime: ModTime,
    children: &[(String, GlobState)],
) -> Result<Probe<GlobState>> {
    let live_mtime = fs::mtime(&cx.root().join(dir))?.unwrap_or(ModTime::MISSING);
    if live_mtime.is_missing() && !dir_mtime.is_missing() {
        debug!(dir, "glob directory disappeared");
        return Ok(Probe::Changed);
    }

    if live_mtime == dir_mtime {
        // Untouched directory: the set of child names cannot have changed,
        // but the children themselves may have.
        let mut new_children = Vec::with_capacity(children.len());
        for (name, child) in children {
            match probe_glob(cx, &join_rel(dir, name), child)? {
                Probe::Changed => return Ok(Probe::Changed),
                Probe::Unchanged(c) => new_children.push((name.clone(), c)),
            }
        }
        return Ok(Probe::Unchanged(GlobState::Dirs {
            seg: seg.clone(),
            rest: rest.clone(),
            dir_mtime,
            children: new_children,
        }));
    }

    trace!(dir, "directory mtime advanced, reconciling subdirectories");
    let mut live = fs::list_dir(&cx.root().join(dir))?;
    live.sort();
    live.dedup();
    live.retain(|name| seg.matches(name) && fs::exists_dir(&cx.root().join(join_rel(dir, name))));

    let mut new_children = Vec::with_capacity(children.len().max(live.len()));
    let merged = merge_sorted(
        children.to_vec(),
        live,
        |(name, _)| name.clone(),
        |name| name.clone(),
    );
    for item in merged {
        match item {
            Merged::Both((name, child), _) => match probe_glob(cx, &join_rel(dir, &name), &child)? {
                Probe::Changed => return Ok(Probe::Changed),
                Probe::Unchanged(c) => new_children.push((name, c)),
            },
            Merged::OnlyRight(name) => {
                let fresh = build_glob_state(cx.root(), &join_rel(dir, &name), rest)?;
                if fresh.has_matching_files() {
                    debug!(dir, child = %name, "new directory with matching files");
                    return Ok(Probe::Changed);
                }
                // The directory appeared but holds nothing we match. Not a
                // change; remembering it saves re-snapshotting it on every
                // future probe.
                debug!(dir, child = %name, "empty directory appeared, refreshing cache");
                cx.mark_dirty();
                new_children.push((name, fresh));
            }
            Merged::OnlyLeft((name, child)) => {
                if child.has_matching_files() {
                    debug!(dir, child = %name, "directory with matching files disappeared");
                    return Ok(Probe::Changed);
                }
                // A remembered-but-empty subtree went away. Keeping the
                // stale entry is harmless; dropping it would force a
                // rewrite for no saving.
                new_children.push((name, child));
            }
        }
    }

    Ok(Probe::Unchanged(GlobState::Dirs {
        seg: seg.clone(),
        rest: rest.clone(),
        dir_mtime: live_mtime,
        children: new_children,
    }))
}

fn probe_files(
    cx: &mut ProbeCx,
    dir: &str,
    seg: &GlobSegment,
    dir_mtime: ModTime,
    entries: &[FileEntry],
) -> Result<Probe<GlobState>> {
    let live_mtime = fs::mtime(&cx.root().join(dir))?.unwrap_or(ModTime::MISSING);
    if live_mtime.is_missing() && !dir_mtime.is_missing() {
        debug!(dir, "glob directory disappeared");
        return Ok(Probe::Changed);
    }

    let new_mtime = if live_mtime == dir_mtime {
        dir_mtime
    } else {
        // The directory was touched: the set of matching names must still
        // be identical, otherwise a file was added or removed.
        trace!(dir, "directory mtime advanced, re-listing matching files");
        let mut live = fs::list_dir(&cx.root().join(dir))?;
        live.sort();
        live.dedup();
        live.retain(|name| {
            seg.matches(name) && fs::exists_file(&cx.root().join(join_rel(dir, name)))
        });

        let cached_names: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();
        let merged = merge_sorted(cached_names, live, |n| n.clone(), |n| n.clone());
        if merged.iter().any(|item| !matches!(item, Merged::Both(..))) {
            debug!(dir, "set of matching files changed");
            return Ok(Probe::Changed);
        }
        live_mtime
    };

    // Same check as a hash-tracked single file, for every remembered entry.
    for entry in entries {
        let path = join_rel(dir, &entry.name);
        let cached = SinglePathState::HashedFile {
            mtime: entry.mtime,
            hash: entry.hash,
        };
        if let Probe::Changed = probe_single(cx, &path, &cached)? {
            return Ok(Probe::Changed);
        }
    }

    Ok(Probe::Unchanged(GlobState::Files {
        seg: seg.clone(),
        dir_mtime: new_mtime,
        entries: entries.to_vec(),
    }))
}
