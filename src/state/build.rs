// src/state/build.rs

//! Snapshot construction: walk the filesystem for a declared dependency
//! list and record what is there right now.

use std::path::Path;

use tracing::debug;

use crate::errors::Result;
use crate::fs::{self, ModTime};
use crate::glob::GlobPath;

use super::{Dependency, FileEntry, GlobState, MonitorStateFileSet, SinglePathState};

/// Take a fresh snapshot of every declared dependency, in input order.
///
/// Never fails because a declared file is missing: the miss itself is
/// recorded, and every later probe of that entry reports a change.
pub fn build_state(root: &Path, deps: &[Dependency]) -> Result<MonitorStateFileSet> {
    let mut state = MonitorStateFileSet::default();
    for dep in deps {
        match dep {
            Dependency::File(p) => {
                let s = match fs::mtime(&root.join(p))? {
                    Some(mtime) => SinglePathState::File { mtime },
                    None => {
                        debug!(path = %p, "file missing at snapshot time");
                        SinglePathState::Missing
                    }
                };
                state.single_paths.insert(p.clone(), s);
            }
            Dependency::HashedFile(p) => {
                let full = root.join(p);
                let s = match (fs::mtime(&full)?, fs::hash_file(&full)?) {
                    (Some(mtime), Some(hash)) => SinglePathState::HashedFile { mtime, hash },
                    _ => {
                        debug!(path = %p, "hashed file missing at snapshot time");
                        SinglePathState::MissingHashed
                    }
                };
                state.single_paths.insert(p.clone(), s);
            }
            Dependency::Absent(p) => {
                state.single_paths.insert(p.clone(), SinglePathState::Absent);
            }
            Dependency::Glob(gp) => {
                state.globs.push(build_glob_state(root, ".", gp)?);
            }
        }
    }
    Ok(state)
}

/// Snapshot one directory level of a glob path.
///
/// `dir` is relative to `root`; `"."` is the root itself. A directory that
/// does not exist snapshots as an empty matched set with a sentinel mtime,
/// so its later appearance shows up as an mtime difference.
pub fn build_glob_state(root: &Path, dir: &str, gp: &GlobPath) -> Result<GlobState> {
    let dir_mtime = fs::mtime(&root.join(dir))?.unwrap_or(ModTime::MISSING);
    let mut names = fs::list_dir(&root.join(dir))?;
    names.sort();
    names.dedup();

    match gp.dirs().split_first() {
        Some((seg, rest_dirs)) => {
            let rest = GlobPath::new(rest_dirs.to_vec(), gp.file().clone());
            let mut children = Vec::new();
            for name in names {
                if !seg.matches(&name) {
                    continue;
                }
                let child_dir = join_rel(dir, &name);
                if !fs::exists_dir(&root.join(&child_dir)) {
                    continue;
                }
                let child = build_glob_state(root, &child_dir, &rest)?;
                children.push((name, child));
            }
            Ok(GlobState::Dirs {
                seg: seg.clone(),
                rest,
                dir_mtime,
                children,
            })
        }
        None => {
            let seg = gp.file();
            let mut entries = Vec::new();
            for name in names {
                if !seg.matches(&name) {
                    continue;
                }
                let path = root.join(join_rel(dir, &name));
                if !fs::exists_file(&path) {
                    continue;
                }
                // The file can vanish between the listing and the stat;
                // treat that as never having matched.
                if let (Some(mtime), Some(hash)) = (fs::mtime(&path)?, fs::hash_file(&path)?) {
                    entries.push(FileEntry { name, mtime, hash });
                }
            }
            Ok(GlobState::Files {
                seg: seg.clone(),
                dir_mtime,
                entries,
            })
        }
    }
}

/// Join two root-relative fragments with `/`, collapsing the implicit `"."`
/// top directory.
pub(crate) fn join_rel(dir: &str, name: &str) -> String {
    if dir == "." {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}
