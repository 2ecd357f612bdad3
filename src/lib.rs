// src/lib.rs

//! Persistent file-status cache for build tools.
//!
//! A client declares what a computed result depended on (concrete files,
//! hash-tracked files, paths that must stay absent, and directory globs)
//! together with an opaque key and result. [`update_monitor`] snapshots the
//! filesystem metadata for those dependencies into a cache file;
//! [`check_monitor`] later probes the snapshot against the live filesystem
//! and answers "has anything that could invalidate this result changed?"
//! without re-running the computation.
//!
//! Probes are cheap by design: an untouched directory mtime skips the
//! listing, an untouched file mtime skips the hash, and metadata that went
//! stale without a material change (say, an empty directory appearing
//! inside a glob) is refreshed in the cache file opportunistically.
//!
//! ```no_run
//! use std::path::Path;
//! use filemon::{check_monitor, update_monitor, Check, Dependency, GlobPath};
//!
//! fn main() -> filemon::Result<()> {
//!     let root = Path::new("/srv/project");
//!     let cache = Path::new("/srv/project/.build/monitor.bin");
//!     let deps = vec![
//!         Dependency::HashedFile("build.toml".to_string()),
//!         Dependency::Glob(GlobPath::parse("pkgs/*/src/*.conf")?),
//!     ];
//!     let key = "tool-v3".to_string();
//!
//!     update_monitor(cache, root, &deps, &key, &"artifact-id".to_string())?;
//!
//!     match check_monitor::<String, String>(cache, root, &key)? {
//!         Check::Unchanged { result, .. } => println!("still valid: {result}"),
//!         Check::Changed => println!("needs a rebuild"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod fs;
pub mod glob;
pub mod merge;
pub mod monitor;
pub mod probe;
pub mod state;

pub use errors::{MonitorError, Result};
pub use fs::{FileHash, ModTime};
pub use glob::{GlobPath, GlobSegment};
pub use monitor::{check_monitor, match_file_glob, update_monitor, Check};
pub use state::{
    monitor_hashed_search_path, monitor_search_path, Dependency, FileEntry, GlobState,
    MonitorStateFileSet, SinglePathState,
};
