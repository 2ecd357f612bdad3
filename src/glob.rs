// src/glob.rs

//! Per-segment glob patterns and globbed relative paths.
//!
//! A [`GlobSegment`] matches one directory-entry name; a [`GlobPath`] is a
//! chain of directory segments ending in a file segment, describing a set
//! of files relative to the monitor root. Segments persist as their source
//! text and are recompiled on decode.

use std::fmt;

use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};

use crate::errors::{MonitorError, Result};

/// A single path-segment pattern, e.g. `*.conf` or `proj?`.
///
/// Matching is against bare entry names, never whole paths, so `*` cannot
/// cross a separator.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GlobSegment {
    pattern: String,
    matcher: GlobMatcher,
}

impl fmt::Debug for GlobSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GlobSegment").field(&self.pattern).finish()
    }
}

impl GlobSegment {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(GlobSegment {
            matcher: Glob::new(pattern)?.compile_matcher(),
            pattern: pattern.to_string(),
        })
    }

    /// Source text of the pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Test one directory-entry name against this segment.
    pub fn matches(&self, name: &str) -> bool {
        self.matcher.is_match(name)
    }
}

impl PartialEq for GlobSegment {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for GlobSegment {}

impl fmt::Display for GlobSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl TryFrom<String> for GlobSegment {
    type Error = globset::Error;

    fn try_from(pattern: String) -> std::result::Result<Self, globset::Error> {
        Ok(GlobSegment {
            matcher: Glob::new(&pattern)?.compile_matcher(),
            pattern,
        })
    }
}

impl From<GlobSegment> for String {
    fn from(seg: GlobSegment) -> String {
        seg.pattern
    }
}

/// A globbed path relative to the monitor root: zero or more directory
/// segments followed by one file-matching segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobPath {
    dirs: Vec<GlobSegment>,
    file: GlobSegment,
}

impl GlobPath {
    pub fn new(dirs: Vec<GlobSegment>, file: GlobSegment) -> Self {
        GlobPath { dirs, file }
    }

    /// Split a `/`-separated pattern into segments, e.g.
    /// `pkgs/*/src/*.conf`. Each component is compiled as one segment;
    /// empty components (and the empty string) are rejected.
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut parts: Vec<&str> = pattern.split('/').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(MonitorError::InvalidGlob(format!(
                "empty segment in glob path {pattern:?}"
            )));
        }
        let file = match parts.pop() {
            Some(p) => GlobSegment::new(p)?,
            None => {
                return Err(MonitorError::InvalidGlob(
                    "glob path has no segments".to_string(),
                ))
            }
        };
        let mut dirs = Vec::with_capacity(parts.len());
        for p in parts {
            dirs.push(GlobSegment::new(p)?);
        }
        Ok(GlobPath { dirs, file })
    }

    /// Directory segments, outermost first.
    pub fn dirs(&self) -> &[GlobSegment] {
        &self.dirs
    }

    /// The final, file-matching segment.
    pub fn file(&self) -> &GlobSegment {
        &self.file
    }
}

impl fmt::Display for GlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seg in &self.dirs {
            write!(f, "{seg}/")?;
        }
        write!(f, "{}", self.file)
    }
}
