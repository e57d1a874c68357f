//! Snapshot pointer rewriting for CI configuration files.
//!
//! A testbed CI config installs Cython from a pinned archive URL such as
//! `https://github.com/cython/cython/archive/<sha>.zip`. Rewriting replaces
//! the `<sha>` segment of every such URL with the snapshot under test.

use regex::{NoExpand, Regex};

use crate::config::SnapshotConfig;
use crate::error::Result;

/// Which of the expected markers a CI config contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerCheck {
    /// The config points at a snapshot archive.
    pub has_archive: bool,
    /// The config disables compiling Cython itself.
    pub has_compile_flag: bool,
}

/// Validates CI configs and repoints their snapshot archive URLs.
#[derive(Debug, Clone)]
pub struct CiConfigRewriter {
    archive_marker: String,
    compile_flag: String,
    pattern: Regex,
}

impl CiConfigRewriter {
    /// Build a rewriter for the given snapshot settings.
    ///
    /// # Errors
    /// Returns error if the archive pattern fails to compile.
    pub fn new(snapshot: &SnapshotConfig) -> Result<Self> {
        let pattern = Regex::new(&format!(
            r"{}/.*?\.zip",
            regex::escape(&snapshot.archive_marker)
        ))?;

        Ok(Self {
            archive_marker: snapshot.archive_marker.clone(),
            compile_flag: snapshot.compile_flag.clone(),
            pattern,
        })
    }

    /// Check `text` for the archive marker and the compile flag.
    #[must_use]
    pub fn check(&self, text: &str) -> MarkerCheck {
        MarkerCheck {
            has_archive: text.contains(&self.archive_marker),
            has_compile_flag: text.contains(&self.compile_flag),
        }
    }

    /// Archive marker the rewriter looks for.
    #[must_use]
    pub fn archive_marker(&self) -> &str {
        &self.archive_marker
    }

    /// Compile flag the rewriter looks for.
    #[must_use]
    pub fn compile_flag(&self) -> &str {
        &self.compile_flag
    }

    /// Point every archive URL in `text` at `snapshot`.
    ///
    /// Returns `None` when the text already points there (or has nothing
    /// to rewrite).
    #[must_use]
    pub fn rewrite(&self, text: &str, snapshot: &str) -> Option<String> {
        let replacement = format!("{}/{snapshot}.zip", self.archive_marker);
        let rewritten = self.pattern.replace_all(text, NoExpand(&replacement));

        (rewritten != text).then(|| rewritten.into_owned())
    }
}
