//! core::filter
//!
//! Include/exclude rules compiled into a single acceptance predicate.
//!
//! # Rules
//!
//! In priority order:
//!
//! 1. `.git` is never accepted.
//! 2. A name fully matched by the exclude pattern is rejected, even if the
//!    include pattern also matches it.
//! 3. If an include pattern is configured, a file name must fully match it.
//!    Directories are exempt from the include pattern so traversal can reach
//!    includable descendants; directories left empty by filtering are pruned
//!    afterwards by the materializer.
//! 4. With neither pattern configured everything but `.git` is accepted.
//!
//! Patterns apply to bare names, never to paths. The same [`InclusionFilter`]
//! value drives root resolution, materialization and checkin's deletion
//! restoration, so all three phases agree on what belongs to a module.
//!
//! # Example
//!
//! ```
//! use librarian::core::filter::InclusionFilter;
//!
//! let filter = InclusionFilter::new(Some(r".*\.lua|LICENSE.*"), Some("tests?|demos?")).unwrap();
//! assert!(filter.accepts("init.lua"));
//! assert!(!filter.accepts("README.md"));
//! assert!(!filter.accepts("tests"));
//! assert!(filter.descends_into("src"));
//! assert!(!filter.descends_into("demo"));
//! assert!(!filter.accepts(".git"));
//! ```

use std::path::{Component, Path};

use regex::Regex;
use thiserror::Error;

use crate::core::config::KindConfig;

/// The one name no filter ever accepts.
pub const GIT_DIR_NAME: &str = ".git";

/// Errors from compiling filter patterns.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid {role} pattern '{pattern}': {source}")]
    InvalidPattern {
        role: &'static str,
        pattern: String,
        source: regex::Error,
    },
}

/// A regular expression evaluated as a full-string match.
///
/// Two patterns compare equal when their source text is equal.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source` so that it only matches whole names.
    pub fn new(source: &str, role: &'static str) -> Result<Self, FilterError> {
        let regex =
            Regex::new(&format!("^(?:{source})$")).map_err(|e| FilterError::InvalidPattern {
                role,
                pattern: source.to_string(),
                source: e,
            })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Compile an optional pattern; empty means "not configured".
    pub fn optional(source: Option<&str>, role: &'static str) -> Result<Option<Self>, FilterError> {
        match source {
            Some(s) if !s.is_empty() => Ok(Some(Self::new(s, role)?)),
            _ => Ok(None),
        }
    }

    /// Check whether the whole of `name` matches.
    pub fn fully_matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// The pattern as the user wrote it.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

/// A compiled file-acceptance predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InclusionFilter {
    include: Option<Pattern>,
    exclude: Option<Pattern>,
}

impl InclusionFilter {
    /// Compile a filter from optional include and exclude patterns.
    ///
    /// Empty strings are treated as "not configured".
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self, FilterError> {
        Ok(Self {
            include: Pattern::optional(include, "include")?,
            exclude: Pattern::optional(exclude, "exclude")?,
        })
    }

    /// A filter that accepts every name except `.git`.
    pub fn accept_all() -> Self {
        Self::default()
    }

    /// Compile the filter configured for a kind.
    pub fn for_kind(kind: &KindConfig) -> Result<Self, FilterError> {
        Self::new(
            kind.include_pattern.as_deref(),
            kind.exclude_pattern.as_deref(),
        )
    }

    /// Whether a file called `name` belongs to the module.
    pub fn accepts(&self, name: &str) -> bool {
        if self.rejects_unconditionally(name) {
            return false;
        }
        match &self.include {
            Some(include) => include.fully_matches(name),
            None => true,
        }
    }

    /// Whether traversal may continue into a directory called `name`.
    ///
    /// Only `.git` and the exclude pattern can stop traversal.
    pub fn descends_into(&self, name: &str) -> bool {
        !self.rejects_unconditionally(name)
    }

    /// Whether a path relative to a module root would survive filtering.
    ///
    /// Every directory component must be traversable and the final
    /// component must be an accepted file name.
    pub fn accepts_relative_path(&self, path: &Path) -> bool {
        let mut names = Vec::new();
        for component in path.components() {
            if let Component::Normal(name) = component {
                // Non-UTF-8 names never match a pattern.
                match name.to_str() {
                    Some(name) => names.push(name),
                    None => return false,
                }
            }
        }

        match names.split_last() {
            Some((file, dirs)) => {
                dirs.iter().all(|d| self.descends_into(d)) && self.accepts(file)
            }
            None => false,
        }
    }

    /// The include pattern, if configured.
    pub fn include(&self) -> Option<&Pattern> {
        self.include.as_ref()
    }

    /// The exclude pattern, if configured.
    pub fn exclude(&self) -> Option<&Pattern> {
        self.exclude.as_ref()
    }

    fn rejects_unconditionally(&self, name: &str) -> bool {
        name == GIT_DIR_NAME
            || self
                .exclude
                .as_ref()
                .is_some_and(|exclude| exclude.fully_matches(name))
    }
}
