//! File filtering: which paths produced by the tree walk enter the work queue.
//!
//! Two independent filters apply. The extension filter keeps files whose
//! lower-cased extension (with its leading dot) is in the accepted set; when
//! no set is given every file passes. Exclusion globs drop files whose path,
//! absolute or relative to the search root, matches any pattern.
use glob::Pattern;
use std::collections::HashSet;
use std::path::Path;

use crate::errors::{SearchError, SearchResult};

/// Normalizes a user supplied extension to `.ext` lower case.
///
/// Returns `None` for empty input.
pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!(".{}", trimmed.to_lowercase()))
    }
}

/// Lower-cased extension of `path` with a leading dot, if it has one
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

/// Set of accepted extensions, stored normalized
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionSet {
    extensions: HashSet<String>,
}

impl ExtensionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, raw: &str) {
        if let Some(ext) = normalize_extension(raw) {
            self.extensions.insert(ext);
        }
    }

    pub fn extend<'a>(&mut self, raws: impl IntoIterator<Item = &'a str>) {
        for raw in raws {
            self.insert(raw);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Checks a raw extension string (dot optional, any case)
    pub fn contains_ext(&self, raw: &str) -> bool {
        normalize_extension(raw).is_some_and(|ext| self.extensions.contains(&ext))
    }

    /// Checks whether the file's extension is accepted
    pub fn matches(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.extensions.contains(&ext))
    }

    /// Sorted view, for display
    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut exts: Vec<String> = self.extensions.iter().cloned().collect();
        exts.sort();
        exts
    }
}

impl<'a> FromIterator<&'a str> for ExtensionSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// Checks if a file passes the extension filter
pub fn has_accepted_extension(path: &Path, accepted: Option<&ExtensionSet>) -> bool {
    match accepted {
        None => true,
        Some(set) if set.is_empty() => true,
        Some(set) => set.matches(path),
    }
}

/// Compiled exclusion globs
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    patterns: Vec<Pattern>,
}

impl IgnoreSet {
    /// Compiles the globs, failing on the first malformed one
    pub fn new(globs: &[String]) -> SearchResult<Self> {
        let patterns = globs
            .iter()
            .map(|g| {
                Pattern::new(g).map_err(|e| {
                    SearchError::config_error(format!("Invalid ignore pattern '{}': {}", g, e))
                })
            })
            .collect::<SearchResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Checks if a file should be ignored, trying both the full path and
    /// the path relative to `root`
    pub fn should_ignore(&self, path: &Path, root: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let full = path.to_string_lossy().replace('\\', "/");
        let relative = path
            .strip_prefix(root)
            .ok()
            .map(|p| p.to_string_lossy().replace('\\', "/"));

        self.patterns.iter().any(|p| {
            p.matches(&full) || relative.as_deref().is_some_and(|rel| p.matches(rel))
        })
    }
}
