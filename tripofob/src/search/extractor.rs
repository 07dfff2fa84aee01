use std::path::Path;
use tracing::trace;

use super::matcher::PatternMatcher;
use super::spreadsheet::SpreadsheetExtractor;
use super::text::TextExtractor;
use crate::config::SearchConfig;
use crate::errors::SearchResult;
use crate::results::{ContentKind, FileResult, MatchRecord};

/// Extracts pattern occurrences from one file.
///
/// Implementations open, read and release the file within a single call and
/// report failures through the returned error; they never panic on bad input.
pub trait ContentExtractor: Send + Sync {
    /// The kind of content this extractor understands
    fn kind(&self) -> ContentKind;

    /// All matches in the file, in document order
    fn extract(&self, path: &Path, matcher: &PatternMatcher) -> SearchResult<Vec<MatchRecord>>;
}

/// One extractor per [`ContentKind`]
#[derive(Debug, Clone, Default)]
pub struct Extractors {
    text: TextExtractor,
    spreadsheet: SpreadsheetExtractor,
}

impl Extractors {
    pub fn new(text: TextExtractor, spreadsheet: SpreadsheetExtractor) -> Self {
        Self { text, spreadsheet }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(
            TextExtractor::new(config.context_chars, config.encoding_mode),
            SpreadsheetExtractor::new(),
        )
    }

    /// Dispatch table; a new `ContentKind` must be added here
    pub fn for_kind(&self, kind: ContentKind) -> &dyn ContentExtractor {
        match kind {
            ContentKind::Text => &self.text,
            ContentKind::Spreadsheet => &self.spreadsheet,
        }
    }

    /// Runs the extractor for the file's kind.
    ///
    /// Returns `Ok(None)` when the file has no matches.
    pub fn extract(&self, path: &Path, matcher: &PatternMatcher) -> SearchResult<Option<FileResult>> {
        let kind = ContentKind::from_path(path);
        trace!("Extracting {} as {}", path.display(), kind.as_str());

        let matches = self.for_kind(kind).extract(path, matcher)?;
        if matches.is_empty() {
            return Ok(None);
        }
        Ok(Some(FileResult {
            path: path.to_path_buf(),
            kind,
            matches,
        }))
    }
}
