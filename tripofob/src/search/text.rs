use memmap2::Mmap;
use std::borrow::Cow;
use std::fs::File;
use std::path::Path;
use tracing::{trace, warn};

use super::extractor::ContentExtractor;
use super::matcher::PatternMatcher;
use crate::config::{EncodingMode, DEFAULT_CONTEXT_CHARS};
use crate::errors::{SearchError, SearchResult};
use crate::results::{ContentKind, MatchRecord};

/// Files at or above this size are memory-mapped instead of read into a buffer
pub(crate) const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

/// Decodes bytes into text according to the replacement policy.
///
/// Never fails: invalid sequences are either replaced or dropped.
pub fn decode_bytes<'a>(bytes: &'a [u8], path: &Path, encoding_mode: EncodingMode) -> Cow<'a, str> {
    match encoding_mode {
        EncodingMode::Lossy => {
            let text = String::from_utf8_lossy(bytes);
            if let Cow::Owned(_) = text {
                warn!("Invalid UTF-8 replaced in file: {}", path.display());
            }
            text
        }
        EncodingMode::Skip => match std::str::from_utf8(bytes) {
            Ok(valid) => Cow::Borrowed(valid),
            Err(_) => {
                warn!("Invalid UTF-8 skipped in file: {}", path.display());
                let mut text = String::with_capacity(bytes.len());
                for chunk in bytes.utf8_chunks() {
                    text.push_str(chunk.valid());
                }
                Cow::Owned(text)
            }
        },
    }
}

/// Builds the `...context...` snippet around the match at `start..end`.
///
/// Takes up to `radius` characters on each side, clipped to the document,
/// flattens line breaks to spaces and trims the result.
pub fn context_window(content: &str, start: usize, end: usize, radius: usize) -> String {
    let window_start = if radius == 0 {
        start
    } else {
        content[..start]
            .char_indices()
            .rev()
            .nth(radius - 1)
            .map_or(0, |(i, _)| i)
    };
    let window_end = content[end..]
        .char_indices()
        .nth(radius)
        .map_or(content.len(), |(i, _)| end + i);

    let flattened = content[window_start..window_end].replace(['\n', '\r'], " ");
    format!("...{}...", flattened.trim())
}

/// Reads files as text and captures a context window per match
#[derive(Debug, Clone)]
pub struct TextExtractor {
    context_chars: usize,
    encoding_mode: EncodingMode,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_CHARS, EncodingMode::default())
    }
}

impl TextExtractor {
    pub fn new(context_chars: usize, encoding_mode: EncodingMode) -> Self {
        Self {
            context_chars,
            encoding_mode,
        }
    }

    /// Scans already decoded text
    pub fn extract_from_str(&self, content: &str, matcher: &PatternMatcher) -> Vec<MatchRecord> {
        matcher
            .find_matches(content)
            .into_iter()
            .map(|(start, end)| MatchRecord {
                matched: content[start..end].to_string(),
                context: context_window(content, start, end, self.context_chars),
            })
            .collect()
    }

    fn scan_bytes(&self, bytes: &[u8], path: &Path, matcher: &PatternMatcher) -> Vec<MatchRecord> {
        let content = decode_bytes(bytes, path, self.encoding_mode);
        self.extract_from_str(&content, matcher)
    }
}

impl ContentExtractor for TextExtractor {
    fn kind(&self) -> ContentKind {
        ContentKind::Text
    }

    fn extract(&self, path: &Path, matcher: &PatternMatcher) -> SearchResult<Vec<MatchRecord>> {
        let file = File::open(path).map_err(|e| SearchError::from_io(path, e))?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);

        if size >= LARGE_FILE_THRESHOLD {
            trace!("Memory mapping {} ({} bytes)", path.display(), size);
            // SAFETY: the map is read-only and dropped before this call returns
            let mmap = unsafe { Mmap::map(&file) }.map_err(SearchError::IoError)?;
            Ok(self.scan_bytes(&mmap, path, matcher))
        } else {
            trace!("Reading {} ({} bytes)", path.display(), size);
            drop(file);
            let bytes = std::fs::read(path).map_err(|e| SearchError::from_io(path, e))?;
            Ok(self.scan_bytes(&bytes, path, matcher))
        }
    }
}
