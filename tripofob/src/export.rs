//! JSON snapshot of a finished search.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::{SearchError, SearchResult};
use crate::results::FileResult;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub pattern: String,
    pub timestamp: String,
    /// Files with at least one match
    pub total_files: usize,
    pub total_matches: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub metadata: ExportMetadata,
    pub results: Vec<FileResult>,
}

impl ExportDocument {
    pub fn new(pattern: &str, results: &[FileResult], generated: DateTime<Local>) -> Self {
        Self {
            metadata: ExportMetadata {
                pattern: pattern.to_string(),
                timestamp: generated.format(TIMESTAMP_FORMAT).to_string(),
                total_files: results.len(),
                total_matches: results.iter().map(|r| r.matches.len()).sum(),
            },
            results: results.to_vec(),
        }
    }

    /// `search_results_<timestamp>.json`
    pub fn file_name(&self) -> String {
        format!("search_results_{}.json", self.metadata.timestamp)
    }

    /// Writes the document as 4-space indented JSON
    pub fn write_to<W: Write>(&self, writer: W) -> SearchResult<()> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
        self.serialize(&mut serializer).map_err(SearchError::export)
    }
}

/// Saves `results` into `dir` and returns the path of the new file
pub fn save_results(dir: &Path, pattern: &str, results: &[FileResult]) -> SearchResult<PathBuf> {
    let document = ExportDocument::new(pattern, results, Local::now());
    let path = dir.join(document.file_name());

    let file = File::create(&path).map_err(|e| SearchError::from_io(&path, e))?;
    let mut writer = BufWriter::new(file);
    document.write_to(&mut writer)?;
    writer.flush()?;

    info!("Exported {} results to {}", results.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{ContentKind, MatchRecord};
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn sample() -> Vec<FileResult> {
        vec![
            FileResult {
                path: PathBuf::from("/data/notes.txt"),
                kind: ContentKind::Text,
                matches: vec![
                    MatchRecord::new("Привет", "...Привет, мир..."),
                    MatchRecord::new("привет", "...снова привет..."),
                ],
            },
            FileResult {
                path: PathBuf::from("/data/book.xlsx"),
                kind: ContentKind::Spreadsheet,
                matches: vec![MatchRecord::new("Привет 42", "Found in cell")],
            },
        ]
    }

    #[test]
    fn test_metadata() {
        let generated = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let document = ExportDocument::new("привет", &sample(), generated);
        assert_eq!(document.metadata.timestamp, "20240305_140709");
        assert_eq!(document.metadata.total_files, 2);
        assert_eq!(document.metadata.total_matches, 3);
        assert_eq!(document.file_name(), "search_results_20240305_140709.json");
    }

    #[test]
    fn test_layout_and_indent() {
        let generated = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let document = ExportDocument::new("привет", &sample(), generated);
        let mut buffer = Vec::new();
        document.write_to(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        // Non-ASCII text is written as is
        assert!(text.contains("\"pattern\": \"привет\""));
        assert!(text.starts_with("{\n    \"metadata\": {\n        \"pattern\""));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["results"][0]["file"], "/data/notes.txt");
        assert_eq!(value["results"][0]["type"], "text");
        assert_eq!(value["results"][1]["type"], "spreadsheet");
        assert_eq!(value["results"][1]["matches"][0]["match"], "Привет 42");
    }

    #[test]
    fn test_save_results() {
        let dir = tempdir().unwrap();
        let path = save_results(dir.path(), "привет", &sample()).unwrap();
        assert!(path.exists());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("search_results_"));

        let document: ExportDocument =
            serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(document.results, sample());
    }
}
