//! Extraction from `.xlsx` workbooks.
//!
//! A workbook is a ZIP archive. Every `xl/worksheets/sheet*.xml` entry holds
//! SpreadsheetML rows of `<c>` cells whose value sits in `<v>` (or in
//! `<is><t>` for inline strings). String cells (`t="s"`) store an index into
//! `xl/sharedStrings.xml`, which is resolved before matching.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, trace};
use xml::name::OwnedName;
use xml::reader::{EventReader, XmlEvent};
use zip::ZipArchive;

use super::extractor::ContentExtractor;
use super::matcher::PatternMatcher;
use crate::errors::{SearchError, SearchResult};
use crate::results::{ContentKind, MatchRecord};

const WORKSHEET_PREFIX: &str = "xl/worksheets/sheet";
const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const SPREADSHEETML_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Context attached to every spreadsheet match
pub const CELL_CONTEXT: &str = "Found in cell";

fn is_element(name: &OwnedName, local: &str) -> bool {
    name.local_name == local
        && name
            .namespace
            .as_deref()
            .map_or(true, |ns| ns == SPREADSHEETML_NS)
}

/// Parses the shared string table: one entry per `<si>`, rich text runs
/// concatenated, phonetic hints left out
fn read_shared_strings<R: Read>(reader: R, path: &Path) -> SearchResult<Vec<String>> {
    let mut strings = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;
    let mut in_phonetic = false;

    for event in EventReader::new(BufReader::new(reader)) {
        match event.map_err(|e| SearchError::xml(path, e))? {
            XmlEvent::StartElement { name, .. } => {
                if is_element(&name, "si") {
                    current = Some(String::new());
                } else if is_element(&name, "rPh") {
                    in_phonetic = true;
                } else if is_element(&name, "t") {
                    in_text = true;
                }
            }
            XmlEvent::EndElement { name } => {
                if is_element(&name, "si") {
                    strings.push(current.take().unwrap_or_default());
                } else if is_element(&name, "rPh") {
                    in_phonetic = false;
                } else if is_element(&name, "t") {
                    in_text = false;
                }
            }
            XmlEvent::Characters(text) | XmlEvent::CData(text) | XmlEvent::Whitespace(text) => {
                if in_text && !in_phonetic {
                    if let Some(current) = current.as_mut() {
                        current.push_str(&text);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(strings)
}

/// Cell being assembled while walking a worksheet
#[derive(Default)]
struct Cell {
    cell_type: Option<String>,
    value: Option<String>,
    inline: Option<String>,
}

impl Cell {
    /// Display text of the cell, with shared strings resolved
    fn into_text(self, shared: &[String]) -> Option<String> {
        match self.cell_type.as_deref() {
            Some("inlineStr") => self.inline.or(self.value),
            Some("s") => self.value.map(|raw| {
                raw.trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| shared.get(i).cloned())
                    .unwrap_or(raw)
            }),
            _ => self.value,
        }
    }
}

/// Visits every cell inside `<row>` elements in document order
fn scan_worksheet<R: Read>(
    reader: R,
    path: &Path,
    shared: &[String],
    matcher: &PatternMatcher,
    matches: &mut Vec<MatchRecord>,
) -> SearchResult<()> {
    let mut in_row = false;
    let mut cell: Option<Cell> = None;
    let mut in_value = false;
    let mut in_inline_text = false;

    for event in EventReader::new(BufReader::new(reader)) {
        match event.map_err(|e| SearchError::xml(path, e))? {
            XmlEvent::StartElement {
                name, attributes, ..
            } => {
                if is_element(&name, "row") {
                    in_row = true;
                } else if in_row && is_element(&name, "c") {
                    let cell_type = attributes
                        .iter()
                        .find(|a| a.name.local_name == "t")
                        .map(|a| a.value.clone());
                    cell = Some(Cell {
                        cell_type,
                        ..Cell::default()
                    });
                } else if cell.is_some() && is_element(&name, "v") {
                    in_value = true;
                } else if cell.is_some() && is_element(&name, "t") {
                    in_inline_text = true;
                }
            }
            XmlEvent::EndElement { name } => {
                if is_element(&name, "row") {
                    in_row = false;
                } else if is_element(&name, "c") {
                    let text = cell.take().and_then(|c| c.into_text(shared));
                    if let Some(text) = text.filter(|t| !t.is_empty()) {
                        if matcher.is_match(&text) {
                            trace!("Cell match in {}: {}", path.display(), text);
                            matches.push(MatchRecord::new(text, CELL_CONTEXT));
                        }
                    }
                } else if is_element(&name, "v") {
                    in_value = false;
                } else if is_element(&name, "t") {
                    in_inline_text = false;
                }
            }
            XmlEvent::Characters(text) | XmlEvent::CData(text) | XmlEvent::Whitespace(text) => {
                if let Some(cell) = cell.as_mut() {
                    if in_value {
                        cell.value.get_or_insert_with(String::new).push_str(&text);
                    } else if in_inline_text {
                        cell.inline.get_or_insert_with(String::new).push_str(&text);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Searches cell values of `.xlsx` workbooks
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetExtractor;

impl SpreadsheetExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ContentExtractor for SpreadsheetExtractor {
    fn kind(&self) -> ContentKind {
        ContentKind::Spreadsheet
    }

    fn extract(&self, path: &Path, matcher: &PatternMatcher) -> SearchResult<Vec<MatchRecord>> {
        let file = File::open(path).map_err(|e| SearchError::from_io(path, e))?;
        let mut archive = ZipArchive::new(file).map_err(|e| SearchError::archive(path, e))?;

        let shared = match archive.by_name(SHARED_STRINGS) {
            Ok(entry) => read_shared_strings(entry, path)?,
            Err(zip::result::ZipError::FileNotFound) => Vec::new(),
            Err(e) => return Err(SearchError::archive(path, e)),
        };

        let sheets: Vec<String> = archive
            .file_names()
            .filter(|name| name.starts_with(WORKSHEET_PREFIX) && name.ends_with(".xml"))
            .map(str::to_string)
            .collect();
        debug!(
            "{}: {} worksheet(s), {} shared string(s)",
            path.display(),
            sheets.len(),
            shared.len()
        );

        let mut matches = Vec::new();
        for sheet in &sheets {
            let entry = archive
                .by_name(sheet)
                .map_err(|e| SearchError::archive(path, e))?;
            scan_worksheet(entry, path, &shared, matcher, &mut matches)?;
        }

        Ok(matches)
    }
}
