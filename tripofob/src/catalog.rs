//! Static catalog of file categories and the extensions they cover.

use crate::errors::{SearchError, SearchResult};
use crate::filters::ExtensionSet;

/// A named group of file extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    /// Short identifier accepted on the command line and in config files
    pub key: &'static str,
    /// Human readable title
    pub title: &'static str,
    /// Extensions with a leading dot, lower case
    pub extensions: &'static [&'static str],
}

pub const CATEGORIES: &[Category] = &[
    Category {
        key: "documents",
        title: "Documents",
        extensions: &[".txt", ".doc", ".docx", ".pdf", ".rtf", ".odt"],
    },
    Category {
        key: "spreadsheets",
        title: "Spreadsheets",
        extensions: &[".xls", ".xlsx", ".csv", ".ods"],
    },
    Category {
        key: "databases",
        title: "Databases",
        extensions: &[".db", ".sql", ".sqlite", ".sqlite3"],
    },
    Category {
        key: "web",
        title: "Web files",
        extensions: &[".html", ".xml", ".json", ".yaml", ".yml"],
    },
    Category {
        key: "source",
        title: "Source code",
        extensions: &[".py", ".js", ".cpp", ".java", ".php", ".cs", ".rb", ".go"],
    },
    Category {
        key: "archives",
        title: "Archives",
        extensions: &[".zip", ".rar", ".7z", ".tar", ".gz"],
    },
    Category {
        key: "images",
        title: "Images",
        extensions: &[".jpg", ".jpeg", ".png", ".gif", ".bmp"],
    },
];

/// Looks up a category by key, title (case-insensitive) or 1-based position.
pub fn find_category(selector: &str) -> Option<&'static Category> {
    let selector = selector.trim();
    if let Ok(index) = selector.parse::<usize>() {
        return index.checked_sub(1).and_then(|i| CATEGORIES.get(i));
    }
    CATEGORIES.iter().find(|c| {
        c.key.eq_ignore_ascii_case(selector) || c.title.eq_ignore_ascii_case(selector)
    })
}

/// Resolves category selectors into the union of their extensions.
///
/// `"0"` and `"all"` select nothing specific and yield `None`, meaning every
/// file is searched.
pub fn extensions_for(selectors: &[String]) -> SearchResult<Option<ExtensionSet>> {
    let mut set = ExtensionSet::default();
    for selector in selectors {
        let trimmed = selector.trim();
        if trimmed == "0" || trimmed.eq_ignore_ascii_case("all") {
            return Ok(None);
        }
        let category = find_category(trimmed).ok_or_else(|| {
            SearchError::config_error(format!("Unknown file category: {}", trimmed))
        })?;
        set.extend(category.extensions.iter().copied());
    }
    Ok(if set.is_empty() { None } else { Some(set) })
}
