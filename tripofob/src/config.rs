use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::catalog;
use crate::errors::SearchResult;
use crate::filters::{ExtensionSet, IgnoreSet};

/// Upper bound on concurrent workers, whatever the hardware reports
pub const MAX_WORKERS: usize = 4;

/// Default number of characters captured on each side of a text match
pub const DEFAULT_CONTEXT_CHARS: usize = 50;

/// How the search pattern is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternMode {
    /// Case-insensitive substring search; every character is literal
    #[default]
    Literal,
    /// Case-insensitive, multi-line regular expression
    Regex,
}

/// Replacement policy for byte sequences that are not valid UTF-8
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingMode {
    /// Replace each invalid sequence with U+FFFD
    #[default]
    Lossy,
    /// Drop invalid sequences
    Skip,
}

/// Configuration for one search.
///
/// # Configuration Locations
///
/// Loaded from, in order of increasing precedence:
/// 1. Global `$CONFIG_DIR/tripofob/config.yaml`
/// 2. Local `.tripofob.yaml` in the current directory
/// 3. A file passed with `--config` (must exist)
///
/// CLI arguments are merged on top with [`SearchConfig::merge_with_cli`].
///
/// ```yaml
/// pattern: "invoice"
/// mode: literal            # or: regex
/// root_path: "/srv/share"
/// file_extensions: [".txt", ".xlsx"]
/// categories: ["documents"]
/// ignore_patterns: ["**/*.tmp"]
/// thread_count: 4          # capped at 4
/// context_chars: 50
/// encoding_mode: lossy     # or: skip
/// log_level: "info"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Text or regular expression to search for
    #[serde(default)]
    pub pattern: String,

    /// Whether `pattern` is literal text or a regular expression
    #[serde(default)]
    pub mode: PatternMode,

    /// Root directory to start search from
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Extensions to include (e.g. [".txt", "xlsx"]); case and leading dot
    /// are normalized. `None` together with no categories searches every file.
    #[serde(default)]
    pub file_extensions: Option<Vec<String>>,

    /// Catalog categories to include, by key, title or 1-based number
    #[serde(default)]
    pub categories: Vec<String>,

    /// Glob patterns for files to skip, matched against the absolute path
    /// and the path relative to `root_path`
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Requested worker count; defaults to available parallelism.
    /// Never more than [`MAX_WORKERS`] workers run.
    #[serde(default)]
    pub thread_count: Option<NonZeroUsize>,

    /// Characters of context captured before and after each text match
    #[serde(default = "default_context_chars")]
    pub context_chars: usize,

    /// Policy for invalid UTF-8 in text files
    #[serde(default)]
    pub encoding_mode: EncodingMode,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_context_chars() -> usize {
    DEFAULT_CONTEXT_CHARS
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Values given on the command line; `None` (or empty) leaves the
/// configured value in place
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub pattern: Option<String>,
    pub mode: Option<PatternMode>,
    pub root_path: Option<PathBuf>,
    pub file_extensions: Option<Vec<String>>,
    pub categories: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub thread_count: Option<NonZeroUsize>,
    pub context_chars: Option<usize>,
    pub encoding_mode: Option<EncodingMode>,
    pub log_level: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            mode: PatternMode::default(),
            root_path: default_root_path(),
            file_extensions: None,
            categories: Vec::new(),
            ignore_patterns: Vec::new(),
            thread_count: None,
            context_chars: default_context_chars(),
            encoding_mode: EncodingMode::default(),
            log_level: default_log_level(),
        }
    }
}

impl SearchConfig {
    /// Literal search for `pattern` under `root`
    pub fn new(pattern: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            pattern: pattern.into(),
            root_path: root.into(),
            ..Self::default()
        }
    }

    /// Loads configuration, layering an explicit file over the defaults
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let default_files = [
            dirs::config_dir().map(|p| p.join("tripofob/config.yaml")),
            Some(PathBuf::from(".tripofob.yaml")),
        ];

        for path in default_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values.
    ///
    /// Only values that were given on the command line replace file values,
    /// so a flag can restore a default the file changed.
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        if let Some(pattern) = cli.pattern.filter(|p| !p.is_empty()) {
            self.pattern = pattern;
        }
        if let Some(mode) = cli.mode {
            self.mode = mode;
        }
        if let Some(root_path) = cli.root_path {
            self.root_path = root_path;
        }
        if cli.file_extensions.is_some() {
            self.file_extensions = cli.file_extensions;
        }
        if !cli.categories.is_empty() {
            self.categories = cli.categories;
        }
        if !cli.ignore_patterns.is_empty() {
            self.ignore_patterns = cli.ignore_patterns;
        }
        if cli.thread_count.is_some() {
            self.thread_count = cli.thread_count;
        }
        if let Some(context_chars) = cli.context_chars {
            self.context_chars = context_chars;
        }
        if let Some(encoding_mode) = cli.encoding_mode {
            self.encoding_mode = encoding_mode;
        }
        if let Some(log_level) = cli.log_level {
            self.log_level = log_level;
        }
        self
    }

    /// Number of workers the pool will run: the requested count (or the
    /// available parallelism) capped at [`MAX_WORKERS`]
    pub fn worker_count(&self) -> usize {
        let requested = self
            .thread_count
            .map(NonZeroUsize::get)
            .unwrap_or_else(num_cpus::get);
        requested.clamp(1, MAX_WORKERS)
    }

    /// Union of explicit extensions and category extensions.
    ///
    /// `None` means every file is accepted.
    pub fn accepted_extensions(&self) -> SearchResult<Option<ExtensionSet>> {
        let from_categories = catalog::extensions_for(&self.categories)?;
        let explicit = self
            .file_extensions
            .as_ref()
            .map(|exts| exts.iter().map(String::as_str).collect::<ExtensionSet>())
            .filter(|set| !set.is_empty());

        Ok(match (explicit, from_categories) {
            (None, None) => None,
            (Some(set), None) | (None, Some(set)) => Some(set),
            (Some(mut set), Some(more)) => {
                set.extend(more.to_sorted_vec().iter().map(String::as_str));
                Some(set)
            }
        })
    }

    /// Compiled exclusion globs
    pub fn ignore_set(&self) -> SearchResult<IgnoreSet> {
        IgnoreSet::new(&self.ignore_patterns)
    }
}
