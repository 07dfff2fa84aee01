pub mod catalog;
pub mod config;
pub mod errors;
pub mod export;
pub mod filters;
pub mod results;
pub mod search;

pub use config::{CliOverrides, EncodingMode, PatternMode, SearchConfig};
pub use errors::{SearchError, SearchResult};
pub use results::{ContentKind, Diagnostic, FileResult, MatchRecord, SearchReport};
pub use search::{search, search_with_progress, ProgressEvent};
