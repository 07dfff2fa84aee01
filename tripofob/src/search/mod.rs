//! The concurrent search engine.
//!
//! A search compiles its pattern, walks the directory tree and feeds every
//! accepted file into a bounded work queue. A fixed pool of at most four
//! workers drains the queue; each worker picks the extractor for the file's
//! [`ContentKind`](crate::results::ContentKind), records the outcome in the
//! shared [`SearchSession`] and emits a [`ProgressEvent`].
//!
//! ```rust,ignore
//! let (tx, rx) = crossbeam_channel::unbounded();
//! let reporter = std::thread::spawn(move || {
//!     for event in rx {
//!         // redraw a progress bar
//!     }
//! });
//! let report = search_with_progress(&config, tx)?;
//! reporter.join().unwrap();
//! ```
//!
//! Per-file failures never abort a search: they are logged, recorded as
//! [`Diagnostic`](crate::results::Diagnostic)s and the file counts as processed.
pub mod engine;
pub mod extractor;
pub mod matcher;
pub mod session;
pub mod spreadsheet;
pub mod text;
pub mod walker;

pub use engine::{search, search_with_progress};
pub use extractor::{ContentExtractor, Extractors};
pub use matcher::PatternMatcher;
pub use session::{ProgressEvent, ProgressSnapshot, SearchSession};
pub use spreadsheet::SpreadsheetExtractor;
pub use text::TextExtractor;
pub use walker::TreeWalker;
