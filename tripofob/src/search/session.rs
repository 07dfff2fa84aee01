use crossbeam_channel::Sender;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::debug;

use crate::results::{Diagnostic, FileResult, SearchReport};

/// Events emitted while a search runs, for progress rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A file passed the filters and was queued
    Discovered,
    /// The tree walk is done; no more files will be queued
    WalkFinished { total: usize },
    /// A worker finished a file
    Processed { path: PathBuf, matches: usize },
    /// A worker could not search a file
    Failed { path: PathBuf, message: String },
}

/// Point-in-time view of the session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub discovered: usize,
    pub processed: usize,
    pub failed: usize,
    pub walk_finished: bool,
}

impl ProgressSnapshot {
    /// True once the walk is over and every queued file has been handled
    pub fn is_complete(&self) -> bool {
        self.walk_finished && self.processed == self.discovered
    }
}

/// Shared state of one search invocation.
///
/// The walker bumps `discovered`; workers bump `processed` (and `failed`) and
/// push into the result sink. Counters only ever grow, and `discovered` is
/// raised before the matching file is queued, so `discovered >= processed`
/// holds at every observation.
#[derive(Debug)]
pub struct SearchSession {
    discovered: AtomicUsize,
    processed: AtomicUsize,
    failed: AtomicUsize,
    walk_finished: AtomicBool,
    sink: Mutex<Vec<FileResult>>,
    diagnostics: Mutex<Vec<Diagnostic>>,
    events: Option<Sender<ProgressEvent>>,
    started: Instant,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSession {
    pub fn new() -> Self {
        Self {
            discovered: AtomicUsize::new(0),
            processed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            walk_finished: AtomicBool::new(false),
            sink: Mutex::new(Vec::new()),
            diagnostics: Mutex::new(Vec::new()),
            events: None,
            started: Instant::now(),
        }
    }

    /// Session that also reports progress through `events`
    pub fn with_events(events: Sender<ProgressEvent>) -> Self {
        Self {
            events: Some(events),
            ..Self::new()
        }
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(events) = &self.events {
            // A reporter that went away must not stop the search
            let _ = events.send(event);
        }
    }

    pub fn record_discovered(&self) {
        self.discovered.fetch_add(1, Ordering::SeqCst);
        self.emit(ProgressEvent::Discovered);
    }

    pub fn finish_walk(&self) {
        self.walk_finished.store(true, Ordering::SeqCst);
        let total = self.discovered.load(Ordering::SeqCst);
        debug!("Walk finished with {} files queued", total);
        self.emit(ProgressEvent::WalkFinished { total });
    }

    /// Stores a non-empty result and counts the file as processed
    pub fn record_result(&self, path: &Path, result: Option<FileResult>) {
        let matches = result.as_ref().map_or(0, |r| r.matches.len());
        if let Some(result) = result.filter(|r| !r.matches.is_empty()) {
            self.sink
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(result);
        }
        self.processed.fetch_add(1, Ordering::SeqCst);
        self.emit(ProgressEvent::Processed {
            path: path.to_path_buf(),
            matches,
        });
    }

    /// Records a per-file failure and counts the file as processed
    pub fn record_failure(&self, path: &Path, message: impl Into<String>) {
        let message = message.into();
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Diagnostic {
                path: path.to_path_buf(),
                message: message.clone(),
            });
        self.failed.fetch_add(1, Ordering::SeqCst);
        self.processed.fetch_add(1, Ordering::SeqCst);
        self.emit(ProgressEvent::Failed {
            path: path.to_path_buf(),
            message,
        });
    }

    pub fn progress(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            discovered: self.discovered.load(Ordering::SeqCst),
            processed: self.processed.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            walk_finished: self.walk_finished.load(Ordering::SeqCst),
        }
    }

    /// Drains the sink into a sorted report. Call only after all workers
    /// have been joined.
    pub fn into_report(self) -> SearchReport {
        let progress = self.progress();
        let mut report = SearchReport::new();
        for result in self.sink.into_inner().unwrap_or_else(PoisonError::into_inner) {
            report.add_file_result(result);
        }
        report.diagnostics = self
            .diagnostics
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        report.files_discovered = progress.discovered;
        report.files_processed = progress.processed;
        report.files_failed = progress.failed;
        report.elapsed = self.started.elapsed();
        report.sort();
        report
    }
}
