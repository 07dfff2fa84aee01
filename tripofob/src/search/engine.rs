use crossbeam_channel::{Receiver, Sender};
use rayon::ThreadPoolBuilder;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::extractor::Extractors;
use super::matcher::PatternMatcher;
use super::session::{ProgressEvent, SearchSession};
use super::walker::TreeWalker;
use crate::config::SearchConfig;
use crate::errors::{SearchError, SearchResult};
use crate::results::SearchReport;

/// Files the walk may run ahead of the workers before it blocks
pub const WORK_QUEUE_CAPACITY: usize = 1024;

/// Performs a concurrent search across files in a directory
pub fn search(config: &SearchConfig) -> SearchResult<SearchReport> {
    run(config, SearchSession::new())
}

/// Like [`search`], streaming [`ProgressEvent`]s to `events` while it runs.
/// The channel disconnects when the search returns.
pub fn search_with_progress(
    config: &SearchConfig,
    events: Sender<ProgressEvent>,
) -> SearchResult<SearchReport> {
    run(config, SearchSession::with_events(events))
}

/// Runs one search on `session`.
///
/// The pattern, filters and root directory are validated before any file is
/// touched. Workers are started first and block on the queue; the walk runs
/// on the calling thread and closes the queue when it is done, which is what
/// lets the workers exit. All workers are joined before the sink is drained.
pub fn run(config: &SearchConfig, session: SearchSession) -> SearchResult<SearchReport> {
    info!(
        "Starting {:?} search for '{}' in {}",
        config.mode,
        config.pattern,
        config.root_path.display()
    );

    let matcher = PatternMatcher::new(&config.pattern, config.mode)?;
    let walker = TreeWalker::new(
        &config.root_path,
        config.accepted_extensions()?,
        config.ignore_set()?,
    )?;
    let extractors = Extractors::from_config(config);

    let worker_count = config.worker_count();
    let pool = ThreadPoolBuilder::new()
        .num_threads(worker_count)
        .thread_name(|i| format!("tripofob-worker-{}", i))
        .build()
        .map_err(SearchError::worker_pool)?;
    debug!("Worker pool started with {} threads", worker_count);

    let (queue_tx, queue_rx) = crossbeam_channel::bounded::<PathBuf>(WORK_QUEUE_CAPACITY);
    let session_ref = &session;
    let matcher_ref = &matcher;
    let extractors_ref = &extractors;

    pool.in_place_scope(|scope| {
        for worker_id in 0..worker_count {
            let queue = queue_rx.clone();
            scope.spawn(move |_| {
                worker_loop(worker_id, queue, matcher_ref, extractors_ref, session_ref)
            });
        }
        drop(queue_rx);

        for path in walker.files() {
            session_ref.record_discovered();
            if queue_tx.send(path).is_err() {
                warn!("Work queue closed before the walk finished");
                break;
            }
        }
        // Closing the queue is the completion signal for the workers
        drop(queue_tx);
        session_ref.finish_walk();
    });

    let mut report = session.into_report();
    report.workers = worker_count;

    info!(
        "Search complete. Found {} matches in {} of {} files ({} failed)",
        report.total_matches, report.files_with_matches, report.files_processed, report.files_failed
    );
    Ok(report)
}

fn worker_loop(
    worker_id: usize,
    queue: Receiver<PathBuf>,
    matcher: &PatternMatcher,
    extractors: &Extractors,
    session: &SearchSession,
) {
    let mut handled = 0usize;
    for path in queue.iter() {
        match extractors.extract(&path, matcher) {
            Ok(result) => session.record_result(&path, result),
            Err(e) => {
                warn!("Failed to search {}: {}", path.display(), e);
                session.record_failure(&path, e.to_string());
            }
        }
        handled += 1;
    }
    debug!("Worker {} finished after {} files", worker_id, handled);
}
