use crossbeam_channel::Receiver;
use indicatif::{ProgressBar, ProgressStyle};
use std::thread::{self, JoinHandle};
use tripofob::ProgressEvent;

const TEMPLATE: &str =
    "{spinner:.cyan} Searching... {wide_bar:.cyan/blue} {percent:>3}% ({pos}/{len}) {msg}";

/// Renders a progress bar from the engine's event stream.
///
/// The thread exits once the engine drops its end of the channel.
pub fn spawn_reporter(events: Receiver<ProgressEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        let mut failed = 0u64;
        for event in events {
            match event {
                ProgressEvent::Discovered => bar.inc_length(1),
                ProgressEvent::WalkFinished { total } => bar.set_length(total as u64),
                ProgressEvent::Processed { .. } => bar.inc(1),
                ProgressEvent::Failed { .. } => {
                    failed += 1;
                    bar.set_message(format!("{} unreadable", failed));
                    bar.inc(1);
                }
            }
        }

        bar.finish_and_clear();
    })
}
