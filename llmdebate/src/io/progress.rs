//! Cosmetic progress feedback while a backend call is in flight.
//!
//! Events travel over an `mpsc` channel to a reporter thread that owns the
//! spinner. Nothing flows back, and the debate never waits on the reporter.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A backend call started; `label` names the speaker (e.g. `round 2 defender`).
    Started { label: String },
    /// One streamed chunk (or output line) arrived.
    Chunk,
    /// The current call returned, successfully or not.
    Finished,
}

pub type ProgressSender = Sender<ProgressEvent>;

/// Send `event` if a reporter is attached. A gone reporter is ignored.
pub fn notify(sender: Option<&ProgressSender>, event: ProgressEvent) {
    if let Some(sender) = sender {
        sender.send(event).ok();
    }
}

/// Handle for the reporter thread; dropping the last sender ends it.
pub struct ProgressReporter {
    handle: JoinHandle<()>,
}

impl ProgressReporter {
    /// Spawn a spinner thread and return it together with its event sender.
    pub fn spawn() -> (Self, ProgressSender) {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || drive_spinner(rx));
        (Self { handle }, tx)
    }

    /// Wait for the reporter to drain. All senders must be dropped first.
    pub fn join(self) {
        self.handle.join().ok();
    }
}

fn drive_spinner(rx: Receiver<ProgressEvent>) {
    let style = ProgressStyle::with_template("{spinner} [{elapsed}] {msg} ({pos} chunks)")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let mut bar: Option<ProgressBar> = None;

    for event in rx {
        match event {
            ProgressEvent::Started { label } => {
                if let Some(previous) = bar.take() {
                    previous.finish_and_clear();
                }
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(style.clone());
                spinner.set_message(label);
                spinner.enable_steady_tick(Duration::from_millis(120));
                bar = Some(spinner);
            }
            ProgressEvent::Chunk => {
                if let Some(spinner) = &bar {
                    spinner.inc(1);
                }
            }
            ProgressEvent::Finished => {
                if let Some(spinner) = bar.take() {
                    spinner.finish_and_clear();
                }
            }
        }
    }

    if let Some(spinner) = bar {
        spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_without_reporter_is_a_no_op() {
        notify(None, ProgressEvent::Chunk);
    }

    #[test]
    fn notify_ignores_dropped_receiver() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        notify(Some(&tx), ProgressEvent::Finished);
    }

    #[test]
    fn reporter_exits_when_senders_drop() {
        let (reporter, tx) = ProgressReporter::spawn();
        notify(
            Some(&tx),
            ProgressEvent::Started {
                label: "round 1 challenger".to_string(),
            },
        );
        notify(Some(&tx), ProgressEvent::Chunk);
        notify(Some(&tx), ProgressEvent::Finished);
        drop(tx);
        reporter.join();
    }
}
