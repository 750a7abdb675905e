//! Background delivery of "mark seen" reports
//!
//! Swipe sessions hand reports to a [`SeenSink`] and move on. The reporter
//! behind that sink queues them on an unbounded channel and a single task
//! writes them to the watch history one at a time, so they land in the order
//! the cards were swiped. A failed write is logged and dropped; the session
//! never hears about it.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{
    db::WatchHistory,
    models::{MarkSeen, UserId},
    services::swipe::SeenSink,
};

struct SeenReport {
    user_id: UserId,
    command: MarkSeen,
}

/// Queue in front of the watch history store
#[derive(Clone)]
pub struct SeenReporter {
    report_tx: mpsc::UnboundedSender<SeenReport>,
}

/// Handle for flushing and stopping the reporter task
pub struct ReporterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl ReporterHandle {
    /// Writes every queued report, then stops the task
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Seen reporter task failed");
        }
    }
}

impl SeenReporter {
    /// Spawns the reporter task; must be called from within a tokio runtime
    pub fn new(history: Arc<dyn WatchHistory>) -> (Self, ReporterHandle) {
        let (report_tx, report_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let task = tokio::spawn(Self::reporter_task(history, report_rx, shutdown_rx));

        (Self { report_tx }, ReporterHandle { shutdown_tx, task })
    }

    /// Sink that reports on behalf of `user_id`
    pub fn for_user(&self, user_id: UserId) -> UserSeenSink {
        UserSeenSink {
            user_id,
            reporter: self.clone(),
        }
    }

    fn dispatch(&self, user_id: UserId, command: MarkSeen) {
        let title_id = command.title_id;
        if self.report_tx.send(SeenReport { user_id, command }).is_err() {
            tracing::warn!(
                user_id = %user_id,
                title_id,
                "Seen reporter stopped; report dropped"
            );
        }
    }

    async fn reporter_task(
        history: Arc<dyn WatchHistory>,
        mut report_rx: mpsc::UnboundedReceiver<SeenReport>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Seen reporter task started");

        loop {
            tokio::select! {
                Some(report) = report_rx.recv() => {
                    Self::deliver(history.as_ref(), report).await;
                }
                _ = shutdown_rx.recv() => {
                    report_rx.close();
                    let mut flushed = 0usize;
                    while let Some(report) = report_rx.recv().await {
                        Self::deliver(history.as_ref(), report).await;
                        flushed += 1;
                    }

                    tracing::info!(flushed, "Seen reporter task stopped");
                    break;
                }
            }
        }
    }

    async fn deliver(history: &dyn WatchHistory, report: SeenReport) {
        let SeenReport { user_id, command } = report;
        match history.mark_seen(user_id, &command).await {
            Ok(()) => tracing::info!(
                user_id = %user_id,
                title_id = command.title_id,
                media_kind = %command.media_kind,
                "Title marked seen"
            ),
            Err(e) => tracing::error!(
                error = %e,
                user_id = %user_id,
                title_id = command.title_id,
                "Failed to mark title seen"
            ),
        }
    }
}

/// [`SeenSink`] bound to one user
#[derive(Clone)]
pub struct UserSeenSink {
    user_id: UserId,
    reporter: SeenReporter,
}

impl SeenSink for UserSeenSink {
    fn mark_seen(&self, command: MarkSeen) {
        self.reporter.dispatch(self.user_id, command);
    }
}
