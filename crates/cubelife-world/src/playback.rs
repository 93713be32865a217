//! Cancellable tick playback.
//!
//! Ticks run on a tokio task. Between ticks the task waits for the tick
//! duration or for cancellation, whichever comes first. A tick is never
//! interrupted: cancellation is only observed before a tick starts or while
//! waiting between ticks.

use crate::simulation::TickReport;
use cubelife_core::{Error, Result, RunId, Stats};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How a playback run ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSummary {
    pub run_id: RunId,
    pub requested_ticks: u64,
    pub completed_ticks: u64,
    /// True if the run stopped before all requested ticks were executed
    pub cancelled: bool,
    /// Stats from the last completed tick, if any
    pub final_stats: Option<Stats>,
}

/// Caller's side of a running playback.
///
/// Reports arrive in tick order. Dropping the handle does not stop the run;
/// call [`PlaybackHandle::cancel`] for that.
pub struct PlaybackHandle {
    run_id: RunId,
    reports: mpsc::UnboundedReceiver<TickReport>,
    cancel: CancellationToken,
    task: JoinHandle<Result<PlaybackSummary>>,
}

impl PlaybackHandle {
    pub(crate) fn new(
        run_id: RunId,
        reports: mpsc::UnboundedReceiver<TickReport>,
        cancel: CancellationToken,
        task: JoinHandle<Result<PlaybackSummary>>,
    ) -> Self {
        Self {
            run_id,
            reports,
            cancel,
            task,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Wait for the next completed tick. Returns `None` once the run has ended
    /// and every report has been received.
    pub async fn next_report(&mut self) -> Option<TickReport> {
        self.reports.recv().await
    }

    /// Request cancellation; takes effect at the next tick boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the run to end. Reports not yet received are discarded.
    pub async fn finish(self) -> Result<PlaybackSummary> {
        self.task
            .await
            .map_err(|e| Error::InvalidState(format!("playback task failed: {}", e)))?
    }
}

/// Drive `step` up to `tick_count` times, sending each report to `reports`.
///
/// `step` must execute one whole tick; it is never called once `cancel` has
/// fired. A closed receiver does not stop the run.
pub async fn drive<F>(
    run_id: RunId,
    tick_count: u64,
    tick_duration: Duration,
    cancel: CancellationToken,
    reports: mpsc::UnboundedSender<TickReport>,
    mut step: F,
) -> Result<PlaybackSummary>
where
    F: FnMut() -> Result<TickReport>,
{
    info!(%run_id, tick_count, ?tick_duration, "Starting playback");

    let mut completed = 0;
    let mut final_stats = None;
    let mut receiver_gone = false;

    while completed < tick_count {
        if cancel.is_cancelled() {
            break;
        }

        let mut report = step()?;
        completed += 1;
        report.remaining = tick_count - completed;
        final_stats = Some(report.stats);

        if reports.send(report).is_err() && !receiver_gone {
            debug!(%run_id, "Report receiver dropped, continuing without reporting");
            receiver_gone = true;
        }

        if completed < tick_count {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(tick_duration) => {}
            }
        }
    }

    let cancelled = completed < tick_count;
    if cancelled {
        warn!(%run_id, completed, tick_count, "Playback cancelled");
    } else {
        info!(%run_id, completed, "Playback complete");
    }

    Ok(PlaybackSummary {
        run_id,
        requested_ticks: tick_count,
        completed_ticks: completed,
        cancelled,
        final_stats,
    })
}
