//! The poll loop.
//!
//! Once per interval every configured source is fetched concurrently,
//! each host's rows are filtered, the results are merged by job name and
//! the finished `Snapshot` is moved to the coordination loop. The first
//! source failure is forwarded as `PollUpdate::Failed` and ends the loop.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use queuetop_network::{fetch_all, SourceError, StatusSource};
use queuetop_protocol::Snapshot;
use queuetop_state::{merge, Filter};

/// Capacity of the poll update channel.
pub const UPDATE_QUEUE_DEPTH: usize = 4;

/// Message from the poll loop to the coordination loop.
#[derive(Debug)]
pub enum PollUpdate {
    Snapshot(Snapshot),
    Failed(SourceError),
}

pub struct Poller<S> {
    sources: Vec<S>,
    filter: Filter,
    interval: Duration,
}

impl<S: StatusSource> Poller<S> {
    pub fn new(sources: Vec<S>, filter: Filter, interval: Duration) -> Self {
        Self {
            sources,
            filter,
            interval,
        }
    }

    pub fn host_count(&self) -> usize {
        self.sources.len()
    }

    /// Run a single poll cycle.
    pub async fn poll_once(&mut self) -> Result<Snapshot, SourceError> {
        let per_host = fetch_all(&mut self.sources).await?;
        let filter = &self.filter;
        let rows = merge(per_host.into_iter().map(|mut rows| {
            filter.apply(&mut rows);
            rows
        }));
        Ok(Snapshot::new(rows, self.sources.len()))
    }

    /// Poll until a source fails or the receiving side goes away.
    pub async fn run(mut self, updates: mpsc::Sender<PollUpdate>) {
        tracing::info!(
            hosts = self.sources.len(),
            interval_ms = self.interval.as_millis() as u64,
            "Status poller started"
        );

        loop {
            let start = Instant::now();
            let update = match self.poll_once().await {
                Ok(snapshot) => {
                    tracing::debug!(
                        rows = snapshot.len(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Poll cycle complete"
                    );
                    PollUpdate::Snapshot(snapshot)
                }
                Err(e) => {
                    tracing::error!(host = %e.host(), error = %e, "Status poll failed");
                    let _ = updates.send(PollUpdate::Failed(e)).await;
                    return;
                }
            };

            if updates.send(update).await.is_err() {
                tracing::debug!("Dashboard gone, stopping poller");
                return;
            }

            tokio::time::sleep(self.interval.saturating_sub(start.elapsed())).await;
        }
    }
}
