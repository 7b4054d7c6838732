// crates/client/src/poller.rs
//! The job polling engine.
//!
//! A cancellable arm/disarm cycle around a fixed-interval fetch of the job
//! collection. Each tick replaces the whole in-memory snapshot with one
//! consistent server read — no incremental merging, so consumers can never
//! observe a list that mixes two reads.
//!
//! Concurrency rules upheld here:
//! - at most one cycle is armed per engine; `start` disarms first
//! - ticks are serialized (a new fetch is not issued until the prior one
//!   completed), so responses cannot apply out of issuance order
//! - after `stop()` returns, no further snapshot mutation occurs — an
//!   in-flight response loses the cancellation race and is discarded

use std::sync::Arc;
use std::time::Duration;

use morphbox_types::{ConversionJob, JobPage, JobStatus};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::transport::Transport;

/// Which jobs a polling cycle asks the server for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFilter {
    All,
    Status(JobStatus),
}

impl JobFilter {
    fn as_query(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::All => None,
            Self::Status(status) => Some(("status", status.as_str())),
        }
    }
}

/// When a cycle disarms itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPolicy {
    /// Keep ticking until `stop()` — other clients may add jobs at any
    /// time, so the list can always change.
    #[default]
    Continuous,
    /// Disarm once a non-empty snapshot is fully terminal; no background
    /// load once everything has settled.
    UntilSettled,
}

/// Engine state as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
}

/// One fetch of the job collection: a single page, single server read.
pub async fn list_jobs(transport: &Transport, filter: JobFilter) -> Result<Vec<ConversionJob>> {
    let page: JobPage = match filter.as_query() {
        Some((key, value)) => transport.get_json("/jobs/", &[(key, value)]).await?,
        None => transport.get_json("/jobs/", &[]).await?,
    };
    Ok(page.results)
}

struct Cycle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// Fixed-interval poller over the job collection.
pub struct JobPoller {
    transport: Arc<Transport>,
    interval: Duration,
    snapshot: watch::Sender<Arc<Vec<ConversionJob>>>,
    cycle: Mutex<Option<Cycle>>,
}

impl JobPoller {
    pub fn new(transport: Arc<Transport>, interval: Duration) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            transport,
            interval,
            snapshot,
            cycle: Mutex::new(None),
        }
    }

    /// Arm a polling cycle for `filter`. A running cycle is disarmed
    /// first, so changing the filter restarts cleanly and two concurrent
    /// cycles can never tick against the same snapshot.
    pub async fn start(&self, filter: JobFilter, policy: PollPolicy) {
        self.stop().await;
        let token = CancellationToken::new();
        let task = tokio::spawn(run_cycle(
            Arc::clone(&self.transport),
            self.interval,
            filter,
            policy,
            self.snapshot.clone(),
            token.clone(),
        ));
        *self.cycle.lock().await = Some(Cycle { token, task });
    }

    /// Disarm. When this returns the cycle task has fully exited: no
    /// snapshot mutation can happen afterwards, including from a tick
    /// that was in flight at call time.
    pub async fn stop(&self) {
        let cycle = self.cycle.lock().await.take();
        if let Some(Cycle { token, task }) = cycle {
            token.cancel();
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::error!(error = %e, "polling cycle task panicked");
                }
            }
        }
    }

    pub async fn state(&self) -> PollerState {
        match self.cycle.lock().await.as_ref() {
            Some(cycle) if !cycle.task.is_finished() => PollerState::Polling,
            _ => PollerState::Idle,
        }
    }

    /// Watch the snapshot. Each received value is one complete server
    /// read, replaced atomically.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<ConversionJob>>> {
        self.snapshot.subscribe()
    }

    /// The last good snapshot (empty before the first successful tick).
    pub fn jobs(&self) -> Arc<Vec<ConversionJob>> {
        self.snapshot.borrow().clone()
    }
}

async fn run_cycle(
    transport: Arc<Transport>,
    interval: Duration,
    filter: JobFilter,
    policy: PollPolicy,
    snapshot: watch::Sender<Arc<Vec<ConversionJob>>>,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    // a slow fetch delays the next tick instead of bursting to catch up;
    // this is what serializes ticks
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let fetched = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            res = list_jobs(&transport, filter) => res,
        };

        match fetched {
            Ok(jobs) => {
                let settled = policy == PollPolicy::UntilSettled
                    && !jobs.is_empty()
                    && jobs.iter().all(|j| j.status.is_terminal());
                snapshot.send_replace(Arc::new(jobs));
                if settled {
                    tracing::debug!("all jobs terminal, polling cycle settles");
                    break;
                }
            }
            Err(Error::Unauthorized) => {
                // session is already cleared; re-auth is the only recovery
                tracing::warn!("polling stopped: session invalidated");
                break;
            }
            Err(e) => {
                // stale-but-consistent beats empty-and-wrong
                tracing::warn!(error = %e, "job poll failed, keeping last snapshot");
            }
        }
    }
}
