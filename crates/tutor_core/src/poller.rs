//! crates/tutor_core/src/poller.rs
//!
//! A cancellable background task that polls a generation job until the vendor
//! reports a terminal status.
//!
//! One poller tracks at most one job at a time. Each tick issues a single
//! status request and the next tick is scheduled only after that request has
//! resolved, so ticks never overlap even when the vendor is slower than the
//! interval. Consumers read the latest resolved state through a `watch`
//! channel obtained from [`JobStatusPoller::subscribe`].

use crate::domain::{GenerationJob, JobStatus};
use crate::ports::JobStatusSource;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Interval between two status requests unless configured otherwise.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// How many terminal jobs a poller remembers. The oldest is forgotten first.
pub const FINISHED_CAPACITY: usize = 32;

/// What consumers of a poller observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// No job identifier has been supplied, or polling was stopped.
    Idle,
    /// The job is not terminal yet.
    Polling {
        job_id: String,
        /// Last record returned by the vendor, if any tick succeeded.
        last: Option<GenerationJob>,
        /// Set when the most recent status request failed.
        error: Option<String>,
    },
    Completed(GenerationJob),
    Failed(GenerationJob),
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PollState::Completed(_) | PollState::Failed(_))
    }

    fn terminal(job: GenerationJob) -> Self {
        match job.status {
            JobStatus::Failed => PollState::Failed(job),
            _ => PollState::Completed(job),
        }
    }
}

struct ActivePoll {
    job_id: String,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Handle owning the polling task. Dropping it stops the task.
pub struct JobStatusPoller<S: ?Sized> {
    source: Arc<S>,
    interval: Duration,
    state: watch::Sender<PollState>,
    active: Option<ActivePoll>,
    /// Stopped tasks by job id, awaited before that id is polled again.
    retired: HashMap<String, JoinHandle<()>>,
    /// Recent jobs that reached a terminal status. They are never queried again.
    finished: Arc<Mutex<VecDeque<GenerationJob>>>,
}

impl<S> JobStatusPoller<S>
where
    S: JobStatusSource + ?Sized + 'static,
{
    pub fn new(source: Arc<S>) -> Self {
        let (state, _) = watch::channel(PollState::Idle);
        Self {
            source,
            interval: DEFAULT_POLL_INTERVAL,
            state,
            active: None,
            retired: HashMap::new(),
            finished: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Subscribes to state changes. The receiver always holds the latest state.
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.subscribe()
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> PollState {
        self.state.borrow().clone()
    }

    /// The identifier currently being tracked, if any.
    pub fn job_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.job_id.as_str())
    }

    /// Starts polling `job_id`, replacing any other job being tracked.
    ///
    /// An empty identifier disables polling. Restarting the job that is
    /// already tracked is a no-op.
    pub fn start(&mut self, job_id: impl Into<String>) {
        let job_id = job_id.into();
        if job_id.is_empty() {
            self.stop();
            return;
        }
        if self.job_id() == Some(job_id.as_str()) {
            return;
        }
        self.stop();

        let known_terminal = self.finished_job(&job_id);
        if let Some(job) = known_terminal {
            debug!(job_id = %job_id, "Job already terminal; not polling again.");
            self.state.send_replace(PollState::terminal(job));
            return;
        }

        // A stopped task for the same job may still have a request in flight.
        let previous = self.retired.remove(&job_id);

        info!(job_id = %job_id, interval = ?self.interval, "Starting job status polling.");
        self.state.send_replace(PollState::Polling {
            job_id: job_id.clone(),
            last: None,
            error: None,
        });

        let token = CancellationToken::new();
        let handle = tokio::spawn(poll_job(
            self.source.clone(),
            job_id.clone(),
            self.interval,
            self.state.clone(),
            token.clone(),
            previous,
            self.finished.clone(),
        ));
        self.active = Some(ActivePoll {
            job_id,
            token,
            handle,
        });
    }

    /// Stops scheduling further ticks and resets the state to `Idle`.
    ///
    /// A request already in flight is allowed to finish but its result is discarded.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(job_id = %active.job_id, "Stopping job status polling.");
            active.token.cancel();
            self.retired.retain(|_, handle| !handle.is_finished());
            self.retired.insert(active.job_id, active.handle);
        }
        self.state.send_replace(PollState::Idle);
    }

    fn finished_job(&self, job_id: &str) -> Option<GenerationJob> {
        self.finished
            .lock()
            .ok()
            .and_then(|f| f.iter().find(|job| job.id == job_id).cloned())
    }
}

impl<S: ?Sized> Drop for JobStatusPoller<S> {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.token.cancel();
        }
    }
}

/// The polling loop for one job.
async fn poll_job<S>(
    source: Arc<S>,
    job_id: String,
    interval: Duration,
    state: watch::Sender<PollState>,
    token: CancellationToken,
    previous: Option<JoinHandle<()>>,
    finished: Arc<Mutex<VecDeque<GenerationJob>>>,
) where
    S: JobStatusSource + ?Sized,
{
    if let Some(previous) = previous {
        let _ = previous.await;
    }

    loop {
        if token.is_cancelled() {
            return;
        }

        let outcome = source.fetch_status(&job_id).await;

        match outcome {
            Ok(job) if job.status.is_terminal() => {
                info!(job_id = %job_id, status = ?job.status, "Job reached a terminal status.");
                if let Ok(mut finished) = finished.lock() {
                    if finished.len() >= FINISHED_CAPACITY {
                        finished.pop_front();
                    }
                    finished.push_back(job.clone());
                }
                publish(&state, &token, |s| {
                    *s = PollState::terminal(job);
                    true
                });
                return;
            }
            Ok(job) => {
                debug!(job_id = %job_id, status = ?job.status, "Job still running.");
                publish(&state, &token, |s| {
                    *s = PollState::Polling {
                        job_id: job_id.clone(),
                        last: Some(job),
                        error: None,
                    };
                    true
                });
            }
            Err(e) => {
                warn!(job_id = %job_id, "Status request failed: {}", e);
                let message = e.to_string();
                publish(&state, &token, |s| record_error(s, message));
            }
        }

        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

/// Applies `update` unless the task was cancelled. The check runs under the
/// channel's write lock, so a concurrent `stop()` can never be overwritten.
/// Subscribers are notified only when `update` reports a change.
fn publish(
    state: &watch::Sender<PollState>,
    token: &CancellationToken,
    update: impl FnOnce(&mut PollState) -> bool,
) {
    state.send_if_modified(|s| {
        if token.is_cancelled() {
            return false;
        }
        update(s)
    });
}

/// Attaches a request failure to a polling state. Other states are left alone.
fn record_error(state: &mut PollState, message: String) -> bool {
    match state {
        PollState::Polling { error, .. } => {
            *error = Some(message);
            true
        }
        _ => false,
    }
}
