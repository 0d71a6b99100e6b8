//! Merges timer ticks and `SIGUSR1` into one stream of refresh requests.
//!
//! The request channel has a single slot. A trigger that arrives while a
//! request is already waiting is dropped, so a burst during a slow cycle
//! results in exactly one follow-up cycle.

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinError;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::coordinator::{Coordinator, Shutdown};
use crate::provider::WeatherFetcher;
use crate::render::WeatherTemplate;
use crate::worker::{RefreshRequest, RefreshWorker};

/// What caused a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    Timer,
    Signal,
}

/// A source of refresh triggers. `None` means it will never fire again.
#[async_trait]
pub trait TriggerSource: Send {
    async fn next_trigger(&mut self) -> Option<Trigger>;
}

/// Manually driven triggers, e.g. from another part of an embedding program.
#[async_trait]
impl TriggerSource for mpsc::Receiver<Trigger> {
    async fn next_trigger(&mut self) -> Option<Trigger> {
        self.recv().await
    }
}

/// Fixed-interval timer plus the `SIGUSR1` listener.
#[derive(Debug)]
pub struct IntervalSignalTriggers {
    ticks: Interval,
    signal: RefreshSignal,
}

impl IntervalSignalTriggers {
    /// The first tick fires one `period` from now. Must be called inside a
    /// Tokio runtime.
    pub fn new(period: Duration) -> std::io::Result<Self> {
        let start = Instant::now().checked_add(period).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("refresh interval too long: {}", humantime::format_duration(period)),
            )
        })?;
        let mut ticks = interval_at(start, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Ok(Self { ticks, signal: RefreshSignal::register()? })
    }
}

#[async_trait]
impl TriggerSource for IntervalSignalTriggers {
    async fn next_trigger(&mut self) -> Option<Trigger> {
        tokio::select! {
            _ = self.ticks.tick() => Some(Trigger::Timer),
            () = self.signal.recv() => Some(Trigger::Signal),
        }
    }
}

/// `SIGUSR1` listener. Never fires on platforms without it.
#[derive(Debug)]
struct RefreshSignal {
    #[cfg(unix)]
    inner: Option<tokio::signal::unix::Signal>,
}

impl RefreshSignal {
    #[cfg(unix)]
    fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};
        Ok(Self { inner: Some(signal(SignalKind::user_defined1())?) })
    }

    #[cfg(not(unix))]
    fn register() -> std::io::Result<Self> {
        Ok(Self {})
    }

    #[cfg(unix)]
    async fn recv(&mut self) {
        if let Some(inner) = self.inner.as_mut() {
            if inner.recv().await.is_some() {
                return;
            }
            self.inner = None;
        }
        std::future::pending().await
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) {
        std::future::pending().await
    }
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("completion coordinator failed: {0}")]
    Coordinator(#[from] JoinError),
}

/// Owns the channels and the worker and coordinator tasks.
#[derive(Debug)]
pub struct Scheduler<F, W> {
    config: RunConfig,
    fetcher: F,
    template: WeatherTemplate,
    sink: W,
}

impl<F, W> Scheduler<F, W>
where
    F: WeatherFetcher + 'static,
    W: Write + Send + 'static,
{
    pub fn new(config: RunConfig, fetcher: F, template: WeatherTemplate, sink: W) -> Self {
        Self { config, fetcher, template, sink }
    }

    /// Refresh once now and then on every trigger.
    ///
    /// Returns only when run-once mode is satisfied; otherwise it keeps the
    /// caller alive, even after the worker has stopped on an error.
    pub async fn run<T: TriggerSource>(self, mut triggers: T) -> Result<(), SchedulerError> {
        let Self { config, fetcher, template, sink } = self;

        let (request_tx, request_rx) = mpsc::channel(1);
        let (completion_tx, completion_rx) = mpsc::channel(1);

        let worker = RefreshWorker::new(config.location_id.clone(), fetcher, template, sink);
        let worker = tokio::spawn(worker.run(request_rx, completion_tx));
        let mut coordinator = tokio::spawn(Coordinator::new(config.run_once).run(completion_rx));

        info!(
            location = %config.location_id,
            fetch_delay = %humantime::format_duration(config.fetch_delay),
            run_once = config.run_once,
            "weather feed started"
        );
        forward(&request_tx, Trigger::Startup);

        let mut coordinator_running = true;
        let mut triggers_open = true;

        loop {
            tokio::select! {
                shutdown = &mut coordinator, if coordinator_running => match shutdown? {
                    Shutdown::RunOnceComplete => {
                        worker.abort();
                        return Ok(());
                    }
                    Shutdown::WorkerGone => {
                        info!("refresh worker stopped, waiting for external termination");
                        coordinator_running = false;
                    }
                },
                trigger = triggers.next_trigger(), if triggers_open => match trigger {
                    Some(trigger) => {
                        forward(&request_tx, trigger);
                    }
                    None => {
                        debug!("trigger source exhausted");
                        triggers_open = false;
                    }
                },
                else => std::future::pending::<()>().await,
            }
        }
    }
}

/// Hand a request to the worker without waiting.
///
/// Returns `true` if a new request was queued.
pub fn forward(requests: &mpsc::Sender<RefreshRequest>, trigger: Trigger) -> bool {
    match requests.try_send(RefreshRequest) {
        Ok(()) => {
            debug!(?trigger, "refresh requested");
            true
        }
        Err(TrySendError::Full(_)) => {
            debug!(?trigger, "refresh already pending, trigger coalesced");
            false
        }
        Err(TrySendError::Closed(_)) => {
            debug!(?trigger, "refresh worker stopped, trigger ignored");
            false
        }
    }
}
