//! The single consumer of refresh requests.
//!
//! A worker owns the output sink and runs one fetch-render cycle per request,
//! strictly in order. The first failed cycle stops it for good; the process is
//! left running.

use std::io::Write;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::model::WeatherRecord;
use crate::provider::WeatherFetcher;
use crate::render::{RenderError, WeatherTemplate};

/// "Perform one fetch-render cycle now."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshRequest;

/// "One cycle finished successfully."
///
/// The worker does not start its next cycle until the completion has been
/// acknowledged, so a coordinator that decides to exit can drop it instead and
/// no further output is produced.
#[derive(Debug)]
pub struct Completion {
    pub(crate) ack: oneshot::Sender<()>,
}

impl Completion {
    pub fn acknowledge(self) {
        // The worker may already be gone; nothing to do then.
        let _ = self.ack.send(());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every request sender was dropped.
    ChannelClosed,
    FetchFailed,
    RenderFailed,
    /// The completion was not acknowledged.
    CompletionRefused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerExit {
    pub reason: StopReason,
    pub completed: u64,
}

#[derive(Debug)]
pub struct RefreshWorker<F, W> {
    location_id: String,
    fetcher: F,
    template: WeatherTemplate,
    sink: W,
}

impl<F, W> RefreshWorker<F, W>
where
    F: WeatherFetcher,
    W: Write + Send,
{
    pub fn new(location_id: String, fetcher: F, template: WeatherTemplate, sink: W) -> Self {
        Self { location_id, fetcher, template, sink }
    }

    /// Process requests until the channel closes or a cycle fails.
    pub async fn run(
        mut self,
        mut requests: mpsc::Receiver<RefreshRequest>,
        completions: mpsc::Sender<Completion>,
    ) -> WorkerExit {
        let mut completed = 0;

        while requests.recv().await.is_some() {
            if let Err(reason) = self.cycle().await {
                error!(location = %self.location_id, ?reason, "refreshing stopped");
                return WorkerExit { reason, completed };
            }
            completed += 1;

            let (ack, acked) = oneshot::channel();
            if completions.send(Completion { ack }).await.is_err() || acked.await.is_err() {
                info!(completed, "completion not acknowledged, refreshing stopped");
                return WorkerExit { reason: StopReason::CompletionRefused, completed };
            }
        }

        info!(completed, "refresh requests closed");
        WorkerExit { reason: StopReason::ChannelClosed, completed }
    }

    async fn cycle(&mut self) -> Result<(), StopReason> {
        debug!(location = %self.location_id, "refreshing weather");

        let record = self.fetcher.fetch(&self.location_id).await.map_err(|err| {
            error!(error = %err, "weather fetch failed");
            StopReason::FetchFailed
        })?;
        log_fetched(&record);

        self.write(&record).map_err(|err| {
            error!(error = %err, "weather render failed");
            StopReason::RenderFailed
        })
    }

    fn write(&mut self, record: &WeatherRecord) -> Result<(), RenderError> {
        self.template.render_to(&mut self.sink, record)?;
        self.sink.flush()?;
        Ok(())
    }
}

fn log_fetched(record: &WeatherRecord) {
    match record.observed_at() {
        Some(at) => info!(location = %record.name, observed_at = %at, "fetched weather"),
        None => info!(location = %record.name, "fetched weather"),
    }
}
