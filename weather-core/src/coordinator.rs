use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::worker::Completion;

/// How the coordinator finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// Run-once mode saw its first successful cycle; the process should exit.
    RunOnceComplete,
    /// The worker stopped; no more completions will arrive.
    WorkerGone,
}

/// Counts successful cycles and owns the run-once exit decision.
#[derive(Debug, Clone, Default)]
pub struct Coordinator {
    run_once: bool,
    completed: u64,
}

impl Coordinator {
    pub fn new(run_once: bool) -> Self {
        Self { run_once, completed: 0 }
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Count one completion. Returns `true` when the process should exit.
    pub fn record(&mut self) -> bool {
        self.completed += 1;
        self.run_once && self.completed == 1
    }

    pub async fn run(mut self, mut completions: mpsc::Receiver<Completion>) -> Shutdown {
        while let Some(completion) = completions.recv().await {
            if self.record() {
                info!("first refresh rendered, exiting (run once)");
                // Dropping the completion unacknowledged keeps the worker from
                // starting another cycle.
                return Shutdown::RunOnceComplete;
            }
            debug!(completed = self.completed, "refresh completed");
            completion.acknowledge();
        }

        Shutdown::WorkerGone
    }
}
