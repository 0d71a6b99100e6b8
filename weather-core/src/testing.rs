//! Test doubles shared by the worker and scheduler tests.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Semaphore;

use crate::model::{MainReadings, Temperature, WeatherRecord};
use crate::provider::{FetchError, WeatherFetcher};

/// Returns canned records named after `names`, cycling through them.
#[derive(Debug, Clone)]
pub struct FakeFetcher {
    names: Arc<Vec<String>>,
    calls: Arc<AtomicUsize>,
    fail_on: Option<usize>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeFetcher {
    pub fn sequence<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: Arc::new(names.into_iter().map(Into::into).collect()),
            calls: Arc::new(AtomicUsize::new(0)),
            fail_on: None,
            gate: None,
        }
    }

    pub fn named(name: &str) -> Self {
        Self::sequence([name])
    }

    /// Fail the `call`-th fetch (1-based) with an HTTP 500.
    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on = Some(call);
        self
    }

    /// Every fetch waits for a permit from `gate`.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherFetcher for FakeFetcher {
    async fn fetch(&self, _location_id: &str) -> Result<WeatherRecord, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        if self.fail_on == Some(call) {
            return Err(FetchError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".into(),
            });
        }

        Ok(WeatherRecord {
            name: self.names[(call - 1) % self.names.len()].clone(),
            main: MainReadings { temp: Temperature::from_kelvin(295.15), ..Default::default() },
            ..Default::default()
        })
    }
}

/// Cloneable in-memory sink.
#[derive(Debug, Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().expect("poisoned").clone()).expect("utf-8 output")
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("poisoned").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
