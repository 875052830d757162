//! Runs one speed test off the UI loop and reports back over a channel.

use crate::app::{App, Stage, TestEvent};
use crate::speedtest::{Metrics, SpeedTestBackend, SpeedTestError};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub struct TestController<B> {
    backend: B,
    events: Option<mpsc::Receiver<TestEvent>>,
}

impl<B: SpeedTestBackend> TestController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            events: None,
        }
    }

    /// Start a run unless one is already in progress.
    pub fn start(&mut self, app: &mut App) -> bool {
        if !app.start_test() {
            return false;
        }

        let (tx, rx) = mpsc::channel(8);
        self.events = Some(rx);

        let backend = self.backend.clone();
        tokio::spawn(async move {
            let mut backend = backend;
            run_speed_test(&mut backend, tx).await;
        });

        true
    }

    /// Next pending event, without waiting.
    pub fn poll(&mut self) -> Option<TestEvent> {
        let rx = self.events.as_mut()?;
        match rx.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.events = None;
                None
            }
        }
    }

    /// Wait for the next event of the current run.
    #[cfg(test)]
    pub async fn next_event(&mut self) -> Option<TestEvent> {
        let event = self.events.as_mut()?.recv().await;
        if event.is_none() {
            self.events = None;
        }
        event
    }
}

/// Drive the backend through every step and report a single outcome.
pub async fn run_speed_test<B: SpeedTestBackend>(backend: &mut B, tx: mpsc::Sender<TestEvent>) {
    let _ = tx.send(TestEvent::Started).await;

    let outcome = match measure(backend, &tx).await {
        Ok(metrics) => TestEvent::Succeeded(metrics),
        Err(e) => {
            warn!("speed test failed: {}", e);
            TestEvent::Failed {
                message: e.to_string(),
            }
        }
    };

    // The receiver is gone only when the UI has already shut down.
    let _ = tx.send(outcome).await;
}

async fn measure<B: SpeedTestBackend>(
    backend: &mut B,
    tx: &mpsc::Sender<TestEvent>,
) -> Result<Metrics, SpeedTestError> {
    let _ = tx.send(TestEvent::Stage(Stage::LocatingServer)).await;
    let server = backend.locate_best_server().await?;
    info!("testing against {}", server.url);

    let _ = tx.send(TestEvent::Stage(Stage::Download)).await;
    let download = backend.measure_download().await?;

    let _ = tx.send(TestEvent::Stage(Stage::Upload)).await;
    let upload = backend.measure_upload().await?;

    let ping_ms = backend.latency_ms()?;

    Ok(Metrics {
        download_mbps: download.mbps(),
        upload_mbps: upload.mbps(),
        ping_ms,
    })
}
