pub mod download;
pub mod error;
pub mod http;
pub mod ping;
pub mod upload;

#[cfg(test)]
mod test_server;

use async_trait::async_trait;
use std::time::Duration;

pub use error::SpeedTestError;
pub use http::HttpSpeedTest;

/// A measurement server picked by latency.
#[derive(Debug, Clone, PartialEq)]
pub struct Server {
    pub url: String,
    pub latency_ms: f64,
}

/// Transfer rate in bits per second, with the payload it was measured over.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Throughput {
    pub bits_per_sec: f64,
    pub bytes: u64,
}

impl Throughput {
    pub fn from_transfer(bytes: u64, elapsed: Duration) -> Result<Self, SpeedTestError> {
        let secs = elapsed.as_secs_f64();
        if bytes == 0 || secs <= 0.0 {
            return Err(SpeedTestError::EmptyTransfer);
        }
        Ok(Self {
            bits_per_sec: bytes as f64 * 8.0 / secs,
            bytes,
        })
    }

    pub fn mbps(&self) -> f64 {
        self.bits_per_sec / 1_000_000.0
    }
}

/// Results of one complete run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub ping_ms: f64,
}

/// The network measurement capability the worker drives.
///
/// Each run works on its own clone, so implementations may keep per-run
/// state such as the selected server and the latency measured against it.
#[async_trait]
pub trait SpeedTestBackend: Clone + Send + Sync + 'static {
    async fn locate_best_server(&mut self) -> Result<Server, SpeedTestError>;

    async fn measure_download(&mut self) -> Result<Throughput, SpeedTestError>;

    async fn measure_upload(&mut self) -> Result<Throughput, SpeedTestError>;

    /// Latency to the selected server from the most recent measurement.
    fn latency_ms(&self) -> Result<f64, SpeedTestError>;
}
