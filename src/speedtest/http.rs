use super::download::DownloadTest;
use super::ping;
use super::upload::UploadTest;
use super::{Server, SpeedTestBackend, SpeedTestError, Throughput};
use crate::settings::Settings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

/// Client shared by every step of a run.
///
/// Only stalls are bounded: a transfer may take as long as it needs while
/// data keeps arriving, so slow links still get a result.
pub fn build_client(read_timeout: Duration, connect_timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .read_timeout(read_timeout)
        .connect_timeout(connect_timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Backend speaking the `__down` / `__up` endpoint convention over HTTP.
#[derive(Clone)]
pub struct HttpSpeedTest {
    client: reqwest::Client,
    servers: Vec<String>,
    ping_count: usize,
    download_size: u64,
    upload_size: usize,
    upload_chunk: usize,
    server: Option<Server>,
}

impl HttpSpeedTest {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = build_client(settings.read_timeout(), settings.connect_timeout())?;

        Ok(Self {
            client,
            servers: settings.servers.clone(),
            ping_count: settings.ping_count,
            download_size: settings.download_size_bytes(),
            upload_size: settings.upload_size_bytes(),
            upload_chunk: settings.upload_chunk_bytes(),
            server: None,
        })
    }

    fn selected(&self) -> Result<&Server, SpeedTestError> {
        self.server.as_ref().ok_or(SpeedTestError::NoServerSelected)
    }
}

#[async_trait]
impl SpeedTestBackend for HttpSpeedTest {
    async fn locate_best_server(&mut self) -> Result<Server, SpeedTestError> {
        let server = ping::locate_best_server(&self.client, &self.servers, self.ping_count).await?;
        info!("selected {} ({:.1} ms)", server.url, server.latency_ms);
        self.server = Some(server.clone());
        Ok(server)
    }

    async fn measure_download(&mut self) -> Result<Throughput, SpeedTestError> {
        let url = self.selected()?.url.clone();
        DownloadTest::new(self.download_size).run(&self.client, &url).await
    }

    async fn measure_upload(&mut self) -> Result<Throughput, SpeedTestError> {
        let url = self.selected()?.url.clone();
        UploadTest::new(self.upload_size, self.upload_chunk)
            .run(&self.client, &url)
            .await
    }

    fn latency_ms(&self) -> Result<f64, SpeedTestError> {
        self.server
            .as_ref()
            .map(|s| s.latency_ms)
            .ok_or(SpeedTestError::NoLatency)
    }
}
