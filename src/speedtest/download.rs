use super::{SpeedTestError, Throughput};
use futures::StreamExt;
use std::time::Instant;
use tracing::debug;

pub struct DownloadTest {
    download_size: u64,
}

impl DownloadTest {
    pub fn new(download_size: u64) -> Self {
        Self { download_size }
    }

    pub async fn run(&self, client: &reqwest::Client, base_url: &str) -> Result<Throughput, SpeedTestError> {
        let url = format!("{}/__down?bytes={}", base_url, self.download_size);
        let response = client.get(&url).send().await?.error_for_status()?;
        let mut stream = response.bytes_stream();

        let start = Instant::now();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            downloaded += chunk?.len() as u64;
        }

        let elapsed = start.elapsed();
        debug!("downloaded {} bytes in {:?}", downloaded, elapsed);

        Throughput::from_transfer(downloaded, elapsed)
    }
}
