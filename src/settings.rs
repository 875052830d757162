use anyhow::{ensure, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SERVER: &str = "https://speed.cloudflare.com";

#[derive(Debug, Clone)]
pub struct Settings {
    pub servers: Vec<String>,
    pub ping_count: usize,
    pub download_size_mb: u64,
    pub upload_size_mb: u64,
    pub upload_chunk_kb: usize,
    /// How long a transfer may go without receiving data before it fails.
    pub read_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub tick_ms: u64,

    // Decorative panel
    pub image_path: Option<PathBuf>,
    pub image_width: u32,
    pub image_height: u32,

    pub log_file: PathBuf,
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            servers: vec![DEFAULT_SERVER.to_string()],
            ping_count: 5,
            download_size_mb: 25,
            upload_size_mb: 10,
            upload_chunk_kb: 1000,
            read_timeout_secs: 30,
            connect_timeout_secs: 10,
            tick_ms: 30,
            image_path: Some(PathBuf::from("assets/speedcheck.png")),
            image_width: 40,
            image_height: 48,
            log_file: std::env::temp_dir().join("speedcheck.log"),
            verbose: false,
        }
    }
}

impl Settings {
    pub fn download_size_bytes(&self) -> u64 {
        self.download_size_mb * 1_000_000
    }

    pub fn upload_size_bytes(&self) -> usize {
        (self.upload_size_mb * 1_000_000) as usize
    }

    pub fn upload_chunk_bytes(&self) -> usize {
        self.upload_chunk_kb * 1_000
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Reject values that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.servers.iter().any(|s| !s.trim().is_empty()),
            "at least one speed test server is required"
        );
        ensure!(self.ping_count > 0, "ping count must be at least 1");
        ensure!(
            self.download_size_mb > 0 && self.upload_size_mb > 0,
            "download and upload sizes must be at least 1 MB"
        );
        ensure!(self.upload_chunk_kb > 0, "upload chunk size must be at least 1 KB");
        ensure!(
            self.read_timeout_secs > 0 && self.connect_timeout_secs > 0,
            "timeouts must be at least 1 second"
        );
        ensure!(self.tick_ms > 0, "tick interval must be at least 1 ms");
        ensure!(
            self.image_width > 0 && self.image_height > 0,
            "image dimensions must be non-zero"
        );
        Ok(())
    }
}
