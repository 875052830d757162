//! Command-line flags
//!
//! Every flag can also be set through a `SPEEDCHECK_*` environment variable.

use crate::settings::{Settings, DEFAULT_SERVER};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "speedcheck", version, about = "Internet speed checker")]
pub struct Cli {
    /// Speed test server base URL (repeat to let the fastest one win)
    #[arg(long = "server", env = "SPEEDCHECK_SERVERS", value_delimiter = ',', default_value = DEFAULT_SERVER)]
    pub servers: Vec<String>,

    /// Pings sent to each server when picking one
    #[arg(long, env = "SPEEDCHECK_PING_COUNT", default_value_t = 5)]
    pub ping_count: usize,

    /// Download size in MB
    #[arg(long, env = "SPEEDCHECK_DOWNLOAD_MB", default_value_t = 25)]
    pub download_mb: u64,

    /// Upload size in MB
    #[arg(long, env = "SPEEDCHECK_UPLOAD_MB", default_value_t = 10)]
    pub upload_mb: u64,

    /// Upload chunk size in KB (one POST per chunk)
    #[arg(long, env = "SPEEDCHECK_UPLOAD_CHUNK_KB", default_value_t = 1000)]
    pub upload_chunk_kb: usize,

    /// Seconds a transfer may stall without data before it fails
    #[arg(long, env = "SPEEDCHECK_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    /// Seconds allowed to establish a connection
    #[arg(long, env = "SPEEDCHECK_CONNECT_TIMEOUT", default_value_t = 10)]
    pub connect_timeout: u64,

    /// Decorative image shown beside the results
    #[arg(long, env = "SPEEDCHECK_IMAGE")]
    pub image: Option<PathBuf>,

    /// Hide the decorative image
    #[arg(long)]
    pub no_image: bool,

    /// Log file (the terminal is owned by the UI)
    #[arg(long, env = "SPEEDCHECK_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, env = "SPEEDCHECK_VERBOSE")]
    pub verbose: bool,
}

impl Cli {
    pub fn into_settings(self) -> Result<Settings> {
        let defaults = Settings::default();

        let image_path = if self.no_image {
            None
        } else {
            self.image.or(defaults.image_path)
        };

        let settings = Settings {
            servers: self
                .servers
                .into_iter()
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            ping_count: self.ping_count,
            download_size_mb: self.download_mb,
            upload_size_mb: self.upload_mb,
            upload_chunk_kb: self.upload_chunk_kb,
            read_timeout_secs: self.timeout,
            connect_timeout_secs: self.connect_timeout,
            image_path,
            log_file: self.log_file.unwrap_or(defaults.log_file),
            verbose: self.verbose,
            ..Settings::default()
        };

        settings.validate().context("invalid configuration")?;
        Ok(settings)
    }
}
