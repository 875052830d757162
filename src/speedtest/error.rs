use thiserror::Error;

/// Failures reported by a speed test backend.
#[derive(Error, Debug)]
pub enum SpeedTestError {
    #[error("No servers available")]
    NoServers,

    #[error("No server selected; locate the best server first")]
    NoServerSelected,

    #[error("Connection timed out")]
    Timeout,

    #[error("Could not connect to {0}")]
    Connect(String),

    #[error("Server returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Transfer finished without moving any data")]
    EmptyTransfer,

    #[error("No latency has been measured yet")]
    NoLatency,

    #[error("Request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for SpeedTestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SpeedTestError::Timeout
        } else if err.is_connect() {
            let target = err
                .url()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| "server".to_string());
            SpeedTestError::Connect(target)
        } else if let Some(status) = err.status() {
            SpeedTestError::Status {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            SpeedTestError::Request(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(SpeedTestError::Timeout.to_string(), "Connection timed out");
        assert_eq!(SpeedTestError::NoServers.to_string(), "No servers available");
        let err = SpeedTestError::Status {
            status: 503,
            url: "https://example.com/__up".into(),
        };
        assert_eq!(
            err.to_string(),
            "Server returned HTTP 503 for https://example.com/__up"
        );
    }
}
