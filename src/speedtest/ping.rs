use super::{Server, SpeedTestError};
use futures::future::join_all;
use std::time::{Duration, Instant};
use tracing::debug;

pub struct PingTest {
    samples: Vec<f64>,
    ping_count: usize,
}

impl PingTest {
    pub fn new(ping_count: usize) -> Self {
        Self {
            samples: Vec::new(),
            ping_count,
        }
    }

    /// Time empty downloads from `base_url` and return the mean round trip in ms.
    pub async fn run(&mut self, client: &reqwest::Client, base_url: &str) -> Result<f64, SpeedTestError> {
        let url = format!("{}/__down?bytes=0", base_url);
        let mut last_error = None;

        self.samples.clear();

        for i in 0..self.ping_count {
            let start = Instant::now();
            match client.get(&url).send().await.and_then(|r| r.error_for_status()) {
                Ok(_) => self.samples.push(start.elapsed().as_secs_f64() * 1000.0),
                Err(e) => last_error = Some(SpeedTestError::from(e)),
            }

            if i + 1 < self.ping_count {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }

        match self.average() {
            Some(avg) => Ok(avg),
            None => Err(last_error.unwrap_or(SpeedTestError::NoServers)),
        }
    }

    fn average(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }
}

/// Ping every candidate concurrently and keep the one with the lowest latency.
pub async fn locate_best_server(
    client: &reqwest::Client,
    servers: &[String],
    ping_count: usize,
) -> Result<Server, SpeedTestError> {
    let pings = servers.iter().map(|url| async move {
        let mut test = PingTest::new(ping_count);
        let result = test.run(client, url).await;
        (url.clone(), result)
    });

    let mut candidates = Vec::new();
    for (url, result) in join_all(pings).await {
        match result {
            Ok(latency_ms) => {
                debug!("server {} answered in {:.1} ms", url, latency_ms);
                candidates.push(Server { url, latency_ms });
            }
            Err(e) => debug!("server {} unreachable: {}", url, e),
        }
    }

    pick_fastest(candidates).ok_or(SpeedTestError::NoServers)
}

fn pick_fastest(candidates: Vec<Server>) -> Option<Server> {
    candidates
        .into_iter()
        .min_by(|a, b| a.latency_ms.total_cmp(&b.latency_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speedtest::http::build_client;
    use crate::speedtest::test_server::{closed_port_url, Reply, TestServer};

    fn client() -> reqwest::Client {
        build_client(Duration::from_secs(5), Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_average() {
        let mut test = PingTest::new(3);
        assert_eq!(test.average(), None);
        test.samples = vec![10.0, 20.0, 30.0];
        assert_eq!(test.average(), Some(20.0));
    }

    #[test]
    fn test_pick_fastest() {
        let servers = vec![
            Server { url: "a".into(), latency_ms: 42.0 },
            Server { url: "b".into(), latency_ms: 12.5 },
            Server { url: "c".into(), latency_ms: 30.0 },
        ];
        assert_eq!(pick_fastest(servers).unwrap().url, "b");
        assert!(pick_fastest(Vec::new()).is_none());
    }

    #[tokio::test]
    async fn test_locate_with_no_candidates() {
        let client = reqwest::Client::new();
        let result = locate_best_server(&client, &[], 1).await;
        assert!(matches!(result, Err(SpeedTestError::NoServers)));
    }

    #[tokio::test]
    async fn test_run_averages_empty_downloads() {
        let server = TestServer::start(|_| Reply::ok(0)).await;

        let mut test = PingTest::new(3);
        let avg = test.run(&client(), &server.base_url).await.unwrap();

        assert_eq!(test.samples.len(), 3);
        let expected = test.samples.iter().sum::<f64>() / 3.0;
        assert!((avg - expected).abs() < 1e-9);
        assert!(avg > 0.0);

        let requests = server.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests.iter().all(|r| r.path == "/__down?bytes=0"));
    }

    #[tokio::test]
    async fn test_run_fails_when_every_ping_fails() {
        let server = TestServer::start(|_| Reply::status(503)).await;

        let mut test = PingTest::new(2);
        let result = test.run(&client(), &server.base_url).await;

        assert!(matches!(result, Err(SpeedTestError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_locate_picks_the_faster_server() {
        let slow = TestServer::start(|_| Reply::ok(0).delayed(Duration::from_millis(150))).await;
        let fast = TestServer::start(|_| Reply::ok(0)).await;
        let servers = vec![
            slow.base_url.clone(),
            closed_port_url().await,
            fast.base_url.clone(),
        ];

        let best = locate_best_server(&client(), &servers, 2).await.unwrap();

        assert_eq!(best.url, fast.base_url);
        assert!(best.latency_ms < 150.0);
    }

    #[tokio::test]
    async fn test_locate_with_only_unreachable_servers() {
        let servers = vec![closed_port_url().await];
        let result = locate_best_server(&client(), &servers, 1).await;
        assert!(matches!(result, Err(SpeedTestError::NoServers)));
    }
}
