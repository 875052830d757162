use super::{SpeedTestError, Throughput};
use rand::{RngCore, SeedableRng};
use std::time::Instant;
use tracing::debug;

pub struct UploadTest {
    data: Vec<u8>,
    chunk_size: usize,
}

impl UploadTest {
    pub fn new(upload_size: usize, chunk_size: usize) -> Self {
        let mut rng = rand::rngs::StdRng::from_entropy();
        let mut data = vec![0u8; upload_size];
        rng.fill_bytes(&mut data);
        Self {
            data,
            chunk_size: chunk_size.max(1),
        }
    }

    pub async fn run(&self, client: &reqwest::Client, base_url: &str) -> Result<Throughput, SpeedTestError> {
        let url = format!("{}/__up", base_url);

        let start = Instant::now();
        let mut uploaded: u64 = 0;

        for chunk in self.data.chunks(self.chunk_size) {
            client
                .post(&url)
                .body(chunk.to_vec())
                .send()
                .await?
                .error_for_status()?;
            uploaded += chunk.len() as u64;
        }

        let elapsed = start.elapsed();
        debug!("uploaded {} bytes in {:?}", uploaded, elapsed);

        Throughput::from_transfer(uploaded, elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speedtest::http::build_client;
    use crate::speedtest::test_server::{Reply, TestServer};
    use std::time::Duration;

    fn client() -> reqwest::Client {
        build_client(Duration::from_secs(5), Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_payload_is_sized_and_chunked() {
        let test = UploadTest::new(2_500, 1_000);
        assert_eq!(test.data.len(), 2_500);
        assert_eq!(test.data.chunks(test.chunk_size).count(), 3);
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        let test = UploadTest::new(10, 0);
        assert_eq!(test.chunk_size, 1);
    }

    #[tokio::test]
    async fn test_posts_payload_in_chunks() {
        let server = TestServer::start(|_| Reply::ok(0)).await;

        let throughput = UploadTest::new(2_500, 1_000)
            .run(&client(), &server.base_url)
            .await
            .unwrap();

        assert_eq!(throughput.bytes, 2_500);
        assert!(throughput.bits_per_sec > 0.0);

        let requests = server.requests();
        assert!(requests.iter().all(|r| r.method == "POST" && r.path == "/__up"));
        let sizes: Vec<_> = requests.iter().map(|r| r.body_len).collect();
        assert_eq!(sizes, vec![1_000, 1_000, 500]);
    }

    #[tokio::test]
    async fn test_rejected_chunk_stops_upload() {
        let server = TestServer::start(|_| Reply::status(503)).await;

        let result = UploadTest::new(2_500, 1_000)
            .run(&client(), &server.base_url)
            .await;

        assert!(matches!(result, Err(SpeedTestError::Status { status: 503, .. })));
        assert_eq!(server.requests().len(), 1);
    }
}
