use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use tracing::trace;

use crate::error::Result;

/// Status reported for a probe that got no HTTP response. Never a real status code.
pub const NOT_ALIVE: u16 = 0;

/// Upper bound on body bytes read back so the connection can return to the pool.
const MAX_DRAIN_BYTES: usize = 64 * 1024;

/// Something that can tell whether a URL answers HTTP.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Issue a GET to `url` and return its status code, or [`NOT_ALIVE`] on any failure.
    async fn probe(&self, url: &str) -> u16;
}

/// Shared, connection-pooling HTTP prober.
///
/// Certificates are not verified and redirects are not followed: a 3xx is
/// itself proof that something is listening.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(timeout: Duration, pool_idle_per_host: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .danger_accept_invalid_certs(true)
            .redirect(Policy::none())
            .pool_max_idle_per_host(pool_idle_per_host)
            .tcp_nodelay(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> u16 {
        match self.client.get(url).send().await {
            Ok(mut response) => {
                let status = response.status().as_u16();
                drain_body(&mut response).await;
                status
            }
            Err(e) => {
                trace!(url, cause = failure_cause(&e), "probe failed");
                NOT_ALIVE
            }
        }
    }
}

/// Read a bounded amount of the body so keep-alive connections can be reused.
/// Errors here are ignored; the status line already proved liveness.
async fn drain_body(response: &mut Response) {
    let mut read = 0;
    while let Ok(Some(chunk)) = response.chunk().await {
        read += chunk.len();
        if read >= MAX_DRAIN_BYTES {
            break;
        }
    }
}

fn failure_cause(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "timeout"
    } else if error.is_connect() {
        "connect"
    } else if error.is_builder() {
        "invalid url"
    } else {
        "request"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prober() -> HttpProber {
        HttpProber::new(Duration::from_millis(500), 4).unwrap()
    }

    async fn server_answering(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_probe_returns_status() {
        let server = server_answering(200).await;
        assert_eq!(prober().probe(&server.uri()).await, 200);
    }

    #[tokio::test]
    async fn test_error_statuses_are_alive() {
        let server = server_answering(404).await;
        assert_eq!(prober().probe(&server.uri()).await, 404);
    }

    #[tokio::test]
    async fn test_redirects_are_not_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "http://127.0.0.1:1/"))
            .mount(&server)
            .await;
        assert_eq!(prober().probe(&server.uri()).await, 301);
    }

    #[tokio::test]
    async fn test_refused_connection_is_not_alive() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let url = format!("http://127.0.0.1:{}", port);
        assert_eq!(prober().probe(&url).await, NOT_ALIVE);
    }

    #[tokio::test]
    async fn test_slow_response_is_not_alive() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let prober = HttpProber::new(Duration::from_millis(200), 1).unwrap();
        assert_eq!(prober.probe(&server.uri()).await, NOT_ALIVE);
    }

    #[tokio::test]
    async fn test_tls_against_plain_http_is_not_alive() {
        let server = server_answering(200).await;
        let url = format!("https://127.0.0.1:{}", server.address().port());
        assert_eq!(prober().probe(&url).await, NOT_ALIVE);
    }

    #[tokio::test]
    async fn test_malformed_url_is_not_alive() {
        assert_eq!(prober().probe("http://exa mple.test:80").await, NOT_ALIVE);
    }

    #[tokio::test]
    async fn test_repeated_failures_stay_not_alive() {
        let prober = prober();
        for _ in 0..3 {
            assert_eq!(prober.probe("http://127.0.0.1:1").await, NOT_ALIVE);
        }
    }

    #[tokio::test]
    async fn test_client_is_reused_across_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .expect(5)
            .mount(&server)
            .await;

        let prober = prober();
        for _ in 0..5 {
            assert_eq!(prober.probe(&server.uri()).await, 204);
        }
        server.verify().await;
    }
}
