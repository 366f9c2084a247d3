//! Execution queue client.
//!
//! Each command line is POSTed on its own as a one-element JSON array.

use std::io::Write;
use std::time::Duration;

use tracing::{debug, info};
use url::Url;

use crate::error::CliError;

pub struct QueueClient {
    http: reqwest::Client,
    url: Url,
}

impl QueueClient {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, CliError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| CliError::QueueUnreachable {
                url: url.to_string(),
                source,
            })?;
        Ok(Self { http, url })
    }

    pub async fn enqueue(&self, line: &str) -> Result<(), CliError> {
        debug!(url = %self.url, line, "enqueueing command");
        let resp = self
            .http
            .post(self.url.clone())
            .json(&[line])
            .send()
            .await
            .map_err(|source| CliError::QueueUnreachable {
                url: self.url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CliError::QueueRejected {
                url: self.url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Destination for emitted command lines.
pub enum Sink {
    Stdout,
    Queue(QueueClient),
}

impl Sink {
    /// Deliver `lines` in order, stopping at the first failure.
    pub async fn emit(&self, lines: &[String]) -> Result<(), CliError> {
        match self {
            Self::Stdout => {
                let mut stdout = std::io::stdout().lock();
                for line in lines {
                    writeln!(stdout, "{line}")?;
                }
            }
            Self::Queue(client) => {
                for line in lines {
                    client.enqueue(line).await?;
                }
                info!(count = lines.len(), "queued commands");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn client(server: &MockServer) -> QueueClient {
        let url = format!("{}/commands", server.uri()).parse().unwrap();
        QueueClient::new(url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn posts_each_line_as_single_element_array() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/commands"))
            .and(body_json(json!(["policy new zone R1 dmz"])))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/commands"))
            .and(body_json(json!(["device SDN delete S1"])))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let sink = Sink::Queue(client(&server).await);
        sink.emit(&["policy new zone R1 dmz".into(), "device SDN delete S1".into()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("queue full"))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .enqueue("policy delete zone R1 dmz")
            .await
            .unwrap_err();
        match err {
            CliError::QueueRejected { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "queue full");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_queue_is_a_connection_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let url: Url = format!("http://127.0.0.1:{port}/commands").parse().unwrap();

        let client = QueueClient::new(url, Duration::from_secs(2)).unwrap();
        let err = client.enqueue("zone R1 dmz").await.unwrap_err();
        assert_eq!(err.exit_code(), crate::error::exit_code::CONNECTION);
    }
}
