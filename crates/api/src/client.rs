//! Homework status fetching.
//!
//! Sends `GET <endpoint>?from_date=<cursor>` with an OAuth header and hands
//! back the decoded JSON body. Shape validation is left to the caller.

use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Request, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Practicum homework status endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Source of raw homework status answers.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch statuses changed since `from_date` (unix seconds).
    async fn get_api_answer(&self, from_date: i64) -> ApiResult<Value>;
}

/// Configuration for the status API client.
#[derive(Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    /// OAuth token sent in the `Authorization` header.
    pub token: String,
    /// Upper bound for a whole request, connect to last body byte.
    pub timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Create a config for the default endpoint.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: token.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// reqwest-backed client for the Practicum status API.
pub struct PracticumClient {
    http: Client,
    endpoint: Url,
    token: String,
}

impl PracticumClient {
    /// Build a client; fails on an unparsable endpoint.
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| ApiError::InvalidEndpoint {
            endpoint: config.endpoint.clone(),
            reason: e.to_string(),
        })?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            token: config.token,
        })
    }

    /// Build the status request for the given cursor without sending it.
    pub fn build_request(&self, from_date: i64) -> ApiResult<Request> {
        let mut auth = HeaderValue::from_str(&format!("OAuth {}", self.token))
            .map_err(|e| ApiError::Client(format!("invalid token header: {e}")))?;
        auth.set_sensitive(true);

        self.http
            .get(self.endpoint.clone())
            .header(AUTHORIZATION, auth)
            .query(&[("from_date", from_date)])
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))
    }

    /// Request description for logs and errors, with the token masked.
    fn describe(&self, from_date: i64) -> String {
        format!(
            "url: {}, headers: {{Authorization: OAuth ***}}, params: {{from_date: {}}}",
            self.endpoint, from_date
        )
    }

    #[tracing::instrument(name = "get_api_answer", skip(self))]
    async fn fetch(&self, from_date: i64) -> ApiResult<Value> {
        let request = self.build_request(from_date)?;
        let described = self.describe(from_date);
        info!("Requesting homework statuses. Request: {}", described);

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| ApiError::Transport {
                request: described.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::WrongStatus {
                status: status.as_u16(),
                reason,
                body,
                request: described,
            });
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::InvalidBody(e.to_string()))?;
        debug!("Status API answered");
        Ok(body)
    }
}

#[async_trait]
impl StatusSource for PracticumClient {
    async fn get_api_answer(&self, from_date: i64) -> ApiResult<Value> {
        self.fetch(from_date).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn client_for(endpoint: &str, timeout: Duration) -> PracticumClient {
        PracticumClient::new(ClientConfig {
            endpoint: endpoint.to_string(),
            token: "secret-token".to_string(),
            timeout,
        })
        .unwrap()
    }

    /// Serve one connection with a canned response; yields the raw request.
    async fn serve_once(response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/api/user_api/homework_statuses/", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&raw).to_string()
        });
        (url, handle)
    }

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[test]
    fn test_build_request_places_cursor_and_token_once() {
        let client = client_for(DEFAULT_ENDPOINT, Duration::from_secs(5));
        for cursor in [0, 1, 1_549_962_000, -5, i64::MAX] {
            let request = client.build_request(cursor).unwrap();

            let from_dates: Vec<String> = request
                .url()
                .query_pairs()
                .filter(|(k, _)| k == "from_date")
                .map(|(_, v)| v.into_owned())
                .collect();
            assert_eq!(from_dates, vec![cursor.to_string()]);

            let auth: Vec<&HeaderValue> = request.headers().get_all(AUTHORIZATION).iter().collect();
            assert_eq!(auth.len(), 1);
            assert_eq!(auth[0].to_str().unwrap(), "OAuth secret-token");
            assert_eq!(request.method(), reqwest::Method::GET);
        }
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let err = PracticumClient::new(ClientConfig {
            endpoint: "not a url".to_string(),
            ..ClientConfig::new("t")
        })
        .err()
        .unwrap();
        assert!(matches!(err, ApiError::InvalidEndpoint { .. }));
        assert_eq!(err.kind(), "client_setup");
    }

    #[test]
    fn test_config_debug_redacts_token() {
        let config = ClientConfig::new("super-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains(DEFAULT_ENDPOINT));
    }

    #[tokio::test]
    async fn test_fetch_success_returns_json_body() {
        let body = r#"{"homeworks":[{"homework_name":"hw","status":"approved"}],"current_date":1700000000}"#;
        let (url, server) = serve_once(http_response("200 OK", body)).await;
        let client = client_for(&url, Duration::from_secs(5));

        let answer = client.get_api_answer(1_699_999_000).await.unwrap();
        assert_eq!(answer["current_date"], 1700000000);
        assert_eq!(answer["homeworks"][0]["status"], "approved");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/user_api/homework_statuses/?from_date=1699999000 "));
        assert!(request.to_lowercase().contains("authorization: oauth secret-token"));
    }

    #[tokio::test]
    async fn test_fetch_non_200_is_wrong_status() {
        let (url, server) =
            serve_once(http_response("503 Service Unavailable", "maintenance")).await;
        let client = client_for(&url, Duration::from_secs(5));

        let err = client.get_api_answer(42).await.unwrap_err();
        match &err {
            ApiError::WrongStatus {
                status,
                reason,
                body,
                request,
            } => {
                assert_eq!(*status, 503);
                assert_eq!(reason, "Service Unavailable");
                assert_eq!(body, "maintenance");
                assert!(request.contains("from_date: 42"));
                assert!(!request.contains("secret-token"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.kind(), "wrong_response_status");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_invalid_json_body() {
        let (url, server) = serve_once(http_response("200 OK", "<html>")).await;
        let client = client_for(&url, Duration::from_secs(5));

        let err = client.get_api_answer(1).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidBody(_)), "{err:?}");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transport() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(&format!("http://{addr}/"), Duration::from_secs(5));
        let err = client.get_api_answer(1).await.unwrap_err();
        assert!(err.is_transport(), "{err:?}");
        assert_eq!(err.kind(), "transport_failure");
        assert!(!err.to_string().contains("secret-token"));
    }

    #[tokio::test]
    async fn test_fetch_times_out_instead_of_blocking() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let client = client_for(&url, Duration::from_millis(200));
        let err = client.get_api_answer(1).await.unwrap_err();
        match err {
            ApiError::Transport { source, .. } => assert!(source.is_timeout()),
            other => panic!("unexpected error: {other:?}"),
        }
        server.abort();
    }
}
