//! Bounded JSON GET shared by every external lookup.
//!
//! No retries: a failed lookup surfaces as a [`LookupError`] and the caller
//! decides whether to degrade or abort.
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Largest response body accepted from any API (2MB).
pub const MAX_RESPONSE_SIZE: usize = 2 * 1024 * 1024;

/// Transient failures while talking to a discussion or archive API.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Request to {0} timed out")]
    Timeout(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {status} from {url}")]
    HttpStatus { status: u16, url: String },
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Malformed JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// HTTP client plus the per-request timeout applied to every call.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client, timeout })
    }

    /// GET `url` and decode the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, LookupError> {
        tracing::debug!(url = %url, "GET");
        let response = tokio::time::timeout(self.timeout, self.client.get(url.clone()).send())
            .await
            .map_err(|_| LookupError::Timeout(url.to_string()))??;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = tokio::time::timeout(self.timeout, read_limited(response, MAX_RESPONSE_SIZE))
            .await
            .map_err(|_| LookupError::Timeout(url.to_string()))??;

        serde_json::from_slice(&body).map_err(|source| LookupError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

async fn read_limited(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, LookupError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(LookupError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(LookupError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        value: u32,
    }

    fn client() -> HttpClient {
        HttpClient::new("test-agent", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"value": 7}"#))
            .mount(&mock_server)
            .await;

        let url = Url::parse(&format!("{}/data", mock_server.uri())).unwrap();
        let payload: Payload = client().get_json(url).await.unwrap();
        assert_eq!(payload, Payload { value: 7 });
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let url = Url::parse(&mock_server.uri()).unwrap();
        let result = client().get_json::<Payload>(url).await;
        assert!(matches!(
            result,
            Err(LookupError::HttpStatus { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&mock_server)
            .await;

        let url = Url::parse(&mock_server.uri()).unwrap();
        let result = client().get_json::<Payload>(url).await;
        assert!(matches!(result, Err(LookupError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let mock_server = MockServer::start().await;
        let body = "x".repeat(MAX_RESPONSE_SIZE + 1);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let url = Url::parse(&mock_server.uri()).unwrap();
        let result = client().get_json::<Payload>(url).await;
        assert!(matches!(result, Err(LookupError::ResponseTooLarge(_))));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"value": 1}"#)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let client = HttpClient::new("test-agent", Duration::from_millis(100)).unwrap();
        let url = Url::parse(&mock_server.uri()).unwrap();
        let result = client.get_json::<Payload>(url).await;
        assert!(matches!(result, Err(LookupError::Timeout(_))));
    }
}
