use crate::core::rates::{CurrencyListResponse, RateError, RateProvider, RateTableResponse};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.fastforex.io";

const USER_AGENT: &str = concat!("histfx/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the fastFOREX pricing API. One request per call, no
/// retries; a failed call is terminal for that request.
pub struct FastForexClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl FastForexClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, RateError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, RateError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("requesting {url}");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RateError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl RateProvider for FastForexClient {
    async fn fetch_currencies(&self) -> Result<CurrencyListResponse, RateError> {
        self.get_json("/currencies", &[]).await
    }

    async fn fetch_rate_table(
        &self,
        source: &str,
        date: NaiveDate,
    ) -> Result<RateTableResponse, RateError> {
        let date = date.to_string();
        self.get_json("/historical", &[("date", date.as_str()), ("from", source)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_endpoint(endpoint: &str, response: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(endpoint))
            .and(query_param("api_key", "test-key"))
            .respond_with(response)
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_currency_fetch() {
        let body = r#"{"currencies": {"USD": "United States Dollar", "EUR": "Euro"}, "ms": 3}"#;
        let server = mock_endpoint(
            "/currencies",
            ResponseTemplate::new(200).set_body_string(body),
        )
        .await;

        let client = FastForexClient::new(&server.uri(), "test-key").unwrap();
        let response = client.fetch_currencies().await.unwrap();

        assert_eq!(response.currencies.len(), 2);
        assert_eq!(response.currencies["EUR"], "Euro");
        assert_eq!(response.rest["ms"], 3);
    }

    #[tokio::test]
    async fn test_successful_rate_table_fetch() {
        let body = r#"{"date": "2024-01-01", "base": "USD", "results": {"EUR": 0.9, "GBP": 0.78}}"#;
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/historical"))
            .and(query_param("date", "2024-01-01"))
            .and(query_param("from", "USD"))
            .and(query_param("api_key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = FastForexClient::new(&server.uri(), "test-key").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let response = client.fetch_rate_table("USD", date).await.unwrap();

        assert_eq!(response.results["EUR"], 0.9);
        assert_eq!(response.rest["base"], "USD");
    }

    #[tokio::test]
    async fn test_api_error_carries_status_and_body() {
        let server = mock_endpoint(
            "/currencies",
            ResponseTemplate::new(401).set_body_string(r#"{"error": "API key invalid"}"#),
        )
        .await;

        let client = FastForexClient::new(&server.uri(), "test-key").unwrap();
        let err = client.fetch_currencies().await.unwrap_err();

        match &err {
            RateError::Status { status, body } => {
                assert_eq!(*status, 401);
                assert!(body.contains("API key invalid"));
            }
            other => panic!("expected a status error, got {other:?}"),
        }
        assert!(err.to_string().contains("HTTP 401"));
    }

    #[tokio::test]
    async fn test_malformed_response_is_a_decode_error() {
        let server = mock_endpoint(
            "/currencies",
            ResponseTemplate::new(200).set_body_string("not json"),
        )
        .await;

        let client = FastForexClient::new(&server.uri(), "test-key").unwrap();
        let err = client.fetch_currencies().await.unwrap_err();
        assert!(matches!(err, RateError::Decode(_)));
    }
}
