//! HTTP client for the PaymentsWay gateway.
//!
//! The gateway exposes a single create-transaction endpoint that returns the hosted
//! payment-link page the shopper is redirected to. Its response shape varies between
//! environments, so the redirect URL is extracted by probing a fixed list of known
//! keys rather than deserializing into a typed response.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

use crate::settings::ApiKey;
use crate::transaction::TransactionPayload;

/// Production-test gateway host used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://merchantpruebas.vepay.com.co";

/// Response keys probed, in order, for the redirect URL. `data.url` is checked last.
const REDIRECT_URL_KEYS: [&str; 3] = ["url", "redirect_url", "payment_url"];

/// Errors from the create-transaction round trip. All fatal to the authorize call;
/// never retried here.
#[derive(Debug, thiserror::Error)]
pub enum GatewayClientError {
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        context: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("HTTP error: {context}: {source}")]
    Http {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to deserialize JSON: {context}: {source}")]
    JsonDeserialization {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        context: &'static str,
        status: StatusCode,
        body: String,
    },
}

/// A client for the PaymentsWay transaction-creation endpoint.
#[derive(Clone, Debug)]
pub struct PaymentsWayClient {
    /// Base URL of the gateway (e.g. `https://merchantpruebas.vepay.com.co/`).
    base_url: Url,
    /// Full URL for `POST /link-de-pago/create` requests.
    create_transaction_url: Url,
    /// Shared Reqwest HTTP client.
    client: Client,
    /// Optional request timeout.
    timeout: Option<Duration>,
}

impl PaymentsWayClient {
    /// Constructs a new [`PaymentsWayClient`] from a base URL, precomputing the
    /// create-transaction endpoint URL.
    pub fn try_new(base_url: Url) -> Result<Self, GatewayClientError> {
        let create_transaction_url =
            base_url
                .join("./link-de-pago/create")
                .map_err(|e| GatewayClientError::UrlParse {
                    context: "Failed to construct ./link-de-pago/create URL",
                    source: e,
                })?;
        Ok(Self {
            base_url,
            create_transaction_url,
            client: Client::new(),
            timeout: None,
        })
    }

    /// Sets a timeout for all future requests.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let mut this = self.clone();
        this.timeout = Some(timeout);
        this
    }

    /// Returns the base URL used by this client.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the computed create-transaction URL.
    pub fn create_transaction_url(&self) -> &Url {
        &self.create_transaction_url
    }

    /// Sends the payload to the gateway, authenticated with the resolved api key.
    ///
    /// The response body is returned raw; callers extract what they need via
    /// [`extract_redirect_url`].
    ///
    /// # Errors
    ///
    /// [`GatewayClientError::Http`] on transport failure,
    /// [`GatewayClientError::HttpStatus`] with upstream status and body on non-2xx,
    /// [`GatewayClientError::JsonDeserialization`] if a 2xx body is not JSON.
    pub async fn create_transaction(
        &self,
        payload: &TransactionPayload,
        api_key: &ApiKey,
    ) -> Result<Value, GatewayClientError> {
        let context = "POST /link-de-pago/create";
        let mut req = self
            .client
            .post(self.create_transaction_url.clone())
            .header(AUTHORIZATION, api_key.expose())
            .json(payload);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let http_response = req
            .send()
            .await
            .map_err(|e| GatewayClientError::Http { context, source: e })?;

        if http_response.status().is_success() {
            http_response
                .json::<Value>()
                .await
                .map_err(|e| GatewayClientError::JsonDeserialization { context, source: e })
        } else {
            let status = http_response.status();
            let body = http_response.text().await.unwrap_or_default();
            Err(GatewayClientError::HttpStatus {
                context,
                status,
                body,
            })
        }
    }
}

/// Converts a string URL into a `PaymentsWayClient`, normalizing the trailing slash so
/// relative joins behave.
impl TryFrom<&str> for PaymentsWayClient {
    type Error = GatewayClientError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut normalized = value.trim_end_matches('/').to_string();
        normalized.push('/');
        let url = Url::parse(&normalized).map_err(|e| GatewayClientError::UrlParse {
            context: "Failed to parse gateway base url",
            source: e,
        })?;
        PaymentsWayClient::try_new(url)
    }
}

/// Probes a gateway response for a usable redirect URL: `url`, `redirect_url`,
/// `payment_url`, then `data.url`. The first non-empty string wins.
pub fn extract_redirect_url(response: &Value) -> Option<&str> {
    let candidates = REDIRECT_URL_KEYS
        .iter()
        .map(|key| response.get(*key))
        .chain(std::iter::once(
            response.get("data").and_then(|data| data.get("url")),
        ));
    for candidate in candidates {
        if let Some(s) = candidate.and_then(Value::as_str) {
            if !s.is_empty() {
                return Some(s);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CompleteSettings;
    use crate::transaction::build_transaction;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload() -> TransactionPayload {
        let settings = CompleteSettings {
            merchant_id: "698".to_string(),
            terminal_id: "593".to_string(),
            form_id: "622".to_string(),
            api_key: ApiKey::new("K"),
        };
        let request = serde_json::from_value(json!({
            "paymentId": "P1",
            "value": 100.0,
            "currency": "COP"
        }))
        .unwrap();
        build_transaction(&settings, &request)
    }

    #[test]
    fn redirect_url_is_probed_in_order() {
        let cases = [
            (json!({ "url": "https://pay.example/a" }), "https://pay.example/a"),
            (json!({ "redirect_url": "https://pay.example/b" }), "https://pay.example/b"),
            (json!({ "payment_url": "https://pay.example/c" }), "https://pay.example/c"),
            (json!({ "data": { "url": "https://pay.example/x" } }), "https://pay.example/x"),
            (
                json!({ "url": "", "redirect_url": "https://pay.example/b" }),
                "https://pay.example/b",
            ),
            (
                json!({ "url": "https://pay.example/a", "data": { "url": "https://pay.example/x" } }),
                "https://pay.example/a",
            ),
        ];
        for (response, expected) in cases {
            assert_eq!(extract_redirect_url(&response), Some(expected), "{response}");
        }
    }

    #[test]
    fn missing_or_unusable_urls_yield_none() {
        for response in [
            json!({}),
            json!({ "status": "created" }),
            json!({ "url": "" }),
            json!({ "url": 42 }),
            json!({ "data": {} }),
        ] {
            assert_eq!(extract_redirect_url(&response), None, "{response}");
        }
    }

    #[tokio::test]
    async fn posts_payload_with_api_key_authorization() {
        let mock_server = MockServer::start().await;
        let payload = payload();
        Mock::given(method("POST"))
            .and(path("/link-de-pago/create"))
            .and(header("Authorization", "K"))
            .and(body_json(&payload))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "url": "https://pay.example/x" })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = PaymentsWayClient::try_from(mock_server.uri().as_str()).unwrap();
        let response = client
            .create_transaction(&payload, &ApiKey::new("K"))
            .await
            .unwrap();
        assert_eq!(
            extract_redirect_url(&response),
            Some("https://pay.example/x")
        );
    }

    #[tokio::test]
    async fn non_success_status_carries_status_and_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/link-de-pago/create"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid checksum"))
            .mount(&mock_server)
            .await;

        let client = PaymentsWayClient::try_from(mock_server.uri().as_str()).unwrap();
        let error = client
            .create_transaction(&payload(), &ApiKey::new("K"))
            .await
            .unwrap_err();
        match error {
            GatewayClientError::HttpStatus { status, body, .. } => {
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
                assert_eq!(body, "invalid checksum");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
