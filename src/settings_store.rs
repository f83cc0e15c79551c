//! Client for the remote settings store used as a configuration fallback.
//!
//! When a request does not carry complete provider settings, the resolver reads the
//! application's stored settings blob and normalizes whatever comes back. The store is
//! reached over HTTP but hidden behind the [`SettingsStore`] trait so resolution can be
//! exercised without a network, and so a failing store stays a recoverable, first-class
//! branch of the pipeline rather than an abort.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

/// Read access to the settings store. Returns the raw settings blob for an application;
/// shape is not guaranteed and must be normalized by the caller.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn fetch_app_settings(&self, app_id: &str) -> Result<Value, SettingsStoreError>;
}

/// Errors from the settings store round trip.
///
/// The resolver recovers from every variant by continuing with an empty fallback;
/// the variants exist so diagnostics can tell transport failures from store rejections.
#[derive(Debug, thiserror::Error)]
pub enum SettingsStoreError {
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

/// HTTP-backed settings store: `GET {base}/apps/{app_id}/settings`.
#[derive(Clone, Debug)]
pub struct HttpSettingsStore {
    base_url: Url,
    client: Client,
    timeout: Option<Duration>,
}

impl HttpSettingsStore {
    pub fn new(base_url: Url) -> Self {
        HttpSettingsStore {
            base_url,
            client: Client::new(),
            timeout: None,
        }
    }

    /// Sets a timeout for all future requests.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let mut this = self.clone();
        this.timeout = Some(timeout);
        this
    }

    /// Returns the base URL used by this store client.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn settings_url(&self, app_id: &str) -> Result<Url, SettingsStoreError> {
        self.base_url
            .join(&format!("apps/{}/settings", app_id))
            .map_err(|e| SettingsStoreError::UrlParse {
                context: "Failed to construct app settings URL",
                source: e,
            })
    }
}

#[async_trait]
impl SettingsStore for HttpSettingsStore {
    async fn fetch_app_settings(&self, app_id: &str) -> Result<Value, SettingsStoreError> {
        let context = "GET app settings";
        let url = self.settings_url(app_id)?;
        let mut req = self.client.get(url);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let http_response = req
            .send()
            .await
            .map_err(|e| SettingsStoreError::Http { context, source: e })?;

        if http_response.status().is_success() {
            http_response
                .json::<Value>()
                .await
                .map_err(|e| SettingsStoreError::JsonDeserialization { context, source: e })
        } else {
            let status = http_response.status();
            let body = http_response.text().await.unwrap_or_default();
            Err(SettingsStoreError::HttpStatus {
                context,
                status,
                body,
            })
        }
    }
}

/// Converts a string URL into an `HttpSettingsStore`, normalizing the trailing slash so
/// relative joins behave.
impl TryFrom<&str> for HttpSettingsStore {
    type Error = SettingsStoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut normalized = value.trim_end_matches('/').to_string();
        normalized.push('/');
        let url = Url::parse(&normalized).map_err(|e| SettingsStoreError::UrlParse {
            context: "Failed to parse settings store base url",
            source: e,
        })?;
        Ok(HttpSettingsStore::new(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_settings_blob_by_app_id() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apps/vendor.app/settings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "merchantId": "698",
                "apiKey": "K"
            })))
            .mount(&mock_server)
            .await;

        let store = HttpSettingsStore::try_from(mock_server.uri().as_str()).unwrap();
        let blob = store.fetch_app_settings("vendor.app").await.unwrap();
        assert_eq!(blob["merchantId"], "698");
    }

    #[tokio::test]
    async fn non_success_status_carries_status_and_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apps/vendor.app/settings"))
            .respond_with(ResponseTemplate::new(403).set_body_string("no access"))
            .mount(&mock_server)
            .await;

        let store = HttpSettingsStore::try_from(mock_server.uri().as_str()).unwrap();
        let error = store.fetch_app_settings("vendor.app").await.unwrap_err();
        match error {
            SettingsStoreError::HttpStatus { status, body, .. } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(body, "no access");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_deserialization_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apps/vendor.app/settings"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let store = HttpSettingsStore::try_from(mock_server.uri().as_str()).unwrap();
        let error = store.fetch_app_settings("vendor.app").await.unwrap_err();
        assert!(matches!(
            error,
            SettingsStoreError::JsonDeserialization { .. }
        ));
    }
}
