//! Core `SearchGateway` trait and the `HttpSearchGateway` implementation.
//!
//! `HttpSearchGateway` looks a vehicle up with `GET {base_url}/cars/{reg}` on
//! the registry backend.  All connection details come from
//! [`GatewayConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::config::GatewayConfig;
use crate::search::key::SearchKey;
use crate::search::vehicle::VehicleRecord;

/// Shown when the backend reports "not found" without a detail string.
pub const NOT_FOUND_FALLBACK: &str = "Vehicle not found";
/// Shown when the lookup failed for any other reason without a detail string.
pub const TRANSPORT_FALLBACK: &str = "Search failed, please try again";

// ---------------------------------------------------------------------------
// SearchError
// ---------------------------------------------------------------------------

/// Why a lookup produced no vehicle.
///
/// Both variants carry the optional human-readable detail supplied by the
/// backend.  `Display` is the text the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The registry has no vehicle under that key.
    #[error("{}", .0.as_deref().unwrap_or(NOT_FOUND_FALLBACK))]
    NotFound(Option<String>),

    /// The registry could not be reached or answered unexpectedly.
    #[error("{}", .0.as_deref().unwrap_or(TRANSPORT_FALLBACK))]
    Transport(Option<String>),
}

impl SearchError {
    /// The message for the result-area error display.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SearchError::Transport(Some("The vehicle registry did not respond in time".into()))
        } else if e.is_connect() {
            SearchError::Transport(Some("Could not connect to the vehicle registry".into()))
        } else {
            SearchError::Transport(Some(format!("Search request failed: {e}")))
        }
    }
}

// ---------------------------------------------------------------------------
// SearchGateway trait
// ---------------------------------------------------------------------------

/// Async lookup of a single vehicle by its normalized key.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn SearchGateway>` between the controller and its search tasks.
#[async_trait]
pub trait SearchGateway: Send + Sync {
    async fn search(&self, key: &SearchKey) -> Result<VehicleRecord, SearchError>;
}

// ---------------------------------------------------------------------------
// HttpSearchGateway
// ---------------------------------------------------------------------------

/// Looks vehicles up on the registry REST API.
pub struct HttpSearchGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl HttpSearchGateway {
    /// Build a gateway from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default client is used as a last-resort
    /// fallback if the builder fails.
    pub fn from_config(config: &GatewayConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    /// `{base_url}/cars/{key}`, with the key percent-encoded as one path
    /// segment.
    fn lookup_url(&self, key: &SearchKey) -> Result<reqwest::Url, SearchError> {
        let invalid = || {
            SearchError::Transport(Some(format!(
                "Invalid registry URL: {}",
                self.config.base_url
            )))
        };

        let mut url = reqwest::Url::parse(&self.config.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push("cars")
            .push(key.as_str());
        Ok(url)
    }
}

/// The `detail` string of a backend error body, if there is one.
async fn error_detail(response: reqwest::Response) -> Option<String> {
    let body: serde_json::Value = response.json().await.ok()?;
    body.get("detail")?.as_str().map(str::to_owned)
}

#[async_trait]
impl SearchGateway for HttpSearchGateway {
    async fn search(&self, key: &SearchKey) -> Result<VehicleRecord, SearchError> {
        let url = self.lookup_url(key)?;
        log::debug!("gateway: GET {url}");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(SearchError::NotFound(error_detail(response).await));
        }

        if !status.is_success() {
            let detail = error_detail(response)
                .await
                .unwrap_or_else(|| format!("Vehicle registry returned HTTP {status}"));
            return Err(SearchError::Transport(Some(detail)));
        }

        response.json::<VehicleRecord>().await.map_err(|e| {
            SearchError::Transport(Some(format!("Unexpected registry response: {e}")))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::vehicle::sample_record;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway_for(base_url: &str, timeout_secs: u64) -> HttpSearchGateway {
        HttpSearchGateway::from_config(&GatewayConfig {
            base_url: base_url.into(),
            timeout_secs,
        })
    }

    fn key(text: &str) -> SearchKey {
        SearchKey::parse(text).unwrap()
    }

    #[test]
    fn not_found_without_detail_uses_fallback() {
        assert_eq!(SearchError::NotFound(None).user_message(), NOT_FOUND_FALLBACK);
        assert_eq!(SearchError::Transport(None).user_message(), TRANSPORT_FALLBACK);
    }

    #[test]
    fn detail_is_the_user_message() {
        let err = SearchError::NotFound(Some("Vehicle not found".into()));
        assert_eq!(err.user_message(), "Vehicle not found");
    }

    #[test]
    fn lookup_url_appends_cars_segment() {
        let gateway = gateway_for("http://registry.local:8000/", 5);
        let url = gateway.lookup_url(&key("MH12AB1234")).unwrap();
        assert_eq!(url.as_str(), "http://registry.local:8000/cars/MH12AB1234");

        let gateway = gateway_for("http://registry.local/api", 5);
        let url = gateway.lookup_url(&key("MH12AB1234")).unwrap();
        assert_eq!(url.as_str(), "http://registry.local/api/cars/MH12AB1234");
    }

    #[test]
    fn lookup_url_encodes_the_key() {
        let gateway = gateway_for("http://registry.local", 5);
        let url = gateway.lookup_url(&key("AB/12")).unwrap();
        assert_eq!(url.as_str(), "http://registry.local/cars/AB%2F12");
    }

    #[tokio::test]
    async fn invalid_base_url_is_a_transport_error() {
        let gateway = gateway_for("not a url", 5);
        let err = gateway.search(&key("MH12AB1234")).await.unwrap_err();
        assert!(matches!(err, SearchError::Transport(Some(_))));
    }

    #[tokio::test]
    async fn found_vehicle_is_decoded() {
        let server = MockServer::start().await;
        let record = sample_record("MH12AB1234");

        Mock::given(method("GET"))
            .and(path("/cars/MH12AB1234"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&record))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server.uri(), 5);
        let found = gateway.search(&key("mh 12 ab 1234")).await.unwrap();

        assert_eq!(found, record);
    }

    #[tokio::test]
    async fn not_found_carries_backend_detail() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cars/XX0000"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({ "detail": "Vehicle not found" })),
            )
            .mount(&server)
            .await;

        let gateway = gateway_for(&server.uri(), 5);
        let err = gateway.search(&key("XX0000")).await.unwrap_err();

        assert_eq!(err, SearchError::NotFound(Some("Vehicle not found".into())));
    }

    #[tokio::test]
    async fn not_found_without_body_has_no_detail() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server.uri(), 5);
        let err = gateway.search(&key("XX0000")).await.unwrap_err();

        assert_eq!(err, SearchError::NotFound(None));
    }

    #[tokio::test]
    async fn server_error_is_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal server error"))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server.uri(), 5);
        let err = gateway.search(&key("MH12AB1234")).await.unwrap_err();

        match err {
            SearchError::Transport(Some(detail)) => assert!(detail.contains("500")),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn garbage_body_is_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server.uri(), 5);
        let err = gateway.search(&key("MH12AB1234")).await.unwrap_err();

        assert!(matches!(err, SearchError::Transport(Some(_))));
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server.uri(), 1);
        let err = gateway.search(&key("MH12AB1234")).await.unwrap_err();

        assert!(matches!(err, SearchError::Transport(Some(_))));
    }

    #[test]
    fn gateway_is_object_safe() {
        let gateway: Box<dyn SearchGateway> = Box::new(gateway_for("http://localhost:8000", 5));
        drop(gateway);
    }
}
