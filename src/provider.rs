use crate::analytics::{AnalyticsObserver, ObserverHandle};
use crate::app::Application;
use crate::client::{create_rest_client, Config};
use crate::endpoint::Endpoint;
use crate::error::{RestError, Result, NO_VALID_RESPONSE_MESSAGE, PARSING_FAILURE_MESSAGE};
use crate::producer::Producer;
use crate::request::{HttpMethod, ParameterEncoding, PreparedRequest};
use crate::response::{interpret, RawOutcome, Response};
use crate::service::RealTimeEvent;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::Client;
use serde_json::{Map, Value};
use std::sync::{Arc, Weak};
use std::time::Instant;
use tracing::debug;
use url::Url;

/// Stream of realtime event payloads
pub type EventStream = BoxStream<'static, Value>;

/// Transport contract shared by every provider an [`Application`] can use.
///
/// Calls take `self: Arc<Self>` so the returned [`Producer`] can hold the
/// provider weakly: a producer started after its provider is gone resolves to
/// [`RestError::Interrupted`].
pub trait Provider: Send + Sync {
    /// Base URL of the backing server
    fn base_url(&self) -> &Url;

    /// Whether `on`/`once` can ever deliver events
    fn supports_realtime_events(&self) -> bool;

    /// Called once when the provider is registered with an application
    fn setup(&self, app: &Application);

    /// Execute a service call
    fn request(self: Arc<Self>, endpoint: Endpoint) -> Producer<Response>;

    /// Authenticate against `path` with the given credentials
    fn authenticate(
        self: Arc<Self>,
        path: &str,
        credentials: Map<String, Value>,
    ) -> Producer<Response>;

    /// End the session at `path`
    fn logout(self: Arc<Self>, path: &str) -> Producer<Response>;

    /// Subscribe to every occurrence of `event`
    fn on(&self, path: &str, event: RealTimeEvent) -> EventStream;

    /// Subscribe to the next occurrence of `event`
    fn once(&self, path: &str, event: RealTimeEvent) -> EventStream;

    /// Drop subscriptions to `event`
    fn off(&self, path: &str, event: RealTimeEvent);
}

/// Provider speaking JSON over HTTP.
///
/// ```no_run
/// use rest_provider::{Application, Query, RestProvider};
/// use std::sync::Arc;
///
/// # async fn run() -> rest_provider::Result<()> {
/// let provider = Arc::new(RestProvider::new("https://api.example.com")?);
/// let app = Application::new(provider);
///
/// let users = app.service("users").find(Some(Query::new().limit(10))).await?;
/// if let Some(page) = users.pagination {
///     println!("{} of {} users", page.limit, page.total);
/// }
/// # Ok(())
/// # }
/// ```
pub struct RestProvider {
    client: Client,
    config: Config,
    observer: ObserverHandle,
}

impl RestProvider {
    /// Create a provider for `base_url` with default configuration
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(Config::new(base_url)?)
    }

    /// Create a provider with custom configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(RestProvider {
            client: create_rest_client(&config)?,
            config,
            observer: ObserverHandle::default(),
        })
    }

    /// Register an analytics observer without taking ownership of it
    pub fn with_analytics_observer(mut self, observer: &Arc<dyn AnalyticsObserver>) -> Self {
        self.observer = ObserverHandle::new(observer);
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Send `request` and collect its raw outcome, notifying the observer on both sides
    async fn exchange(&self, request_id: &str, request: PreparedRequest) -> RawOutcome {
        self.observer.will_send_request(request_id, Some(&request.url));

        let method = request.method;
        let start = Instant::now();
        let (outcome, final_url) = match request.into_reqwest(&self.client).send().await {
            Ok(response) => {
                let status = response.status();
                let url = response.url().clone();
                match response.bytes().await {
                    Ok(body) => (RawOutcome::from_http(status, body.to_vec()), Some(url)),
                    Err(e) => (RawOutcome::from_unread_body(status, e.to_string()), Some(url)),
                }
            }
            Err(e) => {
                let url = e.url().cloned();
                (RawOutcome::from_transport_error(&e), url)
            }
        };

        self.observer.did_receive_response(request_id, final_url.as_ref());

        if self.config.debug {
            debug!(
                request_id,
                method = ?method,
                url = ?final_url.as_ref().map(Url::as_str),
                elapsed_ms = start.elapsed().as_millis() as u64,
                failed = matches!(outcome, RawOutcome::Failure(_)),
                "exchange finished"
            );
        }

        outcome
    }

    fn authentication_call(
        self: Arc<Self>,
        path: &str,
        method: HttpMethod,
        parameters: Option<Map<String, Value>>,
        encoding: ParameterEncoding,
        name: &str,
    ) -> Producer<Response> {
        let provider = Arc::downgrade(&self);
        drop(self);
        let path = path.to_string();
        let request_id = format!("{}:{}", path, name);

        Producer::new(async move {
            let provider = upgrade(&provider)?;
            let request = PreparedRequest::authentication(
                &provider.config.base_url,
                &path,
                method,
                parameters.as_ref(),
                encoding,
            );
            let outcome = provider.exchange(&request_id, request).await;
            interpret(outcome, PARSING_FAILURE_MESSAGE).map_err(RestError::from)
        })
    }
}

fn upgrade(provider: &Weak<RestProvider>) -> Result<Arc<RestProvider>> {
    provider.upgrade().ok_or_else(|| {
        debug!("provider dropped before the call started");
        RestError::Interrupted
    })
}

impl Provider for RestProvider {
    fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    fn supports_realtime_events(&self) -> bool {
        false
    }

    fn setup(&self, _app: &Application) {
        debug!(base_url = %self.config.base_url, "rest provider registered");
    }

    fn request(self: Arc<Self>, endpoint: Endpoint) -> Producer<Response> {
        let provider = Arc::downgrade(&self);
        drop(self);

        Producer::new(async move {
            let provider = upgrade(&provider)?;
            let request_id = endpoint.request_id();
            let request = PreparedRequest::for_endpoint(&provider.config.base_url, &endpoint);
            let outcome = provider.exchange(&request_id, request).await;
            interpret(outcome, NO_VALID_RESPONSE_MESSAGE).map_err(RestError::from)
        })
    }

    fn authenticate(
        self: Arc<Self>,
        path: &str,
        credentials: Map<String, Value>,
    ) -> Producer<Response> {
        self.authentication_call(
            path,
            HttpMethod::Post,
            Some(credentials),
            ParameterEncoding::HttpBody,
            "authenticate",
        )
    }

    fn logout(self: Arc<Self>, path: &str) -> Producer<Response> {
        self.authentication_call(
            path,
            HttpMethod::Delete,
            None,
            ParameterEncoding::Default,
            "logout",
        )
    }

    fn on(&self, _path: &str, _event: RealTimeEvent) -> EventStream {
        stream::empty().boxed()
    }

    fn once(&self, _path: &str, _event: RealTimeEvent) -> EventStream {
        stream::empty().boxed()
    }

    fn off(&self, _path: &str, _event: RealTimeEvent) {}
}

impl std::fmt::Debug for RestProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestProvider")
            .field("config", &self.config)
            .field("observer", &self.observer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceMethod;

    #[test]
    fn test_provider_creation() {
        let provider = RestProvider::new("https://api.test/").unwrap();
        assert_eq!(provider.base_url().as_str(), "https://api.test/");
        assert!(!provider.supports_realtime_events());
        assert!(!provider.config().debug);
    }

    #[test]
    fn test_provider_with_config() {
        let config = Config::new("http://localhost:3030").unwrap().with_debug(true);
        let provider = RestProvider::with_config(config).unwrap();
        assert_eq!(provider.base_url().host_str(), Some("localhost"));
        assert!(provider.config().debug);
    }

    #[tokio::test]
    async fn test_realtime_streams_are_empty() {
        let provider = RestProvider::new("https://api.test/").unwrap();
        assert!(provider.on("users", RealTimeEvent::Created).next().await.is_none());
        assert!(provider.once("users", RealTimeEvent::Removed).next().await.is_none());
        provider.off("users", RealTimeEvent::Created);
    }

    #[tokio::test]
    async fn test_request_after_drop_is_interrupted() {
        let provider = Arc::new(RestProvider::new("https://api.test/").unwrap());
        let producer = provider
            .clone()
            .request(Endpoint::new("users", ServiceMethod::Find { query: None }));
        drop(provider);

        assert!(producer.await.unwrap_err().is_interrupted());
    }

    #[tokio::test]
    async fn test_logout_after_drop_is_interrupted() {
        let provider = Arc::new(RestProvider::new("https://api.test/").unwrap());
        let producer = provider.clone().logout("authentication");
        drop(provider);

        assert!(producer.await.unwrap_err().is_interrupted());
    }
}
