//! Application context that owns credentials and hands out services.

use crate::client::AuthConfig;
use crate::endpoint::Endpoint;
use crate::error::RestError;
use crate::producer::Producer;
use crate::provider::{EventStream, Provider};
use crate::query::Query;
use crate::response::Response;
use crate::service::{Data, RealTimeEvent, ServiceMethod};
use serde_json::{Map, Value};
use std::sync::{Arc, PoisonError, RwLock};

/// Owner of a provider, its auth configuration and the current access token.
pub struct Application {
    provider: Arc<dyn Provider>,
    auth: AuthConfig,
    access_token: Arc<RwLock<Option<String>>>,
}

impl Application {
    /// Register `provider` with a new application; calls [`Provider::setup`] once
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        let app = Application {
            provider,
            auth: AuthConfig::default(),
            access_token: Arc::new(RwLock::new(None)),
        };
        app.provider.setup(&app);
        app
    }

    /// Set the auth configuration
    pub fn with_auth_config(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Get the provider
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Get the auth configuration
    pub fn auth_config(&self) -> &AuthConfig {
        &self.auth
    }

    /// Current access token, if authenticated
    pub fn access_token(&self) -> Option<String> {
        self.access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the stored access token
    pub fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Get a handle on the service at `path`
    pub fn service(&self, path: impl Into<String>) -> Service<'_> {
        Service {
            app: self,
            path: path.into(),
        }
    }

    /// Authenticate with `credentials`, storing the returned `accessToken`
    pub fn authenticate(&self, credentials: Map<String, Value>) -> Producer<Response> {
        let login = self.provider.clone().authenticate(&self.auth.path, credentials);
        let storage = self.access_token.clone();

        Producer::new(async move {
            let response = login.await?;
            if let Some(token) = response.get_string("accessToken") {
                *storage.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
            }
            Ok::<_, RestError>(response)
        })
    }

    /// End the session; the stored access token is forgotten once the server confirms
    pub fn logout(&self) -> Producer<Response> {
        let logout = self.provider.clone().logout(&self.auth.path);
        let storage = self.access_token.clone();

        Producer::new(async move {
            let response = logout.await?;
            *storage.write().unwrap_or_else(PoisonError::into_inner) = None;
            Ok::<_, RestError>(response)
        })
    }

    fn endpoint(&self, path: &str, method: ServiceMethod) -> Endpoint {
        let endpoint = Endpoint::new(path, method).with_auth(self.auth.clone());
        match self.access_token() {
            Some(token) => endpoint.with_access_token(token),
            None => endpoint,
        }
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("base_url", &self.provider.base_url().as_str())
            .field("auth", &self.auth)
            .field("authenticated", &self.access_token().is_some())
            .finish()
    }
}

/// Handle on one resource path of an [`Application`].
#[derive(Debug)]
pub struct Service<'a> {
    app: &'a Application,
    path: String,
}

impl Service<'_> {
    /// Resource path of the service
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Execute an arbitrary call against this service
    pub fn request(&self, method: ServiceMethod) -> Producer<Response> {
        let endpoint = self.app.endpoint(&self.path, method);
        self.app.provider.clone().request(endpoint)
    }

    pub fn find(&self, query: Option<Query>) -> Producer<Response> {
        self.request(ServiceMethod::Find { query })
    }

    pub fn get(&self, id: impl Into<String>, query: Option<Query>) -> Producer<Response> {
        self.request(ServiceMethod::Get { id: id.into(), query })
    }

    pub fn create(&self, data: Data, query: Option<Query>) -> Producer<Response> {
        self.request(ServiceMethod::Create { data, query })
    }

    pub fn update(
        &self,
        id: Option<String>,
        data: Data,
        query: Option<Query>,
    ) -> Producer<Response> {
        self.request(ServiceMethod::Update { id, data, query })
    }

    pub fn patch(
        &self,
        id: Option<String>,
        data: Data,
        query: Option<Query>,
    ) -> Producer<Response> {
        self.request(ServiceMethod::Patch { id, data, query })
    }

    pub fn remove(&self, id: Option<String>, query: Option<Query>) -> Producer<Response> {
        self.request(ServiceMethod::Remove { id, query })
    }

    /// Subscribe to every occurrence of `event` on this service
    pub fn on(&self, event: RealTimeEvent) -> EventStream {
        self.app.provider.on(&self.path, event)
    }

    /// Subscribe to the next occurrence of `event` on this service
    pub fn once(&self, event: RealTimeEvent) -> EventStream {
        self.app.provider.once(&self.path, event)
    }

    /// Drop subscriptions to `event` on this service
    pub fn off(&self, event: RealTimeEvent) {
        self.app.provider.off(&self.path, event)
    }
}
