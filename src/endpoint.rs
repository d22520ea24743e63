use crate::client::AuthConfig;
use crate::encoding::encode_parameters;
use crate::service::ServiceMethod;
use url::Url;

/// One resolved service call: resource path, call description and credentials.
///
/// Built per call and owned by that call's execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    /// Resource path, e.g. `users`
    pub path: String,
    /// Call description
    pub method: ServiceMethod,
    /// Optional access token sent in the auth header
    pub access_token: Option<String>,
    /// Auth header configuration
    pub auth: AuthConfig,
}

impl Endpoint {
    /// Create an endpoint without credentials
    pub fn new(path: impl Into<String>, method: ServiceMethod) -> Self {
        Endpoint {
            path: path.into(),
            method,
            access_token: None,
            auth: AuthConfig::default(),
        }
    }

    /// Set the access token
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the auth configuration
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// `<path>:<method>` identifier reported to analytics observers
    pub fn request_id(&self) -> String {
        format!("{}:{}", self.path, self.method.name())
    }

    /// Absolute URL of the call against `base_url`.
    ///
    /// Never fails: if the query items cannot be applied the URL is returned
    /// without them.
    pub fn url(&self, base_url: &Url) -> Url {
        let mut url = append_path(base_url, &self.path);
        if let Some(id) = self.method.id() {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push(id);
            }
        }

        let Some(parameters) = self.method.parameters() else {
            return url;
        };
        let items = encode_parameters(&parameters);
        if items.is_empty() {
            return url;
        }

        if url.cannot_be_a_base() {
            tracing::warn!(url = %url, "cannot apply query items, sending without them");
            return url;
        }
        url.query_pairs_mut().extend_pairs(items);
        url
    }
}

/// Append `component` as path segment(s) of `base`, keeping any existing path.
pub(crate) fn append_path(base: &Url, component: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend(component.split('/').filter(|s| !s.is_empty()));
    }
    url
}
