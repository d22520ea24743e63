use crate::error::Result;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use url::Url;

/// Create the HTTP client for REST requests
/// with settings for connection pooling and timeouts taken from the config
pub fn create_rest_client(config: &Config) -> Result<Client> {
    let client = ClientBuilder::new()
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()?;
    Ok(client)
}

/// Configuration for the REST provider
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL every resource path is resolved against
    pub base_url: Url,
    /// Overall request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,
    /// Enable per-exchange timing logs
    pub debug: bool,
}

impl Config {
    /// Create a new configuration for the given base URL
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Config {
            base_url: Url::parse(base_url)?,
            timeout: Duration::from_secs(300), // 5 minutes
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 50,
            debug: false,
        })
    }

    /// Set the overall request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Authentication settings shared by an application and its endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Header the access token is sent in
    pub header: String,
    /// Path of the authentication service
    pub path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            header: "Authorization".to_string(),
            path: "authentication".to_string(),
        }
    }
}

impl AuthConfig {
    /// Set the header name carrying the access token
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Set the authentication service path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}
