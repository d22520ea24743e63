//! # rest-provider - REST transport for a transport-agnostic data-service client
//!
//! Translates service calls (find/get/create/update/patch/remove against a
//! named resource) into HTTP requests and translates the responses back into
//! one normalized shape, so application code gets the same contract whatever
//! transport sits underneath.
//!
//! ## Features
//!
//! - Nested query encoding (`$sort[name]=1`, `$select[0]=id`, `role[$in][0]=admin`)
//! - Response normalization:
//!   - plain lists
//!   - paginated `{total, limit, skip, data}` objects
//!   - single objects
//! - Normalized error payloads, whether the server sent one or not
//! - Optional analytics observer, held weakly
//! - Cancellable single-shot producers; cancellation is distinct from failure
//!
//! ## Basic Usage
//!
//! ```no_run
//! use rest_provider::{Application, Query, RestProvider, SortOrder};
//! use serde::Deserialize;
//! use std::sync::Arc;
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = Arc::new(RestProvider::new("https://api.example.com")?);
//!     let app = Application::new(provider);
//!
//!     let query = Query::new().limit(25).sort("name", SortOrder::Ascending);
//!     let response = app.service("users").find(Some(query)).await?;
//!
//!     let users: Vec<User> = response.decode()?;
//!     for user in users {
//!         println!("{} ({})", user.name, user.id);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! ```no_run
//! use rest_provider::{json, Application, RestProvider};
//! use std::sync::Arc;
//!
//! # async fn run() -> rest_provider::Result<()> {
//! let app = Application::new(Arc::new(RestProvider::new("https://api.example.com")?));
//!
//! let credentials = json!({"strategy": "local", "email": "me@example.com", "password": "secret"});
//! if let rest_provider::Value::Object(credentials) = credentials {
//!     app.authenticate(credentials).await?;
//! }
//! assert!(app.access_token().is_some());
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod app;
pub mod client;
pub mod encoding;
pub mod endpoint;
pub mod error;
pub mod producer;
pub mod provider;
pub mod query;
pub mod request;
pub mod response;
pub mod service;

// Re-export main types for convenience
pub use analytics::{AnalyticsObserver, ObserverHandle};
pub use app::{Application, Service};
pub use client::{AuthConfig, Config};
pub use endpoint::Endpoint;
pub use error::{NormalizedError, RestError, Result};
pub use producer::Producer;
pub use provider::{EventStream, Provider, RestProvider};
pub use query::{PropertyOperator, Query, SortOrder};
pub use response::{Pagination, Payload, Response};
pub use service::{Data, RealTimeEvent, ServiceMethod};

// Re-export serde_json for convenience
pub use serde_json::{json, Value};
