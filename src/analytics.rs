//! Optional observer notified around each HTTP exchange.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use url::Url;

/// Listener told when a request is about to be sent and when its response arrived.
///
/// `request_id` has the form `<path>:<method>`. `url` is absent when no URL
/// could be resolved.
pub trait AnalyticsObserver: Send + Sync {
    fn will_send_request(&self, request_id: &str, url: Option<&Url>);
    fn did_receive_response(&self, request_id: &str, url: Option<&Url>);
}

/// Non-owning registration of an [`AnalyticsObserver`].
///
/// The observer stays owned by whoever registered it; once it is dropped the
/// registration silently stops notifying.
#[derive(Clone, Default)]
pub struct ObserverHandle {
    observer: Option<Weak<dyn AnalyticsObserver>>,
}

impl ObserverHandle {
    /// Register `observer` without keeping it alive
    pub fn new(observer: &Arc<dyn AnalyticsObserver>) -> Self {
        ObserverHandle {
            observer: Some(Arc::downgrade(observer)),
        }
    }

    /// Whether an observer is registered and still alive
    pub fn is_registered(&self) -> bool {
        self.observer
            .as_ref()
            .is_some_and(|observer| observer.strong_count() > 0)
    }

    pub fn will_send_request(&self, request_id: &str, url: Option<&Url>) {
        self.notify(request_id, |observer| observer.will_send_request(request_id, url));
    }

    pub fn did_receive_response(&self, request_id: &str, url: Option<&Url>) {
        self.notify(request_id, |observer| observer.did_receive_response(request_id, url));
    }

    fn notify<F>(&self, request_id: &str, callback: F)
    where
        F: FnOnce(&dyn AnalyticsObserver),
    {
        let Some(observer) = self.observer.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        if catch_unwind(AssertUnwindSafe(|| callback(observer.as_ref()))).is_err() {
            tracing::warn!(request_id, "analytics observer panicked, ignoring");
        }
    }
}

impl std::fmt::Debug for ObserverHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverHandle")
            .field("registered", &self.is_registered())
            .finish()
    }
}
