//! Notifies when a request's network activity begins or ends.

use std::sync::Arc;

use crate::error::Result;
use crate::plugin::Plugin;
use crate::response::Response;
use crate::target::Target;

/// Network activity change notification type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkActivityChange {
    Began,
    Ended,
}

/// Invokes a closure when a request begins and again when it ends, even if
/// the result is a failure. Useful for driving activity indicators.
pub struct NetworkActivityPlugin<T> {
    on_change: Arc<dyn Fn(NetworkActivityChange, &T) + Send + Sync>,
}

impl<T> NetworkActivityPlugin<T> {
    /// Create a plugin reporting activity changes to `on_change`.
    pub fn new(on_change: impl Fn(NetworkActivityChange, &T) + Send + Sync + 'static) -> Self {
        Self {
            on_change: Arc::new(on_change),
        }
    }
}

impl<T: Target> Plugin<T> for NetworkActivityPlugin<T> {
    fn will_send(&self, _request: &reqwest::Request, target: &T) {
        (self.on_change)(NetworkActivityChange::Began, target);
    }

    fn did_receive(&self, _result: &Result<Response>, target: &T) {
        (self.on_change)(NetworkActivityChange::Ended, target);
    }
}
