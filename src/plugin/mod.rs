//! The plugin pipeline.
//!
//! A plugin receives callbacks to perform side effects whenever a request is
//! sent or received. For example, a plugin may be used to
//! - log network requests,
//! - drive a network activity indicator,
//! - inject additional information into a request.
//!
//! Every registered plugin is invoked in registration order at each of the
//! four lifecycle points; `prepare` and `process` fold, feeding plugin i's
//! output to plugin i+1. Plugins must not assume anything about sibling
//! plugins beyond that ordering.

use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::response::Response;
use crate::target::Target;

pub mod access_token;
pub mod logging;
pub mod network_activity;

pub use access_token::{AccessTokenPlugin, AuthorizationProvider, AuthorizationType};
pub use logging::LoggingPlugin;
pub use network_activity::{NetworkActivityChange, NetworkActivityPlugin};

/// Lifecycle hooks observed or applied around every request.
///
/// All four hooks are optional; the defaults pass endpoints and results
/// through unchanged.
pub trait Plugin<T: Target>: Send + Sync {
    /// Called to modify an endpoint before it materializes into a request.
    /// Runs unconditionally, even when materialization subsequently fails.
    fn prepare(&self, endpoint: Endpoint, _target: &T) -> Endpoint {
        endpoint
    }

    /// Called immediately before a request is sent over the network (or
    /// stubbed). Observation only.
    fn will_send(&self, _request: &reqwest::Request, _target: &T) {}

    /// Called to modify a result before completion.
    fn process(&self, result: Result<Response>, _target: &T) -> Result<Response> {
        result
    }

    /// Called after a response has been received, but before the provider
    /// invokes its completion. Observation only.
    fn did_receive(&self, _result: &Result<Response>, _target: &T) {}
}
