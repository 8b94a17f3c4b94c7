//! The target abstraction implemented by application code.

use bytes::Bytes;
use std::collections::HashMap;

use crate::types::{Method, Task};

/// An application-level descriptor of one API endpoint.
///
/// Application code declares targets instead of building transport requests
/// directly; the [`Provider`](crate::Provider) maps a target to an
/// [`Endpoint`](crate::Endpoint) and drives the request pipeline from there.
/// Targets are usually small enums, one variant per API call.
pub trait Target: Send + Sync + 'static {
    /// The target's base URL.
    fn base_url(&self) -> String;

    /// The path appended to `base_url` to form the full URL.
    fn path(&self) -> String;

    /// The HTTP method used in the request.
    fn method(&self) -> Method;

    /// The type of HTTP task to be performed.
    fn task(&self) -> Task;

    /// Canned data used when the request is stubbed.
    fn sample_data(&self) -> Bytes;

    /// The headers to be used in the request.
    fn headers(&self) -> Option<HashMap<String, String>> {
        None
    }
}
