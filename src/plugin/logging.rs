//! A simple logging plugin backed by `tracing` (no request bodies).

use crate::error::Result;
use crate::plugin::Plugin;
use crate::response::Response;
use crate::target::Target;

/// Logs outgoing requests and their results at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingPlugin;

impl<T: Target> Plugin<T> for LoggingPlugin {
    fn will_send(&self, request: &reqwest::Request, _target: &T) {
        tracing::debug!(
            target: "reqtarget::provider",
            method = %request.method(),
            url = %request.url(),
            "sending request"
        );
    }

    fn did_receive(&self, result: &Result<Response>, _target: &T) {
        match result {
            Ok(response) => tracing::debug!(
                target: "reqtarget::provider",
                status = response.status_code,
                bytes = response.data.len(),
                "response received"
            ),
            Err(error) => tracing::debug!(
                target: "reqtarget::provider",
                err = %error,
                "request failed"
            ),
        }
    }
}
