//! Progress reporting for streaming uploads and downloads.

use std::sync::Arc;

use crate::response::Response;

/// Callback invoked as a transfer makes progress.
pub type ProgressFn = Arc<dyn Fn(ProgressResponse) + Send + Sync>;

/// A snapshot of the progress of a request.
#[derive(Debug, Clone, Default)]
pub struct ProgressResponse {
    /// The response of the request, present once it completed.
    pub response: Option<Response>,
    /// The fraction of the overall work completed, if known.
    pub progress_value: Option<f64>,
}

impl ProgressResponse {
    /// A progress snapshot at the given completed fraction.
    pub fn new(progress: f64) -> Self {
        Self {
            response: None,
            progress_value: Some(progress),
        }
    }

    /// The terminal snapshot carrying the finished response.
    pub fn finished(response: Response) -> Self {
        Self {
            response: Some(response),
            progress_value: Some(1.0),
        }
    }

    /// The fraction of the overall work completed. Defaults to `1.0` when the
    /// transfer has no measurable length.
    pub fn progress(&self) -> f64 {
        self.progress_value.unwrap_or(1.0)
    }

    /// Whether the request is completed: progress reached `1.0` and a
    /// response is present.
    pub fn completed(&self) -> bool {
        self.progress() == 1.0 && self.response.is_some()
    }
}
