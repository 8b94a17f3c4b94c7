//! The transport abstraction.
//!
//! The core never speaks HTTP on the wire; it hands a materialized request
//! to an injectable [`Transport`] and interprets whatever comes back. A
//! custom transport can observe the final request and return a synthetic
//! response without touching the network at all.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{Error, SharedError};
use crate::response::{RequestInfo, Response, ResponseInfo};
use crate::types::{MultipartFormData, ProgressFn, Task};

mod client;

pub use client::ReqwestTransport;

/// How the transport moves the payload for a request.
#[derive(Debug, Clone)]
pub enum Transfer {
    /// An ordinary exchange; the body, if any, is already on the request.
    Body,
    /// Stream the file at the given path as the request body.
    UploadFile(PathBuf),
    /// Send the parts as a "multipart/form-data" body.
    UploadMultipart(Vec<MultipartFormData>),
    /// Stream the response body to the given destination path.
    Download(PathBuf),
}

impl Transfer {
    /// Derive the transfer shape from a task.
    pub fn from_task(task: &Task) -> Self {
        match task {
            Task::UploadFile(path) => Self::UploadFile(path.clone()),
            Task::UploadMultipart(parts) => Self::UploadMultipart(parts.clone()),
            Task::UploadCompositeMultipart { parts, .. } => {
                Self::UploadMultipart(parts.clone())
            }
            Task::DownloadDestination(destination) => Self::Download(destination.clone()),
            Task::DownloadParameters { destination, .. } => {
                Self::Download(destination.clone())
            }
            _ => Self::Body,
        }
    }
}

/// A materialized request paired with its transfer shape.
#[derive(Debug)]
pub struct TransportRequest {
    pub request: reqwest::Request,
    pub transfer: Transfer,
}

/// Transport-level response data.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status_code: u16,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub data: Bytes,
}

/// A transport failure, optionally carrying the partial response that was
/// obtained before the failure.
#[derive(Debug, Clone)]
pub struct TransportFailure {
    pub source: SharedError,
    pub response: Option<RawResponse>,
}

impl TransportFailure {
    /// A failure with no response obtained.
    pub fn new<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            source: std::sync::Arc::new(source),
            response: None,
        }
    }

    /// Attach the response obtained before the failure.
    pub fn with_response(mut self, response: RawResponse) -> Self {
        self.response = Some(response);
        self
    }
}

/// The network collaborator: given a request, eventually produces a raw
/// response or a failure.
///
/// Non-2xx statuses are *successful* transport outcomes; status policy is
/// the caller's business (see [`Response::filter`]). Transports are not
/// forcibly interrupted on cancellation; the pipeline simply stops waiting.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: TransportRequest,
        progress: Option<ProgressFn>,
    ) -> Result<RawResponse, TransportFailure>;
}

/// Convert a transport outcome into the terminal request result.
pub(crate) fn convert_to_result(
    outcome: Result<RawResponse, TransportFailure>,
    request: Option<RequestInfo>,
) -> crate::error::Result<Response> {
    match outcome {
        Ok(raw) => Ok(build_response(raw, request)),
        Err(TransportFailure {
            source,
            response: Some(raw),
        }) => Err(Error::Underlying {
            source,
            response: Some(build_response(raw, request)),
        }),
        Err(TransportFailure {
            source,
            response: None,
        }) => Err(Error::Underlying {
            source,
            response: None,
        }),
    }
}

pub(crate) fn build_response(raw: RawResponse, request: Option<RequestInfo>) -> Response {
    let mut response = Response::new(raw.status_code, raw.data).with_response(ResponseInfo {
        url: raw.url,
        headers: raw.headers,
    });
    response.request = request;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status_code: u16) -> RawResponse {
        RawResponse {
            status_code,
            url: "https://api.example.com/quotes".into(),
            headers: HashMap::new(),
            data: Bytes::from_static(b"body"),
        }
    }

    #[test]
    fn successful_outcomes_become_responses_with_metadata() {
        let result = convert_to_result(Ok(raw(404)), None);
        let response = result.unwrap();
        assert_eq!(response.status_code, 404, "status policy is the caller's");
        assert!(response.response.is_some());
    }

    #[test]
    fn failures_with_a_response_keep_it_attached() {
        let failure = TransportFailure::new(std::io::Error::other("reset")).with_response(raw(200));
        let err = convert_to_result(Err(failure), None).unwrap_err();
        assert_eq!(err.response().map(|r| r.status_code), Some(200));
    }

    #[test]
    fn failures_without_a_response_stay_bare() {
        let err = convert_to_result(
            Err(TransportFailure::new(std::io::Error::other("refused"))),
            None,
        )
        .unwrap_err();
        assert!(err.response().is_none());
    }

    #[test]
    fn transfer_shape_follows_the_task() {
        assert!(matches!(
            Transfer::from_task(&Task::RequestPlain),
            Transfer::Body
        ));
        assert!(matches!(
            Transfer::from_task(&Task::UploadFile("/tmp/f".into())),
            Transfer::UploadFile(_)
        ));
        assert!(matches!(
            Transfer::from_task(&Task::DownloadDestination("/tmp/d".into())),
            Transfer::Download(_)
        ));
    }
}
