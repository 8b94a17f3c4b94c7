//! Stubbing policy and stub response synthesis.

use std::time::Duration;

use crate::endpoint::SampleResponse;
use crate::error::{Error, Result};
use crate::response::{RequestInfo, Response};

/// Controls how stub responses are returned.
///
/// Evaluated once per request by the provider's stub closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubBehavior {
    /// Do not stub; dispatch over the transport.
    Never,
    /// Synthesize the sample response without delay.
    Immediate,
    /// Synthesize the sample response after the given delay.
    Delayed(Duration),
}

/// Turn a sample into the terminal result a stub dispatch delivers.
pub(crate) fn sample_to_result(
    sample: SampleResponse,
    request: Option<RequestInfo>,
) -> Result<Response> {
    match sample {
        SampleResponse::NetworkResponse { status_code, data } => {
            let mut response = Response::new(status_code, data);
            response.request = request;
            Ok(response)
        }
        SampleResponse::Response {
            status_code,
            info,
            data,
        } => {
            let mut response = Response::new(status_code, data).with_response(info);
            response.request = request;
            Ok(response)
        }
        SampleResponse::NetworkError(source) => Err(Error::Underlying {
            source,
            response: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::sync::Arc;

    #[test]
    fn network_samples_become_successful_responses() {
        let sample = SampleResponse::NetworkResponse {
            status_code: 201,
            data: Bytes::from_static(b"created"),
        };
        let response = sample_to_result(sample, None).unwrap();
        assert_eq!(response.status_code, 201);
        assert_eq!(&response.data[..], b"created");
        assert!(response.response.is_none());
    }

    #[test]
    fn error_samples_become_underlying_failures() {
        let sample = SampleResponse::NetworkError(Arc::new(std::io::Error::other("timeout")));
        let err = sample_to_result(sample, None).unwrap_err();
        assert!(matches!(err, Error::Underlying { response: None, .. }));
    }
}
