//! Error handling for the request pipeline.
//!
//! The taxonomy is closed: request-construction failures (`RequestMapping`,
//! `ParameterEncoding`) never carry a response, while response-interpretation
//! failures always carry the triggering [`Response`] (optional for
//! `Underlying`, since some transport errors occur before any response
//! exists).

use std::sync::Arc;
use thiserror::Error;

use crate::response::Response;

/// A shared, cloneable error cause.
///
/// Causes are `Arc`-held so a single terminal result can be fanned out to
/// every coalesced in-flight waiter.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// A type representing the possible failures of a request.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The response failed to map to an image.
    #[error("failed to map data to an image")]
    ImageMapping(Response),

    /// The response failed to map to a JSON structure.
    #[error("failed to map data to JSON")]
    JsonMapping(Response),

    /// The response failed to map to a string.
    #[error("failed to map data to a string")]
    StringMapping(Response),

    /// The response carried a status code outside the accepted range.
    #[error("status code did not fall within the given range")]
    StatusCode(Response),

    /// The request failed due to an underlying error.
    #[error("request failed due to an underlying error: {source}")]
    Underlying {
        #[source]
        source: SharedError,
        response: Option<Response>,
    },

    /// An endpoint failed to map to a request.
    #[error("failed to map endpoint to a request: {url}")]
    RequestMapping { url: String },

    /// An endpoint failed to encode the parameters for the request.
    #[error("failed to encode parameters for the request: {source}")]
    ParameterEncoding {
        #[source]
        source: SharedError,
    },
}

impl Error {
    /// Wrap an underlying cause, optionally paired with the response that
    /// was obtained before the failure.
    pub fn underlying<E>(source: E, response: Option<Response>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Underlying {
            source: Arc::new(source),
            response,
        }
    }

    /// A request-mapping failure for the given URL.
    pub fn request_mapping(url: impl Into<String>) -> Self {
        Self::RequestMapping { url: url.into() }
    }

    /// A parameter-encoding failure with the given cause.
    pub fn parameter_encoding<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ParameterEncoding {
            source: Arc::new(source),
        }
    }

    /// The response associated with the failure, if any.
    ///
    /// Mapping-time failures (`RequestMapping`, `ParameterEncoding`) have
    /// none.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::ImageMapping(response)
            | Self::JsonMapping(response)
            | Self::StringMapping(response)
            | Self::StatusCode(response) => Some(response),
            Self::Underlying { response, .. } => response.as_ref(),
            Self::RequestMapping { .. } | Self::ParameterEncoding { .. } => None,
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
