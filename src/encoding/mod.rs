//! Parameter encoding for materialized requests.
//!
//! Parameter-carrying [`Task`](crate::Task) variants delegate here: JSON body
//! encoding serializes the parameter map into the request body, URL-query
//! encoding appends percent-encoded pairs to the request URL.

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde_json::Value;
use thiserror::Error;

use crate::types::Parameters;

/// How a parameter map is encoded into a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterEncoding {
    /// Percent-encoded pairs appended to the URL query string.
    UrlQuery,
    /// A JSON object serialized into the request body.
    JsonBody,
}

/// Errors produced while encoding parameters.
#[derive(Debug, Clone, Error)]
pub enum EncodeError {
    #[error("parameters failed to serialize as JSON: {0}")]
    Serialize(String),
    #[error("URL-query encoding cannot be used for a request body")]
    QueryAsBody,
    #[error("URL `{0}` cannot carry query parameters")]
    UnsupportedUrl(String),
}

/// Apply the given encoding to the request.
pub(crate) fn apply(
    request: &mut reqwest::Request,
    parameters: &Parameters,
    encoding: ParameterEncoding,
) -> Result<(), EncodeError> {
    match encoding {
        ParameterEncoding::UrlQuery => encode_query(request, parameters),
        ParameterEncoding::JsonBody => encode_body(request, parameters),
    }
}

/// Append the parameters to the request URL's query string.
pub(crate) fn encode_query(
    request: &mut reqwest::Request,
    parameters: &Parameters,
) -> Result<(), EncodeError> {
    let url = request.url_mut();
    if url.cannot_be_a_base() {
        return Err(EncodeError::UnsupportedUrl(url.to_string()));
    }
    let mut pairs = url.query_pairs_mut();
    for (key, value) in parameters {
        pairs.append_pair(key, &scalar(value));
    }
    Ok(())
}

/// Serialize the parameters as a JSON body and tag the content type.
pub(crate) fn encode_body(
    request: &mut reqwest::Request,
    parameters: &Parameters,
) -> Result<(), EncodeError> {
    let payload =
        serde_json::to_vec(parameters).map_err(|e| EncodeError::Serialize(e.to_string()))?;
    request
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    *request.body_mut() = Some(payload.into());
    Ok(())
}

// Query values are rendered flat: strings verbatim, everything else via its
// JSON representation.
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
