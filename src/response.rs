//! The response delivered to a provider's caller.

use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;

use crate::error::{Error, Result};
use crate::types::Method;

/// A lightweight description of the outgoing request a response belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    /// The request verb.
    pub method: String,
    /// The final request URL.
    pub url: String,
    /// The request headers as sent.
    pub headers: HashMap<String, String>,
}

impl RequestInfo {
    pub(crate) fn from_request(request: &reqwest::Request) -> Self {
        Self {
            method: request.method().to_string(),
            url: request.url().to_string(),
            headers: crate::utils::headers::headermap_to_hashmap(request.headers()),
        }
    }
}

/// Transport-level response metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseInfo {
    /// The URL the response was served from.
    pub url: String,
    /// The response headers (string-valued only).
    pub headers: HashMap<String, String>,
}

/// Represents a response to a [`Provider`](crate::Provider) request.
#[derive(Debug, Clone)]
pub struct Response {
    /// The status code of the response.
    pub status_code: u16,
    /// The response data.
    pub data: Bytes,
    /// The originating request, when known.
    pub request: Option<RequestInfo>,
    /// The transport response metadata, when a real response was obtained.
    pub response: Option<ResponseInfo>,
}

impl Response {
    /// Create a response with no request/response metadata attached.
    pub fn new(status_code: u16, data: Bytes) -> Self {
        Self {
            status_code,
            data,
            request: None,
            response: None,
        }
    }

    /// Attach the originating request description.
    pub fn with_request(mut self, request: RequestInfo) -> Self {
        self.request = Some(request);
        self
    }

    /// Attach the transport response metadata.
    pub fn with_response(mut self, response: ResponseInfo) -> Self {
        self.response = Some(response);
        self
    }

    /// Returns the response if its status code falls within the given range,
    /// otherwise fails with [`Error::StatusCode`].
    pub fn filter(self, status_codes: RangeInclusive<u16>) -> Result<Self> {
        if status_codes.contains(&self.status_code) {
            Ok(self)
        } else {
            Err(Error::StatusCode(self))
        }
    }

    /// Returns the response if its status code equals `status_code`.
    pub fn filter_status_code(self, status_code: u16) -> Result<Self> {
        self.filter(status_code..=status_code)
    }

    /// Returns the response if the status code falls within 200–299.
    pub fn filter_successful_status_codes(self) -> Result<Self> {
        self.filter(200..=299)
    }

    /// Returns the response if the status code falls within 200–399.
    pub fn filter_successful_status_and_redirect_codes(self) -> Result<Self> {
        self.filter(200..=399)
    }

    /// Maps the response data into a JSON value.
    ///
    /// When `fails_on_empty_data` is false, an empty body maps to
    /// `serde_json::Value::Null` instead of failing.
    pub fn map_json(&self, fails_on_empty_data: bool) -> Result<serde_json::Value> {
        match serde_json::from_slice(&self.data) {
            Ok(value) => Ok(value),
            Err(_) if self.data.is_empty() && !fails_on_empty_data => {
                Ok(serde_json::Value::Null)
            }
            Err(_) => Err(Error::JsonMapping(self.clone())),
        }
    }

    /// Maps the response data into a UTF-8 string.
    pub fn map_string(&self) -> Result<String> {
        std::str::from_utf8(&self.data)
            .map(str::to_owned)
            .map_err(|_| Error::StringMapping(self.clone()))
    }

    /// Maps the string found at a dot-separated key path of the JSON body.
    pub fn map_string_at_key_path(&self, key_path: &str) -> Result<String> {
        let json = self
            .map_json(true)
            .map_err(|_| Error::StringMapping(self.clone()))?;
        let mut value = &json;
        for segment in key_path.split('.') {
            value = value
                .get(segment)
                .ok_or_else(|| Error::StringMapping(self.clone()))?;
        }
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| Error::StringMapping(self.clone()))
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Status Code: {}, Data Length: {}",
            self.status_code,
            self.data.len()
        )
    }
}

// Equality is structural over status code, data, and the transport response;
// the originating request is deliberately excluded.
impl PartialEq for Response {
    fn eq(&self, other: &Self) -> bool {
        self.status_code == other.status_code
            && self.data == other.data
            && self.response == other.response
    }
}

impl Eq for Response {}

// Convenience for building request descriptions by hand, e.g. in stubs.
impl RequestInfo {
    /// A minimal request description from a verb and URL.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method: method.to_string(),
            url: url.into(),
            headers: HashMap::new(),
        }
    }
}
