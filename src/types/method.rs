//! HTTP method enumeration.

use std::fmt;

/// Represents an HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Options,
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Trace,
    Connect,
}

impl Method {
    /// The canonical verb string for this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Options => "OPTIONS",
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Trace => "TRACE",
            Self::Connect => "CONNECT",
        }
    }

    /// Whether the method is allowed to carry a multipart body.
    pub fn supports_multipart(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch | Self::Connect)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Options => reqwest::Method::OPTIONS,
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Trace => reqwest::Method::TRACE,
            Method::Connect => reqwest::Method::CONNECT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multipart_support_matches_body_carrying_verbs() {
        let supported = [Method::Post, Method::Put, Method::Patch, Method::Connect];
        let unsupported = [
            Method::Options,
            Method::Get,
            Method::Head,
            Method::Delete,
            Method::Trace,
        ];

        for method in supported {
            assert!(method.supports_multipart(), "{method} should allow multipart");
        }
        for method in unsupported {
            assert!(!method.supports_multipart(), "{method} should not allow multipart");
        }
    }

    #[test]
    fn display_is_the_canonical_verb() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Patch.to_string(), "PATCH");
    }
}
