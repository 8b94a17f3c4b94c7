//! A plugin for adding basic or bearer-type authorization headers.

use reqwest::header::{AUTHORIZATION, HeaderValue};
use std::collections::HashMap;
use std::sync::Arc;

use crate::endpoint::Endpoint;
use crate::plugin::Plugin;
use crate::target::Target;

/// The authorization header scheme applied by [`AccessTokenPlugin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationType {
    /// No header.
    None,
    /// The `Basic` scheme.
    Basic,
    /// The `Bearer` scheme.
    Bearer,
}

impl AuthorizationType {
    fn scheme(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Basic => Some("Basic"),
            Self::Bearer => Some("Bearer"),
        }
    }
}

/// Targets opting in to access-token authorization implement this alongside
/// [`Target`].
pub trait AuthorizationProvider {
    /// The authorization header to use for this target's requests.
    fn authorization_type(&self) -> AuthorizationType;
}

/// Adds `Authorization: Basic <token>` or `Authorization: Bearer <token>`
/// headers to requests whose target asks for them.
pub struct AccessTokenPlugin {
    token: Arc<dyn Fn() -> String + Send + Sync>,
}

impl AccessTokenPlugin {
    /// Create a plugin whose closure returns the token applied in the
    /// pattern `Authorization: <type> <token>`.
    pub fn new(token: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self {
            token: Arc::new(token),
        }
    }
}

impl<T> Plugin<T> for AccessTokenPlugin
where
    T: Target + AuthorizationProvider,
{
    fn prepare(&self, endpoint: Endpoint, target: &T) -> Endpoint {
        let Some(scheme) = target.authorization_type().scheme() else {
            return endpoint;
        };
        let value = format!("{scheme} {}", (self.token)());
        if HeaderValue::from_str(&value).is_err() {
            tracing::warn!(
                target: "reqtarget::plugin",
                url = %endpoint.url,
                "access token produced an invalid authorization header value"
            );
            return endpoint;
        }
        endpoint.adding(HashMap::from([(AUTHORIZATION.as_str().to_string(), value)]))
    }
}
