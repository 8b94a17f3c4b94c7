//! reqtarget
//!
//! A request-abstraction layer between application code and an HTTP
//! transport. Application code declares [`Target`]s (endpoint descriptors
//! with a base URL, path, method, task, headers, and canned sample data)
//! instead of building transport requests directly. A [`Provider`] turns a
//! target into a concrete request, optionally short-circuits the network
//! with a stubbed response, runs the exchange through an ordered chain of
//! [`Plugin`]s, and delivers a typed result to the caller.
//!
//! ```rust,ignore
//! use reqtarget::{Provider, immediately_stub};
//!
//! let provider = Provider::builder().stub(immediately_stub).build();
//! let handle = provider.request(Api::Zen);
//! let response = handle.join().await.unwrap()?;
//! assert_eq!(response.status_code, 200);
//! ```
#![deny(unsafe_code)]

pub mod encoding;
pub mod endpoint;
pub mod error;
pub mod plugin;
pub mod provider;
pub mod response;
pub mod target;
pub mod transport;
pub mod types;
pub mod utils;

pub use encoding::ParameterEncoding;
pub use endpoint::{Endpoint, SampleResponse, SampleResponseFn};
pub use error::Error;
pub use plugin::Plugin;
pub use provider::{
    EndpointFn, Provider, ProviderBuilder, RequestFn, RequestHandle, StubBehavior, StubFn,
    default_endpoint_mapping, default_request_mapping, delayed_stub, immediately_stub, never_stub,
};
pub use response::{RequestInfo, Response, ResponseInfo};
pub use target::Target;
pub use transport::{
    RawResponse, ReqwestTransport, Transfer, Transport, TransportFailure, TransportRequest,
};
pub use types::{
    FormDataProvider, Method, MultipartFormData, Parameters, ProgressFn, ProgressResponse, Task,
    TaskKind,
};
pub use utils::cancel::CancelToken;
