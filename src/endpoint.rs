//! Reifying a target into a concrete, materializable endpoint.

use bytes::Bytes;
use reqwest::header::{HeaderName, HeaderValue};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::encoding::{self, ParameterEncoding};
use crate::error::{Error, Result, SharedError};
use crate::response::ResponseInfo;
use crate::types::{Method, Task};

/// The canned outcome used when a request is stubbed.
#[derive(Debug, Clone)]
pub enum SampleResponse {
    /// The network returned a response with a status code and data.
    NetworkResponse { status_code: u16, data: Bytes },
    /// The network returned a fully customized response.
    Response {
        status_code: u16,
        info: ResponseInfo,
        data: Bytes,
    },
    /// The network failed to send the request or to retrieve a response.
    NetworkError(SharedError),
}

/// Producer of the canned response for stub dispatch.
pub type SampleResponseFn = Arc<dyn Fn() -> SampleResponse + Send + Sync>;

/// An immutable descriptor that can materialize into a transport request or
/// a sample response.
///
/// Endpoints are created once per outgoing call by the provider's endpoint
/// mapping, consumed by [`Endpoint::request`], then discarded; "mutation" is
/// always copy-on-write via [`Endpoint::adding`] and [`Endpoint::replacing`].
#[derive(Clone)]
pub struct Endpoint {
    /// A string representation of the URL for the request.
    pub url: String,
    /// Producer of the canned response used when the request is stubbed.
    pub sample_response: SampleResponseFn,
    /// The HTTP method for the request.
    pub method: Method,
    /// The task for the request.
    pub task: Task,
    /// The HTTP header fields for the request.
    pub headers: Option<HashMap<String, String>>,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("task", &self.task)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl Endpoint {
    /// Create an endpoint from its parts.
    pub fn new(
        url: impl Into<String>,
        sample_response: SampleResponseFn,
        method: Method,
        task: Task,
        headers: Option<HashMap<String, String>>,
    ) -> Self {
        Self {
            url: url.into(),
            sample_response,
            method,
            task,
            headers,
        }
    }

    /// A copy of the endpoint with the given header fields merged in.
    ///
    /// The argument wins on key collision; an empty argument leaves the
    /// headers untouched.
    pub fn adding(mut self, new_headers: HashMap<String, String>) -> Self {
        if new_headers.is_empty() {
            return self;
        }
        let headers = self.headers.get_or_insert_with(HashMap::new);
        headers.extend(new_headers);
        self
    }

    /// A copy of the endpoint with only the task replaced.
    pub fn replacing(mut self, task: Task) -> Self {
        self.task = task;
        self
    }

    /// Materialize the endpoint into a transport request.
    ///
    /// Fails with [`Error::RequestMapping`] when the URL does not parse as a
    /// valid absolute URL, and with [`Error::ParameterEncoding`] when a
    /// parameter-carrying task fails to encode.
    pub fn request(&self) -> Result<reqwest::Request> {
        let url: reqwest::Url = self
            .url
            .parse()
            .map_err(|_| Error::request_mapping(&self.url))?;
        let mut request = reqwest::Request::new(self.method.into(), url);

        if let Some(fields) = &self.headers {
            let headers = request.headers_mut();
            for (name, value) in fields {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| Error::underlying(e, None))?;
                let value =
                    HeaderValue::from_str(value).map_err(|e| Error::underlying(e, None))?;
                headers.insert(name, value);
            }
        }

        match &self.task {
            // Upload and download payloads are handled by the transport; the
            // materialized request carries no body for them.
            Task::RequestPlain
            | Task::UploadFile(_)
            | Task::UploadMultipart(_)
            | Task::DownloadDestination(_) => {}
            Task::RequestData(data) => {
                *request.body_mut() = Some(data.clone().into());
            }
            Task::RequestParameters {
                parameters,
                encoding,
            } => {
                encoding::apply(&mut request, parameters, *encoding)
                    .map_err(Error::parameter_encoding)?;
            }
            Task::RequestCompositeData {
                body,
                url_parameters,
            } => {
                *request.body_mut() = Some(body.clone().into());
                encoding::encode_query(&mut request, url_parameters)
                    .map_err(Error::parameter_encoding)?;
            }
            Task::RequestCompositeParameters {
                body_parameters,
                body_encoding,
                url_parameters,
            } => {
                if *body_encoding == ParameterEncoding::UrlQuery {
                    return Err(Error::parameter_encoding(
                        encoding::EncodeError::QueryAsBody,
                    ));
                }
                encoding::apply(&mut request, body_parameters, *body_encoding)
                    .map_err(Error::parameter_encoding)?;
                encoding::encode_query(&mut request, url_parameters)
                    .map_err(Error::parameter_encoding)?;
            }
            Task::UploadCompositeMultipart { url_parameters, .. } => {
                encoding::encode_query(&mut request, url_parameters)
                    .map_err(Error::parameter_encoding)?;
            }
            Task::DownloadParameters {
                parameters,
                encoding,
                ..
            } => {
                encoding::apply(&mut request, parameters, *encoding)
                    .map_err(Error::parameter_encoding)?;
            }
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> SampleResponseFn {
        Arc::new(|| SampleResponse::NetworkResponse {
            status_code: 200,
            data: Bytes::from_static(b"sample"),
        })
    }

    fn endpoint(task: Task) -> Endpoint {
        Endpoint::new(
            "https://api.example.com/quotes",
            sample(),
            Method::Post,
            task,
            None,
        )
    }

    fn parameters() -> crate::types::Parameters {
        let serde_json::Value::Object(map) = json!({"page": 2}) else {
            unreachable!()
        };
        map
    }

    #[test]
    fn adding_empty_headers_is_a_noop() {
        let original = endpoint(Task::RequestPlain);
        let unchanged = original.clone().adding(HashMap::new());
        assert_eq!(unchanged.headers, original.headers);
    }

    #[test]
    fn adding_merges_and_later_values_win() {
        let endpoint = endpoint(Task::RequestPlain)
            .adding(HashMap::from([("x-token".into(), "1".into())]))
            .adding(HashMap::from([
                ("x-token".into(), "2".into()),
                ("accept".into(), "application/json".into()),
            ]));

        let headers = endpoint.headers.unwrap();
        assert_eq!(headers.get("x-token").map(String::as_str), Some("2"));
        assert_eq!(
            headers.get("accept").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn replacing_swaps_only_the_task() {
        let original = endpoint(Task::RequestPlain);
        let replaced = original
            .clone()
            .replacing(Task::RequestData(Bytes::from_static(b"body")));

        assert!(matches!(replaced.task, Task::RequestData(_)));
        assert_eq!(replaced.url, original.url);
        assert_eq!(replaced.method, original.method);
        assert_eq!(replaced.headers, original.headers);
    }

    #[test]
    fn materialize_sets_method_url_and_headers() {
        let request = endpoint(Task::RequestPlain)
            .adding(HashMap::from([("x-request-id".into(), "abc".into())]))
            .request()
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "https://api.example.com/quotes");
        assert_eq!(request.headers().get("x-request-id").unwrap(), "abc");
    }

    #[test]
    fn materialize_fails_on_an_invalid_url() {
        let broken = Endpoint::new("not a url", sample(), Method::Get, Task::RequestPlain, None);
        match broken.request() {
            Err(Error::RequestMapping { url }) => assert_eq!(url, "not a url"),
            other => panic!("expected RequestMapping, got {other:?}"),
        }
    }

    #[test]
    fn data_task_sets_the_body() {
        let request = endpoint(Task::RequestData(Bytes::from_static(b"payload")))
            .request()
            .unwrap();
        assert_eq!(request.body().unwrap().as_bytes().unwrap(), b"payload");
    }

    #[test]
    fn upload_and_download_tasks_leave_the_body_untouched() {
        for task in [
            Task::UploadFile("/tmp/upload.bin".into()),
            Task::UploadMultipart(Vec::new()),
            Task::DownloadDestination("/tmp/download.bin".into()),
        ] {
            let request = endpoint(task).request().unwrap();
            assert!(request.body().is_none());
        }
    }

    #[test]
    fn composite_data_sets_body_and_query() {
        let request = endpoint(Task::RequestCompositeData {
            body: Bytes::from_static(b"payload"),
            url_parameters: parameters(),
        })
        .request()
        .unwrap();

        assert_eq!(request.body().unwrap().as_bytes().unwrap(), b"payload");
        assert_eq!(request.url().query(), Some("page=2"));
    }

    #[test]
    fn composite_parameters_reject_query_encoding_for_the_body() {
        let err = endpoint(Task::RequestCompositeParameters {
            body_parameters: parameters(),
            body_encoding: ParameterEncoding::UrlQuery,
            url_parameters: parameters(),
        })
        .request()
        .unwrap_err();

        assert!(matches!(err, Error::ParameterEncoding { .. }));
    }

    #[test]
    fn composite_parameters_encode_body_and_query() {
        let request = endpoint(Task::RequestCompositeParameters {
            body_parameters: parameters(),
            body_encoding: ParameterEncoding::JsonBody,
            url_parameters: parameters(),
        })
        .request()
        .unwrap();

        assert_eq!(request.url().query(), Some("page=2"));
        let body: serde_json::Value =
            serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(body, json!({"page": 2}));
    }

    #[test]
    fn composite_multipart_encodes_the_query_and_leaves_the_body_untouched() {
        let request = endpoint(Task::UploadCompositeMultipart {
            parts: Vec::new(),
            url_parameters: parameters(),
        })
        .request()
        .unwrap();

        assert_eq!(request.url().query(), Some("page=2"));
        assert!(request.body().is_none(), "multipart bodies are the transport's");
    }

    #[test]
    fn download_parameters_encode_into_the_query() {
        let request = endpoint(Task::DownloadParameters {
            parameters: parameters(),
            encoding: ParameterEncoding::UrlQuery,
            destination: "/tmp/archive.bin".into(),
        })
        .request()
        .unwrap();

        assert_eq!(request.url().query(), Some("page=2"));
        assert!(request.body().is_none());
    }

    #[test]
    fn download_parameters_encode_into_the_body() {
        let request = endpoint(Task::DownloadParameters {
            parameters: parameters(),
            encoding: ParameterEncoding::JsonBody,
            destination: "/tmp/archive.bin".into(),
        })
        .request()
        .unwrap();

        assert_eq!(request.url().query(), None);
        let body: serde_json::Value =
            serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(body, json!({"page": 2}));
    }

    #[test]
    fn invalid_header_names_surface_as_underlying_errors() {
        let broken = endpoint(Task::RequestPlain)
            .adding(HashMap::from([("bad header".into(), "x".into())]));
        assert!(matches!(
            broken.request(),
            Err(Error::Underlying { response: None, .. })
        ));
    }
}
