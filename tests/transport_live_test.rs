//! Live-transport tests against a local mock HTTP server.

use bytes::Bytes;
use reqtarget::{
    Error, Method, MultipartFormData, ParameterEncoding, ProgressResponse, Provider, Target, Task,
};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_string, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Clone)]
struct ApiTarget {
    base: String,
    path: String,
    method: Method,
    task: Task,
}

impl ApiTarget {
    fn get(server: &MockServer, path: &str) -> Self {
        Self {
            base: server.uri(),
            path: path.into(),
            method: Method::Get,
            task: Task::RequestPlain,
        }
    }

    fn post(server: &MockServer, path: &str, task: Task) -> Self {
        Self {
            base: server.uri(),
            path: path.into(),
            method: Method::Post,
            task,
        }
    }
}

impl Target for ApiTarget {
    fn base_url(&self) -> String {
        self.base.clone()
    }

    fn path(&self) -> String {
        self.path.clone()
    }

    fn method(&self) -> Method {
        self.method
    }

    fn task(&self) -> Task {
        self.task.clone()
    }

    fn sample_data(&self) -> Bytes {
        Bytes::new()
    }
}

#[tokio::test]
async fn get_request_returns_body_and_response_info() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"pong".as_slice())
                .insert_header("x-served-by", "wiremock"),
        )
        .mount(&server)
        .await;

    let provider = Provider::new();
    let response = provider
        .request(ApiTarget::get(&server, "/ping"))
        .join()
        .await
        .expect("not cancelled")
        .expect("transport success");

    assert_eq!(response.status_code, 200);
    assert_eq!(&response.data[..], b"pong");
    let info = response.response.as_ref().expect("live response info");
    assert_eq!(info.headers.get("x-served-by").map(String::as_str), Some("wiremock"));
}

#[tokio::test]
async fn non_2xx_status_is_a_completed_response_until_filtered() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provider = Provider::new();
    let response = provider
        .request(ApiTarget::get(&server, "/missing"))
        .join()
        .await
        .unwrap()
        .expect("a 404 still completes the transport");

    assert_eq!(response.status_code, 404);
    let err = response.filter_successful_status_codes().unwrap_err();
    assert!(matches!(err, Error::StatusCode(_)));
}

#[tokio::test]
async fn raw_body_data_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(body_string("hello"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let provider = Provider::new();
    let response = provider
        .request(ApiTarget::post(
            &server,
            "/echo",
            Task::RequestData(Bytes::from_static(b"hello")),
        ))
        .join()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(response.status_code, 201);
}

#[tokio::test]
async fn url_parameters_are_encoded_into_the_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut parameters = serde_json::Map::new();
    parameters.insert("page".into(), serde_json::json!(2));
    let target = ApiTarget {
        base: server.uri(),
        path: "/search".into(),
        method: Method::Get,
        task: Task::RequestParameters {
            parameters,
            encoding: ParameterEncoding::UrlQuery,
        },
    };

    let response = Provider::new().request(target).join().await.unwrap().unwrap();
    assert_eq!(response.status_code, 200);
}

#[tokio::test]
async fn upload_file_streams_the_file_contents() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string("file payload"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("payload.txt");
    std::fs::write(&file_path, b"file payload").unwrap();

    let response = Provider::new()
        .request(ApiTarget::post(
            &server,
            "/upload",
            Task::UploadFile(file_path),
        ))
        .join()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(response.status_code, 200);
}

#[tokio::test]
async fn multipart_upload_carries_every_part() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/form"))
        .and(body_string_contains("first part"))
        .and(body_string_contains("second part"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let parts = vec![
        MultipartFormData::data("one", Bytes::from_static(b"first part")),
        MultipartFormData::data("two", Bytes::from_static(b"second part"))
            .with_file_name("two.txt")
            .with_mime_type("text/plain"),
    ];

    let response = Provider::new()
        .request(ApiTarget::post(
            &server,
            "/form",
            Task::UploadMultipart(parts),
        ))
        .join()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(response.status_code, 200);
}

#[tokio::test]
async fn download_with_parameters_sends_the_query_and_writes_the_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/export"))
        .and(query_param("format", "csv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"a,b,c".as_slice()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("export.csv");
    let mut parameters = serde_json::Map::new();
    parameters.insert("format".into(), serde_json::json!("csv"));
    let target = ApiTarget {
        base: server.uri(),
        path: "/export".into(),
        method: Method::Get,
        task: Task::DownloadParameters {
            parameters,
            encoding: ParameterEncoding::UrlQuery,
            destination: destination.clone(),
        },
    };

    let response = Provider::new().request(target).join().await.unwrap().unwrap();
    assert_eq!(response.status_code, 200);
    assert_eq!(std::fs::read(&destination).unwrap(), b"a,b,c");
}

#[tokio::test]
async fn download_writes_to_destination_and_reports_progress() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/archive"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"download payload".as_slice()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("archive.bin");
    let target = ApiTarget {
        base: server.uri(),
        path: "/archive".into(),
        method: Method::Get,
        task: Task::DownloadDestination(destination.clone()),
    };

    let updates: Arc<Mutex<Vec<ProgressResponse>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = updates.clone();
    let response = Provider::new()
        .request_with_progress(
            target,
            Some(Arc::new(move |progress| {
                sink.lock().unwrap().push(progress);
            })),
        )
        .join()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(response.status_code, 200);
    assert!(response.data.is_empty(), "downloads do not buffer the body");
    assert_eq!(std::fs::read(&destination).unwrap(), b"download payload");

    let updates = updates.lock().unwrap();
    let last = updates.last().expect("at least the final update");
    assert!(last.completed());
    assert_eq!(last.progress(), 1.0);
}
