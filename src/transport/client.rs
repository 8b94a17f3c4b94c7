//! The default transport, backed by `reqwest`.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

use crate::transport::{
    RawResponse, Transfer, Transport, TransportFailure, TransportRequest, build_response,
};
use crate::types::{FormDataProvider, MultipartFormData, ProgressFn, ProgressResponse};
use crate::utils::headers::headermap_to_hashmap;

/// The default [`Transport`], dispatching over a shared `reqwest::Client`.
///
/// Connection pooling, TLS, redirects, and timeouts are the client's
/// concern; configure them on the `reqwest::Client` passed to
/// [`ReqwestTransport::with_client`].
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// A transport over a default `reqwest::Client`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport over a caller-configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn execute(
        &self,
        request: reqwest::Request,
        progress: Option<ProgressFn>,
    ) -> Result<RawResponse, TransportFailure> {
        let response = self
            .client
            .execute(request)
            .await
            .map_err(TransportFailure::new)?;

        let status_code = response.status().as_u16();
        let url = response.url().to_string();
        let headers = headermap_to_hashmap(response.headers());

        let data = response.bytes().await.map_err(|e| {
            // The body read failed after the response head arrived.
            TransportFailure::new(e).with_response(RawResponse {
                status_code,
                url: url.clone(),
                headers: headers.clone(),
                data: Bytes::new(),
            })
        })?;

        let raw = RawResponse {
            status_code,
            url,
            headers,
            data,
        };
        if let Some(progress) = progress {
            progress(ProgressResponse::finished(build_response(raw.clone(), None)));
        }
        Ok(raw)
    }

    async fn upload_file(
        &self,
        mut request: reqwest::Request,
        path: PathBuf,
        progress: Option<ProgressFn>,
    ) -> Result<RawResponse, TransportFailure> {
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(TransportFailure::new)?;
        let total = file
            .metadata()
            .await
            .map_err(TransportFailure::new)?
            .len();

        let stream = ReaderStream::new(file);
        let body = match (&progress, total) {
            (Some(progress), total) if total > 0 => {
                reqwest::Body::wrap_stream(count_progress(stream, total, progress.clone()))
            }
            _ => reqwest::Body::wrap_stream(stream),
        };
        *request.body_mut() = Some(body);
        self.execute(request, progress).await
    }

    async fn upload_multipart(
        &self,
        mut request: reqwest::Request,
        parts: Vec<MultipartFormData>,
        progress: Option<ProgressFn>,
    ) -> Result<RawResponse, TransportFailure> {
        // Multipart owns its boundary-based content type.
        request.headers_mut().remove(CONTENT_TYPE);

        let form = build_form(parts).await?;
        let request = reqwest::RequestBuilder::from_parts(self.client.clone(), request)
            .multipart(form)
            .build()
            .map_err(TransportFailure::new)?;
        self.execute(request, progress).await
    }

    async fn download(
        &self,
        request: reqwest::Request,
        destination: PathBuf,
        progress: Option<ProgressFn>,
    ) -> Result<RawResponse, TransportFailure> {
        let response = self
            .client
            .execute(request)
            .await
            .map_err(TransportFailure::new)?;

        let status_code = response.status().as_u16();
        let url = response.url().to_string();
        let headers = headermap_to_hashmap(response.headers());
        let total = response.content_length().unwrap_or(0);

        let partial = RawResponse {
            status_code,
            url: url.clone(),
            headers: headers.clone(),
            data: Bytes::new(),
        };

        let mut file = tokio::fs::File::create(&destination)
            .await
            .map_err(|e| TransportFailure::new(e).with_response(partial.clone()))?;

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| TransportFailure::new(e).with_response(partial.clone()))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| TransportFailure::new(e).with_response(partial.clone()))?;
            written += chunk.len() as u64;
            if let Some(progress) = &progress
                && total > 0
            {
                progress(ProgressResponse::new(written as f64 / total as f64));
            }
        }
        file.flush()
            .await
            .map_err(|e| TransportFailure::new(e).with_response(partial.clone()))?;

        // The payload lives at the destination; the response body stays empty.
        let raw = RawResponse {
            status_code,
            url,
            headers,
            data: Bytes::new(),
        };
        if let Some(progress) = progress {
            progress(ProgressResponse::finished(build_response(raw.clone(), None)));
        }
        Ok(raw)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: TransportRequest,
        progress: Option<ProgressFn>,
    ) -> Result<RawResponse, TransportFailure> {
        let TransportRequest { request, transfer } = request;
        match transfer {
            Transfer::Body => self.execute(request, progress).await,
            Transfer::UploadFile(path) => self.upload_file(request, path, progress).await,
            Transfer::UploadMultipart(parts) => {
                self.upload_multipart(request, parts, progress).await
            }
            Transfer::Download(destination) => {
                self.download(request, destination, progress).await
            }
        }
    }
}

fn count_progress<S>(
    stream: S,
    total: u64,
    progress: ProgressFn,
) -> impl futures_util::Stream<Item = std::io::Result<Bytes>> + Send + 'static
where
    S: futures_util::Stream<Item = std::io::Result<Bytes>> + Send + 'static,
{
    let sent = Arc::new(AtomicU64::new(0));
    stream.map(move |chunk| {
        if let Ok(chunk) = &chunk {
            let sent = sent.fetch_add(chunk.len() as u64, Ordering::Relaxed) + chunk.len() as u64;
            progress(ProgressResponse::new(sent as f64 / total as f64));
        }
        chunk
    })
}

async fn build_form(parts: Vec<MultipartFormData>) -> Result<Form, TransportFailure> {
    let mut form = Form::new();
    for descriptor in parts {
        let MultipartFormData {
            provider,
            name,
            file_name,
            mime_type,
        } = descriptor;

        let (mut part, guessed_mime, default_file_name) = match provider {
            FormDataProvider::Data(data) => (Part::bytes(data.to_vec()), None, None),
            FormDataProvider::File(path) => {
                let file = tokio::fs::File::open(&path)
                    .await
                    .map_err(TransportFailure::new)?;
                let part = Part::stream(reqwest::Body::wrap_stream(ReaderStream::new(file)));
                (part, guess_mime(&path), base_name(&path))
            }
            FormDataProvider::Stream { length, factory } => {
                (Part::stream_with_length(factory(), length), None, None)
            }
        };

        if let Some(file_name) = file_name.or(default_file_name) {
            part = part.file_name(file_name);
        }
        if let Some(mime) = mime_type.or(guessed_mime) {
            part = part.mime_str(&mime).map_err(TransportFailure::new)?;
        }
        form = form.part(name, part);
    }
    Ok(form)
}

fn guess_mime(path: &Path) -> Option<String> {
    mime_guess::from_path(path).first_raw().map(str::to_owned)
}

fn base_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
}
