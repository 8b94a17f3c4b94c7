//! The request body/transfer shape.

use bytes::Bytes;
use std::path::PathBuf;

use crate::encoding::ParameterEncoding;
use crate::types::MultipartFormData;

/// A map of request parameters, encoded per [`ParameterEncoding`].
pub type Parameters = serde_json::Map<String, serde_json::Value>;

/// Represents the body and transfer shape of a request.
///
/// Exactly one variant is active per request; the variant determines how an
/// [`Endpoint`](crate::Endpoint) materializes the transport body and how the
/// transport moves the payload.
#[derive(Debug, Clone)]
pub enum Task {
    /// A request with no additional data.
    RequestPlain,
    /// A request body set with data.
    RequestData(Bytes),
    /// A request body set with encoded parameters.
    RequestParameters {
        parameters: Parameters,
        encoding: ParameterEncoding,
    },
    /// A request body set with data, combined with URL parameters.
    RequestCompositeData {
        body: Bytes,
        url_parameters: Parameters,
    },
    /// A request body set with encoded parameters combined with URL parameters.
    RequestCompositeParameters {
        body_parameters: Parameters,
        body_encoding: ParameterEncoding,
        url_parameters: Parameters,
    },
    /// A file upload task.
    UploadFile(PathBuf),
    /// A "multipart/form-data" upload task.
    UploadMultipart(Vec<MultipartFormData>),
    /// A "multipart/form-data" upload task combined with URL parameters.
    UploadCompositeMultipart {
        parts: Vec<MultipartFormData>,
        url_parameters: Parameters,
    },
    /// A file download task to a destination.
    DownloadDestination(PathBuf),
    /// A file download task to a destination with extra parameters.
    DownloadParameters {
        parameters: Parameters,
        encoding: ParameterEncoding,
        destination: PathBuf,
    },
}

/// The discriminant of a [`Task`], used for endpoint identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    RequestPlain,
    RequestData,
    RequestParameters,
    RequestCompositeData,
    RequestCompositeParameters,
    UploadFile,
    UploadMultipart,
    UploadCompositeMultipart,
    DownloadDestination,
    DownloadParameters,
}

impl Task {
    /// The variant discriminant, without any payload.
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::RequestPlain => TaskKind::RequestPlain,
            Self::RequestData(_) => TaskKind::RequestData,
            Self::RequestParameters { .. } => TaskKind::RequestParameters,
            Self::RequestCompositeData { .. } => TaskKind::RequestCompositeData,
            Self::RequestCompositeParameters { .. } => TaskKind::RequestCompositeParameters,
            Self::UploadFile(_) => TaskKind::UploadFile,
            Self::UploadMultipart(_) => TaskKind::UploadMultipart,
            Self::UploadCompositeMultipart { .. } => TaskKind::UploadCompositeMultipart,
            Self::DownloadDestination(_) => TaskKind::DownloadDestination,
            Self::DownloadParameters { .. } => TaskKind::DownloadParameters,
        }
    }
}
