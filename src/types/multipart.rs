//! Multipart form-data part descriptors.

use bytes::Bytes;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// How the bytes for one form part are produced.
#[derive(Clone)]
pub enum FormDataProvider {
    /// The part body is an in-memory blob.
    Data(Bytes),
    /// The part body is read from a file on disk.
    File(PathBuf),
    /// The part body is produced by a replayable stream factory.
    ///
    /// The factory is invoked each time the part is sent, so the same
    /// descriptor can materialize more than one request.
    Stream {
        length: u64,
        factory: Arc<dyn Fn() -> reqwest::Body + Send + Sync>,
    },
}

impl fmt::Debug for FormDataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(data) => f.debug_tuple("Data").field(&data.len()).finish(),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Stream { length, .. } => {
                f.debug_struct("Stream").field("length", length).finish_non_exhaustive()
            }
        }
    }
}

/// Represents one part of a "multipart/form-data" upload.
///
/// A multipart request carries an ordered sequence of these.
#[derive(Debug, Clone)]
pub struct MultipartFormData {
    /// The method being used for providing the part's body.
    pub provider: FormDataProvider,
    /// The form field name.
    pub name: String,
    /// The file name, if any.
    pub file_name: Option<String>,
    /// The MIME type, if any.
    pub mime_type: Option<String>,
}

impl MultipartFormData {
    /// A part backed by an in-memory blob.
    pub fn data(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            provider: FormDataProvider::Data(data.into()),
            name: name.into(),
            file_name: None,
            mime_type: None,
        }
    }

    /// A part streamed from a file on disk.
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            provider: FormDataProvider::File(path.into()),
            name: name.into(),
            file_name: None,
            mime_type: None,
        }
    }

    /// A part streamed from a replayable body factory with a known length.
    pub fn stream(
        name: impl Into<String>,
        length: u64,
        factory: impl Fn() -> reqwest::Body + Send + Sync + 'static,
    ) -> Self {
        Self {
            provider: FormDataProvider::Stream {
                length,
                factory: Arc::new(factory),
            },
            name: name.into(),
            file_name: None,
            mime_type: None,
        }
    }

    /// Set the file name reported for this part.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Set the MIME type reported for this part.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}
