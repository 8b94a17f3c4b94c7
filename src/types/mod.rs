//! Core value types: method, task, multipart parts, and progress reporting.

pub mod method;
pub mod multipart;
pub mod progress;
pub mod task;

pub use method::Method;
pub use multipart::{FormDataProvider, MultipartFormData};
pub use progress::{ProgressFn, ProgressResponse};
pub use task::{Parameters, Task, TaskKind};
