//! Small shared utilities.

pub mod cancel;
pub mod headers;
