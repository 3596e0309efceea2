pub mod checksum;
pub mod context;
pub mod http;

// Re-export main utilities
pub use checksum::{ChecksumAlgorithm, UnknownAlgorithm};
pub use context::{CallContext, Interrupted};
pub use http::{http_status_is_ok, request, HttpError, ResponseData};
