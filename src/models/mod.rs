//! Data models module
//!
//! Request descriptors, payload shapes and the backend's success envelope

pub mod envelope;
pub mod request;

pub use envelope::{is_envelope, is_error_envelope, unwrap_envelope, Page};
pub use request::{
    Credential, FilePart, ListQuery, MultipartPayload, Payload, RequestDescriptor, SortOrder,
};
