//! # Quill Shared
//!
//! Wire types of the HTTP surface: JSON page contexts, form bodies and the
//! RFC 7807 error document.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
