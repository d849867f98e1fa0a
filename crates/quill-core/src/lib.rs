//! # Quill Core
//!
//! The domain layer of the Quill blog.
//! Entities, the publishing rules, form validation and the request-level
//! service live here; storage is reached only through the traits in [`ports`].

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod policy;
pub mod ports;
pub mod service;

pub use error::{DomainError, RepoError};
pub use policy::Viewer;
pub use service::{BlogService, Outcome, Redirect, Repositories};
