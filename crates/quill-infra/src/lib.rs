//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! repositories (PostgreSQL via SeaORM, or in-memory) and authentication.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM

pub mod auth;
pub mod database;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{DatabaseConfig, InMemoryStore};

#[cfg(feature = "postgres")]
pub use database::{DatabaseConnections, postgres_repositories};
