//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{PasswordService, TokenService, UserRepository};
use quill_core::{BlogService, Repositories};
use quill_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService};

#[cfg(feature = "postgres")]
use quill_infra::{DatabaseConnections, postgres_repositories};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: BlogService,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub login_url: String,
    pub cookie_secure: bool,
    /// Backend actually in use, reported by the health check.
    pub storage: &'static str,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (repos, storage) = Self::repositories(config).await;
        let mut state = Self::from_parts(
            repos,
            Arc::new(JwtTokenService::from_env()),
            Arc::new(Argon2PasswordService::new()),
            config.login_url.clone(),
            storage,
        );

        state.cookie_secure = config.cookie_secure;

        tracing::info!(storage, "Application state initialized");
        state
    }

    pub fn from_parts(
        repos: Repositories,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        login_url: String,
        storage: &'static str,
    ) -> Self {
        Self {
            blog: BlogService::new(repos),
            tokens,
            passwords,
            login_url,
            cookie_secure: false,
            storage,
        }
    }

    pub fn users(&self) -> &Arc<dyn UserRepository> {
        &self.blog.repositories().users
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> (Repositories, &'static str) {
        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return (in_memory(), "memory");
        };

        match DatabaseConnections::init(db_config).await {
            Ok(connections) => (postgres_repositories(connections.main), "postgres"),
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                (in_memory(), "memory")
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(_config: &AppConfig) -> (Repositories, &'static str) {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        (in_memory(), "memory")
    }
}

fn in_memory() -> Repositories {
    InMemoryStore::repositories(Arc::new(InMemoryStore::new()))
}
