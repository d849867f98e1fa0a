//! Authentication extractors.
//!
//! A caller is identified by a `Bearer` token or, for browsers, by the
//! [`AUTH_COOKIE`]. Protected handlers take [`Identity`]; a request without
//! valid credentials, or whose account no longer exists, is redirected to the
//! login page with `?next=<path>`.

use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, web};
use futures::future::LocalBoxFuture;
use uuid::Uuid;

use quill_core::Viewer;
use quill_core::domain::User;
use quill_core::ports::AuthError;

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Cookie holding the access token.
pub const AUTH_COOKIE: &str = "quill_token";

/// Authenticated user identity extractor.
///
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

impl Identity {
    pub fn viewer(&self) -> Viewer {
        Viewer::new(self.user_id)
    }
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
        }
    }
}

/// Rejected credentials; answered with a redirect to the login page.
#[derive(Debug)]
pub struct AuthenticationError {
    pub reason: AuthError,
    /// Login URL including the `next` parameter.
    pub login_location: String,
}

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, self.login_location.as_str()))
            .finish()
    }
}

/// `login_url?next=<path and query>`.
pub fn login_location(login_url: &str, req: &HttpRequest) -> String {
    let next = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    let separator = if login_url.contains('?') { '&' } else { '?' };
    format!("{login_url}{separator}next={encoded}")
}

/// The raw token from the `Authorization` header or the auth cookie.
fn credentials(req: &HttpRequest) -> Result<String, AuthError> {
    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;
        return value
            .strip_prefix("Bearer ")
            .map(str::to_string)
            .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()));
    }

    req.cookie(AUTH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingAuth)
}

async fn authenticate(req: &HttpRequest) -> Result<Identity, actix_web::Error> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        tracing::error!("AppState not found in app data");
        return Err(AppError::Internal("Server configuration error".to_string()).into());
    };

    let reject = |reason: AuthError| {
        tracing::debug!(path = %req.path(), %reason, "authentication required");
        AuthenticationError {
            reason,
            login_location: login_location(&state.login_url, req),
        }
    };

    let token = credentials(req).map_err(reject)?;
    let claims = state.tokens.validate_token(&token).map_err(reject)?;

    // Tokens outlive deleted accounts.
    let user = state
        .users()
        .find_by_id(claims.user_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| reject(AuthError::InvalidCredentials))?;
    Ok(Identity::from(user))
}

impl FromRequest for Identity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { authenticate(&req).await })
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn viewer(&self) -> Option<Viewer> {
        self.0.as_ref().map(Identity::viewer)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { Ok(OptionalIdentity(authenticate(&req).await.ok())) })
    }
}
