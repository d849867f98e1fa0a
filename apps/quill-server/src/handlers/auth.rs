//! Login, registration and logout.
//!
//! A successful login or sign-up stores the access token in the
//! [`AUTH_COOKIE`] and redirects.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use quill_core::Redirect;
use quill_core::domain::User;
use quill_core::error::RepoError;
use quill_core::forms::{FormErrors, FormState, RegisterForm};
use quill_shared::dto::{FieldErrors, LoginPageResponse, LoginRequest};

use super::{found, render, render_form, views};
use crate::middleware::auth::AUTH_COOKIE;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const BAD_LOGIN: &str = "Please enter a correct username and password.";
const USERNAME_TAKEN: &str = "A user with that username already exists.";

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Only same-site paths are followed after login.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

fn auth_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.cookie_secure)
        .finish()
}

fn signed_in(state: &AppState, user: &User, location: &str) -> AppResult<HttpResponse> {
    let token = state.tokens.generate_token(user.id, &user.username)?;
    let mut response = found(location);
    response
        .add_cookie(&auth_cookie(state, token))
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}

/// GET /auth/login/
pub async fn login_form(query: web::Query<NextQuery>) -> HttpResponse {
    render(LoginPageResponse {
        username: String::new(),
        next: query.into_inner().next,
        errors: FieldErrors::new(),
    })
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = form.into_inner();

    let user = state.users().find_by_username(req.username.trim()).await?;
    let valid = match &user {
        Some(user) => state.passwords.verify(&req.password, &user.password_hash)?,
        None => {
            state.passwords.verify_unknown_user(&req.password);
            false
        }
    };

    let Some(user) = user.filter(|_| valid) else {
        tracing::info!(username = %req.username, "login rejected");
        let mut errors = FieldErrors::new();
        errors.insert("__all__".to_string(), vec![BAD_LOGIN.to_string()]);
        return Ok(render_form(
            LoginPageResponse {
                username: req.username,
                next: req.next,
                errors,
            },
            false,
        ));
    };

    tracing::info!(user_id = %user.id, "user logged in");
    signed_in(&state, &user, safe_next(req.next.as_deref()))
}

/// POST /auth/register/
pub async fn register(
    state: web::Data<AppState>,
    form: web::Form<RegisterForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let rejected = |form: RegisterForm, errors: FormErrors| {
        render_form(views::form(FormState::invalid(form, errors)), false)
    };

    let cleaned = match form.clean() {
        Ok(cleaned) => cleaned,
        Err(errors) => return Ok(rejected(form, errors)),
    };
    let mut taken = FormErrors::new();
    taken.add("username", USERNAME_TAKEN);

    if state.users().find_by_username(&cleaned.username).await?.is_some() {
        return Ok(rejected(form, taken));
    }

    let password_hash = state.passwords.hash(&cleaned.password)?;
    let user = User::new(cleaned.username, cleaned.email, password_hash);
    let user = match state.users().insert(user).await {
        Ok(user) => user,
        Err(RepoError::Constraint(_)) => return Ok(rejected(form, taken)),
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");
    signed_in(
        &state,
        &user,
        &Redirect::Profile(user.username.clone()).location(),
    )
}

/// POST /auth/logout/
pub async fn logout(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let mut cookie = auth_cookie(&state, String::new());
    cookie.make_removal();

    let mut response = found("/");
    response
        .add_cookie(&cookie)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/posts/create/")), "/posts/create/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("/\\evil")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
