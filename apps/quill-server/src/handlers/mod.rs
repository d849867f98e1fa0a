//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod posts;
mod profile;
mod views;

#[cfg(test)]
mod tests;

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};

use quill_core::Redirect;
use quill_core::pagination::PageRequest;
use quill_shared::ApiResponse;

use crate::middleware::error::AppError;

/// Configure all application routes.
///
/// Static segments are registered before the parameterised routes they
/// would otherwise be captured by.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::NotFound(err.to_string()).into()),
    )
    .app_data(
        web::FormConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .route("/health", web::get().to(health::health_check))
    .service(
        web::scope("/auth")
            .route("/login/", web::get().to(auth::login_form))
            .route("/login/", web::post().to(auth::login))
            .route("/register/", web::post().to(auth::register))
            .route("/logout/", web::post().to(auth::logout)),
    )
    .route("/", web::get().to(posts::index))
    .route("/category/{slug}/", web::get().to(posts::category_posts))
    .service(
        web::scope("/posts")
            .route("/create/", web::get().to(posts::create_form))
            .route("/create/", web::post().to(posts::create))
            .route("/{id}/", web::get().to(posts::detail))
            .route("/{id}/edit/", web::get().to(posts::edit_form))
            .route("/{id}/edit/", web::post().to(posts::edit))
            .route("/{id}/delete/", web::get().to(posts::delete_form))
            .route("/{id}/delete/", web::post().to(posts::delete))
            .route("/{post_id}/comment/", web::get().to(comments::add_form))
            .route("/{post_id}/comment/", web::post().to(comments::add))
            .route(
                "/{post_id}/edit_comment/{comment_id}/",
                web::get().to(comments::edit_form),
            )
            .route(
                "/{post_id}/edit_comment/{comment_id}/",
                web::post().to(comments::edit),
            )
            .route(
                "/{post_id}/delete_comment/{comment_id}/",
                web::get().to(comments::delete_form),
            )
            .route(
                "/{post_id}/delete_comment/{comment_id}/",
                web::post().to(comments::delete),
            ),
    )
    .service(
        web::scope("/profile")
            .route("/edit/", web::get().to(profile::edit_form))
            .route("/edit/", web::post().to(profile::edit))
            .route("/{username}/", web::get().to(profile::profile)),
    );
}

/// `?page=` as sent; anything unusable means the first page.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        PageRequest::parse(self.page.as_deref())
    }
}

/// 302 to `location`.
pub fn found(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn redirect(target: &Redirect) -> HttpResponse {
    found(&target.location())
}

/// A page context.
pub fn render<T: Serialize>(body: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(body))
}

/// A form page; rejected submissions are flagged `success: false`.
pub fn render_form<T: Serialize>(body: T, valid: bool) -> HttpResponse {
    if valid {
        render(body)
    } else {
        HttpResponse::Ok().json(ApiResponse::invalid(body))
    }
}
