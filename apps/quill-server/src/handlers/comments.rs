//! Comment forms and deletion.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::Outcome;
use quill_core::forms::CommentForm;
use quill_core::service::CommentPage;
use quill_shared::dto::CommentPageResponse;

use super::{redirect, render, render_form, views};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn comment_page(outcome: Outcome<CommentPage>) -> HttpResponse {
    match outcome {
        Outcome::Render(page) => {
            let valid = page.form.is_valid();
            let body = CommentPageResponse {
                comment: page.comment.as_ref().map(views::comment),
                form: views::form(page.form),
            };
            render_form(body, valid)
        }
        Outcome::Redirect(target) => redirect(&target),
    }
}

/// GET /posts/{post_id}/comment/
pub async fn add_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .blog
        .comment_form(&identity.viewer(), *path, None)
        .await?;
    Ok(comment_page(outcome))
}

/// POST /posts/{post_id}/comment/
pub async fn add(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .blog
        .save_comment(&identity.viewer(), *path, None, form.into_inner())
        .await?;
    Ok(comment_page(outcome))
}

/// GET /posts/{post_id}/edit_comment/{comment_id}/
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let outcome = state
        .blog
        .comment_form(&identity.viewer(), post_id, Some(comment_id))
        .await?;
    Ok(comment_page(outcome))
}

/// POST /posts/{post_id}/edit_comment/{comment_id}/
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let outcome = state
        .blog
        .save_comment(&identity.viewer(), post_id, Some(comment_id), form.into_inner())
        .await?;
    Ok(comment_page(outcome))
}

/// GET /posts/{post_id}/delete_comment/{comment_id}/
pub async fn delete_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let outcome = state
        .blog
        .delete_comment_form(&identity.viewer(), post_id, comment_id)
        .await?;
    Ok(match outcome {
        Outcome::Render(card) => render(views::comment(&card)),
        Outcome::Redirect(target) => redirect(&target),
    })
}

/// POST /posts/{post_id}/delete_comment/{comment_id}/
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let target = state
        .blog
        .delete_comment(&identity.viewer(), post_id, comment_id)
        .await?;
    Ok(redirect(&target))
}
