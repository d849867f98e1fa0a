//! Listings, post detail and post editing.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::Outcome;
use quill_core::forms::{FormState, PostForm};
use quill_shared::dto::{CategoryPageResponse, FormResponse, PostDetailResponse};

use super::{PageQuery, redirect, render, render_form, views};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.blog.index(query.request()).await?;
    Ok(render(views::posts(&page)))
}

/// GET /category/{slug}/
pub async fn category_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let listing = state.blog.category_posts(&path, query.request()).await?;
    Ok(render(CategoryPageResponse {
        category: views::category(&listing.category),
        posts: views::posts(&listing.page),
    }))
}

/// GET /posts/{id}/
pub async fn detail(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let viewer = identity.viewer();
    let detail = state.blog.post_detail(*path, viewer.as_ref()).await?;
    Ok(render(PostDetailResponse {
        post: views::post(&detail.card),
        comments: detail.comments.iter().map(views::comment).collect(),
        form: views::form(FormState::new(detail.form)),
    }))
}

fn post_form(outcome: Outcome<FormState<PostForm>>) -> HttpResponse {
    match outcome {
        Outcome::Render(state) => {
            let valid = state.is_valid();
            let body: FormResponse<PostForm> = views::form(state);
            render_form(body, valid)
        }
        Outcome::Redirect(target) => redirect(&target),
    }
}

/// GET /posts/create/
pub async fn create_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let outcome = state.blog.post_form(&identity.viewer(), None).await?;
    Ok(post_form(outcome))
}

/// POST /posts/create/
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .blog
        .save_post(&identity.viewer(), None, form.into_inner())
        .await?;
    Ok(post_form(outcome))
}

/// GET /posts/{id}/edit/
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let outcome = state.blog.post_form(&identity.viewer(), Some(*path)).await?;
    Ok(post_form(outcome))
}

/// POST /posts/{id}/edit/
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .blog
        .save_post(&identity.viewer(), Some(*path), form.into_inner())
        .await?;
    Ok(post_form(outcome))
}

/// GET /posts/{id}/delete/
pub async fn delete_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .blog
        .delete_post_form(&identity.viewer(), *path)
        .await?;
    Ok(post_form(outcome))
}

/// POST /posts/{id}/delete/
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let target = state.blog.delete_post(&identity.viewer(), *path).await?;
    Ok(redirect(&target))
}
