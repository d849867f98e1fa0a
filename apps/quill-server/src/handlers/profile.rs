//! Profile pages.

use actix_web::{HttpResponse, web};

use quill_core::Outcome;
use quill_core::forms::ProfileForm;
use quill_shared::dto::ProfilePageResponse;

use super::{PageQuery, redirect, render, render_form, views};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let viewer = identity.viewer();
    let page = state
        .blog
        .profile(&path, viewer.as_ref(), query.request())
        .await?;
    Ok(render(ProfilePageResponse {
        profile: views::profile(&page.profile),
        posts: views::posts(&page.page),
    }))
}

/// GET /profile/edit/
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let form = state.blog.edit_profile_form(&identity.viewer()).await?;
    Ok(render(views::form(form)))
}

/// POST /profile/edit/
///
/// A renamed account keeps its token, which identifies it by ID.
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<ProfileForm>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .blog
        .edit_profile(&identity.viewer(), form.into_inner())
        .await?;
    Ok(match outcome {
        Outcome::Render(form) => {
            let valid = form.is_valid();
            render_form(views::form(form), valid)
        }
        Outcome::Redirect(target) => redirect(&target),
    })
}
