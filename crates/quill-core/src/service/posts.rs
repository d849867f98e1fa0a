use chrono::Utc;
use uuid::Uuid;

use super::{BlogService, Outcome, PostDetail, Redirect};
use crate::error::DomainError;
use crate::forms::validators::INVALID_CHOICE;
use crate::forms::{CleanPost, CommentForm, FormErrors, FormState, PostForm};
use crate::policy::{self, Viewer};

impl BlogService {
    /// GET /posts/{id}/
    pub async fn post_detail(
        &self,
        id: Uuid,
        viewer: Option<&Viewer>,
    ) -> Result<PostDetail, DomainError> {
        let (post, category) = self.visible_post(id, viewer, Utc::now()).await?;
        let card = self.card(post, category).await?;
        let comments = self.comment_cards(id).await?;
        Ok(PostDetail {
            card,
            comments,
            form: CommentForm::default(),
        })
    }

    /// GET /posts/create/ and /posts/{id}/edit/
    pub async fn post_form(
        &self,
        viewer: &Viewer,
        id: Option<Uuid>,
    ) -> Result<Outcome<FormState<PostForm>>, DomainError> {
        let Some(id) = id else {
            return Ok(Outcome::Render(FormState::default()));
        };
        let post = self.find_post(id).await?;
        if !policy::can_modify(post.author_id, viewer) {
            return Ok(Outcome::Redirect(Redirect::PostDetail(id)));
        }
        Ok(Outcome::Render(FormState::new(PostForm::from_post(&post))))
    }

    /// POST /posts/create/ and /posts/{id}/edit/
    ///
    /// Creating stamps the requester as author; editing keeps author,
    /// publication flag and creation time.
    pub async fn save_post(
        &self,
        viewer: &Viewer,
        id: Option<Uuid>,
        form: PostForm,
    ) -> Result<Outcome<FormState<PostForm>>, DomainError> {
        let existing = match id {
            Some(id) => {
                let post = self.find_post(id).await?;
                if !policy::can_modify(post.author_id, viewer) {
                    tracing::info!(post_id = %id, user_id = %viewer.user_id, "edit by non-author redirected");
                    return Ok(Outcome::Redirect(Redirect::PostDetail(id)));
                }
                Some(post)
            }
            None => None,
        };

        let cleaned = match self.clean_post_form(&form).await? {
            Ok(cleaned) => cleaned,
            Err(errors) => return Ok(Outcome::Render(FormState::invalid(form, errors))),
        };

        let author = self.current_user(viewer).await?;
        let saved = match existing {
            Some(mut post) => {
                cleaned.apply(&mut post);
                self.repos.posts.update(post).await?
            }
            None => self.repos.posts.insert(cleaned.into_post(author.id)).await?,
        };
        tracing::info!(post_id = %saved.id, author = %author.username, "post saved");

        Ok(Outcome::Redirect(Redirect::Profile(author.username)))
    }

    /// GET /posts/{id}/delete/ - the post's form, shown as a confirmation.
    pub async fn delete_post_form(
        &self,
        viewer: &Viewer,
        id: Uuid,
    ) -> Result<Outcome<FormState<PostForm>>, DomainError> {
        let post = self.find_post(id).await?;
        if !policy::can_modify(post.author_id, viewer) {
            return Ok(Outcome::Redirect(Redirect::PostDetail(id)));
        }
        Ok(Outcome::Render(FormState::new(PostForm::from_post(&post))))
    }

    /// POST /posts/{id}/delete/
    pub async fn delete_post(&self, viewer: &Viewer, id: Uuid) -> Result<Redirect, DomainError> {
        let post = self.find_post(id).await?;
        if !policy::can_modify(post.author_id, viewer) {
            tracing::info!(post_id = %id, user_id = %viewer.user_id, "delete by non-author redirected");
            return Ok(Redirect::PostDetail(id));
        }

        let author = self.current_user(viewer).await?;
        self.repos.posts.delete(id).await?;
        tracing::info!(post_id = %id, author = %author.username, "post deleted");

        Ok(Redirect::Profile(author.username))
    }

    /// Field checks, then the references that need the store.
    async fn clean_post_form(
        &self,
        form: &PostForm,
    ) -> Result<Result<CleanPost, FormErrors>, DomainError> {
        let cleaned = match form.clean() {
            Ok(cleaned) => cleaned,
            Err(errors) => return Ok(Err(errors)),
        };

        let mut errors = FormErrors::new();
        if let Some(id) = cleaned.location_id {
            if self.repos.locations.find_by_id(id).await?.is_none() {
                errors.add("location", INVALID_CHOICE);
            }
        }
        if let Some(id) = cleaned.category_id {
            if self.repos.categories.find_by_id(id).await?.is_none() {
                errors.add("category", INVALID_CHOICE);
            }
        }

        if errors.is_empty() {
            Ok(Ok(cleaned))
        } else {
            Ok(Err(errors))
        }
    }
}
