use chrono::Utc;
use uuid::Uuid;

use super::{BlogService, CommentCard, CommentPage, Outcome, Redirect};
use crate::domain::Comment;
use crate::error::DomainError;
use crate::forms::{CommentForm, FormState};
use crate::policy::{self, Viewer};

impl BlogService {
    /// GET /posts/{post_id}/comment/ and /posts/{post_id}/edit_comment/{comment_id}/
    pub async fn comment_form(
        &self,
        viewer: &Viewer,
        post_id: Uuid,
        comment_id: Option<Uuid>,
    ) -> Result<Outcome<CommentPage>, DomainError> {
        let comment = match self.editable_comment(viewer, post_id, comment_id).await? {
            Ok(comment) => comment,
            Err(redirect) => return Ok(Outcome::Redirect(redirect)),
        };

        let form = comment
            .as_ref()
            .map(CommentForm::from_comment)
            .unwrap_or_default();
        let comment = match comment {
            Some(comment) => Some(self.comment_card(comment).await?),
            None => None,
        };
        Ok(Outcome::Render(CommentPage {
            form: FormState::new(form),
            comment,
        }))
    }

    /// POST /posts/{post_id}/comment/ and /posts/{post_id}/edit_comment/{comment_id}/
    pub async fn save_comment(
        &self,
        viewer: &Viewer,
        post_id: Uuid,
        comment_id: Option<Uuid>,
        form: CommentForm,
    ) -> Result<Outcome<CommentPage>, DomainError> {
        let existing = match self.editable_comment(viewer, post_id, comment_id).await? {
            Ok(comment) => comment,
            Err(redirect) => return Ok(Outcome::Redirect(redirect)),
        };

        let text = match form.clean() {
            Ok(text) => text,
            Err(errors) => {
                let comment = match existing {
                    Some(comment) => Some(self.comment_card(comment).await?),
                    None => None,
                };
                return Ok(Outcome::Render(CommentPage {
                    form: FormState::invalid(form, errors),
                    comment,
                }));
            }
        };

        let saved = match existing {
            Some(mut comment) => {
                comment.text = text;
                comment.post_id = post_id;
                comment.author_id = viewer.user_id;
                self.repos.comments.update(comment).await?
            }
            None => {
                self.repos
                    .comments
                    .insert(Comment::new(post_id, viewer.user_id, text))
                    .await?
            }
        };
        tracing::info!(comment_id = %saved.id, post_id = %post_id, "comment saved");

        Ok(Outcome::Redirect(Redirect::PostDetail(post_id)))
    }

    /// GET /posts/{post_id}/delete_comment/{comment_id}/
    pub async fn delete_comment_form(
        &self,
        viewer: &Viewer,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Outcome<CommentCard>, DomainError> {
        let comment = self.comment_on(post_id, comment_id).await?;
        if !policy::can_modify(comment.author_id, viewer) {
            return Ok(Outcome::Redirect(Redirect::PostDetail(post_id)));
        }
        Ok(Outcome::Render(self.comment_card(comment).await?))
    }

    /// POST /posts/{post_id}/delete_comment/{comment_id}/
    pub async fn delete_comment(
        &self,
        viewer: &Viewer,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Redirect, DomainError> {
        let comment = self.comment_on(post_id, comment_id).await?;
        if !policy::can_modify(comment.author_id, viewer) {
            tracing::info!(%comment_id, user_id = %viewer.user_id, "delete by non-author redirected");
            return Ok(Redirect::PostDetail(post_id));
        }

        self.repos.comments.delete(comment_id).await?;
        tracing::info!(%comment_id, %post_id, "comment deleted");

        Ok(Redirect::PostDetail(post_id))
    }

    /// Resolve the target of a comment form.
    ///
    /// Adding needs a post the viewer can see. Editing needs a comment on this
    /// post written by the viewer; someone else's comment yields a redirect.
    async fn editable_comment(
        &self,
        viewer: &Viewer,
        post_id: Uuid,
        comment_id: Option<Uuid>,
    ) -> Result<Result<Option<Comment>, Redirect>, DomainError> {
        let Some(comment_id) = comment_id else {
            self.visible_post(post_id, Some(viewer), Utc::now()).await?;
            return Ok(Ok(None));
        };

        let comment = self.comment_on(post_id, comment_id).await?;
        if !policy::can_modify(comment.author_id, viewer) {
            tracing::info!(%comment_id, user_id = %viewer.user_id, "edit by non-author redirected");
            return Ok(Err(Redirect::PostDetail(post_id)));
        }
        Ok(Ok(Some(comment)))
    }

    /// A comment that belongs to `post_id`; anything else is not-found.
    async fn comment_on(&self, post_id: Uuid, comment_id: Uuid) -> Result<Comment, DomainError> {
        self.find_post(post_id).await?;
        self.repos
            .comments
            .find_by_id(comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or_else(|| DomainError::not_found("comment", comment_id))
    }
}
