use chrono::Utc;

use super::{BlogService, Outcome, ProfilePage, Redirect};
use crate::error::{DomainError, RepoError};
use crate::forms::{FormErrors, FormState, ProfileForm};
use crate::pagination::PageRequest;
use crate::policy::Viewer;
use crate::ports::PostFilter;

const USERNAME_TAKEN: &str = "A user with that username already exists.";

impl BlogService {
    /// GET /profile/{username}/ - the owner sees drafts and scheduled posts too.
    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<&Viewer>,
        page: PageRequest,
    ) -> Result<ProfilePage, DomainError> {
        let profile = self
            .repos
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("profile", username))?;

        let own_profile = viewer.is_some_and(|v| v.user_id == profile.id);
        let filter = if own_profile {
            PostFilter::default().by_author(profile.id)
        } else {
            PostFilter::visible_at(Utc::now()).by_author(profile.id)
        };

        let page = self.post_cards(&filter, page).await?;
        Ok(ProfilePage { profile, page })
    }

    /// GET /profile/edit/
    pub async fn edit_profile_form(
        &self,
        viewer: &Viewer,
    ) -> Result<FormState<ProfileForm>, DomainError> {
        let user = self.current_user(viewer).await?;
        Ok(FormState::new(ProfileForm::from_user(&user)))
    }

    /// POST /profile/edit/
    pub async fn edit_profile(
        &self,
        viewer: &Viewer,
        form: ProfileForm,
    ) -> Result<Outcome<FormState<ProfileForm>>, DomainError> {
        let cleaned = match form.clean() {
            Ok(cleaned) => cleaned,
            Err(errors) => return Ok(Outcome::Render(FormState::invalid(form, errors))),
        };

        let mut user = self.current_user(viewer).await?;
        cleaned.apply(&mut user);
        user.updated_at = Utc::now();

        match self.repos.users.update(user).await {
            Ok(saved) => {
                tracing::info!(user_id = %saved.id, username = %saved.username, "profile updated");
                Ok(Outcome::Redirect(Redirect::Profile(saved.username)))
            }
            Err(RepoError::Constraint(detail)) => {
                tracing::debug!(%detail, "profile update rejected by store");
                let mut errors = FormErrors::new();
                errors.add("username", USERNAME_TAKEN);
                Ok(Outcome::Render(FormState::invalid(form, errors)))
            }
            Err(e) => Err(e.into()),
        }
    }
}
