use serde::{Deserialize, Serialize};

use super::FormErrors;
use super::validators;
use crate::domain::User;

const NAME_MAX: usize = 150;

/// Editable account fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanProfile {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }

    pub fn clean(&self) -> Result<CleanProfile, FormErrors> {
        let mut errors = FormErrors::new();

        let username = errors.check("username", validators::username(&self.username));
        let first_name = errors.check(
            "first_name",
            validators::max_length(self.first_name.trim(), NAME_MAX),
        );
        let last_name = errors.check(
            "last_name",
            validators::max_length(self.last_name.trim(), NAME_MAX),
        );
        let email = match self.email.trim() {
            "" => Some(""),
            value => errors.check("email", validators::email(value)),
        };

        match (username, first_name, last_name, email) {
            (Some(username), Some(first_name), Some(last_name), Some(email))
                if errors.is_empty() =>
            {
                Ok(CleanProfile {
                    username: username.to_string(),
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                    email: email.to_string(),
                })
            }
            _ => Err(errors),
        }
    }
}

impl CleanProfile {
    pub fn apply(self, user: &mut User) {
        user.username = self.username;
        user.first_name = self.first_name;
        user.last_name = self.last_name;
        user.email = self.email;
    }
}
