use serde::{Deserialize, Serialize};

use super::FormErrors;
use super::validators;

/// Shortest password an account may be created with.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Sign-up fields as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn clean(&self) -> Result<CleanRegistration, FormErrors> {
        let mut errors = FormErrors::new();

        let username = errors.check("username", validators::username(&self.username));
        let email = match self.email.trim() {
            "" => Some(""),
            value => errors.check("email", validators::email(value)),
        };
        if self.password.chars().count() < PASSWORD_MIN_LENGTH {
            errors.add(
                "password",
                format!("This password is too short. It must contain at least {PASSWORD_MIN_LENGTH} characters."),
            );
        }

        match (username, email) {
            (Some(username), Some(email)) if errors.is_empty() => Ok(CleanRegistration {
                username: username.to_string(),
                email: email.to_string(),
                password: self.password.clone(),
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_password_rejected() {
        let form = RegisterForm {
            username: "ann".into(),
            email: String::new(),
            password: "short".into(),
        };
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.field("password").len(), 1);
        assert!(errors.field("username").is_empty());
    }

    #[test]
    fn test_valid_registration() {
        let form = RegisterForm {
            username: " ann ".into(),
            email: "ann@example.com".into(),
            password: "long enough".into(),
        };
        let clean = form.clean().unwrap();
        assert_eq!(clean.username, "ann");
        assert_eq!(clean.email, "ann@example.com");
    }
}
