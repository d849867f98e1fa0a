//! Form handling: raw submitted values, per-field validators, and the error
//! map a re-rendered form carries back to the user.

mod comment;
mod post;
mod profile;
mod register;
pub mod validators;

use std::collections::BTreeMap;

use serde::Serialize;

pub use comment::CommentForm;
pub use post::{CleanPost, PostForm};
pub use profile::{CleanProfile, ProfileForm};
pub use register::{CleanRegistration, PASSWORD_MIN_LENGTH, RegisterForm};

/// Field name → messages, in field order of the map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    /// Record the error of a validator result, yielding its value on success.
    pub fn check<T>(&mut self, field: &'static str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        self.0.iter().map(|(field, messages)| (*field, messages.as_slice()))
    }
}

/// A form as shown to the user: current values plus any errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormState<F> {
    pub data: F,
    pub errors: FormErrors,
}

impl<F> FormState<F> {
    /// A fresh or prefilled form with no errors.
    pub fn new(data: F) -> Self {
        Self {
            data,
            errors: FormErrors::new(),
        }
    }

    /// A rejected submission, echoed back with its errors.
    pub fn invalid(data: F, errors: FormErrors) -> Self {
        Self { data, errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}
