use serde::{Deserialize, Serialize};

use super::FormErrors;
use super::validators;
use crate::domain::Comment;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn from_comment(comment: &Comment) -> Self {
        Self {
            text: comment.text.clone(),
        }
    }

    /// The trimmed comment text.
    pub fn clean(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::new();
        match errors.check("text", validators::required(&self.text)) {
            Some(text) => Ok(text.to_string()),
            None => Err(errors),
        }
    }
}
