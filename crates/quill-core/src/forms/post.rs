use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FormErrors;
use super::validators::{self, DATETIME_LOCAL};
use crate::domain::Post;

const TITLE_MAX: usize = 256;
const IMAGE_MAX: usize = 100;

/// Post fields as submitted; `location` and `category` carry IDs or blanks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub text: String,
    pub image: String,
    pub pub_date: String,
    pub location: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanPost {
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub location_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

impl PostForm {
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            text: post.text.clone(),
            image: post.image.clone().unwrap_or_default(),
            pub_date: post.pub_date.format(DATETIME_LOCAL).to_string(),
            location: post.location_id.map(|id| id.to_string()).unwrap_or_default(),
            category: post.category_id.map(|id| id.to_string()).unwrap_or_default(),
        }
    }

    /// Field-level checks only; whether the referenced location and category
    /// exist is decided by the caller with store access.
    pub fn clean(&self) -> Result<CleanPost, FormErrors> {
        let mut errors = FormErrors::new();

        let title = errors.check(
            "title",
            validators::required(&self.title).and_then(|t| validators::max_length(t, TITLE_MAX)),
        );
        let text = errors.check("text", validators::required(&self.text));
        let image = match self.image.trim() {
            "" => Some(None),
            value => errors
                .check("image", validators::max_length(value, IMAGE_MAX))
                .map(|v| Some(v.to_string())),
        };
        let pub_date = errors.check("pub_date", validators::datetime(&self.pub_date));
        let location_id = errors.check("location", validators::optional_id(&self.location));
        let category_id = errors.check("category", validators::optional_id(&self.category));

        match (title, text, image, pub_date, location_id, category_id) {
            (
                Some(title),
                Some(text),
                Some(image),
                Some(pub_date),
                Some(location_id),
                Some(category_id),
            ) => Ok(CleanPost {
                title: title.to_string(),
                text: text.to_string(),
                image,
                pub_date,
                location_id,
                category_id,
            }),
            _ => Err(errors),
        }
    }
}

impl CleanPost {
    /// Build a new post owned by `author_id`.
    pub fn into_post(self, author_id: Uuid) -> Post {
        let mut post = Post::new(author_id, self.title, self.text, self.pub_date);
        post.image = self.image;
        post.location_id = self.location_id;
        post.category_id = self.category_id;
        post
    }

    /// Overwrite the editable fields. A blank image keeps the stored one.
    pub fn apply(self, post: &mut Post) {
        post.title = self.title;
        post.text = self.text;
        if self.image.is_some() {
            post.image = self.image;
        }
        post.pub_date = self.pub_date;
        post.location_id = self.location_id;
        post.category_id = self.category_id;
    }
}
