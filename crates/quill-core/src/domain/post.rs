use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a blog publication, possibly scheduled for later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    /// Publication moment; a future value schedules the post.
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub location_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new published post without location or category.
    pub fn new(author_id: Uuid, title: String, text: String, pub_date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            text,
            image: None,
            pub_date,
            is_published: true,
            location_id: None,
            category_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_location(mut self, location_id: Uuid) -> Self {
        self.location_id = Some(location_id);
        self
    }

    pub fn unpublished(mut self) -> Self {
        self.is_published = false;
        self
    }
}
