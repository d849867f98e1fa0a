//! Publishing rules: who may see a post and who may change it.
//!
//! Hidden posts are reported as missing rather than forbidden, so callers
//! turn a `false` here into a not-found response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Category, Post};

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub user_id: Uuid,
}

impl Viewer {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// The publish window: published, due, and not filed under a hidden category.
///
/// `category` is the post's category when it has one; a post without a
/// category (or whose category no longer exists) only depends on its own flags.
pub fn is_publicly_visible(post: &Post, category: Option<&Category>, now: DateTime<Utc>) -> bool {
    post.is_published && post.pub_date <= now && category.is_none_or(|c| c.is_published)
}

/// Authors always see their own posts; everyone else gets the publish window.
pub fn is_visible_to(
    post: &Post,
    category: Option<&Category>,
    viewer: Option<&Viewer>,
    now: DateTime<Utc>,
) -> bool {
    is_author(post.author_id, viewer) || is_publicly_visible(post, category, now)
}

/// Only the author may edit or delete a post or comment.
pub fn can_modify(author_id: Uuid, viewer: &Viewer) -> bool {
    author_id == viewer.user_id
}

fn is_author(author_id: Uuid, viewer: Option<&Viewer>) -> bool {
    viewer.is_some_and(|v| can_modify(author_id, v))
}
