//! Page contexts produced by the service.

use crate::domain::{Category, Comment, Location, Post, User};
use crate::forms::{CommentForm, FormState};
use crate::pagination::Page;

/// A post with everything a listing shows next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCard {
    pub post: Post,
    pub author: User,
    pub category: Option<Category>,
    pub location: Option<Location>,
    pub comment_count: u64,
}

impl PostCard {
    /// The location, unless it has been unpublished.
    pub fn visible_location(&self) -> Option<&Location> {
        self.location.as_ref().filter(|l| l.is_published)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentCard {
    pub comment: Comment,
    pub author: User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDetail {
    pub card: PostCard,
    pub comments: Vec<CommentCard>,
    pub form: CommentForm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPage {
    pub category: Category,
    pub page: Page<PostCard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePage {
    pub profile: User,
    pub page: Page<PostCard>,
}

/// The comment form page; `comment` is set when editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentPage {
    pub form: FormState<CommentForm>,
    pub comment: Option<CommentCard>,
}
