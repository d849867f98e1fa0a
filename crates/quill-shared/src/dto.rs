//! Data Transfer Objects - request bodies and JSON page contexts.
//!
//! IDs travel as strings and timestamps as RFC 3339.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Login form submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Where to go after a successful login.
    pub next: Option<String>,
}

/// Field name → messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Values of a form plus the errors found in them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormResponse<T> {
    pub data: T,
    pub errors: FieldErrors,
}

/// Login page context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginPageResponse {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    pub errors: FieldErrors,
}

/// A user as shown next to their posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub id: String,
    pub username: String,
    pub display_name: String,
}

/// A profile page header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationResponse {
    pub id: String,
    pub name: String,
}

/// A post with its author, category, location and comment count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    pub pub_date: String,
    pub is_published: bool,
    pub created_at: String,
    pub author: AuthorResponse,
    pub category: Option<CategoryResponse>,
    pub location: Option<LocationResponse>,
    pub comment_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub text: String,
    pub created_at: String,
    pub author: AuthorResponse,
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPageResponse {
    pub category: CategoryResponse,
    pub posts: PageResponse<PostResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePageResponse {
    pub profile: ProfileResponse,
    pub posts: PageResponse<PostResponse>,
}

/// Post detail page: the post, its comments and an empty comment form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse<F> {
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
    pub form: FormResponse<F>,
}

/// Comment form page; `comment` is the one being edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentPageResponse<F> {
    pub form: FormResponse<F>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentResponse>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
}
