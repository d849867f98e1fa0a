//! Request-level operations of the blog.
//!
//! Every operation takes the caller explicitly (`Option<&Viewer>` for public
//! pages, `&Viewer` for authenticated ones) and answers with an [`Outcome`]
//! or a [`DomainError`]. Hidden and missing resources are both
//! `DomainError::NotFound`.

mod comments;
mod posts;
mod profiles;
mod views;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Comment, Location, Post, User};
use crate::error::DomainError;
use crate::pagination::{Page, PageRequest};
use crate::policy::Viewer;
use crate::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostFilter, PostRepository,
    UserRepository,
};

pub use views::{CategoryPage, CommentCard, CommentPage, PostCard, PostDetail, ProfilePage};

/// What a handler should do with a successful request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Render a page (possibly a form echoed back with errors).
    Render(T),
    /// Send the client elsewhere.
    Redirect(Redirect),
}

impl<T> Outcome<T> {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Outcome::Redirect(_))
    }
}

/// Canonical pages a request can finish on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    PostDetail(Uuid),
    Profile(String),
}

impl Redirect {
    /// URL path of the target page.
    pub fn location(&self) -> String {
        match self {
            Redirect::PostDetail(id) => format!("/posts/{id}/"),
            Redirect::Profile(username) => format!("/profile/{username}/"),
        }
    }
}

/// The storage the service works against.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

/// Blog operations over a set of repositories.
#[derive(Clone)]
pub struct BlogService {
    repos: Repositories,
}

impl BlogService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repos
    }

    /// GET / - every publicly visible post.
    pub async fn index(&self, page: PageRequest) -> Result<Page<PostCard>, DomainError> {
        let filter = PostFilter::visible_at(Utc::now());
        self.post_cards(&filter, page).await
    }

    /// GET /category/{slug}/ - visible posts of a published category.
    pub async fn category_posts(
        &self,
        slug: &str,
        page: PageRequest,
    ) -> Result<CategoryPage, DomainError> {
        let category = self
            .repos
            .categories
            .find_by_slug(slug)
            .await?
            .filter(|c| c.is_published)
            .ok_or_else(|| DomainError::not_found("category", slug))?;

        let filter = PostFilter::visible_at(Utc::now()).in_category(category.id);
        let page = self.post_cards(&filter, page).await?;
        Ok(CategoryPage { category, page })
    }

    async fn post_cards(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostCard>, DomainError> {
        let mut posts = self.repos.posts.find_page(filter, page).await?;
        let mut cards = Vec::with_capacity(posts.items.len());
        for post in std::mem::take(&mut posts.items) {
            let category = self.category_of(&post).await?;
            cards.push(self.card(post, category).await?);
        }
        Ok(posts.with_items(cards))
    }

    async fn card(&self, post: Post, category: Option<Category>) -> Result<PostCard, DomainError> {
        let author = self.user(post.author_id).await?;
        let location = self.location_of(&post).await?;
        let comment_count = self.repos.comments.count_by_post(post.id).await?;
        Ok(PostCard {
            post,
            author,
            category,
            location,
            comment_count,
        })
    }

    async fn find_post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.repos
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id))
    }

    /// The post with its category, or not-found when `viewer` may not see it.
    async fn visible_post(
        &self,
        id: Uuid,
        viewer: Option<&Viewer>,
        now: DateTime<Utc>,
    ) -> Result<(Post, Option<Category>), DomainError> {
        let post = self.find_post(id).await?;
        let category = self.category_of(&post).await?;
        if crate::policy::is_visible_to(&post, category.as_ref(), viewer, now) {
            Ok((post, category))
        } else {
            tracing::debug!(post_id = %id, "post hidden from viewer");
            Err(DomainError::not_found("post", id))
        }
    }

    async fn category_of(&self, post: &Post) -> Result<Option<Category>, DomainError> {
        match post.category_id {
            Some(id) => Ok(self.repos.categories.find_by_id(id).await?),
            None => Ok(None),
        }
    }

    async fn location_of(&self, post: &Post) -> Result<Option<Location>, DomainError> {
        match post.location_id {
            Some(id) => Ok(self.repos.locations.find_by_id(id).await?),
            None => Ok(None),
        }
    }

    /// A user referenced by stored data; absence means the store is inconsistent.
    async fn user(&self, id: Uuid) -> Result<User, DomainError> {
        self.repos
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::Internal(format!("dangling user reference {id}")))
    }

    /// The account behind an authenticated request.
    async fn current_user(&self, viewer: &Viewer) -> Result<User, DomainError> {
        self.repos
            .users
            .find_by_id(viewer.user_id)
            .await?
            .ok_or(DomainError::Unauthorized)
    }

    async fn comment_cards(&self, post_id: Uuid) -> Result<Vec<CommentCard>, DomainError> {
        let comments = self.repos.comments.find_by_post(post_id).await?;
        let mut cards = Vec::with_capacity(comments.len());
        for comment in comments {
            cards.push(self.comment_card(comment).await?);
        }
        Ok(cards)
    }

    async fn comment_card(&self, comment: Comment) -> Result<CommentCard, DomainError> {
        let author = self.user(comment.author_id).await?;
        Ok(CommentCard { comment, author })
    }
}
