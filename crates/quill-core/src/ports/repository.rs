use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Comment, Location, Post, User};
use crate::error::RepoError;
use crate::pagination::{Page, PageRequest};
use crate::policy;

/// Generic repository trait defining the shared lookup and write operations.
///
/// Deletion lives on the per-entity traits because each entity has its own
/// cascade rules.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Store a new entity. Fails with `Constraint` on duplicates or dangling references.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Fails with `NotFound` if it does not exist.
    async fn update(&self, entity: T) -> Result<T, RepoError>;
}

/// User repository.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Delete a user together with their posts, the comments on those posts,
    /// and every comment they wrote elsewhere.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Location repository.
#[async_trait]
pub trait LocationRepository: BaseRepository<Location, Uuid> {
    /// Delete a location; posts pointing at it keep existing with no location.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// Delete a category; posts filed under it keep existing uncategorised.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Posts matching `filter`, newest `pub_date` first.
    async fn find_page(&self, filter: &PostFilter, page: PageRequest)
    -> Result<Page<Post>, RepoError>;

    /// Delete a post and its comments.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// All comments on a post, oldest first.
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Selection criteria for post listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    /// When set, only posts inside the publish window at this moment.
    pub visible_at: Option<DateTime<Utc>>,
}

impl PostFilter {
    /// Every post that is publicly visible at `now`.
    pub fn visible_at(now: DateTime<Utc>) -> Self {
        Self {
            visible_at: Some(now),
            ..Self::default()
        }
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// In-process evaluation of the filter, for stores that cannot push it down.
    pub fn matches(&self, post: &Post, category: Option<&Category>) -> bool {
        if self.author_id.is_some_and(|id| id != post.author_id) {
            return false;
        }
        if self.category_id.is_some() && self.category_id != post.category_id {
            return false;
        }
        match self.visible_at {
            Some(now) => policy::is_publicly_visible(post, category, now),
            None => true,
        }
    }
}
