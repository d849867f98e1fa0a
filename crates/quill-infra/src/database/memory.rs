//! In-memory store - used when no database is configured, and by tests.
//!
//! All five tables sit behind one async `RwLock`, so every operation,
//! including cascading deletes, is atomic.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::Repositories;
use quill_core::domain::{Category, Comment, Location, Post, User};
use quill_core::error::RepoError;
use quill_core::pagination::{Page, PageRequest};
use quill_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostFilter,
    PostRepository, UserRepository,
};

#[derive(Default)]
pub struct Tables {
    users: HashMap<Uuid, User>,
    locations: HashMap<Uuid, Location>,
    categories: HashMap<Uuid, Category>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

/// A row type stored in [`Tables`].
pub trait Record: Clone + Send + Sync + 'static {
    const NAME: &'static str;

    fn id(&self) -> Uuid;
    fn table(tables: &Tables) -> &HashMap<Uuid, Self>;
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self>;

    /// Unique-column clash with another row.
    fn conflicts_with(&self, _other: &Self) -> bool {
        false
    }

    /// Foreign keys must point at existing rows.
    fn check_references(&self, _tables: &Tables) -> Result<(), RepoError> {
        Ok(())
    }
}

fn missing_reference(table: &str, column: &str) -> RepoError {
    RepoError::Constraint(format!("{table}.{column} references a missing row"))
}

impl Record for User {
    const NAME: &'static str = "users";

    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.users
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.users
    }
    fn conflicts_with(&self, other: &Self) -> bool {
        self.username == other.username
    }
}

impl Record for Location {
    const NAME: &'static str = "locations";

    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.locations
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.locations
    }
}

impl Record for Category {
    const NAME: &'static str = "categories";

    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.categories
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.categories
    }
    fn conflicts_with(&self, other: &Self) -> bool {
        self.slug == other.slug
    }
}

impl Record for Post {
    const NAME: &'static str = "posts";

    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.posts
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.posts
    }
    fn check_references(&self, tables: &Tables) -> Result<(), RepoError> {
        if !tables.users.contains_key(&self.author_id) {
            return Err(missing_reference(Self::NAME, "author_id"));
        }
        if self
            .category_id
            .is_some_and(|id| !tables.categories.contains_key(&id))
        {
            return Err(missing_reference(Self::NAME, "category_id"));
        }
        if self
            .location_id
            .is_some_and(|id| !tables.locations.contains_key(&id))
        {
            return Err(missing_reference(Self::NAME, "location_id"));
        }
        Ok(())
    }
}

impl Record for Comment {
    const NAME: &'static str = "comments";

    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.comments
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.comments
    }
    fn check_references(&self, tables: &Tables) -> Result<(), RepoError> {
        if !tables.posts.contains_key(&self.post_id) {
            return Err(missing_reference(Self::NAME, "post_id"));
        }
        if !tables.users.contains_key(&self.author_id) {
            return Err(missing_reference(Self::NAME, "author_id"));
        }
        Ok(())
    }
}

/// In-memory implementation of every repository port.
///
/// Note: Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand the same store out as every repository.
    pub fn repositories(store: Arc<Self>) -> Repositories {
        Repositories {
            users: store.clone(),
            locations: store.clone(),
            categories: store.clone(),
            posts: store.clone(),
            comments: store,
        }
    }
}

fn check_unique<T: Record>(tables: &Tables, entity: &T) -> Result<(), RepoError> {
    let clash = T::table(tables)
        .values()
        .any(|other| other.id() != entity.id() && entity.conflicts_with(other));
    if clash {
        Err(RepoError::Constraint(format!(
            "duplicate key value in {}",
            T::NAME
        )))
    } else {
        Ok(())
    }
}

#[async_trait]
impl<T: Record> BaseRepository<T, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let tables = self.tables.read().await;
        Ok(T::table(&tables).get(&id).cloned())
    }

    async fn insert(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if T::table(&tables).contains_key(&entity.id()) {
            return Err(RepoError::Constraint(format!(
                "{} {} already exists",
                T::NAME,
                entity.id()
            )));
        }
        check_unique(&tables, &entity)?;
        entity.check_references(&tables)?;

        T::table_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if !T::table(&tables).contains_key(&entity.id()) {
            return Err(RepoError::NotFound);
        }
        check_unique(&tables, &entity)?;
        entity.check_references(&tables)?;

        T::table_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }

        let mut removed_posts = Vec::new();
        tables.posts.retain(|post_id, post| {
            let keep = post.author_id != id;
            if !keep {
                removed_posts.push(*post_id);
            }
            keep
        });
        tables
            .comments
            .retain(|_, c| c.author_id != id && !removed_posts.contains(&c.post_id));

        tracing::debug!(user_id = %id, posts = removed_posts.len(), "user deleted with cascade");
        Ok(())
    }
}

#[async_trait]
impl LocationRepository for InMemoryStore {
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.locations.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        for post in tables.posts.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.categories.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_page(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|post| {
                let category = post.category_id.and_then(|id| tables.categories.get(&id));
                filter.matches(post, category)
            })
            .cloned()
            .collect();
        posts.sort_by(|a, b| {
            b.pub_date
                .cmp(&a.pub_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(Page::from_all(posts, page))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        tables.comments.retain(|_, c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.values().filter(|c| c.post_id == post_id).count() as u64)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        match tables.comments.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}
