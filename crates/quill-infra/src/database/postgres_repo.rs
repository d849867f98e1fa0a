//! PostgreSQL repository implementations.
//!
//! Cascades are explicit: each delete runs its dependent statements in one
//! transaction before removing the row itself.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DbConn, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};
use uuid::Uuid;

use quill_core::Repositories;
use quill_core::domain::{Category, Comment, Post, User};
use quill_core::error::RepoError;
use quill_core::pagination::{Page, PageRequest};
use quill_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostFilter, PostRepository,
    UserRepository,
};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::Entity as LocationEntity;
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, repo_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// Repositories sharing one connection pool.
pub fn postgres_repositories(db: DbConn) -> Repositories {
    Repositories {
        users: Arc::new(PostgresUserRepository::new(db.clone())),
        locations: Arc::new(PostgresLocationRepository::new(db.clone())),
        categories: Arc::new(PostgresCategoryRepository::new(db.clone())),
        posts: Arc::new(PostgresPostRepository::new(db.clone())),
        comments: Arc::new(PostgresCommentRepository::new(db)),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(repo_err)?;

        let post_ids: Vec<Uuid> = PostEntity::find()
            .select_only()
            .column(post::Column::Id)
            .filter(post::Column::AuthorId.eq(id))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(repo_err)?;

        CommentEntity::delete_many()
            .filter(
                Condition::any()
                    .add(comment::Column::AuthorId.eq(id))
                    .add(comment::Column::PostId.is_in(post_ids.iter().copied())),
            )
            .exec(&txn)
            .await
            .map_err(repo_err)?;

        PostEntity::delete_many()
            .filter(post::Column::AuthorId.eq(id))
            .exec(&txn)
            .await
            .map_err(repo_err)?;

        let result = UserEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(repo_err)?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(repo_err)?;
        tracing::debug!(user_id = %id, posts = post_ids.len(), "user deleted with cascade");
        Ok(())
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(repo_err)?;

        PostEntity::update_many()
            .col_expr(post::Column::LocationId, Expr::value(Option::<Uuid>::None))
            .filter(post::Column::LocationId.eq(id))
            .exec(&txn)
            .await
            .map_err(repo_err)?;

        let result = LocationEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(repo_err)?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(repo_err)
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(repo_err)?;

        PostEntity::update_many()
            .col_expr(post::Column::CategoryId, Expr::value(Option::<Uuid>::None))
            .filter(post::Column::CategoryId.eq(id))
            .exec(&txn)
            .await
            .map_err(repo_err)?;

        let result = CategoryEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(repo_err)?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(repo_err)
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_page(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let mut query = PostEntity::find();

        if let Some(author_id) = filter.author_id {
            query = query.filter(post::Column::AuthorId.eq(author_id));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(post::Column::CategoryId.eq(category_id));
        }
        if let Some(now) = filter.visible_at {
            query = query
                .join(JoinType::LeftJoin, post::Relation::Category.def())
                .filter(post::Column::IsPublished.eq(true))
                .filter(post::Column::PubDate.lte(now))
                .filter(
                    Condition::any()
                        .add(post::Column::CategoryId.is_null())
                        .add(category::Column::IsPublished.eq(true)),
                );
        }

        let paginator = query
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::CreatedAt)
            .paginate(&self.db, page.per_page());

        let total = paginator.num_items().await.map_err(repo_err)?;
        let models = paginator
            .fetch_page(page.number() - 1)
            .await
            .map_err(repo_err)?;

        Ok(Page::new(
            models.into_iter().map(Into::into).collect(),
            page,
            total,
        ))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(repo_err)?;

        CommentEntity::delete_many()
            .filter(comment::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(repo_err)?;

        let result = PostEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(repo_err)?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(repo_err)
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(repo_err)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = CommentEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(repo_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
