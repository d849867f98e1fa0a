pub use sea_orm_migration::prelude::*;

mod m2026_10_14_000001_create_users;
mod m2026_10_14_000002_create_taxonomy;
mod m2026_10_14_000003_create_posts;
mod m2026_10_14_000004_create_comments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        // referenced tables first
        vec![
            Box::new(m2026_10_14_000001_create_users::Migration),
            Box::new(m2026_10_14_000002_create_taxonomy::Migration),
            Box::new(m2026_10_14_000003_create_posts::Migration),
            Box::new(m2026_10_14_000004_create_comments::Migration),
        ]
    }
}
