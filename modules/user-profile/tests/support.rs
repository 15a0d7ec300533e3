#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Shared helpers for `user_profile` integration tests.

#![allow(dead_code)]

use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use user_profile::domain::repo::UsersRepository;
use user_profile::infra::storage::SeaOrmUsersRepository;
use user_profile::infra::storage::migrations::Migrator;
use user_profile::{NewUser, User};

/// Fresh in-memory `SQLite` database with the users table migrated.
pub async fn inmem_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

pub async fn inmem_repo() -> SeaOrmUsersRepository {
    SeaOrmUsersRepository::new(inmem_db().await)
}

pub async fn seed_user(repo: &SeaOrmUsersRepository, name: &str, email: &str) -> User {
    repo.create(NewUser {
        name: name.to_owned(),
        email: email.to_owned(),
        introduction: String::new(),
    })
    .await
    .expect("Failed to seed user")
}
