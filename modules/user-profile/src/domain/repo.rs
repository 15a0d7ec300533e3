use async_trait::async_trait;

use super::model::{NewUser, User};

#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;

    /// Whether a user other than `exclude_id` already uses `name`.
    async fn name_taken(&self, name: &str, exclude_id: Option<i64>) -> anyhow::Result<bool>;

    /// Writes the editable fields and `updated_at` of an existing user.
    async fn update(&self, user: &User) -> anyhow::Result<()>;

    async fn create(&self, new_user: NewUser) -> anyhow::Result<User>;
}
