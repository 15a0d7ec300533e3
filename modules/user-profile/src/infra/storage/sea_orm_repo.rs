use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter,
};
use time::OffsetDateTime;

use crate::domain::model::{NewUser, User};
use crate::domain::repo::UsersRepository;

use super::entity::{self, Entity as UserEntity};

#[derive(Clone)]
pub struct SeaOrmUsersRepository {
    db: DatabaseConnection,
}

impl SeaOrmUsersRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UsersRepository for SeaOrmUsersRepository {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(found.map(Into::into))
    }

    async fn name_taken(&self, name: &str, exclude_id: Option<i64>) -> anyhow::Result<bool> {
        let mut query = UserEntity::find().filter(entity::Column::Name.eq(name));
        if let Some(id) = exclude_id {
            query = query.filter(entity::Column::Id.ne(id));
        }
        let count = query.count(&self.db).await?;
        Ok(count > 0)
    }

    async fn update(&self, user: &User) -> anyhow::Result<()> {
        let active_model = entity::ActiveModel {
            id: ActiveValue::Unchanged(user.id),
            name: ActiveValue::Set(user.name.clone()),
            email: ActiveValue::Set(user.email.clone()),
            introduction: ActiveValue::Set(user.introduction.clone()),
            created_at: ActiveValue::NotSet,
            updated_at: ActiveValue::Set(user.updated_at),
        };

        active_model.update(&self.db).await?;
        Ok(())
    }

    async fn create(&self, new_user: NewUser) -> anyhow::Result<User> {
        let now = OffsetDateTime::now_utc();
        let active_model = entity::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(new_user.name),
            email: ActiveValue::Set(new_user.email),
            introduction: ActiveValue::Set(new_user.introduction),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(model.into())
    }
}
