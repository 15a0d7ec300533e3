use crate::domain::model::User;

use super::entity;

impl From<entity::Model> for User {
    fn from(m: entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            introduction: m.introduction,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
