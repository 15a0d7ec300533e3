use std::collections::BTreeMap;

use bbs_validate::ValidationReport;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::form::ProfileUpdateForm;
use crate::domain::model::User;
use crate::domain::session::Flash;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub introduction: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            introduction: user.introduction,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Urlencoded body of the profile edit form.
///
/// Missing fields bind as empty strings so the rules, not the extractor,
/// decide what is required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub introduction: String,
}

impl UpdateProfileRequest {
    #[must_use]
    pub fn into_form(self, id: i64) -> ProfileUpdateForm {
        ProfileUpdateForm {
            id,
            name: self.name,
            email: self.email,
            introduction: self.introduction,
        }
    }
}

/// Everything the edit page needs: the stored user plus whatever the
/// previous submission left in the session.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EditProfileView {
    pub user: UserDto,
    pub flashes: Vec<Flash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationReport>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub old_input: BTreeMap<String, String>,
}
