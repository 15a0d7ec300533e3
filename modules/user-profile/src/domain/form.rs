//! The profile edit form.
#![allow(clippy::non_ascii_literal)]

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use bbs_validate::{
    Check, FieldRules, Rule, UniquenessLookup, ValidateError, ValidationMode, ValidationReport,
};
use regex::Regex;
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};

use super::fields::ProfileFields;
use super::model::{NewUser, User};
use super::repo::UsersRepository;
use super::session::{FlashLevel, RequestSession};

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 25;
pub const EMAIL_MAX_CHARS: usize = 255;
pub const INTRODUCTION_MAX_CHARS: usize = 80;

/// Messages for the name rules, in rule order: required, length, pattern, unique.
pub const NAME_MESSAGES: [&str; 4] = [
    "用户名不能为空。",
    "用户名必须介于 3 - 25 个字符之间",
    "用户名只支持英文、数字、横杠和下划线。",
    "用户名已被占用，请重新填写",
];

/// Prefix of the flash shown when the store rejects the update.
pub const UPDATE_FAILED_PREFIX: &str = "用户更新失败: ";

#[allow(clippy::unwrap_used)]
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\-_]+$").unwrap());

/// How a [`ProfileUpdateForm::validate_and_update`] call ended.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The user was changed and saved.
    Updated,
    /// Input broke a rule; errors were saved to the session.
    Rejected,
    /// The store failed; a danger flash was recorded.
    StorageFailed,
}

impl UpdateOutcome {
    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::Updated
    }
}

/// Values submitted from the profile edit page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdateForm {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub introduction: String,
}

impl ProfileUpdateForm {
    /// The form reports the first failing field only.
    pub const MODE: ValidationMode = ValidationMode::Strict;

    /// The checks this form must pass, in display order.
    #[must_use]
    pub fn rules(&self) -> Vec<FieldRules> {
        profile_rules(&self.name, &self.email, &self.introduction, Some(self.id))
    }

    /// Submitted values keyed by field, for re-filling the form.
    #[must_use]
    pub fn old_input(&self) -> BTreeMap<String, String> {
        [
            (ProfileFields::NAME, &self.name),
            (ProfileFields::EMAIL, &self.email),
            (ProfileFields::INTRODUCTION, &self.introduction),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.clone()))
        .collect()
    }

    /// Validates the form and, when it passes, applies it to `user` and saves.
    ///
    /// Failures never escape as errors: rule violations are saved to
    /// `session` for the next page, store failures become a danger flash.
    /// `user` is only modified once validation has passed.
    #[instrument(skip_all, fields(user_id = self.id))]
    pub async fn validate_and_update<R>(
        &self,
        session: &mut RequestSession,
        user: &mut User,
        repo: &R,
    ) -> UpdateOutcome
    where
        R: UsersRepository + ?Sized,
    {
        let lookup = NameLookup(repo);
        let report = match bbs_validate::run(&self.rules(), Self::MODE, &lookup).await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "profile validation could not complete");
                session.flash(FlashLevel::Danger, format!("{UPDATE_FAILED_PREFIX}{e}"));
                return UpdateOutcome::StorageFailed;
            }
        };

        if !report.is_ok() {
            debug!(errors = report.errors.len(), "profile update rejected");
            session.save_validation(report, self.old_input());
            return UpdateOutcome::Rejected;
        }

        user.name.clone_from(&self.name);
        user.email.clone_from(&self.email);
        user.introduction.clone_from(&self.introduction);
        user.updated_at = OffsetDateTime::now_utc();

        if let Err(e) = repo.update(user).await {
            warn!(error = %e, "profile update failed");
            session.flash(FlashLevel::Danger, format!("{UPDATE_FAILED_PREFIX}{e}"));
            return UpdateOutcome::StorageFailed;
        }

        info!("profile updated");
        UpdateOutcome::Updated
    }
}

fn name_rules(exclude_id: Option<i64>) -> [Rule; 4] {
    [
        Rule::Required,
        Rule::Between {
            min: NAME_MIN_CHARS,
            max: NAME_MAX_CHARS,
        },
        Rule::Pattern(NAME_PATTERN.clone()),
        Rule::Unique {
            column: ProfileFields::NAME,
            exclude_id,
        },
    ]
}

/// Rules shared by profile edits and new users; `exclude_id` is the record
/// whose own name does not count as taken.
fn profile_rules(
    name: &str,
    email: &str,
    introduction: &str,
    exclude_id: Option<i64>,
) -> Vec<FieldRules> {
    let name = name_rules(exclude_id)
        .into_iter()
        .zip(NAME_MESSAGES)
        .fold(FieldRules::new(ProfileFields::NAME, name), |rules, (rule, msg)| {
            rules.check(Check::new(rule).with_message(msg))
        });

    let email = FieldRules::new(ProfileFields::EMAIL, email)
        .check(Rule::Required)
        .check(Rule::MaxLength(EMAIL_MAX_CHARS))
        .check(Rule::Email);

    let introduction = FieldRules::new(ProfileFields::INTRODUCTION, introduction)
        .check(Rule::MaxLength(INTRODUCTION_MAX_CHARS));

    vec![name, email, introduction]
}

impl NewUser {
    /// Checks a new user against the profile rules, reporting every failing
    /// field.
    ///
    /// # Errors
    ///
    /// [`ValidateError::Lookup`] when the name lookup fails.
    pub async fn validate<R>(&self, repo: &R) -> Result<ValidationReport, ValidateError>
    where
        R: UsersRepository + ?Sized,
    {
        let rules = profile_rules(&self.name, &self.email, &self.introduction, None);
        bbs_validate::run(&rules, ValidationMode::CollectAll, &NameLookup(repo)).await
    }
}

/// Answers name uniqueness checks from the users store.
struct NameLookup<'a, R: ?Sized>(&'a R);

#[async_trait]
impl<R> UniquenessLookup for NameLookup<'_, R>
where
    R: UsersRepository + ?Sized,
{
    async fn is_taken(
        &self,
        column: &str,
        value: &str,
        exclude_id: Option<i64>,
    ) -> anyhow::Result<bool> {
        if column != ProfileFields::NAME {
            anyhow::bail!("no uniqueness lookup for column '{column}'");
        }
        self.0.name_taken(value, exclude_id).await
    }
}
