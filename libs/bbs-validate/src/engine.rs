//! Rule evaluation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::messages::default_message;
use crate::report::ValidationReport;
use crate::rule::{Check, FieldRules, Rule};

/// How far a run goes after the first failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Stop at the first field with a failing rule.
    #[default]
    Strict,
    /// Evaluate every field and report one failure per field.
    CollectAll,
}

/// Answers [`Rule::Unique`] checks against the backing store.
#[async_trait]
pub trait UniquenessLookup: Send + Sync {
    /// Returns `true` when some record other than `exclude_id` already holds
    /// `value` in `column`.
    async fn is_taken(
        &self,
        column: &str,
        value: &str,
        exclude_id: Option<i64>,
    ) -> anyhow::Result<bool>;
}

#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("uniqueness lookup for '{field}' failed: {source}")]
    Lookup {
        field: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// Evaluates `fields` in order.
///
/// Within a field, checks run in declaration order and the first failing one
/// contributes its message; the remaining checks of that field are skipped.
///
/// # Errors
///
/// Returns [`ValidateError::Lookup`] when the store cannot answer a uniqueness
/// check.
pub async fn run<P>(
    fields: &[FieldRules],
    mode: ValidationMode,
    lookup: &P,
) -> Result<ValidationReport, ValidateError>
where
    P: UniquenessLookup + ?Sized,
{
    let mut report = ValidationReport::default();

    for field in fields {
        if let Some(check) = first_failure(field, lookup).await? {
            let message = check
                .message
                .as_ref()
                .map_or_else(|| default_message(field.field, &check.rule), ToString::to_string);
            debug!(field = field.field, rule = check.rule.code(), "validation failed");
            report.push(field.field, message);

            if mode == ValidationMode::Strict {
                break;
            }
        }
    }

    Ok(report)
}

async fn first_failure<'a, P>(
    field: &'a FieldRules,
    lookup: &P,
) -> Result<Option<&'a Check>, ValidateError>
where
    P: UniquenessLookup + ?Sized,
{
    for check in &field.checks {
        let passed = match (&check.rule, check.rule.check_local(&field.value)) {
            (_, Some(passed)) => passed,
            (Rule::Unique { column, exclude_id }, None) => !lookup
                .is_taken(column, &field.value, *exclude_id)
                .await
                .map_err(|source| ValidateError::Lookup {
                    field: field.field,
                    source,
                })?,
            (_, None) => true,
        };
        trace!(field = field.field, rule = check.rule.code(), passed, "rule evaluated");

        if !passed {
            return Ok(Some(check));
        }
    }
    Ok(None)
}
