//! Rules and their per-field grouping.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::unwrap_used)]
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)+$")
        .unwrap()
});

/// A single constraint on a submitted string value.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Value must contain something other than whitespace.
    Required,
    /// Character count must lie in `min..=max`.
    Between { min: usize, max: usize },
    /// Character count must not exceed the bound.
    MaxLength(usize),
    /// Whole value must match the expression.
    Pattern(Regex),
    /// Value must look like `local@domain.tld`.
    Email,
    /// No other record may hold the value in `column`.
    ///
    /// The record identified by `exclude_id` (the one being edited) is ignored.
    Unique {
        column: &'static str,
        exclude_id: Option<i64>,
    },
}

impl Rule {
    /// Evaluates rules that only need the value itself.
    ///
    /// Returns `None` for rules that must consult the store.
    #[must_use]
    pub fn check_local(&self, value: &str) -> Option<bool> {
        let len = value.chars().count();
        match self {
            Self::Required => Some(!value.trim().is_empty()),
            Self::Between { min, max } => Some((*min..=*max).contains(&len)),
            Self::MaxLength(max) => Some(len <= *max),
            Self::Pattern(re) => Some(re.is_match(value)),
            Self::Email => Some(EMAIL_RE.is_match(value)),
            Self::Unique { .. } => None,
        }
    }

    /// Short machine-readable name, used in logs.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Between { .. } => "between",
            Self::MaxLength(_) => "max_length",
            Self::Pattern(_) => "pattern",
            Self::Email => "email",
            Self::Unique { .. } => "unique",
        }
    }
}

/// A rule together with the message shown when it fails.
#[derive(Debug, Clone)]
pub struct Check {
    pub rule: Rule,
    pub message: Option<Cow<'static, str>>,
}

impl Check {
    #[must_use]
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            message: None,
        }
    }

    /// Overrides the engine's default message for this rule.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl From<Rule> for Check {
    fn from(rule: Rule) -> Self {
        Self::new(rule)
    }
}

/// Ordered checks for one submitted field.
#[derive(Debug, Clone)]
pub struct FieldRules {
    pub field: &'static str,
    pub value: String,
    pub checks: Vec<Check>,
}

impl FieldRules {
    #[must_use]
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            checks: Vec::new(),
        }
    }

    #[must_use]
    pub fn check(mut self, check: impl Into<Check>) -> Self {
        self.checks.push(check.into());
        self
    }
}
