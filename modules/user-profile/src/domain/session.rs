//! Request-scoped session state.
//!
//! A [`RequestSession`] is loaded at the start of a request, handed by `&mut`
//! to whatever needs to leave a message for the next page, and stored again
//! when the response is built. Anything it holds is shown once: the reading
//! side drains it with the `take_*` methods.

use std::collections::BTreeMap;

use bbs_validate::ValidationReport;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Validation failures saved for re-display, with the values the user typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedValidation {
    pub report: ValidationReport,
    pub old_input: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSession {
    flashes: Vec<Flash>,
    validation: Option<SavedValidation>,
}

impl RequestSession {
    pub fn flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        self.flashes.push(Flash {
            level,
            message: message.into(),
        });
    }

    /// Replaces any previously saved validation failures.
    pub fn save_validation(
        &mut self,
        report: ValidationReport,
        old_input: BTreeMap<String, String>,
    ) {
        self.validation = Some(SavedValidation { report, old_input });
    }

    /// Folds `newer` into this session: its flashes queue after the existing
    /// ones and its saved validation, if any, wins.
    pub fn merge(&mut self, newer: Self) {
        self.flashes.extend(newer.flashes);
        if newer.validation.is_some() {
            self.validation = newer.validation;
        }
    }

    #[must_use]
    pub fn flashes(&self) -> &[Flash] {
        &self.flashes
    }

    #[must_use]
    pub fn validation(&self) -> Option<&SavedValidation> {
        self.validation.as_ref()
    }

    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flashes)
    }

    pub fn take_validation(&mut self) -> Option<SavedValidation> {
        self.validation.take()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flashes.is_empty() && self.validation.is_none()
    }
}
