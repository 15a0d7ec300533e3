//! Declarative form validation for the BBS web application
//!
//! A form describes its constraints as plain data: an ordered list of
//! [`FieldRules`], each holding the submitted value and the [`Check`]s that
//! apply to it. A check pairs one [`Rule`] with an optional message override,
//! so a message can never drift away from the rule it describes.
//!
//! [`run`] evaluates the list under an explicit [`ValidationMode`] and returns
//! a [`ValidationReport`]. Rules that need the backing store (uniqueness) are
//! answered by a caller-supplied [`UniquenessLookup`].
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod engine;
pub mod messages;
pub mod report;
pub mod rule;

pub use engine::{UniquenessLookup, ValidateError, ValidationMode, run};
pub use report::{FieldErrors, ValidationReport};
pub use rule::{Check, FieldRules, Rule};
