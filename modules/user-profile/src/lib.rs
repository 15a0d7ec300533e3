//! User profile editing for the BBS
//!
//! A submitted profile form is checked against a fixed rule set, and either
//! applied to the stored user or turned into field-scoped error messages that
//! the next rendered page shows once.
//!
//! - [`domain::form`] declares the rules and runs the update
//! - [`domain::session`] holds per-request flash state
//! - [`infra::storage`] persists users with `SeaORM`
//! - [`api::rest`] exposes the edit page and form submission over axum
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;

pub use config::UserProfileConfig;
pub use domain::form::{ProfileUpdateForm, UpdateOutcome};
pub use domain::model::{NewUser, User};
pub use domain::service::Service;
pub use domain::session::{Flash, FlashLevel, RequestSession};
