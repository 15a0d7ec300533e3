use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::error::DomainError;
use super::form::{ProfileUpdateForm, UpdateOutcome};
use super::model::{NewUser, User};
use super::repo::UsersRepository;
use super::session::RequestSession;

pub struct Service {
    repo: Arc<dyn UsersRepository>,
}

impl Service {
    #[must_use]
    pub fn new(repo: Arc<dyn UsersRepository>) -> Self {
        Self { repo }
    }

    /// # Errors
    ///
    /// [`DomainError::NotFound`] when no user has `id`.
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: i64) -> Result<User, DomainError> {
        debug!("Getting user by id");
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(id))
    }

    /// Loads the user addressed by `form.id` and applies the form to it.
    ///
    /// Validation and save failures are reported through `session` and the
    /// returned outcome; only a missing user or a failed lookup is an error.
    ///
    /// # Errors
    ///
    /// [`DomainError::NotFound`] when the user does not exist,
    /// [`DomainError::Database`] when it cannot be loaded.
    #[instrument(skip(self, session, form), fields(user_id = form.id))]
    pub async fn update_profile(
        &self,
        session: &mut RequestSession,
        form: &ProfileUpdateForm,
    ) -> Result<(User, UpdateOutcome), DomainError> {
        let mut user = self.get_user(form.id).await?;
        let outcome = form
            .validate_and_update(session, &mut user, self.repo.as_ref())
            .await;
        Ok((user, outcome))
    }

    /// Registers a user after checking it against the profile rules.
    ///
    /// # Errors
    ///
    /// [`DomainError::Invalid`] with every failing field when a rule is
    /// broken, [`DomainError::Database`] when the store fails.
    #[instrument(skip(self, new_user), fields(name = %new_user.name))]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        let report = new_user
            .validate(self.repo.as_ref())
            .await
            .map_err(anyhow::Error::from)?;
        if !report.is_ok() {
            debug!(errors = report.errors.len(), "new user rejected");
            return Err(DomainError::invalid(report));
        }

        let user = self.repo.create(new_user).await?;
        info!(user_id = user.id, "user created");
        Ok(user)
    }
}
