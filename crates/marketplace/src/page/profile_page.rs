//! Profile page controller.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::events::{Notice, Operation, PageError, PageEvent};
use super::scope::{ScopeHandle, ViewScope};
use crate::client::ProfileApi;
use crate::error::{RequestError, RequestResult};
use crate::models::{Profile, ProfileUpdate};
use crate::navigation::{Navigator, Route};
use crate::session::SessionStore;
use crate::validation::{self, EditForm, Field, FieldErrors};

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Profile updated, form reset and profile reloaded.
    Updated,
    /// Validation failed; nothing was sent.
    Invalid(FieldErrors),
    /// The update request failed; form left as is.
    Failed(RequestError),
}

/// View-model and controller of the profile page.
///
/// Owns the session, the displayed profile and the edit form. Requests run
/// inside the page's [`ViewScope`] and die with it.
pub struct ProfilePage<A, N> {
    api: Arc<A>,
    session: SessionStore,
    navigator: N,
    scope: ViewScope,
    events: mpsc::UnboundedSender<PageEvent>,

    profile: Option<Profile>,
    form: EditForm,
    errors: FieldErrors,
    submitted: bool,
    reload_requested: bool,
    last_error: Option<PageError>,
}

impl<A, N> ProfilePage<A, N>
where
    A: ProfileApi + 'static,
    N: Navigator,
{
    /// Create a page and the receiver for its events.
    pub fn new(
        api: Arc<A>,
        session: SessionStore,
        navigator: N,
    ) -> (Self, mpsc::UnboundedReceiver<PageEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let page = Self {
            api,
            session,
            navigator,
            scope: ViewScope::new(),
            events,
            profile: None,
            form: EditForm::default(),
            errors: FieldErrors::default(),
            submitted: false,
            reload_requested: false,
            last_error: None,
        };
        (page, rx)
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn form(&self) -> &EditForm {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Most recent request failure, if not yet superseded by a success.
    pub fn last_error(&self) -> Option<&PageError> {
        self.last_error.as_ref()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    /// Load the profile for the first time.
    pub async fn mount(&mut self) {
        tracing::debug!(authenticated = self.session.is_authenticated(), "Mounting profile page");
        self.request_reload();
        self.reload_if_requested().await;
    }

    /// Abort in-flight requests; later requests are refused.
    pub fn unmount(&mut self) {
        self.scope.close();
    }

    /// Mark the displayed profile as stale.
    pub fn request_reload(&mut self) {
        self.reload_requested = true;
    }

    /// Fetch the profile if a reload was requested. Returns whether a fetch ran.
    pub async fn reload_if_requested(&mut self) -> bool {
        if !std::mem::take(&mut self.reload_requested) {
            return false;
        }

        let api = Arc::clone(&self.api);
        let token = self.token();
        let result = self
            .scope
            .run(async move { api.fetch_profile(token.as_deref()).await })
            .await;

        match result {
            Ok(profile) => {
                tracing::debug!("Profile loaded");
                self.profile = Some(profile.clone());
                self.clear_error(Operation::FetchProfile);
                self.emit(PageEvent::ProfileLoaded(profile));
            }
            Err(e) => self.fail(Operation::FetchProfile, e),
        }
        true
    }

    /// Change a form field. After the first submit attempt the field is
    /// re-validated on every change.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.form.set(field, value);

        if self.submitted {
            self.errors
                .update(field, validation::validate_field(&self.form, field));
            if field == Field::Password {
                self.errors.update(
                    Field::ConfirmPassword,
                    validation::validate_field(&self.form, Field::ConfirmPassword),
                );
            }
        }
    }

    /// Validate the form and, if valid, send the update.
    pub async fn submit(&mut self) -> SubmitOutcome {
        self.submitted = true;
        self.errors = validation::validate(&self.form);

        if !self.errors.is_empty() {
            tracing::debug!(invalid_fields = self.errors.len(), "Profile form rejected");
            self.emit(PageEvent::ValidationFailed(self.errors.clone()));
            return SubmitOutcome::Invalid(self.errors.clone());
        }

        let update = ProfileUpdate {
            first_name: self.form.first_name.clone(),
            last_name: self.form.last_name.clone(),
            password: self.form.password.clone(),
        };

        let api = Arc::clone(&self.api);
        let token = self.token();
        let result = self
            .scope
            .run(async move { api.update_profile(token.as_deref(), &update).await })
            .await;

        match result {
            Ok(()) => {
                tracing::info!("Profile updated");
                self.clear_error(Operation::UpdateProfile);
                self.emit(PageEvent::Notice(Notice::ProfileUpdated));
                self.reset_form();
                self.request_reload();
                self.reload_if_requested().await;
                SubmitOutcome::Updated
            }
            Err(e) => {
                self.fail(Operation::UpdateProfile, e.clone());
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Delete the account. On success the session is cleared and the user is
    /// sent to the sign-up page.
    pub async fn delete_account(&mut self) -> RequestResult<()> {
        let api = Arc::clone(&self.api);
        let token = self.token();
        let result = self
            .scope
            .run(async move { api.delete_profile(token.as_deref()).await })
            .await;

        match result {
            Ok(()) => {
                tracing::info!("Account deleted");
                self.end_session();
                self.emit(PageEvent::Notice(Notice::AccountDeleted));
                self.navigator.navigate(Route::SignUp);
                Ok(())
            }
            Err(e) => {
                self.fail(Operation::DeleteAccount, e.clone());
                Err(e)
            }
        }
    }

    /// Clear the session and go to the login page. No request is made.
    pub fn log_out(&mut self) {
        tracing::info!("Logging out");
        self.end_session();
        self.emit(PageEvent::Notice(Notice::LoggedOut));
        self.navigator.navigate(Route::Login);
    }

    fn token(&self) -> Option<String> {
        self.session.token().map(str::to_string)
    }

    fn reset_form(&mut self) {
        self.form = EditForm::default();
        self.errors.clear();
        self.submitted = false;
    }

    fn end_session(&mut self) {
        self.scope.close();
        self.last_error = None;
        if let Err(e) = self.session.clear() {
            tracing::error!(error = %e, "Failed to persist cleared session");
        }
    }

    fn clear_error(&mut self, operation: Operation) {
        if self.last_error.as_ref().is_some_and(|e| e.operation == operation) {
            self.last_error = None;
        }
    }

    fn fail(&mut self, operation: Operation, error: RequestError) {
        if error == RequestError::Cancelled {
            tracing::debug!(operation = %operation, "Request cancelled");
            return;
        }

        tracing::warn!(operation = %operation, error = %error, "Request failed");
        let page_error = PageError { operation, error };
        self.last_error = Some(page_error.clone());
        self.emit(PageEvent::RequestFailed(page_error));
    }

    fn emit(&self, event: PageEvent) {
        // Receiver dropped means nobody is rendering; state is still kept.
        let _ = self.events.send(event);
    }
}
