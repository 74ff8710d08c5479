//! Top-level generation state and the single in-flight request guard.
//!
//! [`Controller`] owns the current plan, the busy flag and the last
//! user-facing error. At most one generation runs at a time; a second
//! submission while one is in flight is rejected with [`SubmitError::Busy`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::client::GenerativeClient;
use crate::form::{FormError, LessonForm, check_submission};
use crate::plan::request::InlineData;
use crate::plan::service::{PlanError, generate_lesson_plan};
use crate::plan::types::LessonPlan;

/// Static message shown to the user on any generation failure.
pub const GENERATION_FAILED_MESSAGE: &str = "Une erreur s'est produite lors de la génération. \
Veuillez vérifier votre clé API ou réessayer.";

/// Snapshot of the top-level state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub plan: Option<LessonPlan>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Errors from [`Controller::submit`].
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("a generation is already in progress")]
    Busy,

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Clears the busy flag when dropped, whatever the outcome of the call.
struct BusyGuard<'a> {
    state: &'a Mutex<AppState>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .loading = false;
    }
}

/// Owns the generation state and drives the plan service.
pub struct Controller {
    client: Arc<dyn GenerativeClient>,
    credential: Option<String>,
    model: String,
    state: Mutex<AppState>,
}

impl Controller {
    pub fn new(
        client: Arc<dyn GenerativeClient>,
        credential: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            credential,
            model: model.into(),
            state: Mutex::new(AppState::default()),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> AppState {
        self.lock().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().loading
    }

    pub fn current_plan(&self) -> Option<LessonPlan> {
        self.lock().plan.clone()
    }

    /// Discard the current plan.
    pub fn reset(&self) {
        self.lock().plan = None;
    }

    /// Run one generation for `form` and `files`.
    ///
    /// The subject-or-files rule is checked first; no call is made when it
    /// fails. On success the plan replaces the current one; on failure the
    /// static user message is stored. The typed error is returned either way
    /// so callers can tell decoding failures from transport ones.
    pub async fn submit(
        &self,
        form: &LessonForm,
        files: &[InlineData],
    ) -> Result<LessonPlan, SubmitError> {
        check_submission(&form.subject, files.len())?;

        {
            let mut state = self.lock();
            if state.loading {
                tracing::warn!("generation rejected: another request is in flight");
                return Err(SubmitError::Busy);
            }
            state.loading = true;
            state.error = None;
        }
        let _busy = BusyGuard { state: &self.state };

        let result = generate_lesson_plan(
            self.client.as_ref(),
            self.credential.as_deref(),
            &self.model,
            &form.context(),
            files,
        )
        .await;

        let mut state = self.lock();
        match result {
            Ok(plan) => {
                state.plan = Some(plan.clone());
                Ok(plan)
            }
            Err(e) => {
                tracing::error!(kind = e.kind(), error = %e, "generation failed");
                state.error = Some(GENERATION_FAILED_MESSAGE.to_string());
                Err(e.into())
            }
        }
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("model", &self.model)
            .field("has_credential", &self.credential.is_some())
            .field("state", &*self.lock())
            .finish()
    }
}
