//! Create/edit form workflow shared by projects and data items
//!
//! ```text
//! Closed --new--> Open(Create, blank) --submit ok--> Saving --saved--> Closed
//! Closed --edit--> Open(Edit(id), from entity)        Saving --failed--> Open(error)
//! Open --cancel--> Closed
//! ```
//!
//! `FormMode` alone decides which request a submit issues and which draft
//! an open starts from. While `Saving`, submit and cancel are disabled, so
//! one user submit issues at most one mutation.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ConsoleError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(String),
}

/// What a form needs from the controller behind it
#[async_trait]
pub trait EntityForm: Send + Sync {
    type Draft: Clone + Send + Sync;

    /// Starting draft for a new entity
    fn blank_draft(&self) -> Self::Draft;

    /// Draft for an entity in the cached collection
    fn draft_for(&self, id: &str) -> Result<Self::Draft>;

    /// Local required-field validation, run before entering `Saving`
    fn check_draft(&self, draft: &Self::Draft) -> Result<()>;

    /// Create or update according to `mode`
    async fn persist(&self, mode: &FormMode, draft: &Self::Draft) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState<D> {
    Closed,
    Open {
        mode: FormMode,
        draft: D,
        error: Option<ConsoleError>,
    },
    Saving {
        mode: FormMode,
        draft: D,
    },
}

/// Handed out by [`FormMachine::begin_submit`]; persist it, then call
/// [`FormMachine::finish`] with the result.
#[derive(Debug, Clone)]
pub struct Submission<D> {
    pub mode: FormMode,
    pub draft: D,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Persisted; the form closed
    Saved,
    /// Validation or persistence failed; the form is open with the draft intact
    Rejected(ConsoleError),
    /// Nothing to submit (closed, or already saving)
    Ignored,
}

#[derive(Debug)]
pub struct FormMachine<D> {
    state: FormState<D>,
}

impl<D> Default for FormMachine<D> {
    fn default() -> Self {
        Self {
            state: FormState::Closed,
        }
    }
}

impl<D: Clone> FormMachine<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FormState<D> {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, FormState::Closed)
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.state, FormState::Saving { .. })
    }

    /// Submit is enabled only in `Open`
    pub fn can_submit(&self) -> bool {
        matches!(self.state, FormState::Open { .. })
    }

    pub fn mode(&self) -> Option<&FormMode> {
        match &self.state {
            FormState::Closed => None,
            FormState::Open { mode, .. } | FormState::Saving { mode, .. } => Some(mode),
        }
    }

    pub fn draft(&self) -> Option<&D> {
        match &self.state {
            FormState::Closed => None,
            FormState::Open { draft, .. } | FormState::Saving { draft, .. } => Some(draft),
        }
    }

    pub fn error(&self) -> Option<&ConsoleError> {
        match &self.state {
            FormState::Open { error, .. } => error.as_ref(),
            _ => None,
        }
    }

    /// Closed -> Open(Create). Returns false if the form was not closed.
    pub fn open_for_create<F>(&mut self, form: &F) -> bool
    where
        F: EntityForm<Draft = D>,
    {
        if self.is_open() {
            return false;
        }
        self.state = FormState::Open {
            mode: FormMode::Create,
            draft: form.blank_draft(),
            error: None,
        };
        true
    }

    /// Closed -> Open(Edit(id)). Fails with `NotFound` when the entity is
    /// not cached; the form then stays closed.
    pub fn open_for_edit<F>(&mut self, form: &F, id: &str) -> Result<bool>
    where
        F: EntityForm<Draft = D>,
    {
        if self.is_open() {
            return Ok(false);
        }
        let draft = form.draft_for(id)?;
        self.state = FormState::Open {
            mode: FormMode::Edit(id.to_string()),
            draft,
            error: None,
        };
        Ok(true)
    }

    /// Edit the draft in place; only allowed while `Open`
    pub fn update_draft(&mut self, edit: impl FnOnce(&mut D)) -> bool {
        match &mut self.state {
            FormState::Open { draft, .. } => {
                edit(draft);
                true
            }
            _ => false,
        }
    }

    /// Open -> Closed, discarding the draft. Ignored while saving.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            FormState::Open { .. } => {
                self.state = FormState::Closed;
                true
            }
            _ => false,
        }
    }

    /// Open -> Saving when the draft passes local validation.
    ///
    /// `Ok(None)` when there is nothing to submit (closed or already
    /// saving). A validation failure keeps the form open with the error.
    pub fn begin_submit<F>(&mut self, form: &F) -> Result<Option<Submission<D>>>
    where
        F: EntityForm<Draft = D>,
    {
        let (mode, draft) = match &mut self.state {
            FormState::Open { mode, draft, error } => {
                if let Err(e) = form.check_draft(draft) {
                    *error = Some(e.clone());
                    return Err(e);
                }
                (mode.clone(), draft.clone())
            }
            FormState::Saving { .. } => {
                debug!("submit ignored while saving");
                return Ok(None);
            }
            FormState::Closed => return Ok(None),
        };

        self.state = FormState::Saving {
            mode: mode.clone(),
            draft: draft.clone(),
        };
        Ok(Some(Submission { mode, draft }))
    }

    /// Saving -> Closed on success, Saving -> Open(error) on failure
    pub fn finish(&mut self, result: Result<()>) -> SubmitOutcome {
        let (mode, draft) = match std::mem::replace(&mut self.state, FormState::Closed) {
            FormState::Saving { mode, draft } => (mode, draft),
            other => {
                self.state = other;
                return SubmitOutcome::Ignored;
            }
        };

        match result {
            Ok(()) => SubmitOutcome::Saved,
            Err(e) => {
                self.state = FormState::Open {
                    mode,
                    draft,
                    error: Some(e.clone()),
                };
                SubmitOutcome::Rejected(e)
            }
        }
    }

    /// Run both submit phases against `form`
    pub async fn submit<F>(&mut self, form: &F) -> SubmitOutcome
    where
        F: EntityForm<Draft = D>,
    {
        let submission = match self.begin_submit(form) {
            Ok(Some(submission)) => submission,
            Ok(None) => return SubmitOutcome::Ignored,
            Err(e) => return SubmitOutcome::Rejected(e),
        };

        let result = form.persist(&submission.mode, &submission.draft).await;
        self.finish(result)
    }
}
