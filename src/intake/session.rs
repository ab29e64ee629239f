//! Editable/locked lifecycle of the basic-information form.
//!
//! ```text
//! Editable --save (valid)--> Locked
//! Locked   --unlock-------> Editable
//! ```
//!
//! A failed save leaves the form editable and keeps what was typed. The
//! last successfully saved record survives an unlock, so a document can
//! still be generated while the technician corrects a field.

use tracing::{debug, info};

use super::draft::RecordDraft;
use super::ValidationError;
use crate::models::{InstallationRecord, LabelSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Editable,
    Locked,
}

#[derive(Debug, Clone)]
pub struct FormSession {
    label_set: LabelSet,
    state: FormState,
    draft: RecordDraft,
    saved: Option<InstallationRecord>,
}

impl FormSession {
    pub fn new(label_set: LabelSet) -> Self {
        Self {
            label_set,
            state: FormState::Editable,
            draft: RecordDraft::default(),
            saved: None,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state == FormState::Locked
    }

    pub fn label_set(&self) -> LabelSet {
        self.label_set
    }

    /// Current form contents (saved or not).
    pub fn draft(&self) -> &RecordDraft {
        &self.draft
    }

    /// Replace the form contents without validating.
    pub fn edit(&mut self, draft: RecordDraft) -> Result<(), ValidationError> {
        if self.is_locked() {
            return Err(ValidationError::NotEditable);
        }
        self.draft = draft;
        Ok(())
    }

    /// Validate `draft` and lock the form on success.
    pub fn save(&mut self, draft: RecordDraft) -> Result<&InstallationRecord, ValidationError> {
        if self.is_locked() {
            return Err(ValidationError::NotEditable);
        }
        self.draft = draft;

        let record = match self.draft.validate(self.label_set.labels()) {
            Ok(record) => record,
            Err(e) => {
                debug!(error = %e, "Form save rejected");
                return Err(e);
            }
        };

        info!(work_date = %record.work_date, "Basic information saved, form locked");
        self.state = FormState::Locked;
        Ok(self.saved.insert(record))
    }

    /// Reopen a locked form for editing.
    pub fn unlock(&mut self) -> Result<(), ValidationError> {
        if !self.is_locked() {
            return Err(ValidationError::AlreadyEditable);
        }
        self.state = FormState::Editable;
        debug!("Form unlocked");
        Ok(())
    }

    /// Last successfully saved record, if any.
    pub fn record(&self) -> Option<&InstallationRecord> {
        self.saved.as_ref()
    }

    /// Saved record, or `NotSaved` when generation is attempted too early.
    pub fn require_record(&self) -> Result<&InstallationRecord, ValidationError> {
        self.saved.as_ref().ok_or(ValidationError::NotSaved)
    }
}
