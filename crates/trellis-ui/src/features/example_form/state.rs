//! Example form state.
//!
//! # Design
//! - Validation runs on submit; after a failed attempt each edit revalidates its own field.
//! - The submitted result is kept until reset so the summary survives further edits.
//! - Each submit is stamped with a ticket. Only the ticket of the submit currently in flight
//!   may finish, so a result started before a reset can never land on a later submit.

use crate::features::example_form::logic::{Field, FieldErrors, FormInput, ValidatedForm, validate};

/// A validated form on its way to the submit action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSubmit {
    ticket: u64,
    form: ValidatedForm,
}

impl PendingSubmit {
    /// Form being submitted.
    #[must_use]
    pub const fn form(&self) -> &ValidatedForm {
        &self.form
    }
}

/// Editing and submission lifecycle for the example form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormController {
    input: FormInput,
    errors: FieldErrors,
    attempted: bool,
    in_flight: Option<u64>,
    next_ticket: u64,
    submitted: Option<ValidatedForm>,
}

impl FormController {
    /// Fresh, empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current raw input.
    #[must_use]
    pub const fn input(&self) -> &FormInput {
        &self.input
    }

    /// Visible errors.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Error key for one field.
    #[must_use]
    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    /// Whether a submit is in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Last successfully submitted form.
    #[must_use]
    pub const fn submitted(&self) -> Option<&ValidatedForm> {
        self.submitted.as_ref()
    }

    /// Update a text field. The terms checkbox goes through [`FormController::set_terms`].
    pub fn set_text(&mut self, field: Field, value: &str) {
        let Some(slot) = self.input.text_mut(field) else {
            return;
        };
        value.clone_into(slot);
        self.revalidate(field);
    }

    /// Tick or untick the terms checkbox.
    pub fn set_terms(&mut self, accepted: bool) {
        self.input.terms = accepted;
        self.revalidate(Field::Terms);
    }

    /// Validate and, when valid, enter the submitting phase.
    ///
    /// Returns the pending submission to hand back to [`FormController::finish_submit`];
    /// `None` when a rule failed or a submit is already running.
    pub fn begin_submit(&mut self) -> Option<PendingSubmit> {
        if self.is_submitting() {
            return None;
        }
        self.attempted = true;
        match validate(&self.input) {
            Ok(form) => {
                self.errors.clear();
                let ticket = self.next_ticket;
                self.next_ticket = self.next_ticket.wrapping_add(1);
                self.in_flight = Some(ticket);
                Some(PendingSubmit { ticket, form })
            }
            Err(errors) => {
                tracing::debug!(invalid = errors.len(), "form submission rejected");
                self.errors = errors;
                None
            }
        }
    }

    /// Record a completed submission.
    ///
    /// Ignored unless `pending` is the submit currently in flight, e.g. when the form was
    /// reset (and maybe resubmitted) in the meantime.
    pub fn finish_submit(&mut self, pending: PendingSubmit) {
        if self.in_flight != Some(pending.ticket) {
            tracing::debug!(ticket = pending.ticket, "stale submission dropped");
            return;
        }
        tracing::info!(form = %pending.form.redacted_json(), "form submitted");
        self.in_flight = None;
        self.submitted = Some(pending.form);
    }

    /// Clear inputs, errors, and the submitted summary. Tickets keep counting so submits
    /// started before the reset stay stale.
    pub fn reset(&mut self) {
        *self = Self {
            next_ticket: self.next_ticket,
            ..Self::default()
        };
    }

    fn revalidate(&mut self, field: Field) {
        if !self.attempted {
            return;
        }
        let fresh = validate(&self.input)
            .err()
            .and_then(|errors| errors.get(&field).copied());
        match fresh {
            Some(key) => {
                self.errors.insert(field, key);
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }
}
