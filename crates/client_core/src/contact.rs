//! Contact form controller: field edits, local validation and the submit
//! lifecycle against `POST /api/contact-us`.

use std::{collections::BTreeMap, sync::Arc};

use shared::domain::{ContactField, ContactForm};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::{
    api::SiteApi,
    error::GENERIC_FAILURE_MESSAGE,
    store::StateStore,
    validation::{validate_with, FormRules, ValidationReport},
};

pub const FIX_ERRORS_MESSAGE: &str = "Please fix the errors below";
pub const THANK_YOU_MESSAGE: &str = "Thank you for your message! We'll get back to you soon.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Success,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFormState {
    pub fields: ContactForm,
    /// Only populated by a failed local validation.
    pub field_errors: BTreeMap<ContactField, String>,
    pub submit_status: SubmitStatus,
    pub status_message: String,
    pub is_submitting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another submission is still in flight; nothing was done.
    Busy,
    Invalid(ValidationReport),
    Submitted,
    Failed(String),
}

pub struct ContactController {
    api: Arc<dyn SiteApi>,
    rules: FormRules,
    store: StateStore<ContactFormState>,
}

impl ContactController {
    pub fn new(api: Arc<dyn SiteApi>) -> Self {
        Self::with_rules(api, FormRules::default())
    }

    pub fn with_rules(api: Arc<dyn SiteApi>, rules: FormRules) -> Self {
        Self {
            api,
            rules,
            store: StateStore::new(ContactFormState::default()),
        }
    }

    pub fn state(&self) -> ContactFormState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ContactFormState> {
        self.store.subscribe()
    }

    pub fn update_field(&self, field: ContactField, value: impl Into<String>) {
        let value = value.into();
        self.store.update(|state| {
            state.fields.set(field, value);
            state.field_errors.remove(&field);
        });
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let started = self.store.update_if(|state| {
            if state.is_submitting {
                return false;
            }
            state.is_submitting = true;
            state.submit_status = SubmitStatus::Idle;
            state.status_message.clear();
            state.field_errors.clear();
            true
        });
        if !started {
            debug!("contact submit ignored while a submission is in flight");
            return SubmitOutcome::Busy;
        }
        let _finally = self.store.finally(|state| state.is_submitting = false);

        let form = self.store.read(|state| state.fields.clone());
        let report = validate_with(&form, self.rules);
        if !report.is_valid() {
            debug!(invalid_fields = report.errors.len(), "contact form failed validation");
            let messages = report.messages();
            self.store.update(|state| {
                state.field_errors = messages;
                state.submit_status = SubmitStatus::Error;
                state.status_message = FIX_ERRORS_MESSAGE.to_string();
            });
            return SubmitOutcome::Invalid(report);
        }

        match self.api.submit_contact_form(&form).await {
            Ok(response) => {
                info!(
                    server_message = response.message.as_deref().unwrap_or_default(),
                    "contact form submitted"
                );
                self.store.update(|state| {
                    state.submit_status = SubmitStatus::Success;
                    state.status_message = THANK_YOU_MESSAGE.to_string();
                    state.fields = ContactForm::default();
                });
                SubmitOutcome::Submitted
            }
            Err(err) => {
                debug!(status = ?err.status(), "contact form submission failed");
                let message = err.user_message(GENERIC_FAILURE_MESSAGE).to_string();
                self.store.update(|state| {
                    state.submit_status = SubmitStatus::Error;
                    state.status_message = message.clone();
                });
                SubmitOutcome::Failed(message)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/contact_tests.rs"]
mod tests;
