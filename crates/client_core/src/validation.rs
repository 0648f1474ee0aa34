use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use shared::domain::{ContactField, ContactForm};
use thiserror::Error;

/// Per-field problems found before a contact form is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Name is required")]
    NameRequired,
    #[error("Email is required")]
    EmailRequired,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Phone is required")]
    PhoneRequired,
    #[error("Message is required")]
    MessageRequired,
}

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid hardcoded regex"));

/// Tunable validation rules. The phone number is optional unless a deployment
/// opts in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormRules {
    pub phone_required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: BTreeMap<ContactField, FieldError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors rendered as the text shown next to each field.
    pub fn messages(&self) -> BTreeMap<ContactField, String> {
        self.errors
            .iter()
            .map(|(field, err)| (*field, err.to_string()))
            .collect()
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn validate(form: &ContactForm) -> ValidationReport {
    validate_with(form, FormRules::default())
}

pub fn validate_with(form: &ContactForm, rules: FormRules) -> ValidationReport {
    let mut errors = BTreeMap::new();

    if is_blank(&form.name) {
        errors.insert(ContactField::Name, FieldError::NameRequired);
    }

    if is_blank(&form.email) {
        errors.insert(ContactField::Email, FieldError::EmailRequired);
    } else if !is_valid_email(&form.email) {
        errors.insert(ContactField::Email, FieldError::InvalidEmail);
    }

    if rules.phone_required && is_blank(&form.phone) {
        errors.insert(ContactField::Phone, FieldError::PhoneRequired);
    }

    if is_blank(&form.message) {
        errors.insert(ContactField::Message, FieldError::MessageRequired);
    }

    ValidationReport { errors }
}
