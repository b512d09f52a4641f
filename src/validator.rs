//! Field-level input validation.
//!
//! A `Validator` accumulates every failed check keyed by field name so a
//! single response can report all problems at once. The first message
//! recorded for a field wins.

use std::collections::BTreeMap;

use regex::Regex;

/// Field name → message map reported back to clients.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Default, Clone)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no check has failed.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record `message` for `field` unless the field already has one.
    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Record `message` for `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Consume the validator, returning the errors if any check failed.
    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// True when `value` matches `pattern`. Anchor the pattern for whole-string checks.
pub fn matches(value: &str, pattern: &Regex) -> bool {
    pattern.is_match(value)
}
