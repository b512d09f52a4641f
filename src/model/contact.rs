use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{RecordId, Version, Versioned};
use crate::validator::{self, FieldErrors, Validator};

// Whole-string match over digits plus `[ ] ( ) + -`. The reference accepted
// any string containing one such character; this pattern deliberately
// requires every character to be one.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9\[\]()+\-]+$").expect("valid phone regex"));

const FULL_NAME_PARTS: usize = 3;

/// A stored contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: RecordId,
    pub full_name: String,
    pub phone: String,
    /// Set by the store on insert, never changed afterwards.
    pub created_at: DateTime<Utc>,
    pub version: Version,
}

/// Client-supplied fields for a new contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub full_name: String,
    pub phone: String,
}

/// Partial update. `None` leaves the field unchanged; `version` overrides the
/// expected version when the client pins one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactPatch {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub version: Option<Version>,
}

impl NewContact {
    pub fn new(full_name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            phone: phone.into(),
        }
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut v = Validator::new();
        validate_fields(&mut v, &self.full_name, &self.phone);
        v.finish()
    }
}

impl Contact {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut v = Validator::new();
        validate_fields(&mut v, &self.full_name, &self.phone);
        v.finish()
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, patch: ContactPatch) {
        if let Some(full_name) = patch.full_name {
            self.full_name = full_name;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(version) = patch.version {
            self.version = version;
        }
    }
}

impl Versioned for Contact {
    const TABLE: &'static str = "contacts";

    fn id(&self) -> RecordId {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }
}

fn validate_fields(v: &mut Validator, full_name: &str, phone: &str) {
    v.check(
        full_name.split_whitespace().count() == FULL_NAME_PARTS,
        "full name",
        "full name must contain 3 parts",
    );
    v.check(
        validator::matches(phone, &PHONE_RE),
        "phone",
        "must be a valid phone number",
    );
}
