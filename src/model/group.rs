use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RecordId, Version, Versioned};
use crate::validator::{FieldErrors, Validator};

/// Longest accepted group name, in characters.
pub const MAX_GROUP_NAME_CHARS: usize = 250;

/// A stored contact group. Groups cannot be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: RecordId,
    pub group_name: String,
    pub created_at: DateTime<Utc>,
    pub version: Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub group_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupPatch {
    pub group_name: Option<String>,
    pub version: Option<Version>,
}

impl NewGroup {
    pub fn new(group_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut v = Validator::new();
        validate_name(&mut v, &self.group_name);
        v.finish()
    }
}

impl Group {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut v = Validator::new();
        validate_name(&mut v, &self.group_name);
        v.finish()
    }

    pub fn apply(&mut self, patch: GroupPatch) {
        if let Some(group_name) = patch.group_name {
            self.group_name = group_name;
        }
        if let Some(version) = patch.version {
            self.version = version;
        }
    }
}

impl Versioned for Group {
    const TABLE: &'static str = "groups";

    fn id(&self) -> RecordId {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }
}

fn validate_name(v: &mut Validator, group_name: &str) {
    v.check(
        group_name.chars().count() <= MAX_GROUP_NAME_CHARS,
        "group name",
        "must not be longer than 250 characters",
    );
}
