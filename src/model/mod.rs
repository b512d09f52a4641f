//! Models - the versioned records managed by the service.
//!
//! Both entity types carry a server-assigned identifier and a version
//! counter. The version is the compare-and-swap token of the optimistic
//! update protocol: it starts at [`INITIAL_VERSION`] and grows by exactly one
//! on each successful update.
//!
//! ## Example
//!
//! ```ignore
//! use contact_service::{NewContact, Versioned};
//!
//! let input = NewContact::new("Jane Q Public", "+1-555-0100");
//! input.validate()?;
//! let contact = contacts.create(input).await?;
//! assert_eq!(contact.version(), 1);
//! ```

mod contact;
mod group;

pub use contact::{Contact, ContactPatch, NewContact};
pub use group::{Group, GroupPatch, NewGroup};

/// Server-assigned record identifier. Valid identifiers are `>= 1`.
pub type RecordId = i64;

/// Optimistic concurrency token.
pub type Version = i32;

/// Version of a freshly inserted record.
pub const INITIAL_VERSION: Version = 1;

/// Trait for records that go through the optimistic update protocol.
pub trait Versioned {
    /// The table this record lives in. Used in error reports.
    const TABLE: &'static str;

    fn id(&self) -> RecordId;

    /// The version the holder of this value last observed.
    fn version(&self) -> Version;
}
