//! Entity services - the use-case layer between HTTP handlers and storage.
//!
//! A service owns an `Arc<dyn ...Store>` chosen at startup and a per-call
//! timeout. Every call derives one deadline from that timeout, hands it to
//! the adapter, and also bounds the whole call with it, so a misbehaving
//! adapter cannot hold a request past the deadline either.
//!
//! Services never retry. An edit conflict goes back to the client, which
//! re-reads and tries again.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use contact_service::{ContactService, InMemoryStore, NewContact};
//!
//! let contacts = ContactService::new(Arc::new(InMemoryStore::new()));
//! let mut jane = contacts.create(&NewContact::new("Jane Q Public", "555")).await?;
//! jane.phone = "555-0100".into();
//! let jane = contacts.update(jane).await?;
//! assert_eq!(jane.version, 2);
//! ```

mod contact;
mod group;

use std::time::Duration;

use tokio::time::Instant;

pub use contact::ContactService;
pub use group::GroupService;

/// Upper bound on a single service call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(6);

fn deadline_after(timeout: Duration) -> Instant {
    Instant::now() + timeout
}
