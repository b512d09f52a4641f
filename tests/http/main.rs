//! HTTP integration tests.
//!
//! Boots the router on an ephemeral port over the in-memory store and
//! drives it with reqwest.

mod support;
mod errors;
mod logging;
