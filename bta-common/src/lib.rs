//! # bt-agenda common library
//!
//! Shared code for the bt-agenda service including:
//! - Canonical agenda item model and identifier derivation
//! - Error taxonomy
//! - ISO-8601 week helpers

pub mod error;
pub mod model;
pub mod week;

pub use error::{Error, Result};
pub use model::AgendaItem;
