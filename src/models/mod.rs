//! Domain models for the launch history.
//!
//! # Core Concepts
//!
//! ## Catalogue Entities
//!
//! - [`LaunchServiceProvider`]: An organisation that builds rockets or conducts launches.
//!   Identified by name, founding year and country.
//! - [`Rocket`]: A launch vehicle, identified by name, country and manufacturer.
//!
//! ## Launch History
//!
//! - [`Launch`]: One launch event. The service provider credited with the launch
//!   may differ from the rocket's manufacturer.
//! - [`Payload`]: Something carried by a launch. Only the mass and the active flag
//!   matter to the ranking queries.
//!
//! ## Accounts
//!
//! - [`User`]: A registered user, identified by email.
//!
//! Stored entities carry a [`uuid::Uuid`] id, but equality and hashing use the
//! natural identity of each entity so that two records describing the same
//! real-world object compare equal.

mod launch;
mod payload;
mod provider;
mod rocket;
mod user;

pub use launch::*;
pub use payload::*;
pub use provider::*;
pub use rocket::*;
pub use user::*;

use thiserror::Error;

/// A field rejected by one of the input `validate()` methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} cannot be blank")]
    Blank(&'static str),

    #[error("{field} is invalid: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

pub(crate) fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank(field));
    }
    Ok(())
}

pub(crate) fn require_non_blank_opt(
    field: &'static str,
    value: Option<&str>,
) -> Result<(), ValidationError> {
    match value {
        Some(v) => require_non_blank(field, v),
        None => Ok(()),
    }
}
