use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{require_non_blank, ValidationError};

/// Letters only, optionally joined by a single `-` or `'`.
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Za-z]+['-][A-Za-z]+|[A-Za-z]+)$").expect("valid regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\w.!#$%&'*+\-/=?^_`{|}~]+@[\w.]+\.[A-Za-z]{2,}$").expect("valid regex")
});

/// A registered user. Users are identified by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// SHA-256 hex digest of the password.
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    /// Check a candidate password. Surrounding whitespace is ignored.
    pub fn password_matches(&self, candidate: &str) -> bool {
        hash_password(candidate.trim()) == self.password_hash
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.email == other.email
    }
}

impl Eq for User {}

pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Input for registering a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl CreateUserInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !NAME_RE.is_match(&self.first_name) {
            return Err(ValidationError::Invalid {
                field: "first_name",
                reason: "only letters and a single - or ' are allowed",
            });
        }
        if !NAME_RE.is_match(&self.last_name) {
            return Err(ValidationError::Invalid {
                field: "last_name",
                reason: "only letters and a single - or ' are allowed",
            });
        }

        require_non_blank("email", &self.email)?;
        if self.email.starts_with('.') || !EMAIL_RE.is_match(&self.email) {
            return Err(ValidationError::Invalid {
                field: "email",
                reason: "not a valid address",
            });
        }

        validate_password(&self.password)
    }
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    require_non_blank("password", password)?;
    if password.chars().count() < 8 {
        return Err(ValidationError::Invalid {
            field: "password",
            reason: "must be 8 or more characters long",
        });
    }
    if password.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::Invalid {
            field: "password",
            reason: "must contain symbols or numbers",
        });
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return Err(ValidationError::Invalid {
            field: "password",
            reason: "must include upper and lowercase letters",
        });
    }
    Ok(())
}
