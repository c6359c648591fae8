use std::hash::{Hash, Hasher};

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require_non_blank, require_non_blank_opt, ValidationError};

/// An organisation that manufactures rockets, conducts launches, or both.
///
/// Two providers are the same provider when their name, founding year and
/// country match, regardless of id or headquarters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchServiceProvider {
    pub id: Uuid,
    pub name: String,
    pub year_founded: i32,
    pub country: String,
    pub headquarters: Option<String>,
}

impl PartialEq for LaunchServiceProvider {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.year_founded == other.year_founded
            && self.country == other.country
    }
}

impl Eq for LaunchServiceProvider {}

impl Hash for LaunchServiceProvider {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.year_founded.hash(state);
        self.country.hash(state);
    }
}

/// Input for saving a provider. Text fields are trimmed on save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProviderInput {
    pub name: String,
    pub year_founded: i32,
    pub country: String,
    #[serde(default)]
    pub headquarters: Option<String>,
}

impl CreateProviderInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)?;
        require_non_blank("country", &self.country)?;
        require_non_blank_opt("headquarters", self.headquarters.as_deref())?;

        if !is_country_name(self.country.trim()) {
            return Err(ValidationError::Invalid {
                field: "country",
                reason: "may only contain letters, spaces, comma, apostrophe and full stop",
            });
        }
        if self.year_founded < 1000 {
            return Err(ValidationError::Invalid {
                field: "year_founded",
                reason: "cannot be earlier than 1000",
            });
        }
        if self.year_founded > Utc::now().year() {
            return Err(ValidationError::Invalid {
                field: "year_founded",
                reason: "cannot be in the future",
            });
        }
        Ok(())
    }
}

fn is_country_name(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphabetic() || matches!(c, ' ' | ',' | '\'' | '.'))
}
