use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require_non_blank, LaunchServiceProvider, ValidationError};

/// A launch vehicle.
///
/// Identity is `(name, country, manufacturer)`. The performance figures and
/// flight years are descriptive only and never take part in comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rocket {
    pub id: Uuid,
    pub name: String,
    pub country: String,
    pub manufacturer: LaunchServiceProvider,
    /// Payload capacity to low Earth orbit, in kilograms.
    pub mass_to_leo: Option<u32>,
    /// Payload capacity to geostationary transfer orbit, in kilograms.
    pub mass_to_gto: Option<u32>,
    pub mass_to_other: Option<u32>,
    pub first_year_flight: Option<i32>,
    pub latest_year_flight: Option<i32>,
    pub wikilink: Option<String>,
}

impl PartialEq for Rocket {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.country == other.country
            && self.manufacturer == other.manufacturer
    }
}

impl Eq for Rocket {}

impl Hash for Rocket {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.country.hash(state);
        self.manufacturer.hash(state);
    }
}

/// Input for saving a rocket built by an already stored manufacturer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateRocketInput {
    pub name: String,
    pub country: String,
    pub manufacturer_id: Uuid,
    #[serde(default)]
    pub mass_to_leo: Option<u32>,
    #[serde(default)]
    pub mass_to_gto: Option<u32>,
    #[serde(default)]
    pub mass_to_other: Option<u32>,
    #[serde(default)]
    pub first_year_flight: Option<i32>,
    #[serde(default)]
    pub latest_year_flight: Option<i32>,
    #[serde(default)]
    pub wikilink: Option<String>,
}

impl CreateRocketInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("rocket name", &self.name)?;
        require_non_blank("rocket country", &self.country)?;

        if let (Some(first), Some(latest)) = (self.first_year_flight, self.latest_year_flight) {
            if latest < first {
                return Err(ValidationError::Invalid {
                    field: "latest_year_flight",
                    reason: "cannot be before the first flight",
                });
            }
        }
        Ok(())
    }
}
