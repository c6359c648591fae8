use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    require_non_blank, require_non_blank_opt, CreatePayloadInput, LaunchServiceProvider, Payload,
    Rocket, ValidationError,
};

/// One launch event.
///
/// The credited service provider may differ from the rocket's manufacturer
/// (e.g. a rocket built by one company and flown by another).
///
/// Equality is `(launch_date, launch_vehicle, launch_service_provider, orbit)`:
/// two records with the same quadruple describe the same event even when the
/// price, site or payloads disagree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Launch {
    pub id: Uuid,
    pub launch_date: NaiveDate,
    pub launch_vehicle: Rocket,
    pub launch_service_provider: LaunchServiceProvider,
    /// Free-text orbit classifier, e.g. "LEO" or "GTO".
    pub orbit: String,
    pub launch_outcome: LaunchOutcome,
    pub price: Decimal,
    /// Payloads carried. Empty when none were recorded.
    #[serde(default)]
    pub payloads: Vec<Payload>,
    pub launch_site: Option<String>,
    pub function: Option<String>,
}

impl Launch {
    pub fn is_successful(&self) -> bool {
        self.launch_outcome == LaunchOutcome::Successful
    }

    pub fn active_payload_count(&self) -> usize {
        self.payloads.iter().filter(|p| p.is_active).count()
    }

    /// Summed payload mass in kilograms.
    pub fn payload_mass_kg(&self) -> u64 {
        self.payloads.iter().map(|p| u64::from(p.mass_kg)).sum()
    }
}

impl PartialEq for Launch {
    fn eq(&self, other: &Self) -> bool {
        self.launch_date == other.launch_date
            && self.launch_vehicle == other.launch_vehicle
            && self.launch_service_provider == other.launch_service_provider
            && self.orbit == other.orbit
    }
}

impl Eq for Launch {}

impl Hash for Launch {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.launch_date.hash(state);
        self.launch_vehicle.hash(state);
        self.launch_service_provider.hash(state);
        self.orbit.hash(state);
    }
}

/// The result of a launch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LaunchOutcome {
    Failed,
    Successful,
}

impl LaunchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Failed => "failed",
            Self::Successful => "successful",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "failed" => Some(Self::Failed),
            "successful" => Some(Self::Successful),
            _ => None,
        }
    }
}

/// Input for recording a launch of a stored rocket by a stored provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLaunchInput {
    pub launch_date: NaiveDate,
    pub rocket_id: Uuid,
    pub provider_id: Uuid,
    pub orbit: String,
    pub launch_outcome: LaunchOutcome,
    pub price: Decimal,
    #[serde(default)]
    pub payloads: Vec<CreatePayloadInput>,
    #[serde(default)]
    pub launch_site: Option<String>,
    #[serde(default)]
    pub function: Option<String>,
}

impl CreateLaunchInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("orbit", &self.orbit)?;
        require_non_blank_opt("launch site", self.launch_site.as_deref())?;
        require_non_blank_opt("function", self.function.as_deref())?;
        validate_price(self.price)?;
        for payload in &self.payloads {
            payload.validate()?;
        }
        Ok(())
    }
}

/// Input for updating the non-identity fields of a launch. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLaunchInput {
    pub launch_outcome: Option<LaunchOutcome>,
    pub price: Option<Decimal>,
    pub launch_site: Option<String>,
    pub function: Option<String>,
}

impl UpdateLaunchInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank_opt("launch site", self.launch_site.as_deref())?;
        require_non_blank_opt("function", self.function.as_deref())?;
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }
}

fn validate_price(price: Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::Invalid {
            field: "price",
            reason: "cannot be negative",
        });
    }
    Ok(())
}
