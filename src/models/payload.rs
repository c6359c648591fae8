use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require_non_blank, ValidationError};

/// Something carried into space by a launch, e.g. a satellite, a probe or a crew.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub id: Uuid,
    pub name: String,
    /// Where the payload is headed, e.g. "outside heliosphere".
    pub destination: String,
    pub mass_kg: u32,
    /// Kind of payload: satellite, space probe, crew, cargo...
    pub payload_type: String,
    /// Whether the payload is still in service.
    pub is_active: bool,
}

/// Input for a payload attached to a new launch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePayloadInput {
    pub name: String,
    pub destination: String,
    pub mass_kg: u32,
    pub payload_type: String,
    #[serde(default)]
    pub is_active: bool,
}

impl CreatePayloadInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("payload name", &self.name)?;
        require_non_blank("payload destination", &self.destination)?;
        require_non_blank("payload type", &self.payload_type)
    }
}
