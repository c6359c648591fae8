//! Bulk import of launch history from JSON seed files.
//!
//! A seed file lists launches with their rocket, manufacturer, service
//! provider and payloads spelled out inline:
//!
//! ```json
//! {
//!   "launches": [{
//!     "launch_date": "2017-03-30",
//!     "rocket": {
//!       "name": "Falcon 9", "country": "USA",
//!       "manufacturer": { "name": "SpaceX", "year_founded": 2002, "country": "USA" }
//!     },
//!     "provider": { "name": "SpaceX", "year_founded": 2002, "country": "USA" },
//!     "orbit": "GTO",
//!     "launch_outcome": "successful",
//!     "price": "62000000",
//!     "payloads": [{ "name": "SES-10", "destination": "GEO", "mass_kg": 5300,
//!                    "payload_type": "satellite", "is_active": true }]
//!   }]
//! }
//! ```
//!
//! Providers and rockets are matched by identity, so a manufacturer mentioned
//! by many launches is stored once.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::models::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    pub launches: Vec<LaunchRecord>,
}

/// A launch with everything it references inlined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchRecord {
    pub launch_date: NaiveDate,
    pub rocket: RocketRecord,
    pub provider: CreateProviderInput,
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocketRecord {
    pub name: String,
    pub country: String,
    pub manufacturer: CreateProviderInput,
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

/// What an import touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub providers: usize,
    pub rockets: usize,
    pub launches: usize,
    /// Launches skipped because an identical launch was already stored.
    pub duplicates: usize,
}

pub fn load(path: &Path) -> Result<Seed> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let seed = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse seed file {}", path.display()))?;
    Ok(seed)
}

pub fn import(db: &Database, seed: &Seed) -> Result<ImportSummary> {
    let mut providers = HashSet::new();
    let mut rockets = HashSet::new();
    let mut summary = ImportSummary::default();

    for (i, record) in seed.launches.iter().enumerate() {
        let manufacturer = db
            .save_provider(record.rocket.manufacturer.clone())
            .with_context(|| format!("launch #{i}: invalid manufacturer"))?;
        let provider = db
            .save_provider(record.provider.clone())
            .with_context(|| format!("launch #{i}: invalid provider"))?;
        let rocket = db
            .save_rocket(CreateRocketInput {
                name: record.rocket.name.clone(),
                country: record.rocket.country.clone(),
                manufacturer_id: manufacturer.id,
                mass_to_leo: record.rocket.mass_to_leo,
                mass_to_gto: record.rocket.mass_to_gto,
                mass_to_other: record.rocket.mass_to_other,
                first_year_flight: record.rocket.first_year_flight,
                latest_year_flight: record.rocket.latest_year_flight,
                wikilink: record.rocket.wikilink.clone(),
            })
            .with_context(|| format!("launch #{i}: invalid rocket"))?;

        providers.insert(manufacturer.id);
        providers.insert(provider.id);
        rockets.insert(rocket.id);

        if db
            .find_launch(record.launch_date, rocket.id, provider.id, &record.orbit)?
            .is_some()
        {
            tracing::debug!("skipping duplicate launch #{}", i);
            summary.duplicates += 1;
            continue;
        }

        db.create_launch(CreateLaunchInput {
            launch_date: record.launch_date,
            rocket_id: rocket.id,
            provider_id: provider.id,
            orbit: record.orbit.clone(),
            launch_outcome: record.launch_outcome,
            price: record.price,
            payloads: record.payloads.clone(),
            launch_site: record.launch_site.clone(),
            function: record.function.clone(),
        })
        .with_context(|| format!("launch #{i}: could not be recorded"))?;
        summary.launches += 1;
    }

    summary.providers = providers.len();
    summary.rockets = rockets.len();
    tracing::info!(
        "imported {} launches ({} duplicates) across {} rockets and {} providers",
        summary.launches,
        summary.duplicates,
        summary.rockets,
        summary.providers
    );
    Ok(summary)
}
