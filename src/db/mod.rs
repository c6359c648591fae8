mod schema;

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::miner::LaunchRepository;
use crate::models::*;

/// Environment variable overriding the default database location.
pub const DB_PATH_ENV: &str = "ROCKET_MINER_DB";

const DATE_FORMAT: &str = "%Y-%m-%d";

const PROVIDER_SELECT: &str = "SELECT p.id, p.name, p.year_founded, p.country, p.headquarters
     FROM providers p";

const ROCKET_SELECT: &str = "SELECT r.id, r.name, r.country, r.mass_to_leo, r.mass_to_gto,
            r.mass_to_other, r.first_year_flight, r.latest_year_flight, r.wikilink,
            m.id, m.name, m.year_founded, m.country, m.headquarters
     FROM rockets r
     JOIN providers m ON m.id = r.manufacturer_id";

const LAUNCH_SELECT: &str = "SELECT l.id, l.launch_date, l.orbit, l.outcome, l.price, l.launch_site, l.function,
            r.id, r.name, r.country, r.mass_to_leo, r.mass_to_gto,
            r.mass_to_other, r.first_year_flight, r.latest_year_flight, r.wikilink,
            m.id, m.name, m.year_founded, m.country, m.headquarters,
            p.id, p.name, p.year_founded, p.country, p.headquarters
     FROM launches l
     JOIN rockets r ON r.id = l.rocket_id
     JOIN providers m ON m.id = r.manufacturer_id
     JOIN providers p ON p.id = l.provider_id";

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open the database at `$ROCKET_MINER_DB`, or in the user's data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&mut conn)
    }

    // ============================================================
    // Provider operations
    // ============================================================

    /// Store a provider, or return the stored one with the same identity.
    pub fn save_provider(&self, input: CreateProviderInput) -> Result<LaunchServiceProvider> {
        input.validate()?;
        let name = input.name.trim().to_string();
        let country = input.country.trim().to_string();
        let headquarters = input.headquarters.map(|h| h.trim().to_string());

        let conn = self.conn.lock().expect("database lock poisoned");
        let existing = conn
            .query_row(
                &format!("{PROVIDER_SELECT} WHERE p.name = ? AND p.year_founded = ? AND p.country = ?"),
                (&name, input.year_founded, &country),
                |row| provider_from_row(row, 0),
            )
            .optional()?;
        if let Some(provider) = existing {
            return Ok(provider);
        }

        let id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO providers (id, name, year_founded, country, headquarters, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &name,
                input.year_founded,
                &country,
                &headquarters,
                Utc::now().to_rfc3339(),
            ),
        )?;

        Ok(LaunchServiceProvider {
            id,
            name,
            year_founded: input.year_founded,
            country,
            headquarters,
        })
    }

    pub fn get_provider(&self, id: Uuid) -> Result<Option<LaunchServiceProvider>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let provider = conn
            .query_row(
                &format!("{PROVIDER_SELECT} WHERE p.id = ?"),
                [id.to_string()],
                |row| provider_from_row(row, 0),
            )
            .optional()?;
        Ok(provider)
    }

    pub fn get_all_providers(&self) -> Result<Vec<LaunchServiceProvider>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!("{PROVIDER_SELECT} ORDER BY p.name"))?;
        let providers = stmt
            .query_map([], |row| provider_from_row(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(providers)
    }

    /// Delete a provider. Fails while rockets or launches still reference it.
    pub fn delete_provider(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn
            .execute("DELETE FROM providers WHERE id = ?", [id.to_string()])
            .context("Provider is still referenced by rockets or launches")?;
        Ok(rows > 0)
    }

    // ============================================================
    // Rocket operations
    // ============================================================

    /// Store a rocket, or return the stored one with the same identity.
    pub fn save_rocket(&self, input: CreateRocketInput) -> Result<Rocket> {
        input.validate()?;
        let name = input.name.trim().to_string();
        let country = input.country.trim().to_string();

        let conn = self.conn.lock().expect("database lock poisoned");
        let manufacturer = conn
            .query_row(
                &format!("{PROVIDER_SELECT} WHERE p.id = ?"),
                [input.manufacturer_id.to_string()],
                |row| provider_from_row(row, 0),
            )
            .optional()?
            .ok_or_else(|| anyhow::anyhow!("Manufacturer not found"))?;

        let existing = conn
            .query_row(
                &format!("{ROCKET_SELECT} WHERE r.name = ? AND r.country = ? AND r.manufacturer_id = ?"),
                (&name, &country, manufacturer.id.to_string()),
                |row| rocket_from_row(row, 0),
            )
            .optional()?;
        if let Some(rocket) = existing {
            return Ok(rocket);
        }

        let id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO rockets (id, name, country, manufacturer_id, mass_to_leo, mass_to_gto,
                                  mass_to_other, first_year_flight, latest_year_flight, wikilink, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &name,
                &country,
                manufacturer.id.to_string(),
                input.mass_to_leo,
                input.mass_to_gto,
                input.mass_to_other,
                input.first_year_flight,
                input.latest_year_flight,
                &input.wikilink,
                Utc::now().to_rfc3339(),
            ),
        )?;

        Ok(Rocket {
            id,
            name,
            country,
            manufacturer,
            mass_to_leo: input.mass_to_leo,
            mass_to_gto: input.mass_to_gto,
            mass_to_other: input.mass_to_other,
            first_year_flight: input.first_year_flight,
            latest_year_flight: input.latest_year_flight,
            wikilink: input.wikilink,
        })
    }

    pub fn get_rocket(&self, id: Uuid) -> Result<Option<Rocket>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rocket = conn
            .query_row(
                &format!("{ROCKET_SELECT} WHERE r.id = ?"),
                [id.to_string()],
                |row| rocket_from_row(row, 0),
            )
            .optional()?;
        Ok(rocket)
    }

    pub fn get_all_rockets(&self) -> Result<Vec<Rocket>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!("{ROCKET_SELECT} ORDER BY r.name"))?;
        let rockets = stmt
            .query_map([], |row| rocket_from_row(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rockets)
    }

    /// Delete a rocket. Fails while launches still reference it.
    pub fn delete_rocket(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn
            .execute("DELETE FROM rockets WHERE id = ?", [id.to_string()])
            .context("Rocket is still referenced by launches")?;
        Ok(rows > 0)
    }

    // ============================================================
    // Launch operations
    // ============================================================

    /// Record a launch and its payloads.
    ///
    /// Fails if a launch with the same date, rocket, provider and orbit is
    /// already stored.
    pub fn create_launch(&self, input: CreateLaunchInput) -> Result<Launch> {
        input.validate()?;

        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        if find_launch_id(
            &tx,
            input.launch_date,
            input.rocket_id,
            input.provider_id,
            &input.orbit,
        )?
        .is_some()
        {
            anyhow::bail!("Launch already recorded");
        }

        let rocket_found: i32 = tx.query_row(
            "SELECT COUNT(*) FROM rockets WHERE id = ?",
            [input.rocket_id.to_string()],
            |row| row.get(0),
        )?;
        if rocket_found == 0 {
            anyhow::bail!("Rocket not found");
        }
        let provider_found: i32 = tx.query_row(
            "SELECT COUNT(*) FROM providers WHERE id = ?",
            [input.provider_id.to_string()],
            |row| row.get(0),
        )?;
        if provider_found == 0 {
            anyhow::bail!("Provider not found");
        }

        let id = Uuid::new_v4();
        tx.execute(
            "INSERT INTO launches (id, launch_date, rocket_id, provider_id, orbit, outcome, price,
                                   launch_site, function, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                input.launch_date.format(DATE_FORMAT).to_string(),
                input.rocket_id.to_string(),
                input.provider_id.to_string(),
                &input.orbit,
                input.launch_outcome.as_str(),
                input.price.to_string(),
                &input.launch_site,
                &input.function,
                Utc::now().to_rfc3339(),
            ),
        )?;

        for payload in &input.payloads {
            tx.execute(
                "INSERT INTO payloads (id, launch_id, name, destination, mass_kg, payload_type, is_active)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                (
                    Uuid::new_v4().to_string(),
                    id.to_string(),
                    &payload.name,
                    &payload.destination,
                    payload.mass_kg,
                    &payload.payload_type,
                    if payload.is_active { 1 } else { 0 },
                ),
            )?;
        }

        let launch = load_launch(&tx, id)?
            .ok_or_else(|| anyhow::anyhow!("Launch vanished after insert"))?;
        tx.commit()?;

        Ok(launch)
    }

    pub fn get_launch(&self, id: Uuid) -> Result<Option<Launch>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        load_launch(&conn, id)
    }

    /// Look a launch up by its identity.
    pub fn find_launch(
        &self,
        launch_date: NaiveDate,
        rocket_id: Uuid,
        provider_id: Uuid,
        orbit: &str,
    ) -> Result<Option<Launch>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        match find_launch_id(&conn, launch_date, rocket_id, provider_id, orbit)? {
            Some(id) => load_launch(&conn, id),
            None => Ok(None),
        }
    }

    /// Every launch with its payloads, in the order they were recorded.
    pub fn get_all_launches(&self) -> Result<Vec<Launch>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!("{LAUNCH_SELECT} ORDER BY l.rowid"))?;
        let mut launches = stmt
            .query_map([], launch_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT launch_id, id, name, destination, mass_kg, payload_type, is_active
             FROM payloads ORDER BY rowid",
        )?;
        let mut payloads: HashMap<Uuid, Vec<Payload>> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((parse_uuid(row.get::<_, String>(0)?), payload_from_row(row, 1)?))
        })?;
        for row in rows {
            let (launch_id, payload) = row?;
            payloads.entry(launch_id).or_default().push(payload);
        }

        for launch in &mut launches {
            if let Some(carried) = payloads.remove(&launch.id) {
                launch.payloads = carried;
            }
        }

        Ok(launches)
    }

    pub fn update_launch(&self, id: Uuid, input: UpdateLaunchInput) -> Result<Option<Launch>> {
        input.validate()?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let mut updates = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(outcome) = input.launch_outcome {
            updates.push("outcome = ?");
            params.push(Box::new(outcome.as_str()));
        }
        if let Some(price) = input.price {
            updates.push("price = ?");
            params.push(Box::new(price.to_string()));
        }
        if let Some(site) = input.launch_site {
            updates.push("launch_site = ?");
            params.push(Box::new(site));
        }
        if let Some(function) = input.function {
            updates.push("function = ?");
            params.push(Box::new(function));
        }

        if !updates.is_empty() {
            params.push(Box::new(id.to_string()));
            let sql = format!("UPDATE launches SET {} WHERE id = ?", updates.join(", "));
            let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
            conn.execute(&sql, params_ref.as_slice())?;
        }

        load_launch(&conn, id)
    }

    /// Delete a launch together with its payloads.
    pub fn delete_launch(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM launches WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // User operations
    // ============================================================

    pub fn create_user(&self, input: CreateUserInput) -> Result<User> {
        input.validate()?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let taken: i32 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE email = ?",
            [&input.email],
            |row| row.get(0),
        )?;
        if taken > 0 {
            anyhow::bail!("Email already registered");
        }

        let id = Uuid::new_v4();
        let password_hash = hash_password(&input.password);
        conn.execute(
            "INSERT INTO users (id, first_name, last_name, email, password_hash, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &input.first_name,
                &input.last_name,
                &input.email,
                &password_hash,
                Utc::now().to_rfc3339(),
            ),
        )?;

        Ok(User {
            id,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            password_hash,
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let user = conn
            .query_row(
                "SELECT id, first_name, last_name, email, password_hash FROM users WHERE email = ?",
                [email],
                |row| {
                    Ok(User {
                        id: parse_uuid(row.get::<_, String>(0)?),
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                        email: row.get(3)?,
                        password_hash: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    pub fn delete_user(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM users WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }
}

impl LaunchRepository for Database {
    fn load_all_launches(&self) -> Result<Vec<Launch>> {
        self.get_all_launches()
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// `$ROCKET_MINER_DB` if set, otherwise `rocket-miner.db` in the platform data directory.
pub fn default_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    let dirs = directories::ProjectDirs::from("", "", "rocket-miner")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("rocket-miner.db"))
}

fn find_launch_id(
    conn: &Connection,
    launch_date: NaiveDate,
    rocket_id: Uuid,
    provider_id: Uuid,
    orbit: &str,
) -> Result<Option<Uuid>> {
    let id = conn
        .query_row(
            "SELECT id FROM launches
             WHERE launch_date = ? AND rocket_id = ? AND provider_id = ? AND orbit = ?",
            (
                launch_date.format(DATE_FORMAT).to_string(),
                rocket_id.to_string(),
                provider_id.to_string(),
                orbit,
            ),
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(id.map(parse_uuid))
}

fn load_launch(conn: &Connection, id: Uuid) -> Result<Option<Launch>> {
    let launch = conn
        .query_row(
            &format!("{LAUNCH_SELECT} WHERE l.id = ?"),
            [id.to_string()],
            launch_from_row,
        )
        .optional()?;

    let Some(mut launch) = launch else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT id, name, destination, mass_kg, payload_type, is_active
         FROM payloads WHERE launch_id = ? ORDER BY rowid",
    )?;
    launch.payloads = stmt
        .query_map([id.to_string()], |row| payload_from_row(row, 0))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(launch))
}

/// Five provider columns starting at `at`.
fn provider_from_row(row: &Row, at: usize) -> rusqlite::Result<LaunchServiceProvider> {
    Ok(LaunchServiceProvider {
        id: parse_uuid(row.get::<_, String>(at)?),
        name: row.get(at + 1)?,
        year_founded: row.get(at + 2)?,
        country: row.get(at + 3)?,
        headquarters: row.get(at + 4)?,
    })
}

/// Nine rocket columns followed by five manufacturer columns, starting at `at`.
fn rocket_from_row(row: &Row, at: usize) -> rusqlite::Result<Rocket> {
    Ok(Rocket {
        id: parse_uuid(row.get::<_, String>(at)?),
        name: row.get(at + 1)?,
        country: row.get(at + 2)?,
        mass_to_leo: row.get(at + 3)?,
        mass_to_gto: row.get(at + 4)?,
        mass_to_other: row.get(at + 5)?,
        first_year_flight: row.get(at + 6)?,
        latest_year_flight: row.get(at + 7)?,
        wikilink: row.get(at + 8)?,
        manufacturer: provider_from_row(row, at + 9)?,
    })
}

fn launch_from_row(row: &Row) -> rusqlite::Result<Launch> {
    let date: String = row.get(1)?;
    let outcome: String = row.get(3)?;
    let price: String = row.get(4)?;

    Ok(Launch {
        id: parse_uuid(row.get::<_, String>(0)?),
        launch_date: NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .map_err(|e| conversion_error(1, e))?,
        orbit: row.get(2)?,
        launch_outcome: LaunchOutcome::from_str(&outcome).ok_or_else(|| {
            conversion_error(3, format!("unknown launch outcome '{outcome}'"))
        })?,
        price: Decimal::from_str(&price).map_err(|e| conversion_error(4, e))?,
        launch_site: row.get(5)?,
        function: row.get(6)?,
        launch_vehicle: rocket_from_row(row, 7)?,
        launch_service_provider: provider_from_row(row, 21)?,
        payloads: Vec::new(),
    })
}

/// Six payload columns starting at `at`.
fn payload_from_row(row: &Row, at: usize) -> rusqlite::Result<Payload> {
    Ok(Payload {
        id: parse_uuid(row.get::<_, String>(at)?),
        name: row.get(at + 1)?,
        destination: row.get(at + 2)?,
        mass_kg: row.get(at + 3)?,
        payload_type: row.get(at + 4)?,
        is_active: row.get::<_, i32>(at + 5)? != 0,
    })
}

fn conversion_error(
    column: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, err.into())
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}
