//! Ranking and aggregation queries over the launch history.
//!
//! Every query performs exactly one [`LaunchRepository::load_all_launches`] call
//! and then works on that snapshot in memory. Arguments are checked before the
//! repository is touched, and repository failures are passed through untouched
//! as [`MinerError::Repository`].
//!
//! # Ordering
//!
//! Ranked results are strictly best-first. Where two candidates share a metric:
//!
//! - grouped rankings (rockets, providers, manufacturers) fall back to name
//!   ascending, then to the order the candidate first appeared in the snapshot;
//! - launch rankings (by date, by price) keep snapshot order.

mod tally;

use std::cmp::Ordering;

use chrono::Datelike;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::models::{Launch, LaunchServiceProvider, Rocket};
use tally::{top_k, Tally};

const NEGATIVE_K: &str = "k cannot be negative";

/// Source of the launch snapshot the queries run over.
pub trait LaunchRepository {
    /// Every stored launch, in the store's own order. An empty store yields an
    /// empty vector rather than an error.
    fn load_all_launches(&self) -> anyhow::Result<Vec<Launch>>;
}

/// An in-memory snapshot is a repository of itself.
impl LaunchRepository for Vec<Launch> {
    fn load_all_launches(&self) -> anyhow::Result<Vec<Launch>> {
        Ok(self.clone())
    }
}

impl<R: LaunchRepository + ?Sized> LaunchRepository for &R {
    fn load_all_launches(&self) -> anyhow::Result<Vec<Launch>> {
        (**self).load_all_launches()
    }
}

/// Errors returned by [`RocketMiner`] queries.
#[derive(Debug, Error)]
pub enum MinerError {
    #[error("{0}")]
    InvalidArgument(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Repository(#[from] anyhow::Error),
}

/// Successful and total launch counts for one provider.
#[derive(Debug, Default, Clone, Copy)]
struct Record {
    successful: u64,
    total: u64,
}

impl Record {
    /// Compare success ratios exactly: a/b vs c/d as a*d vs c*b.
    fn cmp_ratio(&self, other: &Self) -> Ordering {
        (self.successful * other.total).cmp(&(other.successful * self.total))
    }
}

/// Launch count and payload mass attributed to one country.
#[derive(Debug, Default, Clone, Copy)]
struct Presence {
    launches: usize,
    mass_kg: u64,
}

/// Runs the ranking queries against a [`LaunchRepository`].
pub struct RocketMiner<R> {
    repo: R,
}

impl<R: LaunchRepository> RocketMiner<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    fn snapshot(&self) -> Result<Vec<Launch>, MinerError> {
        let launches = self.repo.load_all_launches()?;
        tracing::debug!("loaded {} launches", launches.len());
        Ok(launches)
    }

    /// The `k` rockets with the most launches, most launched first.
    pub fn most_launched_rockets(&self, k: i64) -> Result<Vec<Rocket>, MinerError> {
        let k = check_k(k)?;
        tracing::info!("find {} most launched rockets", k);
        let launches = self.snapshot()?;

        let mut counts: Tally<Rocket, usize> = Tally::new();
        for launch in &launches {
            *counts.entry(&launch.launch_vehicle).or_default() += 1;
        }

        Ok(top_k(counts, k, usize::cmp, |r| r.name.as_str())
            .into_iter()
            .cloned()
            .collect())
    }

    /// The `k` service providers with the highest share of successful launches.
    pub fn most_reliable_launch_service_providers(
        &self,
        k: i64,
    ) -> Result<Vec<LaunchServiceProvider>, MinerError> {
        let k = check_k(k)?;
        tracing::info!("find {} most reliable launch service providers", k);
        let launches = self.snapshot()?;

        let mut records: Tally<LaunchServiceProvider, Record> = Tally::new();
        for launch in &launches {
            let record = records.entry(&launch.launch_service_provider).or_default();
            record.total += 1;
            if launch.is_successful() {
                record.successful += 1;
            }
        }

        Ok(
            top_k(records, k, Record::cmp_ratio, |p| p.name.as_str())
                .into_iter()
                .cloned()
                .collect(),
        )
    }

    /// The `k` most recent launches, newest first.
    pub fn most_recent_launches(&self, k: i64) -> Result<Vec<Launch>, MinerError> {
        let k = check_k(k)?;
        tracing::info!("find {} most recent launches", k);
        let mut launches = self.snapshot()?;

        launches.sort_by(|a, b| b.launch_date.cmp(&a.launch_date));
        launches.truncate(k);
        Ok(launches)
    }

    /// Share of the launches dated in `year` that succeeded, rounded half-up
    /// to two decimal places. Zero when nothing launched that year.
    pub fn successful_launch_rate_in_year(&self, year: i32) -> Result<Decimal, MinerError> {
        tracing::info!("find successful launch rate in {}", year);
        let launches = self.snapshot()?;

        let (successful, total) = launches
            .iter()
            .filter(|l| l.launch_date.year() == year)
            .fold((0u64, 0u64), |(s, t), l| {
                (s + u64::from(l.is_successful()), t + 1)
            });

        if total == 0 {
            return Ok(Decimal::new(0, 2));
        }

        let mut rate = (Decimal::from(successful) / Decimal::from(total))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rate.rescale(2);
        Ok(rate)
    }

    /// The country whose providers launched into `orbit` most often.
    ///
    /// Countries tied on launch count are separated by the total payload mass
    /// they carried into that orbit; a tie on both goes to the alphabetically
    /// first country.
    pub fn dominant_country(&self, orbit: &str) -> Result<String, MinerError> {
        tracing::info!("find dominant country in orbit {}", orbit);
        let launches = self.snapshot()?;

        let mut presence: Tally<str, Presence> = Tally::new();
        for launch in launches.iter().filter(|l| l.orbit == orbit) {
            let entry = presence
                .entry(launch.launch_service_provider.country.as_str())
                .or_default();
            entry.launches += 1;
            entry.mass_kg += launch.payload_mass_kg();
        }

        presence
            .into_iter()
            .max_by(|(ca, a), (cb, b)| {
                a.launches
                    .cmp(&b.launches)
                    .then(a.mass_kg.cmp(&b.mass_kg))
                    .then_with(|| cb.cmp(ca))
            })
            .map(|(country, _)| country.to_string())
            .ok_or_else(|| MinerError::NotFound(format!("no launches into orbit {orbit}")))
    }

    /// The `k` most expensive launches, dearest first.
    pub fn most_expensive_launches(&self, k: i64) -> Result<Vec<Launch>, MinerError> {
        let k = check_k(k)?;
        tracing::info!("find {} most expensive launches", k);
        let mut launches = self.snapshot()?;

        launches.sort_by(|a, b| b.price.cmp(&a.price));
        launches.truncate(k);
        Ok(launches)
    }

    /// The `k` manufacturers whose rockets earned the most in `year`.
    ///
    /// A launch's price is credited to the manufacturer of its rocket, not to
    /// the provider recorded on the launch.
    pub fn highest_revenue_launch_service_providers(
        &self,
        k: i64,
        year: i32,
    ) -> Result<Vec<LaunchServiceProvider>, MinerError> {
        let k = check_k(k)?;
        tracing::info!(
            "find {} launch service providers with highest revenue in {}",
            k,
            year
        );
        let launches = self.snapshot()?;

        let mut revenue: Tally<LaunchServiceProvider, Decimal> = Tally::new();
        for launch in launches
            .iter()
            .filter(|l| l.launch_date.year() == year)
        {
            *revenue.entry(&launch.launch_vehicle.manufacturer).or_default() += launch.price;
        }

        Ok(top_k(revenue, k, Decimal::cmp, |p| p.name.as_str())
            .into_iter()
            .cloned()
            .collect())
    }

    /// The rocket of the launch from `country` carrying the most active payloads.
    ///
    /// `country` is matched against the rocket's country. The first launch with
    /// the highest count wins; later launches only take over with a strictly
    /// higher count. `None` when no rocket from `country` has launched.
    /// When none of the matching launches carries an active payload, the first
    /// matching launch's rocket is still returned.
    pub fn rocket_with_most_active_payloads(
        &self,
        country: &str,
    ) -> Result<Option<Rocket>, MinerError> {
        tracing::info!("find rocket with most active payloads from {}", country);
        let launches = self.snapshot()?;

        let leader = launches
            .iter()
            .filter(|l| l.launch_vehicle.country == country)
            .fold(None, |leader: Option<(&Launch, usize)>, launch| {
                let active = launch.active_payload_count();
                match leader {
                    Some((_, best)) if active <= best => leader,
                    _ => Some((launch, active)),
                }
            });

        Ok(leader.map(|(launch, _)| launch.launch_vehicle.clone()))
    }
}

fn check_k(k: i64) -> Result<usize, MinerError> {
    usize::try_from(k).map_err(|_| MinerError::InvalidArgument(NEGATIVE_K))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn k_must_not_be_negative() {
        assert_eq!(check_k(0).unwrap(), 0);
        assert_eq!(check_k(7).unwrap(), 7);
        let err = check_k(-1).unwrap_err();
        assert!(matches!(err, MinerError::InvalidArgument(_)));
        assert_eq!(err.to_string(), "k cannot be negative");
    }

    #[test]
    fn ratios_compare_without_rounding() {
        let two_thirds = Record { successful: 2, total: 3 };
        let four_sixths = Record { successful: 4, total: 6 };
        let one_half = Record { successful: 1, total: 2 };

        assert_eq!(two_thirds.cmp_ratio(&four_sixths), Ordering::Equal);
        assert_eq!(two_thirds.cmp_ratio(&one_half), Ordering::Greater);
        assert_eq!(one_half.cmp_ratio(&two_thirds), Ordering::Less);
    }
}
