//! Staleness rules for cached profiles.
//!
//! Staleness is always evaluated against a caller-supplied `now` and never
//! stored. A missing timestamp counts as stale; an age equal to the window is
//! still fresh.

use chrono::{DateTime, TimeDelta, Utc};

use crate::config::CacheConfig;
use crate::domain::InsightKind;
use crate::models::ProfileRecord;
use crate::models::profile::is_present;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    pub profile_ttl: TimeDelta,
    pub insights_ttl: TimeDelta,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            profile_ttl: TimeDelta::hours(1),
            insights_ttl: TimeDelta::hours(24),
        }
    }
}

/// Windows that do not fit a `TimeDelta` keep their defaults; `Config::validate`
/// rejects them before this point in normal startup.
impl From<&CacheConfig> for FreshnessPolicy {
    fn from(config: &CacheConfig) -> Self {
        let defaults = Self::default();
        Self {
            profile_ttl: TimeDelta::try_minutes(config.profile_ttl_minutes)
                .unwrap_or(defaults.profile_ttl),
            insights_ttl: TimeDelta::try_hours(config.insights_ttl_hours)
                .unwrap_or(defaults.insights_ttl),
        }
    }
}

fn is_expired(stamp: Option<DateTime<Utc>>, ttl: TimeDelta, now: DateTime<Utc>) -> bool {
    stamp.is_none_or(|at| now - at > ttl)
}

impl FreshnessPolicy {
    #[must_use]
    pub fn is_profile_stale(&self, record: &ProfileRecord, now: DateTime<Utc>) -> bool {
        is_expired(record.last_fetched_at, self.profile_ttl, now)
    }

    /// Whether the shared insights clock has expired.
    #[must_use]
    pub fn is_insights_clock_stale(&self, record: &ProfileRecord, now: DateTime<Utc>) -> bool {
        is_expired(record.insights_generated_at, self.insights_ttl, now)
    }

    /// A generator must run when its field is empty or the shared clock has
    /// expired.
    #[must_use]
    pub fn needs_generation(
        &self,
        record: &ProfileRecord,
        kind: InsightKind,
        now: DateTime<Utc>,
    ) -> bool {
        !is_present(record.insight(kind)) || self.is_insights_clock_stale(record, now)
    }

    /// Generators that must run for this record, in pipeline order.
    #[must_use]
    pub fn stale_kinds(&self, record: &ProfileRecord, now: DateTime<Utc>) -> Vec<InsightKind> {
        InsightKind::ALL
            .into_iter()
            .filter(|kind| self.needs_generation(record, *kind, now))
            .collect()
    }
}
