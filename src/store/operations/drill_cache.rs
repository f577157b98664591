use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_PURGE_PER_RUN;
use crate::services::drill_oracle::DrillProblem;
use crate::store::keys;
use crate::store::{Store, StoreError};

/// One cached drill per (user, word, generated day).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillCacheEntry {
    pub user_id: String,
    pub word: String,
    pub generated_date: NaiveDate,
    pub drill: DrillProblem,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DrillCacheStats {
    pub total_cached: u64,
    pub cached_today: u64,
    pub oldest_date: Option<NaiveDate>,
}

impl Store {
    pub fn get_drill_cache_entry(
        &self,
        user_id: &str,
        date: NaiveDate,
        word: &str,
    ) -> Result<Option<DrillCacheEntry>, StoreError> {
        let key = keys::drill_cache_key(user_id, date, word)?;
        match self.drill_cache.get(key.as_bytes())? {
            Some(raw) => match Self::deserialize::<DrillCacheEntry>(&raw) {
                Ok(entry) => Ok(Some(entry)),
                // Malformed rows read as a cache miss so the drill gets
                // regenerated instead of surfacing corrupt content.
                Err(error) => {
                    tracing::warn!(user_id, word, %error, "Discarding malformed cached drill");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    pub fn set_drill_cache_entry(&self, entry: &DrillCacheEntry) -> Result<(), StoreError> {
        let key = keys::drill_cache_key(&entry.user_id, entry.generated_date, &entry.word)?;
        self.drill_cache
            .insert(key.as_bytes(), Self::serialize(entry)?)?;
        Ok(())
    }

    /// All of one user's entries for a single day, skipping malformed rows.
    pub fn get_drill_cache_day(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<DrillCacheEntry>, StoreError> {
        let prefix = keys::drill_cache_day_prefix(user_id, date)?;
        let mut entries = Vec::new();
        for item in self.drill_cache.scan_prefix(prefix.as_bytes()) {
            let (_, v) = item?;
            match Self::deserialize::<DrillCacheEntry>(&v) {
                Ok(entry) => entries.push(entry),
                Err(error) => {
                    tracing::warn!(user_id, %error, "Skipping malformed cached drill");
                }
            }
        }
        Ok(entries)
    }

    pub fn clear_drill_cache(&self, user_id: &str) -> Result<u64, StoreError> {
        let prefix = keys::drill_cache_prefix(user_id)?;
        let mut removed = 0u64;
        for item in self.drill_cache.scan_prefix(prefix.as_bytes()) {
            let (k, _) = item?;
            self.drill_cache.remove(&k)?;
            removed += 1;
        }
        Ok(removed)
    }

    /// Aggregate read only; counts come from key scans so malformed values do
    /// not affect the result.
    pub fn get_drill_cache_stats(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<DrillCacheStats, StoreError> {
        let prefix = keys::drill_cache_prefix(user_id)?;
        let mut stats = DrillCacheStats::default();

        for item in self.drill_cache.scan_prefix(prefix.as_bytes()) {
            let (k, _) = item?;
            let Some((_, date, _)) = keys::parse_drill_cache_key(&k) else {
                continue;
            };
            stats.total_cached += 1;
            if date == today {
                stats.cached_today += 1;
            }
            // Keys scan oldest-day-first, so the first parsed date wins.
            if stats.oldest_date.is_none() {
                stats.oldest_date = Some(date);
            }
        }

        Ok(stats)
    }

    /// Maintenance sweep across all users: delete entries generated before
    /// `cutoff`. Deletes while scanning, bounded per run.
    pub fn purge_drills_before(&self, cutoff: NaiveDate) -> Result<u32, StoreError> {
        let mut removed = 0u32;
        for item in self.drill_cache.iter() {
            if removed >= MAX_PURGE_PER_RUN {
                tracing::info!(
                    removed,
                    "Drill purge reached single-run limit, remaining entries deferred"
                );
                break;
            }
            let (k, _) = item?;
            let Some((_, date, _)) = keys::parse_drill_cache_key(&k) else {
                continue;
            };
            if date < cutoff {
                self.drill_cache.remove(&k)?;
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::info!(removed, "Purged stale drill cache entries");
        }
        Ok(removed)
    }
}
