//! Day-scoped drill cache: at most one generation call per (user, word, day).
//! The store is consulted first; only the missing words go to the oracle, in
//! one batch. A store outage degrades to oracle-only generation instead of
//! failing the request.

use chrono::{NaiveDate, Utc};
use std::collections::HashMap;

use crate::services::drill_oracle::{DrillOracle, DrillProblem, OracleError};
use crate::store::operations::drill_cache::{DrillCacheEntry, DrillCacheStats};
use crate::store::{Store, StoreError};

/// Drills for `words` on `today`, keyed by lowercase word. Cached entries are
/// served as-is; the rest come from a single batch oracle call and are written
/// back. An oracle failure writes nothing, leaving the words uncached and
/// eligible for retry on the next access.
pub async fn get_daily_vocab_drills<O: DrillOracle>(
    store: &Store,
    oracle: &O,
    user_id: &str,
    words: &[String],
    today: NaiveDate,
) -> Result<HashMap<String, DrillProblem>, OracleError> {
    let mut drills: HashMap<String, DrillProblem> = HashMap::with_capacity(words.len());
    let mut to_generate: Vec<String> = Vec::new();
    let mut cache_usable = true;

    for word in words {
        let normalized = word.to_lowercase();
        if drills.contains_key(&normalized) || to_generate.contains(&normalized) {
            continue;
        }
        match store.get_drill_cache_entry(user_id, today, &normalized) {
            Ok(Some(entry)) => {
                drills.insert(normalized, entry.drill);
            }
            Ok(None) => to_generate.push(normalized),
            // A word that cannot form a cache key is dropped from the batch;
            // the cache stays live for the remaining words.
            Err(StoreError::Validation(reason)) => {
                tracing::warn!(user_id, word = %normalized, reason, "Dropping word with invalid cache key");
            }
            Err(error) => {
                // Store unreachable: generate everything without caching.
                tracing::warn!(user_id, %error, "Drill cache unavailable, generating uncached");
                cache_usable = false;
                break;
            }
        }
    }

    if !cache_usable {
        let normalized: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
        return oracle.generate_batch(&normalized).await;
    }

    if to_generate.is_empty() {
        tracing::debug!(
            user_id,
            cached = drills.len(),
            "All requested drills served from cache"
        );
        return Ok(drills);
    }

    tracing::info!(user_id, count = to_generate.len(), "Generating missing drills");
    let generated = oracle.generate_batch(&to_generate).await?;

    for (word, drill) in generated {
        let normalized = word.to_lowercase();
        if let Err(reason) = drill.validate() {
            // Invalid shape is returned to the caller but never persisted.
            tracing::warn!(user_id, word = %normalized, reason, "Skipping cache write for invalid drill");
        } else {
            let entry = DrillCacheEntry {
                user_id: user_id.to_string(),
                word: normalized.clone(),
                generated_date: today,
                drill: drill.clone(),
                created_at: Utc::now(),
            };
            if let Err(error) = store.set_drill_cache_entry(&entry) {
                tracing::warn!(user_id, word = %normalized, %error, "Failed to cache drill");
            }
        }
        drills.insert(normalized, drill);
    }

    Ok(drills)
}

/// Point lookup for today only; stale-day entries never surface.
pub fn get_cached_drill(
    store: &Store,
    user_id: &str,
    word: &str,
    today: NaiveDate,
) -> Result<Option<DrillProblem>, StoreError> {
    Ok(store
        .get_drill_cache_entry(user_id, today, &word.to_lowercase())?
        .map(|entry| entry.drill))
}

/// Manual reset hook: drops every cached drill for the user.
pub fn clear_drill_cache(store: &Store, user_id: &str) -> Result<u64, StoreError> {
    let removed = store.clear_drill_cache(user_id)?;
    tracing::info!(user_id, removed, "Cleared drill cache");
    Ok(removed)
}

pub fn get_drill_cache_stats(
    store: &Store,
    user_id: &str,
    today: NaiveDate,
) -> Result<DrillCacheStats, StoreError> {
    store.get_drill_cache_stats(user_id, today)
}

/// Maintenance sweep across all users; bounded per run.
pub fn purge_drills_before(store: &Store, cutoff: NaiveDate) -> Result<u32, StoreError> {
    store.purge_drills_before(cutoff)
}
