//! Composition of the per-day word list: the 40/30/30 blend, the plan-driven
//! split, and the persisted daily mission that makes repeated visits within
//! one calendar day idempotent.

use chrono::{NaiveDate, Utc};
use rand::seq::SliceRandom;
use std::collections::HashSet;

use crate::constants::{DEFAULT_DAILY_GOAL, MIX_DUE_RATIO, MIX_REFRESH_RATIO};
use crate::services::scheduler::{get_due_words, get_new_words, get_refresh_words};
use crate::store::operations::daily_missions::DailyMission;
use crate::store::operations::study_plans::StudyPlan;
use crate::store::operations::word_progress::WordStatus;
use crate::store::{Store, StoreError};

/// Blend of due, refresh, and new words sized to `target_count`: ceil(40%)
/// due, ceil(30%) refresh, the remainder new. Duplicates across buckets are
/// dropped, the union is shuffled, and the result never exceeds the target.
pub fn get_daily_word_mix(
    store: &Store,
    user_id: &str,
    all_words: &[String],
    target_count: usize,
    today: NaiveDate,
) -> Result<Vec<String>, StoreError> {
    let due_count = (target_count as f64 * MIX_DUE_RATIO).ceil() as usize;
    let due_words = get_due_words(store, user_id, due_count, today)?;

    let refresh_count = (target_count as f64 * MIX_REFRESH_RATIO).ceil() as usize;
    let refresh_words = get_refresh_words(store, user_id, refresh_count)?;

    let new_count = target_count
        .saturating_sub(due_words.len())
        .saturating_sub(refresh_words.len())
        .max(1);
    let new_words = get_new_words(store, user_id, all_words, new_count)?;

    Ok(combine_and_shuffle(
        [due_words, refresh_words, new_words],
        Some(target_count),
    ))
}

/// Plan-driven variant: the plan's review/new quotas replace the ratio split
/// and there is no refresh bucket.
pub fn get_daily_mix_for_plan(
    store: &Store,
    user_id: &str,
    all_words: &[String],
    plan: &StudyPlan,
    today: NaiveDate,
) -> Result<Vec<String>, StoreError> {
    let due_words = get_due_words(store, user_id, plan.review_words_per_day as usize, today)?;
    let new_words = get_new_words(store, user_id, all_words, plan.new_words_per_day as usize)?;

    Ok(combine_and_shuffle(
        [due_words, Vec::new(), new_words],
        None,
    ))
}

/// The mission for `today`, generated at most once per calendar day. A stored
/// mission with a non-empty word list is returned verbatim; anything else is
/// (re)composed and persisted with progress reset to zero. Two devices racing
/// on the same day resolve by last write wins.
pub fn daily_mission(
    store: &Store,
    user_id: &str,
    all_words: &[String],
    plan: Option<&StudyPlan>,
    today: NaiveDate,
) -> Result<DailyMission, StoreError> {
    if let Some(existing) = store.get_daily_mission(user_id, today)? {
        if !existing.words.is_empty() {
            return Ok(existing);
        }
    }

    let words = match plan {
        Some(plan) => get_daily_mix_for_plan(store, user_id, all_words, plan, today)?,
        None => get_daily_word_mix(
            store,
            user_id,
            all_words,
            DEFAULT_DAILY_GOAL as usize,
            today,
        )?,
    };

    tracing::info!(user_id, %today, count = words.len(), "Generated daily mission");

    let mission = DailyMission {
        user_id: user_id.to_string(),
        date: today,
        words,
        progress: 0,
        created_at: Utc::now(),
    };
    store.set_daily_mission(&mission)?;
    Ok(mission)
}

/// Recount how many of today's mission words are mastered and persist the
/// result. Mastering a word mid-day never removes it from the issued list.
pub fn refresh_mission_progress(
    store: &Store,
    user_id: &str,
    today: NaiveDate,
) -> Result<Option<DailyMission>, StoreError> {
    let Some(mut mission) = store.get_daily_mission(user_id, today)? else {
        return Ok(None);
    };

    let mastered = store
        .get_word_progress_batch(user_id, &mission.words)?
        .into_iter()
        .filter(|progress| progress.status == WordStatus::Mastered)
        .count() as u32;

    mission.progress = mastered;
    store.set_daily_mission(&mission)?;
    Ok(Some(mission))
}

fn combine_and_shuffle(buckets: [Vec<String>; 3], cap: Option<usize>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut combined: Vec<String> = buckets
        .into_iter()
        .flatten()
        .filter(|word| seen.insert(word.clone()))
        .collect();

    combined.shuffle(&mut rand::thread_rng());
    if let Some(cap) = cap {
        combined.truncate(cap);
    }
    combined
}
