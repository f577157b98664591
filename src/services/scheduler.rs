//! SM-2 variant: pure interval/ease arithmetic plus the store-backed review
//! recording and word-selection helpers built on it.

use chrono::{Days, NaiveDate, Utc};
use rand::seq::SliceRandom;
use std::collections::HashSet;

use crate::constants::{
    EASE_BONUS, EASE_PENALTY, INITIAL_EASE_FACTOR, MASTERY_CORRECT_COUNT, MASTERY_INTERVAL_DAYS,
    MAX_EASE_FACTOR, MIN_EASE_FACTOR, REFRESH_POOL_SIZE,
};
use crate::store::operations::word_progress::{WordProgress, WordStatus};
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextReview {
    pub interval: u32,
    pub ease_factor: f64,
}

/// Next interval and ease factor after one review outcome. Pure; never fails
/// for valid numeric input.
///
/// With a custom ladder, a correct answer advances to the next rung, stays at
/// the last rung, or resets to the first rung when the current interval is not
/// on the ladder at all (intentional: a plan switch restarts the ladder).
/// Without one, intervals step 1 -> 2 -> 4 -> ceil(interval * ease).
pub fn compute_next_review(
    current_interval: u32,
    ease_factor: f64,
    is_correct: bool,
    custom_intervals: Option<&[u32]>,
) -> NextReview {
    // An empty ladder carries no information; treat it as absent.
    let ladder = custom_intervals.filter(|intervals| !intervals.is_empty());

    if is_correct {
        let interval = match ladder {
            Some(intervals) => match intervals.iter().position(|&i| i == current_interval) {
                Some(index) if index + 1 < intervals.len() => intervals[index + 1],
                Some(index) => intervals[index],
                None => intervals[0],
            },
            None => match current_interval {
                1 => 2,
                2 => 4,
                _ => (current_interval as f64 * ease_factor).ceil() as u32,
            },
        };
        NextReview {
            interval,
            ease_factor: (ease_factor + EASE_BONUS).min(MAX_EASE_FACTOR),
        }
    } else {
        NextReview {
            interval: ladder.map(|intervals| intervals[0]).unwrap_or(1),
            ease_factor: (ease_factor - EASE_PENALTY).max(MIN_EASE_FACTOR),
        }
    }
}

/// Status is always recomputed from counters, never stored as a ratchet.
/// Counters only grow, so a word that once met the mastery bar keeps it; a
/// failure demotes only through the interval reset.
pub fn derive_status(review_count: u32, correct_count: u32, interval: u32) -> WordStatus {
    if correct_count >= MASTERY_CORRECT_COUNT && interval >= MASTERY_INTERVAL_DAYS {
        WordStatus::Mastered
    } else if review_count >= 2 {
        WordStatus::Reviewing
    } else {
        WordStatus::Learning
    }
}

/// Record one review outcome. Creates the progress row lazily on the first
/// attempt; the whole operation ends in a single transactional record write.
pub fn record_review(
    store: &Store,
    user_id: &str,
    word: &str,
    is_correct: bool,
    today: NaiveDate,
) -> Result<WordProgress, StoreError> {
    let now = Utc::now();
    let word = word.to_lowercase();

    let progress = match store.get_word_progress(user_id, &word)? {
        Some(existing) => {
            let next = compute_next_review(existing.interval, existing.ease_factor, is_correct, None);
            let review_count = existing.review_count + 1;
            let correct_count = existing.correct_count + u32::from(is_correct);
            WordProgress {
                ease_factor: next.ease_factor,
                interval: next.interval,
                next_review_date: add_days(today, next.interval),
                review_count,
                correct_count,
                last_reviewed_at: Some(now),
                status: derive_status(review_count, correct_count, next.interval),
                updated_at: now,
                ..existing
            }
        }
        None => {
            let next = compute_next_review(1, INITIAL_EASE_FACTOR, is_correct, None);
            let review_count = 1;
            let correct_count = u32::from(is_correct);
            WordProgress {
                user_id: user_id.to_string(),
                word: word.clone(),
                ease_factor: next.ease_factor,
                interval: next.interval,
                next_review_date: add_days(today, next.interval),
                review_count,
                correct_count,
                last_reviewed_at: Some(now),
                status: derive_status(review_count, correct_count, next.interval),
                created_at: now,
                updated_at: now,
            }
        }
    };

    store.set_word_progress(&progress)?;
    Ok(progress)
}

/// Words due on or before `today`, soonest first.
pub fn get_due_words(
    store: &Store,
    user_id: &str,
    limit: usize,
    today: NaiveDate,
) -> Result<Vec<String>, StoreError> {
    Ok(store
        .get_due_word_progress(user_id, limit, today)?
        .into_iter()
        .map(|progress| progress.word)
        .collect())
}

/// Up to `limit` words from `all_words` with no progress record yet, in
/// uniformly random order.
pub fn get_new_words(
    store: &Store,
    user_id: &str,
    all_words: &[String],
    limit: usize,
) -> Result<Vec<String>, StoreError> {
    let known: HashSet<String> = store
        .list_word_progress(user_id)?
        .into_iter()
        .map(|progress| progress.word)
        .collect();

    let mut candidates: Vec<String> = all_words
        .iter()
        .filter(|word| !known.contains(&word.to_lowercase()))
        .map(|word| word.to_lowercase())
        .collect();

    candidates.shuffle(&mut rand::thread_rng());
    candidates.truncate(limit);
    Ok(candidates)
}

/// Previously learned words (reviewing or mastered) resurfaced at random.
pub fn get_refresh_words(
    store: &Store,
    user_id: &str,
    limit: usize,
) -> Result<Vec<String>, StoreError> {
    let mut pool: Vec<String> = store
        .list_word_progress(user_id)?
        .into_iter()
        .filter(|progress| {
            matches!(
                progress.status,
                WordStatus::Reviewing | WordStatus::Mastered
            )
        })
        .take(REFRESH_POOL_SIZE)
        .map(|progress| progress.word)
        .collect();

    pool.shuffle(&mut rand::thread_rng());
    pool.truncate(limit);
    Ok(pool)
}

fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(date)
}
