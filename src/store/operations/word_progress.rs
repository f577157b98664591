use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sled::Transactional;
use std::collections::{HashMap, HashSet};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordProgress {
    pub user_id: String,
    /// Stored lowercase; uniqueness per user is case-insensitive.
    pub word: String,
    pub ease_factor: f64,
    pub interval: u32,
    pub next_review_date: NaiveDate,
    pub review_count: u32,
    pub correct_count: u32,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub status: WordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    Learning,
    Reviewing,
    Mastered,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyStats {
    pub total: u64,
    pub learning: u64,
    pub reviewing: u64,
    pub mastered: u64,
    pub total_reviews: u64,
    /// Rounded percentage of correct answers across all reviews.
    pub accuracy: u32,
}

impl WordProgress {
    /// Counter inversion can only come from corrupted rows; clamp instead of
    /// propagating the bad value forward.
    fn repaired(mut self) -> Self {
        if self.correct_count > self.review_count {
            tracing::warn!(
                user_id = %self.user_id,
                word = %self.word,
                correct_count = self.correct_count,
                review_count = self.review_count,
                "Repairing word progress with correct_count > review_count"
            );
            self.correct_count = self.review_count;
        }
        self
    }
}

fn due_index_key_for(progress: &WordProgress) -> Result<String, StoreError> {
    keys::word_due_index_key(&progress.user_id, progress.next_review_date, &progress.word)
}

impl Store {
    pub fn get_word_progress(
        &self,
        user_id: &str,
        word: &str,
    ) -> Result<Option<WordProgress>, StoreError> {
        let key = keys::word_progress_key(user_id, word)?;
        match self.word_progress.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize::<WordProgress>(&raw)?.repaired())),
            None => Ok(None),
        }
    }

    pub fn set_word_progress(&self, progress: &WordProgress) -> Result<(), StoreError> {
        let key = keys::word_progress_key(&progress.user_id, &progress.word)?;
        let value = Self::serialize(progress)?;
        let next_due_index_key = due_index_key_for(progress)?;

        (&self.word_progress, &self.word_due_index)
            .transaction(|(tx_progress, tx_due_index)| {
                if let Some(old_raw) = tx_progress.get(key.as_bytes())? {
                    let old: WordProgress = serde_json::from_slice(&old_raw).map_err(|error| {
                        sled::transaction::ConflictableTransactionError::Abort(
                            StoreError::Serialization(error),
                        )
                    })?;
                    let old_due_index_key = due_index_key_for(&old)
                        .map_err(sled::transaction::ConflictableTransactionError::Abort)?;
                    tx_due_index.remove(old_due_index_key.as_bytes())?;
                }

                tx_progress.insert(key.as_bytes(), value.as_slice())?;
                tx_due_index.insert(next_due_index_key.as_bytes(), &[])?;

                Ok(())
            })
            .map_err(
                |error: sled::transaction::TransactionError<StoreError>| match error {
                    sled::transaction::TransactionError::Abort(store_error) => store_error,
                    sled::transaction::TransactionError::Storage(storage_error) => {
                        StoreError::Sled(storage_error)
                    }
                },
            )?;

        Ok(())
    }

    pub fn get_word_progress_batch(
        &self,
        user_id: &str,
        words: &[String],
    ) -> Result<Vec<WordProgress>, StoreError> {
        let mut progress_by_word: HashMap<String, Option<WordProgress>> =
            HashMap::with_capacity(words.len());

        for word in words {
            let normalized = word.to_lowercase();
            if progress_by_word.contains_key(&normalized) {
                continue;
            }
            let progress = self.get_word_progress(user_id, word)?;
            progress_by_word.insert(normalized, progress);
        }

        let mut results = Vec::with_capacity(words.len());
        for word in words {
            if let Some(Some(progress)) = progress_by_word.get(&word.to_lowercase()) {
                results.push(progress.clone());
            }
        }

        Ok(results)
    }

    /// Words with `next_review_date <= today` and status learning/reviewing,
    /// soonest-due first. Index entries that no longer match the primary row
    /// are skipped.
    pub fn get_due_word_progress(
        &self,
        user_id: &str,
        limit: usize,
        today: NaiveDate,
    ) -> Result<Vec<WordProgress>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let prefix = keys::word_due_index_prefix(user_id)?;
        let mut due = Vec::with_capacity(limit);
        let mut seen_words = HashSet::new();

        for item in self.word_due_index.scan_prefix(prefix.as_bytes()) {
            let (key, _) = item?;
            let Some((due_date, word)) = keys::parse_due_index_key(&key) else {
                continue;
            };

            if due_date > today {
                break;
            }

            if let Some(progress) = self.get_word_progress(user_id, &word)? {
                if progress.next_review_date == due_date
                    && progress.status != WordStatus::Mastered
                    && seen_words.insert(word)
                {
                    due.push(progress);
                    if due.len() >= limit {
                        break;
                    }
                }
            }
        }

        Ok(due)
    }

    pub fn list_word_progress(&self, user_id: &str) -> Result<Vec<WordProgress>, StoreError> {
        let prefix = keys::word_progress_prefix(user_id)?;
        let mut results = Vec::new();
        for item in self.word_progress.scan_prefix(prefix.as_bytes()) {
            let (_, v) = item?;
            results.push(Self::deserialize::<WordProgress>(&v)?.repaired());
        }
        Ok(results)
    }

    pub fn get_vocabulary_stats(&self, user_id: &str) -> Result<VocabularyStats, StoreError> {
        let mut stats = VocabularyStats::default();
        let mut total_correct = 0u64;

        for progress in self.list_word_progress(user_id)? {
            stats.total += 1;
            match progress.status {
                WordStatus::Learning => stats.learning += 1,
                WordStatus::Reviewing => stats.reviewing += 1,
                WordStatus::Mastered => stats.mastered += 1,
            }
            stats.total_reviews += u64::from(progress.review_count);
            total_correct += u64::from(progress.correct_count);
        }

        if stats.total_reviews > 0 {
            stats.accuracy =
                ((total_correct as f64 / stats.total_reviews as f64) * 100.0).round() as u32;
        }

        Ok(stats)
    }

    pub fn delete_word_progress(&self, user_id: &str, word: &str) -> Result<(), StoreError> {
        let key = keys::word_progress_key(user_id, word)?;

        (&self.word_progress, &self.word_due_index)
            .transaction(|(tx_progress, tx_due_index)| {
                if let Some(raw) = tx_progress.remove(key.as_bytes())? {
                    let removed: WordProgress = serde_json::from_slice(&raw).map_err(|error| {
                        sled::transaction::ConflictableTransactionError::Abort(
                            StoreError::Serialization(error),
                        )
                    })?;
                    let due_index_key = due_index_key_for(&removed)
                        .map_err(sled::transaction::ConflictableTransactionError::Abort)?;
                    tx_due_index.remove(due_index_key.as_bytes())?;
                }
                Ok(())
            })
            .map_err(
                |error: sled::transaction::TransactionError<StoreError>| match error {
                    sled::transaction::TransactionError::Abort(store_error) => store_error,
                    sled::transaction::TransactionError::Storage(storage_error) => {
                        StoreError::Sled(storage_error)
                    }
                },
            )?;

        Ok(())
    }

    /// Full wipe of a user's repetition state. The only path that deletes
    /// progress rows outside of tests.
    pub fn delete_user_progress(&self, user_id: &str) -> Result<(), StoreError> {
        for progress in self.list_word_progress(user_id)? {
            self.delete_word_progress(user_id, &progress.word)?;
        }
        Ok(())
    }
}
