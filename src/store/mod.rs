pub mod keys;
pub mod migrate;
pub mod operations;
pub mod trees;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use thiserror::Error;

#[derive(Debug)]
pub struct Store {
    db: Db,
    pub word_progress: sled::Tree,
    pub word_due_index: sled::Tree,
    pub daily_missions: sled::Tree,
    pub drill_cache: sled::Tree,
    pub study_plans: sled::Tree,
    pub meta: sled::Tree,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found: entity={entity}, key={key}")]
    NotFound { entity: String, key: String },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("migration error at version {version}: {message}")]
    Migration { version: u32, message: String },
}

impl Store {
    pub fn open(sled_path: &str) -> Result<Self, StoreError> {
        let db = sled::open(sled_path)?;
        let word_progress = db.open_tree(trees::WORD_PROGRESS)?;
        let word_due_index = db.open_tree(trees::WORD_DUE_INDEX)?;
        let daily_missions = db.open_tree(trees::DAILY_MISSIONS)?;
        let drill_cache = db.open_tree(trees::DRILL_CACHE)?;
        let study_plans = db.open_tree(trees::STUDY_PLANS)?;
        let meta = db.open_tree(trees::META)?;

        Ok(Self {
            db,
            word_progress,
            word_due_index,
            daily_missions,
            drill_cache,
            study_plans,
            meta,
        })
    }

    pub fn run_migrations(&self) -> Result<(), StoreError> {
        migrate::run(self)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    pub fn raw_db(&self) -> &Db {
        &self.db
    }

    pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
