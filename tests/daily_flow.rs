use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use tempfile::TempDir;

use vocab_engine::services::daily_mix::{daily_mission, refresh_mission_progress};
use vocab_engine::services::drill_cache::get_daily_vocab_drills;
use vocab_engine::services::drill_oracle::{DrillOracle, DrillProblem, OracleError};
use vocab_engine::services::scheduler::record_review;
use vocab_engine::services::study_plan::create_study_plan;
use vocab_engine::store::operations::study_plans::StudyPeriod;
use vocab_engine::store::operations::word_progress::WordStatus;
use vocab_engine::store::Store;

fn open_store() -> (TempDir, Store) {
    let dir = TempDir::new().unwrap();
    let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
    store.run_migrations().unwrap();
    (dir, store)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn word_pool() -> Vec<String> {
    [
        "alacrity",
        "bane",
        "candor",
        "dearth",
        "ephemeral",
        "fulcrum",
        "garrulous",
        "harbinger",
        "iconoclast",
        "juxtapose",
        "keen",
        "languid",
        "maelstrom",
        "nadir",
        "obfuscate",
    ]
    .iter()
    .map(|w| w.to_string())
    .collect()
}

struct CountingOracle {
    calls: AtomicUsize,
    words_generated: AtomicUsize,
}

impl CountingOracle {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            words_generated: AtomicUsize::new(0),
        }
    }
}

impl DrillOracle for CountingOracle {
    async fn generate_batch(
        &self,
        words: &[String],
    ) -> Result<HashMap<String, DrillProblem>, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.words_generated.fetch_add(words.len(), Ordering::SeqCst);
        Ok(words
            .iter()
            .map(|w| (w.to_lowercase(), DrillProblem::mock_for_word(w)))
            .collect())
    }
}

#[tokio::test]
async fn at_one_day_of_study_generates_drills_exactly_once() {
    let (_dir, store) = open_store();
    let oracle = CountingOracle::new();
    let today = date(2026, 3, 10);
    let pool = word_pool();

    let mission = daily_mission(&store, "u1", &pool, None, today).unwrap();
    assert_eq!(mission.words.len(), 10);
    assert_eq!(mission.progress, 0);

    let drills = get_daily_vocab_drills(&store, &oracle, "u1", &mission.words, today)
        .await
        .unwrap();
    assert_eq!(drills.len(), mission.words.len());
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);

    // The user reopens the app: same mission, zero extra oracle traffic.
    let again = daily_mission(&store, "u1", &pool, None, today).unwrap();
    assert_eq!(again.words, mission.words);

    let cached = get_daily_vocab_drills(&store, &oracle, "u1", &again.words, today)
        .await
        .unwrap();
    assert_eq!(cached.len(), drills.len());
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        oracle.words_generated.load(Ordering::SeqCst),
        mission.words.len()
    );
}

#[tokio::test]
async fn at_next_day_brings_a_fresh_mission_and_fresh_drills() {
    let (_dir, store) = open_store();
    let oracle = CountingOracle::new();
    let pool = word_pool();

    let monday = date(2026, 3, 9);
    let tuesday = date(2026, 3, 10);

    let first = daily_mission(&store, "u1", &pool, None, monday).unwrap();
    get_daily_vocab_drills(&store, &oracle, "u1", &first.words, monday)
        .await
        .unwrap();

    let second = daily_mission(&store, "u1", &pool, None, tuesday).unwrap();
    assert_eq!(second.date, tuesday);
    assert_eq!(second.progress, 0);

    get_daily_vocab_drills(&store, &oracle, "u1", &second.words, tuesday)
        .await
        .unwrap();
    // Day rollover invalidates the cache even for overlapping words.
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn at_reviews_walk_a_word_to_mastered_and_count_into_mission_progress() {
    let (_dir, store) = open_store();
    let pool = word_pool();
    let today = date(2026, 3, 10);

    let mission = daily_mission(&store, "u1", &pool, None, today).unwrap();
    let word = mission.words[0].clone();

    // Five correct reviews: intervals 2, 4, 11, 31, 90 with the rising ease.
    let mut day = today;
    let mut progress = record_review(&store, "u1", &word, true, day).unwrap();
    for _ in 0..4 {
        day = progress.next_review_date;
        progress = record_review(&store, "u1", &word, true, day).unwrap();
    }

    assert_eq!(progress.status, WordStatus::Mastered);
    assert_eq!(progress.correct_count, 5);
    assert!(progress.interval >= 14);

    let updated = refresh_mission_progress(&store, "u1", today)
        .unwrap()
        .unwrap();
    assert_eq!(updated.progress, 1);
    assert_eq!(updated.words, mission.words);

    // Mastered words no longer surface in the due queue.
    let due = store
        .get_due_word_progress("u1", 50, progress.next_review_date)
        .unwrap();
    assert!(due.iter().all(|p| p.word != word));
}

#[test]
fn at_failed_word_comes_back_the_next_day() {
    let (_dir, store) = open_store();
    let today = date(2026, 3, 10);

    record_review(&store, "u1", "bane", true, today).unwrap();
    record_review(&store, "u1", "bane", true, date(2026, 3, 12)).unwrap();
    let missed = record_review(&store, "u1", "bane", false, date(2026, 3, 16)).unwrap();

    assert_eq!(missed.interval, 1);
    assert_eq!(missed.next_review_date, date(2026, 3, 17));

    let due = store
        .get_due_word_progress("u1", 10, date(2026, 3, 17))
        .unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].word, "bane");
}

#[test]
fn at_plan_quotas_shape_the_daily_mission() {
    let (_dir, store) = open_store();
    let pool = word_pool();
    let today = date(2026, 3, 10);

    let plan = create_study_plan(&store, "u1", StudyPeriod::Relaxed, 300, today).unwrap();
    assert_eq!(plan.new_words_per_day, 4);

    // Nothing reviewed yet, so the mission is the new-word quota alone.
    let mission = daily_mission(&store, "u1", &pool, Some(&plan), today).unwrap();
    assert_eq!(mission.words.len(), 4);

    let stats = store.get_vocabulary_stats("u1").unwrap();
    assert_eq!(stats.total, 0);
}
