pub mod daily_missions;
pub mod drill_cache;
pub mod study_plans;
pub mod word_progress;
