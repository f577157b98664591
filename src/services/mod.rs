pub mod daily_mix;
pub mod drill_cache;
pub mod drill_oracle;
pub mod scheduler;
pub mod study_plan;
