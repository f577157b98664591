pub const WORD_PROGRESS: &str = "word_progress";
pub const WORD_DUE_INDEX: &str = "word_due_index";
pub const DAILY_MISSIONS: &str = "daily_missions";
pub const DRILL_CACHE: &str = "drill_cache";
pub const STUDY_PLANS: &str = "study_plans";
pub const META: &str = "meta";
