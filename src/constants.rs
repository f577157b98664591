/// 默认每日任务单词数（无学习计划时使用）
pub const DEFAULT_DAILY_GOAL: u32 = 10;

/// 默认词汇总量（学习计划目标词数）
pub const DEFAULT_TOTAL_WORDS: u32 = 300;

/// 新单词初始难度系数
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// 难度系数下限
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// 难度系数上限
pub const MAX_EASE_FACTOR: f64 = 3.0;

/// 答对后难度系数增量
pub const EASE_BONUS: f64 = 0.1;

/// 答错后难度系数减量
pub const EASE_PENALTY: f64 = 0.2;

/// 掌握判定：累计答对次数阈值
pub const MASTERY_CORRECT_COUNT: u32 = 5;

/// 掌握判定：复习间隔阈值（天）
pub const MASTERY_INTERVAL_DAYS: u32 = 14;

/// 每日混合中到期复习词占比
pub const MIX_DUE_RATIO: f64 = 0.4;

/// 每日混合中随机巩固词占比
pub const MIX_REFRESH_RATIO: f64 = 0.3;

/// 随机巩固词候选池大小上限
pub const REFRESH_POOL_SIZE: usize = 100;

/// 进度判定容差：实际掌握数达到预期的 90% 即视为按计划推进
pub const ON_TRACK_TOLERANCE: f64 = 0.9;

/// 建议延长计划的阈值（实际 < 预期 70%）
pub const ADJUST_BEHIND_RATIO: f64 = 0.7;

/// 建议缩短计划的阈值（实际 > 预期 130%）
pub const ADJUST_AHEAD_RATIO: f64 = 1.3;

/// 清理过期缓存时单次最多删除的条目数
pub const MAX_PURGE_PER_RUN: u32 = 10_000;
