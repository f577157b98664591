//! Study plan selection, pacing maths, and the adjustment check that nudges a
//! user onto a longer or shorter period when their mastery rate drifts.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::constants::{ADJUST_AHEAD_RATIO, ADJUST_BEHIND_RATIO, ON_TRACK_TOLERANCE};
use crate::store::operations::study_plans::{StudyPeriod, StudyPlan};
use crate::store::{Store, StoreError};

/// Fixed pacing parameters for one period.
#[derive(Debug, Clone, Copy)]
pub struct PeriodConfig {
    pub duration_days: u32,
    pub new_words_per_day: u32,
    pub review_words_per_day: u32,
    pub review_intervals: &'static [u32],
}

pub fn period_config(period: StudyPeriod) -> PeriodConfig {
    match period {
        StudyPeriod::Intensive => PeriodConfig {
            duration_days: 14,
            new_words_per_day: 22,
            review_words_per_day: 18,
            review_intervals: &[1, 2, 3, 5, 7],
        },
        StudyPeriod::Accelerated => PeriodConfig {
            duration_days: 30,
            new_words_per_day: 11,
            review_words_per_day: 12,
            review_intervals: &[1, 2, 4, 7, 14],
        },
        StudyPeriod::Balanced => PeriodConfig {
            duration_days: 60,
            new_words_per_day: 6,
            review_words_per_day: 10,
            review_intervals: &[1, 2, 4, 7, 14, 21],
        },
        StudyPeriod::Relaxed => PeriodConfig {
            duration_days: 90,
            new_words_per_day: 4,
            review_words_per_day: 7,
            review_intervals: &[1, 2, 4, 7, 14, 21, 30],
        },
    }
}

/// Custom interval ladder attached to a period, shortest period climbing the
/// steepest.
pub fn intervals_for_period(period: StudyPeriod) -> &'static [u32] {
    period_config(period).review_intervals
}

fn period_for_days(days_available: i64) -> StudyPeriod {
    if days_available <= 14 {
        StudyPeriod::Intensive
    } else if days_available <= 30 {
        StudyPeriod::Accelerated
    } else if days_available <= 60 {
        StudyPeriod::Balanced
    } else {
        StudyPeriod::Relaxed
    }
}

/// Pick the tightest period that still fits the runway to `target_date` and
/// persist it as the user's plan. A past or same-day target gets the intensive
/// period rather than an error.
pub fn calculate_study_plan(
    store: &Store,
    user_id: &str,
    target_date: NaiveDate,
    total_words: u32,
    today: NaiveDate,
) -> Result<StudyPlan, StoreError> {
    let days_available = (target_date - today).num_days();
    let period = period_for_days(days_available);
    let config = period_config(period);

    let plan = StudyPlan {
        user_id: user_id.to_string(),
        period,
        start_date: today,
        target_date,
        daily_goal: config.new_words_per_day + config.review_words_per_day,
        total_words,
        new_words_per_day: config.new_words_per_day,
        review_words_per_day: config.review_words_per_day,
    };

    tracing::info!(user_id, ?period, days_available, "Calculated study plan");
    store.set_study_plan(&plan)?;
    Ok(plan)
}

/// Start a plan for an explicitly chosen period; the target date follows from
/// the period's duration.
pub fn create_study_plan(
    store: &Store,
    user_id: &str,
    period: StudyPeriod,
    total_words: u32,
    today: NaiveDate,
) -> Result<StudyPlan, StoreError> {
    let config = period_config(period);

    let plan = StudyPlan {
        user_id: user_id.to_string(),
        period,
        start_date: today,
        target_date: today
            .checked_add_days(Days::new(u64::from(config.duration_days)))
            .unwrap_or(today),
        daily_goal: config.new_words_per_day + config.review_words_per_day,
        total_words,
        new_words_per_day: config.new_words_per_day,
        review_words_per_day: config.review_words_per_day,
    };

    tracing::info!(user_id, ?period, "Created study plan");
    store.set_study_plan(&plan)?;
    Ok(plan)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanProgress {
    pub days_elapsed: u32,
    pub days_remaining: u32,
    pub total_days: u32,
    /// Share of the plan's words mastered, rounded to whole percent.
    pub percent_complete: u32,
    /// Words the pace says should be mastered by now, capped at the total.
    pub expected_words: u32,
    pub on_track: bool,
    /// Mastery rate needed over the remaining days to land the target; zero
    /// once the target has passed or been met.
    pub words_per_day_needed: u32,
}

/// Pure pacing snapshot; `mastered_count` comes from vocabulary stats.
pub fn calculate_progress(plan: &StudyPlan, mastered_count: u32, today: NaiveDate) -> PlanProgress {
    let total_days = (plan.target_date - plan.start_date).num_days().max(0) as u32;
    let days_elapsed = (today - plan.start_date).num_days().clamp(0, i64::from(total_days)) as u32;
    let days_remaining = total_days - days_elapsed;

    let percent_complete = if plan.total_words > 0 {
        ((f64::from(mastered_count) / f64::from(plan.total_words)) * 100.0).round() as u32
    } else {
        100
    };

    let expected_words = (days_elapsed * plan.new_words_per_day).min(plan.total_words);
    let on_track =
        f64::from(mastered_count) >= f64::from(expected_words) * ON_TRACK_TOLERANCE;

    let remaining_words = plan.total_words.saturating_sub(mastered_count);
    let words_per_day_needed = if days_remaining == 0 || remaining_words == 0 {
        0
    } else {
        remaining_words.div_ceil(days_remaining)
    };

    PlanProgress {
        days_elapsed,
        days_remaining,
        total_days,
        percent_complete,
        expected_words,
        on_track,
        words_per_day_needed,
    }
}

fn next_longer(period: StudyPeriod) -> Option<StudyPeriod> {
    match period {
        StudyPeriod::Intensive => Some(StudyPeriod::Accelerated),
        StudyPeriod::Accelerated => Some(StudyPeriod::Balanced),
        StudyPeriod::Balanced => Some(StudyPeriod::Relaxed),
        StudyPeriod::Relaxed => None,
    }
}

fn next_shorter(period: StudyPeriod) -> Option<StudyPeriod> {
    match period {
        StudyPeriod::Intensive => None,
        StudyPeriod::Accelerated => Some(StudyPeriod::Intensive),
        StudyPeriod::Balanced => Some(StudyPeriod::Accelerated),
        StudyPeriod::Relaxed => Some(StudyPeriod::Balanced),
    }
}

/// Pace verdict. Behind and ahead carry a suggested period when a neighboring
/// one exists; a user behind on the longest plan is still reported as behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAdjustment {
    OnTrack,
    Behind(Option<StudyPeriod>),
    Ahead(Option<StudyPeriod>),
}

/// Flag a period change when the mastery rate drifts well off the pace: under
/// 70% of expected is behind (suggesting the next longer period), over 130%
/// is ahead (suggesting the next shorter one).
pub fn should_adjust_plan(
    plan: &StudyPlan,
    mastered_count: u32,
    today: NaiveDate,
) -> PlanAdjustment {
    let progress = calculate_progress(plan, mastered_count, today);
    if progress.expected_words == 0 {
        return PlanAdjustment::OnTrack;
    }

    let ratio = f64::from(mastered_count) / f64::from(progress.expected_words);
    if ratio < ADJUST_BEHIND_RATIO {
        PlanAdjustment::Behind(next_longer(plan.period))
    } else if ratio > ADJUST_AHEAD_RATIO {
        PlanAdjustment::Ahead(next_shorter(plan.period))
    } else {
        PlanAdjustment::OnTrack
    }
}
