use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

/// Singleton per user, replaced wholesale when a new period is chosen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub user_id: String,
    pub period: StudyPeriod,
    pub start_date: NaiveDate,
    pub target_date: NaiveDate,
    pub daily_goal: u32,
    pub total_words: u32,
    pub new_words_per_day: u32,
    pub review_words_per_day: u32,
}

/// Ordered shortest to longest; the derives give `Intensive < Accelerated <
/// Balanced < Relaxed`, which plan adjustment relies on.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum StudyPeriod {
    Intensive,
    Accelerated,
    Balanced,
    Relaxed,
}

impl Store {
    pub fn get_study_plan(&self, user_id: &str) -> Result<Option<StudyPlan>, StoreError> {
        let key = keys::study_plan_key(user_id)?;
        match self.study_plans.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_study_plan(&self, plan: &StudyPlan) -> Result<(), StoreError> {
        let key = keys::study_plan_key(&plan.user_id)?;
        self.study_plans
            .insert(key.as_bytes(), Self::serialize(plan)?)?;
        Ok(())
    }

    pub fn delete_study_plan(&self, user_id: &str) -> Result<(), StoreError> {
        let key = keys::study_plan_key(user_id)?;
        self.study_plans.remove(key.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{StudyPeriod, StudyPlan};
    use crate::store::Store;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn period_ordering_is_shortest_first() {
        assert!(StudyPeriod::Intensive < StudyPeriod::Accelerated);
        assert!(StudyPeriod::Accelerated < StudyPeriod::Balanced);
        assert!(StudyPeriod::Balanced < StudyPeriod::Relaxed);
    }

    #[test]
    fn plan_is_replaced_wholesale() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();

        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut plan = StudyPlan {
            user_id: "u1".to_string(),
            period: StudyPeriod::Intensive,
            start_date: start,
            target_date: start + chrono::Days::new(14),
            daily_goal: 40,
            total_words: 300,
            new_words_per_day: 22,
            review_words_per_day: 18,
        };
        store.set_study_plan(&plan).unwrap();

        plan.period = StudyPeriod::Relaxed;
        plan.daily_goal = 11;
        store.set_study_plan(&plan).unwrap();

        let read = store.get_study_plan("u1").unwrap().unwrap();
        assert_eq!(read.period, StudyPeriod::Relaxed);
        assert_eq!(read.daily_goal, 11);

        store.delete_study_plan("u1").unwrap();
        assert!(store.get_study_plan("u1").unwrap().is_none());
    }
}
