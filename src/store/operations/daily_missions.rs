use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

/// One record per (user, calendar day). The word list is fixed at generation;
/// later reviews only move `progress`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyMission {
    pub user_id: String,
    pub date: NaiveDate,
    pub words: Vec<String>,
    pub progress: u32,
    pub created_at: DateTime<Utc>,
}

impl Store {
    pub fn get_daily_mission(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyMission>, StoreError> {
        let key = keys::daily_mission_key(user_id, date)?;
        match self.daily_missions.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_daily_mission(&self, mission: &DailyMission) -> Result<(), StoreError> {
        let key = keys::daily_mission_key(&mission.user_id, mission.date)?;
        self.daily_missions
            .insert(key.as_bytes(), Self::serialize(mission)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::DailyMission;
    use crate::store::Store;
    use chrono::{NaiveDate, Utc};
    use tempfile::tempdir;

    #[test]
    fn missions_are_keyed_per_day() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();

        let monday = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

        store
            .set_daily_mission(&DailyMission {
                user_id: "u1".to_string(),
                date: monday,
                words: vec!["alacrity".to_string()],
                progress: 0,
                created_at: Utc::now(),
            })
            .unwrap();

        assert!(store.get_daily_mission("u1", monday).unwrap().is_some());
        assert!(store.get_daily_mission("u1", tuesday).unwrap().is_none());
    }
}
