use chrono::NaiveDate;

use crate::store::StoreError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Key segments are joined with ':'. A segment containing the separator would
/// corrupt prefix scans, so reject it up front.
fn validate_segment(name: &str, value: &str) -> Result<(), StoreError> {
    if value.is_empty() {
        return Err(StoreError::Validation(format!("{} must not be empty", name)));
    }
    if value.contains(':') {
        return Err(StoreError::Validation(format!(
            "{} must not contain ':': {}",
            name, value
        )));
    }
    Ok(())
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

pub fn word_progress_key(user_id: &str, word: &str) -> Result<String, StoreError> {
    validate_segment("user_id", user_id)?;
    validate_segment("word", word)?;
    Ok(format!("{}:{}", user_id, word.to_lowercase()))
}

pub fn word_progress_prefix(user_id: &str) -> Result<String, StoreError> {
    validate_segment("user_id", user_id)?;
    Ok(format!("{}:", user_id))
}

/// Due-index keys order lexicographically by ISO date, which is also
/// chronological order, so a prefix scan walks soonest-due first.
pub fn word_due_index_key(
    user_id: &str,
    due_date: NaiveDate,
    word: &str,
) -> Result<String, StoreError> {
    validate_segment("user_id", user_id)?;
    validate_segment("word", word)?;
    Ok(format!(
        "{}:{}:{}",
        user_id,
        format_date(due_date),
        word.to_lowercase()
    ))
}

pub fn word_due_index_prefix(user_id: &str) -> Result<String, StoreError> {
    validate_segment("user_id", user_id)?;
    Ok(format!("{}:", user_id))
}

pub fn parse_due_index_key(key: &[u8]) -> Option<(NaiveDate, String)> {
    let text = std::str::from_utf8(key).ok()?;
    let mut parts = text.splitn(3, ':');
    let _user_id = parts.next()?;
    let date = parse_date(parts.next()?)?;
    let word = parts.next()?;
    Some((date, word.to_string()))
}

pub fn daily_mission_key(user_id: &str, date: NaiveDate) -> Result<String, StoreError> {
    validate_segment("user_id", user_id)?;
    Ok(format!("{}:{}", user_id, format_date(date)))
}

/// Drill cache keys put the date before the word so a per-user scan yields
/// entries oldest-day-first and a (user, day) prefix selects one day's rows.
pub fn drill_cache_key(
    user_id: &str,
    date: NaiveDate,
    word: &str,
) -> Result<String, StoreError> {
    validate_segment("user_id", user_id)?;
    validate_segment("word", word)?;
    Ok(format!(
        "{}:{}:{}",
        user_id,
        format_date(date),
        word.to_lowercase()
    ))
}

pub fn drill_cache_prefix(user_id: &str) -> Result<String, StoreError> {
    validate_segment("user_id", user_id)?;
    Ok(format!("{}:", user_id))
}

pub fn drill_cache_day_prefix(user_id: &str, date: NaiveDate) -> Result<String, StoreError> {
    validate_segment("user_id", user_id)?;
    Ok(format!("{}:{}:", user_id, format_date(date)))
}

pub fn parse_drill_cache_key(key: &[u8]) -> Option<(String, NaiveDate, String)> {
    let text = std::str::from_utf8(key).ok()?;
    let mut parts = text.splitn(3, ':');
    let user_id = parts.next()?;
    let date = parse_date(parts.next()?)?;
    let word = parts.next()?;
    Some((user_id.to_string(), date, word.to_string()))
}

pub fn study_plan_key(user_id: &str) -> Result<String, StoreError> {
    validate_segment("user_id", user_id)?;
    Ok(user_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn word_progress_key_is_case_insensitive() {
        let a = word_progress_key("u1", "Alacrity").unwrap();
        let b = word_progress_key("u1", "alacrity").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn due_index_orders_by_date_asc() {
        let earlier = word_due_index_key("u1", date(2026, 3, 9), "bane").unwrap();
        let later = word_due_index_key("u1", date(2026, 3, 10), "bane").unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn due_index_key_round_trips() {
        let key = word_due_index_key("u1", date(2026, 3, 9), "Bane").unwrap();
        let (parsed_date, word) = parse_due_index_key(key.as_bytes()).unwrap();
        assert_eq!(parsed_date, date(2026, 3, 9));
        assert_eq!(word, "bane");
    }

    #[test]
    fn drill_cache_key_round_trips() {
        let key = drill_cache_key("u1", date(2026, 1, 2), "Ephemeral").unwrap();
        let (user, parsed_date, word) = parse_drill_cache_key(key.as_bytes()).unwrap();
        assert_eq!(user, "u1");
        assert_eq!(parsed_date, date(2026, 1, 2));
        assert_eq!(word, "ephemeral");
    }

    #[test]
    fn separator_in_segment_is_rejected() {
        assert!(word_progress_key("u:1", "word").is_err());
        assert!(word_progress_key("u1", "").is_err());
    }
}
