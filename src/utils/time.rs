use chrono::{Duration, NaiveDate, Utc};

/// `YYYY-MM-DD` completion date `weeks` from now, as embedded in repaired
/// learning-path documents.
pub fn completion_date(weeks: i64) -> String {
    (Utc::now() + Duration::weeks(weeks))
        .format("%Y-%m-%d")
        .to_string()
}

pub fn due_date(days: i64) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(days)
}
