//! Report-period date helpers.

use chrono::{NaiveDate, NaiveDateTime};

/// 1970-01-01.
fn epoch() -> NaiveDate {
    NaiveDate::default()
}

/// Days since 1970-01-01, the physical representation of a Polars `Date`.
pub fn days_since_epoch(date: NaiveDate) -> i32 {
    (date - epoch()).num_days() as i32
}

/// Inverse of [`days_since_epoch`].
pub fn date_from_days(days: i32) -> Option<NaiveDate> {
    epoch().checked_add_signed(chrono::Duration::days(i64::from(days)))
}

/// Parses a period written as text.
///
/// Accepts ISO dates and datetimes, `dd/mm/yyyy`, and month names with a
/// year (`April 2018`, `Apr-2018`), which resolve to the first of the month.
/// A leading label such as `Period:` is ignored.
pub fn parse_period_text(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_date_like(trimmed).or_else(|| {
        let (_, tail) = trimmed.rsplit_once(':')?;
        parse_date_like(tail.trim())
    })
}

fn parse_date_like(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime.date());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.date());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%d/%m/%Y") {
        return Some(date);
    }
    let month_year = value.replace(['-', ','], " ");
    let with_day = format!("1 {}", month_year.split_whitespace().collect::<Vec<_>>().join(" "));
    NaiveDate::parse_from_str(&with_day, "%d %B %Y")
        .or_else(|_| NaiveDate::parse_from_str(&with_day, "%d %b %Y"))
        .ok()
}
