//! UTC calendar helpers
//!
//! Every "today" and date-range computation in the engine is done on UTC
//! calendar days.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};

use crate::{EngineError, EngineResult};

/// The current UTC calendar day
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Midnight UTC at the start of `date`
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::default()).and_utc()
}

/// Half-open `[start, end)` bounds covering one UTC day
pub fn day_bounds(date: NaiveDate) -> EngineResult<(DateTime<Utc>, DateTime<Utc>)> {
    let next = date
        .checked_add_days(Days::new(1))
        .ok_or_else(|| EngineError::Validation(format!("date out of range: {date}")))?;
    Ok((start_of_day(date), start_of_day(next)))
}

/// Half-open bounds covering `month` (1-12) of `year`
pub fn month_bounds(year: i32, month: u32) -> EngineResult<(DateTime<Utc>, DateTime<Utc>)> {
    if !(1..=12).contains(&month) {
        return Err(EngineError::Validation(format!(
            "month must be between 1 and 12, got {month}"
        )));
    }

    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| EngineError::Validation(format!("invalid month {year}-{month}")))?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or_else(|| EngineError::Validation(format!("invalid month {year}-{month}")))?;

    Ok((start_of_day(first), start_of_day(next)))
}

/// Bounds of `month` in the current UTC year
pub fn month_bounds_this_year(month: u32) -> EngineResult<(DateTime<Utc>, DateTime<Utc>)> {
    month_bounds(today().year(), month)
}
