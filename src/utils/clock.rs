use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::{AppError, AppResult};

/// Clock hour of `now` in the operating timezone.
pub fn local_hour(now: DateTime<Utc>, tz: Tz) -> u32 {
    now.with_timezone(&tz).hour()
}

/// Calendar date of `now` in the operating timezone.
pub fn local_date(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// First instant of `date` in `tz`, as UTC.
///
/// Zones that skip midnight for DST start the day at the first valid local time.
pub fn start_of_day(date: NaiveDate, tz: Tz) -> AppResult<DateTime<Utc>> {
    (0..=3)
        .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
        .find_map(|time| tz.from_local_datetime(&date.and_time(time)).earliest())
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| AppError::Internal(format!("no local midnight for {date} in {tz}")))
}

/// Half-open `[start, end)` UTC interval covering the local day of `date`.
pub fn day_bounds_for_date(date: NaiveDate, tz: Tz) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let next = date
        .succ_opt()
        .ok_or_else(|| AppError::InvalidInput(format!("date out of range: {date}")))?;
    Ok((start_of_day(date, tz)?, start_of_day(next, tz)?))
}

/// Half-open `[start, end)` UTC interval covering the local day containing `now`.
pub fn day_bounds(now: DateTime<Utc>, tz: Tz) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    day_bounds_for_date(local_date(now, tz), tz)
}
