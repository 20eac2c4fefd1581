use crate::error::{config_error, AppResult};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

/// Parse time string in HH:MM format
pub fn parse_time(time_str: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = time_str.split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let hour = parts[0].parse::<u32>().ok()?;
    let minute = parts[1].parse::<u32>().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Longest DST gap searched when resolving the start of a day
const MAX_DAY_START_SHIFT_MINUTES: i64 = 4 * 60;

/// Resolve a wall-clock time on a date in `tz` to a UTC instant.
///
/// Hour 24 is accepted and means the start of the next day (see
/// [`start_of_day`]). Ambiguous times (DST fall-back) resolve to the earlier
/// instant; other times that do not exist (DST spring-forward) yield `None`.
pub fn local_to_utc(date: NaiveDate, hour: u32, minute: u32, tz: &Tz) -> Option<DateTime<Utc>> {
    if hour == 24 && minute == 0 {
        return start_of_day(date.succ_opt()?, tz);
    }
    let naive = date.and_hms_opt(hour, minute, 0)?;
    match tz.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        chrono::LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        chrono::LocalResult::None => None,
    }
}

/// First instant of `date` in `tz`.
///
/// Some zones (America/Santiago, Asia/Beirut) spring forward at midnight, so
/// local 00:00 does not exist there. The day then starts at the first
/// wall-clock minute after the gap.
pub fn start_of_day(date: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    (0..=MAX_DAY_START_SHIFT_MINUTES)
        .filter_map(|minutes| midnight.checked_add_signed(Duration::minutes(minutes)))
        .find_map(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Build the UTC bounds of a working window such as 09:00-18:00 on a local date
pub fn working_window(
    date: NaiveDate,
    start: &str,
    end: &str,
    tz: &Tz,
) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let (start_hour, start_minute) = parse_time(start)
        .ok_or_else(|| config_error(&format!("Invalid window start: {}", start)))?;
    let (end_hour, end_minute) =
        parse_time(end).ok_or_else(|| config_error(&format!("Invalid window end: {}", end)))?;

    let window_start = local_to_utc(date, start_hour, start_minute, tz)
        .ok_or_else(|| config_error(&format!("{} {} does not exist in {}", date, start, tz)))?;
    let window_end = local_to_utc(date, end_hour, end_minute, tz)
        .ok_or_else(|| config_error(&format!("{} {} does not exist in {}", date, end, tz)))?;

    if window_end <= window_start {
        return Err(config_error(&format!(
            "Working window end {} is not after start {}",
            end, start
        )));
    }

    Ok((window_start, window_end))
}

/// Saturday or Sunday
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Whole days from `today` until `due`, never negative
pub fn days_until(today: NaiveDate, due: NaiveDate) -> i64 {
    (due - today).num_days().max(0)
}
