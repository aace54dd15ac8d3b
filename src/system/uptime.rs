//! Calendar breakdown of system uptime.
//!
//! Uptime arrives from the provider as seconds since boot. It is shown as
//! years, months, days, hours and minutes measured on the calendar of the
//! current timezone, not as fixed-length units, so a month here is whatever
//! length the borrowed month actually had.

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, TimeZone, Timelike};

use super::error::MonitorError;
use super::snapshot::SystemUptime;

/// Splits `boot_seconds` of uptime, measured back from `now`, into calendar
/// fields.
///
/// Field-wise differences between boot time and `now` are normalised by
/// borrowing from the next larger unit, minutes first and months last.
/// The result is not normalised further: eleven months and thirty days is
/// a valid answer.
pub fn compute_uptime<Tz: TimeZone>(
    boot_seconds: u64,
    now: &DateTime<Tz>,
) -> Result<SystemUptime, MonitorError> {
    let offset = i64::try_from(boot_seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .ok_or(MonitorError::UptimeOutOfRange(boot_seconds))?;
    let then = now
        .clone()
        .checked_sub_signed(offset)
        .ok_or(MonitorError::UptimeOutOfRange(boot_seconds))?;

    let mut years = now.year() - then.year();
    let mut months = now.month() as i32 - then.month() as i32;
    let mut days = now.day() as i32 - then.day() as i32;
    let mut hours = now.hour() as i32 - then.hour() as i32;
    let mut minutes = now.minute() as i32 - then.minute() as i32;

    if minutes < 0 {
        minutes += 60;
        hours -= 1;
    }
    if hours < 0 {
        hours += 24;
        days -= 1;
    }
    if days < 0 {
        // The borrowed month is the one boot fell in.
        days += days_in_month(then.year(), then.month()) as i32;
        months -= 1;
    }
    if months < 0 {
        months += 12;
        years -= 1;
    }

    Ok(SystemUptime {
        years: non_negative(years),
        months: non_negative(months),
        days: non_negative(days),
        hours: non_negative(hours),
        minutes: non_negative(minutes),
    })
}

/// Number of days in `month` (1-based) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

fn non_negative(v: i32) -> u32 {
    u32::try_from(v).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn uptime_between(then: DateTime<Utc>, now: DateTime<Utc>) -> SystemUptime {
        let secs = (now - then).num_seconds() as u64;
        compute_uptime(secs, &now).unwrap()
    }

    fn fields(u: SystemUptime) -> (u32, u32, u32, u32, u32) {
        (u.years, u.months, u.days, u.hours, u.minutes)
    }

    #[test]
    fn zero_uptime_is_all_zero() {
        let now = at(2024, 5, 10, 8, 30);
        assert_eq!(fields(compute_uptime(0, &now).unwrap()), (0, 0, 0, 0, 0));
    }

    #[test]
    fn minutes_borrow_from_hours() {
        let up = uptime_between(at(2024, 5, 10, 7, 50), at(2024, 5, 10, 9, 20));
        assert_eq!(fields(up), (0, 0, 0, 1, 30));
    }

    #[test]
    fn hours_borrow_from_days() {
        let up = uptime_between(at(2024, 5, 9, 22, 0), at(2024, 5, 11, 3, 15));
        assert_eq!(fields(up), (0, 0, 1, 5, 15));
    }

    #[test]
    fn days_borrow_the_length_of_the_boot_month() {
        let up = uptime_between(at(2024, 1, 31, 23, 30), at(2024, 3, 1, 0, 10));
        assert_eq!(fields(up), (0, 1, 0, 0, 40));

        let up = uptime_between(at(2024, 2, 20, 12, 0), at(2024, 3, 5, 12, 0));
        assert_eq!(fields(up), (0, 0, 14, 0, 0));
    }

    #[test]
    fn borrowed_days_can_exceed_the_month_before_now() {
        // February 2024 has 29 days; the borrow uses January's 31.
        let up = uptime_between(at(2024, 1, 31, 12, 0), at(2024, 3, 30, 12, 0));
        assert_eq!(fields(up), (0, 1, 30, 0, 0));
    }

    #[test]
    fn months_borrow_from_years() {
        let up = uptime_between(at(2023, 12, 31, 10, 0), at(2025, 1, 1, 9, 0));
        assert_eq!(fields(up), (1, 0, 0, 23, 0));
    }

    #[test]
    fn whole_year() {
        let up = uptime_between(at(2023, 6, 15, 12, 0), at(2024, 6, 15, 12, 0));
        assert_eq!(fields(up), (1, 0, 0, 0, 0));
    }

    #[test]
    fn eleven_months_thirty_days_is_not_rounded_up() {
        let up = uptime_between(at(2023, 1, 1, 0, 0), at(2023, 12, 31, 0, 0));
        assert_eq!(fields(up), (0, 11, 30, 0, 0));
    }

    #[test]
    fn seconds_are_ignored() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 8, 30, 59).unwrap();
        assert_eq!(fields(compute_uptime(59, &now).unwrap()), (0, 0, 0, 0, 0));
        assert_eq!(fields(compute_uptime(60, &now).unwrap()), (0, 0, 0, 0, 1));
    }

    #[test]
    fn out_of_range_boot_offset_is_an_error() {
        let now = at(2024, 5, 10, 8, 30);
        let err = compute_uptime(u64::MAX, &now).unwrap_err();
        assert!(matches!(err, MonitorError::UptimeOutOfRange(_)));
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
    }
}
