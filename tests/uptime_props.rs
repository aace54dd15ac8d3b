use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeDelta, TimeZone, Timelike, Utc};
use proptest::prelude::*;
use resourcer::system::snapshot::SystemUptime;
use resourcer::system::uptime::{compute_uptime, days_in_month};

fn floor_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    t.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap()
}

/// Walks the calendar breakdown back from `now` to the boot minute.
fn reconstruct_boot(now: DateTime<Utc>, up: SystemUptime) -> DateTime<Utc> {
    let now = floor_to_minute(now);
    let first_of_month = NaiveDate::from_ymd_opt(now.year(), now.month(), 1).unwrap();
    let anchor_date = first_of_month
        .checked_sub_months(Months::new(up.years * 12 + up.months))
        .unwrap()
        .checked_add_days(Days::new(u64::from(now.day() - 1)))
        .unwrap();
    let anchor = Utc.from_utc_datetime(&anchor_date.and_time(now.time()));
    anchor
        - TimeDelta::days(i64::from(up.days))
        - TimeDelta::hours(i64::from(up.hours))
        - TimeDelta::minutes(i64::from(up.minutes))
}

fn any_now() -> impl Strategy<Value = DateTime<Utc>> {
    // 2000-01-01 .. 2030-12-31
    (946_684_800i64..1_924_905_600i64).prop_map(|ts| Utc.timestamp_opt(ts, 0).unwrap())
}

proptest! {
    #[test]
    fn breakdown_walks_back_to_boot_minute(
        now in any_now(),
        boot_seconds in 0u64..630_720_000,
    ) {
        let up = compute_uptime(boot_seconds, &now).unwrap();
        let boot = now - TimeDelta::seconds(boot_seconds as i64);
        prop_assert_eq!(reconstruct_boot(now, up), floor_to_minute(boot));
    }

    #[test]
    fn fields_stay_in_range(
        now in any_now(),
        boot_seconds in 0u64..630_720_000,
    ) {
        let up = compute_uptime(boot_seconds, &now).unwrap();
        prop_assert!(up.minutes < 60);
        prop_assert!(up.hours < 24);
        // Weaker than days < daysInPrecedingMonth: a borrow adds the boot
        // month's length, otherwise days stays below now's day of month.
        let boot = now - TimeDelta::seconds(boot_seconds as i64);
        let bound = days_in_month(boot.year(), boot.month())
            .max(days_in_month(now.year(), now.month()));
        prop_assert!(up.days < bound);
        prop_assert!(up.days <= 30);
        prop_assert!(up.months < 12);
        prop_assert!(up.years <= 20);
    }

    #[test]
    fn short_uptimes_are_plain_clock_arithmetic(
        now in any_now(),
        boot_seconds in 0u64..86_340,
    ) {
        let up = compute_uptime(boot_seconds, &now).unwrap();
        let boot = now - TimeDelta::seconds(boot_seconds as i64);
        let elapsed_minutes = (floor_to_minute(now) - floor_to_minute(boot)).num_minutes();
        prop_assert_eq!((up.years, up.months, up.days), (0, 0, 0));
        prop_assert_eq!(i64::from(up.hours * 60 + up.minutes), elapsed_minutes);
    }

    #[test]
    fn month_lengths_are_calendar_lengths(year in 1900i32..2100, month in 1u32..=12) {
        let days = days_in_month(year, month);
        prop_assert!((28..=31).contains(&days));
        let last = NaiveDate::from_ymd_opt(year, month, days).unwrap();
        prop_assert!(last.succ_opt().unwrap().day() == 1);
    }
}
