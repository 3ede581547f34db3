use chrono::{DateTime, Datelike, Duration, Local, NaiveDateTime, NaiveTime, TimeZone};

const MAX_GAP_MINUTES: i64 = 24 * 60;

/// Epoch millis of the Monday 00:00 that opens the week containing
/// `timestamp_ms`, in local time. Sunday belongs to the week that started
/// six days earlier.
pub fn week_key(timestamp_ms: i64) -> i64 {
    week_key_in(timestamp_ms, &Local)
}

pub fn week_key_in<Tz: TimeZone>(timestamp_ms: i64, tz: &Tz) -> i64 {
    let Some(moment) = tz.timestamp_millis_opt(timestamp_ms).single() else {
        return timestamp_ms;
    };
    let days_since_monday = i64::from(moment.weekday().num_days_from_monday());
    let monday = moment.date_naive() - Duration::days(days_since_monday);
    let midnight = monday.and_time(NaiveTime::MIN);
    first_local_instant(tz, midnight)
        .map(|start| start.timestamp_millis())
        .unwrap_or(timestamp_ms)
}

/// Earliest real instant at or after `local`. A DST jump can skip local
/// midnight; the week then opens at the first minute that exists.
fn first_local_instant<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    (0..=MAX_GAP_MINUTES)
        .find_map(|minutes| tz.from_local_datetime(&(local + Duration::minutes(minutes))).earliest())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, LocalResult, NaiveDate, Utc};

    fn utc_ms(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .expect("valid date")
            .timestamp_millis()
    }

    #[test]
    fn monday_midnight_is_its_own_key() {
        // 2024-06-17 is a Monday.
        let monday = utc_ms(2024, 6, 17, 0, 0);
        assert_eq!(week_key_in(monday, &Utc), monday);
    }

    #[test]
    fn whole_week_shares_a_key() {
        let monday = utc_ms(2024, 6, 17, 0, 0);
        for day in 17..=23 {
            assert_eq!(week_key_in(utc_ms(2024, 6, day, 13, 30), &Utc), monday);
        }
    }

    #[test]
    fn sunday_night_and_monday_morning_split() {
        let sunday = utc_ms(2024, 6, 23, 23, 59);
        let monday = utc_ms(2024, 6, 24, 0, 1);
        let sunday_key = week_key_in(sunday, &Utc);
        let monday_key = week_key_in(monday, &Utc);
        assert_ne!(sunday_key, monday_key);
        assert_eq!(sunday_key, utc_ms(2024, 6, 17, 0, 0));
        assert_eq!(monday_key, utc_ms(2024, 6, 24, 0, 0));
    }

    #[test]
    fn boundary_follows_the_local_offset() {
        let tz = FixedOffset::east_opt(9 * 3600).expect("offset");
        // Sunday 23:30 UTC is already Monday 08:30 at +09:00.
        let instant = utc_ms(2024, 6, 23, 23, 30);
        let key = week_key_in(instant, &tz);
        assert_eq!(key, utc_ms(2024, 6, 23, 15, 0));
        assert_ne!(key, week_key_in(instant, &Utc));
    }

    /// -03:00 until Monday 2024-06-17 03:00 UTC, then -02:00. Local
    /// 00:00..01:00 on that Monday never happens.
    #[derive(Debug, Clone, Copy)]
    struct MidnightJump;

    fn jump_utc() -> NaiveDateTime {
        Utc.with_ymd_and_hms(2024, 6, 17, 3, 0, 0)
            .single()
            .expect("valid date")
            .naive_utc()
    }

    fn hours(h: i32) -> FixedOffset {
        FixedOffset::east_opt(h * 3600).expect("offset")
    }

    impl TimeZone for MidnightJump {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            MidnightJump
        }

        fn offset_from_local_date(&self, _local: &NaiveDate) -> LocalResult<FixedOffset> {
            LocalResult::Single(hours(-3))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let before = *local + Duration::hours(3) < jump_utc();
            let after = *local + Duration::hours(2) >= jump_utc();
            match (before, after) {
                (true, true) => LocalResult::Ambiguous(hours(-3), hours(-2)),
                (true, false) => LocalResult::Single(hours(-3)),
                (false, true) => LocalResult::Single(hours(-2)),
                (false, false) => LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, _utc: &NaiveDate) -> FixedOffset {
            hours(-3)
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < jump_utc() {
                hours(-3)
            } else {
                hours(-2)
            }
        }
    }

    #[test]
    fn skipped_midnight_opens_at_first_real_minute() {
        // Wednesday noon UTC, same local week.
        let key = week_key_in(utc_ms(2024, 6, 19, 12, 0), &MidnightJump);
        // Local 01:00 at -02:00.
        assert_eq!(key, utc_ms(2024, 6, 17, 3, 0));

        // Sunday evening before the jump still belongs to the previous week.
        let sunday = week_key_in(utc_ms(2024, 6, 16, 23, 0), &MidnightJump);
        assert!(sunday < key);
        assert_eq!(sunday, utc_ms(2024, 6, 10, 3, 0));
    }

    #[test]
    fn local_week_boundary() {
        let sunday = Local
            .with_ymd_and_hms(2024, 6, 23, 23, 59, 0)
            .single()
            .expect("unambiguous")
            .timestamp_millis();
        let monday = Local
            .with_ymd_and_hms(2024, 6, 24, 0, 1, 0)
            .single()
            .expect("unambiguous")
            .timestamp_millis();
        assert_ne!(week_key(sunday), week_key(monday));
        assert_eq!(week_key(sunday), week_key(sunday - 6 * 24 * 3600 * 1000));
    }
}
