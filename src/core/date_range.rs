//! Calendar-month windows and month-based filtering of dated records.
//!
//! Windows are computed in the time zone of the reference timestamp, so a
//! caller passing `Local::now()` gets local calendar months while tests can
//! pin `Utc` or a `FixedOffset`.

use std::collections::BTreeMap;

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};

use crate::domain::Dated;

/// Inclusive bounds of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthRange<Tz: TimeZone> {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl<Tz: TimeZone> MonthRange<Tz> {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }

    /// First day of the month in the range's own time zone.
    pub fn first_day(&self) -> NaiveDate {
        self.start.naive_local().date()
    }
}

/// Returns the first and last instant (millisecond precision) of the month
/// containing `reference`.
pub fn month_range<Tz: TimeZone>(reference: &DateTime<Tz>) -> MonthRange<Tz> {
    let tz = reference.timezone();
    let date = reference.naive_local().date();
    let start = resolve_local(&tz, first_of_month(date).and_time(NaiveTime::MIN));
    let end = resolve_local(&tz, end_of_day(last_of_month(date)));
    MonthRange { start, end }
}

/// Keeps the records dated inside the reference month, in input order.
pub fn filter_by_month<'a, T, I, Tz>(records: I, reference: &DateTime<Tz>) -> Vec<&'a T>
where
    T: Dated + 'a,
    I: IntoIterator<Item = &'a T>,
    Tz: TimeZone,
{
    let range = month_range(reference);
    records
        .into_iter()
        .filter(|record| range.contains(record.date()))
        .collect()
}

/// First instant of the month `delta` months away from `reference`.
///
/// Months outside chrono's representable range clamp to the reference month.
pub fn shift_month<Tz: TimeZone>(reference: &DateTime<Tz>, delta: i32) -> DateTime<Tz> {
    let date = reference.naive_local().date();
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(delta);
    let target = i32::try_from(total.div_euclid(12))
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, total.rem_euclid(12) as u32 + 1, 1))
        .unwrap_or_else(|| first_of_month(date));
    resolve_local(&reference.timezone(), target.and_time(NaiveTime::MIN))
}

/// First instant of the month before `reference`, rolling back over year ends.
pub fn previous_month<Tz: TimeZone>(reference: &DateTime<Tz>) -> DateTime<Tz> {
    shift_month(reference, -1)
}

/// Returns `true` when both timestamps fall in the same calendar month of `a`'s zone.
pub fn same_month<Tz: TimeZone>(a: &DateTime<Tz>, b: &DateTime<Tz>) -> bool {
    let (a, b) = (a.naive_local().date(), b.naive_local().date());
    a.year() == b.year() && a.month() == b.month()
}

/// Newest-first copy of the records; equal timestamps keep input order.
pub fn sort_by_date<'a, T, I>(records: I) -> Vec<&'a T>
where
    T: Dated + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut sorted: Vec<&'a T> = records.into_iter().collect();
    sorted.sort_by(|a, b| b.date().cmp(&a.date()));
    sorted
}

/// Buckets records by UTC calendar day, days ascending, input order within a day.
pub fn group_by_date<'a, T, I>(records: I) -> BTreeMap<NaiveDate, Vec<&'a T>>
where
    T: Dated + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut grouped: BTreeMap<NaiveDate, Vec<&'a T>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.date().date_naive())
            .or_default()
            .push(record);
    }
    grouped
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if is_leap_year(year) => 29,
        _ => 28,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(
        date.year(),
        date.month(),
        days_in_month(date.year(), date.month()),
    )
    .unwrap_or(date)
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}

/// Maps a wall-clock time onto the zone. Ambiguous times take the earlier
/// instant; times skipped by a DST jump move forward one hour.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    if let Some(resolved) = tz.from_local_datetime(&naive).earliest() {
        return resolved;
    }
    naive
        .checked_add_signed(Duration::hours(1))
        .and_then(|shifted| tz.from_local_datetime(&shifted).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Expense;
    use chrono::FixedOffset;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn month_range_covers_whole_month() {
        let range = month_range(&utc(2024, 2, 14, 12, 0, 0));
        assert_eq!(range.start, utc(2024, 2, 1, 0, 0, 0));
        assert_eq!(
            range.end,
            utc(2024, 2, 29, 23, 59, 59) + Duration::milliseconds(999)
        );
        assert_eq!(range.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn month_lengths_follow_calendar() {
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
    }

    #[test]
    fn bounds_are_inclusive_to_the_millisecond() {
        let range = month_range(&utc(2024, 3, 10, 0, 0, 0));
        let one_ms = Duration::milliseconds(1);
        assert!(range.contains(range.start.clone()));
        assert!(range.contains(range.end.clone()));
        assert!(!range.contains(range.start.clone() - one_ms));
        assert!(!range.contains(range.end.clone() + one_ms));
    }

    #[test]
    fn range_follows_reference_time_zone() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let reference = offset.with_ymd_and_hms(2024, 5, 1, 0, 30, 0).unwrap();
        let range = month_range(&reference);
        // Local midnight on May 1st is 22:00 UTC on April 30th.
        assert!(range.contains(utc(2024, 4, 30, 22, 0, 0)));
        assert!(!range.contains(utc(2024, 4, 30, 21, 59, 59)));
    }

    #[test]
    fn previous_month_rolls_over_year() {
        let prev = previous_month(&utc(2024, 1, 31, 18, 0, 0));
        assert_eq!(prev, utc(2023, 12, 1, 0, 0, 0));
        let forward = shift_month(&utc(2024, 11, 30, 0, 0, 0), 3);
        assert_eq!(forward, utc(2025, 2, 1, 0, 0, 0));
        assert!(same_month(&forward, &utc(2025, 2, 28, 10, 0, 0)));
    }

    #[test]
    fn filter_keeps_input_order_and_is_idempotent() {
        let expenses = vec![
            Expense::new(5.0, "b", "Food", utc(2024, 6, 20, 0, 0, 0)),
            Expense::new(6.0, "x", "Food", utc(2024, 5, 31, 23, 59, 59)),
            Expense::new(7.0, "a", "Food", utc(2024, 6, 1, 0, 0, 0)),
        ];
        let reference = utc(2024, 6, 15, 0, 0, 0);
        let june = filter_by_month(&expenses, &reference);
        let titles: Vec<_> = june.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["b", "a"]);

        let again = filter_by_month(june.iter().copied(), &reference);
        assert_eq!(again, june);
    }

    #[test]
    fn extreme_dates_do_not_panic() {
        let far = Utc.with_ymd_and_hms(9999, 12, 31, 23, 0, 0).unwrap();
        let range = month_range(&far);
        assert!(range.contains(far));
        let _ = shift_month(&far, 1);
        let ancient = Utc.with_ymd_and_hms(-500, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(previous_month(&ancient).naive_utc().date().year(), -501);
    }

    #[test]
    fn sort_and_group_by_date() {
        let expenses = vec![
            Expense::new(1.0, "old", "Food", utc(2024, 6, 1, 9, 0, 0)),
            Expense::new(2.0, "new", "Food", utc(2024, 6, 3, 9, 0, 0)),
            Expense::new(3.0, "same-day", "Food", utc(2024, 6, 1, 18, 0, 0)),
        ];
        let sorted = sort_by_date(&expenses);
        let titles: Vec<_> = sorted.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["new", "same-day", "old"]);

        let grouped = group_by_date(&expenses);
        let first_day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&first_day].len(), 2);
        assert_eq!(grouped.keys().next(), Some(&first_day));
    }
}
