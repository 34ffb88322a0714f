//! Calendar view ranges as unix-second windows.

use chrono::{Datelike, Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// The calendar views the dashboard can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeKind {
    Week,
    Month,
    Year,
}

/// Half-open `[start, end)` window in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarRange {
    pub start: i64,
    pub end: i64,
}

/// Computes the view window containing `date`.
///
/// Weeks start on Monday. Bounds are midnights in UTC; callers localize
/// upstream if they need wall-clock weeks.
pub fn calendar_range(kind: RangeKind, date: NaiveDate) -> CalendarRange {
    let (start, end) = match kind {
        RangeKind::Week => {
            let monday = date - Days::new(u64::from(date.weekday().num_days_from_monday()));
            (monday, monday + Days::new(7))
        }
        RangeKind::Month => {
            let first = first_of_month(date.year(), date.month()).unwrap_or(date);
            let next = if date.month() == 12 {
                first_of_month(date.year() + 1, 1)
            } else {
                first_of_month(date.year(), date.month() + 1)
            }
            .unwrap_or(first);
            (first, next)
        }
        RangeKind::Year => {
            let first = first_of_month(date.year(), 1).unwrap_or(date);
            let next = first_of_month(date.year() + 1, 1).unwrap_or(first);
            (first, next)
        }
    };
    CalendarRange {
        start: unix_midnight(start),
        end: unix_midnight(end),
    }
}

fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}
