//! Calendar windows computed in a caller-supplied time zone.
//!
//! Services pass `Local::now()`; tests pass fixed instants in fixed offsets.
//! Bounds are converted to UTC before they reach a query.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// Dashboard bucketing period.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    #[strum(to_string = "day", serialize = "daily")]
    Day,
    #[strum(to_string = "week", serialize = "weekly")]
    Week,
    #[strum(to_string = "month", serialize = "monthly")]
    Month,
    #[strum(to_string = "year", serialize = "yearly")]
    Year,
}

/// A UTC interval; the upper bound is inclusive only when `end_inclusive` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub end_inclusive: bool,
}

impl TimeRange {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start
            && if self.end_inclusive {
                instant <= self.end
            } else {
                instant < self.end
            }
    }
}

fn out_of_range(date: NaiveDate) -> ServiceError {
    ServiceError::ValidationError(format!("date out of range: {}", date))
}

/// First instant of `date` in `tz`. Skips forward an hour when midnight falls in a DST gap.
pub fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Result<DateTime<Utc>, ServiceError> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| out_of_range(date))
}

fn first_of_month(date: NaiveDate) -> Result<NaiveDate, ServiceError> {
    date.with_day(1).ok_or_else(|| out_of_range(date))
}

fn first_of_next_month(date: NaiveDate) -> Result<NaiveDate, ServiceError> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| out_of_range(date))
}

fn next_day(date: NaiveDate) -> Result<NaiveDate, ServiceError> {
    date.succ_opt().ok_or_else(|| out_of_range(date))
}

/// Window containing `now`:
/// day is `[midnight, 23:59:59.999]`, the others are half-open
/// (week from Sunday for 7 days, calendar month, calendar year).
pub fn window_bounds<Tz: TimeZone>(
    window: TimeWindow,
    now: &DateTime<Tz>,
) -> Result<TimeRange, ServiceError> {
    let tz = now.timezone();
    let today = now.date_naive();

    let range = match window {
        TimeWindow::Day => TimeRange {
            start: local_midnight(&tz, today)?,
            end: local_midnight(&tz, next_day(today)?)? - Duration::milliseconds(1),
            end_inclusive: true,
        },
        TimeWindow::Week => {
            let sunday = today - Duration::days(today.weekday().num_days_from_sunday() as i64);
            TimeRange {
                start: local_midnight(&tz, sunday)?,
                end: local_midnight(&tz, sunday + Duration::days(7))?,
                end_inclusive: false,
            }
        }
        TimeWindow::Month => TimeRange {
            start: local_midnight(&tz, first_of_month(today)?)?,
            end: local_midnight(&tz, first_of_next_month(today)?)?,
            end_inclusive: false,
        },
        TimeWindow::Year => {
            let jan1 = NaiveDate::from_ymd_opt(today.year(), 1, 1).ok_or_else(|| out_of_range(today))?;
            let next_jan1 =
                NaiveDate::from_ymd_opt(today.year() + 1, 1, 1).ok_or_else(|| out_of_range(today))?;
            TimeRange {
                start: local_midnight(&tz, jan1)?,
                end: local_midnight(&tz, next_jan1)?,
                end_inclusive: false,
            }
        }
    };
    Ok(range)
}

/// `[1st of date's month, upper]` where upper is `now` if `date` is today,
/// else the last instant of that month.
pub fn month_to_date_bounds<Tz: TimeZone>(
    date: NaiveDate,
    now: &DateTime<Tz>,
) -> Result<TimeRange, ServiceError> {
    let tz = now.timezone();
    let start = local_midnight(&tz, first_of_month(date)?)?;
    let end = if date == now.date_naive() {
        now.with_timezone(&Utc)
    } else {
        local_midnight(&tz, first_of_next_month(date)?)? - Duration::milliseconds(1)
    };
    Ok(TimeRange {
        start,
        end,
        end_inclusive: true,
    })
}

/// `[midnight of date, upper]` where upper is `now` if `date` is today,
/// else 23:59:59.999 of that date.
pub fn day_to_date_bounds<Tz: TimeZone>(
    date: NaiveDate,
    now: &DateTime<Tz>,
) -> Result<TimeRange, ServiceError> {
    let tz = now.timezone();
    let start = local_midnight(&tz, date)?;
    let end = if date == now.date_naive() {
        now.with_timezone(&Utc)
    } else {
        local_midnight(&tz, next_day(date)?)? - Duration::milliseconds(1)
    };
    Ok(TimeRange {
        start,
        end,
        end_inclusive: true,
    })
}
