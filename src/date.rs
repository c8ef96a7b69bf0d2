use std::fmt;
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime};

/// Earliest year a [`DateObject`] is clamped to
pub const MIN_YEAR: i32 = 100;

/// Latest year a [`DateObject`] is clamped to
pub const MAX_YEAR: i32 = 200_000;

/// Days per month in a common year, indexed by 0-based month
const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

const SECONDS_PER_DAY: i64 = 86_400;

pub fn is_leap(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in the given 0-based `month` of `year`.  Months past
/// December are treated as December.
pub fn days_in_month(year: i32, month: u8) -> u8 {
    let month = month.min(11);
    if month == 1 && is_leap(year) {
        29
    } else {
        DAYS_IN_MONTH[usize::from(month)]
    }
}

/// A wall-clock date and time with a 0-based month.
///
/// The derived ordering compares fields from year down to seconds, which is
/// chronological for any normalized value.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DateObject {
    pub year: i32,
    pub month: u8,
    pub date: u8,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl DateObject {
    /// Midnight on the given day
    pub const fn new(year: i32, month: u8, date: u8) -> DateObject {
        DateObject {
            year,
            month,
            date,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    pub const fn with_time(self, hours: u8, minutes: u8, seconds: u8) -> DateObject {
        DateObject {
            hours,
            minutes,
            seconds,
            ..self
        }
    }

    pub const fn date_only(self) -> DateObject {
        self.with_time(0, 0, 0)
    }

    /// Clamp every field into its valid range.
    ///
    /// Seconds and minutes past 59 reset to zero and carry one into the next
    /// unit; hours past 23 wrap to zero without advancing the day.  The year
    /// is clamped to [`MIN_YEAR`]`..=`[`MAX_YEAR`] and the day to the last
    /// day of the resulting month.
    pub fn normalize(self) -> DateObject {
        let mut d = self;
        d.year = d.year.clamp(MIN_YEAR, MAX_YEAR);
        d.month = d.month.min(11);
        if d.seconds > 59 {
            d.seconds = 0;
            d.minutes = d.minutes.saturating_add(1);
        }
        if d.minutes > 59 {
            d.minutes = 0;
            d.hours = d.hours.saturating_add(1);
        }
        if d.hours > 23 {
            d.hours = 0;
        }
        d.date = d.date.clamp(1, days_in_month(d.year, d.month));
        d
    }

    pub fn to_date(self) -> Option<Date> {
        let month = Month::try_from(self.month.checked_add(1)?).ok()?;
        Date::from_calendar_date(self.year, month, self.date).ok()
    }

    /// Seconds since an arbitrary fixed epoch, computed on the local
    /// calendar without any UTC offset.  Only useful for ordering and
    /// distance.
    pub fn timestamp(self) -> i64 {
        let d = self.normalize();
        let days = d.to_date().map_or(0, |date| i64::from(date.to_julian_day()));
        days * SECONDS_PER_DAY
            + i64::from(d.hours) * 3600
            + i64::from(d.minutes) * 60
            + i64::from(d.seconds)
    }

    /// Day of the week, counted from Sunday = 0
    pub fn weekday(self) -> u8 {
        self.normalize()
            .to_date()
            .map_or(0, |date| date.weekday().number_days_from_sunday())
    }

    /// Shift by whole days, keeping the time of day.  A shift past the
    /// representable range leaves the date unchanged.
    pub fn add_days(self, days: i64) -> DateObject {
        let d = self.normalize();
        let shift = days.checked_mul(SECONDS_PER_DAY).map(Duration::seconds);
        d.to_date()
            .zip(shift)
            .and_then(|(date, shift)| date.checked_add(shift))
            .map_or(d, |date| {
                DateObject::from(date).with_time(d.hours, d.minutes, d.seconds)
            })
    }

    /// Shift by whole months, clamping the day to the target month's length
    pub fn add_months(self, delta: i32) -> DateObject {
        let index = i64::from(self.year) * 12 + i64::from(self.month) + i64::from(delta);
        let year = i32::try_from(index.div_euclid(12)).unwrap_or(MAX_YEAR);
        let month = u8::try_from(index.rem_euclid(12)).unwrap_or(0);
        DateObject {
            year,
            month,
            date: self.date.min(days_in_month(year, month)),
            ..self
        }
    }

    pub fn add_years(self, delta: i32) -> DateObject {
        let year = self.year.saturating_add(delta);
        DateObject {
            year,
            date: self.date.min(days_in_month(year, self.month)),
            ..self
        }
    }
}

impl fmt::Display for DateObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year,
            u16::from(self.month) + 1,
            self.date,
            self.hours,
            self.minutes,
            self.seconds
        )
    }
}

impl From<Date> for DateObject {
    fn from(date: Date) -> DateObject {
        DateObject::new(date.year(), u8::from(date.month()) - 1, date.day())
    }
}

impl From<PrimitiveDateTime> for DateObject {
    fn from(dt: PrimitiveDateTime) -> DateObject {
        DateObject::from(dt.date()).with_time(dt.hour(), dt.minute(), dt.second())
    }
}

impl From<OffsetDateTime> for DateObject {
    fn from(dt: OffsetDateTime) -> DateObject {
        DateObject::from(dt.date()).with_time(dt.hour(), dt.minute(), dt.second())
    }
}

/// Source of "now" for every operation that defaults to the current time
pub trait Clock {
    fn now(&self) -> DateObject;

    fn today(&self) -> DateObject {
        self.now().date_only()
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> DateObject {
        (**self).now()
    }
}

/// The local system clock, falling back to UTC when the local offset cannot
/// be determined
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateObject {
        OffsetDateTime::now_local()
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
            .into()
    }
}

/// A clock that is always at the same instant
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FixedClock(pub DateObject);

impl Clock for FixedClock {
    fn now(&self) -> DateObject {
        self.0
    }
}
