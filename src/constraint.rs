use crate::config::{Callback, LaydateConfig, PickerType};
use crate::date::{Clock, DateObject};
use crate::format::{format, parse};
use crate::picker::View;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

pub type DisabledDateFn = Callback<dyn Fn(DateObject, View) -> bool>;
pub type DisabledTimeFn = Callback<dyn Fn(DateObject, View) -> Option<DisabledTime>>;
pub type MarkMap = HashMap<String, String>;

/// Gregorian festivals shown when `calendar` is on, keyed by 1-based month
/// and day
const FESTIVALS: [(u8, u8, &str); 13] = [
    (1, 1, "元旦"),
    (2, 14, "情人节"),
    (3, 8, "妇女节"),
    (3, 12, "植树节"),
    (4, 1, "愚人节"),
    (5, 1, "劳动节"),
    (5, 4, "青年节"),
    (6, 1, "儿童节"),
    (7, 1, "建党节"),
    (8, 1, "建军节"),
    (9, 10, "教师节"),
    (10, 1, "国庆节"),
    (12, 25, "圣诞节"),
];

pub fn festival(month: u8, day: u8) -> Option<&'static str> {
    FESTIVALS
        .iter()
        .find(|&&(m, d, _)| m == month && d == day)
        .map(|&(_, _, name)| name)
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TimeField {
    Hours,
    Minutes,
    Seconds,
}

impl TimeField {
    pub const ALL: [TimeField; 3] = [TimeField::Hours, TimeField::Minutes, TimeField::Seconds];

    pub fn max(self) -> u8 {
        match self {
            TimeField::Hours => 23,
            TimeField::Minutes | TimeField::Seconds => 59,
        }
    }

    pub fn get(self, date: &DateObject) -> u8 {
        match self {
            TimeField::Hours => date.hours,
            TimeField::Minutes => date.minutes,
            TimeField::Seconds => date.seconds,
        }
    }

    pub fn set(self, date: DateObject, value: u8) -> DateObject {
        match self {
            TimeField::Hours => DateObject {
                hours: value,
                ..date
            },
            TimeField::Minutes => DateObject {
                minutes: value,
                ..date
            },
            TimeField::Seconds => DateObject {
                seconds: value,
                ..date
            },
        }
    }
}

/// Per-column lists of forbidden time values returned by a `disabled_time`
/// hook.  Minutes are asked for given the hour, seconds given hour and
/// minute.
#[derive(Clone, Debug, Default)]
pub struct DisabledTime {
    pub hours: Option<Callback<dyn Fn() -> Vec<u8>>>,
    pub minutes: Option<Callback<dyn Fn(u8) -> Vec<u8>>>,
    pub seconds: Option<Callback<dyn Fn(u8, u8) -> Vec<u8>>>,
}

impl DisabledTime {
    pub fn with_hours<F: Fn() -> Vec<u8> + 'static>(mut self, f: F) -> Self {
        let f: Rc<dyn Fn() -> Vec<u8>> = Rc::new(f);
        self.hours = Some(Callback::from_rc(f));
        self
    }

    pub fn with_minutes<F: Fn(u8) -> Vec<u8> + 'static>(mut self, f: F) -> Self {
        let f: Rc<dyn Fn(u8) -> Vec<u8>> = Rc::new(f);
        self.minutes = Some(Callback::from_rc(f));
        self
    }

    pub fn with_seconds<F: Fn(u8, u8) -> Vec<u8> + 'static>(mut self, f: F) -> Self {
        let f: Rc<dyn Fn(u8, u8) -> Vec<u8>> = Rc::new(f);
        self.seconds = Some(Callback::from_rc(f));
        self
    }

    fn forbids(&self, field: TimeField, value: u8, context: &DateObject) -> bool {
        let list = match field {
            TimeField::Hours => self.hours.as_ref().map(|f| f()),
            TimeField::Minutes => self.minutes.as_ref().map(|f| f(context.hours)),
            TimeField::Seconds => self
                .seconds
                .as_ref()
                .map(|f| f(context.hours, context.minutes)),
        };
        list.is_some_and(|list| list.contains(&value))
    }
}

/// The day a mark is looked up for, with a 1-based month
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct MarkKeys {
    pub year: i32,
    pub month: u8,
    pub date: u8,
}

impl MarkKeys {
    pub fn new(year: i32, month0: u8, date: u8) -> MarkKeys {
        MarkKeys {
            year,
            month: month0 + 1,
            date,
        }
    }

    /// Look the day up in a mark map.  Exact dates win over annual `0-M-d`
    /// entries, which win over monthly `0-0-d` entries; each is tried
    /// unpadded first, then zero-padded.  Empty values do not count.
    pub fn lookup<'m>(&self, map: &'m MarkMap) -> Option<&'m str> {
        let MarkKeys { year, month, date } = *self;
        [
            format!("{year}-{month}-{date}"),
            format!("{year}-{month:02}-{date:02}"),
            format!("0-{month}-{date}"),
            format!("0-{month:02}-{date:02}"),
            format!("0-0-{date}"),
            format!("0-0-{date:02}"),
        ]
        .iter()
        .find_map(|key| map.get(key).filter(|v| !v.is_empty()))
        .map(String::as_str)
    }

    /// The day as `yyyy-M-d` and as `yyyy-MM-dd`
    fn holiday_keys(&self) -> [String; 2] {
        let MarkKeys { year, month, date } = *self;
        [
            format!("{year}-{month}-{date}"),
            format!("{year}-{month:02}-{date:02}"),
        ]
    }
}

#[derive(Clone, Debug)]
pub enum Mark {
    Map(MarkMap),
    Func(Callback<dyn Fn(&MarkKeys) -> Option<String>>),
}

impl Mark {
    pub fn map<I, K, V>(entries: I) -> Mark
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Mark::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn func<F: Fn(&MarkKeys) -> Option<String> + 'static>(f: F) -> Mark {
        let f: Rc<dyn Fn(&MarkKeys) -> Option<String>> = Rc::new(f);
        Mark::Func(Callback::from_rc(f))
    }

    pub fn resolve(&self, keys: &MarkKeys) -> Option<String> {
        match self {
            Mark::Map(map) => keys.lookup(map).map(str::to_owned),
            Mark::Func(f) => f(keys).filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HolidayTag {
    Rest,
    Work,
}

impl HolidayTag {
    pub fn symbol(self) -> &'static str {
        match self {
            HolidayTag::Rest => "休",
            HolidayTag::Work => "班",
        }
    }
}

/// Official rest days and make-up working days, as `yyyy-M-d` or
/// `yyyy-MM-dd` strings
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Holidays {
    pub rest: Vec<String>,
    pub work: Vec<String>,
}

impl Holidays {
    /// Rest days win over work days listed for the same date
    pub fn tag(&self, keys: &MarkKeys) -> Option<HolidayTag> {
        let keys = keys.holiday_keys();
        let listed = |list: &[String]| keys.iter().any(|key| list.contains(key));
        if listed(&self.rest) {
            Some(HolidayTag::Rest)
        } else if listed(&self.work) {
            Some(HolidayTag::Work)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DayStatus {
    pub disabled: bool,
    /// Mark text, or the festival name, or empty
    pub mark: String,
    pub holiday: Option<HolidayTag>,
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ConstraintError {
    #[error("{date} is outside the allowed range")]
    OutOfRange {
        date: DateObject,
        min: Option<String>,
        max: Option<String>,
    },
    #[error("{0} is disabled")]
    DisabledDate(DateObject),
    #[error("{field:?} value {value} is disabled")]
    DisabledTime { field: TimeField, value: u8 },
    #[error("range end {end} is before start {start}")]
    EndBeforeStart { start: DateObject, end: DateObject },
}

/// Resolved min/max plus the caller's predicates for one configuration
#[derive(Clone, Debug)]
pub struct Constraints<'a> {
    config: &'a LaydateConfig,
    min: Option<DateObject>,
    max: Option<DateObject>,
}

impl<'a> Constraints<'a> {
    pub fn new<C: Clock + ?Sized>(config: &'a LaydateConfig, clock: &C) -> Constraints<'a> {
        let pattern = config.date_format();
        Constraints {
            config,
            min: config.min.as_ref().map(|v| parse(v, pattern, clock)),
            max: config.max.as_ref().map(|v| parse(v, pattern, clock)),
        }
    }
}

impl Constraints<'_> {
    pub fn min(&self) -> Option<DateObject> {
        self.min
    }

    pub fn max(&self) -> Option<DateObject> {
        self.max
    }

    /// Whether a day can be picked.  Bounds are compared at day granularity.
    pub fn is_date_disabled(&self, year: i32, month: u8, date: u8) -> bool {
        let day = DateObject::new(year, month, date);
        let stamp = day.timestamp();
        if self.min.is_some_and(|min| stamp < min.date_only().timestamp())
            || self.max.is_some_and(|max| stamp > max.date_only().timestamp())
        {
            return true;
        }
        self.config
            .disabled_date
            .as_ref()
            .is_some_and(|disabled| disabled(day, View::Date))
    }

    pub fn day_status(&self, year: i32, month: u8, date: u8) -> DayStatus {
        let keys = MarkKeys::new(year, month, date);
        let mut mark = self
            .config
            .mark
            .as_ref()
            .and_then(|mark| mark.resolve(&keys))
            .unwrap_or_default();
        if mark.is_empty() && self.config.calendar {
            if let Some(name) = festival(keys.month, keys.date) {
                mark = name.to_owned();
            }
        }
        DayStatus {
            disabled: self.is_date_disabled(year, month, date),
            mark,
            holiday: self.config.holidays.as_ref().and_then(|h| h.tag(&keys)),
        }
    }

    /// Check a value about to be confirmed against min/max, at the
    /// granularity of the picker type: years for a year picker, months for
    /// a month picker, days for a date picker, time of day for a time
    /// picker, and seconds for a datetime picker.
    pub fn check_bounds(&self, date: &DateObject) -> Result<(), ConstraintError> {
        let kind = self.config.picker_type;
        let value = truncate(*date, kind).timestamp();
        let below = self
            .min
            .is_some_and(|min| value < truncate(min, kind).timestamp());
        let above = self
            .max
            .is_some_and(|max| value > truncate(max, kind).timestamp());
        if below || above {
            Err(ConstraintError::OutOfRange {
                date: *date,
                min: self.bound_text(self.min),
                max: self.bound_text(self.max),
            })
        } else {
            Ok(())
        }
    }

    pub fn check_range(&self, start: &DateObject, end: &DateObject) -> Result<(), ConstraintError> {
        self.check_bounds(start)?;
        self.check_bounds(end)?;
        if start.timestamp() > end.timestamp() {
            return Err(ConstraintError::EndBeforeStart {
                start: *start,
                end: *end,
            });
        }
        Ok(())
    }

    pub fn is_time_disabled(&self, field: TimeField, value: u8, context: &DateObject) -> bool {
        self.config
            .disabled_time
            .as_ref()
            .and_then(|hook| hook(*context, View::Time))
            .is_some_and(|limits| limits.forbids(field, value, context))
    }

    pub fn check_time(
        &self,
        field: TimeField,
        value: u8,
        context: &DateObject,
    ) -> Result<(), ConstraintError> {
        if value > field.max() || self.is_time_disabled(field, value, context) {
            Err(ConstraintError::DisabledTime { field, value })
        } else {
            Ok(())
        }
    }

    fn bound_text(&self, bound: Option<DateObject>) -> Option<String> {
        bound.map(|d| format(&d, self.config.date_format()))
    }
}

fn truncate(date: DateObject, kind: PickerType) -> DateObject {
    match kind {
        PickerType::Year => DateObject::new(date.year, 0, 1),
        PickerType::Month => DateObject::new(date.year, date.month, 1),
        PickerType::Date => date.date_only(),
        PickerType::Time => DateObject::new(1970, 0, 1).with_time(date.hours, date.minutes, date.seconds),
        PickerType::DateTime => date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::FixedClock;

    const NOW: FixedClock = FixedClock(DateObject::new(2024, 5, 15).with_time(9, 30, 0));

    #[test]
    fn test_mark_priority() {
        let mark = Mark::map([("2024-3-20", "v2"), ("0-3-20", "annual")]);
        assert_eq!(mark.resolve(&MarkKeys::new(2024, 2, 20)), Some(String::from("v2")));
        assert_eq!(
            mark.resolve(&MarkKeys::new(2025, 2, 20)),
            Some(String::from("annual"))
        );
        assert_eq!(mark.resolve(&MarkKeys::new(2024, 2, 21)), None);
    }

    #[test]
    fn test_mark_padded_and_monthly_keys() {
        let mark = Mark::map([("2024-03-05", "padded"), ("0-0-15", "payday"), ("0-0-16", "")]);
        assert_eq!(
            mark.resolve(&MarkKeys::new(2024, 2, 5)),
            Some(String::from("padded"))
        );
        assert_eq!(
            mark.resolve(&MarkKeys::new(1999, 7, 15)),
            Some(String::from("payday"))
        );
        assert_eq!(mark.resolve(&MarkKeys::new(1999, 7, 16)), None);
    }

    #[test]
    fn test_mark_func_gets_one_based_month() {
        let mark = Mark::func(|keys| (keys.month == 12 && keys.date == 31).then(|| String::from("eve")));
        assert_eq!(
            mark.resolve(&MarkKeys::new(2024, 11, 31)),
            Some(String::from("eve"))
        );
        assert_eq!(mark.resolve(&MarkKeys::new(2024, 10, 31)), None);
    }

    #[test]
    fn test_festival_only_when_unmarked() {
        let cfg = LaydateConfig::default()
            .with_calendar(true)
            .with_mark(Mark::map([("2024-1-1", "party")]));
        let constraints = Constraints::new(&cfg, &NOW);
        assert_eq!(constraints.day_status(2024, 0, 1).mark, "party");
        assert_eq!(constraints.day_status(2025, 0, 1).mark, "元旦");
        assert_eq!(constraints.day_status(2025, 11, 25).mark, "圣诞节");
        let cfg = LaydateConfig::default();
        assert_eq!(Constraints::new(&cfg, &NOW).day_status(2025, 0, 1).mark, "");
    }

    #[test]
    fn test_holiday_rest_wins() {
        let cfg = LaydateConfig::default().with_holidays(Holidays {
            rest: vec![String::from("2024-10-1"), String::from("2024-10-7")],
            work: vec![String::from("2024-10-7"), String::from("2024-10-12")],
        });
        let constraints = Constraints::new(&cfg, &NOW);
        assert_eq!(constraints.day_status(2024, 9, 1).holiday, Some(HolidayTag::Rest));
        assert_eq!(constraints.day_status(2024, 9, 7).holiday, Some(HolidayTag::Rest));
        assert_eq!(constraints.day_status(2024, 9, 12).holiday, Some(HolidayTag::Work));
        assert_eq!(constraints.day_status(2024, 9, 13).holiday, None);
        assert_eq!(HolidayTag::Work.symbol(), "班");
    }

    #[test]
    fn test_holiday_zero_padded_keys() {
        let cfg = LaydateConfig::default().with_holidays(Holidays {
            rest: vec![String::from("2024-10-01"), String::from("2024-10-07")],
            work: vec![String::from("2024-09-29"), String::from("2024-10-7")],
        });
        let constraints = Constraints::new(&cfg, &NOW);
        assert_eq!(constraints.day_status(2024, 9, 1).holiday, Some(HolidayTag::Rest));
        assert_eq!(constraints.day_status(2024, 8, 29).holiday, Some(HolidayTag::Work));
        assert_eq!(constraints.day_status(2024, 9, 7).holiday, Some(HolidayTag::Rest));
        assert_eq!(constraints.day_status(2024, 9, 10).holiday, None);
    }

    #[test]
    fn test_bounds_are_date_only_on_cells() {
        let cfg = LaydateConfig::default()
            .with_min("2024-02-01 12:00:00")
            .with_max("2024-02-10");
        let constraints = Constraints::new(&cfg, &NOW);
        assert!(constraints.is_date_disabled(2024, 0, 31));
        assert!(!constraints.is_date_disabled(2024, 1, 1));
        assert!(!constraints.is_date_disabled(2024, 1, 10));
        assert!(constraints.is_date_disabled(2024, 1, 11));
    }

    #[test]
    fn test_disabled_date_predicate() {
        let cfg = LaydateConfig::default().with_disabled_date(|d, view| {
            assert_eq!(view, View::Date, "days are checked in the date view");
            d.weekday() == 0
        });
        let constraints = Constraints::new(&cfg, &NOW);
        assert!(constraints.day_status(2024, 5, 16).disabled);
        assert!(!constraints.day_status(2024, 5, 17).disabled);
    }

    #[test]
    fn test_check_bounds_by_granularity() {
        let cfg = LaydateConfig::default().with_min("2024-02-01").with_max("2024-02-10");
        let constraints = Constraints::new(&cfg, &NOW);
        assert!(constraints
            .check_bounds(&DateObject::new(2024, 1, 10).with_time(18, 0, 0))
            .is_ok());
        assert_eq!(
            constraints.check_bounds(&DateObject::new(2024, 0, 15)),
            Err(ConstraintError::OutOfRange {
                date: DateObject::new(2024, 0, 15),
                min: Some(String::from("2024-02-01")),
                max: Some(String::from("2024-02-10")),
            })
        );

        let cfg = LaydateConfig::new(PickerType::Year).with_min("2024");
        let constraints = Constraints::new(&cfg, &NOW);
        assert!(constraints.check_bounds(&DateObject::new(2024, 6, 1)).is_ok());
        assert!(constraints.check_bounds(&DateObject::new(2023, 11, 31)).is_err());

        let cfg = LaydateConfig::new(PickerType::Time).with_max("18:00:00");
        let constraints = Constraints::new(&cfg, &NOW);
        assert!(constraints
            .check_bounds(&DateObject::new(2030, 0, 1).with_time(17, 59, 59))
            .is_ok());
        assert!(constraints
            .check_bounds(&DateObject::new(2000, 0, 1).with_time(18, 0, 1))
            .is_err());
    }

    #[test]
    fn test_check_range_order() {
        let cfg = LaydateConfig::default();
        let constraints = Constraints::new(&cfg, &NOW);
        let a = DateObject::new(2024, 5, 1);
        let b = DateObject::new(2024, 5, 10);
        assert!(constraints.check_range(&a, &b).is_ok());
        assert_eq!(
            constraints.check_range(&b, &a),
            Err(ConstraintError::EndBeforeStart { start: b, end: a })
        );
    }

    #[test]
    fn test_time_disabled_uses_context() {
        let cfg = LaydateConfig::new(PickerType::Time).with_disabled_time(|_, view| {
            assert_eq!(view, View::Time, "times are checked in the time view");
            Some(
                DisabledTime::default()
                    .with_hours(|| vec![0, 1, 2])
                    .with_minutes(|h| if h == 12 { vec![30] } else { Vec::new() })
                    .with_seconds(|h, m| if (h, m) == (12, 0) { vec![0] } else { Vec::new() }),
            )
        });
        let constraints = Constraints::new(&cfg, &NOW);
        let noon = DateObject::new(2024, 5, 15).with_time(12, 0, 0);
        let one = DateObject::new(2024, 5, 15).with_time(13, 0, 0);
        assert!(constraints.is_time_disabled(TimeField::Hours, 1, &noon));
        assert!(!constraints.is_time_disabled(TimeField::Hours, 3, &noon));
        assert!(constraints.is_time_disabled(TimeField::Minutes, 30, &noon));
        assert!(!constraints.is_time_disabled(TimeField::Minutes, 30, &one));
        assert!(constraints.is_time_disabled(TimeField::Seconds, 0, &noon));
        assert!(!constraints.is_time_disabled(TimeField::Seconds, 0, &one));
        assert_eq!(
            constraints.check_time(TimeField::Minutes, 60, &one),
            Err(ConstraintError::DisabledTime {
                field: TimeField::Minutes,
                value: 60
            })
        );
    }
}
