use crate::config::Callback;
use crate::date::{Clock, DateObject};
use crate::format::{parse, DateInput};
use std::rc::Rc;

/// A labelled preset value offered next to the calendar
#[derive(Clone, Debug)]
pub struct Shortcut {
    pub text: String,
    pub value: ShortcutValue,
}

/// What a shortcut resolves to.
///
/// Text may be one of the keywords `now`, `today`, `yesterday`,
/// `tomorrow`, `last_month` and `next_month`, or in range mode
/// `last_7_days`, `last_30_days`, `last_90_days`, `last_year_now` and
/// `next_year_today`; any other text is parsed like a configured value.
#[derive(Clone, Debug)]
pub enum ShortcutValue {
    Input(DateInput),
    Producer(Callback<dyn Fn() -> ShortcutValue>),
    Pair(Box<ShortcutValue>, Box<ShortcutValue>),
}

impl ShortcutValue {
    pub fn text<S: Into<String>>(s: S) -> ShortcutValue {
        ShortcutValue::Input(DateInput::Text(s.into()))
    }

    pub fn producer<F: Fn() -> ShortcutValue + 'static>(f: F) -> ShortcutValue {
        let f: Rc<dyn Fn() -> ShortcutValue> = Rc::new(f);
        ShortcutValue::Producer(Callback::from_rc(f))
    }

    pub fn pair<A: Into<ShortcutValue>, B: Into<ShortcutValue>>(start: A, end: B) -> ShortcutValue {
        ShortcutValue::Pair(Box::new(start.into()), Box::new(end.into()))
    }

    /// Work out the date or, when `range` is on, the ordered pair of dates
    /// this value stands for.  A producer is invoked once.
    pub fn resolve<C: Clock + ?Sized>(&self, range: bool, pattern: &str, clock: &C) -> Resolved {
        let produced;
        let value = match self {
            ShortcutValue::Producer(f) => {
                produced = f();
                &produced
            }
            other => other,
        };
        if range {
            let pair = match value {
                ShortcutValue::Pair(start, end) => Some((
                    start.single(pattern, clock),
                    end.single(pattern, clock),
                )),
                ShortcutValue::Input(DateInput::Text(name)) => range_keyword(name, clock),
                _ => None,
            };
            if let Some((start, end)) = pair {
                return if start.timestamp() > end.timestamp() {
                    Resolved::Range(end, start)
                } else {
                    Resolved::Range(start, end)
                };
            }
        }
        Resolved::Single(value.single(pattern, clock))
    }

    fn single<C: Clock + ?Sized>(&self, pattern: &str, clock: &C) -> DateObject {
        match self {
            ShortcutValue::Input(input @ DateInput::Text(name)) => {
                keyword(name, clock).unwrap_or_else(|| parse(input, pattern, clock))
            }
            ShortcutValue::Input(input) => parse(input, pattern, clock),
            ShortcutValue::Producer(f) => match f() {
                ShortcutValue::Input(input) => ShortcutValue::Input(input).single(pattern, clock),
                _ => clock.now(),
            },
            ShortcutValue::Pair(..) => clock.now(),
        }
    }
}

impl From<&str> for ShortcutValue {
    fn from(s: &str) -> ShortcutValue {
        ShortcutValue::text(s)
    }
}

impl From<DateObject> for ShortcutValue {
    fn from(date: DateObject) -> ShortcutValue {
        ShortcutValue::Input(DateInput::Date(date))
    }
}

impl From<DateInput> for ShortcutValue {
    fn from(input: DateInput) -> ShortcutValue {
        ShortcutValue::Input(input)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Resolved {
    Single(DateObject),
    Range(DateObject, DateObject),
}

fn keyword<C: Clock + ?Sized>(name: &str, clock: &C) -> Option<DateObject> {
    let now = clock.now();
    let today = now.date_only();
    let first = DateObject::new(now.year, now.month, 1);
    match name {
        "now" | "today" => Some(now),
        "yesterday" => Some(today.add_days(-1)),
        "tomorrow" => Some(today.add_days(1)),
        "last_month" => Some(first.add_months(-1)),
        "next_month" => Some(first.add_months(1)),
        _ => None,
    }
}

fn range_keyword<C: Clock + ?Sized>(name: &str, clock: &C) -> Option<(DateObject, DateObject)> {
    let now = clock.now();
    match name {
        "last_7_days" => Some((now.add_days(-7), now)),
        "last_30_days" => Some((now.add_days(-30), now)),
        "last_90_days" => Some((now.add_days(-90), now)),
        "last_year_now" => Some((now.date_only().add_years(-1), now)),
        "next_year_today" => Some((now, now.date_only().add_years(1))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::FixedClock;

    const NOW: DateObject = DateObject::new(2024, 5, 15).with_time(9, 30, 0);
    const CLOCK: FixedClock = FixedClock(NOW);

    fn single(value: ShortcutValue) -> Resolved {
        value.resolve(false, "yyyy-MM-dd", &CLOCK)
    }

    fn range(value: ShortcutValue) -> Resolved {
        value.resolve(true, "yyyy-MM-dd", &CLOCK)
    }

    #[test]
    fn test_single_keywords() {
        assert_eq!(single("today".into()), Resolved::Single(NOW));
        assert_eq!(
            single("yesterday".into()),
            Resolved::Single(DateObject::new(2024, 5, 14))
        );
        assert_eq!(
            single("tomorrow".into()),
            Resolved::Single(DateObject::new(2024, 5, 16))
        );
        assert_eq!(
            single("last_month".into()),
            Resolved::Single(DateObject::new(2024, 4, 1))
        );
        assert_eq!(
            single("next_month".into()),
            Resolved::Single(DateObject::new(2024, 6, 1))
        );
        assert_eq!(
            single("2020-02-02".into()),
            Resolved::Single(DateObject::new(2020, 1, 2))
        );
    }

    #[test]
    fn test_last_7_days() {
        assert_eq!(
            range("last_7_days".into()),
            Resolved::Range(DateObject::new(2024, 5, 8).with_time(9, 30, 0), NOW)
        );
        assert_eq!(
            range("next_year_today".into()),
            Resolved::Range(NOW, DateObject::new(2025, 5, 15))
        );
    }

    #[test]
    fn test_range_keyword_outside_range_mode() {
        assert_eq!(single("last_7_days".into()), Resolved::Single(NOW));
    }

    #[test]
    fn test_pair_is_ordered() {
        let value = ShortcutValue::pair("2024-06-10", "yesterday");
        assert_eq!(
            range(value),
            Resolved::Range(DateObject::new(2024, 5, 10), DateObject::new(2024, 5, 14))
        );
        let value = ShortcutValue::pair("tomorrow", DateObject::new(2024, 0, 1));
        assert_eq!(
            range(value),
            Resolved::Range(DateObject::new(2024, 0, 1), DateObject::new(2024, 5, 16))
        );
    }

    #[test]
    fn test_producer_invoked() {
        let value = ShortcutValue::producer(|| ShortcutValue::pair("2024-01-01", "2024-01-31"));
        assert_eq!(
            range(value),
            Resolved::Range(DateObject::new(2024, 0, 1), DateObject::new(2024, 0, 31))
        );
        let value = ShortcutValue::producer(|| DateObject::new(2023, 3, 3).into());
        assert_eq!(single(value), Resolved::Single(DateObject::new(2023, 3, 3)));
    }
}
