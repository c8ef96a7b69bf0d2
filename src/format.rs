use crate::date::{Clock, DateObject};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

pub const DEFAULT_FORMAT: &str = "yyyy-MM-dd";

static FULL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})[-/](\d{1,2})[-/](\d{1,2})(?:[ T](\d{1,2}):(\d{1,2})(?::(\d{1,2}))?)?")
        .expect("full date pattern should compile")
});

static YEAR_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})[-/](\d{1,2})$").expect("year-month pattern should compile")
});

static YEAR_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})$").expect("year pattern should compile"));

static TIME_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{1,2})(?::(\d{1,2}))?$").expect("time pattern should compile")
});

/// A value a caller may hand in wherever a date is expected: a string to
/// parse, a ready-made date, or a number of days relative to today
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DateInput {
    Text(String),
    Date(DateObject),
    Offset(i64),
}

impl From<&str> for DateInput {
    fn from(s: &str) -> DateInput {
        DateInput::Text(s.to_owned())
    }
}

impl From<String> for DateInput {
    fn from(s: String) -> DateInput {
        DateInput::Text(s)
    }
}

impl From<DateObject> for DateInput {
    fn from(date: DateObject) -> DateInput {
        DateInput::Date(date)
    }
}

impl From<time::Date> for DateInput {
    fn from(date: time::Date) -> DateInput {
        DateInput::Date(date.into())
    }
}

impl From<i64> for DateInput {
    fn from(days: i64) -> DateInput {
        DateInput::Offset(days)
    }
}

impl fmt::Display for DateInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateInput::Text(s) => write!(f, "{s}"),
            DateInput::Date(d) if d.date_only() == *d => write!(f, "{}", format(d, DEFAULT_FORMAT)),
            DateInput::Date(d) => write!(f, "{d}"),
            DateInput::Offset(days) => write!(f, "{days}"),
        }
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ParseError {
    #[error("empty date string")]
    Empty,
    #[error("unrecognized date string: {0:?}")]
    Unrecognized(String),
    #[error("{field} value {value} out of range in {input:?}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        input: String,
    },
}

/// Render `date` according to `pattern`.
///
/// The letters `y`, `M`, `d`, `H`, `m` and `s` stand for year, month,
/// day, hours, minutes and seconds.  A doubled letter (`yyyy` for the year)
/// is zero-padded to its canonical width and a single letter is written
/// unpadded.  Runs are consumed longest token first, so `yyyyy` is a padded
/// year followed by an unpadded one.  All other characters are copied
/// through untouched.
pub fn format(date: &DateObject, pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 4);
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        let Some((value, width)) = token_value(c, date) else {
            out.push(c);
            continue;
        };
        let mut run = 1;
        while chars.next_if_eq(&c).is_some() {
            run += 1;
        }
        let long = format!("{value:0width$}");
        let short = value.to_string();
        out.push_str(&long.repeat(run / width));
        out.push_str(&short.repeat(run % width));
    }
    out
}

/// Zero-padded width of a format letter, or `None` for literal characters
fn token_width(letter: char) -> Option<usize> {
    match letter {
        'y' => Some(4),
        'M' | 'd' | 'H' | 'm' | 's' => Some(2),
        _ => None,
    }
}

fn token_value(letter: char, date: &DateObject) -> Option<(i64, usize)> {
    let value = match letter {
        'y' => i64::from(date.year),
        'M' => i64::from(date.month) + 1,
        'd' => i64::from(date.date),
        'H' => i64::from(date.hours),
        'm' => i64::from(date.minutes),
        's' => i64::from(date.seconds),
        _ => return None,
    };
    Some((value, token_width(letter)?))
}

/// Parse `input` without falling back to the current time.
///
/// Strings are tried against, in order: `yyyy-M-d` (either `-` or `/`,
/// optionally followed by ` H:m[:s]`, trailing text ignored), `yyyy-M`,
/// `yyyy`, a bare `H:m[:s]` on 1970-01-01, and finally `pattern` itself.
pub fn try_parse<C: Clock + ?Sized>(
    input: &DateInput,
    pattern: &str,
    clock: &C,
) -> Result<DateObject, ParseError> {
    match input {
        DateInput::Date(d) => Ok(d.normalize()),
        DateInput::Offset(days) => Ok(clock.now().add_days(*days)),
        DateInput::Text(s) => parse_text(s.trim(), pattern),
    }
}

/// Parse `input`, degrading to `clock.now()` when it cannot be understood
pub fn parse<C: Clock + ?Sized>(input: &DateInput, pattern: &str, clock: &C) -> DateObject {
    try_parse(input, pattern, clock).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "falling back to the current time");
        clock.now()
    })
}

fn parse_text(s: &str, pattern: &str) -> Result<DateObject, ParseError> {
    if s.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut fields = Fields::new(s);
    if let Some(caps) = FULL_DATE.captures(s) {
        fields.year = capture(&caps, 1);
        fields.month = capture(&caps, 2);
        fields.date = capture(&caps, 3);
        fields.hours = capture(&caps, 4);
        fields.minutes = capture(&caps, 5);
        fields.seconds = capture(&caps, 6);
    } else if let Some(caps) = YEAR_MONTH.captures(s) {
        fields.year = capture(&caps, 1);
        fields.month = capture(&caps, 2);
    } else if let Some(caps) = YEAR_ONLY.captures(s) {
        fields.year = capture(&caps, 1);
    } else if let Some(caps) = TIME_ONLY.captures(s) {
        fields.year = Some(1970);
        fields.hours = capture(&caps, 1);
        fields.minutes = capture(&caps, 2);
        fields.seconds = capture(&caps, 3);
    } else if !parse_with_pattern(s, pattern, &mut fields) {
        return Err(ParseError::Unrecognized(s.to_owned()));
    }
    fields.build()
}

fn capture(caps: &regex::Captures<'_>, i: usize) -> Option<u32> {
    caps.get(i).and_then(|m| m.as_str().parse().ok())
}

/// Match `s` in full against the shape described by a format pattern
fn parse_with_pattern(s: &str, pattern: &str, fields: &mut Fields<'_>) -> bool {
    let mut re = String::from("^");
    let mut slots = Vec::new();
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        let Some(width) = token_width(c) else {
            re.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
            continue;
        };
        let mut run = 1;
        while chars.next_if_eq(&c).is_some() {
            run += 1;
        }
        if run >= width {
            re.push_str(&format!(r"(\d{{{width}}})"));
        } else {
            re.push_str(&format!(r"(\d{{1,{width}}})"));
        }
        slots.push(c);
    }
    re.push('$');
    let Ok(re) = Regex::new(&re) else {
        return false;
    };
    let Some(caps) = re.captures(s) else {
        return false;
    };
    if slots.is_empty() {
        return false;
    }
    for (i, letter) in slots.into_iter().enumerate() {
        let value = capture(&caps, i + 1);
        match letter {
            'y' => fields.year = value,
            'M' => fields.month = value,
            'd' => fields.date = value,
            'H' => fields.hours = value,
            'm' => fields.minutes = value,
            _ => fields.seconds = value,
        }
    }
    fields.year.is_some() || fields.hours.is_some()
}

/// Raw numeric fields pulled out of a string, 1-based month
#[derive(Clone, Debug, Eq, PartialEq)]
struct Fields<'a> {
    input: &'a str,
    year: Option<u32>,
    month: Option<u32>,
    date: Option<u32>,
    hours: Option<u32>,
    minutes: Option<u32>,
    seconds: Option<u32>,
}

impl<'a> Fields<'a> {
    fn new(input: &'a str) -> Self {
        Fields {
            input,
            year: None,
            month: None,
            date: None,
            hours: None,
            minutes: None,
            seconds: None,
        }
    }

    fn check(
        &self,
        field: &'static str,
        value: Option<u32>,
        min: u32,
        max: u32,
        default: u32,
    ) -> Result<u8, ParseError> {
        let value = value.unwrap_or(default);
        if (min..=max).contains(&value) {
            Ok(u8::try_from(value).unwrap_or(u8::MAX))
        } else {
            Err(ParseError::OutOfRange {
                field,
                value,
                input: self.input.to_owned(),
            })
        }
    }

    fn build(self) -> Result<DateObject, ParseError> {
        let year = self
            .year
            .and_then(|y| i32::try_from(y).ok())
            .unwrap_or(1970);
        let month = self.check("month", self.month, 1, 12, 1)?;
        let date = self.check("day", self.date, 1, 31, 1)?;
        let hours = self.check("hours", self.hours, 0, 23, 0)?;
        let minutes = self.check("minutes", self.minutes, 0, 59, 0)?;
        let seconds = self.check("seconds", self.seconds, 0, 59, 0)?;
        Ok(DateObject::new(year, month - 1, date)
            .with_time(hours, minutes, seconds)
            .normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::FixedClock;

    const NOW: DateObject = DateObject::new(2024, 5, 15).with_time(9, 30, 0);

    fn text(s: &str) -> Result<DateObject, ParseError> {
        try_parse(&DateInput::from(s), DEFAULT_FORMAT, &FixedClock(NOW))
    }

    #[test]
    fn test_format_padded_and_unpadded() {
        let d = DateObject::new(2024, 2, 5).with_time(7, 8, 9);
        assert_eq!(format(&d, "yyyy-MM-dd HH:mm:ss"), "2024-03-05 07:08:09");
        assert_eq!(format(&d, "y-M-d H:m:s"), "2024-3-5 7:8:9");
        assert_eq!(format(&d, "yyyy年M月d日"), "2024年3月5日");
        assert_eq!(format(&d, "dd.MM.yyyy"), "05.03.2024");
    }

    #[test]
    fn test_format_longest_token_first() {
        let d = DateObject::new(2024, 10, 25);
        assert_eq!(format(&d, "yy"), "20242024");
        assert_eq!(format(&d, "yyyyy"), "20242024");
        assert_eq!(format(&d, "MMM"), "1111");
        assert_eq!(format(&d, "Mon"), "11on");
    }

    #[test]
    fn test_format_does_not_touch_substituted_text() {
        let d = DateObject::new(2024, 0, 1).with_time(13, 4, 0);
        assert_eq!(format(&d, "[yyyy] HH:mm"), "[2024] 13:04");
    }

    #[test]
    fn test_round_trip_canonical_pattern() {
        for d in [
            DateObject::new(2024, 1, 29),
            DateObject::new(1999, 11, 31),
            DateObject::new(2023, 0, 1),
            DateObject::new(100, 5, 9),
        ] {
            let s = format(&d, DEFAULT_FORMAT);
            assert_eq!(
                parse(&DateInput::from(s.as_str()), DEFAULT_FORMAT, &FixedClock(NOW)),
                d
            );
        }
    }

    #[test]
    fn test_parse_full_date_shapes() {
        assert_eq!(text("2024/3/5"), Ok(DateObject::new(2024, 2, 5)));
        assert_eq!(text("2024-03-05"), Ok(DateObject::new(2024, 2, 5)));
        assert_eq!(
            text("2024-01-05 10:20:30"),
            Ok(DateObject::new(2024, 0, 5).with_time(10, 20, 30))
        );
        assert_eq!(
            text("2024-01-05T10:20"),
            Ok(DateObject::new(2024, 0, 5).with_time(10, 20, 0))
        );
        assert_eq!(text("2023-02-30"), Ok(DateObject::new(2023, 1, 28)));
    }

    #[test]
    fn test_parse_partial_shapes() {
        assert_eq!(text("2024-07"), Ok(DateObject::new(2024, 6, 1)));
        assert_eq!(text("2024/12"), Ok(DateObject::new(2024, 11, 1)));
        assert_eq!(text("2024"), Ok(DateObject::new(2024, 0, 1)));
        assert_eq!(
            text("9:05"),
            Ok(DateObject::new(1970, 0, 1).with_time(9, 5, 0))
        );
        assert_eq!(
            text("23:59:58"),
            Ok(DateObject::new(1970, 0, 1).with_time(23, 59, 58))
        );
    }

    #[test]
    fn test_parse_with_caller_pattern() {
        let clock = FixedClock(NOW);
        assert_eq!(
            try_parse(&DateInput::from("05.03.2024"), "dd.MM.yyyy", &clock),
            Ok(DateObject::new(2024, 2, 5))
        );
        assert_eq!(
            try_parse(&DateInput::from("5/3/2024 7:08"), "d/M/yyyy H:mm", &clock),
            Ok(DateObject::new(2024, 2, 5).with_time(7, 8, 0))
        );
        assert!(try_parse(&DateInput::from("05.03.2024x"), "dd.MM.yyyy", &clock).is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert_eq!(
            text("2024-13-01"),
            Err(ParseError::OutOfRange {
                field: "month",
                value: 13,
                input: String::from("2024-13-01"),
            })
        );
        assert!(text("25:00").is_err());
        assert!(text("2024-01-00").is_err());
    }

    #[test]
    fn test_parse_falls_back_to_now() {
        let clock = FixedClock(NOW);
        assert_eq!(text("not a date"), Err(ParseError::Unrecognized(String::from("not a date"))));
        assert_eq!(text("   "), Err(ParseError::Empty));
        assert_eq!(parse(&DateInput::from("garbage"), DEFAULT_FORMAT, &clock), NOW);
        assert_eq!(parse(&DateInput::from(""), DEFAULT_FORMAT, &clock), NOW);
    }

    #[test]
    fn test_parse_day_offset() {
        let clock = FixedClock(NOW);
        assert_eq!(
            parse(&DateInput::Offset(-7), DEFAULT_FORMAT, &clock),
            DateObject::new(2024, 5, 8).with_time(9, 30, 0)
        );
        assert_eq!(
            parse(&DateInput::Offset(20), DEFAULT_FORMAT, &clock),
            DateObject::new(2024, 6, 5).with_time(9, 30, 0)
        );
        assert_eq!(parse(&DateInput::Offset(i64::MAX), DEFAULT_FORMAT, &clock), NOW);
        assert_eq!(parse(&DateInput::Offset(i64::MIN / 1000), DEFAULT_FORMAT, &clock), NOW);
    }

    #[test]
    fn test_parse_date_passes_through() {
        let d = DateObject::new(2024, 1, 31);
        assert_eq!(
            parse(&DateInput::Date(d), DEFAULT_FORMAT, &FixedClock(NOW)),
            DateObject::new(2024, 1, 29)
        );
    }

    #[test]
    fn test_display_input() {
        assert_eq!(DateInput::from("2024-1-1").to_string(), "2024-1-1");
        assert_eq!(DateInput::Date(DateObject::new(2024, 0, 9)).to_string(), "2024-01-09");
        assert_eq!(DateInput::Offset(-7).to_string(), "-7");
    }
}
