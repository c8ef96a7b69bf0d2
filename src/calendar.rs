use crate::config::{Callback, LaydateConfig};
use crate::constraint::{Constraints, HolidayTag};
use crate::date::{days_in_month, Clock, DateObject};
use crate::i18n::I18n;
use std::ops::Index;
use std::slice;

pub const DAYS_IN_WEEK: usize = 7;

/// Cells in every month grid: six full weeks
pub const GRID_CELLS: usize = 42;

/// Years shown on one page of the year view
pub const YEAR_PAGE_LEN: usize = 15;

/// Which month a grid cell belongs to, relative to the month on display
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DayKind {
    Prev,
    Current,
    Next,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CalendarDay {
    pub kind: DayKind,
    pub year: i32,
    /// 0-based
    pub month: u8,
    pub day: u8,
    pub disabled: bool,
    pub mark: String,
    pub holiday: Option<HolidayTag>,
    /// Whatever the `cell_render` hook set for this cell
    pub custom_content: Option<String>,
}

impl CalendarDay {
    pub fn date(&self) -> DateObject {
        DateObject::new(self.year, self.month, self.day)
    }

    pub fn is_current_month(&self) -> bool {
        self.kind == DayKind::Current
    }
}

/// The day handed to a `cell_render` hook, with a 1-based month
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct CellDate {
    pub year: i32,
    pub month: u8,
    pub date: u8,
}

/// Custom cell content a `cell_render` hook may fill in
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CellContent(Option<String>);

impl CellContent {
    pub fn set<S: Into<String>>(&mut self, content: S) {
        self.0 = Some(content.into());
    }

    pub fn get(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

pub type CellRenderFn = Callback<dyn Fn(CellDate, &mut CellContent)>;

/// Six weeks of days covering one month, padded with the tail of the
/// previous month and the head of the next
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CalendarGrid {
    year: i32,
    month: u8,
    days: Vec<CalendarDay>,
}

impl CalendarGrid {
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, CalendarDay> {
        self.days.iter()
    }

    pub fn rows(&self) -> slice::Chunks<'_, CalendarDay> {
        self.days.chunks(DAYS_IN_WEEK)
    }

    /// Index of the cell showing `date` as a day of the displayed month
    pub fn position(&self, date: &DateObject) -> Option<usize> {
        self.days.iter().position(|d| {
            d.is_current_month() && d.year == date.year && d.month == date.month && d.day == date.date
        })
    }
}

impl Index<usize> for CalendarGrid {
    type Output = CalendarDay;

    fn index(&self, i: usize) -> &CalendarDay {
        &self.days[i]
    }
}

impl<'a> IntoIterator for &'a CalendarGrid {
    type Item = &'a CalendarDay;
    type IntoIter = slice::Iter<'a, CalendarDay>;

    fn into_iter(self) -> slice::Iter<'a, CalendarDay> {
        self.days.iter()
    }
}

#[derive(Clone, Debug)]
pub struct GridBuilder<'a> {
    constraints: Constraints<'a>,
    week_start: u8,
    cell_render: Option<&'a CellRenderFn>,
}

impl<'a> GridBuilder<'a> {
    pub fn new<C: Clock + ?Sized>(config: &'a LaydateConfig, clock: &C) -> GridBuilder<'a> {
        GridBuilder {
            constraints: Constraints::new(config, clock),
            week_start: config.week_start(),
            cell_render: config.cell_render.as_ref(),
        }
    }
}

impl GridBuilder<'_> {
    /// Build the grid for the 0-based `month` of `year`
    pub fn build(&self, year: i32, month: u8) -> CalendarGrid {
        let month = month.min(11);
        let first = DateObject::new(year, month, 1);
        let leading = (first.weekday() + 7 - self.week_start) % 7;
        let prev = first.add_months(-1);
        let next = first.add_months(1);
        let prev_len = days_in_month(prev.year, prev.month);
        let mut days = Vec::with_capacity(GRID_CELLS);
        for day in (prev_len - leading + 1)..=prev_len {
            days.push(self.cell(DayKind::Prev, prev.year, prev.month, day));
        }
        for day in 1..=days_in_month(year, month) {
            days.push(self.cell(DayKind::Current, year, month, day));
        }
        let mut day = 1;
        while days.len() < GRID_CELLS {
            days.push(self.cell(DayKind::Next, next.year, next.month, day));
            day += 1;
        }
        CalendarGrid { year, month, days }
    }

    fn cell(&self, kind: DayKind, year: i32, month: u8, day: u8) -> CalendarDay {
        let status = self.constraints.day_status(year, month, day);
        let custom_content = self.cell_render.and_then(|render| {
            let mut content = CellContent::default();
            render(
                CellDate {
                    year,
                    month: month + 1,
                    date: day,
                },
                &mut content,
            );
            content.0
        });
        CalendarDay {
            kind,
            year,
            month,
            day,
            disabled: status.disabled,
            mark: status.mark,
            holiday: status.holiday,
            custom_content,
        }
    }
}

/// The fifteen consecutive years of a year-view page centred on `center`
pub fn year_page(center: i32) -> Vec<i32> {
    (center - 7..center + 8).collect()
}

/// Header text for a year page, e.g. "2017年 - 2031年"
pub fn year_page_label(years: &[i32], i18n: &I18n) -> String {
    match (years.first(), years.last()) {
        (Some(&first), Some(&last)) => {
            format!("{} - {}", i18n.format_year(first), i18n.format_year(last))
        }
        _ => String::new(),
    }
}
