use super::theme::{
    Palette, BASE_STYLE, DISABLED_STYLE, HEADER_STYLE, MARK_STYLE, OTHER_MONTH_STYLE,
    WEEKDAY_STYLE,
};
use laydate::calendar::{CalendarDay, DAYS_IN_WEEK};
use laydate::{Clock, Panel, Picker, TimeField, View};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Text,
    widgets::{Paragraph, StatefulWidget, Widget},
};
use std::iter::zip;

/// Number of columns per day, wide enough for the brackets around the
/// focused day
const DAY_WIDTH: u16 = 4;

pub(crate) const PANEL_WIDTH: u16 = DAY_WIDTH * 7;

/// Number of lines taken up by the title and the weekday names
const HEADER_LINES: u16 = 2;

pub(crate) const PANEL_HEIGHT: u16 = HEADER_LINES + 6;

/// Number of columns per year, month or time column
const WIDE_CELL: u16 = 9;

const WIDE_PER_ROW: usize = 3;

/// Values drawn above and below the current one in a time column
const TIME_SPREAD: i32 = 2;

const MONTHS_IN_YEAR: usize = 12;

/// Which cell of a panel has the keyboard
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Focus {
    /// Index into the day grid, the year page or the month list
    pub(crate) cell: usize,
    /// Index into the time columns the format shows
    pub(crate) column: usize,
}

impl Focus {
    /// Point at the panel's cursor date in whatever view it shows
    pub(crate) fn reset<C: Clock>(&mut self, picker: &Picker<C>, panel: Panel) {
        let date = picker.cursor_date(panel);
        match picker.view(panel) {
            View::Date => {
                if let Some(i) = picker.grid(panel).position(&date) {
                    self.cell = i;
                }
            }
            View::Year => {
                if let Some(i) = picker.year_page(panel).iter().position(|&y| y == date.year) {
                    self.cell = i;
                }
            }
            View::Month => self.cell = usize::from(date.month),
            View::Time => self.column = 0,
        }
        self.clamp(picker, panel);
    }

    /// Keep the focus on a cell that exists and, in the day grid, belongs to
    /// the displayed month
    pub(crate) fn clamp<C: Clock>(&mut self, picker: &Picker<C>, panel: Panel) {
        match picker.view(panel) {
            View::Date => {
                let grid = picker.grid(panel);
                let first = grid.iter().position(CalendarDay::is_current_month);
                let last = grid.iter().rposition(CalendarDay::is_current_month);
                if let (Some(first), Some(last)) = (first, last) {
                    self.cell = self.cell.clamp(first, last);
                }
            }
            View::Year => {
                let len = picker.year_page(panel).len();
                self.cell = self.cell.min(len.saturating_sub(1));
            }
            View::Month => self.cell = self.cell.min(MONTHS_IN_YEAR - 1),
            View::Time => {
                let len = time_fields(picker).len();
                self.column = self.column.min(len.saturating_sub(1));
            }
        }
    }
}

/// The time columns shown for the picker's format, in display order
pub(crate) fn time_fields<C: Clock>(picker: &Picker<C>) -> Vec<TimeField> {
    let columns = picker.time_columns();
    TimeField::ALL
        .into_iter()
        .filter(|&f| columns.shows(f))
        .collect()
}

/// One calendar panel: the day grid, year page, month list or time columns
/// depending on the panel's view
#[derive(Debug)]
pub(crate) struct PanelView<'a, C> {
    picker: &'a Picker<C>,
    panel: Panel,
    palette: Palette,
    /// Whether the keyboard focus is drawn in this panel
    focused: bool,
}

impl<'a, C: Clock> PanelView<'a, C> {
    pub(crate) fn new(picker: &'a Picker<C>, panel: Panel, palette: Palette) -> Self {
        PanelView {
            picker,
            panel,
            palette,
            focused: false,
        }
    }
}

impl<C: Clock> PanelView<'_, C> {
    pub(crate) fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn draw_title(&self, canvas: &mut Canvas<'_>, title: &str) {
        canvas.print(0, 0, "‹", HEADER_STYLE);
        canvas.print(0, PANEL_WIDTH - 1, "›", HEADER_STYLE);
        let x = PANEL_WIDTH.saturating_sub(text_width(title)) / 2;
        canvas.print(0, x, title, self.palette.title);
    }

    fn draw_days(&self, canvas: &mut Canvas<'_>, focus: Focus) {
        let i18n = self.picker.i18n();
        let grid = self.picker.grid(self.panel);
        let title = format!(
            "{} {}",
            i18n.format_year(grid.year()),
            i18n.format_month(grid.month())
        );
        self.draw_title(canvas, &title);
        for (col, name) in zip(0u16.., self.picker.week_headers()) {
            canvas.print(1, col * DAY_WIDTH + 1, name, WEEKDAY_STYLE);
        }
        for (row, week) in zip(0u16.., grid.rows()) {
            for (col, day) in zip(0u16.., week) {
                let index = usize::from(row) * DAYS_IN_WEEK + usize::from(col);
                let text = if self.focused && index == focus.cell {
                    format!("[{:>2}]", day.day)
                } else {
                    format!(" {:>2} ", day.day)
                };
                canvas.print(
                    HEADER_LINES + row,
                    col * DAY_WIDTH,
                    text,
                    self.day_style(day),
                );
            }
        }
    }

    fn day_style(&self, day: &CalendarDay) -> Style {
        let date = day.date();
        if day.disabled {
            DISABLED_STYLE
        } else if !day.is_current_month() {
            OTHER_MONTH_STYLE
        } else if self.picker.is_selected_day(date, self.panel) {
            self.palette.selected
        } else if self.picker.is_in_range(date) {
            self.palette.in_range
        } else if !day.mark.is_empty() || day.holiday.is_some() || day.custom_content.is_some() {
            MARK_STYLE
        } else {
            BASE_STYLE
        }
    }

    fn draw_years(&self, canvas: &mut Canvas<'_>, focus: Focus) {
        self.draw_title(canvas, &self.picker.year_range_label(self.panel));
        for (i, &year) in self.picker.year_page(self.panel).iter().enumerate() {
            let style = if self.picker.is_selected_year(year, self.panel) {
                self.palette.selected
            } else {
                BASE_STYLE
            };
            self.draw_wide(canvas, i, &year.to_string(), i == focus.cell, style);
        }
    }

    fn draw_months(&self, canvas: &mut Canvas<'_>, focus: Focus) {
        let i18n = self.picker.i18n();
        let year = self.picker.cursor_date(self.panel).year;
        self.draw_title(canvas, &i18n.format_year(year));
        for (month, name) in zip(0u8.., i18n.months) {
            let i = usize::from(month);
            let style = if self.picker.is_selected_month(year, month, self.panel) {
                self.palette.selected
            } else {
                BASE_STYLE
            };
            self.draw_wide(canvas, i, name, i == focus.cell, style);
        }
    }

    fn draw_wide(&self, canvas: &mut Canvas<'_>, i: usize, label: &str, at_focus: bool, style: Style) {
        let row = u16::try_from(i / WIDE_PER_ROW).unwrap_or(u16::MAX);
        let col = u16::try_from(i % WIDE_PER_ROW).unwrap_or_default();
        let text = if self.focused && at_focus {
            format!("[{label:^7}]")
        } else {
            format!(" {label:^7} ")
        };
        canvas.print(HEADER_LINES + row, col * WIDE_CELL, text, style);
    }

    fn draw_time(&self, canvas: &mut Canvas<'_>, focus: Focus) {
        let i18n = self.picker.i18n();
        let title = match self.panel {
            _ if !self.picker.config().is_range() => i18n.time_tips,
            Panel::Left => i18n.start_time,
            Panel::Right => i18n.end_time,
        };
        self.draw_title(canvas, title);
        let value = self.picker.time_value(self.panel);
        let columns = self.picker.time_columns();
        let fields = zip(TimeField::ALL, i18n.time).filter(|&(field, _)| columns.shows(field));
        for (column, (field, name)) in zip(0u16.., fields) {
            let x = column * WIDE_CELL;
            canvas.print(1, x + 1, name, WEEKDAY_STYLE);
            let current = i32::from(field.get(&value));
            for offset in -TIME_SPREAD..=TIME_SPREAD {
                let shown = (current + offset).rem_euclid(i32::from(field.max()) + 1);
                let shown = u8::try_from(shown).unwrap_or_default();
                let at_focus = self.focused && usize::from(column) == focus.column && offset == 0;
                let text = if at_focus {
                    format!("[{shown:02}]")
                } else {
                    format!(" {shown:02} ")
                };
                let style = if offset == 0 {
                    self.palette.selected
                } else if self.picker.is_time_disabled(field, shown, self.panel) {
                    DISABLED_STYLE
                } else {
                    BASE_STYLE
                };
                let y = u16::try_from(i32::from(HEADER_LINES) + TIME_SPREAD + offset)
                    .unwrap_or_default();
                canvas.print(y, x + 2, text, style);
            }
        }
    }
}

impl<C: Clock> StatefulWidget for PanelView<'_, C> {
    type State = Focus;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Focus) {
        state.clamp(self.picker, self.panel);
        let mut canvas = Canvas::new(area, buf);
        match self.picker.view(self.panel) {
            View::Date => self.draw_days(&mut canvas, *state),
            View::Year => self.draw_years(&mut canvas, *state),
            View::Month => self.draw_months(&mut canvas, *state),
            View::Time => self.draw_time(&mut canvas, *state),
        }
    }
}

pub(crate) fn text_width(s: &str) -> u16 {
    u16::try_from(Text::raw(s).width()).unwrap_or(u16::MAX)
}

/// Positioned, clipped text output into a region of a buffer
#[derive(Debug, Eq, PartialEq)]
pub(crate) struct Canvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }
}

impl Canvas<'_> {
    pub(crate) fn print<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Style) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style);
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // A Paragraph truncates text running past the area, as long as
            // the Rect it is given lies inside the buffer.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }

    /// Print `s` flush against the right edge of the area
    pub(crate) fn print_right<S: AsRef<str>>(&mut self, y: u16, s: S, style: Style) {
        let x = self.area.width.saturating_sub(text_width(s.as_ref()));
        self.print(y, x, s, style);
    }
}
