//! The selection state machine behind one picker panel (or a pair of them in
//! range mode).
//!
//! A [`Picker`] owns its configuration, the selected value(s), a navigation
//! cursor per panel and the transient hint.  Every user gesture is a method
//! returning a [`PickOutcome`]; outward notifications go through the
//! configured hooks first and then through any subscribed observers.
mod actions;
mod select;
use crate::calendar::{self, CalendarGrid, GridBuilder};
use crate::config::{Button, LaydateConfig, PickerType};
use crate::constraint::{ConstraintError, Constraints, TimeField};
use crate::date::{Clock, DateObject, SystemClock};
use crate::event::{Emission, Event, EventKind, ObserverId, Observers};
use crate::format::{format, parse, DateInput};
use crate::hint::{Hint, DEFAULT_HINT_DURATION};
use crate::i18n::I18n;
use crate::registry::HintTarget;
use crate::theme::Theme;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum View {
    Year,
    Month,
    #[default]
    Date,
    Time,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Panel {
    #[default]
    Left,
    Right,
}

impl Panel {
    pub fn other(self) -> Panel {
        match self {
            Panel::Left => Panel::Right,
            Panel::Right => Panel::Left,
        }
    }
}

/// Progress of a linked range pick
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum RangeState {
    #[default]
    Idle,
    /// The start is chosen and the next pick completes the range
    Selecting,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    fn step(self) -> i32 {
        match self {
            Direction::Prev => -1,
            Direction::Next => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Unit {
    Year,
    Month,
}

/// The result of feeding one gesture to a [`Picker`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PickOutcome {
    /// State changed; nothing was emitted as a final value
    Updated,
    /// A final value was emitted and the host should close the panel
    Committed(String),
    /// The host input should be emptied
    Cleared,
    /// The gesture was refused; the payload is the hint that was shown
    Rejected(String),
    /// The gesture does not apply in the current state
    Ignored,
}

/// Which time columns a format shows
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TimeColumns {
    pub hours: bool,
    pub minutes: bool,
    pub seconds: bool,
}

impl TimeColumns {
    pub fn for_format(pattern: &str) -> TimeColumns {
        TimeColumns {
            hours: pattern.contains(['H', 'h']),
            minutes: pattern.contains('m'),
            seconds: pattern.contains('s'),
        }
    }

    pub fn shows(&self, field: TimeField) -> bool {
        match field {
            TimeField::Hours => self.hours,
            TimeField::Minutes => self.minutes,
            TimeField::Seconds => self.seconds,
        }
    }
}

/// Where one panel is looking
#[derive(Clone, Debug, Eq, PartialEq)]
struct Cursor {
    date: DateObject,
    view: View,
    years: Vec<i32>,
}

impl Cursor {
    fn new(date: DateObject, view: View) -> Cursor {
        Cursor {
            date,
            view,
            years: calendar::year_page(date.year),
        }
    }

    fn set_view(&mut self, view: View) {
        if view == View::Year {
            self.years = calendar::year_page(self.date.year);
        }
        self.view = view;
    }
}

#[derive(Debug)]
pub struct Picker<C = SystemClock> {
    config: LaydateConfig,
    clock: C,
    current: DateObject,
    start: DateObject,
    end: DateObject,
    range_state: RangeState,
    hover: Option<DateObject>,
    left: Cursor,
    right: Cursor,
    hint: Hint,
    observers: Observers,
    active: bool,
}

impl Picker<SystemClock> {
    pub fn new(config: LaydateConfig) -> Picker<SystemClock> {
        Picker::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Picker<C> {
    pub fn with_clock(config: LaydateConfig, clock: C) -> Picker<C> {
        let now = clock.now();
        let mut picker = Picker {
            config,
            clock,
            current: now,
            start: now,
            end: now,
            range_state: RangeState::Idle,
            hover: None,
            left: Cursor::new(now, View::Date),
            right: Cursor::new(now, View::Date),
            hint: Hint::new(),
            observers: Observers::new(),
            active: false,
        };
        picker.initialize();
        picker
    }

    /// Start interacting: fires `ready` with the initial value
    pub fn activate(&mut self) {
        if !self.active {
            self.active = true;
            self.fire(&Event::Ready(self.current));
        }
    }

    /// Replace the configuration.  The selection is rebuilt from scratch only
    /// when the value, picker type or range settings differ; otherwise only
    /// derived data changes.
    pub fn update_config(&mut self, config: LaydateConfig) {
        let reinit = config.value != self.config.value
            || config.picker_type != self.config.picker_type
            || config.range != self.config.range
            || config.range_linked != self.config.range_linked;
        self.config = config;
        if reinit {
            tracing::trace!("configuration changed; resetting selection");
            self.initialize();
            if self.active {
                self.fire(&Event::Ready(self.current));
            }
        }
    }

    /// Stop interacting: drops any pending hint and fires `close`
    pub fn deactivate(&mut self) {
        self.hint.cancel();
        if self.active {
            self.active = false;
            self.fire(&Event::Close);
        }
    }

    fn initialize(&mut self) {
        let now = if self.theme().is_full_panel() {
            self.clock.now().date_only()
        } else {
            self.clock.now()
        };
        let kind = self.config.picker_type;
        let view = kind.initial_view();
        self.current = now;
        self.start = now;
        self.end = now;
        self.range_state = RangeState::Idle;
        self.hover = None;
        self.left = Cursor::new(now, view);
        self.right = Cursor::new(now.add_months(1), view);
        match self.config.value.clone() {
            Some(DateInput::Text(text)) if self.config.is_range() => {
                let parts = text.split(self.config.separator()).collect::<Vec<_>>();
                if let [start, end] = parts[..] {
                    self.start = self.parse_value(&DateInput::from(start));
                    self.end = self.parse_value(&DateInput::from(end));
                    self.current = self.start;
                    self.left = Cursor::new(self.start, view);
                    self.right = Cursor::new(self.end, view);
                } else {
                    tracing::debug!(value = %text, "range value does not split into two parts");
                }
            }
            Some(value) => {
                let parsed = self.parse_value(&value);
                self.current = parsed;
                self.start = parsed;
                self.end = parsed;
                self.left = Cursor::new(parsed, view);
            }
            None => (),
        }
        if self.config.is_linked() {
            self.sync_right();
        }
    }

    fn parse_value(&self, value: &DateInput) -> DateObject {
        parse(value, self.config.date_format(), &self.clock)
    }

    pub fn config(&self) -> &LaydateConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current(&self) -> DateObject {
        self.current
    }

    pub fn start(&self) -> DateObject {
        self.start
    }

    pub fn end(&self) -> DateObject {
        self.end
    }

    pub fn range_state(&self) -> RangeState {
        self.range_state
    }

    pub fn hover_date(&self) -> Option<DateObject> {
        self.hover
    }

    pub fn hint(&self) -> &Hint {
        &self.hint
    }

    pub fn subscribe<F: Fn(&Event) + 'static>(&mut self, kind: EventKind, f: F) -> ObserverId {
        self.observers.subscribe(kind, f)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn cursor(&self, panel: Panel) -> &Cursor {
        match panel {
            Panel::Right if self.config.is_range() => &self.right,
            _ => &self.left,
        }
    }

    fn cursor_mut(&mut self, panel: Panel) -> &mut Cursor {
        match panel {
            Panel::Right if self.config.is_range() => &mut self.right,
            _ => &mut self.left,
        }
    }

    pub fn view(&self, panel: Panel) -> View {
        self.cursor(panel).view
    }

    /// The date whose month (or year page) the panel is showing
    pub fn cursor_date(&self, panel: Panel) -> DateObject {
        self.cursor(panel).date
    }

    /// Page the panel by a month or a year; in the year view a year step
    /// pages by fifteen years.  Linked range panels move together.
    pub fn navigate(&mut self, direction: Direction, unit: Unit, panel: Panel) -> PickOutcome {
        let linked = self.config.is_linked();
        let target = if linked { Panel::Left } else { panel };
        let step = direction.step();
        let cursor = self.cursor_mut(target);
        match unit {
            Unit::Year if cursor.view == View::Year => {
                let first = cursor.years.first().copied().unwrap_or(cursor.date.year - 7);
                let center = first + step * 15 + 7;
                cursor.years = calendar::year_page(center);
                cursor.date = cursor.date.add_years(center - cursor.date.year);
            }
            Unit::Year => cursor.date = cursor.date.add_years(step),
            Unit::Month => cursor.date = cursor.date.add_months(step),
        }
        if linked {
            self.sync_right();
        }
        PickOutcome::Updated
    }

    /// Keep linked panels consecutive: the right panel shows the page after
    /// the left one
    fn sync_right(&mut self) {
        let left = self.left.date;
        let right = match self.config.picker_type {
            PickerType::Year => left.add_years(15),
            PickerType::Month => left.add_years(1),
            PickerType::Date | PickerType::Time | PickerType::DateTime => left.add_months(1),
        };
        self.right.date = right;
        self.right.years = calendar::year_page(right.year);
    }

    /// Point a panel at `date`, keeping linked panels consecutive
    fn move_cursor(&mut self, panel: Panel, date: DateObject) {
        if self.config.is_linked() && panel == Panel::Right {
            self.left.date = match self.config.picker_type {
                PickerType::Year => date.add_years(-15),
                PickerType::Month => date.add_years(-1),
                PickerType::Date | PickerType::Time | PickerType::DateTime => date.add_months(-1),
            };
        } else {
            self.cursor_mut(panel).date = date;
        }
        if self.config.is_linked() {
            self.sync_right();
        }
    }

    pub fn switch_view(&mut self, view: View, panel: Panel) -> PickOutcome {
        tracing::trace!(?view, ?panel, "switching view");
        self.cursor_mut(panel).set_view(view);
        PickOutcome::Updated
    }

    /// Flip between the date and time views; in range mode both panels flip
    pub fn toggle_time(&mut self) -> PickOutcome {
        let flip = |view: View| {
            if view == View::Time {
                View::Date
            } else {
                View::Time
            }
        };
        let left = flip(self.left.view);
        self.left.set_view(left);
        if self.config.is_range() {
            let right = flip(self.right.view);
            self.right.set_view(right);
            if left == View::Time {
                self.left.date = self.start;
            }
            if right == View::Time {
                self.right.date = self.end;
            }
        } else if left == View::Time {
            self.left.date = self.current;
        }
        PickOutcome::Updated
    }

    pub fn constraints(&self) -> Constraints<'_> {
        Constraints::new(&self.config, &self.clock)
    }

    pub fn grid(&self, panel: Panel) -> CalendarGrid {
        let date = self.cursor(panel).date;
        GridBuilder::new(&self.config, &self.clock).build(date.year, date.month)
    }

    pub fn year_page(&self, panel: Panel) -> &[i32] {
        &self.cursor(panel).years
    }

    pub fn year_range_label(&self, panel: Panel) -> String {
        calendar::year_page_label(self.year_page(panel), self.i18n())
    }

    pub fn i18n(&self) -> &'static I18n {
        I18n::for_lang(self.config.lang)
    }

    pub fn theme(&self) -> Theme {
        self.config.parsed_theme()
    }

    pub fn is_dark(&self) -> bool {
        self.theme().is_dark(self.config.dark_mode)
    }

    pub fn week_headers(&self) -> [&'static str; 7] {
        self.i18n().week_headers(self.config.week_start())
    }

    pub fn footer_buttons(&self) -> Vec<(Button, &'static str)> {
        let i18n = self.i18n();
        self.config
            .footer_buttons()
            .into_iter()
            .map(|b| (b, i18n.button_label(b)))
            .collect()
    }

    pub fn time_columns(&self) -> TimeColumns {
        TimeColumns::for_format(self.config.date_format())
    }

    pub fn show_preview(&self) -> bool {
        if self.theme().is_full_panel() {
            true
        } else if self.config.picker_type == PickerType::DateTime {
            false
        } else {
            self.config.is_preview
        }
    }

    /// The value as it would be emitted right now
    pub fn preview(&self) -> String {
        let pattern = self.config.date_format();
        if self.config.is_range() {
            format!(
                "{}{}{}",
                format(&self.start, pattern),
                self.config.separator(),
                format(&self.end, pattern)
            )
        } else {
            format(&self.current, pattern)
        }
    }

    fn emission(&self) -> Emission {
        let range = self.config.is_range();
        Emission {
            value: self.preview(),
            primary: if range { self.start } else { self.current },
            secondary: range.then_some(self.end),
        }
    }

    /// Compare at the granularity of the picker type
    fn range_key(&self, date: DateObject) -> i64 {
        match self.config.picker_type {
            PickerType::Year => DateObject::new(date.year, 0, 1),
            PickerType::Month => DateObject::new(date.year, date.month, 1),
            PickerType::Date | PickerType::Time | PickerType::DateTime => date.date_only(),
        }
        .timestamp()
    }

    /// Whether `date` falls in the selected (or, mid-pick, the hovered)
    /// range
    pub fn is_in_range(&self, date: DateObject) -> bool {
        if !self.config.is_range() {
            return false;
        }
        let value = self.range_key(date);
        let start = self.range_key(self.start);
        match self.range_state {
            RangeState::Selecting => match self.hover {
                Some(hover) => {
                    let hover = self.range_key(hover);
                    (start.min(hover)..=start.max(hover)).contains(&value)
                }
                None => value == start,
            },
            RangeState::Idle => (start..=self.range_key(self.end)).contains(&value),
        }
    }

    /// The selected value shown on `panel`, if any
    fn selected_on(&self, panel: Panel) -> [Option<DateObject>; 2] {
        if !self.config.is_range() {
            return [Some(self.current), None];
        }
        if self.config.is_linked() {
            let end = (self.range_state == RangeState::Idle).then_some(self.end);
            return [Some(self.start), end];
        }
        match panel {
            Panel::Left => [Some(self.start), None],
            Panel::Right => [Some(self.end), None],
        }
    }

    pub fn is_selected_day(&self, date: DateObject, panel: Panel) -> bool {
        self.selected_on(panel)
            .into_iter()
            .flatten()
            .any(|d| (d.year, d.month, d.date) == (date.year, date.month, date.date))
    }

    pub fn is_selected_year(&self, year: i32, panel: Panel) -> bool {
        if self.config.is_range() && self.config.picker_type != PickerType::Year {
            return self.cursor(panel).date.year == year;
        }
        self.selected_on(panel)
            .into_iter()
            .flatten()
            .any(|d| d.year == year)
    }

    /// `month` is 0-based
    pub fn is_selected_month(&self, year: i32, month: u8, panel: Panel) -> bool {
        if self.config.is_range() && self.config.picker_type != PickerType::Month {
            let d = self.cursor(panel).date;
            return (d.year, d.month) == (year, month);
        }
        self.selected_on(panel)
            .into_iter()
            .flatten()
            .any(|d| (d.year, d.month) == (year, month))
    }

    /// The value the time columns of `panel` edit
    pub fn time_value(&self, panel: Panel) -> DateObject {
        if !self.config.is_range() {
            self.current
        } else if panel == Panel::Right {
            self.end
        } else {
            self.start
        }
    }

    pub fn is_time_disabled(&self, field: TimeField, value: u8, panel: Panel) -> bool {
        self.constraints()
            .is_time_disabled(field, value, &self.time_value(panel))
    }

    /// Confirming a range is refused while the second end is still being
    /// picked or when the end precedes the start
    pub fn confirm_disabled(&self) -> bool {
        self.config.is_range()
            && (self.range_state == RangeState::Selecting
                || self.start.timestamp() > self.end.timestamp())
    }

    /// Show a transient hint and announce it to observers
    pub fn show_hint(&mut self, content: &str, duration: Duration) {
        let request = self.hint.show(content, duration, Instant::now());
        self.fire(&Event::Hint(request));
    }

    /// Hide the hint once its time is up.  Returns whether it was hidden.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.hint.expire(now)
    }

    fn reject(&mut self, message: String) -> PickOutcome {
        self.show_hint(&message, DEFAULT_HINT_DURATION);
        PickOutcome::Rejected(message)
    }

    fn reject_error(&mut self, error: &ConstraintError) -> PickOutcome {
        tracing::trace!(%error, "rejecting selection");
        let i18n = self.i18n();
        let message = match error {
            ConstraintError::OutOfRange { min, max, .. } => {
                i18n.invalid_range_message(min.as_deref(), max.as_deref())
            }
            ConstraintError::DisabledDate(_) | ConstraintError::DisabledTime { .. } => {
                i18n.invalid_date.to_owned()
            }
            ConstraintError::EndBeforeStart { .. } => i18n.invalid_end_early.to_owned(),
        };
        self.reject(message)
    }

    fn fire(&self, event: &Event) {
        self.config.hooks.fire(event);
        self.observers.notify(event);
    }
}

impl<C: Clock> HintTarget for Picker<C> {
    fn show_hint(&mut self, content: &str, duration: Duration) {
        Picker::show_hint(self, content, duration);
    }
}
