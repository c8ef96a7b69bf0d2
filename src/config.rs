use crate::calendar::{CellContent, CellDate, CellRenderFn};
use crate::constraint::{DisabledDateFn, DisabledTime, DisabledTimeFn, Holidays, Mark};
use crate::date::DateObject;
use crate::event::{Emission, Event};
use crate::format::DateInput;
use crate::i18n::Lang;
use crate::picker::View;
use crate::shortcut::{Shortcut, ShortcutValue};
use crate::theme::Theme;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

/// Separator placed between the two values of a range when the config only
/// says "range on"
pub const DEFAULT_SEPARATOR: &str = " - ";

/// A shared caller-supplied closure.  Its `Debug` output does not try to
/// describe the closure.
pub struct Callback<F: ?Sized>(Rc<F>);

impl<F: ?Sized> Callback<F> {
    pub fn from_rc(f: Rc<F>) -> Callback<F> {
        Callback(f)
    }
}

impl<F: ?Sized> Clone for Callback<F> {
    fn clone(&self) -> Callback<F> {
        Callback(Rc::clone(&self.0))
    }
}

impl<F: ?Sized> fmt::Debug for Callback<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

impl<F: ?Sized> Deref for Callback<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.0
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown {kind} {value:?}")]
pub struct UnknownName {
    kind: &'static str,
    value: String,
}

impl UnknownName {
    pub(crate) fn new(kind: &'static str, value: &str) -> UnknownName {
        UnknownName {
            kind,
            value: value.to_owned(),
        }
    }
}

/// The coarsest unit the picker lets the user choose
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum PickerType {
    Year,
    Month,
    #[default]
    Date,
    Time,
    DateTime,
}

impl PickerType {
    pub fn default_format(self) -> &'static str {
        match self {
            PickerType::Year => "yyyy",
            PickerType::Month => "yyyy-MM",
            PickerType::Date => "yyyy-MM-dd",
            PickerType::Time => "HH:mm:ss",
            PickerType::DateTime => "yyyy-MM-dd HH:mm:ss",
        }
    }

    pub fn initial_view(self) -> View {
        match self {
            PickerType::Year => View::Year,
            PickerType::Month => View::Month,
            PickerType::Time => View::Time,
            PickerType::Date | PickerType::DateTime => View::Date,
        }
    }

    pub fn has_time(self) -> bool {
        matches!(self, PickerType::Time | PickerType::DateTime)
    }
}

impl FromStr for PickerType {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<PickerType, UnknownName> {
        match s {
            "year" => Ok(PickerType::Year),
            "month" => Ok(PickerType::Month),
            "date" => Ok(PickerType::Date),
            "time" => Ok(PickerType::Time),
            "datetime" => Ok(PickerType::DateTime),
            _ => Err(UnknownName::new("picker type", s)),
        }
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum RangeMode {
    #[default]
    Off,
    /// Range selection joined by [`DEFAULT_SEPARATOR`]
    On,
    /// Range selection joined by the given separator
    Separator(String),
}

impl RangeMode {
    pub fn is_on(&self) -> bool {
        !matches!(self, RangeMode::Off)
    }

    pub fn separator(&self) -> &str {
        match self {
            RangeMode::Separator(sep) => sep,
            RangeMode::Off | RangeMode::On => DEFAULT_SEPARATOR,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Button {
    Clear,
    Now,
    Confirm,
}

impl FromStr for Button {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Button, UnknownName> {
        match s {
            "clear" => Ok(Button::Clear),
            "now" => Ok(Button::Now),
            "confirm" => Ok(Button::Confirm),
            _ => Err(UnknownName::new("button", s)),
        }
    }
}

pub type EmissionHook = Callback<dyn Fn(&Emission)>;

/// Lifecycle callbacks.  Each one runs before any observer registered for the
/// same event.
#[derive(Clone, Debug, Default)]
pub struct Hooks {
    pub ready: Option<Callback<dyn Fn(&DateObject)>>,
    pub change: Option<EmissionHook>,
    pub done: Option<EmissionHook>,
    pub on_confirm: Option<EmissionHook>,
    pub on_now: Option<EmissionHook>,
    pub on_clear: Option<EmissionHook>,
    pub close: Option<Callback<dyn Fn()>>,
}

impl Hooks {
    pub(crate) fn fire(&self, event: &Event) {
        let hook = match event {
            Event::Ready(date) => {
                if let Some(ready) = &self.ready {
                    ready(date);
                }
                return;
            }
            Event::Close => {
                if let Some(close) = &self.close {
                    close();
                }
                return;
            }
            Event::Select(_) | Event::Hint(_) => return,
            Event::Change(e) => self.change.as_ref().map(|h| (h, e)),
            Event::Done(e) => self.done.as_ref().map(|h| (h, e)),
            Event::Confirm(e) => self.on_confirm.as_ref().map(|h| (h, e)),
            Event::Now(e) => self.on_now.as_ref().map(|h| (h, e)),
            Event::Clear(e) => self.on_clear.as_ref().map(|h| (h, e)),
        };
        if let Some((hook, emission)) = hook {
            hook(emission);
        }
    }
}

fn emission_hook<F: Fn(&Emission) + 'static>(f: F) -> Option<EmissionHook> {
    let f: Rc<dyn Fn(&Emission)> = Rc::new(f);
    Some(Callback(f))
}

/// Everything a picker is configured with.  The picker never modifies it;
/// callers replace it wholesale through
/// [`Picker::update_config`](crate::picker::Picker::update_config).
#[derive(Clone, Debug)]
pub struct LaydateConfig {
    /// Key under which a host may register the picker for out-of-band hints
    pub id: Option<String>,
    pub picker_type: PickerType,
    pub range: RangeMode,
    /// When on, the two range panels always show consecutive pages and one
    /// gesture picks both ends; when off, each panel edits one end
    pub range_linked: bool,
    pub format: Option<String>,
    pub value: Option<DateInput>,
    pub min: Option<DateInput>,
    pub max: Option<DateInput>,
    /// Whether the footer with the preview and the buttons is drawn
    pub show_bottom: bool,
    /// `None` means clear/now/confirm
    pub btns: Option<Vec<Button>>,
    pub lang: Lang,
    /// Theme name, accent colour, or both (`["grid", "#FF5722"]`)
    pub theme: Vec<String>,
    pub dark_mode: bool,
    /// Show the built-in festival names on otherwise unmarked days
    pub calendar: bool,
    pub mark: Option<Mark>,
    pub holidays: Option<Holidays>,
    pub shortcuts: Vec<Shortcut>,
    pub auto_confirm: bool,
    pub is_preview: bool,
    /// First column of the week, 0 = Sunday
    pub week_start: u8,
    pub disabled_date: Option<DisabledDateFn>,
    pub disabled_time: Option<DisabledTimeFn>,
    pub cell_render: Option<CellRenderFn>,
    pub hooks: Hooks,
}

impl Default for LaydateConfig {
    fn default() -> LaydateConfig {
        LaydateConfig {
            id: None,
            picker_type: PickerType::default(),
            range: RangeMode::Off,
            range_linked: false,
            format: None,
            value: None,
            min: None,
            max: None,
            show_bottom: true,
            btns: None,
            lang: Lang::default(),
            theme: Vec::new(),
            dark_mode: false,
            calendar: false,
            mark: None,
            holidays: None,
            shortcuts: Vec::new(),
            auto_confirm: true,
            is_preview: true,
            week_start: 0,
            disabled_date: None,
            disabled_time: None,
            cell_render: None,
            hooks: Hooks::default(),
        }
    }
}

impl LaydateConfig {
    pub fn new(picker_type: PickerType) -> LaydateConfig {
        LaydateConfig {
            picker_type,
            ..LaydateConfig::default()
        }
    }

    /// The explicit format, or the default for the picker type
    pub fn date_format(&self) -> &str {
        self.format
            .as_deref()
            .unwrap_or_else(|| self.picker_type.default_format())
    }

    pub fn is_range(&self) -> bool {
        self.range.is_on()
    }

    pub fn is_linked(&self) -> bool {
        self.is_range() && self.range_linked
    }

    pub fn separator(&self) -> &str {
        self.range.separator()
    }

    pub fn week_start(&self) -> u8 {
        self.week_start % 7
    }

    pub fn footer_buttons(&self) -> Vec<Button> {
        match &self.btns {
            Some(btns) if !btns.is_empty() => btns.clone(),
            Some(_) if self.is_range() => vec![Button::Clear, Button::Confirm],
            _ => vec![Button::Clear, Button::Now, Button::Confirm],
        }
    }

    pub fn parsed_theme(&self) -> Theme {
        Theme::parse(&self.theme)
    }

    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_range(mut self, range: RangeMode) -> Self {
        self.range = range;
        self
    }

    pub fn with_show_bottom(mut self, show_bottom: bool) -> Self {
        self.show_bottom = show_bottom;
        self
    }

    pub fn with_linked(mut self, linked: bool) -> Self {
        self.range_linked = linked;
        self
    }

    pub fn with_format<S: Into<String>>(mut self, format: S) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_value<V: Into<DateInput>>(mut self, value: V) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_min<V: Into<DateInput>>(mut self, min: V) -> Self {
        self.min = Some(min.into());
        self
    }

    pub fn with_max<V: Into<DateInput>>(mut self, max: V) -> Self {
        self.max = Some(max.into());
        self
    }

    pub fn with_buttons(mut self, btns: Vec<Button>) -> Self {
        self.btns = Some(btns);
        self
    }

    pub fn with_lang(mut self, lang: Lang) -> Self {
        self.lang = lang;
        self
    }

    pub fn with_theme<S: Into<String>>(mut self, theme: S) -> Self {
        self.theme.push(theme.into());
        self
    }

    pub fn with_calendar(mut self, calendar: bool) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.mark = Some(mark);
        self
    }

    pub fn with_holidays(mut self, holidays: Holidays) -> Self {
        self.holidays = Some(holidays);
        self
    }

    pub fn with_shortcut<S: Into<String>>(mut self, text: S, value: ShortcutValue) -> Self {
        self.shortcuts.push(Shortcut {
            text: text.into(),
            value,
        });
        self
    }

    pub fn with_auto_confirm(mut self, auto_confirm: bool) -> Self {
        self.auto_confirm = auto_confirm;
        self
    }

    pub fn with_week_start(mut self, week_start: u8) -> Self {
        self.week_start = week_start;
        self
    }

    /// `f` receives each candidate day and [`View::Date`]
    pub fn with_disabled_date<F: Fn(DateObject, View) -> bool + 'static>(mut self, f: F) -> Self {
        let f: Rc<dyn Fn(DateObject, View) -> bool> = Rc::new(f);
        self.disabled_date = Some(Callback(f));
        self
    }

    /// `f` receives the value being edited and [`View::Time`]
    pub fn with_disabled_time<F>(mut self, f: F) -> Self
    where
        F: Fn(DateObject, View) -> Option<DisabledTime> + 'static,
    {
        let f: Rc<dyn Fn(DateObject, View) -> Option<DisabledTime>> = Rc::new(f);
        self.disabled_time = Some(Callback(f));
        self
    }

    pub fn with_cell_render<F: Fn(CellDate, &mut CellContent) + 'static>(mut self, f: F) -> Self {
        let f: Rc<dyn Fn(CellDate, &mut CellContent)> = Rc::new(f);
        self.cell_render = Some(Callback(f));
        self
    }

    pub fn on_ready<F: Fn(&DateObject) + 'static>(mut self, f: F) -> Self {
        let f: Rc<dyn Fn(&DateObject)> = Rc::new(f);
        self.hooks.ready = Some(Callback(f));
        self
    }

    pub fn on_change<F: Fn(&Emission) + 'static>(mut self, f: F) -> Self {
        self.hooks.change = emission_hook(f);
        self
    }

    pub fn on_done<F: Fn(&Emission) + 'static>(mut self, f: F) -> Self {
        self.hooks.done = emission_hook(f);
        self
    }

    pub fn on_confirm<F: Fn(&Emission) + 'static>(mut self, f: F) -> Self {
        self.hooks.on_confirm = emission_hook(f);
        self
    }

    pub fn on_now<F: Fn(&Emission) + 'static>(mut self, f: F) -> Self {
        self.hooks.on_now = emission_hook(f);
        self
    }

    pub fn on_clear<F: Fn(&Emission) + 'static>(mut self, f: F) -> Self {
        self.hooks.on_clear = emission_hook(f);
        self
    }

    pub fn on_close<F: Fn() + 'static>(mut self, f: F) -> Self {
        let f: Rc<dyn Fn()> = Rc::new(f);
        self.hooks.close = Some(Callback(f));
        self
    }
}
