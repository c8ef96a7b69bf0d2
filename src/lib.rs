//! Calendar and time-panel engine for date/time pickers.
//!
//! Everything here is plain data transformation over [`DateObject`] records:
//! building the 42-cell month grid, formatting and leniently parsing values,
//! evaluating min/max and caller-supplied constraints, and driving single or
//! range selection through [`Picker`].  Rendering is left to the caller; the
//! `laydate` binary in this package draws the panel in a terminal.
pub mod calendar;
pub mod config;
pub mod constraint;
pub mod date;
pub mod event;
pub mod format;
pub mod geometry;
pub mod hint;
pub mod i18n;
pub mod picker;
pub mod registry;
pub mod shortcut;
pub mod theme;

pub use crate::calendar::{CalendarDay, CalendarGrid, DayKind, GridBuilder};
pub use crate::config::{Button, Hooks, LaydateConfig, PickerType, RangeMode};
pub use crate::constraint::{ConstraintError, Constraints, HolidayTag, Holidays, Mark, TimeField};
pub use crate::date::{Clock, DateObject, FixedClock, SystemClock};
pub use crate::event::{Emission, Event, EventKind, Observers};
pub use crate::format::{format, parse, try_parse, DateInput, ParseError};
pub use crate::i18n::{I18n, Lang};
pub use crate::picker::{Direction, Panel, PickOutcome, Picker, RangeState, Unit, View};
pub use crate::registry::{Registry, RegistryError};
pub use crate::shortcut::{Shortcut, ShortcutValue};
