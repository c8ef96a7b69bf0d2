use super::{Direction, Panel, PickOutcome, Picker, RangeState, Unit, View};
use crate::calendar::{CalendarDay, DayKind};
use crate::config::PickerType;
use crate::constraint::{ConstraintError, TimeField};
use crate::date::{days_in_month, Clock, DateObject};
use crate::event::Event;

impl<C: Clock> Picker<C> {
    /// Pick a day cell from the grid of `panel`.
    ///
    /// Disabled days are refused with a hint.  Days of the neighbouring
    /// months page the panel instead of being picked.
    pub fn select_cell(&mut self, day: &CalendarDay, panel: Panel) -> PickOutcome {
        if day.disabled || self.constraints().is_date_disabled(day.year, day.month, day.day) {
            return self.reject_error(&ConstraintError::DisabledDate(day.date()));
        }
        match day.kind {
            DayKind::Prev => return self.navigate(Direction::Prev, Unit::Month, panel),
            DayKind::Next => return self.navigate(Direction::Next, Unit::Month, panel),
            DayKind::Current => (),
        }
        if self.config.is_range() {
            let picked = day.date();
            if self.config.is_linked() {
                self.range_pick(|_| picked);
            } else {
                match panel {
                    Panel::Left => self.start = picked,
                    Panel::Right => self.end = picked,
                }
            }
            return PickOutcome::Updated;
        }
        self.current = DateObject {
            year: day.year,
            month: day.month,
            date: day.day,
            ..self.current
        };
        self.left.date = DateObject {
            date: day.day,
            ..self.current
        };
        let emission = self.emission();
        self.fire(&Event::Change(emission));
        match self.config.picker_type {
            PickerType::DateTime => {
                self.left.set_view(View::Time);
                PickOutcome::Updated
            }
            PickerType::Time => PickOutcome::Updated,
            PickerType::Year | PickerType::Month | PickerType::Date => {
                if self.config.auto_confirm {
                    self.emit_final(false)
                } else {
                    PickOutcome::Updated
                }
            }
        }
    }

    /// Record where the pointer is while the second end of a linked range is
    /// being picked
    pub fn hover(&mut self, date: DateObject) -> PickOutcome {
        if self.config.is_range() && self.range_state == RangeState::Selecting {
            self.hover = Some(date);
            PickOutcome::Updated
        } else {
            PickOutcome::Ignored
        }
    }

    /// One gesture of a linked range pick.  The first sets the start, the
    /// second sets the end and swaps the two if they are out of order.
    /// `merge` builds the picked value from the end it replaces.
    fn range_pick<F: Fn(DateObject) -> DateObject>(&mut self, merge: F) {
        match self.range_state {
            RangeState::Idle => {
                self.start = merge(self.start);
                self.range_state = RangeState::Selecting;
                tracing::trace!(start = %self.start, "range start picked");
            }
            RangeState::Selecting => {
                let end = merge(self.end);
                if self.start.timestamp() > end.timestamp() {
                    self.end = self.start;
                    self.start = end;
                } else {
                    self.end = end;
                }
                self.range_state = RangeState::Idle;
                self.hover = None;
                tracing::trace!(start = %self.start, end = %self.end, "range completed");
            }
        }
    }

    pub fn select_year(&mut self, year: i32, panel: Panel) -> PickOutcome {
        let kind = self.config.picker_type;
        if self.config.is_range() && kind == PickerType::Year {
            let pick = |base: DateObject| DateObject {
                year,
                month: 0,
                date: 1,
                ..base
            };
            if self.config.is_linked() {
                self.range_pick(pick);
            } else {
                match panel {
                    Panel::Left => self.start = pick(self.start),
                    Panel::Right => self.end = pick(self.end),
                }
                let date = self.cursor(panel).date;
                self.cursor_mut(panel).date = date.add_years(year - date.year);
            }
            return PickOutcome::Updated;
        }
        let date = self.cursor(panel).date;
        self.move_cursor(panel, date.add_years(year - date.year));
        if !self.config.is_range() && kind == PickerType::Year {
            let value = self.current.add_years(year - self.current.year);
            return self.pick_single(value);
        }
        self.cursor_mut(panel).set_view(View::Month);
        PickOutcome::Updated
    }

    /// `month` is 0-based
    pub fn select_month(&mut self, month: u8, panel: Panel) -> PickOutcome {
        let month = month.min(11);
        let kind = self.config.picker_type;
        let date = self.cursor(panel).date;
        let moved = DateObject {
            month,
            date: date.date.min(days_in_month(date.year, month)),
            ..date
        };
        if self.config.is_range() && kind == PickerType::Month {
            let pick = |base: DateObject| DateObject {
                year: date.year,
                month,
                date: 1,
                ..base
            };
            if self.config.is_linked() {
                self.range_pick(pick);
            } else {
                match panel {
                    Panel::Left => self.start = pick(self.start),
                    Panel::Right => self.end = pick(self.end),
                }
                self.cursor_mut(panel).date = moved;
            }
            return PickOutcome::Updated;
        }
        self.move_cursor(panel, moved);
        if !self.config.is_range() && kind == PickerType::Month {
            let value = DateObject {
                year: date.year,
                month,
                date: self.current.date.min(days_in_month(date.year, month)),
                ..self.current
            };
            return self.pick_single(value);
        }
        self.cursor_mut(panel).set_view(View::Date);
        PickOutcome::Updated
    }

    /// Set a year or month pick as the single value, confirming it when
    /// auto-confirm is on
    fn pick_single(&mut self, value: DateObject) -> PickOutcome {
        if self.config.auto_confirm {
            if let Err(e) = self.constraints().check_bounds(&value) {
                return self.reject_error(&e);
            }
            self.current = value;
            self.emit_final(true)
        } else {
            self.current = value;
            PickOutcome::Updated
        }
    }

    /// Set one time column of the value edited by `panel`
    pub fn select_time(&mut self, field: TimeField, value: u8, panel: Panel) -> PickOutcome {
        let context = self.time_value(panel);
        if let Err(e) = self.constraints().check_time(field, value, &context) {
            return self.reject_error(&e);
        }
        let updated = field.set(context, value);
        if !self.config.is_range() {
            self.current = updated;
        } else if panel == Panel::Right {
            self.end = updated;
            self.right.date = field.set(self.right.date, value);
        } else {
            self.start = updated;
            self.left.date = field.set(self.left.date, value);
        }
        PickOutcome::Updated
    }
}
