use super::{Panel, PickOutcome, Picker, RangeState};
use crate::config::{Button, PickerType};
use crate::date::Clock;
use crate::event::{Emission, Event};
use crate::shortcut::{Resolved, ShortcutValue};

impl<C: Clock> Picker<C> {
    /// Handle a footer button
    pub fn click(&mut self, button: Button) -> PickOutcome {
        match button {
            Button::Clear => self.clear(),
            Button::Now => self.now(),
            Button::Confirm => {
                let outcome = self.confirm();
                if let PickOutcome::Committed(_) = outcome {
                    let emission = self.emission();
                    self.fire(&Event::Confirm(emission));
                }
                outcome
            }
        }
    }

    /// Validate and emit the selected value(s)
    pub fn confirm(&mut self) -> PickOutcome {
        if self.confirm_disabled() {
            let message = self.i18n().invalid_end_early.to_owned();
            return self.reject(message);
        }
        let constraints = self.constraints();
        let checked = if self.config.is_range() {
            constraints.check_range(&self.start, &self.end)
        } else {
            constraints.check_bounds(&self.current)
        };
        if let Err(e) = checked {
            return self.reject_error(&e);
        }
        self.emit_final(true)
    }

    /// Tell the host to empty its input.  A time range is reset to the whole
    /// of today.
    pub fn clear(&mut self) -> PickOutcome {
        let emission = Emission {
            value: String::new(),
            ..self.emission()
        };
        self.fire(&Event::Clear(emission));
        self.range_state = RangeState::Idle;
        self.hover = None;
        if self.config.is_range() && self.config.picker_type == PickerType::Time {
            let today = self.clock.today();
            self.start = today;
            self.end = today.with_time(23, 59, 59);
            self.left.date = self.start;
            self.right.date = self.end;
        }
        PickOutcome::Cleared
    }

    /// Select the current time and confirm it
    pub fn now(&mut self) -> PickOutcome {
        let now = self.clock.now();
        let outcome = self.commit_value(Resolved::Range(now, now));
        if let PickOutcome::Committed(_) = outcome {
            let emission = self.emission();
            self.fire(&Event::Now(emission));
        }
        outcome
    }

    /// Apply the configured shortcut at `index` and confirm it
    pub fn apply_shortcut(&mut self, index: usize) -> PickOutcome {
        match self.config.shortcuts.get(index) {
            Some(shortcut) => {
                let value = shortcut.value.clone();
                self.apply_shortcut_value(&value)
            }
            None => PickOutcome::Ignored,
        }
    }

    pub fn apply_shortcut_value(&mut self, value: &ShortcutValue) -> PickOutcome {
        let resolved = value.resolve(
            self.config.is_range(),
            self.config.date_format(),
            &self.clock,
        );
        self.commit_value(resolved)
    }

    /// Validate a value from "now" or a shortcut against min/max, then make
    /// it the selection and emit it.  Nothing changes when it is refused.
    fn commit_value(&mut self, value: Resolved) -> PickOutcome {
        let (start, end) = match value {
            Resolved::Single(d) => (d, d),
            Resolved::Range(start, end) => (start, end),
        };
        let constraints = self.constraints();
        let checked = if self.config.is_range() {
            constraints.check_range(&start, &end)
        } else {
            constraints.check_bounds(&start)
        };
        if let Err(e) = checked {
            return self.reject_error(&e);
        }
        if self.config.is_range() {
            self.start = start;
            self.end = end;
            self.range_state = RangeState::Idle;
            self.hover = None;
            self.move_cursor(Panel::Left, start);
            if !self.config.is_linked() {
                self.right.date = end;
            }
        } else {
            self.current = start;
            self.left.date = start;
        }
        self.emit_final(true)
    }

    /// Emit the value as final: `select`, optionally `change`, then `done`
    pub(super) fn emit_final(&self, with_change: bool) -> PickOutcome {
        let emission = self.emission();
        tracing::trace!(value = %emission.value, "committing");
        self.fire(&Event::Select(emission.value.clone()));
        if with_change {
            self.fire(&Event::Change(emission.clone()));
        }
        self.fire(&Event::Done(emission.clone()));
        PickOutcome::Committed(emission.value)
    }
}
