use super::help::Help;
use super::panel::{
    text_width, time_fields, Canvas, Focus, PanelView, PANEL_HEIGHT, PANEL_WIDTH,
};
use super::theme::{
    Palette, BASE_STYLE, FOCUSED_BUTTON_STYLE, HINT_STYLE, INPUT_STYLE, MARK_STYLE,
    OTHER_MONTH_STYLE,
};
use crossterm::event::{poll, read, KeyCode, KeyEvent, KeyModifiers};
use laydate::geometry::{self, place_panel, Size, Viewport};
use laydate::{Button, Clock, Direction, Panel, PickOutcome, Picker, PickerType, Unit, View};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Margin, Rect},
    style::Style,
    widgets::{Block, Clear, StatefulWidget, Widget},
    Terminal,
};
use std::io::{self, Write};
use std::iter::zip;
use std::time::{Duration, Instant};

/// How long to wait for a key before checking whether the hint has expired
const TICK: Duration = Duration::from_millis(250);

/// Position of the stand-in for the input field the picker is attached to
const INPUT_TOP: u16 = 1;
const INPUT_LEFT: u16 = 2;
const INPUT_WIDTH: u16 = 30;

/// Columns between the two panels of a range
const PANEL_GAP: u16 = 2;


#[derive(Debug)]
pub(crate) struct App<C> {
    picker: Picker<C>,
    /// The panel with the keyboard focus
    panel: Panel,
    focus: [Focus; 2],
    /// The views the focus positions were computed for
    views: [View; 2],
    palette: Palette,
    state: AppState,
    committed: Option<String>,
}

impl<C: Clock> App<C> {
    pub(crate) fn new(mut picker: Picker<C>) -> App<C> {
        picker.activate();
        let palette = Palette::new(&picker.theme());
        let mut app = App {
            picker,
            panel: Panel::Left,
            focus: [Focus::default(); 2],
            views: [View::Date; 2],
            palette,
            state: AppState::Picking,
            committed: None,
        };
        app.reset_focus(Panel::Left);
        app.reset_focus(Panel::Right);
        app
    }

    /// Run until the user quits or a value is committed.  Returns the
    /// committed value; an empty string means the input was cleared.
    pub(crate) fn run<B: Backend>(
        mut self,
        mut terminal: Terminal<B>,
    ) -> io::Result<Option<String>>
    where
        io::Error: From<B::Error>,
    {
        while !self.quitting() {
            self.draw(&mut terminal)?;
            self.handle_input()?;
            self.picker.tick(Instant::now());
        }
        self.picker.deactivate();
        Ok(self.committed)
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()>
    where
        io::Error: From<B::Error>,
    {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        if !poll(TICK)? {
            return Ok(());
        }
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = read()?.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        Ok(())
    }

    // Returns `false` if the key does nothing or the picker refused it
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match self.state {
            AppState::Picking => self.handle_picking_key(key),
            AppState::Helping => {
                self.state = AppState::Picking;
                true
            }
            AppState::Quitting => false,
        }
    }

    fn handle_picking_key(&mut self, key: KeyCode) -> bool {
        let panel = self.panel;
        let outcome = match key {
            KeyCode::Left | KeyCode::Char('h') => return self.move_focus(-1, 0),
            KeyCode::Right | KeyCode::Char('l') => return self.move_focus(1, 0),
            KeyCode::Up | KeyCode::Char('k') => return self.move_focus(0, -1),
            KeyCode::Down | KeyCode::Char('j') => return self.move_focus(0, 1),
            KeyCode::Enter | KeyCode::Char(' ') => self.select_focused(),
            KeyCode::Char('[') => self.picker.navigate(Direction::Prev, Unit::Month, panel),
            KeyCode::Char(']') => self.picker.navigate(Direction::Next, Unit::Month, panel),
            KeyCode::Char('{') => self.picker.navigate(Direction::Prev, Unit::Year, panel),
            KeyCode::Char('}') => self.picker.navigate(Direction::Next, Unit::Year, panel),
            KeyCode::Char('d') if self.view_allowed(View::Date) => {
                self.picker.switch_view(View::Date, panel)
            }
            KeyCode::Char('y') if self.view_allowed(View::Year) => {
                self.picker.switch_view(View::Year, panel)
            }
            KeyCode::Char('m') if self.view_allowed(View::Month) => {
                self.picker.switch_view(View::Month, panel)
            }
            KeyCode::Char('t') if self.picker.config().picker_type == PickerType::DateTime => {
                self.picker.toggle_time()
            }
            KeyCode::Tab if self.picker.config().is_range() => {
                self.panel = panel.other();
                PickOutcome::Updated
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = u8::try_from(c).map_or(0, |b| usize::from(b - b'1'));
                self.picker.apply_shortcut(index)
            }
            KeyCode::Char('x') => self.picker.click(Button::Clear),
            KeyCode::Char('.') => self.picker.click(Button::Now),
            KeyCode::Char('o') => self.picker.click(Button::Confirm),
            KeyCode::Char('?') => {
                self.state = AppState::Helping;
                PickOutcome::Updated
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                self.state = AppState::Quitting;
                PickOutcome::Updated
            }
            _ => PickOutcome::Ignored,
        };
        self.apply(outcome)
    }

    /// Whether the user may switch to `view` for this picker type
    fn view_allowed(&self, view: View) -> bool {
        matches!(
            (self.picker.config().picker_type, view),
            (PickerType::Year, View::Year)
                | (PickerType::Month, View::Year | View::Month)
                | (
                    PickerType::Date | PickerType::DateTime,
                    View::Year | View::Month | View::Date
                )
        )
    }

    fn apply(&mut self, outcome: PickOutcome) -> bool {
        match outcome {
            PickOutcome::Updated => {
                self.sync_focus();
                true
            }
            PickOutcome::Committed(value) => {
                self.finish(value);
                true
            }
            PickOutcome::Cleared => {
                self.finish(String::new());
                true
            }
            PickOutcome::Rejected(_) | PickOutcome::Ignored => false,
        }
    }

    fn finish(&mut self, value: String) {
        self.committed = Some(value);
        self.state = AppState::Quitting;
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    fn focus(&self, panel: Panel) -> Focus {
        self.focus[slot(panel)]
    }

    fn focus_mut(&mut self, panel: Panel) -> &mut Focus {
        &mut self.focus[slot(panel)]
    }

    fn reset_focus(&mut self, panel: Panel) {
        let i = slot(panel);
        self.focus[i].reset(&self.picker, panel);
        self.views[i] = self.picker.view(panel);
    }

    /// Re-aim the focus of any panel whose view changed and keep the rest
    /// inside their panels
    fn sync_focus(&mut self) {
        for panel in [Panel::Left, Panel::Right] {
            let i = slot(panel);
            if self.views[i] == self.picker.view(panel) {
                self.focus[i].clamp(&self.picker, panel);
            } else {
                self.reset_focus(panel);
            }
        }
    }

    fn move_focus(&mut self, dx: i32, dy: i32) -> bool {
        match self.picker.view(self.panel) {
            View::Date => self.move_day(dx + dy * 7),
            View::Year => self.move_wide(dx + dy * 3, true),
            View::Month => self.move_wide(dx + dy * 3, false),
            View::Time if dy == 0 => self.move_column(dx),
            View::Time => self.step_time(dy),
        }
    }

    /// Move the focused day, paging the panel when it leaves the month
    fn move_day(&mut self, days: i32) -> bool {
        let panel = self.panel;
        let grid = self.picker.grid(panel);
        let Some(day) = grid.iter().nth(self.focus(panel).cell) else {
            return false;
        };
        let target = day.date().add_days(i64::from(days));
        if (target.year, target.month) != (grid.year(), grid.month()) {
            let direction = if days < 0 {
                Direction::Prev
            } else {
                Direction::Next
            };
            self.picker.navigate(direction, Unit::Month, panel);
        }
        match self.picker.grid(panel).position(&target) {
            Some(i) => {
                self.focus_mut(panel).cell = i;
                self.picker.hover(target);
                true
            }
            None => false,
        }
    }

    /// Move within the year page or month list; leaving the year page
    /// turns it
    fn move_wide(&mut self, delta: i32, years: bool) -> bool {
        let panel = self.panel;
        let len = if years {
            self.picker.year_page(panel).len()
        } else {
            12
        };
        let len = i32::try_from(len).unwrap_or(i32::MAX);
        let cell = i32::try_from(self.focus(panel).cell).unwrap_or_default() + delta;
        let cell = if (0..len).contains(&cell) {
            cell
        } else if years {
            let direction = if cell < 0 {
                Direction::Prev
            } else {
                Direction::Next
            };
            self.picker.navigate(direction, Unit::Year, panel);
            cell.rem_euclid(len)
        } else {
            return false;
        };
        self.focus_mut(panel).cell = usize::try_from(cell).unwrap_or_default();
        true
    }

    fn move_column(&mut self, delta: i32) -> bool {
        let panel = self.panel;
        let columns = time_fields(&self.picker).len();
        let column = i32::try_from(self.focus(panel).column).unwrap_or_default() + delta;
        match usize::try_from(column) {
            Ok(column) if column < columns => {
                self.focus_mut(panel).column = column;
                true
            }
            _ => false,
        }
    }

    /// Step the focused time column, skipping disabled values
    fn step_time(&mut self, delta: i32) -> bool {
        let panel = self.panel;
        let fields = time_fields(&self.picker);
        let Some(&field) = fields.get(self.focus(panel).column) else {
            return false;
        };
        let modulus = i32::from(field.max()) + 1;
        let mut value = i32::from(field.get(&self.picker.time_value(panel)));
        for _ in 0..modulus {
            value = (value + delta).rem_euclid(modulus);
            let candidate = u8::try_from(value).unwrap_or_default();
            if !self.picker.is_time_disabled(field, candidate, panel) {
                let outcome = self.picker.select_time(field, candidate, panel);
                return self.apply(outcome);
            }
        }
        false
    }

    fn select_focused(&mut self) -> PickOutcome {
        let panel = self.panel;
        let focus = self.focus(panel);
        match self.picker.view(panel) {
            View::Date => match self.picker.grid(panel).iter().nth(focus.cell) {
                Some(day) => self.picker.select_cell(day, panel),
                None => PickOutcome::Ignored,
            },
            View::Year => match self.picker.year_page(panel).get(focus.cell).copied() {
                Some(year) => self.picker.select_year(year, panel),
                None => PickOutcome::Ignored,
            },
            View::Month => match u8::try_from(focus.cell) {
                Ok(month) => self.picker.select_month(month, panel),
                Err(_) => PickOutcome::Ignored,
            },
            View::Time => self.picker.click(Button::Confirm),
        }
    }

    fn title(&self) -> &'static str {
        let i18n = self.picker.i18n();
        match self.picker.view(self.panel) {
            View::Year => i18n.year_tips,
            View::Month => i18n.month_tips,
            View::Date => i18n.date_tips,
            View::Time => i18n.time_tips,
        }
    }

    fn popup_size(&self) -> (u16, u16) {
        let panels = if self.picker.config().is_range() {
            PANEL_WIDTH * 2 + PANEL_GAP
        } else {
            PANEL_WIDTH
        };
        (panels + 2, PANEL_HEIGHT + self.footer_lines() + 2)
    }

    /// The footer line, if shown, and the status line
    fn footer_lines(&self) -> u16 {
        if self.picker.config().show_bottom {
            2
        } else {
            1
        }
    }

    /// Where the popup goes, below the input field unless it does not fit
    fn popup_area(&self, area: Rect, input: Rect) -> Rect {
        let (width, height) = self.popup_size();
        let anchor = geometry::Rect {
            top: i32::from(input.y.saturating_sub(area.y)),
            left: i32::from(input.x.saturating_sub(area.x)),
            width: i32::from(input.width),
            height: i32::from(input.height),
        };
        let viewport = Viewport {
            scroll_top: 0,
            scroll_left: 0,
            width: i32::from(area.width),
            height: i32::from(area.height),
        };
        let size = Size {
            width: i32::from(width),
            height: i32::from(height),
        };
        let placement = place_panel(anchor, size, viewport);
        Rect {
            x: area.x + u16::try_from(placement.left).unwrap_or_default(),
            y: area.y + u16::try_from(placement.top).unwrap_or_default(),
            width,
            height,
        }
        .intersection(area)
    }

    /// Text for the line under the footer: the hint if one is showing, else
    /// what is noted on the focused day, else the shortcut keys
    fn status_line(&self) -> Option<(String, Style)> {
        if let Some(hint) = self.picker.hint().content() {
            return Some((hint.replace('\n', " "), HINT_STYLE));
        }
        if self.picker.view(self.panel) == View::Date {
            let grid = self.picker.grid(self.panel);
            if let Some(day) = grid.iter().nth(self.focus(self.panel).cell) {
                let note = day
                    .custom_content
                    .clone()
                    .or_else(|| (!day.mark.is_empty()).then(|| day.mark.clone()))
                    .or_else(|| day.holiday.map(|h| h.symbol().to_owned()));
                if let Some(note) = note {
                    return Some((note, MARK_STYLE));
                }
            }
        }
        let shortcuts = &self.picker.config().shortcuts;
        if shortcuts.is_empty() {
            return None;
        }
        let keys = zip(1.., shortcuts)
            .map(|(n, s)| format!("{n} {}", s.text))
            .collect::<Vec<_>>()
            .join("  ");
        Some((keys, BASE_STYLE))
    }

    fn render_panels(&mut self, inner: Rect, buf: &mut Buffer) {
        let panels: &[Panel] = if self.picker.config().is_range() {
            &[Panel::Left, Panel::Right]
        } else {
            &[Panel::Left]
        };
        for (i, &panel) in zip(0u16.., panels) {
            let area = Rect {
                x: inner.x + i * (PANEL_WIDTH + PANEL_GAP),
                y: inner.y,
                width: PANEL_WIDTH,
                height: PANEL_HEIGHT,
            }
            .intersection(inner);
            PanelView::new(&self.picker, panel, self.palette)
                .focused(panel == self.panel)
                .render(area, buf, &mut self.focus[slot(panel)]);
        }
    }

    fn render_footer(&self, inner: Rect, buf: &mut Buffer) {
        let status = self.status_line();
        let mut canvas = Canvas::new(inner, buf);
        let status_row = PANEL_HEIGHT + self.footer_lines() - 1;
        if let Some((text, style)) = status {
            canvas.print(status_row, 0, text, style);
        }
        if !self.picker.config().show_bottom {
            return;
        }
        if self.picker.show_preview() {
            canvas.print(PANEL_HEIGHT, 0, self.picker.preview(), BASE_STYLE);
        }
        let buttons = self.picker.footer_buttons();
        let mut x = inner.width;
        for (i, &(button, label)) in buttons.iter().enumerate().rev() {
            let width = text_width(label);
            x = x.saturating_sub(width);
            let style = if button == Button::Confirm && self.picker.confirm_disabled() {
                OTHER_MONTH_STYLE
            } else {
                FOCUSED_BUTTON_STYLE
            };
            canvas.print(PANEL_HEIGHT, x, label, style);
            if i > 0 {
                x = x.saturating_sub(1);
            }
        }
    }
}

impl<C: Clock> Widget for &mut App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let input = Rect {
            x: area.x + INPUT_LEFT,
            y: area.y + INPUT_TOP,
            width: INPUT_WIDTH,
            height: 1,
        }
        .intersection(area);
        buf.set_style(input, INPUT_STYLE);
        Canvas::new(input, buf).print(0, 0, self.picker.preview(), INPUT_STYLE);
        let popup = self.popup_area(area, input);
        Clear.render(popup, buf);
        Block::bordered()
            .title(format!(" {} ", self.title()))
            .style(BASE_STYLE)
            .render(popup, buf);
        let inner = popup.inner(Margin::new(1, 1));
        self.render_panels(inner, buf);
        self.render_footer(inner, buf);
        if self.state == AppState::Helping {
            Help(BASE_STYLE).render(area, buf);
        }
    }
}

fn slot(panel: Panel) -> usize {
    match panel {
        Panel::Left => 0,
        Panel::Right => 1,
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Picking,
    Helping,
    Quitting,
}

#[cfg(test)]
mod tests {
    use super::*;
    use laydate::{DateObject, FixedClock, Lang, LaydateConfig, RangeMode, ShortcutValue};
    use ratatui::style::Color;

    const NOW: DateObject = DateObject::new(2024, 5, 15).with_time(9, 30, 0);

    fn app(config: LaydateConfig) -> App<FixedClock> {
        App::new(Picker::with_clock(config.with_lang(Lang::En), FixedClock(NOW)))
    }

    fn render(app: &mut App<FixedClock>) -> Buffer {
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
    }

    fn row(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol())
            .collect::<String>()
            .trim_end()
            .to_owned()
    }

    #[test]
    fn test_date_panel() {
        let mut app = app(LaydateConfig::default());
        let buffer = render(&mut app);
        let rows = (0..15).map(|y| row(&buffer, y)).collect::<Vec<_>>();
        assert_eq!(
            rows,
            [
                "",
                "  2024-06-15",
                "  ┌ Select Date ───────────────┐",
                "  │‹         2024 Jun         ›│",
                "  │ Su  Mo  Tu  We  Th  Fr  Sa │",
                "  │ 26  27  28  29  30  31   1 │",
                "  │  2   3   4   5   6   7   8 │",
                "  │  9  10  11  12  13  14 [15]│",
                "  │ 16  17  18  19  20  21  22 │",
                "  │ 23  24  25  26  27  28  29 │",
                "  │ 30   1   2   3   4   5   6 │",
                "  │2024-06-15 Clear Now Confirm│",
                "  │                            │",
                "  └────────────────────────────┘",
                "",
            ]
        );
        assert_eq!(buffer[(28, 7)].bg, Color::Rgb(0x16, 0xb7, 0x77));
        assert_eq!(buffer[(3, 5)].fg, Color::DarkGray);
    }

    #[test]
    fn test_pick_with_keys() {
        let mut app = app(LaydateConfig::default());
        assert!(app.handle_key(KeyCode::Right));
        assert!(app.handle_key(KeyCode::Enter));
        assert!(app.quitting());
        assert_eq!(app.committed.as_deref(), Some("2024-06-16"));
    }

    #[test]
    fn test_focus_pages_into_next_month() {
        let mut app = app(LaydateConfig::default());
        for _ in 0..3 {
            assert!(app.handle_key(KeyCode::Down));
        }
        assert_eq!(app.picker.cursor_date(Panel::Left).month, 6);
        assert_eq!(app.focus(Panel::Left).cell, 6);
        assert!(!app.quitting());
    }

    #[test]
    fn test_year_view_keys() {
        let mut app = app(LaydateConfig::default().with_auto_confirm(false));
        assert!(app.handle_key(KeyCode::Char('y')));
        assert_eq!(app.focus(Panel::Left).cell, 7);
        assert!(app.handle_key(KeyCode::Up));
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(app.picker.view(Panel::Left), View::Month);
        assert_eq!(app.picker.cursor_date(Panel::Left).year, 2021);
        assert_eq!(app.focus(Panel::Left).cell, 5);
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(app.picker.view(Panel::Left), View::Date);
        assert!(app.handle_key(KeyCode::Char('o')));
        assert_eq!(app.committed.as_deref(), Some("2024-06-15"));
    }

    #[test]
    fn test_refused_keys() {
        let mut app = app(LaydateConfig::default().with_min("2024-06-15"));
        assert!(!app.handle_key(KeyCode::Char('t')));
        assert!(!app.handle_key(KeyCode::Tab));
        assert!(!app.handle_key(KeyCode::Char('z')));
        assert!(app.handle_key(KeyCode::Left));
        assert!(!app.handle_key(KeyCode::Enter));
        assert_eq!(app.picker.hint().content(), Some("Date is unavailable"));
        let buffer = render(&mut app);
        assert_eq!(row(&buffer, 12), "  │Date is unavailable         │");
    }

    #[test]
    fn test_range_tab_and_clear() {
        let mut app = app(LaydateConfig::default().with_range(RangeMode::On).with_linked(true));
        assert!(app.handle_key(KeyCode::Tab));
        assert_eq!(app.panel, Panel::Right);
        let buffer = render(&mut app);
        assert_eq!(
            row(&buffer, 3),
            "  │‹         2024 Jun         ›  ‹         2024 Jul         ›│"
        );
        assert!(app.handle_key(KeyCode::Char('x')));
        assert_eq!(app.committed.as_deref(), Some(""));
    }

    #[test]
    fn test_hidden_footer() {
        let config = LaydateConfig::default()
            .with_show_bottom(false)
            .with_shortcut("yesterday", ShortcutValue::text("yesterday"));
        let mut app = app(config);
        let buffer = render(&mut app);
        assert_eq!(row(&buffer, 10), "  │ 30   1   2   3   4   5   6 │");
        assert_eq!(row(&buffer, 11), "  │1 yesterday                 │");
        assert_eq!(row(&buffer, 12), "  └────────────────────────────┘");
        assert!(app.handle_key(KeyCode::Char('1')));
        assert_eq!(app.committed.as_deref(), Some("2024-06-14"));
    }

    #[test]
    fn test_help() {
        let mut app = app(LaydateConfig::default());
        assert!(app.handle_key(KeyCode::Char('?')));
        let buffer = render(&mut app);
        assert!((0..24).any(|y| row(&buffer, y).contains(" Commands ")));
        assert!(app.handle_key(KeyCode::Char('n')));
        assert_eq!(app.state, AppState::Picking);
    }
}
