// pacer-tui/src/app/actions.rs
use anyhow::Result;
use chrono::{Datelike, Local, Months, NaiveDate};
use pacer_lib::{CueKind, CueSink, SchedulerState};
use std::io::{stdout, Write};
use std::time::Instant;

use super::App;

/// Rings the terminal bell; works from inside the alternate screen.
pub struct TerminalBell;

impl CueSink for TerminalBell {
    fn play(&mut self, _cue: CueKind) -> Result<()> {
        let mut out = stdout();
        out.write_all(b"\x07")?;
        out.flush()?;
        Ok(())
    }
}

impl App {
    pub(super) fn start_session(&mut self) {
        let events = self.session.start(Instant::now());
        self.handle_session_events(&events);
    }

    pub(super) fn toggle_pause(&mut self) {
        self.session.toggle_pause(Instant::now());
    }

    pub(super) fn reset_session(&mut self) {
        self.session.reset();
    }

    pub(super) fn cancel_session(&mut self) {
        self.session.cancel();
    }

    pub(super) fn session_is_active(&self) -> bool {
        self.session.state().is_active()
    }

    pub(super) fn day_list_next(&mut self) {
        let len = self.service.catalog().workouts().len();
        if len == 0 {
            return;
        }
        let i = match self.day_list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.select_day(i);
    }

    pub(super) fn day_list_previous(&mut self) {
        let len = self.service.catalog().workouts().len();
        if len == 0 {
            return;
        }
        let i = match self.day_list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.select_day(i);
    }

    fn select_day(&mut self, index: usize) {
        self.day_list_state.select(Some(index));
        self.selected_variant = None;
        self.reload_session();
    }

    /// Switches the selected day to its next variant, if it has any.
    pub(super) fn cycle_variant(&mut self) {
        let Some(next) = self
            .session
            .workout()
            .next_variant_name()
            .map(str::to_string)
        else {
            self.set_error(format!("{} has no variants", self.session.workout().day));
            return;
        };
        self.selected_variant = Some(next);
        self.reload_session();
    }

    /// Rebuilds the session for the selected day and variant, dropping any run in progress.
    fn reload_session(&mut self) {
        let Some(day) = self
            .day_list_state
            .selected()
            .and_then(|i| self.service.catalog().workouts().get(i))
            .map(|w| w.day.clone())
        else {
            return;
        };
        if self.session.state() != SchedulerState::Idle {
            self.session.reset();
        }
        let workout = self
            .service
            .workout_or_default(&day, self.selected_variant.as_deref());
        self.session = self
            .service
            .new_session(&workout, Box::new(TerminalBell));
    }

    pub(super) fn change_month(&mut self, delta: i32) {
        let Some(first) = NaiveDate::from_ymd_opt(self.calendar_year, self.calendar_month, 1)
        else {
            return;
        };
        let months = Months::new(delta.unsigned_abs());
        let shifted = if delta < 0 {
            first.checked_sub_months(months)
        } else {
            first.checked_add_months(months)
        };
        if let Some(date) = shifted {
            self.calendar_year = date.year();
            self.calendar_month = date.month();
            self.refresh_calendar();
        }
    }

    pub(super) fn calendar_to_today(&mut self) {
        let today = Local::now().date_naive();
        self.calendar_year = today.year();
        self.calendar_month = today.month();
        self.refresh_calendar();
    }
}
