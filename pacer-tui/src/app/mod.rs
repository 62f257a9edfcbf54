// pacer-tui/src/app/mod.rs
use chrono::{Datelike, Local};
use pacer_lib::{MonthGrid, PacerService, SchedulerEvent, Session};
use ratatui::widgets::ListState;
use std::time::{Duration, Instant};
use tracing::info;

mod actions;
mod input;
pub mod state;

pub use state::{ActiveModal, ActiveTab};

const ERROR_DISPLAY_TIME: Duration = Duration::from_secs(5);

pub struct App {
    pub service: PacerService,
    pub active_tab: ActiveTab,
    pub should_quit: bool,
    pub active_modal: ActiveModal,
    pub last_error: Option<String>,

    // === Plan Tab State ===
    pub day_list_state: ListState,
    pub selected_variant: Option<String>,
    pub session: Session,

    // === Calendar Tab State ===
    pub calendar_year: i32,
    pub calendar_month: u32,
    pub calendar: Option<MonthGrid>,

    error_clear_time: Option<Instant>,
}

impl App {
    pub fn new(service: PacerService) -> Self {
        let today = Local::now().date_naive();
        let default_day = service.config.default_day.clone();
        let workout = service.workout_or_default(&default_day, None);
        let day_index = service
            .catalog()
            .workouts()
            .iter()
            .position(|w| w.day == workout.day);
        let session = service.new_session(&workout, Box::new(actions::TerminalBell));

        let mut day_list_state = ListState::default();
        day_list_state.select(day_index.or(Some(0)));

        let mut app = Self {
            service,
            active_tab: ActiveTab::Plan,
            should_quit: false,
            active_modal: ActiveModal::None,
            last_error: None,
            day_list_state,
            selected_variant: None,
            session,
            calendar_year: today.year(),
            calendar_month: today.month(),
            calendar: None,
            error_clear_time: None,
        };
        app.refresh_calendar();
        app
    }

    /// Advances the session to `now` and handles what came out of it.
    pub fn on_tick(&mut self, now: Instant) {
        if let Some(clear_time) = self.error_clear_time {
            if now >= clear_time {
                self.last_error = None;
                self.error_clear_time = None;
            }
        }

        let events = self.session.poll(now);
        self.handle_session_events(&events);
    }

    /// Saves and refreshes the calendar once the session reports completion.
    fn handle_session_events(&mut self, events: &[SchedulerEvent]) {
        if self.service.record_if_completed(&self.session, events) {
            info!(day = %self.session.workout().day, "session recorded");
            self.refresh_calendar();
        }
    }

    pub fn refresh_calendar(&mut self) {
        match self
            .service
            .month_calendar(self.calendar_year, self.calendar_month)
        {
            Ok(grid) => self.calendar = Some(grid),
            Err(e) => self.set_error(format!("Calendar: {e}")),
        }
    }

    fn set_error(&mut self, msg: String) {
        self.last_error = Some(msg);
        self.error_clear_time = Some(Instant::now() + ERROR_DISPLAY_TIME);
    }
}
