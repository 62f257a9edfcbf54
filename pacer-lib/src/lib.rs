// src/lib.rs
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use rusqlite::Connection;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;

// --- Declare modules ---
pub mod calendar;
mod config;
pub mod db;
pub mod format;
pub mod plan;
pub mod schedule;
pub mod scheduler;
pub mod session;
pub mod ticker;

// --- Expose public types ---
pub use calendar::{month_grid, CalendarDay, MonthGrid, WEEKDAY_HEADERS};
pub use config::{
    get_config_path as get_config_path_util, load as load_config_util, parse_color,
    save as save_config_util, Config, ConfigError, GoalConfig, StandardColor, Theme, Units,
};
pub use db::{CompletionRecord, DbError};
pub use format::{format_hms, format_mmss, format_speed, parse_mmss};
pub use plan::{GoalPace, PlanCatalog, PlanError, Segment, Variant, Workout};
pub use schedule::{expand, total_duration_sec, ExpandOptions, ScheduleUnit, UnitKind};
pub use scheduler::{CueKind, IntervalScheduler, SchedulerEvent, SchedulerState};
pub use session::{ChecklistRow, CueSink, RepChecklist, Session, SilentCue};
pub use ticker::Ticker;

pub struct PacerService {
    pub config: Config,
    pub conn: Connection,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
    catalog: PlanCatalog,
}

impl PacerService {
    /// Initializes the application service.
    /// # Errors
    /// Returns `anyhow::Error` if config/db path determination, loading, or initialization fails.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"))?;

        let db_path = db::get_db_path().context("Failed to determine database path")?;
        let conn = db::open_db(&db_path)
            .with_context(|| format!("Failed to open database at {db_path:?}"))?;

        Self::from_parts(config, conn, db_path, config_path)
    }

    /// Builds a service around an already opened connection, initializing its schema.
    /// # Errors
    /// Returns `anyhow::Error` if the schema cannot be created.
    /// An unparseable goal falls back to the default one.
    pub fn from_parts(
        config: Config,
        conn: Connection,
        db_path: PathBuf,
        config_path: PathBuf,
    ) -> Result<Self> {
        db::init_db(&conn).context("Failed to initialize database schema")?;
        let goal = goal_pace_from(&config).unwrap_or_else(|e| {
            warn!("{e:#}; planning with the default goal");
            GoalPace::default()
        });
        let catalog = PlanCatalog::standard(&goal);
        Ok(Self {
            config,
            conn,
            db_path,
            config_path,
            catalog,
        })
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    /// Saves the current configuration state.
    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn save_config(&self) -> Result<(), ConfigError> {
        config::save(&self.config_path, &self.config)
    }

    pub const fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    /// # Errors
    /// Returns an error if the configured goal cannot be parsed.
    pub fn goal_pace(&self) -> Result<GoalPace> {
        goal_pace_from(&self.config)
    }

    pub const fn expand_options(&self) -> ExpandOptions {
        ExpandOptions {
            trailing_rest: self.config.trailing_rest,
        }
    }

    /// Looks up a workout, optionally switching variant.
    /// # Errors
    /// Returns `PlanError` for an unknown day or variant.
    pub fn resolve_workout(&self, day: &str, variant: Option<&str>) -> Result<Workout, PlanError> {
        let workout = self.catalog.resolve(day)?;
        match variant {
            Some(name) => self.catalog.select_variant(workout, name),
            None => Ok(workout.clone()),
        }
    }

    /// Like [`resolve_workout`](Self::resolve_workout) but never fails: an unknown
    /// day falls back to the default day and an unknown variant to the day's default.
    pub fn workout_or_default(&self, day: &str, variant: Option<&str>) -> Workout {
        let workout = match self.catalog.resolve(day) {
            Ok(w) => w,
            Err(e) => {
                warn!("{e}; falling back to {}", self.config.default_day);
                match self
                    .catalog
                    .resolve(&self.config.default_day)
                    .ok()
                    .or_else(|| self.catalog.workouts().first())
                {
                    Some(w) => w,
                    None => return empty_workout(day),
                }
            }
        };

        match variant {
            Some(name) => self.catalog.select_variant(workout, name).unwrap_or_else(|e| {
                warn!("{e}; keeping the default variant");
                workout.clone()
            }),
            None => workout.clone(),
        }
    }

    pub fn build_schedule(&self, workout: &Workout) -> Vec<ScheduleUnit> {
        expand(&workout.segments, self.expand_options())
    }

    pub fn new_session(&self, workout: &Workout, cue: Box<dyn CueSink>) -> Session {
        let mut session = Session::new(workout, self.expand_options(), cue);
        session.set_cues_enabled(self.config.cues_enabled);
        session
    }

    /// Stores a completion for `date` (today when `None`), replacing any earlier one.
    /// # Errors
    /// Returns `anyhow::Error` wrapping `DbError`.
    pub fn record_completion(
        &self,
        day_name: &str,
        variant: Option<&str>,
        elapsed_sec: u64,
        date: Option<NaiveDate>,
    ) -> Result<CompletionRecord> {
        let record = CompletionRecord {
            date: date.unwrap_or_else(|| Local::now().date_naive()),
            day_name: day_name.to_string(),
            variant: variant.map(str::to_string),
            elapsed_sec,
            completed: true,
            recorded_at: Utc::now(),
        };
        db::record_completion(&self.conn, &record)
            .with_context(|| format!("Failed to record completion for {}", record.date))?;
        Ok(record)
    }

    /// Records `session` if `events` include its completion. Returns whether it did.
    pub fn record_if_completed(&self, session: &Session, events: &[SchedulerEvent]) -> bool {
        let completed = events
            .iter()
            .any(|e| matches!(e, SchedulerEvent::SessionCompleted { .. }));
        if completed {
            self.record_session_best_effort(session);
        }
        completed
    }

    /// Records a finished session, logging instead of failing.
    pub fn record_session_best_effort(&self, session: &Session) {
        let workout = session.workout();
        if let Err(e) = self.record_completion(
            &workout.day,
            workout.active_variant.as_deref(),
            session.scheduler().elapsed_sec(),
            None,
        ) {
            warn!("Could not save completed session: {e:#}");
        }
    }

    /// # Errors
    /// Returns `anyhow::Error` wrapping `DbError`.
    pub fn get_completion(&self, date: NaiveDate) -> Result<Option<CompletionRecord>> {
        db::get_completion(&self.conn, date).context("Failed to read completion")
    }

    /// # Errors
    /// Returns an error for an invalid month or a failed query.
    pub fn completed_dates_in_month(&self, year: i32, month: u32) -> Result<HashSet<NaiveDate>> {
        let (start, end) = calendar::month_bounds(year, month)?;
        let records = db::list_completions_between(&self.conn, start, end)
            .context("Failed to list completions for month")?;
        Ok(records
            .into_iter()
            .filter(|r| r.completed)
            .map(|r| r.date)
            .collect())
    }

    /// # Errors
    /// Returns an error for an invalid month or a failed query.
    pub fn month_calendar(&self, year: i32, month: u32) -> Result<MonthGrid> {
        let completed = self.completed_dates_in_month(year, month)?;
        month_grid(year, month, &completed, Local::now().date_naive())
    }

    /// # Errors
    /// Returns `anyhow::Error` wrapping `DbError`.
    pub fn list_history(&self, limit: u32) -> Result<Vec<CompletionRecord>> {
        db::list_recent_completions(&self.conn, limit).context("Failed to list history")
    }

    /// # Errors
    /// Returns `DbError::CompletionNotFound` if nothing was stored for `date`.
    pub fn delete_history_entry(&self, date: NaiveDate) -> Result<usize, DbError> {
        db::delete_completion(&self.conn, date)
    }

    /// Sets the goal time (`MM:SS`) and rebuilds the plan from it.
    /// # Errors
    /// Returns `ConfigError::InvalidTime` or a save failure.
    pub fn set_goal_time(&mut self, time: &str) -> Result<()> {
        parse_mmss(time)?;
        self.config.goal.goal_time = time.trim().to_string();
        self.rebuild_catalog()?;
        self.save_config()?;
        Ok(())
    }

    /// # Errors
    /// Returns `ConfigError::InvalidTime` or a save failure.
    pub fn set_last_time(&mut self, time: Option<&str>) -> Result<(), ConfigError> {
        if let Some(t) = time {
            parse_mmss(t)?;
        }
        self.config.goal.last_time = time.map(|t| t.trim().to_string());
        self.save_config()
    }

    /// # Errors
    /// Returns `ConfigError::InvalidDistance` for zero, or a save failure.
    pub fn set_goal_distance(&mut self, distance_m: u32) -> Result<()> {
        if distance_m == 0 {
            return Err(ConfigError::InvalidDistance.into());
        }
        self.config.goal.distance_m = distance_m;
        self.rebuild_catalog()?;
        self.save_config()?;
        Ok(())
    }

    /// # Errors
    /// Returns `ConfigError` variants if saving fails.
    pub fn set_trailing_rest(&mut self, enabled: bool) -> Result<(), ConfigError> {
        self.config.trailing_rest = enabled;
        self.save_config()
    }

    /// # Errors
    /// Returns `ConfigError` variants if saving fails.
    pub fn set_cues_enabled(&mut self, enabled: bool) -> Result<(), ConfigError> {
        self.config.cues_enabled = enabled;
        self.save_config()
    }

    /// # Errors
    /// Returns `ConfigError` variants if saving fails.
    pub fn set_units(&mut self, units: Units) -> Result<(), ConfigError> {
        self.config.units = units;
        self.save_config()
    }

    /// # Errors
    /// Returns `PlanError::UnknownDay` if the day is not in the plan, or a save failure.
    pub fn set_default_day(&mut self, day: &str) -> Result<()> {
        let canonical = self.catalog.resolve(day)?.day.clone();
        self.config.default_day = canonical;
        self.save_config()?;
        Ok(())
    }

    fn rebuild_catalog(&mut self) -> Result<()> {
        self.catalog = PlanCatalog::standard(&goal_pace_from(&self.config)?);
        Ok(())
    }
}

fn goal_pace_from(config: &Config) -> Result<GoalPace> {
    let goal_time = config
        .goal
        .goal_time_sec()
        .context("Invalid goal time in config")?;
    GoalPace::new(config.goal.distance_m, goal_time).context("Invalid goal in config")
}

fn empty_workout(day: &str) -> Workout {
    Workout {
        day: day.to_string(),
        title: String::new(),
        explanation: String::new(),
        warmup: Vec::new(),
        segments: Vec::new(),
        mobility: Vec::new(),
        variants: Vec::new(),
        active_variant: None,
    }
}
