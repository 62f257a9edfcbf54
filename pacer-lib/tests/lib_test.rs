use anyhow::Result;
use chrono::NaiveDate;
use pacer_lib::{
    expand, get_config_path_util, load_config_util, save_config_util, Config, CueKind, CueSink,
    DbError, ExpandOptions, GoalPace, PacerService, PlanCatalog, PlanError, SchedulerEvent,
    SchedulerState, SilentCue, Ticker, UnitKind, Units, Workout,
};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

// Helper function to create a test service with in-memory database
fn create_test_service(name: &str) -> Result<PacerService> {
    let conn = rusqlite::Connection::open_in_memory()?;
    let config_path: PathBuf =
        std::env::temp_dir().join(format!("pacer_test_{}_{name}.toml", std::process::id()));
    PacerService::from_parts(Config::default(), conn, ":memory:".into(), config_path)
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("pacer_test_{}_{name}", std::process::id()))
}

fn standard_catalog() -> PlanCatalog {
    PlanCatalog::standard(&GoalPace::new(2000, 480).unwrap())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[derive(Clone, Default)]
struct RecordingCue {
    played: Rc<RefCell<Vec<CueKind>>>,
}

impl CueSink for RecordingCue {
    fn play(&mut self, cue: CueKind) -> anyhow::Result<()> {
        self.played.borrow_mut().push(cue);
        Ok(())
    }
}

struct BrokenCue;

impl CueSink for BrokenCue {
    fn play(&mut self, _cue: CueKind) -> anyhow::Result<()> {
        anyhow::bail!("audio blocked")
    }
}

// --- Plan catalog ---

#[test]
fn test_days_in_weekday_order() {
    let catalog = standard_catalog();
    assert_eq!(
        catalog.list_days(),
        vec!["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"]
    );
}

#[test]
fn test_resolve_is_case_insensitive_and_reports_unknown_days() {
    let catalog = standard_catalog();
    assert_eq!(catalog.resolve("monday").unwrap().title, "Intervals");
    assert_eq!(catalog.resolve(" FRIDAY ").unwrap().day, "Friday");
    assert_eq!(
        catalog.resolve("Sunday").unwrap_err(),
        PlanError::UnknownDay("Sunday".to_string())
    );
}

#[test]
fn test_paced_durations_follow_goal() {
    let catalog = standard_catalog();

    let monday = catalog.resolve("Monday").unwrap();
    assert_eq!(monday.segments[0].duration_sec, 96);
    assert_eq!(monday.segments[0].rest_sec, 20);
    assert_eq!(monday.segments[0].repeat_count, 6);

    let tuesday = catalog.resolve("Tuesday").unwrap();
    assert_eq!(tuesday.segments[0].duration_sec, 1500);

    let thursday = catalog.resolve("Thursday").unwrap();
    assert_eq!(thursday.segments[0].duration_sec, 114);

    let saturday = catalog.resolve("Saturday").unwrap();
    assert_eq!(saturday.segments[0].duration_sec, 300);
    assert_eq!(saturday.segments[2].duration_sec, 120);
    assert_eq!(saturday.segments[3].duration_sec, 91);
}

#[test]
fn test_displayed_speed_matches_scheduled_duration() {
    let catalog = standard_catalog();
    for workout in catalog.workouts() {
        let all_segments = workout
            .segments
            .iter()
            .chain(workout.variants.iter().flat_map(|v| v.segments.iter()));
        for segment in all_segments {
            if let (Some(distance), Some(speed)) = (segment.distance_m, segment.target_speed_mps) {
                let derived = (f64::from(distance) / speed).round() as u32;
                assert_eq!(
                    derived, segment.duration_sec,
                    "{} on {} drifted",
                    segment.label, workout.day
                );
            }
        }
    }

    let monday = catalog.resolve("Monday").unwrap();
    assert_eq!(monday.segments[0].describe(Units::Metric), "400 m - 15.0 kph");
}

#[test]
fn test_select_variant() {
    let catalog = standard_catalog();
    let thursday = catalog.resolve("Thursday").unwrap();
    assert_eq!(thursday.active_variant.as_deref(), Some("VO2"));
    assert_eq!(thursday.variant_names(), vec!["VO2", "Hill"]);

    let hill = catalog.select_variant(thursday, "hill").unwrap();
    assert_eq!(hill.active_variant.as_deref(), Some("Hill"));
    assert_eq!(hill.segments.len(), 1);
    assert_eq!(hill.segments[0].duration_sec, 15);
    assert_eq!(hill.segments[0].rest_sec, 90);
    assert_eq!(hill.next_variant_name(), Some("VO2"));
    // The catalog entry itself is untouched.
    assert_eq!(thursday.segments[0].duration_sec, 114);

    let err = catalog.select_variant(thursday, "Tempo").unwrap_err();
    assert!(matches!(err, PlanError::UnknownVariant { .. }));

    let monday = catalog.resolve("Monday").unwrap();
    assert!(catalog.select_variant(monday, "VO2").is_err());
    assert_eq!(monday.next_variant_name(), None);
}

#[test]
fn test_empty_catalog_reports_unknown_day() {
    let catalog = PlanCatalog::from_workouts(Vec::new());
    assert!(catalog.list_days().is_empty());
    assert_eq!(
        catalog.resolve("Monday").unwrap_err(),
        PlanError::UnknownDay("Monday".to_string())
    );
}

#[test]
fn test_invalid_goal_rejected() {
    assert_eq!(GoalPace::new(0, 480).unwrap_err(), PlanError::InvalidGoal);
    assert_eq!(GoalPace::new(2000, 0).unwrap_err(), PlanError::InvalidGoal);
}

// --- Expansion ---

#[test]
fn test_expand_omits_trailing_rest() {
    let catalog = standard_catalog();
    let monday = catalog.resolve("Monday").unwrap();
    let units = expand(&monday.segments, ExpandOptions::default());

    assert_eq!(units.len(), 11);
    assert_eq!(units[0].label, "400 m (Rep 1/6)");
    assert_eq!(units[0].kind, UnitKind::Work);
    assert_eq!(units[1].kind, UnitKind::Rest);
    assert_eq!(units[1].duration_sec, 20);
    assert_eq!(units[10].kind, UnitKind::Work);
    assert_eq!(units[10].rep_index, 5);
    assert_eq!(units[10].rep_count, 6);
    assert_eq!(pacer_lib::schedule::total_duration_sec(&units), 676);
}

#[test]
fn test_expand_with_trailing_rest_and_multiple_segments() {
    let catalog = standard_catalog();
    let monday = catalog.resolve("Monday").unwrap();
    let with_rest = expand(
        &monday.segments,
        ExpandOptions {
            trailing_rest: true,
        },
    );
    assert_eq!(with_rest.len(), 12);
    assert_eq!(with_rest.last().unwrap().kind, UnitKind::Rest);

    let tuesday = catalog.resolve("Tuesday").unwrap();
    let units = expand(&tuesday.segments, ExpandOptions::default());
    assert_eq!(units.len(), 6);
    assert_eq!(units[0].source_segment_index, 0);
    assert!(units[1..].iter().all(|u| u.source_segment_index == 1));
}

// --- Session ---

#[test]
fn test_session_drives_checklist_and_cues() {
    let catalog = standard_catalog();
    let monday = catalog.resolve("Monday").unwrap();
    let cue = RecordingCue::default();
    let played = cue.played.clone();
    let mut session = pacer_lib::Session::new(monday, ExpandOptions::default(), Box::new(cue));

    let t0 = Instant::now();
    session.start(t0);
    assert_eq!(session.checklist().active_index(), Some(0));
    assert_eq!(played.borrow().as_slice(), &[CueKind::UnitStart]);

    // Starting again while running changes nothing.
    assert!(session.start(t0).is_empty());

    let events = session.poll(t0 + Duration::from_secs(96));
    assert!(events
        .iter()
        .any(|e| matches!(e, SchedulerEvent::UnitCompleted { index: 0, .. })));
    assert!(session.checklist().rows()[0].checked);
    assert_eq!(session.checklist().active_index(), Some(1));
    assert_eq!(played.borrow().len(), 3);

    let events = session.reset();
    assert_eq!(events, vec![SchedulerEvent::ResetCompleted]);
    assert_eq!(session.checklist().completed_count(), 0);
    assert_eq!(session.checklist().active_index(), None);
    assert_eq!(session.checklist().rows().len(), 11);
    assert!(session.poll(t0 + Duration::from_secs(500)).is_empty());
}

#[test]
fn test_session_pause_withholds_ticks() {
    let catalog = standard_catalog();
    let monday = catalog.resolve("Monday").unwrap();
    let mut session = pacer_lib::Session::new(monday, ExpandOptions::default(), Box::new(SilentCue));

    let t0 = Instant::now();
    session.start(t0);
    session.poll(t0 + Duration::from_secs(10));
    assert_eq!(session.scheduler().remaining_sec(), Some(86));

    assert!(session.toggle_pause(t0 + Duration::from_millis(10_500)));
    assert_eq!(session.state(), SchedulerState::Paused);
    assert!(session.poll(t0 + Duration::from_secs(300)).is_empty());
    assert_eq!(session.scheduler().remaining_sec(), Some(86));

    let resumed_at = t0 + Duration::from_secs(400);
    assert!(session.toggle_pause(resumed_at));
    session.poll(resumed_at + Duration::from_millis(1_200));
    assert_eq!(session.scheduler().remaining_sec(), Some(85));
}

#[test]
fn test_session_with_faster_ticker() {
    let catalog = standard_catalog();
    let monday = catalog.resolve("Monday").unwrap();
    let mut session =
        pacer_lib::Session::new(monday, ExpandOptions::default(), Box::new(SilentCue))
            .with_ticker(Ticker::new(Duration::from_millis(100)));

    let t0 = Instant::now();
    assert_eq!(session.until_next_tick(t0), None);
    session.start(t0);
    assert_eq!(
        session.until_next_tick(t0),
        Some(Duration::from_millis(100))
    );
    session.poll(t0 + Duration::from_millis(1_000));
    assert_eq!(session.scheduler().remaining_sec(), Some(86));
}

#[test]
fn test_cue_failures_do_not_affect_state() {
    let catalog = standard_catalog();
    let monday = catalog.resolve("Monday").unwrap();
    let mut session = pacer_lib::Session::new(monday, ExpandOptions::default(), Box::new(BrokenCue));

    let t0 = Instant::now();
    session.start(t0);
    for second in 1..=676 {
        session.poll(t0 + Duration::from_secs(second));
    }
    assert_eq!(session.state(), SchedulerState::Completed);
    assert_eq!(session.checklist().completed_count(), 11);
    assert_eq!(session.scheduler().elapsed_sec(), 676);
}

#[test]
fn test_session_cancel_keeps_checked_rows() {
    let catalog = standard_catalog();
    let monday = catalog.resolve("Monday").unwrap();
    let mut session = pacer_lib::Session::new(monday, ExpandOptions::default(), Box::new(SilentCue));

    let t0 = Instant::now();
    session.start(t0);
    session.poll(t0 + Duration::from_secs(100));
    let events = session.cancel();
    assert_eq!(events.len(), 1);
    assert_eq!(session.state(), SchedulerState::Cancelled);
    assert_eq!(session.checklist().completed_count(), 1);
    assert_eq!(session.checklist().active_index(), None);
    assert!(session.poll(t0 + Duration::from_secs(200)).is_empty());
}

// --- Service ---

#[test]
fn test_service_falls_back_on_unknown_lookups() -> Result<()> {
    let service = create_test_service("fallback")?;

    let workout = service.workout_or_default("Sunday", None);
    assert_eq!(workout.day, "Monday");

    let workout = service.workout_or_default("Thursday", Some("Sprint"));
    assert_eq!(workout.active_variant.as_deref(), Some("VO2"));

    let workout = service.workout_or_default("thursday", Some("Hill"));
    assert_eq!(workout.active_variant.as_deref(), Some("Hill"));

    assert!(service.resolve_workout("Sunday", None).is_err());
    Ok(())
}

#[test]
fn test_goal_change_rebuilds_plan() -> Result<()> {
    let mut service = create_test_service("goal")?;
    service.set_goal_time("7:30")?;

    let monday = service.resolve_workout("Monday", None)?;
    assert_eq!(monday.segments[0].duration_sec, 90);
    assert!(service.set_goal_time("7:75").is_err());
    assert_eq!(service.config.goal.goal_time, "7:30");

    service.set_goal_distance(1000)?;
    let monday = service.resolve_workout("Monday", None)?;
    assert_eq!(monday.segments[0].duration_sec, 180);
    assert!(service.set_goal_distance(0).is_err());

    std::fs::remove_file(service.get_config_path()).ok();
    Ok(())
}

#[test]
fn test_trailing_rest_setting_reaches_schedule() -> Result<()> {
    let mut service = create_test_service("trailing")?;
    let monday = service.resolve_workout("Monday", None)?;
    assert_eq!(service.build_schedule(&monday).len(), 11);

    service.set_trailing_rest(true)?;
    assert_eq!(service.build_schedule(&monday).len(), 12);

    std::fs::remove_file(service.get_config_path()).ok();
    Ok(())
}

#[test]
fn test_completion_history_last_write_wins() -> Result<()> {
    let service = create_test_service("history")?;
    let day = date(2026, 10, 12);

    service.record_completion("Monday", None, 676, Some(day))?;
    service.record_completion("Thursday", Some("Hill"), 540, Some(day))?;
    service.record_completion("Tuesday", None, 1770, Some(date(2026, 10, 13)))?;
    service.record_completion("Friday", None, 2130, Some(date(2026, 11, 1)))?;

    let record = service.get_completion(day)?.expect("record exists");
    assert_eq!(record.day_name, "Thursday");
    assert_eq!(record.variant.as_deref(), Some("Hill"));
    assert_eq!(record.elapsed_sec, 540);
    assert!(record.completed);

    let october = service.completed_dates_in_month(2026, 10)?;
    assert_eq!(october.len(), 2);
    assert!(october.contains(&date(2026, 10, 13)));

    let history = service.list_history(10)?;
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].date, date(2026, 11, 1));

    let grid = service.month_calendar(2026, 10)?;
    assert_eq!(grid.completed_days(), 2);
    Ok(())
}

#[test]
fn test_delete_history_entry() -> Result<()> {
    let service = create_test_service("delete")?;
    let day = date(2026, 9, 1);
    service.record_completion("Monday", None, 676, Some(day))?;

    assert_eq!(service.delete_history_entry(day)?, 1);
    assert!(service.get_completion(day)?.is_none());
    assert!(matches!(
        service.delete_history_entry(day),
        Err(DbError::CompletionNotFound(_))
    ));
    Ok(())
}

#[test]
fn test_session_completion_is_recorded() -> Result<()> {
    let service = create_test_service("session_record")?;
    let wednesday = service.resolve_workout("Wednesday", None)?;
    let mut session = service.new_session(&wednesday, Box::new(SilentCue));

    session.start(Instant::now());
    let mut completed = false;
    for _ in 0..1200 {
        let events = session.tick();
        if events
            .iter()
            .any(|e| matches!(e, SchedulerEvent::SessionCompleted { .. }))
        {
            completed = true;
            service.record_session_best_effort(&session);
        }
    }
    assert!(completed);

    let history = service.list_history(1)?;
    assert_eq!(history[0].day_name, "Wednesday");
    assert_eq!(history[0].elapsed_sec, 1200);
    Ok(())
}

#[test]
fn test_empty_workout_completes_and_records_on_start() -> Result<()> {
    let service = create_test_service("empty_start")?;
    let rest_day = Workout {
        day: "Sunday".to_string(),
        title: "Rest".to_string(),
        explanation: String::new(),
        warmup: Vec::new(),
        segments: Vec::new(),
        mobility: Vec::new(),
        variants: Vec::new(),
        active_variant: None,
    };
    let mut session = service.new_session(&rest_day, Box::new(SilentCue));

    let events = session.start(Instant::now());
    assert_eq!(events, vec![SchedulerEvent::SessionCompleted { elapsed_sec: 0 }]);
    assert_eq!(session.state(), SchedulerState::Completed);
    assert!(service.record_if_completed(&session, &events));

    let history = service.list_history(1)?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].day_name, "Sunday");
    assert_eq!(history[0].elapsed_sec, 0);
    Ok(())
}

#[test]
fn test_record_if_completed_ignores_other_events() -> Result<()> {
    let service = create_test_service("record_if_completed")?;
    let monday = service.resolve_workout("Monday", None)?;
    let mut session = service.new_session(&monday, Box::new(SilentCue));

    let events = session.start(Instant::now());
    assert!(!service.record_if_completed(&session, &events));
    assert!(service.list_history(10)?.is_empty());
    Ok(())
}

// --- Configuration ---

#[test]
fn test_invalid_goal_time_falls_back_to_default_goal() -> Result<()> {
    let mut config = Config::default();
    config.goal.goal_time = "eight minutes".to_string();
    let conn = rusqlite::Connection::open_in_memory()?;
    let mut service =
        PacerService::from_parts(config, conn, ":memory:".into(), temp_path("bad_goal.toml"))?;

    let monday = service.resolve_workout("Monday", None)?;
    assert_eq!(monday.segments[0].duration_sec, 96);
    assert!(service.goal_pace().is_err());

    // A valid goal replaces the fallback
    service.set_goal_time("10:00")?;
    let monday = service.resolve_workout("Monday", None)?;
    assert_eq!(monday.segments[0].duration_sec, 120);

    std::fs::remove_file(service.get_config_path()).ok();
    Ok(())
}

#[test]
fn test_partial_config_file_fills_defaults() -> Result<()> {
    let path = temp_path("partial.toml");
    std::fs::write(&path, "units = \"imperial\"\n\n[goal]\ngoal_time = \"7:30\"\n")?;

    let config = load_config_util(&path)?;
    assert_eq!(config.units, Units::Imperial);
    assert_eq!(config.goal.goal_time, "7:30");
    assert_eq!(config.goal.distance_m, 2000);
    assert_eq!(config.goal.last_time, None);
    assert!(!config.trailing_rest);
    assert!(config.cues_enabled);
    assert_eq!(config.default_day, "Monday");

    std::fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn test_missing_config_file_is_created_with_defaults() -> Result<()> {
    let dir = temp_path("fresh_dir");
    let path = dir.join("config.toml");
    std::fs::remove_dir_all(&dir).ok();

    let config = load_config_util(&path)?;
    assert_eq!(config, Config::default());
    assert!(path.exists());
    assert_eq!(config.goal.last_time.as_deref(), Some("8:36"));

    // The written file reads back unchanged
    assert_eq!(load_config_util(&path)?, Config::default());

    std::fs::remove_dir_all(&dir).ok();
    Ok(())
}

#[test]
fn test_cleared_last_time_stays_cleared_after_reload() -> Result<()> {
    let mut service = create_test_service("clear_last_time")?;

    service.set_last_time(Some("8:20"))?;
    let reloaded = load_config_util(service.get_config_path())?;
    assert_eq!(reloaded.goal.last_time.as_deref(), Some("8:20"));

    service.set_last_time(None)?;
    let reloaded = load_config_util(service.get_config_path())?;
    assert_eq!(reloaded.goal.last_time, None);
    assert_eq!(reloaded.goal.last_time_sec()?, None);

    std::fs::remove_file(service.get_config_path()).ok();
    Ok(())
}

#[test]
fn test_saved_settings_survive_reload() -> Result<()> {
    let path = temp_path("saved_settings.toml");
    let mut config = Config::default();
    config.units = Units::Imperial;
    config.trailing_rest = true;
    config.default_day = "Thursday".to_string();
    config.goal.distance_m = 1500;

    save_config_util(&path, &config)?;
    assert_eq!(load_config_util(&path)?, config);

    std::fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn test_config_dir_env_override() -> Result<()> {
    // Only test that touches PACER_CONFIG_DIR
    let dir = temp_path("env_config_dir");
    std::fs::remove_dir_all(&dir).ok();
    std::env::set_var("PACER_CONFIG_DIR", &dir);

    let path = get_config_path_util();
    std::env::remove_var("PACER_CONFIG_DIR");

    assert_eq!(path?, dir.join("config.toml"));
    assert!(dir.is_dir());

    std::fs::remove_dir_all(&dir).ok();
    Ok(())
}
