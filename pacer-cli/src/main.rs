//src/main.rs
mod cli;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use std::io::{self, stdout, Write};
use std::thread;
use std::time::Duration;
use tracing::info;

use pacer_lib::{
    format_hms, format_mmss, format_speed, total_duration_sec, CompletionRecord, CueKind,
    CueSink, DbError, MonthGrid, PacerService, SchedulerEvent, SchedulerState, UnitKind, Units,
    Workout, WEEKDAY_HEADERS,
};

/// Rings the terminal bell.
struct TerminalBell;

impl CueSink for TerminalBell {
    fn play(&mut self, _cue: CueKind) -> Result<()> {
        let mut out = stdout();
        out.write_all(b"\x07")?;
        out.flush()?;
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli_args = cli::parse_args();
    let export_csv = cli_args.export_csv;

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command();
        let bin_name = cmd.get_name().to_string();
        eprintln!("Generating completion script for {shell}...");
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout());
        return Ok(());
    }

    let log_level = if cli_args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(io::stderr)
        .init();

    let mut service =
        PacerService::initialize().context("Failed to initialize application service")?;
    let header_color = pacer_lib::parse_color(&service.config.theme.header_color)
        .map(Color::from)
        .unwrap_or(Color::Green);

    match cli_args.command {
        cli::Commands::GenerateCompletion { .. } => {
            unreachable!("Completion generation should have exited already");
        }
        cli::Commands::Days => {
            let workouts = service.catalog().workouts().to_vec();
            if export_csv {
                print_days_csv(&workouts)?;
            } else {
                print_days_table(&workouts, header_color, &service.config.default_day);
            }
        }
        cli::Commands::Show { day, variant } => {
            let workout = service
                .resolve_workout(&day, variant.as_deref())
                .with_context(|| format!("Cannot show '{day}'"))?;
            if export_csv {
                print_schedule_csv(&service, &workout)?;
            } else {
                print_goal_summary(&service)?;
                print_workout(&service, &workout, header_color);
            }
        }
        cli::Commands::Run {
            day,
            variant,
            no_cue,
        } => {
            let workout = service
                .resolve_workout(&day, variant.as_deref())
                .with_context(|| format!("Cannot run '{day}'"))?;
            run_session(&service, &workout, no_cue)?;
        }
        cli::Commands::Calendar { month } => {
            let today = Local::now().date_naive();
            let (year, month) = month.map_or((today.year(), today.month()), |m| (m.year, m.month));
            let grid = service.month_calendar(year, month)?;
            print_calendar(&grid, header_color);
        }
        cli::Commands::History { limit } => {
            let history = service.list_history(limit)?;
            if history.is_empty() {
                println!("No completed sessions yet.");
            } else if export_csv {
                print_history_csv(&history)?;
            } else {
                print_history_table(&history, header_color);
            }
        }
        cli::Commands::MarkDone { day, date, variant } => {
            let workout = service
                .resolve_workout(&day, variant.as_deref())
                .with_context(|| format!("Cannot mark '{day}' as done"))?;
            let elapsed = total_duration_sec(&service.build_schedule(&workout));
            let record = service.record_completion(
                &workout.day,
                workout.active_variant.as_deref(),
                elapsed,
                date,
            )?;
            println!(
                "Marked {} ({}) as done on {}.",
                record.day_name,
                workout.title,
                record.date.format("%Y-%m-%d")
            );
        }
        cli::Commands::Forget { date } => match service.delete_history_entry(date) {
            Ok(_) => println!("Removed the completion for {}.", date.format("%Y-%m-%d")),
            Err(DbError::CompletionNotFound(d)) => {
                println!("Nothing recorded for {}.", d.format("%Y-%m-%d"));
            }
            Err(e) => bail!("Error removing completion: {}", e),
        },
        cli::Commands::SetGoal { time } => {
            service.set_goal_time(&time)?;
            println!("Goal time set to {}.", service.config.goal.goal_time);
            print_goal_summary(&service)?;
        }
        cli::Commands::SetLast { time } => {
            service.set_last_time(time.as_deref())?;
            match service.config.goal.last_time.as_deref() {
                Some(t) => println!("Last time set to {t}."),
                None => println!("Last time cleared."),
            }
        }
        cli::Commands::SetDistance { meters } => {
            service.set_goal_distance(meters)?;
            println!("Goal distance set to {meters} m.");
            print_goal_summary(&service)?;
        }
        cli::Commands::SetTrailingRest { enabled } => {
            service.set_trailing_rest(enabled)?;
            println!(
                "Rest after the final repetition: {}.",
                if enabled { "on" } else { "off" }
            );
        }
        cli::Commands::SetCues { enabled } => {
            service.set_cues_enabled(enabled)?;
            println!("Cues {}.", if enabled { "enabled" } else { "disabled" });
        }
        cli::Commands::SetUnits { units } => {
            let units = match units {
                cli::UnitsCli::Metric => Units::Metric,
                cli::UnitsCli::Imperial => Units::Imperial,
            };
            service.set_units(units)?;
            println!("Units set to {units:?}.");
        }
        cli::Commands::SetDefaultDay { day } => {
            service.set_default_day(&day)?;
            println!("Default day set to {}.", service.config.default_day);
        }
        cli::Commands::ConfigPath => {
            println!("{}", service.get_config_path().display());
        }
        cli::Commands::DbPath => {
            println!("{}", service.get_db_path().display());
        }
    }

    Ok(())
}

/// Plays a session back in the foreground, one `sleep` per tick.
fn run_session(service: &PacerService, workout: &Workout, no_cue: bool) -> Result<()> {
    let mut session = service.new_session(workout, Box::new(TerminalBell));
    if no_cue {
        session.set_cues_enabled(false);
    }
    let units = service.config.units;

    println!(
        "{} - {}{}",
        workout.day,
        workout.title,
        workout
            .active_variant
            .as_deref()
            .map(|v| format!(" [{v}]"))
            .unwrap_or_default()
    );
    if !workout.warmup.is_empty() {
        println!("Warm-up first: {}", workout.warmup.join(", "));
    }

    let mut events = session.start(std::time::Instant::now());
    loop {
        print_events(&events, units)?;
        if service.record_if_completed(&session, &events) {
            info!(day = %workout.day, "session recorded");
        }
        if session.state() != SchedulerState::Running {
            break;
        }
        thread::sleep(Duration::from_secs(1));
        events = session.tick();
    }

    if !workout.mobility.is_empty() {
        println!("Mobility: {}", workout.mobility.join(", "));
    }
    Ok(())
}

fn print_events(events: &[SchedulerEvent], units: Units) -> Result<()> {
    let mut out = stdout();
    for event in events {
        match event {
            SchedulerEvent::UnitStarted { index, unit } => {
                let speed = unit
                    .target_speed_mps
                    .map(|s| format!(" - {}", format_speed(s, units)))
                    .unwrap_or_default();
                writeln!(out, "\n#{:<3} {}{}", index + 1, unit.label, speed)?;
                write!(out, "\r    {}", format_mmss(unit.duration_sec))?;
            }
            SchedulerEvent::Progress { remaining_sec, .. } => {
                write!(out, "\r    {}", format_mmss(*remaining_sec))?;
            }
            SchedulerEvent::UnitCompleted { unit, .. } => {
                let mark = match unit.kind {
                    UnitKind::Work => "[x]",
                    UnitKind::Rest => "[-]",
                };
                write!(out, "\r    {mark} {}", unit.label)?;
            }
            SchedulerEvent::SessionCompleted { elapsed_sec } => {
                writeln!(out, "\n\nSession complete in {}.", format_hms(*elapsed_sec))?;
            }
            SchedulerEvent::SessionCancelled { .. }
            | SchedulerEvent::ResetCompleted
            | SchedulerEvent::Cue(_) => {}
        }
    }
    out.flush()?;
    Ok(())
}

fn print_goal_summary(service: &PacerService) -> Result<()> {
    let goal = match service.goal_pace() {
        Ok(goal) => goal,
        Err(e) => {
            println!("Goal: {e:#} (fix it with `pacer set-goal MM:SS`)");
            return Ok(());
        }
    };
    let units = service.config.units;
    print!(
        "Goal: {} m in {} ({})",
        goal.distance_m(),
        format_mmss(goal.goal_time_sec()),
        format_speed(goal.speed_mps(), units)
    );
    if let Some(last) = service.config.goal.last_time_sec()? {
        let gap = i64::from(last) - i64::from(goal.goal_time_sec());
        print!(", last {} ({gap:+} s to go)", format_mmss(last));
    }
    println!();
    Ok(())
}

fn print_days_table(workouts: &[Workout], header_color: Color, default_day: &str) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Day").fg(header_color),
            Cell::new("Workout").fg(header_color),
            Cell::new("Work").fg(header_color),
            Cell::new("Variants").fg(header_color),
        ]);

    for workout in workouts {
        let mut day_cell = Cell::new(&workout.day);
        if workout.day.eq_ignore_ascii_case(default_day) {
            day_cell = day_cell.add_attribute(Attribute::Bold);
        }
        table.add_row(vec![
            day_cell,
            Cell::new(&workout.title),
            Cell::new(format_hms(workout.total_work_sec())),
            Cell::new(workout.variant_names().join(", ")),
        ]);
    }
    println!("{table}");
}

fn print_days_csv(workouts: &[Workout]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(stdout());
    writer.write_record(["Day", "Workout", "WorkSeconds", "Variants"])?;
    for workout in workouts {
        writer.write_record([
            workout.day.clone(),
            workout.title.clone(),
            workout.total_work_sec().to_string(),
            workout.variant_names().join("|"),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn print_workout(service: &PacerService, workout: &Workout, header_color: Color) {
    let units = service.config.units;
    println!("\n{} - {}", workout.day, workout.title);
    println!("{}", workout.explanation);
    if workout.has_variants() {
        println!(
            "Variants: {} (active: {})",
            workout.variant_names().join(", "),
            workout.active_variant.as_deref().unwrap_or("-")
        );
    }

    println!("\nWarm-up:");
    for item in &workout.warmup {
        println!("  - {item}");
    }

    println!("\nMain set:");
    for segment in &workout.segments {
        let reps = if segment.repeat_count > 1 {
            format!("{} x ", segment.repeat_count)
        } else {
            String::new()
        };
        let rest = if segment.rest_sec > 0 {
            format!(", rest {}", format_mmss(segment.rest_sec))
        } else {
            String::new()
        };
        println!("  - {reps}{}{rest}", segment.describe(units));
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").fg(header_color),
            Cell::new("Unit").fg(header_color),
            Cell::new("Speed").fg(header_color),
            Cell::new("Time").fg(header_color),
            Cell::new("Done").fg(header_color),
        ]);

    let schedule = service.build_schedule(workout);
    for (i, unit) in schedule.iter().enumerate() {
        let speed = unit
            .target_speed_mps
            .map_or_else(|| "-".to_string(), |s| format_speed(s, units));
        let mut label_cell = Cell::new(&unit.label);
        if unit.is_rest() {
            label_cell = label_cell.fg(Color::DarkGrey);
        }
        table.add_row(vec![
            Cell::new(i + 1),
            label_cell,
            Cell::new(speed),
            Cell::new(format_mmss(unit.duration_sec)),
            Cell::new(if unit.is_rest() { "" } else { "[ ]" }),
        ]);
    }
    println!("\n{table}");

    println!(
        "Timed total: {}",
        format_hms(total_duration_sec(&schedule))
    );

    println!("\nMobility:");
    for item in &workout.mobility {
        println!("  - {item}");
    }
}

fn print_schedule_csv(service: &PacerService, workout: &Workout) -> Result<()> {
    let units = service.config.units;
    let mut writer = csv::Writer::from_writer(stdout());
    writer.write_record(["Index", "Kind", "Label", "Seconds", "Speed"])?;
    for (i, unit) in service.build_schedule(workout).iter().enumerate() {
        writer.write_record([
            (i + 1).to_string(),
            unit.kind.to_string(),
            unit.label.clone(),
            unit.duration_sec.to_string(),
            unit.target_speed_mps
                .map(|s| format_speed(s, units))
                .unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn print_calendar(grid: &MonthGrid, header_color: Color) {
    println!("{}", grid.title());
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(
            WEEKDAY_HEADERS
                .iter()
                .map(|d| Cell::new(d).fg(header_color))
                .collect::<Vec<_>>(),
        );

    for week in &grid.weeks {
        let cells = week.iter().map(|slot| match slot {
            None => Cell::new(""),
            Some(day) => {
                let text = if day.completed {
                    format!("{}*", day.day)
                } else {
                    day.day.to_string()
                };
                let mut cell = Cell::new(text);
                if day.completed {
                    cell = cell.fg(Color::Green);
                }
                if day.today {
                    cell = cell.add_attribute(Attribute::Reverse);
                }
                cell
            }
        });
        table.add_row(cells.collect::<Vec<_>>());
    }
    println!("{table}");
    println!("* completed ({} this month)", grid.completed_days());
}

fn print_history_table(history: &[CompletionRecord], header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Date").fg(header_color),
            Cell::new("Day").fg(header_color),
            Cell::new("Variant").fg(header_color),
            Cell::new("Time").fg(header_color),
        ]);
    for record in history {
        table.add_row(vec![
            Cell::new(record.date.format("%Y-%m-%d")),
            Cell::new(&record.day_name),
            Cell::new(record.variant.as_deref().unwrap_or("-")),
            Cell::new(format_hms(record.elapsed_sec)),
        ]);
    }
    println!("{table}");
}

fn print_history_csv(history: &[CompletionRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(stdout());
    writer.write_record(["Date", "Day", "Variant", "ElapsedSeconds", "RecordedAt"])?;
    for record in history {
        writer.write_record([
            record.date.format("%Y-%m-%d").to_string(),
            record.day_name.clone(),
            record.variant.clone().unwrap_or_default(),
            record.elapsed_sec.to_string(),
            record.recorded_at.to_rfc3339(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
