// src/cli.rs
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "Six-day running plan with an interval timer", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print debug logging to stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Print tables as CSV instead
    #[arg(long, global = true)]
    pub export_csv: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitsCli {
    Metric,
    Imperial,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the days in the plan
    Days,
    /// Show a day's workout: warm-up, timed reps, mobility
    Show {
        /// Day name (e.g. "Monday"), case-insensitive
        day: String,
        /// Variant to show for days that have them (e.g. "Hill")
        #[arg(short, long)]
        variant: Option<String>,
    },
    /// Run a day's interval timer in the foreground
    Run {
        day: String,
        #[arg(short, long)]
        variant: Option<String>,
        /// Don't ring the terminal bell at unit boundaries
        #[arg(long)]
        no_cue: bool,
    },
    /// Show a month with completed days marked
    Calendar {
        /// Month as YYYY-MM, defaults to the current month
        #[arg(short, long, value_parser = parse_month)]
        month: Option<YearMonth>,
    },
    /// List completed sessions, most recent first
    History {
        #[arg(short, long, default_value_t = 30)]
        limit: u32,
    },
    /// Record a day as completed without running the timer
    MarkDone {
        day: String,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(short, long)]
        variant: Option<String>,
    },
    /// Remove the completion recorded for a date
    Forget {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Set the goal finishing time (MM:SS); the whole plan is re-derived from it
    SetGoal { time: String },
    /// Set the last finishing time (MM:SS), or clear it with no argument
    SetLast { time: Option<String> },
    /// Set the goal race distance in meters
    SetDistance { meters: u32 },
    /// Rest after the final repetition of each segment too
    SetTrailingRest {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Enable or disable cues during `run`
    SetCues {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Set display units for speeds
    SetUnits {
        #[arg(value_enum)]
        units: UnitsCli,
    },
    /// Set the day shown first and used as a fallback
    SetDefaultDay { day: String },
    /// Show the path to the config file
    ConfigPath,
    /// Show the path to the history database
    DbPath,
    /// Print a shell completion script
    GenerateCompletion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

fn parse_month(s: &str) -> Result<YearMonth, String> {
    let (year, month) = s
        .split_once('-')
        .ok_or_else(|| format!("Invalid month '{s}' (expected YYYY-MM)"))?;
    let year: i32 = year
        .parse()
        .map_err(|_| format!("Invalid year in '{s}'"))?;
    let month: u32 = month
        .parse()
        .map_err(|_| format!("Invalid month in '{s}'"))?;
    if !(1..=12).contains(&month) {
        return Err(format!("Month must be 1-12, got {month}"));
    }
    Ok(YearMonth { year, month })
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
