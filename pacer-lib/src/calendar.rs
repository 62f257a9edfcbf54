//src/calendar.rs
use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;

pub const WEEKDAY_HEADERS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub day: u32,
    pub completed: bool,
    pub today: bool,
}

/// A month laid out in Sunday-first weeks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<[Option<CalendarDay>; 7]>,
}

impl MonthGrid {
    pub fn title(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map_or_else(String::new, |d| d.format("%B %Y").to_string())
    }

    pub fn completed_days(&self) -> usize {
        self.weeks
            .iter()
            .flatten()
            .flatten()
            .filter(|d| d.completed)
            .count()
    }
}

/// First and last date of a month.
/// # Errors
/// Returns an error if `month` is not 1..=12 or the year is out of range.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow!("Invalid month: {year}-{month:02}"))?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| anyhow!("Invalid month: {year}-{month:02}"))?;
    let last = next_first
        .pred_opt()
        .ok_or_else(|| anyhow!("Invalid month: {year}-{month:02}"))?;
    Ok((first, last))
}

/// Builds the grid, flagging completed dates and today.
/// # Errors
/// Returns an error for an invalid month.
pub fn month_grid(
    year: i32,
    month: u32,
    completed: &HashSet<NaiveDate>,
    today: NaiveDate,
) -> Result<MonthGrid> {
    let (first, last) = month_bounds(year, month)?;
    let lead = first.weekday().num_days_from_sunday() as usize;

    let mut weeks = Vec::new();
    let mut week: [Option<CalendarDay>; 7] = [None; 7];
    let mut slot = lead;

    for date in first.iter_days().take_while(|d| *d <= last) {
        week[slot] = Some(CalendarDay {
            day: date.day(),
            completed: completed.contains(&date),
            today: date == today,
        });
        slot += 1;
        if slot == 7 {
            weeks.push(week);
            week = [None; 7];
            slot = 0;
        }
    }
    if slot > 0 {
        weeks.push(week);
    }

    Ok(MonthGrid { year, month, weeks })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lays_out_a_sunday_first_month() {
        // 1 March 2026 is a Sunday.
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let done: HashSet<_> = [NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()].into();
        let grid = month_grid(2026, 3, &done, today).unwrap();

        assert_eq!(grid.weeks.len(), 5);
        assert_eq!(grid.weeks[0][0].unwrap().day, 1);
        assert!(grid.weeks[0][1].unwrap().completed);
        assert!(grid.weeks[1][2].unwrap().today);
        assert_eq!(grid.completed_days(), 1);
        assert_eq!(grid.title(), "March 2026");
    }

    #[test]
    fn leading_blanks_and_december() {
        // 1 December 2026 is a Tuesday.
        let today = NaiveDate::from_ymd_opt(2026, 12, 1).unwrap();
        let grid = month_grid(2026, 12, &HashSet::new(), today).unwrap();
        assert!(grid.weeks[0][0].is_none());
        assert!(grid.weeks[0][1].is_none());
        assert_eq!(grid.weeks[0][2].unwrap().day, 1);
        let last_day = grid.weeks.iter().flatten().flatten().last().unwrap();
        assert_eq!(last_day.day, 31);
    }

    #[test]
    fn rejects_bad_month() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert!(month_grid(2026, 13, &HashSet::new(), today).is_err());
    }
}
