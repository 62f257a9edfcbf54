//src/schedule.rs
use std::fmt;

use crate::plan::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Work,
    Rest,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Work => write!(f, "work"),
            Self::Rest => write!(f, "rest"),
        }
    }
}

/// One individually timed work or rest interval.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleUnit {
    pub kind: UnitKind,
    pub label: String,
    pub duration_sec: u32,
    pub source_segment_index: usize,
    /// 0-based repetition this unit belongs to.
    pub rep_index: u32,
    pub rep_count: u32,
    pub target_speed_mps: Option<f64>,
}

impl ScheduleUnit {
    /// Share of this unit already done, `1.0` for zero-length units.
    pub fn progress_fraction(&self, remaining_sec: u32) -> f64 {
        if self.duration_sec == 0 {
            return 1.0;
        }
        let done = self.duration_sec - remaining_sec.min(self.duration_sec);
        f64::from(done) / f64::from(self.duration_sec)
    }

    pub fn is_rest(&self) -> bool {
        self.kind == UnitKind::Rest
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Also rest after the last repetition of each segment.
    pub trailing_rest: bool,
}

/// Flattens segments into the unit sequence the scheduler plays back.
///
/// Each repetition becomes a work unit, followed by a rest unit when the
/// segment has rest. The final repetition gets no rest unless
/// `options.trailing_rest` is set.
pub fn expand(segments: &[Segment], options: ExpandOptions) -> Vec<ScheduleUnit> {
    let mut units = Vec::new();

    for (segment_index, segment) in segments.iter().enumerate() {
        let rep_count = segment.repeat_count.max(1);
        for rep_index in 0..rep_count {
            units.push(ScheduleUnit {
                kind: UnitKind::Work,
                label: format!("{} (Rep {}/{})", segment.label, rep_index + 1, rep_count),
                duration_sec: segment.duration_sec,
                source_segment_index: segment_index,
                rep_index,
                rep_count,
                target_speed_mps: segment.target_speed_mps,
            });

            let is_last = rep_index + 1 == rep_count;
            if segment.rest_sec > 0 && (!is_last || options.trailing_rest) {
                units.push(ScheduleUnit {
                    kind: UnitKind::Rest,
                    label: "Rest".to_string(),
                    duration_sec: segment.rest_sec,
                    source_segment_index: segment_index,
                    rep_index,
                    rep_count,
                    target_speed_mps: None,
                });
            }
        }
    }

    units
}

/// Sum of all unit durations, i.e. the ticks an uninterrupted run takes
/// (zero-length units add one tick each on top of this).
pub fn total_duration_sec(units: &[ScheduleUnit]) -> u64 {
    units.iter().map(|u| u64::from(u.duration_sec)).sum()
}
