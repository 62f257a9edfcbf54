//src/scheduler.rs
use tracing::{debug, info};

use crate::schedule::ScheduleUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
    Cancelled,
}

impl SchedulerState {
    /// A session is live while it is running or paused.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CueKind {
    UnitStart,
    UnitEnd,
}

/// Notifications for the display layer, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerEvent {
    UnitStarted { index: usize, unit: ScheduleUnit },
    UnitCompleted { index: usize, unit: ScheduleUnit },
    Progress { unit_index: usize, remaining_sec: u32 },
    Cue(CueKind),
    SessionCompleted { elapsed_sec: u64 },
    SessionCancelled { unit_index: usize },
    ResetCompleted,
}

/// Plays back a unit sequence one second at a time.
///
/// The scheduler never reads a clock: whoever owns it calls [`tick`](Self::tick)
/// once per second while it is running.
#[derive(Debug, Default)]
pub struct IntervalScheduler {
    units: Vec<ScheduleUnit>,
    state: SchedulerState,
    unit_index: usize,
    remaining_sec: Option<u32>,
    elapsed_sec: u64,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    pub const fn unit_index(&self) -> usize {
        self.unit_index
    }

    pub const fn remaining_sec(&self) -> Option<u32> {
        self.remaining_sec
    }

    pub const fn elapsed_sec(&self) -> u64 {
        self.elapsed_sec
    }

    pub fn units(&self) -> &[ScheduleUnit] {
        &self.units
    }

    pub fn current_unit(&self) -> Option<&ScheduleUnit> {
        if self.state.is_active() {
            self.units.get(self.unit_index)
        } else {
            None
        }
    }

    /// Progress through the current unit, `None` when nothing is playing.
    pub fn progress_fraction(&self) -> Option<f64> {
        let unit = self.current_unit()?;
        Some(unit.progress_fraction(self.remaining_sec.unwrap_or(0)))
    }

    /// Begins a new session. Ignored while a session is running or paused.
    pub fn start(&mut self, units: Vec<ScheduleUnit>) -> Vec<SchedulerEvent> {
        if self.state.is_active() {
            debug!(state = ?self.state, "start ignored, session already active");
            return Vec::new();
        }

        self.units = units;
        self.unit_index = 0;
        self.remaining_sec = None;
        self.elapsed_sec = 0;

        if self.units.is_empty() {
            info!("started an empty session, completing immediately");
            self.state = SchedulerState::Completed;
            return vec![SchedulerEvent::SessionCompleted { elapsed_sec: 0 }];
        }

        info!(units = self.units.len(), "session started");
        self.state = SchedulerState::Running;
        let mut events = Vec::new();
        self.begin_current_unit(&mut events);
        events
    }

    /// Returns `true` if the session was running and is now paused.
    pub fn pause(&mut self) -> bool {
        if self.state != SchedulerState::Running {
            debug!(state = ?self.state, "pause ignored");
            return false;
        }
        debug!(remaining = ?self.remaining_sec, "session paused");
        self.state = SchedulerState::Paused;
        true
    }

    /// Returns `true` if the session was paused and is running again.
    pub fn resume(&mut self) -> bool {
        if self.state != SchedulerState::Paused {
            debug!(state = ?self.state, "resume ignored");
            return false;
        }
        debug!(remaining = ?self.remaining_sec, "session resumed");
        self.state = SchedulerState::Running;
        true
    }

    /// Stops a live session where it is; the position stays readable.
    pub fn cancel(&mut self) -> Vec<SchedulerEvent> {
        if !self.state.is_active() {
            debug!(state = ?self.state, "cancel ignored");
            return Vec::new();
        }
        info!(unit_index = self.unit_index, "session cancelled");
        self.state = SchedulerState::Cancelled;
        self.remaining_sec = None;
        vec![SchedulerEvent::SessionCancelled {
            unit_index: self.unit_index,
        }]
    }

    /// Back to `Idle` from any state.
    pub fn reset(&mut self) -> Vec<SchedulerEvent> {
        info!(state = ?self.state, "session reset");
        self.units.clear();
        self.state = SchedulerState::Idle;
        self.unit_index = 0;
        self.remaining_sec = None;
        self.elapsed_sec = 0;
        vec![SchedulerEvent::ResetCompleted]
    }

    /// Advances the countdown by one second.
    ///
    /// Zero-length units take exactly one tick, like every other unit boundary.
    pub fn tick(&mut self) -> Vec<SchedulerEvent> {
        if self.state != SchedulerState::Running {
            return Vec::new();
        }
        let Some(remaining) = self.remaining_sec else {
            return Vec::new();
        };

        let remaining = remaining.saturating_sub(1);
        self.remaining_sec = Some(remaining);
        self.elapsed_sec += 1;

        let mut events = vec![SchedulerEvent::Progress {
            unit_index: self.unit_index,
            remaining_sec: remaining,
        }];
        if remaining > 0 {
            return events;
        }

        let finished = self.units[self.unit_index].clone();
        events.push(SchedulerEvent::UnitCompleted {
            index: self.unit_index,
            unit: finished,
        });
        events.push(SchedulerEvent::Cue(CueKind::UnitEnd));
        self.unit_index += 1;

        if self.unit_index < self.units.len() {
            self.begin_current_unit(&mut events);
        } else {
            info!(elapsed_sec = self.elapsed_sec, "session completed");
            self.state = SchedulerState::Completed;
            self.remaining_sec = None;
            events.push(SchedulerEvent::SessionCompleted {
                elapsed_sec: self.elapsed_sec,
            });
        }
        events
    }

    fn begin_current_unit(&mut self, events: &mut Vec<SchedulerEvent>) {
        let unit = self.units[self.unit_index].clone();
        debug!(index = self.unit_index, label = %unit.label, "unit started");
        self.remaining_sec = Some(unit.duration_sec);
        events.push(SchedulerEvent::UnitStarted {
            index: self.unit_index,
            unit,
        });
        events.push(SchedulerEvent::Cue(CueKind::UnitStart));
    }
}
