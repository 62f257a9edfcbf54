//src/session.rs
use std::time::Instant;
use tracing::warn;

use crate::plan::Workout;
use crate::schedule::{expand, ExpandOptions, ScheduleUnit};
use crate::scheduler::{CueKind, IntervalScheduler, SchedulerEvent, SchedulerState};
use crate::ticker::Ticker;

/// Something that can make a short sound or flash.
///
/// Failures are logged and otherwise ignored; they never touch timer state.
pub trait CueSink {
    /// # Errors
    /// Any playback failure; the caller swallows it.
    fn play(&mut self, cue: CueKind) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCue;

impl CueSink for SilentCue {
    fn play(&mut self, _cue: CueKind) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChecklistRow {
    pub checked: bool,
    pub active: bool,
}

/// Checkbox + highlight state for each unit, driven only by scheduler events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepChecklist {
    rows: Vec<ChecklistRow>,
}

impl RepChecklist {
    pub fn new(len: usize) -> Self {
        Self {
            rows: vec![ChecklistRow::default(); len],
        }
    }

    pub fn rows(&self) -> &[ChecklistRow] {
        &self.rows
    }

    pub fn completed_count(&self) -> usize {
        self.rows.iter().filter(|r| r.checked).count()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.rows.iter().position(|r| r.active)
    }

    pub fn clear(&mut self) {
        self.rows.iter_mut().for_each(|r| *r = ChecklistRow::default());
    }

    pub fn apply(&mut self, event: &SchedulerEvent) {
        match event {
            SchedulerEvent::UnitStarted { index, .. } => {
                self.rows.iter_mut().for_each(|r| r.active = false);
                if let Some(row) = self.rows.get_mut(*index) {
                    row.active = true;
                }
            }
            SchedulerEvent::UnitCompleted { index, .. } => {
                if let Some(row) = self.rows.get_mut(*index) {
                    row.checked = true;
                    row.active = false;
                }
            }
            SchedulerEvent::SessionCancelled { .. } => {
                self.rows.iter_mut().for_each(|r| r.active = false);
            }
            SchedulerEvent::ResetCompleted => self.clear(),
            SchedulerEvent::Progress { .. }
            | SchedulerEvent::Cue(_)
            | SchedulerEvent::SessionCompleted { .. } => {}
        }
    }
}

/// One workout being played back: scheduler, tick source, checklist and cues.
pub struct Session {
    workout: Workout,
    units: Vec<ScheduleUnit>,
    scheduler: IntervalScheduler,
    ticker: Ticker,
    checklist: RepChecklist,
    cue: Box<dyn CueSink>,
    cues_enabled: bool,
}

impl Session {
    pub fn new(workout: &Workout, options: ExpandOptions, cue: Box<dyn CueSink>) -> Self {
        let units = expand(&workout.segments, options);
        Self {
            workout: workout.clone(),
            checklist: RepChecklist::new(units.len()),
            units,
            scheduler: IntervalScheduler::new(),
            ticker: Ticker::default(),
            cue,
            cues_enabled: true,
        }
    }

    #[must_use]
    pub fn with_ticker(mut self, ticker: Ticker) -> Self {
        self.ticker = ticker;
        self
    }

    pub fn set_cues_enabled(&mut self, enabled: bool) {
        self.cues_enabled = enabled;
    }

    pub const fn workout(&self) -> &Workout {
        &self.workout
    }

    pub fn units(&self) -> &[ScheduleUnit] {
        &self.units
    }

    pub const fn scheduler(&self) -> &IntervalScheduler {
        &self.scheduler
    }

    pub const fn checklist(&self) -> &RepChecklist {
        &self.checklist
    }

    pub const fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn until_next_tick(&self, now: Instant) -> Option<std::time::Duration> {
        self.ticker.until_next(now)
    }

    pub fn start(&mut self, now: Instant) -> Vec<SchedulerEvent> {
        if self.scheduler.state().is_active() {
            return Vec::new();
        }
        self.checklist.clear();
        let events = self.scheduler.start(self.units.clone());
        if self.scheduler.state() == SchedulerState::Running {
            self.ticker.start(now);
        }
        self.dispatch(&events);
        events
    }

    pub fn pause(&mut self) -> bool {
        let paused = self.scheduler.pause();
        if paused {
            self.ticker.stop();
        }
        paused
    }

    pub fn resume(&mut self, now: Instant) -> bool {
        let resumed = self.scheduler.resume();
        if resumed {
            self.ticker.start(now);
        }
        resumed
    }

    /// Pause when running, resume when paused, otherwise nothing.
    pub fn toggle_pause(&mut self, now: Instant) -> bool {
        match self.scheduler.state() {
            SchedulerState::Running => self.pause(),
            SchedulerState::Paused => self.resume(now),
            _ => false,
        }
    }

    pub fn cancel(&mut self) -> Vec<SchedulerEvent> {
        self.ticker.stop();
        let events = self.scheduler.cancel();
        self.dispatch(&events);
        events
    }

    pub fn reset(&mut self) -> Vec<SchedulerEvent> {
        self.ticker.stop();
        let events = self.scheduler.reset();
        self.dispatch(&events);
        events
    }

    /// Delivers every tick that fell due up to `now`.
    pub fn poll(&mut self, now: Instant) -> Vec<SchedulerEvent> {
        let due = self.ticker.due_ticks(now);
        let mut events = Vec::new();
        for _ in 0..due {
            events.extend(self.scheduler.tick());
            if self.scheduler.state() != SchedulerState::Running {
                break;
            }
        }
        if self.scheduler.state() != SchedulerState::Running {
            self.ticker.stop();
        }
        self.dispatch(&events);
        events
    }

    /// One tick from an external one-second source, bypassing the ticker.
    pub fn tick(&mut self) -> Vec<SchedulerEvent> {
        let events = self.scheduler.tick();
        if self.scheduler.state() != SchedulerState::Running {
            self.ticker.stop();
        }
        self.dispatch(&events);
        events
    }

    fn dispatch(&mut self, events: &[SchedulerEvent]) {
        for event in events {
            self.checklist.apply(event);
            if let SchedulerEvent::Cue(kind) = event {
                if self.cues_enabled {
                    if let Err(e) = self.cue.play(*kind) {
                        warn!("Cue playback failed: {e:#}");
                    }
                }
            }
        }
    }
}
