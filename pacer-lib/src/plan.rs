//src/plan.rs
use thiserror::Error;

use crate::config::Units;
use crate::format::format_speed;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("Unknown day: {0}")]
    UnknownDay(String),
    #[error("Workout '{day}' has no variant named '{variant}'")]
    UnknownVariant { day: String, variant: String },
    #[error("Goal distance and goal time must both be positive")]
    InvalidGoal,
}

/// Goal race: distance covered in a target time. Every paced
/// duration and every displayed speed is derived from `speed_mps`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalPace {
    distance_m: u32,
    goal_time_sec: u32,
}

/// 2000 m in 8:00.
impl Default for GoalPace {
    fn default() -> Self {
        Self {
            distance_m: 2000,
            goal_time_sec: 480,
        }
    }
}

impl GoalPace {
    /// # Errors
    /// Returns `PlanError::InvalidGoal` if either value is zero.
    pub fn new(distance_m: u32, goal_time_sec: u32) -> Result<Self, PlanError> {
        if distance_m == 0 || goal_time_sec == 0 {
            return Err(PlanError::InvalidGoal);
        }
        Ok(Self {
            distance_m,
            goal_time_sec,
        })
    }

    pub const fn distance_m(&self) -> u32 {
        self.distance_m
    }

    pub const fn goal_time_sec(&self) -> u32 {
        self.goal_time_sec
    }

    pub fn speed_mps(&self) -> f64 {
        f64::from(self.distance_m) / f64::from(self.goal_time_sec)
    }

    /// Goal speed scaled by an effort factor (1.0 = goal pace).
    pub fn speed_at(&self, factor: f64) -> f64 {
        self.speed_mps() * factor
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub label: String,
    pub distance_m: Option<u32>,
    /// Canonical speed for this segment, if it has one.
    pub target_speed_mps: Option<f64>,
    pub duration_sec: u32,
    pub rest_sec: u32,
    pub repeat_count: u32,
}

impl Segment {
    /// A segment run for a fixed time.
    pub fn timed(label: impl Into<String>, duration_sec: u32) -> Self {
        Self {
            label: label.into(),
            distance_m: None,
            target_speed_mps: None,
            duration_sec,
            rest_sec: 0,
            repeat_count: 1,
        }
    }

    /// A segment covering `distance_m` at `speed_mps`; the duration is derived.
    pub fn paced(label: impl Into<String>, distance_m: u32, speed_mps: f64) -> Self {
        let duration_sec = if speed_mps > 0.0 {
            duration_for(distance_m, speed_mps)
        } else {
            0
        };
        Self {
            label: label.into(),
            distance_m: Some(distance_m),
            target_speed_mps: (speed_mps > 0.0).then_some(speed_mps),
            duration_sec,
            rest_sec: 0,
            repeat_count: 1,
        }
    }

    /// Attach a distance to a timed segment; its speed becomes distance / duration.
    #[must_use]
    pub fn covering(mut self, distance_m: u32) -> Self {
        self.distance_m = Some(distance_m);
        self.target_speed_mps = (self.duration_sec > 0 && distance_m > 0)
            .then(|| f64::from(distance_m) / f64::from(self.duration_sec));
        self
    }

    #[must_use]
    pub const fn with_rest(mut self, rest_sec: u32) -> Self {
        self.rest_sec = rest_sec;
        self
    }

    #[must_use]
    pub fn repeated(mut self, repeat_count: u32) -> Self {
        self.repeat_count = repeat_count.max(1);
        self
    }

    /// Label with the target speed appended, e.g. `400 m - 15.0 kph`.
    pub fn describe(&self, units: Units) -> String {
        match self.target_speed_mps {
            Some(speed) => format!("{} - {}", self.label, format_speed(speed, units)),
            None => self.label.clone(),
        }
    }

    /// Active seconds across all repetitions, rest excluded.
    pub fn total_work_sec(&self) -> u64 {
        u64::from(self.duration_sec) * u64::from(self.repeat_count.max(1))
    }
}

fn duration_for(distance_m: u32, speed_mps: f64) -> u32 {
    let secs = (f64::from(distance_m) / speed_mps).round();
    if secs.is_finite() && secs >= 0.0 {
        secs as u32
    } else {
        0
    }
}

/// A named alternative segment list for a day.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub name: String,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    pub day: String,
    pub title: String,
    pub explanation: String,
    pub warmup: Vec<String>,
    pub segments: Vec<Segment>,
    pub mobility: Vec<String>,
    pub variants: Vec<Variant>,
    pub active_variant: Option<String>,
}

impl Workout {
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    pub fn variant_names(&self) -> Vec<&str> {
        self.variants.iter().map(|v| v.name.as_str()).collect()
    }

    /// Name of the variant after the active one, wrapping around.
    pub fn next_variant_name(&self) -> Option<&str> {
        if self.variants.is_empty() {
            return None;
        }
        let current = self.active_variant.as_deref().and_then(|active| {
            self.variants
                .iter()
                .position(|v| v.name.eq_ignore_ascii_case(active))
        });
        let next = current.map_or(0, |i| (i + 1) % self.variants.len());
        Some(self.variants[next].name.as_str())
    }

    /// Copy of this workout with `variant_name` as the active segment list.
    /// # Errors
    /// Returns `PlanError::UnknownVariant` if there is no such variant.
    pub fn with_variant(&self, variant_name: &str) -> Result<Self, PlanError> {
        let variant = self
            .variants
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(variant_name.trim()))
            .ok_or_else(|| PlanError::UnknownVariant {
                day: self.day.clone(),
                variant: variant_name.to_string(),
            })?;

        let mut selected = self.clone();
        selected.segments = variant.segments.clone();
        selected.active_variant = Some(variant.name.clone());
        Ok(selected)
    }

    pub fn total_work_sec(&self) -> u64 {
        self.segments.iter().map(Segment::total_work_sec).sum()
    }
}

/// Immutable day -> workout table in weekday order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanCatalog {
    workouts: Vec<Workout>,
}

impl PlanCatalog {
    pub const fn from_workouts(workouts: Vec<Workout>) -> Self {
        Self { workouts }
    }

    /// # Errors
    /// Returns `PlanError::UnknownDay` if `day` is not in the table.
    pub fn resolve(&self, day: &str) -> Result<&Workout, PlanError> {
        let wanted = day.trim();
        self.workouts
            .iter()
            .find(|w| w.day.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PlanError::UnknownDay(day.to_string()))
    }

    pub fn list_days(&self) -> Vec<&str> {
        self.workouts.iter().map(|w| w.day.as_str()).collect()
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    /// # Errors
    /// Returns `PlanError::UnknownVariant` if the workout has no such variant.
    pub fn select_variant(&self, workout: &Workout, variant_name: &str) -> Result<Workout, PlanError> {
        workout.with_variant(variant_name)
    }

    /// The six-day plan, with every paced duration derived from `goal`.
    pub fn standard(goal: &GoalPace) -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();

        let vo2 = vec![Segment::paced("500 m VO₂ Max", 500, goal.speed_at(1.05))
            .repeated(5)
            .with_rest(120)];
        let hill = vec![Segment::timed("Hill Sprint 60 m", 15)
            .covering(60)
            .repeated(5)
            .with_rest(90)];

        let workouts = vec![
            Workout {
                day: "Monday".into(),
                title: "Intervals".into(),
                explanation: "Short, fast repetitions at goal pace to develop speed and running economy.".into(),
                warmup: strings(&["10 min easy jog", "Dynamic mobility (hips, calves, ankles)"]),
                segments: vec![Segment::paced("400 m", 400, goal.speed_at(1.0))
                    .repeated(6)
                    .with_rest(20)],
                mobility: strings(&["Hip flexor stretch – 60 sec", "Calf stretch – 60 sec"]),
                variants: Vec::new(),
                active_variant: None,
            },
            Workout {
                day: "Tuesday".into(),
                title: "Tempo Run".into(),
                explanation: "Sustained controlled effort to improve lactate threshold. Target speed below goal pace.".into(),
                warmup: strings(&["10 min easy jog"]),
                segments: vec![
                    Segment::paced("Continuous tempo run 5 km", 5000, goal.speed_at(0.8)),
                    Segment::timed("100 m relaxed strides", 60)
                        .covering(100)
                        .repeated(3)
                        .with_rest(30),
                ],
                mobility: strings(&["Hamstring stretch – 60 sec"]),
                variants: Vec::new(),
                active_variant: None,
            },
            Workout {
                day: "Wednesday".into(),
                title: "Recovery".into(),
                explanation: "Low intensity aerobic work to promote recovery and maintain form.".into(),
                warmup: strings(&["5 min brisk walk"]),
                segments: vec![Segment::timed("Easy run or cross-training", 1200).covering(2000)],
                mobility: strings(&["Full body mobility flow – 10 min"]),
                variants: Vec::new(),
                active_variant: None,
            },
            Workout {
                day: "Thursday".into(),
                title: "VO₂ Max Intervals".into(),
                explanation: "Choose between VO₂ Max intervals or Hill Sprints.".into(),
                warmup: strings(&["10 min easy jog", "Running drills"]),
                segments: vo2.clone(),
                mobility: strings(&["Quad stretch – 60 sec"]),
                variants: vec![
                    Variant {
                        name: "VO2".into(),
                        segments: vo2,
                    },
                    Variant {
                        name: "Hill".into(),
                        segments: hill,
                    },
                ],
                active_variant: Some("VO2".into()),
            },
            Workout {
                day: "Friday".into(),
                title: "Endurance + Strides".into(),
                explanation: "Easy aerobic running with short speed exposure.".into(),
                warmup: strings(&["5–10 min easy jog"]),
                segments: vec![
                    Segment::timed("Easy run", 1800).covering(4000),
                    Segment::timed("1 min strides", 60)
                        .covering(233)
                        .repeated(4)
                        .with_rest(30),
                ],
                mobility: strings(&["Foam rolling – 10 min"]),
                variants: Vec::new(),
                active_variant: None,
            },
            Workout {
                day: "Saturday".into(),
                title: "Race Simulation".into(),
                explanation: "Broken race effort to practice pacing. Speeds per segment derived from the goal.".into(),
                warmup: strings(&["10 min easy jog"]),
                segments: vec![
                    Segment::paced("1 km slightly slower than goal pace", 1000, goal.speed_at(0.8)),
                    Segment::timed("Recovery", 120),
                    Segment::paced("500 m at goal pace", 500, goal.speed_at(1.0)),
                    Segment::paced("400 m fast finish", 400, goal.speed_at(1.05))
                        .repeated(2)
                        .with_rest(60),
                ],
                mobility: strings(&["Hip flexor stretch – 60 sec"]),
                variants: Vec::new(),
                active_variant: None,
            },
        ];

        Self { workouts }
    }
}
