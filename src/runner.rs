//! Client-side workout runner.
//!
//! Walks a workout's ordered exercise plan, counting reps/sets for the current
//! exercise and inserting a rest countdown between exercises. The runner is an
//! explicit state machine over one owned record; it performs no I/O itself and
//! instead emits [`Effect`]s the embedding client turns into API calls. The
//! persisted session is separate state owned by the server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use crate::models::{ExerciseResult, WorkoutExercise};

/// Fixed rest interval between exercises.
pub const REST_SECONDS: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Session not yet opened; no exercise input accepted.
    Initializing,
    /// Current exercise active, accepting rep/set input.
    Exercising,
    /// Countdown between exercises, driven by a single tick source.
    Resting { remaining: u32 },
    /// Terminal: last exercise done, completion effect emitted.
    Finished,
    /// Terminal: abandoned; the persisted session stays open.
    Quit,
}

/// An API call the embedding client should issue on the runner's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartSession {
        workout_id: String,
    },
    CompleteSession {
        session_id: String,
        results: Vec<ExerciseResult>,
    },
}

pub struct WorkoutRunner {
    workout_id: String,
    plan: Vec<WorkoutExercise>,
    phase: Phase,
    current: usize,
    reps: i64,
    sets: i64,
    results: Vec<ExerciseResult>,
    session_id: Option<String>,
    start_requested: bool,
}

impl WorkoutRunner {
    /// An empty plan yields an inert runner: `begin` emits nothing and the
    /// phase never leaves `Initializing`.
    pub fn new(workout_id: impl Into<String>, plan: Vec<WorkoutExercise>) -> Self {
        Self {
            workout_id: workout_id.into(),
            plan,
            phase: Phase::Initializing,
            current: 0,
            reps: 0,
            sets: 0,
            results: Vec::new(),
            session_id: None,
            start_requested: false,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn current_exercise(&self) -> Option<&WorkoutExercise> {
        self.plan.get(self.current)
    }

    pub fn results(&self) -> &[ExerciseResult] {
        &self.results
    }

    /// Request the session open. Emitted at most once; repeated calls while
    /// the first start is in flight are suppressed.
    pub fn begin(&mut self) -> Option<Effect> {
        if self.phase != Phase::Initializing || self.start_requested || self.plan.is_empty() {
            return None;
        }
        self.start_requested = true;
        Some(Effect::StartSession {
            workout_id: self.workout_id.clone(),
        })
    }

    /// Deliver the opened session id; unlocks exercise input. A session id
    /// that was never requested via `begin` is ignored.
    pub fn session_started(&mut self, session_id: impl Into<String>) {
        if self.phase == Phase::Initializing && self.start_requested {
            self.session_id = Some(session_id.into());
            self.phase = Phase::Exercising;
        }
    }

    pub fn add_rep(&mut self) {
        if self.phase == Phase::Exercising {
            self.reps += 1;
        }
    }

    pub fn remove_rep(&mut self) {
        if self.phase == Phase::Exercising {
            self.reps = (self.reps - 1).max(0);
        }
    }

    pub fn add_set(&mut self) {
        if self.phase == Phase::Exercising {
            self.sets += 1;
        }
    }

    pub fn remove_set(&mut self) {
        if self.phase == Phase::Exercising {
            self.sets = (self.sets - 1).max(0);
        }
    }

    /// Record the current exercise's result and advance.
    ///
    /// On the last exercise this returns the completion effect and finishes;
    /// otherwise the runner rests for [`REST_SECONDS`], advances the pointer
    /// and zeroes the counters. Skipping an exercise is the same transition
    /// with whatever counters were gathered.
    pub fn complete_exercise(&mut self) -> Option<Effect> {
        if self.phase != Phase::Exercising {
            return None;
        }
        let entry = self.plan.get(self.current)?;

        // Only targets the plan defines produce populated fields.
        let result = ExerciseResult {
            exercise_id: entry.exercise_id.clone(),
            reps_completed: entry.reps.map(|_| self.reps),
            duration_completed: entry.duration_seconds,
            sets_completed: entry.sets.map(|_| self.sets),
        };
        self.results.push(result);

        if self.current + 1 == self.plan.len() {
            self.phase = Phase::Finished;
            let session_id = self.session_id.clone()?;
            return Some(Effect::CompleteSession {
                session_id,
                results: self.results.clone(),
            });
        }

        self.current += 1;
        self.reps = 0;
        self.sets = 0;
        self.phase = Phase::Resting {
            remaining: REST_SECONDS,
        };
        None
    }

    pub fn skip_exercise(&mut self) -> Option<Effect> {
        self.complete_exercise()
    }

    /// One elapsed second. Only meaningful while resting; at zero the runner
    /// returns to the (already advanced) current exercise.
    pub fn tick(&mut self) {
        if let Phase::Resting { remaining } = self.phase {
            let remaining = remaining.saturating_sub(1);
            self.phase = if remaining == 0 {
                Phase::Exercising
            } else {
                Phase::Resting { remaining }
            };
        }
    }

    /// Abandon from any non-terminal phase. Terminal phases are inert, so no
    /// completion effect can ever be produced after quitting.
    pub fn quit(&mut self) {
        if !matches!(self.phase, Phase::Finished | Phase::Quit) {
            self.phase = Phase::Quit;
        }
    }
}

/// The runner's single cooperative timer: drives `tick()` once per second
/// while the runner is resting. Returns when the rest ends, when the runner
/// reaches a terminal phase, or when `cancel` fires (quit), whichever comes
/// first.
pub async fn run_countdown(runner: Arc<Mutex<WorkoutRunner>>, mut cancel: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // The first tick of a tokio interval fires immediately.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let mut runner = runner.lock().expect("runner lock poisoned");
                runner.tick();
                if !matches!(runner.phase(), Phase::Resting { .. }) {
                    return;
                }
            }
            changed = cancel.changed() => {
                // A dropped sender counts as cancellation.
                if changed.is_err() || *cancel.borrow() {
                    return;
                }
            }
        }
    }
}
