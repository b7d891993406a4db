//! Elapsed-time driven progress display: named stages and a rotating
//! decorative animation. Both are pure functions of elapsed seconds.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("stage plan has no stages")]
    EmptyPlan,
    #[error("first stage must activate at 0 seconds, got {0}")]
    FirstThresholdNotZero(u64),
    #[error("stage order {order} does not follow {previous}")]
    OrderNotIncreasing { previous: u32, order: u32 },
    #[error("stage {order} activates at {threshold}s, not after the previous stage")]
    ThresholdNotIncreasing { order: u32, threshold: u64 },
    #[error("animation pool is empty")]
    EmptyPool,
    #[error("animation cycle must be a positive number of seconds, got {0}")]
    InvalidCycle(f64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressStage {
    pub order: u32,
    pub activation_threshold_secs: u64,
    pub id: String,
    pub label: String,
    pub description: String,
}

impl ProgressStage {
    pub fn new(
        order: u32,
        activation_threshold_secs: u64,
        id: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            order,
            activation_threshold_secs,
            id: id.into(),
            label: label.into(),
            description: description.into(),
        }
    }
}

/// Ordered, non-empty stage list with strictly increasing thresholds starting at 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePlan {
    stages: Vec<ProgressStage>,
}

impl StagePlan {
    pub fn new(stages: Vec<ProgressStage>) -> Result<Self, ScheduleError> {
        let first = stages.first().ok_or(ScheduleError::EmptyPlan)?;
        if first.activation_threshold_secs != 0 {
            return Err(ScheduleError::FirstThresholdNotZero(
                first.activation_threshold_secs,
            ));
        }
        for pair in stages.windows(2) {
            let (previous, next) = (&pair[0], &pair[1]);
            if next.order <= previous.order {
                return Err(ScheduleError::OrderNotIncreasing {
                    previous: previous.order,
                    order: next.order,
                });
            }
            if next.activation_threshold_secs <= previous.activation_threshold_secs {
                return Err(ScheduleError::ThresholdNotIncreasing {
                    order: next.order,
                    threshold: next.activation_threshold_secs,
                });
            }
        }
        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[ProgressStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Returns the last stage whose threshold is at or below `elapsed_secs`.
    /// Past the final threshold the final stage stays current.
    pub fn stage_at(&self, elapsed_secs: u64) -> (usize, &ProgressStage) {
        let index = self
            .stages
            .partition_point(|stage| stage.activation_threshold_secs <= elapsed_secs)
            .saturating_sub(1);
        (index, &self.stages[index])
    }

    pub(crate) fn from_validated(stages: Vec<ProgressStage>) -> Self {
        Self { stages }
    }
}

/// Fixed pool of animation identifiers and the time one full rotation takes.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationPool {
    ids: Vec<String>,
    cycle_secs: f64,
}

impl AnimationPool {
    pub fn new<I, S>(ids: I, cycle_secs: f64) -> Result<Self, ScheduleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            return Err(ScheduleError::EmptyPool);
        }
        if !(cycle_secs.is_finite() && cycle_secs > 0.0) {
            return Err(ScheduleError::InvalidCycle(cycle_secs));
        }
        Ok(Self { ids, cycle_secs })
    }

    /// Pool of `loader-1` .. `loader-<count>`.
    pub(crate) fn numbered(count: usize, cycle_secs: f64) -> Self {
        Self {
            ids: (1..=count).map(|n| format!("loader-{n}")).collect(),
            cycle_secs,
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn cycle_secs(&self) -> f64 {
        self.cycle_secs
    }

    /// Produces the execution's fixed rotation: a uniform permutation of the
    /// pool drawn from a generator seeded with `seed`.
    pub fn shuffled(&self, seed: u64) -> AnimationSlot {
        let mut order = self.ids.clone();
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);
        AnimationSlot {
            order,
            cycle_secs: self.cycle_secs,
        }
    }
}

/// One execution's animation rotation. Never re-shuffled once created.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSlot {
    order: Vec<String>,
    cycle_secs: f64,
}

impl AnimationSlot {
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn slot_secs(&self) -> f64 {
        self.cycle_secs / self.order.len() as f64
    }

    /// Index into the shuffled order for `elapsed_secs`, always within bounds.
    pub fn index_at(&self, elapsed_secs: u64) -> usize {
        let in_cycle = (elapsed_secs as f64) % self.cycle_secs;
        let index = (in_cycle / self.slot_secs()).floor() as usize;
        index.min(self.order.len() - 1)
    }

    pub fn active_at(&self, elapsed_secs: u64) -> &str {
        &self.order[self.index_at(elapsed_secs)]
    }
}

/// Everything a renderer needs for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub elapsed_secs: u64,
    pub remaining_secs: u64,
    pub stage_index: usize,
    pub stage_count: usize,
    pub stage_label: String,
    pub stage_description: String,
    pub animation_index: usize,
    pub animation_id: String,
}

/// Formats seconds as `m:ss`.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
