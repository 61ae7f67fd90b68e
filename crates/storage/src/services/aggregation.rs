//! Running statistics for exercise performance and workout trends.
//!
//! All averages are integers floored toward negative infinity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{Result, StorageError};
use crate::models::{ExercisePerformance, WorkoutTrend};
use crate::services::trend_period::TrendPeriod;

/// Statistics of one exercise within a single session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseSummary {
    pub sets: i64,
    /// Sum of reps over all sets.
    pub total_reps: i64,
    /// Volume: sum of `weight * reps` over all sets.
    pub total_weight: i64,
    pub average_reps: i64,
    pub average_weight: i64,
    pub personal_best_reps: i64,
    pub personal_best_weight: i64,
}

impl ExerciseSummary {
    pub fn from_sets(reps: &[i64], weights: &[i64]) -> Result<Self> {
        if reps.len() != weights.len() {
            return Err(StorageError::Validation(format!(
                "Expected one weight per set: got {} rep entries and {} weight entries",
                reps.len(),
                weights.len()
            )));
        }
        if reps.is_empty() {
            return Err(StorageError::Validation(
                "An exercise needs at least one set".to_string(),
            ));
        }

        let sets = reps.len() as i64;
        let total_reps = reps
            .iter()
            .try_fold(0i64, |acc, r| acc.checked_add(*r))
            .ok_or_else(|| overflow("total reps"))?;
        let total_weight = reps
            .iter()
            .zip(weights)
            .try_fold(0i64, |acc, (r, w)| r.checked_mul(*w)?.checked_add(acc))
            .ok_or_else(|| overflow("total weight"))?;

        // Non-empty, checked above
        let personal_best_reps = reps.iter().copied().max().unwrap_or_default();
        let personal_best_weight = weights.iter().copied().max().unwrap_or_default();

        Ok(Self {
            sets,
            total_reps,
            total_weight,
            average_reps: floor_div(total_reps, sets),
            average_weight: floor_div(total_weight, sets),
            personal_best_reps,
            personal_best_weight,
        })
    }
}

/// Totals of a whole session, summed over its exercises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionTotals {
    pub total_weight: i64,
    pub total_reps: i64,
}

impl SessionTotals {
    pub fn add(&mut self, summary: &ExerciseSummary) -> Result<()> {
        self.total_weight = self
            .total_weight
            .checked_add(summary.total_weight)
            .ok_or_else(|| overflow("session total weight"))?;
        self.total_reps = self
            .total_reps
            .checked_add(summary.total_reps)
            .ok_or_else(|| overflow("session total reps"))?;
        Ok(())
    }

    pub fn from_summaries(summaries: &[ExerciseSummary]) -> Result<Self> {
        let mut totals = SessionTotals::default();
        for summary in summaries {
            totals.add(summary)?;
        }
        Ok(totals)
    }
}

fn overflow(what: &str) -> StorageError {
    StorageError::Validation(format!("{} is too large to aggregate", what))
}

/// Floor division; `denominator` must be positive.
pub fn floor_div(numerator: i64, denominator: i64) -> i64 {
    numerator.div_euclid(denominator)
}

/// Folds one more sample into a mean of `count` samples.
pub fn running_mean(average: i64, count: i64, sample: i64) -> Result<i64> {
    let sum = average
        .checked_mul(count)
        .and_then(|sum| sum.checked_add(sample))
        .ok_or_else(|| overflow("running mean"))?;
    let next_count = count
        .checked_add(1)
        .ok_or_else(|| overflow("session count"))?;
    Ok(floor_div(sum, next_count))
}

pub fn first_performance(
    athlete_id: i64,
    exercise_id: i64,
    summary: &ExerciseSummary,
) -> ExercisePerformance {
    ExercisePerformance {
        athlete_id,
        exercise_id,
        total_sessions: 1,
        average_reps: summary.average_reps,
        average_weight: summary.average_weight,
        personal_best_reps: summary.personal_best_reps,
        personal_best_weight: summary.personal_best_weight,
    }
}

pub fn next_performance(
    existing: &ExercisePerformance,
    summary: &ExerciseSummary,
) -> Result<ExercisePerformance> {
    let count = existing.total_sessions;
    Ok(ExercisePerformance {
        athlete_id: existing.athlete_id,
        exercise_id: existing.exercise_id,
        total_sessions: count
            .checked_add(1)
            .ok_or_else(|| overflow("total sessions"))?,
        average_reps: running_mean(existing.average_reps, count, summary.average_reps)?,
        average_weight: running_mean(existing.average_weight, count, summary.average_weight)?,
        personal_best_reps: existing.personal_best_reps.max(summary.personal_best_reps),
        personal_best_weight: existing
            .personal_best_weight
            .max(summary.personal_best_weight),
    })
}

pub fn first_trend(
    athlete_id: i64,
    period_type: TrendPeriod,
    period_start: NaiveDate,
    totals: &SessionTotals,
    now: DateTime<Utc>,
) -> WorkoutTrend {
    WorkoutTrend {
        athlete_id,
        period_type,
        period_start,
        total_workouts: 1,
        total_weight: totals.total_weight,
        average_weight: totals.total_weight,
        average_reps: totals.total_reps,
        last_updated: now,
    }
}

pub fn next_trend(
    existing: &WorkoutTrend,
    totals: &SessionTotals,
    now: DateTime<Utc>,
) -> Result<WorkoutTrend> {
    let count = existing.total_workouts;
    Ok(WorkoutTrend {
        athlete_id: existing.athlete_id,
        period_type: existing.period_type,
        period_start: existing.period_start,
        total_workouts: count
            .checked_add(1)
            .ok_or_else(|| overflow("total workouts"))?,
        total_weight: existing
            .total_weight
            .checked_add(totals.total_weight)
            .ok_or_else(|| overflow("trend total weight"))?,
        average_weight: running_mean(existing.average_weight, count, totals.total_weight)?,
        average_reps: running_mean(existing.average_reps, count, totals.total_reps)?,
        last_updated: now,
    })
}
