use serde::{Deserialize, Serialize};

/// Running statistics for one athlete on one exercise.
///
/// `average_reps` and `average_weight` are running means that are only
/// meaningful together with `total_sessions`: the next update treats
/// `average * total_sessions` as the sum of all previous session averages.
/// Editing either field outside the aggregate updater silently skews every
/// later average.
///
/// `total_sessions` also serves as the row version for optimistic
/// concurrency, since every write increments it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExercisePerformance {
    pub athlete_id: i64,
    pub exercise_id: i64,
    pub total_sessions: i64,
    pub average_reps: i64,
    pub average_weight: i64,
    pub personal_best_reps: i64,
    pub personal_best_weight: i64,
}
