use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::services::trend_period::TrendPeriod;

/// Session statistics bucketed by athlete and trend period.
///
/// Same running-mean coupling as `ExercisePerformance`, with
/// `total_workouts` as the count and the row version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutTrend {
    pub athlete_id: i64,
    pub period_type: TrendPeriod,
    pub period_start: NaiveDate,
    pub total_workouts: i64,
    pub total_weight: i64,
    pub average_weight: i64,
    pub average_reps: i64,
    pub last_updated: DateTime<Utc>,
}
