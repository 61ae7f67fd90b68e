//! Backend access, one repository per resource family.
//!
//! The aggregate and session traits are the seams the completion services
//! are written against; the PostgREST repositories implement them.

pub mod athlete;
pub mod exercise;
#[cfg(test)]
pub(crate) mod memory;
pub mod performance;
pub mod session;
pub mod trend;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{
    CompletionFlag, ExercisePerformance, NewWorkoutDetail, WorkoutDetail, WorkoutSession,
    WorkoutTrend,
};
use crate::services::trend_period::TrendPeriod;

pub use athlete::AthleteRepository;
pub use exercise::ExerciseRepository;
pub use performance::PerformanceRepository;
pub use session::SessionRepository;
pub use trend::TrendRepository;

#[async_trait]
pub trait PerformanceStore: Send + Sync {
    async fn find_performance(
        &self,
        athlete_id: i64,
        exercise_id: i64,
    ) -> Result<Option<ExercisePerformance>>;

    /// Fails with a unique violation if the row already exists.
    async fn insert_performance(&self, row: &ExercisePerformance) -> Result<ExercisePerformance>;

    /// Writes `next` only if the stored row still has `current.total_sessions`.
    /// Returns `None` when another writer got there first.
    async fn replace_performance(
        &self,
        current: &ExercisePerformance,
        next: &ExercisePerformance,
    ) -> Result<Option<ExercisePerformance>>;
}

#[async_trait]
pub trait TrendStore: Send + Sync {
    async fn find_trend(
        &self,
        athlete_id: i64,
        period_type: TrendPeriod,
        period_start: NaiveDate,
    ) -> Result<Option<WorkoutTrend>>;

    /// Fails with a unique violation if the row already exists.
    async fn insert_trend(&self, row: &WorkoutTrend) -> Result<WorkoutTrend>;

    /// Writes `next` only if the stored row still has `current.total_workouts`.
    async fn replace_trend(
        &self,
        current: &WorkoutTrend,
        next: &WorkoutTrend,
    ) -> Result<Option<WorkoutTrend>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn find_session(&self, athlete_id: i64, date: NaiveDate)
    -> Result<Option<WorkoutSession>>;

    async fn create_session(
        &self,
        athlete_id: i64,
        date: NaiveDate,
        completed: CompletionFlag,
    ) -> Result<WorkoutSession>;

    /// Swaps the session's detail rows for `details`.
    async fn replace_details(
        &self,
        session_id: i64,
        details: &[NewWorkoutDetail],
    ) -> Result<Vec<WorkoutDetail>>;

    /// Flips a planned session to completed. Fails with `AlreadyCompleted`
    /// if it was completed in the meantime.
    async fn mark_completed(&self, session_id: i64) -> Result<WorkoutSession>;
}
