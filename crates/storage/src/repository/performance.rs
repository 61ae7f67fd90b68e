use async_trait::async_trait;

use crate::client::{Filters, PostgrestClient};
use crate::error::{Result, StorageError};
use crate::models::ExercisePerformance;
use crate::repository::PerformanceStore;

const RESOURCE: &str = "exercise_performance";

pub struct PerformanceRepository<'a> {
    client: &'a PostgrestClient,
}

impl<'a> PerformanceRepository<'a> {
    pub fn new(client: &'a PostgrestClient) -> Self {
        Self { client }
    }

    fn key_filters(athlete_id: i64, exercise_id: i64) -> Filters {
        Filters::new()
            .eq("athlete_id", athlete_id)
            .eq("exercise_id", exercise_id)
    }

    /// All exercises an athlete has performance rows for.
    pub async fn list_for_athlete(&self, athlete_id: i64) -> Result<Vec<ExercisePerformance>> {
        let filters = Filters::new()
            .eq("athlete_id", athlete_id)
            .order("exercise_id", true);
        self.client.select(RESOURCE, &filters).await
    }
}

#[async_trait]
impl<'a> PerformanceStore for PerformanceRepository<'a> {
    async fn find_performance(
        &self,
        athlete_id: i64,
        exercise_id: i64,
    ) -> Result<Option<ExercisePerformance>> {
        self.client
            .select_one(RESOURCE, &Self::key_filters(athlete_id, exercise_id))
            .await
    }

    async fn insert_performance(&self, row: &ExercisePerformance) -> Result<ExercisePerformance> {
        let rows: Vec<ExercisePerformance> = self.client.insert(RESOURCE, row).await?;
        rows.into_iter().next().ok_or_else(|| {
            StorageError::NotFound(format!(
                "{} row for athlete {} / exercise {} missing after insert",
                RESOURCE, row.athlete_id, row.exercise_id
            ))
        })
    }

    async fn replace_performance(
        &self,
        current: &ExercisePerformance,
        next: &ExercisePerformance,
    ) -> Result<Option<ExercisePerformance>> {
        let filters = Self::key_filters(current.athlete_id, current.exercise_id)
            .eq("total_sessions", current.total_sessions);
        let rows: Vec<ExercisePerformance> = self.client.update(RESOURCE, &filters, next).await?;
        Ok(rows.into_iter().next())
    }
}
