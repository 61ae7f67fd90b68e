use async_trait::async_trait;
use chrono::NaiveDate;

use crate::client::{Filters, PostgrestClient};
use crate::error::{Result, StorageError};
use crate::models::WorkoutTrend;
use crate::repository::TrendStore;
use crate::services::trend_period::TrendPeriod;

const RESOURCE: &str = "workout_trends";

pub struct TrendRepository<'a> {
    client: &'a PostgrestClient,
}

impl<'a> TrendRepository<'a> {
    pub fn new(client: &'a PostgrestClient) -> Self {
        Self { client }
    }

    fn key_filters(athlete_id: i64, period_type: TrendPeriod, period_start: NaiveDate) -> Filters {
        Filters::new()
            .eq("athlete_id", athlete_id)
            .eq("period_type", period_type)
            .eq("period_start", period_start)
    }

    /// Trends for an athlete, oldest period first. `period_type` narrows to
    /// one kind of bucket.
    pub async fn list_for_athlete(
        &self,
        athlete_id: i64,
        period_type: Option<TrendPeriod>,
    ) -> Result<Vec<WorkoutTrend>> {
        let mut filters = Filters::new().eq("athlete_id", athlete_id);
        if let Some(period_type) = period_type {
            filters = filters.eq("period_type", period_type);
        }
        filters = filters.order("period_start", true);

        self.client.select(RESOURCE, &filters).await
    }
}

#[async_trait]
impl<'a> TrendStore for TrendRepository<'a> {
    async fn find_trend(
        &self,
        athlete_id: i64,
        period_type: TrendPeriod,
        period_start: NaiveDate,
    ) -> Result<Option<WorkoutTrend>> {
        self.client
            .select_one(
                RESOURCE,
                &Self::key_filters(athlete_id, period_type, period_start),
            )
            .await
    }

    async fn insert_trend(&self, row: &WorkoutTrend) -> Result<WorkoutTrend> {
        let rows: Vec<WorkoutTrend> = self.client.insert(RESOURCE, row).await?;
        rows.into_iter().next().ok_or_else(|| {
            StorageError::NotFound(format!(
                "{} row for athlete {} / {} {} missing after insert",
                RESOURCE, row.athlete_id, row.period_type, row.period_start
            ))
        })
    }

    async fn replace_trend(
        &self,
        current: &WorkoutTrend,
        next: &WorkoutTrend,
    ) -> Result<Option<WorkoutTrend>> {
        let filters =
            Self::key_filters(current.athlete_id, current.period_type, current.period_start)
                .eq("total_workouts", current.total_workouts);
        let rows: Vec<WorkoutTrend> = self.client.update(RESOURCE, &filters, next).await?;
        Ok(rows.into_iter().next())
    }
}
