use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use crate::error::{Result, StorageError};
use crate::models::WorkoutTrend;
use crate::repository::TrendStore;
use crate::services::aggregation::{SessionTotals, first_trend, next_trend};
use crate::services::performance::MAX_WRITE_ATTEMPTS;
use crate::services::trend_period::TrendPeriod;

/// Adds one session to the athlete's trend bucket containing `session_date`.
/// Same optimistic scheme as the performance updater, versioned on
/// `total_workouts`.
pub async fn update_workout_trend<S>(
    store: &S,
    athlete_id: i64,
    period_type: TrendPeriod,
    session_date: NaiveDate,
    totals: &SessionTotals,
    now: DateTime<Utc>,
) -> Result<WorkoutTrend>
where
    S: TrendStore + ?Sized,
{
    let period_start = period_type.bucket_start(session_date);

    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let existing = store
            .find_trend(athlete_id, period_type, period_start)
            .await
            .map_err(|e| StorageError::lookup("workout_trends", e))?;

        let written = match existing {
            None => {
                let row = first_trend(athlete_id, period_type, period_start, totals, now);
                match store.insert_trend(&row).await {
                    Ok(row) => Some(row),
                    Err(e) if e.is_unique_violation() => None,
                    Err(e) => return Err(e),
                }
            }
            Some(current) => {
                let next = next_trend(&current, totals, now)?;
                store.replace_trend(&current, &next).await?
            }
        };

        if let Some(row) = written {
            info!(
                "Workout trend updated: athlete {} {} from {} ({} workouts, {} total weight)",
                athlete_id, period_type, period_start, row.total_workouts, row.total_weight
            );
            return Ok(row);
        }

        warn!(
            "Concurrent write on workout_trends for athlete {} {} {} (attempt {}/{})",
            athlete_id, period_type, period_start, attempt, MAX_WRITE_ATTEMPTS
        );
    }

    Err(StorageError::Conflict(format!(
        "workout_trends for athlete {} {} {} kept changing after {} attempts",
        athlete_id, period_type, period_start, MAX_WRITE_ATTEMPTS
    )))
}
