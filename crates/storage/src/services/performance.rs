use tracing::{info, warn};

use crate::error::{Result, StorageError};
use crate::models::ExercisePerformance;
use crate::repository::PerformanceStore;
use crate::services::aggregation::{ExerciseSummary, first_performance, next_performance};

/// Attempts per update before giving up on a contended row.
pub const MAX_WRITE_ATTEMPTS: usize = 3;

/// Folds one session's statistics into the athlete's running performance
/// for an exercise, creating the row on first use.
///
/// The read-modify-write is guarded by `total_sessions`: if another writer
/// changes the row between the read and the write, the update is
/// recomputed from the fresh row.
pub async fn update_exercise_performance<S>(
    store: &S,
    athlete_id: i64,
    exercise_id: i64,
    summary: &ExerciseSummary,
) -> Result<ExercisePerformance>
where
    S: PerformanceStore + ?Sized,
{
    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let existing = store
            .find_performance(athlete_id, exercise_id)
            .await
            .map_err(|e| StorageError::lookup("exercise_performance", e))?;

        let written = match existing {
            None => {
                let row = first_performance(athlete_id, exercise_id, summary);
                match store.insert_performance(&row).await {
                    Ok(row) => Some(row),
                    Err(e) if e.is_unique_violation() => None,
                    Err(e) => return Err(e),
                }
            }
            Some(current) => {
                let next = next_performance(&current, summary)?;
                store.replace_performance(&current, &next).await?
            }
        };

        if let Some(row) = written {
            info!(
                "Exercise performance updated: athlete {} exercise {} ({} sessions, best {}x{})",
                athlete_id,
                exercise_id,
                row.total_sessions,
                row.personal_best_reps,
                row.personal_best_weight
            );
            return Ok(row);
        }

        warn!(
            "Concurrent write on exercise_performance for athlete {} exercise {} (attempt {}/{})",
            athlete_id, exercise_id, attempt, MAX_WRITE_ATTEMPTS
        );
    }

    Err(StorageError::Conflict(format!(
        "exercise_performance for athlete {} exercise {} kept changing after {} attempts",
        athlete_id, exercise_id, MAX_WRITE_ATTEMPTS
    )))
}
