use tracing::info;
use validator::Validate;

use crate::client::PostgrestClient;
use crate::dto::session::{ParsedSets, PlanSessionRequest, SessionDetails};
use crate::error::{Result, StorageError};
use crate::models::{CompletionFlag, Exercise, NewWorkoutDetail};
use crate::repository::{ExerciseRepository, SessionRepository, SessionStore};

/// Schedules a session: one detail row per exercise, completed flag unset.
///
/// All input is parsed and every exercise name resolved before the session
/// row is created.
pub async fn plan_session(
    client: &PostgrestClient,
    request: &PlanSessionRequest,
) -> Result<SessionDetails> {
    request.validate()?;
    let parsed: Vec<ParsedSets> = request
        .exercises
        .iter()
        .map(|exercise| exercise.parse())
        .collect::<Result<_>>()?;

    let sessions = SessionRepository::new(client);
    if let Some(existing) = sessions.find_session(request.athlete_id, request.date).await? {
        return Err(StorageError::Conflict(format!(
            "athlete {} already has session {} on {}",
            request.athlete_id, existing.id, request.date
        )));
    }

    let catalogue = ExerciseRepository::new(client);
    let mut exercises: Vec<Exercise> = Vec::with_capacity(request.exercises.len());
    for planned in &request.exercises {
        exercises.push(catalogue.find_by_name(&planned.name).await?);
    }

    let session = sessions
        .create_session(request.athlete_id, request.date, CompletionFlag::Planned)
        .await?;

    let details: Vec<NewWorkoutDetail> = parsed
        .into_iter()
        .zip(request.exercises.iter().zip(&exercises))
        .map(|(sets, (planned, exercise))| {
            sets.into_detail(session.id, exercise.id, &planned.instructions)
        })
        .collect();
    sessions.insert_details(&details).await?;

    info!(
        "Planned session {} for athlete {} on {} with {} exercise(s)",
        session.id,
        request.athlete_id,
        request.date,
        details.len()
    );

    sessions
        .find_details(request.athlete_id, request.date)
        .await?
        .ok_or_else(|| {
            StorageError::NotFound(format!(
                "session for athlete {} on {} after planning",
                request.athlete_id, request.date
            ))
        })
}
