use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;

use crate::client::{Filters, PostgrestClient};
use crate::dto::session::{SessionDetails, SessionExercise};
use crate::error::{Result, StorageError};
use crate::models::{
    CompletionFlag, NewWorkoutDetail, NewWorkoutSession, WorkoutDetail, WorkoutSession,
};
use crate::repository::{ExerciseRepository, SessionStore};

const SESSIONS: &str = "workout_sessions";
const DETAILS: &str = "workout_details";

pub struct SessionRepository<'a> {
    client: &'a PostgrestClient,
}

impl<'a> SessionRepository<'a> {
    pub fn new(client: &'a PostgrestClient) -> Self {
        Self { client }
    }

    pub async fn find_by_id(&self, session_id: i64) -> Result<Option<WorkoutSession>> {
        self.client
            .select_one(SESSIONS, &Filters::new().eq("id", session_id))
            .await
    }

    pub async fn list_details(&self, session_id: i64) -> Result<Vec<WorkoutDetail>> {
        let filters = Filters::new()
            .eq("workout_session_id", session_id)
            .order("id", true);
        self.client.select(DETAILS, &filters).await
    }

    pub async fn insert_details(&self, details: &[NewWorkoutDetail]) -> Result<Vec<WorkoutDetail>> {
        if details.is_empty() {
            return Ok(Vec::new());
        }
        self.client.insert(DETAILS, details).await
    }

    /// Session for (athlete, date) with its exercises, or `None` if nothing
    /// is scheduled that day.
    pub async fn find_details(
        &self,
        athlete_id: i64,
        date: NaiveDate,
    ) -> Result<Option<SessionDetails>> {
        let Some(session) = self.find_session(athlete_id, date).await? else {
            return Ok(None);
        };

        let details = self.list_details(session.id).await?;
        let exercise_ids: Vec<i64> = details.iter().map(|d| d.exercise_id).collect();
        let names: HashMap<i64, String> = ExerciseRepository::new(self.client)
            .find_by_ids(&exercise_ids)
            .await?
            .into_iter()
            .map(|e| (e.id, e.name))
            .collect();

        let exercises = details
            .into_iter()
            .map(|detail| SessionExercise {
                name: names
                    .get(&detail.exercise_id)
                    .cloned()
                    .unwrap_or_else(|| format!("exercise #{}", detail.exercise_id)),
                exercise_id: detail.exercise_id,
                sets: detail.sets,
                reps: detail.reps,
                weight: detail.weight,
                instructions: detail.instructions,
            })
            .collect();

        Ok(Some(SessionDetails { session, exercises }))
    }

    /// Deletes the session for (athlete, date) together with its details.
    pub async fn delete(&self, athlete_id: i64, date: NaiveDate) -> Result<()> {
        let session = self.find_session(athlete_id, date).await?.ok_or_else(|| {
            StorageError::NotFound(format!("session for athlete {} on {}", athlete_id, date))
        })?;

        self.client
            .delete(DETAILS, &Filters::new().eq("workout_session_id", session.id))
            .await?;
        self.client
            .delete(SESSIONS, &Filters::new().eq("id", session.id))
            .await
    }
}

#[async_trait]
impl<'a> SessionStore for SessionRepository<'a> {
    async fn find_session(
        &self,
        athlete_id: i64,
        date: NaiveDate,
    ) -> Result<Option<WorkoutSession>> {
        let filters = Filters::new()
            .eq("athlete_id", athlete_id)
            .eq("date", date)
            .order("id", false)
            .limit(1);
        self.client.select_one(SESSIONS, &filters).await
    }

    async fn create_session(
        &self,
        athlete_id: i64,
        date: NaiveDate,
        completed: CompletionFlag,
    ) -> Result<WorkoutSession> {
        let body = NewWorkoutSession {
            athlete_id,
            date,
            completed,
        };
        let rows: Vec<WorkoutSession> = self.client.insert(SESSIONS, &body).await?;
        rows.into_iter().next().ok_or_else(|| {
            StorageError::NotFound(format!(
                "session for athlete {} on {} after insert",
                athlete_id, date
            ))
        })
    }

    async fn replace_details(
        &self,
        session_id: i64,
        details: &[NewWorkoutDetail],
    ) -> Result<Vec<WorkoutDetail>> {
        self.client
            .delete(DETAILS, &Filters::new().eq("workout_session_id", session_id))
            .await?;
        self.insert_details(details).await
    }

    async fn mark_completed(&self, session_id: i64) -> Result<WorkoutSession> {
        let filters = Filters::new()
            .eq("id", session_id)
            .eq("completed", "N");
        let rows: Vec<WorkoutSession> = self
            .client
            .update(SESSIONS, &filters, &json!({ "completed": CompletionFlag::Completed }))
            .await?;

        if let Some(session) = rows.into_iter().next() {
            return Ok(session);
        }

        match self.find_by_id(session_id).await? {
            Some(session) if session.completed.is_completed() => {
                Err(StorageError::AlreadyCompleted(session_id))
            }
            _ => Err(StorageError::NotFound(format!("session {}", session_id))),
        }
    }
}
