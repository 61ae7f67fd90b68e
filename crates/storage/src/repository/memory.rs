//! In-process store used by the service tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Method, StatusCode};

use crate::error::{Result, StorageError};
use crate::models::{
    CompletionFlag, ExercisePerformance, NewWorkoutDetail, WorkoutDetail, WorkoutSession,
    WorkoutTrend,
};
use crate::repository::{PerformanceStore, SessionStore, TrendStore};
use crate::services::trend_period::TrendPeriod;

type TrendKey = (i64, TrendPeriod, NaiveDate);

#[derive(Default)]
struct State {
    performance: HashMap<(i64, i64), ExercisePerformance>,
    trends: HashMap<TrendKey, WorkoutTrend>,
    sessions: Vec<WorkoutSession>,
    details: Vec<WorkoutDetail>,
    next_id: i64,
    fail_performance_for: Option<i64>,
    fail_trend_writes: bool,
    fail_mark_completed: bool,
    lost_races: usize,
    insert_races: usize,
}

#[derive(Default)]
pub(crate) struct InMemoryStore {
    state: Mutex<State>,
}

fn unavailable(method: Method, resource: &str) -> StorageError {
    StorageError::Http {
        status: StatusCode::SERVICE_UNAVAILABLE,
        method,
        resource: resource.to_string(),
        body: "injected failure".to_string(),
    }
}

fn unique_violation(resource: &str) -> StorageError {
    StorageError::Http {
        status: StatusCode::CONFLICT,
        method: Method::POST,
        resource: resource.to_string(),
        body: r#"{"code":"23505"}"#.to_string(),
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn fail_performance_writes_for(&self, exercise_id: i64) {
        self.state().fail_performance_for = Some(exercise_id);
    }

    pub fn fail_trend_writes(&self, fail: bool) {
        self.state().fail_trend_writes = fail;
    }

    pub fn fail_mark_completed(&self, fail: bool) {
        self.state().fail_mark_completed = fail;
    }

    pub fn clear_failures(&self) {
        let mut state = self.state();
        state.fail_performance_for = None;
        state.fail_trend_writes = false;
        state.fail_mark_completed = false;
    }

    /// The next `count` conditional updates find that a competing writer
    /// already bumped the row.
    pub fn simulate_lost_races(&self, count: usize) {
        self.state().lost_races = count;
    }

    /// The next `count` inserts find that a competing writer created the
    /// row first.
    pub fn simulate_insert_races(&self, count: usize) {
        self.state().insert_races = count;
    }

    pub fn performance(&self, athlete_id: i64, exercise_id: i64) -> Option<ExercisePerformance> {
        self.state()
            .performance
            .get(&(athlete_id, exercise_id))
            .cloned()
    }

    pub fn trend(
        &self,
        athlete_id: i64,
        period_type: TrendPeriod,
        period_start: NaiveDate,
    ) -> Option<WorkoutTrend> {
        self.state()
            .trends
            .get(&(athlete_id, period_type, period_start))
            .cloned()
    }

    pub fn trend_count(&self) -> usize {
        self.state().trends.len()
    }

    pub fn details_for(&self, session_id: i64) -> Vec<WorkoutDetail> {
        self.state()
            .details
            .iter()
            .filter(|d| d.workout_session_id == session_id)
            .cloned()
            .collect()
    }

    pub fn seed_session(&self, athlete_id: i64, date: NaiveDate, completed: CompletionFlag) -> i64 {
        let mut state = self.state();
        state.next_id += 1;
        let id = state.next_id;
        state.sessions.push(WorkoutSession {
            id,
            athlete_id,
            date,
            completed,
        });
        id
    }
}

#[async_trait]
impl PerformanceStore for InMemoryStore {
    async fn find_performance(
        &self,
        athlete_id: i64,
        exercise_id: i64,
    ) -> Result<Option<ExercisePerformance>> {
        Ok(self.performance(athlete_id, exercise_id))
    }

    async fn insert_performance(&self, row: &ExercisePerformance) -> Result<ExercisePerformance> {
        let mut state = self.state();
        if state.fail_performance_for == Some(row.exercise_id) {
            return Err(unavailable(Method::POST, "exercise_performance"));
        }
        let key = (row.athlete_id, row.exercise_id);
        if state.insert_races > 0 {
            state.insert_races -= 1;
            let mut competitor = row.clone();
            competitor.total_sessions = 1;
            state.performance.insert(key, competitor);
            return Err(unique_violation("exercise_performance"));
        }
        if state.performance.contains_key(&key) {
            return Err(unique_violation("exercise_performance"));
        }
        state.performance.insert(key, row.clone());
        Ok(row.clone())
    }

    async fn replace_performance(
        &self,
        current: &ExercisePerformance,
        next: &ExercisePerformance,
    ) -> Result<Option<ExercisePerformance>> {
        let mut state = self.state();
        if state.fail_performance_for == Some(current.exercise_id) {
            return Err(unavailable(Method::PATCH, "exercise_performance"));
        }
        let lost = state.lost_races > 0;
        if lost {
            state.lost_races -= 1;
        }
        let Some(stored) = state
            .performance
            .get_mut(&(current.athlete_id, current.exercise_id))
        else {
            return Ok(None);
        };
        if lost {
            stored.total_sessions += 1;
            return Ok(None);
        }
        if stored.total_sessions != current.total_sessions {
            return Ok(None);
        }
        *stored = next.clone();
        Ok(Some(next.clone()))
    }
}

#[async_trait]
impl TrendStore for InMemoryStore {
    async fn find_trend(
        &self,
        athlete_id: i64,
        period_type: TrendPeriod,
        period_start: NaiveDate,
    ) -> Result<Option<WorkoutTrend>> {
        Ok(self.trend(athlete_id, period_type, period_start))
    }

    async fn insert_trend(&self, row: &WorkoutTrend) -> Result<WorkoutTrend> {
        let mut state = self.state();
        if state.fail_trend_writes {
            return Err(unavailable(Method::POST, "workout_trends"));
        }
        let key = (row.athlete_id, row.period_type, row.period_start);
        if state.trends.contains_key(&key) {
            return Err(unique_violation("workout_trends"));
        }
        state.trends.insert(key, row.clone());
        Ok(row.clone())
    }

    async fn replace_trend(
        &self,
        current: &WorkoutTrend,
        next: &WorkoutTrend,
    ) -> Result<Option<WorkoutTrend>> {
        let mut state = self.state();
        if state.fail_trend_writes {
            return Err(unavailable(Method::PATCH, "workout_trends"));
        }
        let key = (current.athlete_id, current.period_type, current.period_start);
        match state.trends.get_mut(&key) {
            Some(stored) if stored.total_workouts == current.total_workouts => {
                *stored = next.clone();
                Ok(Some(next.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn find_session(
        &self,
        athlete_id: i64,
        date: NaiveDate,
    ) -> Result<Option<WorkoutSession>> {
        Ok(self
            .state()
            .sessions
            .iter()
            .find(|s| s.athlete_id == athlete_id && s.date == date)
            .cloned())
    }

    async fn create_session(
        &self,
        athlete_id: i64,
        date: NaiveDate,
        completed: CompletionFlag,
    ) -> Result<WorkoutSession> {
        let id = self.seed_session(athlete_id, date, completed);
        Ok(WorkoutSession {
            id,
            athlete_id,
            date,
            completed,
        })
    }

    async fn replace_details(
        &self,
        session_id: i64,
        details: &[NewWorkoutDetail],
    ) -> Result<Vec<WorkoutDetail>> {
        let mut state = self.state();
        state.details.retain(|d| d.workout_session_id != session_id);

        let mut saved = Vec::with_capacity(details.len());
        for detail in details {
            state.next_id += 1;
            let row = WorkoutDetail {
                id: state.next_id,
                workout_session_id: detail.workout_session_id,
                exercise_id: detail.exercise_id,
                sets: detail.sets,
                reps: detail.reps.clone(),
                weight: detail.weight.clone(),
                instructions: detail.instructions.clone(),
            };
            state.details.push(row.clone());
            saved.push(row);
        }
        Ok(saved)
    }

    async fn mark_completed(&self, session_id: i64) -> Result<WorkoutSession> {
        let mut state = self.state();
        if state.fail_mark_completed {
            return Err(unavailable(Method::PATCH, "workout_sessions"));
        }
        let session = state
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| StorageError::NotFound(format!("session {}", session_id)))?;
        if session.completed.is_completed() {
            return Err(StorageError::AlreadyCompleted(session_id));
        }
        session.completed = CompletionFlag::Completed;
        Ok(session.clone())
    }
}
