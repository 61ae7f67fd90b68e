//! Completing a workout session: per-exercise performance updates, trend
//! updates, detail rows, then the session's completed flag.
//!
//! There is no transaction spanning these writes. Instead every committed
//! step is recorded in a [`CompletionProgress`] journal; when a step fails
//! after earlier ones committed, the journal travels inside
//! [`StorageError::PartialWrite`] and can be handed back to
//! [`SessionCompletion::resume`], which performs only the remaining steps.
//!
//! The completed flag is the last write. A session that is already
//! completed is rejected with [`StorageError::AlreadyCompleted`] before
//! anything is aggregated, so a repeated completion does not double count.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::client::PostgrestClient;
use crate::dto::session::{CompleteSessionRequest, ParsedSets};
use crate::error::{Result, StorageError};
use crate::models::{
    CompletionFlag, ExercisePerformance, NewWorkoutDetail, WorkoutDetail, WorkoutSession,
    WorkoutTrend,
};
use crate::repository::{
    PerformanceRepository, PerformanceStore, SessionRepository, SessionStore, TrendRepository,
    TrendStore,
};
use crate::services::aggregation::{ExerciseSummary, SessionTotals};
use crate::services::performance::update_exercise_performance;
use crate::services::trend::update_workout_trend;
use crate::services::trend_period::TrendPeriod;

/// Journal of the steps of one completion that have been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionProgress {
    pub athlete_id: i64,
    pub date: NaiveDate,
    pub session_id: Option<i64>,
    /// The session row was inserted by this completion rather than found.
    pub session_created: bool,
    /// Indexes into the request's exercises.
    pub performance_updated: BTreeSet<usize>,
    pub trends_updated: BTreeSet<TrendPeriod>,
    pub details_saved: bool,
    pub completed: bool,
}

impl CompletionProgress {
    pub fn new(request: &CompleteSessionRequest) -> Self {
        Self {
            athlete_id: request.athlete_id,
            date: request.date,
            session_id: None,
            session_created: false,
            performance_updated: BTreeSet::new(),
            trends_updated: BTreeSet::new(),
            details_saved: false,
            completed: false,
        }
    }

    pub fn committed_steps(&self) -> usize {
        usize::from(self.session_created)
            + self.performance_updated.len()
            + self.trends_updated.len()
            + usize::from(self.details_saved)
            + usize::from(self.completed)
    }

    fn check_matches(&self, request: &CompleteSessionRequest) -> Result<()> {
        if self.athlete_id != request.athlete_id || self.date != request.date {
            return Err(StorageError::Validation(format!(
                "Progress for athlete {} on {} cannot resume a completion for athlete {} on {}",
                self.athlete_id, self.date, request.athlete_id, request.date
            )));
        }
        if let Some(index) = self
            .performance_updated
            .iter()
            .find(|&&index| index >= request.exercises.len())
        {
            return Err(StorageError::Validation(format!(
                "Progress records exercise #{} but the request has {} exercise(s)",
                index + 1,
                request.exercises.len()
            )));
        }
        Ok(())
    }
}

/// Rows written by one completion run. On a resumed run, `performances`
/// and `trends` only hold the rows written by that run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionOutcome {
    pub session: WorkoutSession,
    pub details: Vec<WorkoutDetail>,
    pub performances: Vec<ExercisePerformance>,
    pub trends: Vec<WorkoutTrend>,
    pub totals: SessionTotals,
}

pub struct SessionCompletion<'a> {
    sessions: &'a dyn SessionStore,
    performance: &'a dyn PerformanceStore,
    trends: &'a dyn TrendStore,
    periods: Vec<TrendPeriod>,
}

impl<'a> SessionCompletion<'a> {
    pub fn new(
        sessions: &'a dyn SessionStore,
        performance: &'a dyn PerformanceStore,
        trends: &'a dyn TrendStore,
    ) -> Self {
        Self {
            sessions,
            performance,
            trends,
            periods: TrendPeriod::all().to_vec(),
        }
    }

    /// Restricts the trend periods that get updated.
    pub fn with_periods(mut self, periods: &[TrendPeriod]) -> Self {
        self.periods = periods.to_vec();
        self.periods.sort();
        self.periods.dedup();
        self
    }

    pub async fn complete(
        &self,
        request: &CompleteSessionRequest,
        now: DateTime<Utc>,
    ) -> Result<CompletionOutcome> {
        self.resume(request, CompletionProgress::new(request), now)
            .await
    }

    /// Continues a completion that failed part way, skipping every step
    /// recorded in `progress`.
    pub async fn resume(
        &self,
        request: &CompleteSessionRequest,
        mut progress: CompletionProgress,
        now: DateTime<Utc>,
    ) -> Result<CompletionOutcome> {
        match self.run(request, &mut progress, now).await {
            Ok(outcome) => Ok(outcome),
            Err(e @ StorageError::AlreadyCompleted(_)) => Err(e),
            Err(e) if progress.committed_steps() > 0 => {
                warn!(
                    "Completion of session for athlete {} on {} stopped after {} committed step(s): {}",
                    progress.athlete_id,
                    progress.date,
                    progress.committed_steps(),
                    e
                );
                Err(StorageError::PartialWrite {
                    progress: Box::new(progress),
                    source: Box::new(e),
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn run(
        &self,
        request: &CompleteSessionRequest,
        progress: &mut CompletionProgress,
        now: DateTime<Utc>,
    ) -> Result<CompletionOutcome> {
        request.validate()?;
        progress.check_matches(request)?;

        // Everything is parsed before the first write
        let parsed: Vec<ParsedSets> = request
            .exercises
            .iter()
            .map(|exercise| exercise.parse())
            .collect::<Result<_>>()?;
        let summaries: Vec<ExerciseSummary> = parsed
            .iter()
            .map(ParsedSets::summary)
            .collect::<Result<_>>()?;
        let totals = SessionTotals::from_summaries(&summaries)?;

        let session = self.open_session(request, progress).await?;
        info!(
            "Completing session {} for athlete {} on {} ({} exercise(s))",
            session.id,
            request.athlete_id,
            request.date,
            request.exercises.len()
        );

        let mut performances = Vec::new();
        for (index, (exercise, summary)) in request.exercises.iter().zip(&summaries).enumerate() {
            if progress.performance_updated.contains(&index) {
                continue;
            }
            let row = update_exercise_performance(
                self.performance,
                request.athlete_id,
                exercise.exercise_id,
                summary,
            )
            .await?;
            progress.performance_updated.insert(index);
            performances.push(row);
        }

        let mut trends = Vec::new();
        for &period in &self.periods {
            if progress.trends_updated.contains(&period) {
                continue;
            }
            let row = update_workout_trend(
                self.trends,
                request.athlete_id,
                period,
                request.date,
                &totals,
                now,
            )
            .await?;
            progress.trends_updated.insert(period);
            trends.push(row);
        }

        let new_details: Vec<NewWorkoutDetail> = parsed
            .into_iter()
            .zip(&request.exercises)
            .map(|(sets, exercise)| {
                sets.into_detail(session.id, exercise.exercise_id, &exercise.instructions)
            })
            .collect();
        let details = self.sessions.replace_details(session.id, &new_details).await?;
        progress.details_saved = true;

        let session = self.sessions.mark_completed(session.id).await?;
        progress.completed = true;

        info!(
            "Session {} completed: {} total weight, {} total reps",
            session.id, totals.total_weight, totals.total_reps
        );

        Ok(CompletionOutcome {
            session,
            details,
            performances,
            trends,
            totals,
        })
    }

    /// Finds the planned session for the request's date, or creates one.
    async fn open_session(
        &self,
        request: &CompleteSessionRequest,
        progress: &mut CompletionProgress,
    ) -> Result<WorkoutSession> {
        let existing = self
            .sessions
            .find_session(request.athlete_id, request.date)
            .await
            .map_err(|e| StorageError::lookup("workout_sessions", e))?;

        match (existing, progress.session_id) {
            (Some(session), _) if session.completed.is_completed() => {
                Err(StorageError::AlreadyCompleted(session.id))
            }
            (Some(session), Some(expected)) if session.id != expected => {
                Err(StorageError::Conflict(format!(
                    "session for athlete {} on {} is now {}, progress recorded {}",
                    request.athlete_id, request.date, session.id, expected
                )))
            }
            (Some(session), _) => {
                progress.session_id = Some(session.id);
                Ok(session)
            }
            (None, Some(expected)) => Err(StorageError::NotFound(format!(
                "session {} for athlete {} on {}",
                expected, request.athlete_id, request.date
            ))),
            (None, None) => {
                let session = self
                    .sessions
                    .create_session(request.athlete_id, request.date, CompletionFlag::Planned)
                    .await?;
                progress.session_id = Some(session.id);
                progress.session_created = true;
                Ok(session)
            }
        }
    }
}

/// Completes a session against the PostgREST backend.
pub async fn complete_session(
    client: &PostgrestClient,
    request: &CompleteSessionRequest,
    now: DateTime<Utc>,
) -> Result<CompletionOutcome> {
    let sessions = SessionRepository::new(client);
    let performance = PerformanceRepository::new(client);
    let trends = TrendRepository::new(client);

    SessionCompletion::new(&sessions, &performance, &trends)
        .complete(request, now)
        .await
}

pub async fn resume_session(
    client: &PostgrestClient,
    request: &CompleteSessionRequest,
    progress: CompletionProgress,
    now: DateTime<Utc>,
) -> Result<CompletionOutcome> {
    let sessions = SessionRepository::new(client);
    let performance = PerformanceRepository::new(client);
    let trends = TrendRepository::new(client);

    SessionCompletion::new(&sessions, &performance, &trends)
        .resume(request, progress, now)
        .await
}
