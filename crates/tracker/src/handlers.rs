use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use storage::dto::{
    CompleteSessionRequest, CreateAthleteRequest, ExerciseInput, PlanSessionRequest,
    PlannedExerciseInput, UpdateAthleteRequest, UpdateUserRequest,
};
use storage::repository::{
    ExerciseRepository, PerformanceRepository, PerformanceStore, SessionRepository,
    TrendRepository,
};
use storage::services::{
    CompletionProgress, TrendPeriod, complete_session, plan_session, register_athlete,
    resume_session, update_profile,
};
use storage::{PostgrestClient, StorageError};

use crate::exercise_arg::ExerciseArg;

/// What an interrupted completion leaves on disk for `complete --resume`.
#[derive(Debug, Serialize, Deserialize)]
struct CompletionJournal {
    request: CompleteSessionRequest,
    progress: CompletionProgress,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn signup(
    client: &PostgrestClient,
    name: String,
    email: String,
    age: Option<i32>,
    fitness_goals: Option<String>,
    medical_conditions: Option<String>,
) -> Result<()> {
    let request = CreateAthleteRequest {
        name,
        email,
        age,
        fitness_goals,
        medical_conditions,
    };
    let (user, athlete) = register_athlete(client, &request)
        .await
        .context("Sign-up failed")?;

    print_json(&serde_json::json!({ "user": user, "athlete": athlete }))
}

pub async fn profile(
    client: &PostgrestClient,
    user_id: i64,
    name: Option<String>,
    email: Option<String>,
    age: Option<i32>,
    fitness_goals: Option<String>,
    medical_conditions: Option<String>,
) -> Result<()> {
    let user = UpdateUserRequest { name, email };
    let athlete = UpdateAthleteRequest {
        age,
        fitness_goals,
        medical_conditions,
    };

    let profile = update_profile(client, user_id, &user, &athlete)
        .await
        .with_context(|| format!("Failed to load profile for user {}", user_id))?;
    print_json(&profile)
}

pub async fn list_exercises(client: &PostgrestClient) -> Result<()> {
    let exercises = ExerciseRepository::new(client)
        .list()
        .await
        .context("Failed to list exercises")?;
    print_json(&exercises)
}

pub async fn add_exercise(client: &PostgrestClient, name: &str) -> Result<()> {
    let exercise = ExerciseRepository::new(client)
        .create(name)
        .await
        .with_context(|| format!("Failed to add exercise '{}'", name))?;
    print_json(&exercise)
}

pub async fn plan(
    client: &PostgrestClient,
    athlete_id: i64,
    date: NaiveDate,
    exercises: Vec<ExerciseArg>,
) -> Result<()> {
    let request = PlanSessionRequest {
        athlete_id,
        date,
        exercises: exercises
            .into_iter()
            .map(|arg| PlannedExerciseInput {
                sets: arg.sets(),
                name: arg.exercise,
                reps: arg.reps,
                weight: arg.weight,
                instructions: arg.instructions,
            })
            .collect(),
    };

    let details = plan_session(client, &request)
        .await
        .context("Failed to plan session")?;
    print_json(&details)
}

pub async fn show(client: &PostgrestClient, athlete_id: i64, date: NaiveDate) -> Result<()> {
    let details = SessionRepository::new(client)
        .find_details(athlete_id, date)
        .await
        .context("Failed to load session")?
        .ok_or_else(|| anyhow!("No session for athlete {} on {}", athlete_id, date))?;
    print_json(&details)
}

/// Builds the completion request from the given sets, or from the planned
/// session when none are given.
async fn completion_request(
    client: &PostgrestClient,
    athlete_id: i64,
    date: NaiveDate,
    exercises: Vec<ExerciseArg>,
) -> Result<CompleteSessionRequest> {
    if exercises.is_empty() {
        let planned = SessionRepository::new(client)
            .find_details(athlete_id, date)
            .await
            .context("Failed to load planned session")?
            .ok_or_else(|| {
                anyhow!(
                    "No session planned for athlete {} on {}; pass --exercise",
                    athlete_id,
                    date
                )
            })?;
        return Ok(planned.to_completion_request());
    }

    let catalogue = ExerciseRepository::new(client);
    let mut inputs = Vec::with_capacity(exercises.len());
    for arg in exercises {
        let exercise_id = match arg.exercise_id() {
            Some(id) => id,
            None => {
                catalogue
                    .find_by_name(&arg.exercise)
                    .await
                    .with_context(|| format!("Unknown exercise '{}'", arg.exercise))?
                    .id
            }
        };
        inputs.push(ExerciseInput {
            exercise_id,
            sets: arg.sets(),
            reps: arg.reps,
            weight: arg.weight,
            instructions: arg.instructions,
        });
    }

    Ok(CompleteSessionRequest {
        athlete_id,
        date,
        exercises: inputs,
    })
}

pub async fn complete(
    client: &PostgrestClient,
    athlete_id: i64,
    date: NaiveDate,
    exercises: Vec<ExerciseArg>,
    journal: &Path,
) -> Result<()> {
    let request = completion_request(client, athlete_id, date, exercises).await?;

    match complete_session(client, &request, Utc::now()).await {
        Ok(outcome) => print_json(&outcome),
        Err(StorageError::PartialWrite { progress, source }) => {
            let steps = progress.committed_steps();
            write_journal(journal, request, *progress)?;
            Err(anyhow!(
                "Completion stopped after {} committed step(s): {}. Resume with: tracker complete --resume {}",
                steps,
                source,
                journal.display()
            ))
        }
        Err(e) => Err(e).context("Failed to complete session"),
    }
}

pub async fn resume(client: &PostgrestClient, path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read journal {}", path.display()))?;
    let journal: CompletionJournal = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid journal {}", path.display()))?;

    match resume_session(client, &journal.request, journal.progress, Utc::now()).await {
        Ok(outcome) => {
            std::fs::remove_file(path).ok();
            print_json(&outcome)
        }
        Err(StorageError::PartialWrite { progress, source }) => {
            let steps = progress.committed_steps();
            write_journal(path, journal.request, *progress)?;
            Err(anyhow!(
                "Completion stopped again after {} committed step(s): {}. Journal updated at {}",
                steps,
                source,
                path.display()
            ))
        }
        Err(e) => Err(e).context("Failed to resume session completion"),
    }
}

fn write_journal(
    path: &Path,
    request: CompleteSessionRequest,
    progress: CompletionProgress,
) -> Result<()> {
    let journal = CompletionJournal { request, progress };
    std::fs::write(path, serde_json::to_string_pretty(&journal)?)
        .with_context(|| format!("Cannot write journal {}", path.display()))?;
    tracing::warn!("Completion journal written to {}", path.display());
    Ok(())
}

pub async fn delete(client: &PostgrestClient, athlete_id: i64, date: NaiveDate) -> Result<()> {
    SessionRepository::new(client)
        .delete(athlete_id, date)
        .await
        .with_context(|| {
            format!(
                "Failed to delete session for athlete {} on {}",
                athlete_id, date
            )
        })?;
    tracing::info!("Deleted session for athlete {} on {}", athlete_id, date);
    Ok(())
}

pub async fn performance(
    client: &PostgrestClient,
    athlete_id: i64,
    exercise_id: Option<i64>,
) -> Result<()> {
    let repo = PerformanceRepository::new(client);
    match exercise_id {
        Some(exercise_id) => {
            let row = repo
                .find_performance(athlete_id, exercise_id)
                .await
                .context("Failed to load exercise performance")?
                .ok_or_else(|| {
                    anyhow!(
                        "No performance recorded for athlete {} on exercise {}",
                        athlete_id,
                        exercise_id
                    )
                })?;
            print_json(&row)
        }
        None => {
            let rows = repo
                .list_for_athlete(athlete_id)
                .await
                .context("Failed to load exercise performance")?;
            print_json(&rows)
        }
    }
}

pub async fn trends(
    client: &PostgrestClient,
    athlete_id: i64,
    period: Option<TrendPeriod>,
) -> Result<()> {
    let rows = TrendRepository::new(client)
        .list_for_athlete(athlete_id, period)
        .await
        .context("Failed to load workout trends")?;
    print_json(&rows)
}
