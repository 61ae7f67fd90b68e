use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Result, StorageError};
use crate::models::{NewWorkoutDetail, WorkoutSession};
use crate::services::aggregation::ExerciseSummary;

/// An exercise as performed, identified by id. Reps and weights are raw
/// user input, one entry per set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ExerciseInput {
    pub exercise_id: i64,
    #[validate(range(min = 1, message = "An exercise needs at least one set"))]
    pub sets: i32,
    pub reps: Vec<String>,
    pub weight: Vec<String>,
    #[serde(default)]
    pub instructions: String,
}

/// An exercise being planned, identified by catalogue name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PlannedExerciseInput {
    #[validate(length(min = 1, message = "Please select an exercise"))]
    pub name: String,
    #[validate(range(min = 1, message = "An exercise needs at least one set"))]
    pub sets: i32,
    pub reps: Vec<String>,
    pub weight: Vec<String>,
    #[serde(default)]
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CompleteSessionRequest {
    pub athlete_id: i64,
    pub date: NaiveDate,
    #[validate(
        length(min = 1, message = "A session needs at least one exercise"),
        nested
    )]
    pub exercises: Vec<ExerciseInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PlanSessionRequest {
    pub athlete_id: i64,
    pub date: NaiveDate,
    #[validate(
        length(min = 1, message = "A session needs at least one exercise"),
        nested
    )]
    pub exercises: Vec<PlannedExerciseInput>,
}

/// Set data after numeric validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSets {
    pub sets: i32,
    pub reps: Vec<i64>,
    pub weight: Vec<i64>,
}

impl ParsedSets {
    pub fn summary(&self) -> Result<ExerciseSummary> {
        ExerciseSummary::from_sets(&self.reps, &self.weight)
    }

    pub fn into_detail(
        self,
        workout_session_id: i64,
        exercise_id: i64,
        instructions: &str,
    ) -> NewWorkoutDetail {
        NewWorkoutDetail {
            workout_session_id,
            exercise_id,
            sets: self.sets,
            reps: self.reps,
            weight: self.weight,
            instructions: instructions.to_string(),
        }
    }
}

/// Parses raw set input, rejecting anything that is not a whole number and
/// any mismatch between `sets` and the number of entries.
pub fn parse_sets(
    label: &str,
    sets: i32,
    reps: &[String],
    weight: &[String],
) -> Result<ParsedSets> {
    let expected = usize::try_from(sets).unwrap_or(0);
    if expected == 0 {
        return Err(StorageError::Validation(format!(
            "Exercise {}: needs at least one set",
            label
        )));
    }
    if reps.len() != expected || weight.len() != expected {
        return Err(StorageError::Validation(format!(
            "Exercise {}: expected {} set(s), got {} rep and {} weight entries",
            label,
            expected,
            reps.len(),
            weight.len()
        )));
    }

    let reps = parse_column(label, "reps", reps)?;
    let weight = parse_column(label, "weight", weight)?;

    Ok(ParsedSets { sets, reps, weight })
}

fn parse_column(label: &str, field: &str, values: &[String]) -> Result<Vec<i64>> {
    values
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            raw.trim().parse::<i64>().map_err(|_| {
                StorageError::Validation(format!(
                    "Exercise {}, set {}: {} '{}' is not a whole number",
                    label,
                    idx + 1,
                    field,
                    raw
                ))
            })
        })
        .collect()
}

impl ExerciseInput {
    pub fn parse(&self) -> Result<ParsedSets> {
        parse_sets(
            &self.exercise_id.to_string(),
            self.sets,
            &self.reps,
            &self.weight,
        )
    }
}

impl PlannedExerciseInput {
    pub fn parse(&self) -> Result<ParsedSets> {
        parse_sets(&self.name, self.sets, &self.reps, &self.weight)
    }
}

/// One exercise of a stored session, with its catalogue name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionExercise {
    pub exercise_id: i64,
    pub name: String,
    pub sets: i32,
    pub reps: Vec<i64>,
    pub weight: Vec<i64>,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDetails {
    pub session: WorkoutSession,
    pub exercises: Vec<SessionExercise>,
}

impl SessionDetails {
    /// Completion request that replays the planned sets as performed.
    pub fn to_completion_request(&self) -> CompleteSessionRequest {
        CompleteSessionRequest {
            athlete_id: self.session.athlete_id,
            date: self.session.date,
            exercises: self
                .exercises
                .iter()
                .map(|exercise| ExerciseInput {
                    exercise_id: exercise.exercise_id,
                    sets: exercise.sets,
                    reps: exercise.reps.iter().map(|r| r.to_string()).collect(),
                    weight: exercise.weight.iter().map(|w| w.to_string()).collect(),
                    instructions: exercise.instructions.clone(),
                })
                .collect(),
        }
    }
}
