use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stored by the backend as a single-character `completed` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompletionFlag {
    #[serde(rename = "Y")]
    Completed,
    #[default]
    #[serde(rename = "N")]
    Planned,
}

impl CompletionFlag {
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: i64,
    pub athlete_id: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub completed: CompletionFlag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewWorkoutSession {
    pub athlete_id: i64,
    pub date: NaiveDate,
    pub completed: CompletionFlag,
}
