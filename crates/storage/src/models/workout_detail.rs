use serde::{Deserialize, Serialize};

/// Sets, reps and weights performed for one exercise within one session.
/// `reps` and `weight` hold one entry per set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutDetail {
    pub id: i64,
    pub workout_session_id: i64,
    pub exercise_id: i64,
    pub sets: i32,
    pub reps: Vec<i64>,
    pub weight: Vec<i64>,
    #[serde(default)]
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewWorkoutDetail {
    pub workout_session_id: i64,
    pub exercise_id: i64,
    pub sets: i32,
    pub reps: Vec<i64>,
    pub weight: Vec<i64>,
    pub instructions: String,
}
