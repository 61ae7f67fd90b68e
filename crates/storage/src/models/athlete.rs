use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Athlete {
    pub id: i64,
    pub user_id: i64,
    pub age: Option<i32>,
    pub fitness_goals: Option<String>,
    pub medical_conditions: Option<String>,
}

/// Row of the `athlete_details` view: the user joined with its athlete record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AthleteProfile {
    pub user_id: i64,
    pub athlete_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub fitness_goals: Option<String>,
    pub medical_conditions: Option<String>,
}
