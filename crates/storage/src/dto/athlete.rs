use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::CLIENT_ROLE;

/// Sign-up payload: creates a `users` row and the linked `athletes` row.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAthleteRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    #[validate(range(min = 1, max = 120, message = "Age must be between 1 and 120"))]
    pub age: Option<i32>,

    #[validate(length(max = 1000))]
    pub fitness_goals: Option<String>,

    #[validate(length(max = 1000))]
    pub medical_conditions: Option<String>,
}

/// Partial update of the `users` row. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
}

/// Partial update of the `athletes` row. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateAthleteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 120))]
    pub age: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000))]
    pub fitness_goals: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000))]
    pub medical_conditions: Option<String>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

impl UpdateAthleteRequest {
    pub fn is_empty(&self) -> bool {
        self.age.is_none() && self.fitness_goals.is_none() && self.medical_conditions.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAthlete {
    pub user_id: i64,
    pub age: Option<i32>,
    pub fitness_goals: Option<String>,
    pub medical_conditions: Option<String>,
}

impl CreateAthleteRequest {
    pub fn new_user(&self) -> NewUser {
        NewUser {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            role: CLIENT_ROLE.to_string(),
        }
    }

    pub fn new_athlete(&self, user_id: i64) -> NewAthlete {
        NewAthlete {
            user_id,
            age: self.age,
            fitness_goals: self.fitness_goals.clone(),
            medical_conditions: self.medical_conditions.clone(),
        }
    }
}
