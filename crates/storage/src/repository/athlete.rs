use crate::client::{Filters, PostgrestClient};
use crate::dto::athlete::{NewAthlete, NewUser, UpdateAthleteRequest, UpdateUserRequest};
use crate::error::{Result, StorageError};
use crate::models::{Athlete, AthleteProfile, User};

const USERS: &str = "users";
const ATHLETES: &str = "athletes";
const ATHLETE_DETAILS: &str = "athlete_details";

pub struct AthleteRepository<'a> {
    client: &'a PostgrestClient,
}

impl<'a> AthleteRepository<'a> {
    pub fn new(client: &'a PostgrestClient) -> Self {
        Self { client }
    }

    /// Inserts the user. The backend may answer with an empty body, so the
    /// caller looks the row up by email afterwards.
    pub async fn create_user(&self, user: &NewUser) -> Result<()> {
        let _: Vec<serde_json::Value> = self.client.insert(USERS, user).await?;
        Ok(())
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.client
            .select_one(USERS, &Filters::new().eq("email", email.trim()))
            .await
    }

    pub async fn create_athlete(&self, athlete: &NewAthlete) -> Result<Athlete> {
        let rows: Vec<Athlete> = self.client.insert(ATHLETES, athlete).await?;
        rows.into_iter().next().ok_or_else(|| {
            StorageError::NotFound(format!("athlete for user {} after insert", athlete.user_id))
        })
    }

    pub async fn find_athlete_by_user(&self, user_id: i64) -> Result<Option<Athlete>> {
        self.client
            .select_one(ATHLETES, &Filters::new().eq("user_id", user_id))
            .await
    }

    pub async fn find_profile(&self, user_id: i64) -> Result<AthleteProfile> {
        self.client
            .select_one(ATHLETE_DETAILS, &Filters::new().eq("user_id", user_id))
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("profile for user {}", user_id)))
    }

    pub async fn update_user(&self, user_id: i64, update: &UpdateUserRequest) -> Result<User> {
        let rows: Vec<User> = self
            .client
            .update(USERS, &Filters::new().eq("id", user_id), update)
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StorageError::NotFound(format!("user {}", user_id)))
    }

    pub async fn update_athlete(
        &self,
        user_id: i64,
        update: &UpdateAthleteRequest,
    ) -> Result<Athlete> {
        let rows: Vec<Athlete> = self
            .client
            .update(ATHLETES, &Filters::new().eq("user_id", user_id), update)
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StorageError::NotFound(format!("athlete for user {}", user_id)))
    }
}
