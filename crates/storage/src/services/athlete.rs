use tracing::{info, warn};
use validator::Validate;

use crate::client::PostgrestClient;
use crate::dto::athlete::{CreateAthleteRequest, UpdateAthleteRequest, UpdateUserRequest};
use crate::error::{Result, StorageError};
use crate::models::{Athlete, AthleteProfile, User};
use crate::repository::AthleteRepository;

/// Signs up an athlete: the `users` row first, then the linked `athletes` row.
///
/// The user insert does not reliably return the new row, so the user id is
/// read back by email before the athlete row is written.
pub async fn register_athlete(
    client: &PostgrestClient,
    request: &CreateAthleteRequest,
) -> Result<(User, Athlete)> {
    if let Err(e) = request.validate() {
        warn!("Rejected sign-up for {}: {}", request.email, e);
        return Err(e.into());
    }

    let repo = AthleteRepository::new(client);
    let new_user = request.new_user();

    if repo.find_user_by_email(&new_user.email).await?.is_some() {
        return Err(StorageError::Conflict(format!(
            "a user with email {} already exists",
            new_user.email
        )));
    }

    repo.create_user(&new_user).await?;
    let user = repo
        .find_user_by_email(&new_user.email)
        .await?
        .ok_or_else(|| StorageError::NotFound(format!("user {} after sign-up", new_user.email)))?;

    let athlete = repo.create_athlete(&request.new_athlete(user.id)).await?;

    info!(
        "Registered athlete {} (user {}, {})",
        athlete.id, user.id, user.email
    );
    Ok((user, athlete))
}

/// Applies the non-empty parts of a profile edit and returns the profile as
/// stored afterwards.
pub async fn update_profile(
    client: &PostgrestClient,
    user_id: i64,
    user: &UpdateUserRequest,
    athlete: &UpdateAthleteRequest,
) -> Result<AthleteProfile> {
    user.validate()?;
    athlete.validate()?;

    let repo = AthleteRepository::new(client);
    if !user.is_empty() {
        repo.update_user(user_id, user).await?;
    }
    if !athlete.is_empty() {
        repo.update_athlete(user_id, athlete).await?;
    }

    repo.find_profile(user_id).await
}
