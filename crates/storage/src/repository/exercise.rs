use serde_json::json;

use crate::client::{Filters, PostgrestClient};
use crate::error::{Result, StorageError};
use crate::models::Exercise;

const RESOURCE: &str = "exercises";

pub struct ExerciseRepository<'a> {
    client: &'a PostgrestClient,
}

impl<'a> ExerciseRepository<'a> {
    pub fn new(client: &'a PostgrestClient) -> Self {
        Self { client }
    }

    /// List the exercise catalogue ordered by name
    pub async fn list(&self) -> Result<Vec<Exercise>> {
        self.client
            .select(RESOURCE, &Filters::new().order("name", true))
            .await
    }

    pub async fn create(&self, name: &str) -> Result<Exercise> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StorageError::Validation(
                "Exercise name cannot be empty".to_string(),
            ));
        }

        let rows: Vec<Exercise> = self.client.insert(RESOURCE, &json!({ "name": name })).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StorageError::NotFound(format!("exercise '{}' after insert", name)))
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Exercise> {
        self.client
            .select_one(RESOURCE, &Filters::new().eq("name", name.trim()))
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("exercise '{}'", name)))
    }

    pub async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Exercise>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.client
            .select(RESOURCE, &Filters::new().in_list("id", ids))
            .await
    }
}
