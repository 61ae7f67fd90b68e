use serde::{Deserialize, Serialize};

pub const CLIENT_ROLE: &str = "client";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
}
