use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use uuid::Uuid;

use crate::Role;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(default = "User::generate_id")]
    pub id: Thing,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Credential-hasher output, never the plaintext.
    pub password: String,
    pub gender: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    fn generate_id() -> Thing {
        Thing::from(("users".to_string(), Uuid::new_v4().to_string()))
    }

    pub fn new(
        name: String,
        email: String,
        phone: String,
        password: String,
        gender: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Self::generate_id(),
            name,
            email,
            phone,
            password,
            gender,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Public view of a user record, with the password hash stripped.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id.id.to_string(),
            name: user.name,
            email: user.email,
            phone: user.phone,
            gender: user.gender,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub gender: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Partial update; `password` is only hashed when present, so saves that do
/// not touch the password never re-enter the hasher.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub msg: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub msg: String,
    pub token: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub role: Role,
}
