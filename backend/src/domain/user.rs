use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use types::domain::User;

/// A user row as persisted, including the password digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "password")]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl StoredUser {
    pub fn new(name: String, email: String, hashed_password: String) -> Self {
        StoredUser {
            id: format!("user_{}", Uuid::new_v4().simple()),
            name,
            email,
            hashed_password,
            created_at: Utc::now(),
            avatar: None,
        }
    }
}

impl From<StoredUser> for User {
    fn from(user: StoredUser) -> Self {
        User {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            avatar: user.avatar,
        }
    }
}
