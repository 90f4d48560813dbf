use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use mc_core::domain::{Record, User, UserStatus};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1, max = 64))]
    pub password: String,
    #[serde(default)]
    pub status: Option<UserStatus>,
}

impl CreateUserRequest {
    pub fn into_user(self) -> User {
        let mut user = User::new(self.username, self.password);
        if let Some(status) = self.status {
            user.status = status;
        }
        user
    }
}

/// Partial update: only the fields present are written
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub password: Option<String>,
    pub status: Option<UserStatus>,
}

impl UpdateUserRequest {
    pub fn into_changes(self) -> Record {
        let mut changes = Record::new();
        if let Some(username) = self.username {
            changes.set("username", username);
        }
        if let Some(password) = self.password {
            changes.set("password", password);
        }
        if let Some(status) = self.status {
            changes.set("status", status.code());
        }
        changes
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListUsersQuery {
    /// Maximum number of users, 0 or absent for all
    #[serde(default, alias = "line")]
    pub limit: u64,
}

/// A user as returned by the API; the password is never echoed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub status: UserStatus,
    pub create_time: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            // stored users always carry their id
            id: user.id.unwrap_or_default(),
            username: user.username,
            status: user.status,
            create_time: user.create_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteUserResponse {
    pub deleted: u64,
}
