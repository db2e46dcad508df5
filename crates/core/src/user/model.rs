//! User account model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::{Caller, Role};
use crate::store::Record;

fn default_active() -> bool {
    true
}

/// A stored user account. Never serialized into responses directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn caller(&self) -> Caller {
        Caller::new(self.id, self.name.clone(), self.role)
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

impl Record for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Account details visible to the account holder and to Admins.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// What non-Admins see when listing users (e.g. for @mention suggestions).
#[derive(Debug, Clone, Serialize)]
pub struct UserDirectoryEntry {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum UserListing {
    Full(Vec<UserProfile>),
    Directory(Vec<UserDirectoryEntry>),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUserInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_omits_password_hash() {
        let user = User::new("Alice", "alice@example.com", "secret-hash", Role::User);
        let json = serde_json::to_value(user.profile()).unwrap();
        assert_eq!(json["name"], "Alice");
        assert_eq!(json["role"], "User");
        assert_eq!(json["isActive"], true);
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn legacy_records_default_to_active_users() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "name": "Old",
            "email": "old@example.com",
            "passwordHash": "x",
            "createdAt": Utc::now(),
            "updatedAt": Utc::now(),
        });
        let user: User = serde_json::from_value(json).unwrap();
        assert!(user.is_active);
        assert_eq!(user.role, Role::User);
    }
}
