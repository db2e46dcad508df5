//! Caller identity and the ownership capability check.
//!
//! Every operation on an owner-bearing record receives an explicit
//! [`Caller`] and runs [`authorize`] before acting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::User => "User",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(Error::validation(format!("Unsupported role '{}'", value))),
        }
    }
}

/// The authenticated identity an operation runs on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

impl Caller {
    pub fn new(id: Uuid, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn can_access(&self, owner_id: Uuid) -> bool {
        can_access(self.role, self.id, owner_id)
    }

    /// Owner filter for list operations: `None` means every owner.
    pub fn owner_scope(&self) -> Option<Uuid> {
        if self.is_admin() {
            None
        } else {
            Some(self.id)
        }
    }

    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::Forbidden("Not authorized as an admin".to_string()))
        }
    }
}

/// A record whose access is anchored on a single user reference.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

pub fn can_access(caller_role: Role, caller_id: Uuid, owner_id: Uuid) -> bool {
    caller_role == Role::Admin || caller_id == owner_id
}

/// Existence first, then ownership.
pub fn authorize<T: Owned>(record: Option<T>, caller: &Caller, what: &str) -> Result<T> {
    let record = record.ok_or_else(|| Error::not_found(what))?;
    if !caller.can_access(record.owner_id()) {
        tracing::debug!(caller_id = %caller.id, owner_id = %record.owner_id(), what, "access denied");
        return Err(Error::NotAuthorized(what.to_string()));
    }
    Ok(record)
}
