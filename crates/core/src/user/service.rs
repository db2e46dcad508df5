use std::collections::HashMap;

use uuid::Uuid;

use super::model::{NewUserInput, SignupInput, User, UserDirectoryEntry, UserListing, UserProfile};
use super::password::{hash_password, validate_password, verify_password};
use crate::access::{Caller, Role};
use crate::serde_util::non_blank;
use crate::store::Repository;
use crate::{Crm, Error, Result};

fn normalize_email(email: &str) -> Result<String> {
    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return Err(Error::validation("Invalid email"));
    }
    Ok(normalized)
}

impl Crm {
    /// Register a new non-Admin account.
    pub async fn signup(&self, input: SignupInput) -> Result<User> {
        let (Some(name), Some(email), Some(password)) = (
            non_blank(input.name),
            non_blank(input.email),
            input.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(Error::validation("Please enter all fields"));
        };

        let user = self.insert_user(&name, &email, &password, Role::User).await?;
        tracing::info!(user_id = %user.id, "user signed up");
        Ok(user)
    }

    /// Check credentials. Deactivated accounts are refused even with the
    /// right password.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let normalized = email.trim().to_lowercase();
        let user = self
            .find_user_by_email(&normalized)
            .await?
            .filter(|user| verify_password(&user.password_hash, password))
            .ok_or_else(|| Error::Unauthenticated("Invalid email or password".to_string()))?;

        if !user.is_active {
            return Err(Error::AccountDisabled);
        }
        Ok(user)
    }

    /// Turn a verified token subject into the caller context.
    pub async fn resolve_caller(&self, user_id: Uuid) -> Result<Caller> {
        let user = self
            .db()
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| Error::Unauthenticated("Not authorized, user not found".to_string()))?;
        if !user.is_active {
            return Err(Error::AccountDisabled);
        }
        Ok(user.caller())
    }

    pub async fn get_profile(&self, caller: &Caller) -> Result<UserProfile> {
        Ok(self.require_user(caller.id).await?.profile())
    }

    /// Admins get full profiles, everyone else a name directory.
    pub async fn list_users(&self, caller: &Caller) -> Result<UserListing> {
        let mut users = self.db().users.list().await?;
        users.sort_by(|a, b| a.name.cmp(&b.name));

        if caller.is_admin() {
            Ok(UserListing::Full(users.iter().map(User::profile).collect()))
        } else {
            Ok(UserListing::Directory(
                users
                    .into_iter()
                    .map(|user| UserDirectoryEntry {
                        id: user.id,
                        name: user.name,
                    })
                    .collect(),
            ))
        }
    }

    pub async fn create_user(&self, caller: &Caller, input: NewUserInput) -> Result<UserProfile> {
        caller.require_admin()?;
        let (Some(name), Some(email), Some(password), Some(role)) = (
            non_blank(input.name),
            non_blank(input.email),
            input.password.filter(|p| !p.is_empty()),
            non_blank(input.role),
        ) else {
            return Err(Error::validation("Please provide all fields"));
        };
        let role: Role = role.parse()?;

        let user = self.insert_user(&name, &email, &password, role).await?;
        tracing::info!(admin_id = %caller.id, user_id = %user.id, role = %role, "user created");
        Ok(user.profile())
    }

    pub async fn update_role(&self, caller: &Caller, user_id: Uuid, role: &str) -> Result<UserProfile> {
        caller.require_admin()?;
        let role: Role = role.parse()?;
        let mut user = self.require_user(user_id).await?;
        user.role = role;
        let user = self.db().users.update(user).await?;
        tracing::info!(admin_id = %caller.id, user_id = %user.id, role = %role, "user role changed");
        Ok(user.profile())
    }

    /// Soft (de)activation; accounts are never deleted.
    pub async fn set_status(&self, caller: &Caller, user_id: Uuid, is_active: bool) -> Result<UserProfile> {
        caller.require_admin()?;
        let mut user = self.require_user(user_id).await?;
        user.is_active = is_active;
        let user = self.db().users.update(user).await?;
        tracing::info!(admin_id = %caller.id, user_id = %user.id, is_active, "user status changed");
        Ok(user.profile())
    }

    pub async fn update_profile(&self, caller: &Caller, name: Option<String>) -> Result<UserProfile> {
        let mut user = self.require_user(caller.id).await?;
        if let Some(name) = non_blank(name) {
            user.name = name;
        }
        let user = self.db().users.update(user).await?;
        Ok(user.profile())
    }

    pub async fn change_password(
        &self,
        caller: &Caller,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        if current_password.is_empty() || new_password.is_empty() {
            return Err(Error::validation(
                "Please provide both current and new passwords.",
            ));
        }
        let mut user = self.require_user(caller.id).await?;
        if !verify_password(&user.password_hash, current_password) {
            return Err(Error::Unauthenticated("Invalid current password.".to_string()));
        }
        validate_password(new_password)?;
        user.password_hash = hash_password(new_password)?;
        self.db().users.update(user).await?;
        tracing::info!(user_id = %caller.id, "password changed");
        Ok(())
    }

    /// Create the bootstrap Admin unless an account with `email` exists.
    /// Returns whether an account was created.
    pub async fn ensure_admin(&self, email: &str, password: &str, name: &str) -> Result<bool> {
        let normalized = normalize_email(email)?;
        if self.find_user_by_email(&normalized).await?.is_some() {
            return Ok(false);
        }
        let user = self.insert_user(name, &normalized, password, Role::Admin).await?;
        tracing::info!(user_id = %user.id, "bootstrap admin created");
        Ok(true)
    }

    pub(crate) async fn require_user(&self, user_id: Uuid) -> Result<User> {
        self.db()
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| Error::not_found("User"))
    }

    /// Display names of every user, used to enrich responses.
    pub(crate) async fn user_names(&self) -> Result<HashMap<Uuid, String>> {
        Ok(self
            .db()
            .users
            .list()
            .await?
            .into_iter()
            .map(|user| (user.id, user.name))
            .collect())
    }

    async fn find_user_by_email(&self, normalized_email: &str) -> Result<Option<User>> {
        Ok(self
            .db()
            .users
            .find(&|user: &User| user.email == normalized_email)
            .await?
            .into_iter()
            .next())
    }

    async fn insert_user(&self, name: &str, email: &str, password: &str, role: Role) -> Result<User> {
        let email = normalize_email(email)?;
        validate_password(password)?;
        if self.find_user_by_email(&email).await?.is_some() {
            return Err(Error::Duplicate(
                "User with this email already exists".to_string(),
            ));
        }
        let user = User::new(name.trim(), email, hash_password(password)?, role);
        self.db().users.insert(user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{open_test_crm, seed_user};

    #[tokio::test]
    async fn signup_then_login() {
        let (crm, _tmp) = open_test_crm().await;
        let user = crm
            .signup(SignupInput {
                name: Some("Alice".into()),
                email: Some("Alice@Example.com".into()),
                password: Some("wonderland".into()),
            })
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.role, Role::User);

        let logged_in = crm.login("alice@example.com", "wonderland").await.unwrap();
        assert_eq!(logged_in.id, user.id);

        let bad = crm.login("alice@example.com", "nope").await.unwrap_err();
        assert!(matches!(bad, Error::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn signup_rejects_missing_fields_and_duplicates() {
        let (crm, _tmp) = open_test_crm().await;
        let missing = crm
            .signup(SignupInput {
                name: Some("Alice".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(missing, Error::Validation(_)));

        seed_user(&crm, "Alice", Role::User).await;
        let duplicate = crm
            .signup(SignupInput {
                name: Some("Other Alice".into()),
                email: Some("alice@example.com".into()),
                password: Some("wonderland".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(duplicate, Error::Duplicate(_)));
    }

    #[tokio::test]
    async fn deactivated_accounts_cannot_log_in_or_resolve() {
        let (crm, _tmp) = open_test_crm().await;
        let admin = seed_user(&crm, "Root", Role::Admin).await;
        let bob = seed_user(&crm, "Bob", Role::User).await;

        crm.set_status(&admin, bob.id, false).await.unwrap();

        let login = crm.login("bob@example.com", "password123").await.unwrap_err();
        assert!(matches!(login, Error::AccountDisabled));
        let resolve = crm.resolve_caller(bob.id).await.unwrap_err();
        assert!(matches!(resolve, Error::AccountDisabled));
    }

    #[tokio::test]
    async fn admin_only_operations_are_gated() {
        let (crm, _tmp) = open_test_crm().await;
        let admin = seed_user(&crm, "Root", Role::Admin).await;
        let bob = seed_user(&crm, "Bob", Role::User).await;

        let denied = crm.update_role(&bob, bob.id, "Admin").await.unwrap_err();
        assert!(matches!(denied, Error::Forbidden(_)));

        let promoted = crm.update_role(&admin, bob.id, "Admin").await.unwrap();
        assert_eq!(promoted.role, Role::Admin);

        let bad_role = crm.update_role(&admin, bob.id, "Wizard").await.unwrap_err();
        assert!(matches!(bad_role, Error::Validation(_)));
    }

    #[tokio::test]
    async fn listing_depends_on_role() {
        let (crm, _tmp) = open_test_crm().await;
        let admin = seed_user(&crm, "Root", Role::Admin).await;
        let bob = seed_user(&crm, "Bob", Role::User).await;

        match crm.list_users(&admin).await.unwrap() {
            UserListing::Full(profiles) => assert_eq!(profiles.len(), 2),
            other => panic!("expected full listing, got {:?}", other),
        }
        match crm.list_users(&bob).await.unwrap() {
            UserListing::Directory(entries) => {
                let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
                assert_eq!(names, vec!["Bob", "Root"]);
            }
            other => panic!("expected directory listing, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn change_password_requires_current_password() {
        let (crm, _tmp) = open_test_crm().await;
        let bob = seed_user(&crm, "Bob", Role::User).await;

        let wrong = crm
            .change_password(&bob, "not-it", "brand-new-pass")
            .await
            .unwrap_err();
        assert!(matches!(wrong, Error::Unauthenticated(_)));

        crm.change_password(&bob, "password123", "brand-new-pass")
            .await
            .unwrap();
        assert!(crm.login("bob@example.com", "brand-new-pass").await.is_ok());
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let (crm, _tmp) = open_test_crm().await;
        assert!(crm
            .ensure_admin("admin@example.com", "adminpassword", "Admin User")
            .await
            .unwrap());
        assert!(!crm
            .ensure_admin("admin@example.com", "adminpassword", "Admin User")
            .await
            .unwrap());

        let admin = crm.login("admin@example.com", "adminpassword").await.unwrap();
        assert_eq!(admin.role, Role::Admin);
    }
}
