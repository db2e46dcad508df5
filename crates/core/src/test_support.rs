//! Fixtures shared by the unit tests.

use std::ops::Deref;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use crate::access::{Caller, Role};
use crate::contact::{Contact, ContactDraft};
use crate::email::{Mailer, OutgoingEmail};
use crate::media::LocalMediaStore;
use crate::organization::{Organization, OrganizationDraft};
use crate::store::Repository;
use crate::user::{hash_password, User};
use crate::{Crm, Result};

#[derive(Default)]
pub(crate) struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    pub(crate) fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub(crate) struct TestCrm {
    pub crm: Crm,
    pub mailer: Arc<RecordingMailer>,
    pub media: Arc<LocalMediaStore>,
}

impl Deref for TestCrm {
    type Target = Crm;

    fn deref(&self) -> &Crm {
        &self.crm
    }
}

pub(crate) async fn open_test_crm() -> (TestCrm, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let mailer = Arc::new(RecordingMailer::default());
    let media = Arc::new(LocalMediaStore::new(temp_dir.path().join("media"), "/uploads"));
    let crm = Crm::open(temp_dir.path().join("data"), media.clone(), mailer.clone())
        .await
        .unwrap();
    (TestCrm { crm, mailer, media }, temp_dir)
}

/// Insert an active user named `name` with email `<name>@example.com` and
/// password `password123`.
pub(crate) async fn seed_user(crm: &Crm, name: &str, role: Role) -> Caller {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    let user = User::new(name, email, hash_password("password123").unwrap(), role);
    crm.db().users.insert(user).await.unwrap().caller()
}

pub(crate) async fn seed_contact(crm: &Crm, owner: &Caller, first_name: &str, email: &str) -> Contact {
    crm.create_contact(
        owner,
        ContactDraft {
            first_name: Some(first_name.to_string()),
            last_name: Some("Doe".to_string()),
            email: Some(email.to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
}

pub(crate) async fn seed_organization(crm: &Crm, caller: &Caller, name: &str) -> Organization {
    crm.create_organization(
        caller,
        OrganizationDraft {
            name: Some(name.to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
}
