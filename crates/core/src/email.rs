//! Outbound email to contacts.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::access::{authorize, Caller};
use crate::activity::{Activity, ActivityKind, TaskStatus};
use crate::serde_util::non_blank;
use crate::store::Repository;
use crate::{Crm, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Mail transport. Sends are attempted once; failures surface to the caller.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<()>;
}

impl Crm {
    /// Send an HTML email to a contact, then log it as a completed Email
    /// activity.
    pub async fn send_contact_email(
        &self,
        caller: &Caller,
        contact_id: Uuid,
        subject: Option<String>,
        body: Option<String>,
    ) -> Result<Activity> {
        let (Some(subject), Some(body)) = (non_blank(subject), non_blank(body)) else {
            return Err(Error::validation("Subject and body are required."));
        };
        let contact = authorize(
            self.db().contacts.get(contact_id).await?,
            caller,
            "Contact",
        )?;

        self.mailer()
            .send(OutgoingEmail {
                to: contact.email.clone(),
                subject: subject.clone(),
                html: body.clone(),
            })
            .await?;
        tracing::info!(user_id = %caller.id, contact_id = %contact.id, "email sent to contact");

        let mut activity = Activity::new(ActivityKind::Email, format!("Email: {}", subject), caller.id);
        activity.body = Some(body);
        activity.scheduled_at = Some(Utc::now());
        activity.status = TaskStatus::Completed;
        activity.contact_id = Some(contact.id);
        self.db().activities.insert(activity).await
    }
}
