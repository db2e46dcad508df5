use uuid::Uuid;

use super::mention::extract_mentions;
use super::model::{Note, NoteDraft};
use crate::access::Caller;
use crate::notification::Notification;
use crate::store::Repository;
use crate::user::User;
use crate::{Crm, Error, Result};

impl Crm {
    /// Notes on a contact, newest first.
    pub async fn list_notes(&self, caller: &Caller, contact_id: Uuid) -> Result<Vec<Note>> {
        let contact = self.accessible_contact(caller, contact_id).await?;
        self.db()
            .notes
            .find(&|n: &Note| n.contact_id == Some(contact.id))
            .await
    }

    /// Save a note, then notify every user it mentions by display name.
    ///
    /// Notifications are created one at a time after the note is stored; a
    /// failure part-way leaves the note and any notifications already sent.
    pub async fn create_note(&self, caller: &Caller, contact_id: Uuid, draft: NoteDraft) -> Result<Note> {
        let Some(body) = draft.body else {
            return Err(Error::validation("Note body is required"));
        };
        let contact = self.accessible_contact(caller, contact_id).await?;

        let mut note = Note::new(body, caller.id);
        note.contact_id = Some(contact.id);
        note.deal_id = draft.deal_id;
        let note = self.db().notes.insert(note).await?;

        let mentions = extract_mentions(&note.body);
        if mentions.is_empty() {
            return Ok(note);
        }

        let recipients = self
            .db()
            .users
            .find(&|u: &User| mentions.contains(&u.name) && u.id != caller.id)
            .await?;
        let message = format!(
            "{} mentioned you in a note on {}'s page.",
            caller.name,
            contact.full_name()
        );
        for recipient in &recipients {
            let notification = Notification::new(recipient.id, message.clone())
                .with_sender(caller.id)
                .with_link(format!("/contacts/{}", contact.id));
            self.db().notifications.insert(notification).await?;
        }

        tracing::info!(
            note_id = %note.id,
            mentioned = mentions.len(),
            notified = recipients.len(),
            "note created"
        );
        Ok(note)
    }
}
