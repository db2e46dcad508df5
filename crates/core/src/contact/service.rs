use std::collections::HashMap;

use uuid::Uuid;

use super::model::{Contact, ContactDraft, ContactFilter, ContactPatch, ContactView, NamedRef};
use crate::access::{authorize, Caller};
use crate::store::Repository;
use crate::{Crm, Error, Result};

fn named(names: &HashMap<Uuid, String>, id: Uuid) -> Option<NamedRef> {
    names.get(&id).map(|name| NamedRef {
        id,
        name: name.clone(),
    })
}

impl Crm {
    /// Contacts the caller owns (every contact for Admins), optionally
    /// narrowed to one organization.
    pub async fn list_contacts(&self, caller: &Caller, filter: ContactFilter) -> Result<Vec<ContactView>> {
        let owner = caller.owner_scope();
        let contacts = self
            .db()
            .contacts
            .find(&|c: &Contact| {
                owner.map_or(true, |owner| c.owner_id == owner)
                    && filter.organization.map_or(true, |org| c.organization_id == Some(org))
            })
            .await?;
        self.contact_views(contacts).await
    }

    pub async fn get_contact(&self, caller: &Caller, id: Uuid) -> Result<ContactView> {
        let contact = authorize(self.db().contacts.get(id).await?, caller, "Contact")?;
        let mut views = self.contact_views(vec![contact]).await?;
        views.pop().ok_or_else(|| Error::not_found("Contact"))
    }

    pub async fn create_contact(&self, caller: &Caller, draft: ContactDraft) -> Result<Contact> {
        let (Some(first_name), Some(last_name), Some(email)) =
            (draft.first_name, draft.last_name, draft.email)
        else {
            return Err(Error::validation(
                "Please provide first name, last name, and email",
            ));
        };

        let mut contact = Contact::new(first_name.trim(), last_name.trim(), email.trim(), caller.id);
        contact.phone = draft.phone.flatten();
        contact.organization_id = draft.organization_id.flatten();
        let contact = self.db().contacts.insert(contact).await?;
        tracing::info!(user_id = %caller.id, contact_id = %contact.id, "contact created");
        Ok(contact)
    }

    pub async fn update_contact(&self, caller: &Caller, id: Uuid, patch: ContactPatch) -> Result<Contact> {
        let mut contact = authorize(self.db().contacts.get(id).await?, caller, "Contact")?;

        if let Some(first_name) = patch.first_name {
            contact.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = patch.last_name {
            contact.last_name = last_name.trim().to_string();
        }
        if let Some(email) = patch.email {
            contact.email = email.trim().to_string();
        }
        if let Some(phone) = patch.phone {
            contact.phone = phone;
        }
        if let Some(organization_id) = patch.organization_id {
            contact.organization_id = organization_id;
        }
        contact.last_modified_by = caller.id;

        let contact = self.db().contacts.update(contact).await?;
        tracing::info!(user_id = %caller.id, contact_id = %contact.id, "contact updated");
        Ok(contact)
    }

    /// Hard delete. Notes, activities and deals pointing at the contact are
    /// left in place.
    pub async fn delete_contact(&self, caller: &Caller, id: Uuid) -> Result<()> {
        let contact = authorize(self.db().contacts.get(id).await?, caller, "Contact")?;
        self.db().contacts.delete(contact.id).await?;
        tracing::info!(user_id = %caller.id, contact_id = %id, "contact deleted");
        Ok(())
    }

    /// Parent ownership check for nested resources.
    pub(crate) async fn accessible_contact(&self, caller: &Caller, contact_id: Uuid) -> Result<Contact> {
        authorize(self.db().contacts.get(contact_id).await?, caller, "Contact")
    }

    async fn contact_views(&self, contacts: Vec<Contact>) -> Result<Vec<ContactView>> {
        let users = self.user_names().await?;
        let organizations = self.organization_names().await?;

        Ok(contacts
            .into_iter()
            .map(|contact| ContactView {
                organization: contact
                    .organization_id
                    .and_then(|org| named(&organizations, org)),
                created_by_user: named(&users, contact.created_by),
                last_modified_by_user: named(&users, contact.last_modified_by),
                contact,
            })
            .collect())
    }
}
