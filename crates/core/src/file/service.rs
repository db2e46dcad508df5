use uuid::Uuid;

use super::model::{FileParent, FileRecord};
use crate::access::{authorize, Caller};
use crate::media::{ResourceKind, Upload};
use crate::store::Repository;
use crate::{Crm, Result};

impl Crm {
    pub async fn list_contact_files(&self, caller: &Caller, contact_id: Uuid) -> Result<Vec<FileRecord>> {
        let contact = self.accessible_contact(caller, contact_id).await?;
        self.files_of(FileParent::Contact(contact.id)).await
    }

    pub async fn upload_contact_file(
        &self,
        caller: &Caller,
        contact_id: Uuid,
        upload: Upload,
    ) -> Result<FileRecord> {
        let contact = self.accessible_contact(caller, contact_id).await?;
        self.store_file(caller, FileParent::Contact(contact.id), upload)
            .await
    }

    pub async fn delete_contact_file(&self, caller: &Caller, contact_id: Uuid, file_id: Uuid) -> Result<()> {
        let contact = self.accessible_contact(caller, contact_id).await?;
        self.remove_file(caller, FileParent::Contact(contact.id), file_id)
            .await
    }

    pub async fn list_organization_files(&self, organization_id: Uuid) -> Result<Vec<FileRecord>> {
        let organization = self.require_organization(organization_id).await?;
        self.files_of(FileParent::Organization(organization.id))
            .await
    }

    pub async fn upload_organization_file(
        &self,
        caller: &Caller,
        organization_id: Uuid,
        upload: Upload,
    ) -> Result<FileRecord> {
        let organization = self.require_organization(organization_id).await?;
        self.store_file(caller, FileParent::Organization(organization.id), upload)
            .await
    }

    pub async fn delete_organization_file(
        &self,
        caller: &Caller,
        organization_id: Uuid,
        file_id: Uuid,
    ) -> Result<()> {
        let organization = self.require_organization(organization_id).await?;
        self.remove_file(caller, FileParent::Organization(organization.id), file_id)
            .await
    }

    async fn files_of(&self, parent: FileParent) -> Result<Vec<FileRecord>> {
        self.db()
            .files
            .find(&|f: &FileRecord| f.belongs_to(parent))
            .await
    }

    /// The bytes are stored before the metadata record is written.
    async fn store_file(&self, caller: &Caller, parent: FileParent, upload: Upload) -> Result<FileRecord> {
        let kind = ResourceKind::for_mime(&upload.mime_type);
        let asset = self
            .media()
            .upload(&upload, &parent.media_folder(), kind)
            .await?;
        let record = FileRecord::new(&upload, asset, parent, caller.id);
        let record = self.db().files.insert(record).await?;
        tracing::info!(
            user_id = %caller.id,
            file_id = %record.id,
            size = record.size,
            kind = kind.as_str(),
            "file uploaded"
        );
        Ok(record)
    }

    /// Only the uploader or an Admin may delete. Metadata is checked before
    /// the stored object is destroyed.
    async fn remove_file(&self, caller: &Caller, parent: FileParent, file_id: Uuid) -> Result<()> {
        let file = self
            .db()
            .files
            .get(file_id)
            .await?
            .filter(|file| file.belongs_to(parent));
        let file = authorize(file, caller, "File")?;

        self.media()
            .destroy(&file.public_id, file.resource_kind())
            .await?;
        self.db().files.delete(file.id).await?;
        tracing::info!(user_id = %caller.id, file_id = %file.id, "file deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Role;
    use crate::Error;
    use crate::test_support::{open_test_crm, seed_contact, seed_organization, seed_user};

    fn pdf() -> Upload {
        Upload::new("proposal.pdf", "application/pdf", b"%PDF-1.7".to_vec())
    }

    #[tokio::test]
    async fn contact_attachments_roundtrip() {
        let (crm, _tmp) = open_test_crm().await;
        let bob = seed_user(&crm, "Bob", Role::User).await;
        let contact = seed_contact(&crm, &bob, "Jane", "jane@client.com").await;

        let file = crm.upload_contact_file(&bob, contact.id, pdf()).await.unwrap();
        assert_eq!(file.original_name, "proposal.pdf");
        assert_eq!(file.size, 8);
        assert_eq!(file.contact_id, Some(contact.id));
        assert!(file
            .public_id
            .starts_with(&format!("crm/contacts/{}/attachments/", contact.id)));
        let stored = crm.media.root().join("raw").join(&file.public_id);
        assert!(stored.exists());

        let listed = crm.list_contact_files(&bob, contact.id).await.unwrap();
        assert_eq!(listed.len(), 1);

        crm.delete_contact_file(&bob, contact.id, file.id).await.unwrap();
        assert!(!stored.exists());
        assert!(crm.list_contact_files(&bob, contact.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn media_kind_follows_mime_type() {
        let (crm, _tmp) = open_test_crm().await;
        let bob = seed_user(&crm, "Bob", Role::User).await;
        let org = seed_organization(&crm, &bob, "Acme").await;

        let clip = Upload::new("demo.mp4", "video/mp4", vec![1u8; 4]);
        let file = crm.upload_organization_file(&bob, org.id, clip).await.unwrap();
        assert_eq!(file.resource_kind(), ResourceKind::Video);
        let stored = crm.media.root().join("video").join(&file.public_id);
        assert!(stored.exists());

        crm.delete_organization_file(&bob, org.id, file.id).await.unwrap();
        assert!(!stored.exists());
    }

    #[tokio::test]
    async fn file_must_belong_to_the_parent() {
        let (crm, _tmp) = open_test_crm().await;
        let bob = seed_user(&crm, "Bob", Role::User).await;
        let first = seed_contact(&crm, &bob, "Jane", "jane@client.com").await;
        let second = seed_contact(&crm, &bob, "John", "john@client.com").await;

        let file = crm.upload_contact_file(&bob, first.id, pdf()).await.unwrap();
        let err = crm
            .delete_contact_file(&bob, second.id, file.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn only_uploader_or_admin_can_delete_organization_files() {
        let (crm, _tmp) = open_test_crm().await;
        let bob = seed_user(&crm, "Bob", Role::User).await;
        let eve = seed_user(&crm, "Eve", Role::User).await;
        let admin = seed_user(&crm, "Root", Role::Admin).await;
        let org = seed_organization(&crm, &bob, "Acme").await;

        let file = crm.upload_organization_file(&bob, org.id, pdf()).await.unwrap();
        assert_eq!(crm.list_organization_files(org.id).await.unwrap().len(), 1);

        let denied = crm
            .delete_organization_file(&eve, org.id, file.id)
            .await
            .unwrap_err();
        assert!(matches!(denied, Error::NotAuthorized(_)));

        crm.delete_organization_file(&admin, org.id, file.id).await.unwrap();
        assert!(matches!(
            crm.list_organization_files(Uuid::new_v4()).await.unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn contact_files_are_scoped_to_the_contact_owner() {
        let (crm, _tmp) = open_test_crm().await;
        let bob = seed_user(&crm, "Bob", Role::User).await;
        let eve = seed_user(&crm, "Eve", Role::User).await;
        let contact = seed_contact(&crm, &bob, "Jane", "jane@client.com").await;

        let err = crm
            .upload_contact_file(&eve, contact.id, pdf())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotAuthorized(_)));
    }
}
