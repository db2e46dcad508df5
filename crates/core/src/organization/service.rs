use std::collections::HashMap;

use futures::future::try_join_all;
use uuid::Uuid;

use super::model::{Organization, OrganizationDraft, OrganizationView};
use crate::access::Caller;
use crate::contact::NamedRef;
use crate::media::{MediaAsset, ResourceKind, Upload};
use crate::store::Repository;
use crate::{Crm, Error, Result};

#[derive(Clone, Copy)]
enum Gallery {
    Pictures,
    Videos,
}

impl Gallery {
    fn kind(self) -> ResourceKind {
        match self {
            Self::Pictures => ResourceKind::Image,
            Self::Videos => ResourceKind::Video,
        }
    }

    fn section(self) -> &'static str {
        match self {
            Self::Pictures => "pictures",
            Self::Videos => "videos",
        }
    }

    fn item(self) -> &'static str {
        match self {
            Self::Pictures => "Picture",
            Self::Videos => "Video",
        }
    }

    fn assets(self, organization: &mut Organization) -> &mut Vec<MediaAsset> {
        match self {
            Self::Pictures => &mut organization.pictures,
            Self::Videos => &mut organization.videos,
        }
    }
}

impl Crm {
    /// Every organization, sorted by name.
    pub async fn list_organizations(&self) -> Result<Vec<OrganizationView>> {
        let mut organizations = self.db().organizations.list().await?;
        organizations.sort_by(|a, b| a.name.cmp(&b.name));
        self.organization_views(organizations).await
    }

    pub async fn get_organization(&self, id: Uuid) -> Result<OrganizationView> {
        let organization = self.require_organization(id).await?;
        let mut views = self.organization_views(vec![organization]).await?;
        views.pop().ok_or_else(|| Error::not_found("Organization"))
    }

    pub async fn create_organization(
        &self,
        caller: &Caller,
        draft: OrganizationDraft,
    ) -> Result<Organization> {
        let Some(name) = draft.name.as_deref().map(str::trim).map(str::to_string) else {
            return Err(Error::validation("Organization name is required"));
        };

        let mut organization = Organization::new(name, caller.id);
        apply_draft(&mut organization, draft);
        let organization = self.db().organizations.insert(organization).await?;
        tracing::info!(user_id = %caller.id, organization_id = %organization.id, "organization created");
        Ok(organization)
    }

    pub async fn update_organization(
        &self,
        caller: &Caller,
        id: Uuid,
        draft: OrganizationDraft,
    ) -> Result<Organization> {
        let mut organization = self.require_organization(id).await?;
        if let Some(name) = draft.name.as_deref() {
            organization.name = name.trim().to_string();
        }
        apply_draft(&mut organization, draft);
        organization.last_modified_by = caller.id;
        self.db().organizations.update(organization).await
    }

    /// Contacts and deals referencing the organization are not touched.
    pub async fn delete_organization(&self, caller: &Caller, id: Uuid) -> Result<()> {
        let organization = self.require_organization(id).await?;
        self.db().organizations.delete(organization.id).await?;
        tracing::info!(user_id = %caller.id, organization_id = %id, "organization deleted");
        Ok(())
    }

    /// Replace the logo. The new image is stored and saved on the record
    /// before the previous one is destroyed.
    pub async fn upload_logo(&self, caller: &Caller, id: Uuid, upload: Upload) -> Result<Organization> {
        let mut organization = self.require_organization(id).await?;

        let asset = self
            .media()
            .upload(&upload, &organization.media_folder("logos"), ResourceKind::Image)
            .await?;

        let previous = organization.logo.replace(asset);
        organization.last_modified_by = caller.id;
        let organization = self.db().organizations.update(organization).await?;

        if let Some(previous) = previous {
            self.media()
                .destroy(&previous.public_id, ResourceKind::Image)
                .await?;
        }
        Ok(organization)
    }

    pub async fn upload_pictures(
        &self,
        caller: &Caller,
        id: Uuid,
        uploads: Vec<Upload>,
    ) -> Result<Organization> {
        self.upload_gallery(caller, id, uploads, Gallery::Pictures).await
    }

    pub async fn delete_picture(&self, caller: &Caller, id: Uuid, public_id: &str) -> Result<Organization> {
        self.delete_from_gallery(caller, id, public_id, Gallery::Pictures)
            .await
    }

    pub async fn upload_videos(
        &self,
        caller: &Caller,
        id: Uuid,
        uploads: Vec<Upload>,
    ) -> Result<Organization> {
        self.upload_gallery(caller, id, uploads, Gallery::Videos).await
    }

    pub async fn delete_video(&self, caller: &Caller, id: Uuid, public_id: &str) -> Result<Organization> {
        self.delete_from_gallery(caller, id, public_id, Gallery::Videos)
            .await
    }

    pub(crate) async fn require_organization(&self, id: Uuid) -> Result<Organization> {
        self.db()
            .organizations
            .get(id)
            .await?
            .ok_or_else(|| Error::not_found("Organization"))
    }

    pub(crate) async fn organization_names(&self) -> Result<HashMap<Uuid, String>> {
        Ok(self
            .db()
            .organizations
            .list()
            .await?
            .into_iter()
            .map(|org| (org.id, org.name))
            .collect())
    }

    async fn upload_gallery(
        &self,
        caller: &Caller,
        id: Uuid,
        uploads: Vec<Upload>,
        gallery: Gallery,
    ) -> Result<Organization> {
        let mut organization = self.require_organization(id).await?;
        if uploads.is_empty() {
            return Err(Error::validation(format!(
                "Please upload {} files.",
                gallery.item().to_lowercase()
            )));
        }

        let folder = organization.media_folder(gallery.section());
        let assets = try_join_all(
            uploads
                .iter()
                .map(|upload| self.media().upload(upload, &folder, gallery.kind())),
        )
        .await?;

        tracing::info!(
            user_id = %caller.id,
            organization_id = %id,
            count = assets.len(),
            section = gallery.section(),
            "organization media uploaded"
        );
        gallery.assets(&mut organization).extend(assets);
        organization.last_modified_by = caller.id;
        self.db().organizations.update(organization).await
    }

    async fn delete_from_gallery(
        &self,
        caller: &Caller,
        id: Uuid,
        public_id: &str,
        gallery: Gallery,
    ) -> Result<Organization> {
        let mut organization = self.require_organization(id).await?;
        let assets = gallery.assets(&mut organization);
        let Some(position) = assets.iter().position(|a| a.public_id == public_id) else {
            return Err(Error::not_found(gallery.item()));
        };

        self.media().destroy(public_id, gallery.kind()).await?;
        assets.remove(position);
        organization.last_modified_by = caller.id;
        self.db().organizations.update(organization).await
    }

    async fn organization_views(&self, organizations: Vec<Organization>) -> Result<Vec<OrganizationView>> {
        let users = self.user_names().await?;
        let named = |id: Uuid| {
            users.get(&id).map(|name| NamedRef {
                id,
                name: name.clone(),
            })
        };

        Ok(organizations
            .into_iter()
            .map(|organization| OrganizationView {
                created_by_user: named(organization.created_by),
                last_modified_by_user: named(organization.last_modified_by),
                organization,
            })
            .collect())
    }
}

fn apply_draft(organization: &mut Organization, draft: OrganizationDraft) {
    if let Some(website) = draft.website {
        organization.website = website;
    }
    if let Some(industry) = draft.industry {
        organization.industry = industry;
    }
    if let Some(size) = draft.size {
        organization.size = size;
    }
    if let Some(biography) = draft.biography {
        organization.biography = biography;
    }
    if let Some(services) = draft.services {
        organization.services = services.into_list();
    }
}
