use std::collections::HashMap;

use uuid::Uuid;

use super::model::{Deal, DealDraft, DealFilter, DealPatch, DealStage, DealView, StageColumn};
use crate::access::{authorize, Caller};
use crate::contact::{ContactRef, NamedRef};
use crate::store::Repository;
use crate::{Crm, Error, Result};

impl Crm {
    pub async fn list_deals(&self, caller: &Caller, filter: DealFilter) -> Result<Vec<DealView>> {
        let owner = caller.owner_scope();
        let deals = self
            .db()
            .deals
            .find(&|d: &Deal| {
                owner.map_or(true, |owner| d.owner_id == owner)
                    && filter.organization.map_or(true, |org| d.organization_id == org)
            })
            .await?;
        self.deal_views(deals).await
    }

    pub async fn get_deal(&self, caller: &Caller, id: Uuid) -> Result<DealView> {
        let deal = authorize(self.db().deals.get(id).await?, caller, "Deal")?;
        self.deal_view(deal).await
    }

    pub async fn create_deal(&self, caller: &Caller, draft: DealDraft) -> Result<DealView> {
        let (Some(title), Some(value), Some(contact_id), Some(organization_id)) =
            (draft.title, draft.value, draft.contact_id, draft.organization_id)
        else {
            return Err(Error::validation(
                "Title, value, contact, and organization are required",
            ));
        };
        let stage = match draft.stage {
            Some(stage) => stage.parse()?,
            None => DealStage::default(),
        };

        let deal = Deal::new(title.trim(), value, contact_id, organization_id, caller.id)
            .with_stage(stage)
            .with_close_date(draft.close_date.flatten());
        let deal = self.db().deals.insert(deal).await?;
        tracing::info!(user_id = %caller.id, deal_id = %deal.id, stage = %deal.stage, "deal created");
        self.deal_view(deal).await
    }

    /// Apply any subset of fields. Stage changes are unrestricted between the
    /// five stages.
    pub async fn update_deal(&self, caller: &Caller, id: Uuid, patch: DealPatch) -> Result<DealView> {
        let mut deal = authorize(self.db().deals.get(id).await?, caller, "Deal")?;

        if let Some(stage) = patch.stage {
            let stage: DealStage = stage.parse()?;
            if stage != deal.stage {
                tracing::info!(deal_id = %deal.id, from = %deal.stage, to = %stage, "deal stage changed");
            }
            deal.stage = stage;
        }
        if let Some(title) = patch.title {
            deal.title = title.trim().to_string();
        }
        if let Some(value) = patch.value {
            deal.value = value;
        }
        if let Some(contact_id) = patch.contact_id {
            deal.contact_id = contact_id;
        }
        if let Some(organization_id) = patch.organization_id {
            deal.organization_id = organization_id;
        }
        if let Some(close_date) = patch.close_date {
            deal.close_date = close_date;
        }

        let deal = self.db().deals.update(deal).await?;
        self.deal_view(deal).await
    }

    pub async fn delete_deal(&self, caller: &Caller, id: Uuid) -> Result<()> {
        let deal = authorize(self.db().deals.get(id).await?, caller, "Deal")?;
        self.db().deals.delete(deal.id).await?;
        tracing::info!(user_id = %caller.id, deal_id = %id, "deal deleted");
        Ok(())
    }

    /// The caller's deals grouped into one column per stage, in pipeline
    /// order. Empty stages still get a column.
    pub async fn pipeline_board(&self, caller: &Caller) -> Result<Vec<StageColumn>> {
        let deals = self.list_deals(caller, DealFilter::default()).await?;

        let mut columns: Vec<StageColumn> = DealStage::ALL
            .into_iter()
            .map(|stage| StageColumn {
                stage,
                count: 0,
                total_value: 0.0,
                deals: Vec::new(),
            })
            .collect();

        for view in deals {
            if let Some(column) = columns.iter_mut().find(|c| c.stage == view.deal.stage) {
                column.count += 1;
                column.total_value += view.deal.value;
                column.deals.push(view);
            }
        }
        Ok(columns)
    }

    async fn deal_view(&self, deal: Deal) -> Result<DealView> {
        let mut views = self.deal_views(vec![deal]).await?;
        views.pop().ok_or_else(|| Error::not_found("Deal"))
    }

    async fn deal_views(&self, deals: Vec<Deal>) -> Result<Vec<DealView>> {
        let contacts: HashMap<Uuid, ContactRef> = self
            .db()
            .contacts
            .list()
            .await?
            .iter()
            .map(|c| (c.id, c.summary()))
            .collect();
        let organizations = self.organization_names().await?;

        Ok(deals
            .into_iter()
            .map(|deal| DealView {
                contact: contacts.get(&deal.contact_id).cloned(),
                organization: organizations.get(&deal.organization_id).map(|name| NamedRef {
                    id: deal.organization_id,
                    name: name.clone(),
                }),
                deal,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Role;
    use crate::contact::Contact;
    use crate::organization::Organization;
    use crate::test_support::{open_test_crm, seed_contact, seed_organization, seed_user, TestCrm};

    async fn fixtures(crm: &TestCrm, owner: &Caller) -> (Contact, Organization) {
        let contact = seed_contact(crm, owner, "Jane", "jane@client.com").await;
        let org = seed_organization(crm, owner, "Acme").await;
        (contact, org)
    }

    fn draft(title: &str, value: f64, contact: &Contact, org: &Organization) -> DealDraft {
        DealDraft {
            title: Some(title.to_string()),
            value: Some(value),
            contact_id: Some(contact.id),
            organization_id: Some(org.id),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_requires_every_field_and_defaults_to_lead() {
        let (crm, _tmp) = open_test_crm().await;
        let bob = seed_user(&crm, "Bob", Role::User).await;
        let (contact, org) = fixtures(&crm, &bob).await;

        let complete = draft("Renewal", 1200.0, &contact, &org);
        let mut missing_title = complete.clone();
        missing_title.title = None;
        let mut missing_value = complete.clone();
        missing_value.value = None;
        let mut missing_contact = complete.clone();
        missing_contact.contact_id = None;
        let mut missing_org = complete.clone();
        missing_org.organization_id = None;

        for incomplete in [missing_title, missing_value, missing_contact, missing_org] {
            let err = crm.create_deal(&bob, incomplete).await.unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }

        let view = crm.create_deal(&bob, complete).await.unwrap();
        assert_eq!(view.deal.stage, DealStage::Lead);
        assert_eq!(view.deal.owner_id, bob.id);
        assert_eq!(view.contact.unwrap().first_name, "Jane");
        assert_eq!(view.organization.unwrap().name, "Acme");
    }

    #[tokio::test]
    async fn any_stage_moves_to_any_stage() {
        let (crm, _tmp) = open_test_crm().await;
        let bob = seed_user(&crm, "Bob", Role::User).await;
        let (contact, org) = fixtures(&crm, &bob).await;
        let deal = crm
            .create_deal(&bob, draft("Renewal", 100.0, &contact, &org))
            .await
            .unwrap()
            .deal;

        for from in DealStage::ALL {
            for to in DealStage::ALL {
                let set = |stage: DealStage| DealPatch {
                    stage: Some(stage.to_string()),
                    ..Default::default()
                };
                crm.update_deal(&bob, deal.id, set(from)).await.unwrap();
                let moved = crm.update_deal(&bob, deal.id, set(to)).await.unwrap();
                assert_eq!(moved.deal.stage, to);
            }
        }

        let bad = crm
            .update_deal(
                &bob,
                deal.id,
                DealPatch {
                    stage: Some("Negotiation".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(bad, Error::Validation(_)));
    }

    #[tokio::test]
    async fn ownership_scopes_reads_and_writes() {
        let (crm, _tmp) = open_test_crm().await;
        let admin = seed_user(&crm, "Root", Role::Admin).await;
        let bob = seed_user(&crm, "Bob", Role::User).await;
        let eve = seed_user(&crm, "Eve", Role::User).await;
        let (contact, org) = fixtures(&crm, &bob).await;

        let bobs = crm
            .create_deal(&bob, draft("Bob deal", 10.0, &contact, &org))
            .await
            .unwrap()
            .deal;
        crm.create_deal(&eve, draft("Eve deal", 20.0, &contact, &org))
            .await
            .unwrap();

        let listed = crm.list_deals(&bob, DealFilter::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].deal.owner_id, bob.id);
        assert_eq!(crm.list_deals(&admin, DealFilter::default()).await.unwrap().len(), 2);

        assert!(matches!(
            crm.get_deal(&eve, bobs.id).await.unwrap_err(),
            Error::NotAuthorized(_)
        ));
        assert!(matches!(
            crm.delete_deal(&eve, bobs.id).await.unwrap_err(),
            Error::NotAuthorized(_)
        ));
        assert!(matches!(
            crm.delete_deal(&eve, Uuid::new_v4()).await.unwrap_err(),
            Error::NotFound(_)
        ));
        crm.delete_deal(&admin, bobs.id).await.unwrap();
        assert!(crm.list_deals(&bob, DealFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_filters_by_organization() {
        let (crm, _tmp) = open_test_crm().await;
        let bob = seed_user(&crm, "Bob", Role::User).await;
        let (contact, acme) = fixtures(&crm, &bob).await;
        let globex = seed_organization(&crm, &bob, "Globex").await;

        crm.create_deal(&bob, draft("A", 1.0, &contact, &acme)).await.unwrap();
        crm.create_deal(&bob, draft("G", 2.0, &contact, &globex)).await.unwrap();

        let at_globex = crm
            .list_deals(
                &bob,
                DealFilter {
                    organization: Some(globex.id),
                },
            )
            .await
            .unwrap();
        assert_eq!(at_globex.len(), 1);
        assert_eq!(at_globex[0].deal.title, "G");
    }

    #[tokio::test]
    async fn board_groups_by_stage_in_pipeline_order() {
        let (crm, _tmp) = open_test_crm().await;
        let bob = seed_user(&crm, "Bob", Role::User).await;
        let (contact, org) = fixtures(&crm, &bob).await;

        crm.create_deal(&bob, draft("One", 100.0, &contact, &org)).await.unwrap();
        crm.create_deal(&bob, draft("Two", 250.0, &contact, &org)).await.unwrap();
        let mut won = draft("Three", 1000.0, &contact, &org);
        won.stage = Some("Won".into());
        crm.create_deal(&bob, won).await.unwrap();

        let board = crm.pipeline_board(&bob).await.unwrap();
        let stages: Vec<DealStage> = board.iter().map(|c| c.stage).collect();
        assert_eq!(stages, DealStage::ALL.to_vec());

        assert_eq!(board[0].count, 2);
        assert_eq!(board[0].total_value, 350.0);
        assert_eq!(board[3].count, 1);
        assert_eq!(board[3].total_value, 1000.0);
        assert_eq!(board[1].count, 0);
        assert!(board[1].deals.is_empty());
    }

    #[tokio::test]
    async fn close_date_can_be_set_and_cleared() {
        let (crm, _tmp) = open_test_crm().await;
        let bob = seed_user(&crm, "Bob", Role::User).await;
        let (contact, org) = fixtures(&crm, &bob).await;
        let view = crm
            .create_deal(&bob, draft("Renewal", 900.0, &contact, &org))
            .await
            .unwrap();

        let set: DealPatch = serde_json::from_str(r#"{"closeDate": "2030-03-01"}"#).unwrap();
        let updated = crm.update_deal(&bob, view.deal.id, set).await.unwrap();
        assert!(updated.deal.close_date.is_some());

        let untouched: DealPatch = serde_json::from_str(r#"{"title": "Renewal 2030"}"#).unwrap();
        let updated = crm.update_deal(&bob, view.deal.id, untouched).await.unwrap();
        assert!(updated.deal.close_date.is_some());

        let cleared: DealPatch = serde_json::from_str(r#"{"closeDate": ""}"#).unwrap();
        let updated = crm.update_deal(&bob, view.deal.id, cleared).await.unwrap();
        assert!(updated.deal.close_date.is_none());
        assert_eq!(updated.deal.title, "Renewal 2030");
    }
}
