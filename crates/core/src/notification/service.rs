use super::model::Notification;
use crate::access::Caller;
use crate::store::Repository;
use crate::{Crm, Result};

/// How many notifications a listing returns.
pub const NOTIFICATION_PAGE_SIZE: usize = 20;

impl Crm {
    /// The caller's most recent notifications, newest first.
    pub async fn list_notifications(&self, caller: &Caller) -> Result<Vec<Notification>> {
        let mut notifications = self
            .db()
            .notifications
            .find(&|n: &Notification| n.recipient == caller.id)
            .await?;
        notifications.truncate(NOTIFICATION_PAGE_SIZE);
        Ok(notifications)
    }

    /// Mark every unread notification of the caller as read. Returns how many
    /// changed.
    pub async fn mark_all_read(&self, caller: &Caller) -> Result<usize> {
        let changed = self
            .db()
            .notifications
            .update_many(
                &|n: &Notification| n.recipient == caller.id && !n.read,
                &|n: &mut Notification| n.read = true,
            )
            .await?;
        tracing::debug!(user_id = %caller.id, changed, "notifications marked read");
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Role;
    use crate::test_support::{open_test_crm, seed_user};

    #[tokio::test]
    async fn listing_is_capped_and_scoped_to_recipient() {
        let (crm, _tmp) = open_test_crm().await;
        let bob = seed_user(&crm, "Bob", Role::User).await;
        let eve = seed_user(&crm, "Eve", Role::User).await;

        for i in 0..25 {
            crm.db()
                .notifications
                .insert(Notification::new(bob.id, format!("note {}", i)))
                .await
                .unwrap();
        }
        crm.db()
            .notifications
            .insert(Notification::new(eve.id, "for eve"))
            .await
            .unwrap();

        let listed = crm.list_notifications(&bob).await.unwrap();
        assert_eq!(listed.len(), NOTIFICATION_PAGE_SIZE);
        assert!(listed.iter().all(|n| n.recipient == bob.id));
        assert!(listed
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[tokio::test]
    async fn mark_all_read_is_idempotent() {
        let (crm, _tmp) = open_test_crm().await;
        let bob = seed_user(&crm, "Bob", Role::User).await;
        let eve = seed_user(&crm, "Eve", Role::User).await;

        for recipient in [bob.id, bob.id, eve.id] {
            crm.db()
                .notifications
                .insert(Notification::new(recipient, "hello"))
                .await
                .unwrap();
        }

        assert_eq!(crm.mark_all_read(&bob).await.unwrap(), 2);
        assert_eq!(crm.mark_all_read(&bob).await.unwrap(), 0);
        assert!(crm
            .list_notifications(&bob)
            .await
            .unwrap()
            .iter()
            .all(|n| n.read));
        assert!(crm
            .list_notifications(&eve)
            .await
            .unwrap()
            .iter()
            .all(|n| !n.read));
    }
}
