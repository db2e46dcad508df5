use std::cmp::Ordering;
use std::collections::HashMap;

use uuid::Uuid;

use super::model::{Activity, ActivityDraft, ActivityKind, TaskStatus, TaskView};
use crate::access::{authorize, Caller};
use crate::contact::ContactRef;
use crate::store::Repository;
use crate::{Crm, Error, Result};

/// Ascending by date with undated entries last.
fn by_date_undated_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl Crm {
    /// Activities logged against a contact, most recently scheduled first.
    pub async fn list_activities(&self, caller: &Caller, contact_id: Uuid) -> Result<Vec<Activity>> {
        let contact = self.accessible_contact(caller, contact_id).await?;
        let mut activities = self
            .db()
            .activities
            .find(&|a: &Activity| a.contact_id == Some(contact.id))
            .await?;
        activities.sort_by(|a, b| match (a.scheduled_at, b.scheduled_at) {
            (Some(x), Some(y)) => y.cmp(&x),
            _ => by_date_undated_last(&a.scheduled_at, &b.scheduled_at),
        });
        Ok(activities)
    }

    pub async fn create_activity(
        &self,
        caller: &Caller,
        contact_id: Uuid,
        draft: ActivityDraft,
    ) -> Result<Activity> {
        let (Some(kind), Some(subject)) = (draft.kind, draft.subject) else {
            return Err(Error::validation("Kind and subject are required"));
        };
        let kind: ActivityKind = kind.parse()?;
        let contact = self.accessible_contact(caller, contact_id).await?;

        let mut activity = Activity::new(kind, subject.trim(), caller.id);
        activity.body = draft.body;
        activity.scheduled_at = draft.scheduled_at;
        activity.due_date = draft.due_date;
        activity.deal_id = draft.deal_id;
        activity.assigned_to = draft.assigned_to;
        activity.contact_id = Some(contact.id);

        let activity = self.db().activities.insert(activity).await?;
        tracing::info!(
            user_id = %caller.id,
            contact_id = %contact.id,
            kind = %activity.kind,
            "activity logged"
        );
        Ok(activity)
    }

    /// The caller's own tasks, earliest due date first.
    pub async fn list_tasks(&self, caller: &Caller) -> Result<Vec<TaskView>> {
        let mut tasks = self
            .db()
            .activities
            .find(&|a: &Activity| a.user_id == caller.id && a.kind == ActivityKind::Task)
            .await?;
        tasks.sort_by(|a, b| by_date_undated_last(&a.due_date, &b.due_date));

        let contacts: HashMap<Uuid, ContactRef> = self
            .db()
            .contacts
            .list()
            .await?
            .iter()
            .map(|c| (c.id, c.summary()))
            .collect();

        Ok(tasks
            .into_iter()
            .map(|activity| TaskView {
                contact: activity
                    .contact_id
                    .and_then(|id| contacts.get(&id).cloned()),
                effective_date: activity.effective_date(),
                activity,
            })
            .collect())
    }

    pub async fn update_task_status(&self, caller: &Caller, id: Uuid, status: &str) -> Result<Activity> {
        let mut task = authorize(self.db().activities.get(id).await?, caller, "Task")?;
        if task.kind != ActivityKind::Task {
            return Err(Error::validation("This activity is not a task"));
        }

        task.status = status.parse::<TaskStatus>()?;
        let task = self.db().activities.update(task).await?;
        tracing::info!(user_id = %caller.id, task_id = %task.id, status = ?task.status, "task status updated");
        Ok(task)
    }
}
