//! Bulk contact import from CSV.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::model::Contact;
use crate::access::Caller;
use crate::serde_util::empty_string_as_none;
use crate::store::Repository;
use crate::{Crm, Result};

/// Outcome of an import. Rows are processed independently; a failed row never
/// undoes earlier ones.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub created: usize,
    pub errors: usize,
    pub error_details: Vec<String>,
}

impl ImportSummary {
    fn skip(&mut self, detail: String) {
        self.errors += 1;
        self.error_details.push(detail);
    }
}

/// Recognised columns; anything else in the header is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    first_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    last_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    email: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    phone: Option<String>,
}

impl Crm {
    pub async fn import_contacts(&self, caller: &Caller, data: &[u8]) -> Result<ImportSummary> {
        let mut known: HashSet<String> = self
            .db()
            .contacts
            .find(&|c: &Contact| c.owner_id == caller.id)
            .await?
            .into_iter()
            .map(|c| c.email.to_lowercase())
            .collect();

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(data);

        let mut summary = ImportSummary::default();
        for (index, row) in reader.deserialize::<ImportRow>().enumerate() {
            // Header is line 1.
            let line = index + 2;
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    summary.skip(format!("Skipped row {}: {}", line, err));
                    continue;
                }
            };

            let (Some(first_name), Some(last_name), Some(email)) =
                (row.first_name, row.last_name, row.email)
            else {
                summary.skip(format!(
                    "Skipped row {} due to missing required fields",
                    line
                ));
                continue;
            };

            if !known.insert(email.to_lowercase()) {
                summary.skip(format!("Skipped duplicate email: {}", email));
                continue;
            }

            let mut contact = Contact::new(first_name, last_name, email.clone(), caller.id);
            contact.phone = row.phone;
            match self.db().contacts.insert(contact).await {
                Ok(_) => summary.created += 1,
                Err(err) => summary.skip(format!("Error importing {}: {}", email, err)),
            }
        }

        tracing::info!(
            user_id = %caller.id,
            created = summary.created,
            errors = summary.errors,
            "contact import finished"
        );
        Ok(summary)
    }
}
