//! Contact form leads.

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::model::{self, Enquiry, EnquiryPatch, EnquiryStatus, NewEnquiry, Record};
use crate::storage::Storage;

use super::{clean_ids, BulkOutcome, EnquiryBulkAction};

const MAX_NAME_CHARS: usize = 120;
const MAX_MESSAGE_CHARS: usize = 5000;
const MAX_NOTES_CHARS: usize = 5000;
const MAX_SHORT_CHARS: usize = 120;

/// Inbox filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnquiryQuery {
    /// Pipeline stage.
    pub status: Option<EnquiryStatus>,
    /// Free-text search over name, email, company and message.
    pub q: Option<String>,
}

/// What happened to a contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The lead was stored.
    Stored(Enquiry),
    /// The honeypot was filled; nothing was stored.
    Discarded,
}

/// Enquiry service facade.
#[derive(Debug)]
pub struct EnquiryService<'a> {
    storage: &'a Storage,
}

impl<'a> EnquiryService<'a> {
    /// Create a service over the given storage.
    #[must_use]
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record a contact form submission.
    ///
    /// # Errors
    ///
    /// Returns a validation error for missing or malformed fields.
    pub fn submit(&self, form: NewEnquiry) -> Result<SubmitOutcome> {
        if form.is_bot() {
            warn!("Discarded contact form submission with filled honeypot");
            return Ok(SubmitOutcome::Discarded);
        }

        let now = Utc::now();
        let enquiry = Enquiry {
            id: model::new_id(),
            name: model::required("name", &form.name, MAX_NAME_CHARS)?,
            email: model::normalize_email("email", &form.email)?,
            phone: model::optional("phone", form.phone.as_deref(), 40)?,
            company: model::optional("company", form.company.as_deref(), MAX_SHORT_CHARS)?,
            service: model::optional("service", form.service.as_deref(), MAX_SHORT_CHARS)?,
            budget: model::optional("budget", form.budget.as_deref(), MAX_SHORT_CHARS)?,
            message: model::required("message", &form.message, MAX_MESSAGE_CHARS)?,
            source: model::optional("source", form.source.as_deref(), MAX_SHORT_CHARS)?,
            status: EnquiryStatus::New,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        };

        let enquiry = self.storage.enquiries.insert(enquiry)?;
        info!(id = %enquiry.id, service = ?enquiry.service, "Received enquiry");
        Ok(SubmitOutcome::Stored(enquiry))
    }

    /// Leads matching the filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the enquiry file cannot be read.
    pub fn list(&self, query: &EnquiryQuery) -> Result<Vec<Enquiry>> {
        let mut enquiries = self.storage.enquiries.filter(|e| {
            query.status.map_or(true, |s| e.status == s)
                && query.q.as_deref().map_or(true, |q| e.matches_query(q))
        })?;
        enquiries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(enquiries)
    }

    /// One lead by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id is unknown.
    pub fn get(&self, id: &str) -> Result<Enquiry> {
        self.storage.enquiries.require(id)
    }

    /// Change a lead's stage or notes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id or a validation error for
    /// over-long notes.
    pub fn update(&self, id: &str, patch: EnquiryPatch) -> Result<Enquiry> {
        let notes = match patch.notes {
            Some(notes) if notes.chars().count() > MAX_NOTES_CHARS => {
                return Err(Error::validation(
                    "notes",
                    format!("must be at most {MAX_NOTES_CHARS} characters"),
                ))
            }
            other => other,
        };

        let now = Utc::now();
        let enquiry = self.storage.enquiries.update(id, |e| {
            if let Some(status) = patch.status {
                e.status = status;
            }
            if let Some(notes) = notes {
                e.notes = notes;
            }
            e.updated_at = now;
            Ok(())
        })?;
        info!(id, status = %enquiry.status, "Updated enquiry");
        Ok(enquiry)
    }

    /// Delete a lead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id is unknown.
    pub fn delete(&self, id: &str) -> Result<()> {
        if !self.storage.enquiries.delete(id)? {
            return Err(Error::not_found(Enquiry::COLLECTION, id));
        }
        info!(id, "Deleted enquiry");
        Ok(())
    }

    /// Apply one action to many leads.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty id list, or for `set_status`
    /// without a status.
    pub fn bulk(
        &self,
        action: EnquiryBulkAction,
        ids: &[String],
        status: Option<EnquiryStatus>,
    ) -> Result<BulkOutcome> {
        let ids = clean_ids(ids)?;
        let affected = match action {
            EnquiryBulkAction::Delete => self.storage.enquiries.delete_many(&ids)?,
            EnquiryBulkAction::SetStatus => {
                let status = status
                    .ok_or_else(|| Error::validation("status", "is required for set_status"))?;
                let now = Utc::now();
                self.storage.enquiries.update_many(&ids, |e| {
                    e.status = status;
                    e.updated_at = now;
                })?
            }
        };
        info!(action = ?action, requested = ids.len(), affected, "Bulk enquiry action");
        Ok(BulkOutcome::new(action, ids.len(), affected))
    }
}
