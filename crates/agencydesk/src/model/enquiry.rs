//! Enquiries (leads) submitted through the contact form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;

/// Pipeline stage of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnquiryStatus {
    /// Not yet looked at.
    #[default]
    New,
    /// First reply sent.
    Contacted,
    /// Budget and fit confirmed.
    Qualified,
    /// Became a client.
    Won,
    /// Did not proceed.
    Lost,
    /// Hidden from the default inbox.
    Archived,
}

impl EnquiryStatus {
    /// All stages in pipeline order.
    pub const ALL: [Self; 6] = [
        Self::New,
        Self::Contacted,
        Self::Qualified,
        Self::Won,
        Self::Lost,
        Self::Archived,
    ];
}

impl std::fmt::Display for EnquiryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Contacted => write!(f, "contacted"),
            Self::Qualified => write!(f, "qualified"),
            Self::Won => write!(f, "won"),
            Self::Lost => write!(f, "lost"),
            Self::Archived => write!(f, "archived"),
        }
    }
}

/// A lead as stored in `enquiries.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enquiry {
    /// Unique identifier.
    pub id: String,
    /// Contact name.
    pub name: String,
    /// Contact email, lowercased.
    pub email: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Organisation.
    pub company: Option<String>,
    /// Service the lead is interested in.
    pub service: Option<String>,
    /// Budget bracket as chosen on the form.
    pub budget: Option<String>,
    /// Free-text message.
    pub message: String,
    /// Page the form was submitted from.
    pub source: Option<String>,
    /// Pipeline stage.
    pub status: EnquiryStatus,
    /// Internal notes from the team.
    pub notes: String,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Record for Enquiry {
    const COLLECTION: &'static str = "enquiries";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "email",
        "phone",
        "company",
        "service",
        "budget",
        "message",
        "source",
        "status",
        "notes",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }
}

impl Enquiry {
    /// Case-insensitive match against name, email, company and message.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.email.contains(&needle)
            || self
                .company
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&needle))
            || self.message.to_lowercase().contains(&needle)
    }
}

/// Contact form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewEnquiry {
    /// Contact name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Organisation.
    pub company: Option<String>,
    /// Service of interest.
    pub service: Option<String>,
    /// Budget bracket.
    pub budget: Option<String>,
    /// Message body.
    pub message: String,
    /// Submitting page.
    pub source: Option<String>,
    /// Honeypot; real visitors leave it empty.
    pub website: Option<String>,
}

impl NewEnquiry {
    /// Whether the hidden honeypot field was filled in.
    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.website.as_deref().is_some_and(|w| !w.trim().is_empty())
    }
}

/// Admin update to a lead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnquiryPatch {
    /// New pipeline stage.
    pub status: Option<EnquiryStatus>,
    /// Replacement notes.
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_enquiry() -> Enquiry {
        let now = Utc::now();
        Enquiry {
            id: "enq-1".to_string(),
            name: "Grace Hopper".to_string(),
            email: "grace@navy.mil".to_string(),
            phone: None,
            company: Some("US Navy".to_string()),
            service: Some("Web Development".to_string()),
            budget: Some("10k-25k".to_string()),
            message: "We need a new site, with a \"compiler\" theme,\nplease.".to_string(),
            source: Some("/contact".to_string()),
            status: EnquiryStatus::New,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_header_matches_columns() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(sample_enquiry()).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(text.lines().next().unwrap(), Enquiry::COLUMNS.join(","));
    }

    #[test]
    fn test_status_display_matches_serde() {
        for status in EnquiryStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn test_matches_query() {
        let enquiry = sample_enquiry();
        assert!(enquiry.matches_query("grace"));
        assert!(enquiry.matches_query("NAVY"));
        assert!(enquiry.matches_query("compiler"));
        assert!(!enquiry.matches_query("cobol"));
    }

    #[test]
    fn test_honeypot() {
        let mut form = NewEnquiry::default();
        assert!(!form.is_bot());
        form.website = Some("  ".to_string());
        assert!(!form.is_bot());
        form.website = Some("http://spam.example".to_string());
        assert!(form.is_bot());
    }
}
