use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The review state of a job application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSql, FromSql)]
#[serde(rename_all = "lowercase")]
#[postgres(name = "application_status")]
pub enum ApplicationStatus {
    /// Submitted by the seeker, not yet looked at.
    #[postgres(name = "submitted")]
    Submitted,
    /// Seen by the employer.
    #[postgres(name = "reviewed")]
    Reviewed,
    /// Accepted by the employer.
    #[postgres(name = "accepted")]
    Accepted,
    /// Rejected by the employer.
    #[postgres(name = "rejected")]
    Rejected,
}

impl ApplicationStatus {
    /// The lowercase wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

/// Represents a seeker's application to a job posting.
#[derive(Clone, Debug)]
pub struct Application {
    /// The unique identifier for the application.
    pub id: Uuid,
    /// The posting being applied to.
    pub job_id: Uuid,
    /// The seeker account that applied.
    pub seeker_id: Uuid,
    /// The cover letter submitted with the application.
    pub cover_letter: String,
    /// The current review state.
    pub status: ApplicationStatus,
    /// The timestamp when the application was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the application was last updated.
    pub updated_at: DateTime<Utc>,
}
