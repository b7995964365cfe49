use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Represents a job posting.
#[derive(Clone, Debug)]
pub struct Job {
    /// The unique identifier for the posting.
    pub id: Uuid,
    /// The employer account that owns the posting.
    pub employer_id: Uuid,
    /// The job title.
    pub title: String,
    /// The job description.
    pub description: String,
    /// The job location (county or town).
    pub location: String,
    /// The job category (e.g. "construction", "hospitality", "it").
    pub category: String,
    /// Optional lower salary bound, in KES per month.
    pub salary_min: Option<i64>,
    /// Optional upper salary bound, in KES per month.
    pub salary_max: Option<i64>,
    /// Whether the posting still accepts applications.
    pub is_open: bool,
    /// The timestamp when the posting was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the posting was last updated.
    pub updated_at: DateTime<Utc>,
}
