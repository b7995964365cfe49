use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of an account on the platform.
///
/// Adding a role here forces the compiler through every match below, so the
/// dashboard mapping and the guards stay exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSql, FromSql)]
#[serde(rename_all = "lowercase")]
#[postgres(name = "user_role")]
pub enum Role {
    /// A job seeker browsing and applying to postings.
    #[postgres(name = "seeker")]
    Seeker,
    /// An employer posting jobs and reviewing applicants.
    #[postgres(name = "employer")]
    Employer,
    /// A platform administrator moderating users and postings.
    #[postgres(name = "admin")]
    Admin,
}

impl Role {
    /// The dashboard route a signed-in account of this role lands on.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Seeker => "/dashboard/seeker",
            Role::Employer => "/dashboard/employer",
            Role::Admin => "/dashboard/admin",
        }
    }

    /// The lowercase wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Seeker => "seeker",
            Role::Employer => "employer",
            Role::Admin => "admin",
        }
    }
}

/// Represents a user row in the database.
#[derive(Clone, Debug)]
pub struct User {
    /// The unique identifier for the user.
    pub id: Uuid,
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// The user's email address.
    pub email: String,
    /// The user's hashed password.
    pub password: String,
    /// The user's role.
    pub role: Role,
    /// Seeker: skills offered.
    pub skills: Vec<String>,
    /// Seeker: years of work experience.
    pub experience_years: Option<i32>,
    /// Employer: company name.
    pub company_name: Option<String>,
    /// Employer: company size bracket (e.g. "1-10", "11-50").
    pub company_size: Option<String>,
    /// Employer: industry.
    pub industry: Option<String>,
    /// Whether the user is active. Deactivated accounts cannot sign in.
    pub is_active: bool,
    /// The timestamp when the user was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The client-persisted profile record, mirroring the durable identity row.
///
/// This is what gets serialized into the `sc_profile` cookie and returned by
/// profile endpoints. It never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub skills: Vec<String>,
    pub experience_years: Option<i32>,
    pub company_name: Option<String>,
    pub company_size: Option<String>,
    pub industry: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role,
            skills: user.skills.clone(),
            experience_years: user.experience_years,
            company_name: user.company_name.clone(),
            company_size: user.company_size.clone(),
            industry: user.industry.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_role_maps_to_its_own_dashboard() {
        assert_eq!(Role::Seeker.dashboard_path(), "/dashboard/seeker");
        assert_eq!(Role::Employer.dashboard_path(), "/dashboard/employer");
        assert_eq!(Role::Admin.dashboard_path(), "/dashboard/admin");
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Employer).unwrap(), r#""employer""#);
        assert_eq!(
            serde_json::from_str::<Role>(r#""seeker""#).unwrap(),
            Role::Seeker
        );
    }
}
