use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::Role;

/// The client-persisted proof of a current login.
///
/// Serialized into the `sc_session` cookie at login and read back by every
/// guard check. The paired [`UserProfile`](crate::models::user::UserProfile)
/// is the durable identity record; this is the ephemeral one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The ID of the user this session belongs to.
    pub user_id: Uuid,
    /// The email the user signed in with.
    pub email: String,
    /// The role at login time.
    pub role: Role,
    /// The timestamp of the login that created this session.
    pub login_time: DateTime<Utc>,
}

impl Session {
    /// Whether the session has outlived the maximum age.
    ///
    /// A session is valid strictly while `now - login_time < max_age`; at the
    /// boundary it is already expired.
    pub fn is_expired(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        now - self.login_time >= max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_logged_in_hours_ago(hours: i64) -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: "test@skillconnect.co.ke".to_string(),
            role: Role::Seeker,
            login_time: Utc::now() - Duration::hours(hours),
        }
    }

    #[test]
    fn fresh_session_is_not_expired() {
        let session = session_logged_in_hours_ago(1);
        assert!(!session.is_expired(Utc::now(), Duration::hours(24)));
    }

    #[test]
    fn session_older_than_max_age_is_expired() {
        let session = session_logged_in_hours_ago(25);
        assert!(session.is_expired(Utc::now(), Duration::hours(24)));
    }

    #[test]
    fn session_exactly_at_max_age_is_expired() {
        let session = Session {
            user_id: Uuid::new_v4(),
            email: "test@skillconnect.co.ke".to_string(),
            role: Role::Employer,
            login_time: Utc::now(),
        };
        let now = session.login_time + Duration::hours(24);
        assert!(session.is_expired(now, Duration::hours(24)));
    }
}
