use base64::{Engine as _, engine::general_purpose};
use chrono::{Duration, Utc};
use serde::{Serialize, de::DeserializeOwned};
use tower_cookies::{Cookie, Cookies, cookie::SameSite};
use tower_cookies::cookie::time;

use crate::error::{AppError, Result};
use crate::models::{session::Session, user::UserProfile};

/// The cookie holding the JSON-serialized session record.
pub const SESSION_COOKIE: &str = "sc_session";

/// The cookie holding the JSON-serialized profile record.
pub const PROFILE_COOKIE: &str = "sc_profile";

/// Serializes a record for cookie storage (JSON, then URL-safe base64 so the
/// value stays within the cookie character set).
pub(crate) fn encode_record<T: Serialize>(record: &T) -> Result<String> {
    let json = sonic_rs::to_string(record)
        .map_err(|e| AppError::Internal(format!("Record serialization failed: {}", e)))?;
    Ok(general_purpose::URL_SAFE_NO_PAD.encode(json.as_bytes()))
}

/// Deserializes a cookie-stored record. Returns `None` on any malformed
/// input; the caller decides whether to purge.
pub(crate) fn decode_record<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let bytes = general_purpose::URL_SAFE_NO_PAD.decode(raw).ok()?;
    sonic_rs::from_slice(&bytes).ok()
}

/// The single reader/writer of the client-persisted session and profile
/// records.
///
/// Every guard check goes through here, and the session-expiry invariant is
/// enforced in exactly one place: an expired or malformed record is purged
/// and reads back as absent.
pub struct SessionStore {
    cookies: Cookies,
    max_age: Duration,
}

impl SessionStore {
    /// Creates a store over the request's cookies.
    pub fn new(cookies: Cookies, max_age_hours: i64) -> Self {
        Self {
            cookies,
            max_age: Duration::hours(max_age_hours),
        }
    }

    /// Reads the session record.
    ///
    /// An expired session purges both records (session and paired profile)
    /// and reads as absent. A malformed record does the same.
    pub fn session(&self) -> Option<Session> {
        let raw = self.cookies.get(SESSION_COOKIE)?.value().to_string();

        let Some(session) = decode_record::<Session>(&raw) else {
            tracing::warn!("❌ Malformed session record, purging");
            self.clear();
            return None;
        };

        if session.is_expired(Utc::now(), self.max_age) {
            tracing::debug!("Session expired for user {}, purging", session.user_id);
            self.clear();
            return None;
        }

        Some(session)
    }

    /// Reads the profile record. Malformed records are purged defensively.
    pub fn profile(&self) -> Option<UserProfile> {
        let raw = self.cookies.get(PROFILE_COOKIE)?.value().to_string();

        let Some(profile) = decode_record::<UserProfile>(&raw) else {
            tracing::warn!("❌ Malformed profile record, purging");
            self.clear();
            return None;
        };

        Some(profile)
    }

    /// Writes both records, overwriting whatever was there.
    pub fn persist(&self, session: &Session, profile: &UserProfile) -> Result<()> {
        self.cookies
            .add(self.record_cookie(SESSION_COOKIE, encode_record(session)?));
        self.cookies
            .add(self.record_cookie(PROFILE_COOKIE, encode_record(profile)?));
        Ok(())
    }

    /// Deletes both records.
    pub fn clear(&self) {
        for name in [SESSION_COOKIE, PROFILE_COOKIE] {
            let mut cookie = Cookie::new(name, "");
            cookie.set_max_age(time::Duration::seconds(0));
            cookie.set_path("/");
            self.cookies.remove(cookie);
        }
    }

    /// Builds a record cookie scoped to the session lifetime.
    fn record_cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(name, value);
        cookie.set_http_only(true);
        cookie.set_secure(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_path("/");
        cookie.set_max_age(time::Duration::seconds(self.max_age.num_seconds()));
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use uuid::Uuid;

    #[test]
    fn records_round_trip_through_cookie_encoding() {
        let session = Session {
            user_id: Uuid::new_v4(),
            email: "amina@skillconnect.co.ke".to_string(),
            role: Role::Seeker,
            login_time: Utc::now(),
        };

        let encoded = encode_record(&session).unwrap();
        let decoded: Session = decode_record(&encoded).expect("decodes");
        assert_eq!(decoded.user_id, session.user_id);
        assert_eq!(decoded.role, Role::Seeker);
    }

    #[test]
    fn truncated_record_reads_as_absent() {
        let session = Session {
            user_id: Uuid::new_v4(),
            email: "amina@skillconnect.co.ke".to_string(),
            role: Role::Seeker,
            login_time: Utc::now(),
        };

        let encoded = encode_record(&session).unwrap();
        let truncated = &encoded[..encoded.len() / 2];
        assert!(decode_record::<Session>(truncated).is_none());
    }

    #[test]
    fn garbage_record_reads_as_absent() {
        assert!(decode_record::<Session>("not base64 at all!!!").is_none());
        // Valid base64, invalid JSON.
        let garbage = general_purpose::URL_SAFE_NO_PAD.encode(b"{\"user_id\": 12");
        assert!(decode_record::<Session>(&garbage).is_none());
    }
}
