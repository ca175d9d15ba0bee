//! Authentication collaborator: users, cookie sessions and the
//! [`SessionProvider`] seam the dashboard gate talks to.

pub mod db;
pub mod error;
pub mod sessions;
pub mod users;

use async_trait::async_trait;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub use db::Db;
pub use error::{AuthError, AuthResult};
pub use sessions::{SessionRecord, SessionStore};
pub use users::{NewUser, User, UserStore};

/// Identity attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub expires_at: DateTime<Utc>,
    pub user: SessionUser,
}

/// Resolves the session for a request from its headers.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// `Ok(None)` when the request carries no valid session.
    async fn get_session(&self, headers: &HeaderMap) -> AuthResult<Option<Session>>;
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub session_cookie: String,
    pub session_ttl: TimeDelta,
    pub remember_ttl: TimeDelta,
}

impl AuthSettings {
    /// Fails when either lifetime is zero or does not fit a [`TimeDelta`].
    pub fn new(
        session_cookie: impl Into<String>,
        ttl_hours: u64,
        remember_days: u64,
    ) -> AuthResult<Self> {
        let session_ttl = i64::try_from(ttl_hours)
            .ok()
            .filter(|h| *h > 0)
            .and_then(TimeDelta::try_hours)
            .ok_or_else(|| AuthError::InvalidSetting(format!("session ttl of {ttl_hours} hours")))?;
        let remember_ttl = i64::try_from(remember_days)
            .ok()
            .filter(|d| *d > 0)
            .and_then(TimeDelta::try_days)
            .ok_or_else(|| {
                AuthError::InvalidSetting(format!("remember-me ttl of {remember_days} days"))
            })?;

        Ok(Self {
            session_cookie: session_cookie.into(),
            session_ttl,
            remember_ttl,
        })
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            session_cookie: "auth_session".to_string(),
            session_ttl: TimeDelta::hours(24),
            remember_ttl: TimeDelta::days(30),
        }
    }
}

pub struct AuthService {
    pub users: UserStore,
    pub sessions: SessionStore,
    pub settings: AuthSettings,
}

impl AuthService {
    pub fn open(path: &Path, settings: AuthSettings) -> AuthResult<Self> {
        Ok(Self::with_db(Db::open(path)?, settings))
    }

    pub fn in_memory(settings: AuthSettings) -> AuthResult<Self> {
        Ok(Self::with_db(Db::open_in_memory()?, settings))
    }

    fn with_db(db: Db, settings: AuthSettings) -> Self {
        Self {
            users: UserStore::new(db.clone()),
            sessions: SessionStore::new(db, settings.session_ttl, settings.remember_ttl),
            settings,
        }
    }

    /// Session id carried by the request's session cookie, if any.
    pub fn session_id(&self, headers: &HeaderMap) -> Option<String> {
        CookieJar::from_headers(headers)
            .get(&self.settings.session_cookie)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Look up a session by id, joined with its (enabled) user.
    pub fn session_by_id(&self, session_id: &str) -> AuthResult<Option<Session>> {
        let Some(record) = self.sessions.validate(session_id)? else {
            return Ok(None);
        };
        let user = match self.users.get(&record.user_id)? {
            Some(user) if !user.disabled => user,
            Some(_) => {
                debug!(user_id = %record.user_id, "Session belongs to a disabled user");
                return Ok(None);
            }
            None => return Ok(None),
        };

        Ok(Some(Session {
            expires_at: sessions::expiry_of(&record)?,
            id: record.id,
            user: SessionUser {
                id: user.id,
                name: user.name,
                email: user.email,
                image: user.image,
            },
        }))
    }
}

#[async_trait]
impl SessionProvider for AuthService {
    async fn get_session(&self, headers: &HeaderMap) -> AuthResult<Option<Session>> {
        match self.session_id(headers) {
            Some(id) => self.session_by_id(&id),
            None => Ok(None),
        }
    }
}
