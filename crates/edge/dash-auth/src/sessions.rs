use chrono::{DateTime, TimeDelta, Utc};
use rand_core::{OsRng, RngCore};
use rusqlite::{OptionalExtension, params};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::Db;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: String,
    pub created_at: i64,
    pub expires_at: i64,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

pub struct SessionStore {
    db: Db,
    ttl: TimeDelta,
    remember_ttl: TimeDelta,
}

fn new_session_id() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

impl SessionStore {
    pub fn new(db: Db, ttl: TimeDelta, remember_ttl: TimeDelta) -> Self {
        Self {
            db,
            ttl,
            remember_ttl,
        }
    }

    /// Open a session for `user_id`. Returns the session id and its expiry.
    pub fn create(
        &self,
        user_id: &str,
        ip: Option<&str>,
        user_agent: Option<&str>,
        remember: bool,
    ) -> AuthResult<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let ttl = if remember { self.remember_ttl } else { self.ttl };
        let expires = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::InvalidSetting(format!("session lifetime {ttl} overflows")))?;
        let id = new_session_id();

        let conn = self.db.lock()?;
        conn.execute(
            "INSERT INTO sessions (id, user_id, created_at, expires_at, ip, user_agent)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, user_id, now.timestamp(), expires.timestamp(), ip, user_agent],
        )?;
        debug!(user_id, remember, "Session created");
        Ok((id, expires))
    }

    /// The session if it exists and has not expired.
    pub fn validate(&self, id: &str) -> AuthResult<Option<SessionRecord>> {
        let conn = self.db.lock()?;
        let record = conn
            .query_row(
                "SELECT id, user_id, created_at, expires_at, ip, user_agent
                 FROM sessions WHERE id = ?1 AND expires_at > ?2",
                params![id, Utc::now().timestamp()],
                |row| {
                    Ok(SessionRecord {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        created_at: row.get(2)?,
                        expires_at: row.get(3)?,
                        ip: row.get(4)?,
                        user_agent: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    pub fn delete(&self, id: &str) -> AuthResult<bool> {
        let conn = self.db.lock()?;
        Ok(conn.execute("DELETE FROM sessions WHERE id = ?1", params![id])? > 0)
    }

    pub fn delete_for_user(&self, user_id: &str) -> AuthResult<usize> {
        let conn = self.db.lock()?;
        Ok(conn.execute("DELETE FROM sessions WHERE user_id = ?1", params![user_id])?)
    }

    pub fn purge_expired(&self) -> AuthResult<usize> {
        let conn = self.db.lock()?;
        let removed = conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?1",
            params![Utc::now().timestamp()],
        )?;
        Ok(removed)
    }

    #[cfg(test)]
    fn force_expiry(&self, id: &str, expires_at: i64) -> AuthResult<()> {
        let conn = self.db.lock()?;
        conn.execute(
            "UPDATE sessions SET expires_at = ?1 WHERE id = ?2",
            params![expires_at, id],
        )?;
        Ok(())
    }
}

pub(crate) fn expiry_of(record: &SessionRecord) -> AuthResult<DateTime<Utc>> {
    DateTime::from_timestamp(record.expires_at, 0)
        .ok_or_else(|| AuthError::Unavailable(format!("invalid expiry for session {}", record.id)))
}
