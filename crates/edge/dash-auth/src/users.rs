use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use chrono::Utc;
use rand_core::OsRng;
use rusqlite::{ErrorCode, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::Db;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub disabled: bool,
    pub created_at: i64,
    pub last_login: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct UserWithPassword {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: String,
    pub image: Option<String>,
}

const USER_COLUMNS: &str = "id, email, name, image, disabled, created_at, last_login";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        image: row.get(3)?,
        disabled: row.get(4)?,
        created_at: row.get(5)?,
        last_login: row.get(6)?,
    })
}

/// Emails are compared case-insensitively.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct UserStore {
    db: Db,
}

impl UserStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn create(&self, new: NewUser) -> AuthResult<User> {
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: normalize_email(&new.email),
            name: new.name,
            image: new.image,
            disabled: false,
            created_at: Utc::now().timestamp(),
            last_login: None,
        };
        let password_hash = hash_password(&new.password)?;

        let conn = self.db.lock()?;
        let inserted = conn.execute(
            "INSERT INTO users (id, email, name, image, password_hash, disabled, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
            params![user.id, user.email, user.name, user.image, password_hash, user.created_at],
        );
        match inserted {
            Ok(_) => {
                info!(user_id = %user.id, email = %user.email, "User created");
                Ok(user)
            }
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(AuthError::UserExists(user.email))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn get(&self, id: &str) -> AuthResult<Option<User>> {
        let conn = self.db.lock()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let conn = self.db.lock()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![normalize_email(email)],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_with_password(&self, email: &str) -> AuthResult<Option<UserWithPassword>> {
        let conn = self.db.lock()?;
        let found = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?1"),
                params![normalize_email(email)],
                |row| {
                    Ok(UserWithPassword {
                        user: user_from_row(row)?,
                        password_hash: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    /// Check credentials and return the matching active user.
    pub fn authenticate(&self, email: &str, password: &str) -> AuthResult<User> {
        let found = self
            .get_with_password(email)?
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, &found.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }
        if found.user.disabled {
            return Err(AuthError::Disabled);
        }
        Ok(found.user)
    }

    /// Returns `false` when no user has this email.
    pub fn set_disabled(&self, email: &str, disabled: bool) -> AuthResult<bool> {
        let conn = self.db.lock()?;
        let changed = conn.execute(
            "UPDATE users SET disabled = ?1 WHERE email = ?2",
            params![disabled, normalize_email(email)],
        )?;
        Ok(changed > 0)
    }

    pub fn update_last_login(&self, id: &str) -> AuthResult<()> {
        let conn = self.db.lock()?;
        conn.execute(
            "UPDATE users SET last_login = ?1 WHERE id = ?2",
            params![Utc::now().timestamp(), id],
        )?;
        Ok(())
    }

    pub fn list(&self) -> AuthResult<Vec<User>> {
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at"))?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    pub fn count(&self) -> AuthResult<usize> {
        let conn = self.db.lock()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
