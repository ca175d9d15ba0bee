use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Auth store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid auth setting: {0}")]
    InvalidSetting(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account disabled")]
    Disabled,
}

pub type AuthResult<T> = Result<T, AuthError>;
