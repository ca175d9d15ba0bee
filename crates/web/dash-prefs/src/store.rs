use async_trait::async_trait;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration;

use crate::{PreferenceError, PreferenceKey};

/// Source of raw, unvalidated preference values.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Stored value for `key`, or `None` when nothing is stored.
    async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;
}

/// Preferences carried in the request's cookies.
#[derive(Debug, Clone, Default)]
pub struct CookiePreferences {
    jar: CookieJar,
}

impl CookiePreferences {
    pub fn new(jar: CookieJar) -> Self {
        Self { jar }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::new(CookieJar::from_headers(headers))
    }
}

#[async_trait]
impl PreferenceStore for CookiePreferences {
    async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.jar.get(key).map(|c| c.value().to_string()))
    }
}

const SECONDS_PER_DAY: i64 = 86_400;

/// Cookie persisting `value` for `key`. The value must already be validated.
pub fn preference_cookie(key: PreferenceKey, value: &'static str, max_age_days: i64) -> Cookie<'static> {
    Cookie::build((key.as_str(), value))
        .path("/")
        .max_age(Duration::seconds(max_age_days.saturating_mul(SECONDS_PER_DAY)))
        .same_site(SameSite::Lax)
        .build()
}

/// Validate a key/value pair coming from a client and build the cookie
/// that stores it.
pub fn set_preference(
    key: &str,
    value: &str,
    max_age_days: i64,
) -> Result<Cookie<'static>, PreferenceError> {
    let key: PreferenceKey = key.parse()?;
    let value = key.validate(value)?;
    Ok(preference_cookie(key, value, max_age_days))
}
