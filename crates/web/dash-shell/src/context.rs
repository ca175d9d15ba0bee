use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use dash_prefs::CookiePreferences;

/// Cookie written by the sidebar widget when it is toggled.
pub const SIDEBAR_STATE_COOKIE: &str = "sidebar_state";

/// Everything the shell reads from the incoming request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    headers: HeaderMap,
    cookies: CookieJar,
}

impl RequestContext {
    pub fn new(headers: HeaderMap) -> Self {
        let cookies = CookieJar::from_headers(&headers);
        Self { headers, cookies }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(|c| c.value())
    }

    pub fn preferences(&self) -> CookiePreferences {
        CookiePreferences::new(self.cookies.clone())
    }

    /// Open only when the cookie is literally `true`.
    pub fn sidebar_default_open(&self) -> bool {
        self.cookie(SIDEBAR_STATE_COOKIE) == Some("true")
    }
}
