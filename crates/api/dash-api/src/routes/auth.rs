use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Redirect;
use axum::{Json, Router, routing::{get, post}};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::ApiState;

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    email: String,
    password: String,
    #[serde(default)]
    remember_me: bool,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Forwarding headers are only read when `server.trust_proxy_headers` is
/// set; otherwise any client could forge them.
fn client_ip<'a>(state: &ApiState, headers: &'a HeaderMap) -> Option<&'a str> {
    if !state.config.server.trust_proxy_headers {
        return None;
    }
    header(headers, "x-real-ip").or_else(|| {
        header(headers, "x-forwarded-for").and_then(|v| v.split(',').next().map(str::trim))
    })
}

fn is_https(state: &ApiState, headers: &HeaderMap) -> bool {
    state.config.server.trust_proxy_headers && header(headers, "x-forwarded-proto") == Some("https")
}

/// Base session cookie; `Secure` and the configured domain are added when
/// the request came in over https.
fn session_cookie(state: &ApiState, headers: &HeaderMap, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::build((state.auth.settings.session_cookie.clone(), value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build();

    if is_https(state, headers) {
        cookie.set_secure(true);
        if let Some(domain) = &state.config.auth.cookie_domain {
            cookie.set_domain(domain.clone());
        }
    }
    cookie
}

async fn login(
    State(state): State<ApiState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(dash_auth::AuthError::InvalidCredentials.into());
    }

    let user = match state.auth.users.authenticate(&body.email, &body.password) {
        Ok(user) => user,
        Err(e) => {
            warn!(email = %body.email, error = %e, "Login rejected");
            return Err(e.into());
        }
    };

    state.auth.users.update_last_login(&user.id)?;
    let (session_id, expires) = state.auth.sessions.create(
        &user.id,
        client_ip(&state, &headers),
        header(&headers, "user-agent"),
        body.remember_me,
    )?;
    info!(user_id = %user.id, remember = body.remember_me, "User signed in");

    let mut cookie = session_cookie(&state, &headers, session_id);
    if body.remember_me {
        let remember = state.auth.settings.remember_ttl.num_seconds();
        cookie.set_max_age(Duration::seconds(remember));
    }

    Ok((
        jar.add(cookie),
        Json(json!({
            "success": true,
            "expiresAt": expires,
            "user": {
                "id": user.id,
                "name": user.name,
                "email": user.email,
                "image": user.image,
            }
        })),
    ))
}

async fn logout(
    State(state): State<ApiState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ApiError> {
    if let Some(session_id) = state.auth.session_id(&headers) {
        if state.auth.sessions.delete(&session_id)? {
            info!("User signed out");
        }
    }

    let removal = session_cookie(&state, &headers, String::new());
    Ok((jar.remove(removal), Redirect::to(&state.config.auth.login_path)))
}

async fn me(State(state): State<ApiState>, headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    let session = state
        .sessions
        .get_session(&headers)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(json!({
        "success": true,
        "session": session,
    })))
}
