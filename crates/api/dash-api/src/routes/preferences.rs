use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::{Json, Router, routing::{get, put}};
use axum_extra::extract::cookie::CookieJar;
use dash_prefs::{CookiePreferences, resolve_layout, resolve_theme, set_preference};
use dash_shell::RequestContext;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::error::ApiError;
use crate::state::ApiState;

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/", get(current))
        .route("/{key}", put(update))
}

#[derive(Debug, Deserialize)]
struct UpdatePreference {
    value: String,
}

async fn current(headers: HeaderMap) -> Json<Value> {
    let ctx = RequestContext::new(headers);
    let store: CookiePreferences = ctx.preferences();
    let (layout, theme) = tokio::join!(resolve_layout(&store), resolve_theme(&store));

    Json(json!({
        "layout": layout,
        "theme": theme,
        "sidebarOpen": ctx.sidebar_default_open(),
    }))
}

async fn update(
    State(state): State<ApiState>,
    Path(key): Path<String>,
    jar: CookieJar,
    Json(body): Json<UpdatePreference>,
) -> Result<(CookieJar, StatusCode), ApiError> {
    let cookie = set_preference(&key, &body.value, state.config.preferences.cookie_max_age_days)?;
    info!(key = %key, value = %body.value, "Preference updated");
    Ok((jar.add(cookie), StatusCode::NO_CONTENT))
}
