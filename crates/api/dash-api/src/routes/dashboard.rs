use axum::extract::State;
use axum::http::HeaderMap;
use axum::{Router, routing::get};
use dash_shell::{PageOutcome, RequestContext, render_dashboard};

use crate::state::ApiState;

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/dashboard/{*rest}", get(dashboard))
}

/// Dashboard shell for every page under `/dashboard`.
async fn dashboard(State(state): State<ApiState>, headers: HeaderMap) -> PageOutcome {
    let ctx = RequestContext::new(headers);
    render_dashboard(&ctx, state.sessions.as_ref(), &state.config.auth.login_path).await
}
