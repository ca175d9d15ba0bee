pub mod error;
pub mod routes;
pub mod state;


use axum::Router;
use state::ApiState;
use tower_http::trace::TraceLayer;

/// Build the complete router: dashboard shell under `/dashboard`, JSON API
/// under `/api`.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .merge(routes::dashboard::router())
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<ApiState> {
    Router::new()
        .nest("/auth", routes::auth::router())
        .nest("/preferences", routes::preferences::router())
        .merge(routes::health::router())
}
