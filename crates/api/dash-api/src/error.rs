use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dash_auth::AuthError;
use dash_prefs::PreferenceError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Preference(#[from] PreferenceError),

    #[error("Not signed in")]
    Unauthorized,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Auth(AuthError::InvalidCredentials | AuthError::Disabled) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Auth(AuthError::UserExists(_)) => StatusCode::CONFLICT,
            ApiError::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Preference(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "success": false, "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Auth(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Auth(AuthError::UserExists("a@b.com".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Auth(AuthError::Unavailable("locked".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Preference(PreferenceError::UnknownKey("sidebar_width".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Preference(PreferenceError::NotAllowed {
                key: "sidebar_variant".into(),
                value: "bogus".into(),
            })
            .status(),
            StatusCode::BAD_REQUEST
        );
    }
}
