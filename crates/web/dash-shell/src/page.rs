use axum::Json;
use axum::response::{IntoResponse, Redirect, Response};
use dash_auth::{Session, SessionProvider};
use dash_prefs::resolve_layout;
use tracing::{debug, warn};

use crate::context::RequestContext;
use crate::layout::{DashboardShell, compose};

/// Result of rendering the dashboard for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// No session: send the client to this path and render nothing.
    Redirect(String),
    Rendered(Box<DashboardShell>),
}

/// Gate the request on its session and, when authenticated, compose the
/// dashboard shell.
///
/// The session lookup and the preference lookups run concurrently. An
/// auth failure is handled like a missing session.
pub async fn render_dashboard<P>(ctx: &RequestContext, sessions: &P, login_path: &str) -> PageOutcome
where
    P: SessionProvider + ?Sized,
{
    let preferences = ctx.preferences();
    let (session, prefs) = tokio::join!(current_session(ctx, sessions), resolve_layout(&preferences));

    let Some(session) = session else {
        debug!(to = login_path, "No session, redirecting");
        return PageOutcome::Redirect(login_path.to_string());
    };

    PageOutcome::Rendered(Box::new(compose(&session, prefs, ctx.sidebar_default_open())))
}

async fn current_session<P>(ctx: &RequestContext, sessions: &P) -> Option<Session>
where
    P: SessionProvider + ?Sized,
{
    match sessions.get_session(ctx.headers()).await {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "Session lookup failed, treating request as signed out");
            None
        }
    }
}

impl IntoResponse for PageOutcome {
    fn into_response(self) -> Response {
        match self {
            PageOutcome::Redirect(path) => Redirect::to(&path).into_response(),
            PageOutcome::Rendered(shell) => Json(*shell).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::AccountRole;
    use async_trait::async_trait;
    use axum::http::header::{COOKIE, LOCATION};
    use axum::http::{HeaderMap, StatusCode};
    use chrono::Utc;
    use dash_auth::{AuthError, AuthResult, SessionUser};
    use dash_prefs::{ContentLayout, SidebarCollapsible, SidebarVariant};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed answer and counts calls.
    struct FixedSessions {
        session: Option<Session>,
        calls: AtomicUsize,
    }

    impl FixedSessions {
        fn new(session: Option<Session>) -> Self {
            Self {
                session,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SessionProvider for FixedSessions {
        async fn get_session(&self, _headers: &HeaderMap) -> AuthResult<Option<Session>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.session.clone())
        }
    }

    struct BrokenSessions;

    #[async_trait]
    impl SessionProvider for BrokenSessions {
        async fn get_session(&self, _headers: &HeaderMap) -> AuthResult<Option<Session>> {
            Err(AuthError::Unavailable("database is locked".into()))
        }
    }

    fn session() -> Session {
        Session {
            id: "sid".into(),
            expires_at: Utc::now(),
            user: SessionUser {
                id: "u1".into(),
                name: "Ada".into(),
                email: "a@b.com".into(),
                image: None,
            },
        }
    }

    fn ctx(cookie: &str) -> RequestContext {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, cookie.parse().unwrap());
        RequestContext::new(headers)
    }

    fn rendered(outcome: PageOutcome) -> DashboardShell {
        match outcome {
            PageOutcome::Rendered(shell) => *shell,
            PageOutcome::Redirect(to) => panic!("unexpected redirect to {to}"),
        }
    }

    #[tokio::test]
    async fn test_no_session_redirects_to_login() {
        let sessions = FixedSessions::new(None);
        let outcome = render_dashboard(&ctx("sidebar_variant=floating"), &sessions, "/auth/login").await;
        assert_eq!(outcome, PageOutcome::Redirect("/auth/login".into()));
        assert_eq!(sessions.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_auth_failure_redirects_to_login() {
        let outcome = render_dashboard(&ctx(""), &BrokenSessions, "/auth/login").await;
        assert_eq!(outcome, PageOutcome::Redirect("/auth/login".into()));
    }

    #[tokio::test]
    async fn test_renders_with_stored_preferences() {
        let sessions = FixedSessions::new(Some(session()));
        let shell = rendered(
            render_dashboard(
                &ctx("sidebar_variant=inset; sidebar_collapsible=offcanvas; content_layout=full-width; sidebar_state=true"),
                &sessions,
                "/auth/login",
            )
            .await,
        );
        assert_eq!(shell.sidebar.variant, SidebarVariant::Inset);
        assert_eq!(shell.sidebar.collapsible, SidebarCollapsible::Offcanvas);
        assert!(shell.sidebar.default_open);
        assert_eq!(shell.content.layout, ContentLayout::FullWidth);
    }

    #[tokio::test]
    async fn test_invalid_preferences_fall_back() {
        let sessions = FixedSessions::new(Some(session()));
        let shell = rendered(
            render_dashboard(&ctx("sidebar_variant=bogus"), &sessions, "/auth/login").await,
        );
        assert_eq!(shell.sidebar.variant, SidebarVariant::Inset);
        assert_eq!(shell.sidebar.collapsible, SidebarCollapsible::Icon);
        assert_eq!(shell.content.layout, ContentLayout::Centered);
        assert!(!shell.sidebar.default_open);

        assert_eq!(shell.header.accounts.len(), 1);
        assert_eq!(shell.header.accounts[0].email, "a@b.com");
        assert_eq!(shell.header.accounts[0].role, AccountRole::Admin);
    }

    #[test]
    fn test_redirect_response() {
        let response = PageOutcome::Redirect("/auth/login".into()).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/auth/login");
    }
}
