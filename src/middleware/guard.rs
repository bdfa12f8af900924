use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::Principal;
use crate::router::{guard, GuardDecision};
use crate::state::AppState;

/// Current-user snapshot taken when the guard ran, available to view handlers
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Option<Principal>);

/// Navigation guard middleware applied to every route-table route.
///
/// Runs before the view handler, so a protected view is never built for an
/// anonymous request.
pub async fn navigation_guard(
    State(state): State<AppState>,
    matched: Option<MatchedPath>,
    mut request: Request,
    next: Next,
) -> Response {
    let current_user = state.auth.current_user(request.headers());

    let path = matched
        .as_ref()
        .map(|matched| matched.as_str())
        .unwrap_or_else(|| request.uri().path());
    let meta = state.routes.find(path).map(|route| route.meta).unwrap_or_default();

    match guard::evaluate(&meta, current_user.as_ref()) {
        GuardDecision::Proceed => {
            request.extensions_mut().insert(CurrentUser(current_user));
            next.run(request).await
        }
        GuardDecision::Redirected(target) => {
            tracing::debug!(
                "Redirecting anonymous navigation to {} -> {}",
                request.uri().path(),
                target
            );
            Redirect::to(target).into_response()
        }
    }
}
