use serde::Serialize;

use super::RouteMeta;
use crate::auth::Principal;

/// Where denied navigations are sent
pub const CATALOG_PATH: &str = "/catalog";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "target", rename_all = "snake_case")]
pub enum GuardDecision {
    Proceed,
    Redirected(&'static str),
}

/// Decide a navigation to a route with `meta`.
///
/// Protected routes need a current user; everything else proceeds.
pub fn evaluate(meta: &RouteMeta, current_user: Option<&Principal>) -> GuardDecision {
    if meta.requires_auth && current_user.is_none() {
        GuardDecision::Redirected(CATALOG_PATH)
    } else {
        GuardDecision::Proceed
    }
}
