use serde::Serialize;

use super::{guard, GuardDecision, Resolution, RouteTable, RouteTarget, ViewKind};
use crate::auth::Principal;

/// One step of a navigation, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "path", rename_all = "snake_case")]
pub enum NavigationState {
    Requested(String),
    /// Static rewrite, applied before the guard
    Rewritten(String),
    Evaluated,
    Proceed,
    Redirected(String),
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationOutcome {
    pub requested: String,
    pub final_path: String,
    /// `None` when the path matched no route
    pub view: Option<ViewKind>,
    pub trace: Vec<NavigationState>,
}

impl NavigationOutcome {
    pub fn redirected(&self) -> bool {
        self.trace
            .iter()
            .any(|state| matches!(state, NavigationState::Redirected(_) | NavigationState::Rewritten(_)))
    }
}

/// Drives navigations over a route table with a given current-user snapshot
pub struct Navigator<'a> {
    routes: &'a RouteTable,
}

impl<'a> Navigator<'a> {
    pub fn new(routes: &'a RouteTable) -> Self {
        Self { routes }
    }

    /// Navigate to `path`, following rewrites and guard redirects until a view
    /// mounts or the path turns out to be unmatched. Each redirect re-enters
    /// `Requested` for its target.
    pub fn navigate(&self, path: &str, current_user: Option<&Principal>) -> NavigationOutcome {
        let mut trace = Vec::new();
        let mut target = path.to_string();

        // A validated table needs at most two hops; the bound covers tables
        // assembled without `RouteTable::new`.
        for _ in 0..=self.routes.len() {
            trace.push(NavigationState::Requested(target.clone()));

            let route = match self.routes.resolve(&target) {
                Resolution::Redirect(to) => {
                    trace.push(NavigationState::Rewritten(to.to_string()));
                    target = to.to_string();
                    continue;
                }
                Resolution::Unmatched => break,
                Resolution::Matched(route) => route,
            };

            trace.push(NavigationState::Evaluated);
            match guard::evaluate(&route.meta, current_user) {
                GuardDecision::Proceed => {
                    trace.push(NavigationState::Proceed);
                    let view = match route.target {
                        RouteTarget::View(view) => Some(view),
                        RouteTarget::Redirect(_) => None,
                    };
                    return NavigationOutcome {
                        requested: path.to_string(),
                        final_path: route.path.clone(),
                        view,
                        trace,
                    };
                }
                GuardDecision::Redirected(to) => {
                    trace.push(NavigationState::Redirected(to.to_string()));
                    target = to.to_string();
                }
            }
        }

        trace.push(NavigationState::Unmatched);
        NavigationOutcome {
            requested: path.to_string(),
            final_path: target,
            view: None,
            trace,
        }
    }
}
