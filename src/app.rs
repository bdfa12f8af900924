use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    response::Redirect,
    routing::{get, MethodRouter},
    Router,
};
use tower::Layer;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    normalize_path::{NormalizePath, NormalizePathLayer},
    trace::TraceLayer,
};

use crate::handlers;
use crate::middleware::navigation_guard;
use crate::router::{RouteTarget, ViewKind};
use crate::state::AppState;

/// Full service: the router wrapped so `/admin/` and `/admin` route alike
pub fn service(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

pub fn router(state: AppState) -> Router {
    // Route table: every navigation passes the guard first
    let mut views = Router::new();
    for route in state.routes.iter() {
        views = views.route(&route.path, method_router(&route.target));
    }
    let views = views.route_layer(from_fn_with_state(state.clone(), navigation_guard));

    let mut app = Router::new()
        .merge(views)
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(cors_layer(&state.config.server.cors_origins));

    if state.config.server.request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app.with_state(state)
}

fn method_router(target: &RouteTarget) -> MethodRouter<AppState> {
    match target {
        RouteTarget::Redirect(to) => {
            let to = to.clone();
            get(move || {
                let to = to.clone();
                async move { Redirect::to(&to) }
            })
        }
        RouteTarget::View(ViewKind::Catalog) => get(handlers::catalog),
        RouteTarget::View(ViewKind::Admin) => get(handlers::admin),
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
        .allow_headers([header::AUTHORIZATION])
        .allow_credentials(true)
}
