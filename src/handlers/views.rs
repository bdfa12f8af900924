// handlers/views.rs - GET /catalog and GET /admin views

use axum::{
    extract::{Extension, State},
    response::IntoResponse,
};
use serde::Serialize;

use crate::auth::Principal;
use crate::backend::BackendClients;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, CurrentUser};
use crate::router::{ViewKind, ADMIN_PATH, CATALOG_PATH};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BackendAddresses {
    pub documents: String,
    pub storage: String,
}

impl From<&BackendClients> for BackendAddresses {
    fn from(clients: &BackendClients) -> Self {
        Self {
            documents: clients.database.documents_url().to_string(),
            storage: clients.storage.bucket_url().to_string(),
        }
    }
}

/// What a mounted view hands to the client
#[derive(Debug, Serialize)]
pub struct ViewPage {
    pub view: &'static str,
    pub path: String,
    pub backend: BackendAddresses,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Principal>,
}

/// GET /catalog - public catalog view
pub async fn catalog(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> impl IntoResponse {
    ApiResponse::success(ViewPage {
        view: ViewKind::Catalog.name(),
        path: CATALOG_PATH.to_string(),
        backend: BackendAddresses::from(state.backend.as_ref()),
        user,
    })
}

/// GET /admin - admin view; the guard guarantees a current user
pub async fn admin(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user = user.ok_or_else(|| {
        tracing::error!("Admin view reached without a current user");
        ApiError::internal_server_error("Admin view requires an authenticated user")
    })?;

    Ok(ApiResponse::success(ViewPage {
        view: ViewKind::Admin.name(),
        path: ADMIN_PATH.to_string(),
        backend: BackendAddresses::from(state.backend.as_ref()),
        user: Some(user),
    }))
}
