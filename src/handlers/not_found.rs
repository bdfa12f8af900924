// handlers/not_found.rs - fallback for paths outside the route table

use axum::http::Uri;

use crate::error::ApiError;

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route matches '{}'", uri.path()))
}
