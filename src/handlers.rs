use crate::center::{self, INVALID_INPUT_MESSAGE};
use crate::config::Config;
use crate::errors::AppError;
use crate::models::*;
use crate::services::{CafeSearchService, MISSING_KEY_MESSAGE};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Cafe search pipeline. `None` while the provider credential is missing.
    pub cafe_search: Option<CafeSearchService>,
}

impl AppState {
    /// Builds the state, leaving search disabled when the credential is missing.
    pub fn new(config: Config) -> Self {
        let cafe_search = match CafeSearchService::new(&config) {
            Ok(service) => {
                tracing::info!("✓ Cafe search initialized: {}", config.google_maps_base_url);
                Some(service)
            }
            Err(e) => {
                tracing::error!("Cafe search unavailable: {}", e);
                None
            }
        };

        Self {
            config,
            cafe_search,
        }
    }
}

/// Health check endpoint.
///
/// Returns the service status and version.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "cafe-finder-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /api/cafes
///
/// Ranked independent cafes around a ZIP code (`?zip=90703`) or a coordinate
/// (`?lat=33.87&lng=-118.07`). Coordinates win when both are given.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `params` - Query parameters (`zip`, `lat`, `lng`).
///
/// # Returns
///
/// * `Result<Json<CafesResponse>, AppError>` - The ranked cafes or an error.
pub async fn get_cafes(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CafeQueryParams>, QueryRejection>,
) -> Result<Json<CafesResponse>, AppError> {
    let search = state
        .cafe_search
        .as_ref()
        .ok_or_else(|| AppError::Configuration(MISSING_KEY_MESSAGE.to_string()))?;

    // Duplicate keys and the like get the same JSON 400 as any other bad input
    let Query(params) = query.map_err(|rejection| {
        tracing::warn!("Rejected query string: {}", rejection.body_text());
        AppError::InvalidInput(INVALID_INPUT_MESSAGE.to_string())
    })?;
    tracing::info!("GET /api/cafes - params: {:?}", params);

    let input = center::resolve_input(&params)?;
    tracing::debug!("Search input resolved as {:?}", input.mode());

    let response = search.find_cafes(input).await?;

    tracing::info!(
        "Returning {} cafe(s) for {:?} search",
        response.cafes.len(),
        response.mode
    );

    Ok(Json(response))
}

/// Routes served by this API, without rate limiting.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/cafes", get(get_cafes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let state = Arc::new(AppState::new(Config::default()));
        let result = get_cafes(State(state), Ok(Query(CafeQueryParams::default()))).await;

        assert_eq!(
            result.err(),
            Some(AppError::Configuration(MISSING_KEY_MESSAGE.to_string()))
        );
    }

    #[tokio::test]
    async fn test_health() {
        let (status, Json(body)) = health().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}
