use crate::models::{Bookmaker, League};
use crate::BridgeContext;
use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const SERVICE_NAME: &str = "Naija Odds Bridge";

type SharedContext = Arc<BridgeContext>;

/// Caller input errors, answered with 400 and the accepted values
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    UnknownLeague(String),
    #[error("{0}")]
    UnknownBookmaker(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::UnknownLeague(_) => json!({
                "error": self.to_string(),
                "supported_leagues": League::supported_keys(),
            }),
            ApiError::UnknownBookmaker(_) => json!({
                "error": self.to_string(),
                "supported_bookmakers": Bookmaker::supported_keys(),
            }),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

fn parse_league(raw: &str) -> Result<League, ApiError> {
    raw.parse().map_err(ApiError::UnknownLeague)
}

async fn root(State(ctx): State<SharedContext>) -> impl IntoResponse {
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
        "sharp_odds_available": ctx.sharp.is_configured(),
        "endpoints": {
            "health": "/health",
            "bet9ja": "/api/odds/bet9ja/{league}",
            "betking": "/api/odds/betking/{league}",
            "sportybet": "/api/odds/sportybet/{league}",
            "all": "/api/odds/all/{league}"
        },
        "supported_leagues": League::supported_keys(),
    }))
}

async fn health(State(ctx): State<SharedContext>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "naija-bridge",
        "timestamp": Utc::now(),
        "sharp_odds_available": ctx.sharp.is_configured(),
        "datastore_configured": ctx.sink.is_configured(),
        "bookmakers": Bookmaker::supported_keys(),
    }))
}

/// `/api/odds/{bookmaker}/{league}`; `all` fans out to every bookmaker
async fn odds(
    State(ctx): State<SharedContext>,
    Path((bookmaker, league)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let league = parse_league(&league)?;

    if bookmaker.eq_ignore_ascii_case("all") {
        return Ok(Json(ctx.fetch_all_bookmakers(league).await).into_response());
    }

    let bookmaker: Bookmaker = bookmaker.parse().map_err(ApiError::UnknownBookmaker)?;
    Ok(Json(ctx.fetch_bookmaker_odds(bookmaker, league).await).into_response())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    }
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn build_router(ctx: SharedContext) -> Router {
    let cors = cors_layer(&ctx.config.allowed_origins);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/odds/:bookmaker/:league", get(odds))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(ctx)
}
