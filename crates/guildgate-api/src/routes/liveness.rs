//! Liveness gauge — smoothed tick rate of the server's event loop.
//!
//! GET /liveness?seconds=N — Windowed average and health band

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use guildgate_common::{error::GateResult, sampler::RateBand, validation::validate_request};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LivenessQuery {
    /// Window size; defaults to the full history.
    #[validate(range(min = 1, max = 3600, message = "seconds must be 1-3600"))]
    pub seconds: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LivenessResponse {
    pub average: f64,
    pub band: RateBand,
    pub latest: Option<f64>,
    pub target_rate: f64,
    pub samples: usize,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/liveness", get(liveness))
}

async fn liveness(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LivenessQuery>,
) -> GateResult<Json<LivenessResponse>> {
    validate_request(&query)?;

    let sampler = &state.liveness;
    let window = query
        .seconds
        .map_or(sampler.history_length(), |s| s as usize);
    let average = sampler.average(window);

    Ok(Json(LivenessResponse {
        average,
        band: sampler.band(average),
        latest: sampler.latest(),
        target_rate: sampler.target_rate(),
        samples: sampler.len(),
    }))
}
