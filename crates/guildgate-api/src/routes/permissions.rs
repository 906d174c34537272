//! Permission decoding — what a bitfield grants, for dashboard display.
//!
//! POST /permissions/decode — Decode a bitfield into capabilities and manageable modules

use axum::{routing::post, Json, Router};
use guildgate_common::{permissions::Permissions, policy};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DecodeRequest {
    pub permissions: Permissions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeResponse {
    pub permissions: Permissions,
    pub administrator: bool,
    pub capabilities: Vec<String>,
    /// Module keys this bitfield may manage.
    pub modules: Vec<&'static str>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/permissions/decode", post(decode))
}

async fn decode(Json(body): Json<DecodeRequest>) -> Json<DecodeResponse> {
    let perms = body.permissions;
    Json(DecodeResponse {
        permissions: perms,
        administrator: perms.is_administrator(),
        capabilities: perms.capability_names(),
        modules: policy::rules()
            .iter()
            .filter(|rule| policy::can_manage(rule.key, perms))
            .map(|rule| rule.key)
            .collect(),
    })
}
