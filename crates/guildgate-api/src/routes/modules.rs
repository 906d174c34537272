//! Module routes — the policy table and access checks against it.
//!
//! GET  /modules                      — List modules and the capabilities that unlock them
//! POST /modules/{module}/authorize   — Check the actor may manage a module (403 if not)

use axum::{
    extract::{Extension, Path},
    middleware,
    routing::{get, post},
    Json, Router,
};
use guildgate_common::{
    error::GateResult,
    policy::{self, ModuleRuleView},
};
use serde::Serialize;
use std::sync::Arc;

use crate::{middleware::ActorContext, AppState};

#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    pub module: String,
    pub allowed: bool,
}

pub fn router() -> Router<Arc<AppState>> {
    let guarded = Router::new()
        .route("/modules/{module}/authorize", post(authorize))
        .route_layer(middleware::from_fn(crate::middleware::actor_middleware));

    Router::new()
        .route("/modules", get(list_modules))
        .merge(guarded)
}

async fn list_modules() -> Json<Vec<ModuleRuleView>> {
    Json(policy::rules().iter().map(ModuleRuleView::from).collect())
}

async fn authorize(
    Extension(actor): Extension<ActorContext>,
    Path(module): Path<String>,
) -> GateResult<Json<AuthorizeResponse>> {
    policy::require(&module, actor.permissions)?;
    Ok(Json(AuthorizeResponse {
        module,
        allowed: true,
    }))
}
