//! Reaction-role menu routes.
//!
//! POST /reaction-roles/validate — Check a menu draft before it is saved
//!
//! Requires the actor to manage roles. A failing draft is a normal 200 with
//! `isValid: false` and the first failing rule as `message`. A field of the
//! wrong JSON type fails the same way; a body that is not JSON at all is a 400.

use axum::{
    extract::{rejection::JsonRejection, Extension},
    middleware,
    routing::post,
    Json, Router,
};
use guildgate_common::{
    error::{GateError, GateResult},
    policy,
    reaction_roles::{self, ReactionRoleMenuDraft, ValidationResult},
};
use std::sync::Arc;

use crate::{middleware::ActorContext, AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reaction-roles/validate", post(validate_draft))
        .route_layer(middleware::from_fn(crate::middleware::actor_middleware))
}

async fn validate_draft(
    Extension(actor): Extension<ActorContext>,
    draft: Result<Json<ReactionRoleMenuDraft>, JsonRejection>,
) -> GateResult<Json<ValidationResult>> {
    policy::require(policy::REACTION_ROLES, actor.permissions)?;

    match draft {
        Ok(Json(draft)) => Ok(Json(reaction_roles::validate(&draft))),
        Err(JsonRejection::JsonDataError(e)) => {
            tracing::debug!(error = %e.body_text(), "Reaction-role draft has mistyped fields");
            Ok(Json(ValidationResult::invalid(format!(
                "Menu draft has a field of the wrong type: {}",
                e.body_text()
            ))))
        }
        Err(e) => Err(GateError::invalid_argument(e.body_text())),
    }
}
