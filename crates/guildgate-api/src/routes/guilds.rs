//! Guild listing — the dashboard guild picker.
//!
//! POST /guilds — Merge the bot's guild set with the user's OAuth guild list
//!
//! The caller fetches both lists (bot cache and `/users/@me/guilds`) and posts
//! them here. A `userGuilds` of `null` means the OAuth fetch failed.

use axum::{extract::State, routing::post, Json, Router};
use guildgate_common::{
    error::GateResult,
    guilds::{manageable_only, BotMembership, GuildView, UserGuildEntry},
    snowflake::parse_snowflake,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildListRequest {
    #[serde(default)]
    pub bot_guilds: Vec<BotMembership>,
    #[serde(default)]
    pub user_guilds: Option<Vec<UserGuildEntry>>,
    /// Only return guilds the user can configure.
    #[serde(default)]
    pub manageable_only: bool,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/guilds", post(list_guilds))
}

async fn list_guilds(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GuildListRequest>,
) -> GateResult<Json<Vec<GuildView>>> {
    let user_ids = body.user_guilds.iter().flatten().map(|g| g.id.as_str());
    for id in body.bot_guilds.iter().map(|m| m.id.as_str()).chain(user_ids) {
        parse_snowflake(id)?;
    }

    let views = state
        .guilds
        .aggregate_fetched(&body.bot_guilds, body.user_guilds.as_deref());

    tracing::debug!(
        guilds = views.len(),
        with_bot = views.iter().filter(|v| v.has_bot).count(),
        "Built guild listing"
    );

    Ok(Json(if body.manageable_only {
        manageable_only(views)
    } else {
        views
    }))
}
