//! Guild views — merging what the bot sees with what the user sees.
//!
//! The bot knows which guilds it has joined; the user's OAuth token knows which
//! guilds the user belongs to and their permissions there. A dashboard listing
//! is the user's list, annotated with bot presence and manageability. Guilds the
//! user is not a member of are never emitted, even if the bot is in them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::permissions::Permissions;
use crate::policy;

pub const DISCORD_CDN: &str = "https://cdn.discordapp.com";

/// A guild the bot may or may not still be in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMembership {
    pub id: String,
    #[serde(default = "default_present")]
    pub present: bool,
}

fn default_present() -> bool {
    true
}

impl BotMembership {
    pub fn present(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            present: true,
        }
    }
}

/// One entry of the user's `/users/@me/guilds` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserGuildEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub owner: bool,
    pub permissions: Permissions,
    /// Set by callers that already know the icon is animated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
}

/// Read-only projection shown on the dashboard guild picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildView {
    pub id: String,
    pub name: String,
    pub icon_url: String,
    pub has_bot: bool,
    pub manageable: bool,
    pub owner: bool,
}

/// CDN location used to build guild icon URLs.
#[derive(Debug, Clone)]
pub struct IconCdn {
    base_url: String,
}

impl IconCdn {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// `{cdn}/icons/{guild}/{hash}.{gif|png}`, or the default avatar when there is no icon.
    pub fn icon_url(&self, guild_id: &str, icon: Option<&str>, animated: Option<bool>) -> String {
        match icon.filter(|hash| !hash.is_empty()) {
            Some(hash) => {
                let ext = if hash.starts_with("a_") || animated == Some(true) {
                    "gif"
                } else {
                    "png"
                };
                format!("{}/icons/{guild_id}/{hash}.{ext}", self.base_url)
            }
            None => self.default_icon_url(),
        }
    }

    pub fn default_icon_url(&self) -> String {
        format!("{}/embed/avatars/0.png", self.base_url)
    }
}

impl Default for IconCdn {
    fn default() -> Self {
        Self::new(DISCORD_CDN)
    }
}

/// Joins bot memberships with a user guild list.
#[derive(Debug, Clone, Default)]
pub struct GuildViewAggregator {
    cdn: IconCdn,
}

impl GuildViewAggregator {
    pub fn new(cdn: IconCdn) -> Self {
        Self { cdn }
    }

    /// One view per user guild, in the user's order.
    pub fn aggregate(
        &self,
        bot_memberships: &[BotMembership],
        user_guilds: &[UserGuildEntry],
    ) -> Vec<GuildView> {
        let bot_in: HashSet<&str> = bot_memberships
            .iter()
            .filter(|m| m.present)
            .map(|m| m.id.as_str())
            .collect();

        user_guilds
            .iter()
            .map(|entry| GuildView {
                id: entry.id.clone(),
                name: entry.name.clone(),
                icon_url: self
                    .cdn
                    .icon_url(&entry.id, entry.icon.as_deref(), entry.animated),
                has_bot: bot_in.contains(entry.id.as_str()),
                manageable: policy::can_manage_guild(entry.permissions),
                owner: entry.owner,
            })
            .collect()
    }

    /// Like [`aggregate`](Self::aggregate), for a user list that may have failed to load.
    ///
    /// A missing list yields zero guilds.
    pub fn aggregate_fetched(
        &self,
        bot_memberships: &[BotMembership],
        user_guilds: Option<&[UserGuildEntry]>,
    ) -> Vec<GuildView> {
        match user_guilds {
            Some(guilds) => self.aggregate(bot_memberships, guilds),
            None => {
                tracing::warn!("User guild list unavailable, showing no guilds");
                Vec::new()
            }
        }
    }
}

/// Keep only guilds the user can configure.
pub fn manageable_only(views: Vec<GuildView>) -> Vec<GuildView> {
    views.into_iter().filter(|v| v.manageable).collect()
}
