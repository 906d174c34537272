//! Reaction-role menu drafts and their validation.
//!
//! A menu is rendered into a single message embed with one component per role,
//! so its bounds are the embed's: 256-char title, 4000-char description, at
//! most 25 options. Validation stops at the first failing rule and reports it
//! to the submitter verbatim.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::snowflake::is_snowflake;

pub const MAX_TITLE_CHARS: usize = 256;
pub const MAX_DESCRIPTION_CHARS: usize = 4000;
pub const MAX_ROLES: usize = 25;
pub const MAX_LABEL_CHARS: usize = 100;
pub const MAX_UNICODE_EMOJI_CHARS: usize = 7;

static CUSTOM_EMOJI_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^<(a)?:(\w+):(\d{17,20})>$").unwrap());

/// A menu as submitted from the dashboard, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionRoleMenuDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub roles: Vec<RoleEntry>,
    /// Any JSON number, so negative or fractional submissions get a message instead of a parse error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<serde_json::Number>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleEntry {
    #[serde(default)]
    pub role_id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

/// `{ isValid, message? }` as returned to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
        }
    }
}

impl From<Result<(), String>> for ValidationResult {
    fn from(outcome: Result<(), String>) -> Self {
        match outcome {
            Ok(()) => Self::valid(),
            Err(message) => Self::invalid(message),
        }
    }
}

/// A parsed emoji reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionEmoji {
    /// `<:name:id>` or `<a:name:id>`
    Custom { animated: bool, name: String, id: String },
    Unicode(String),
}

impl ReactionEmoji {
    /// Parse a custom emoji tag or a short unicode token. Returns `None` for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        if let Some(caps) = CUSTOM_EMOJI_REGEX.captures(raw) {
            return Some(Self::Custom {
                animated: caps.get(1).is_some(),
                name: caps[2].to_owned(),
                id: caps[3].to_owned(),
            });
        }

        let looks_like_tag = raw.starts_with('<');
        let chars = raw.chars().count();
        if looks_like_tag
            || chars == 0
            || chars > MAX_UNICODE_EMOJI_CHARS
            || raw.chars().any(char::is_whitespace)
        {
            return None;
        }
        Some(Self::Unicode(raw.to_owned()))
    }
}

/// Run the ordered checks, stopping at the first failure.
pub fn validate(draft: &ReactionRoleMenuDraft) -> ValidationResult {
    let outcome = check_draft(draft);
    if let Err(message) = &outcome {
        tracing::debug!(%message, "Reaction-role draft rejected");
    }
    outcome.into()
}

fn check_draft(draft: &ReactionRoleMenuDraft) -> Result<(), String> {
    check_text("Title", &draft.title, MAX_TITLE_CHARS)?;
    check_text("Description", &draft.description, MAX_DESCRIPTION_CHARS)?;

    if draft.roles.is_empty() {
        return Err("At least one role is required".into());
    }
    if draft.roles.len() > MAX_ROLES {
        return Err(format!(
            "A menu can have at most {MAX_ROLES} roles (got {})",
            draft.roles.len()
        ));
    }

    for (idx, role) in draft.roles.iter().enumerate() {
        check_role(idx + 1, role)?;
    }

    if let Some(max) = &draft.max_selections {
        let max = max_selections(max)?;
        if max > draft.roles.len() as u64 {
            return Err(format!(
                "Max selections ({max}) cannot exceed the number of roles ({})",
                draft.roles.len()
            ));
        }
    }

    Ok(())
}

fn max_selections(value: &serde_json::Number) -> Result<u64, String> {
    if let Some(max) = value.as_u64() {
        return Ok(max);
    }
    if value.as_i64().is_some() || value.as_f64().is_some_and(|v| v < 0.0) {
        return Err("Max selections cannot be negative".into());
    }
    Err(format!("Max selections must be a whole number (got {value})"))
}

fn check_text(field: &str, value: &str, max_chars: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    if value.chars().count() > max_chars {
        return Err(format!("{field} must be {max_chars} characters or fewer"));
    }
    Ok(())
}

fn check_role(position: usize, role: &RoleEntry) -> Result<(), String> {
    if role.role_id.trim().is_empty() {
        return Err(format!("Role {position}: role ID is required"));
    }
    if !is_snowflake(&role.role_id) {
        return Err(format!("Role {position}: role ID must be a valid Discord ID"));
    }

    if role.label.trim().is_empty() {
        return Err(format!("Role {position}: label is required"));
    }
    if role.label.chars().count() > MAX_LABEL_CHARS {
        return Err(format!(
            "Role {position}: label must be {MAX_LABEL_CHARS} characters or fewer"
        ));
    }

    // Blank means no emoji
    if let Some(emoji) = role.emoji.as_deref().filter(|e| !e.trim().is_empty()) {
        if ReactionEmoji::parse(emoji).is_none() {
            return Err(format!(
                "Role {position}: emoji must be a custom emoji like <:name:id> or a single unicode emoji"
            ));
        }
    }

    Ok(())
}
