//! Module authorization policy — which capabilities manage which dashboard module.
//!
//! The table is data, not branching code. A module is manageable when the actor
//! is administrator or holds ANY capability listed for it. Keys missing from the
//! table are denied for everyone except administrators.

use serde::Serialize;

use crate::error::{GateError, GateResult};
use crate::permissions::Permissions;

/// A module key and the capabilities that unlock it (logical OR).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleRule {
    pub key: &'static str,
    pub any_of: Permissions,
}

pub const REACTION_ROLES: &str = "reactionRoles";
pub const MODERATION: &str = "moderation";
pub const ADMINISTRATION: &str = "administration";
pub const VERIFICATION: &str = "verification";

/// Static rule table. Adding a module means adding a row here.
pub const MODULE_RULES: &[ModuleRule] = &[
    ModuleRule {
        key: REACTION_ROLES,
        any_of: Permissions::MANAGE_ROLES,
    },
    ModuleRule {
        key: MODERATION,
        any_of: Permissions::KICK_MEMBERS
            .union(Permissions::BAN_MEMBERS)
            .union(Permissions::MODERATE_MEMBERS),
    },
    ModuleRule {
        key: ADMINISTRATION,
        any_of: Permissions::MANAGE_GUILD,
    },
    ModuleRule {
        key: VERIFICATION,
        any_of: Permissions::MANAGE_GUILD.union(Permissions::MANAGE_ROLES),
    },
];

const MANAGE_GUILD_RULE: ModuleRule = ModuleRule {
    key: "guild",
    any_of: Permissions::MANAGE_GUILD,
};

const MANAGE_ROLES_RULE: ModuleRule = ModuleRule {
    key: "roles",
    any_of: Permissions::MANAGE_ROLES,
};

impl ModuleRule {
    /// Administrator always passes; otherwise at least one listed capability must be present.
    pub fn permits(&self, bitfield: Permissions) -> bool {
        bitfield.is_administrator() || bitfield.intersects(self.any_of)
    }

    /// Capability names in this rule, lower snake case.
    pub fn capability_names(&self) -> Vec<String> {
        self.any_of.capability_names()
    }
}

/// Serializable view of a rule for listing endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleRuleView {
    pub key: &'static str,
    pub capabilities: Vec<String>,
}

impl From<&ModuleRule> for ModuleRuleView {
    fn from(rule: &ModuleRule) -> Self {
        Self {
            key: rule.key,
            capabilities: rule.capability_names(),
        }
    }
}

pub fn rules() -> &'static [ModuleRule] {
    MODULE_RULES
}

pub fn rule_for(module_key: &str) -> Option<&'static ModuleRule> {
    MODULE_RULES.iter().find(|rule| rule.key == module_key)
}

/// Can an actor with `bitfield` manage `module_key`?
pub fn can_manage(module_key: &str, bitfield: Permissions) -> bool {
    if bitfield.is_administrator() {
        return true;
    }
    match rule_for(module_key) {
        Some(rule) => rule.permits(bitfield),
        None => {
            tracing::debug!(module = module_key, "Unknown module, denying non-administrator");
            false
        }
    }
}

/// Same as [`can_manage`] but surfaces the refusal as [`GateError::Denied`].
pub fn require(module_key: &str, bitfield: Permissions) -> GateResult<()> {
    if can_manage(module_key, bitfield) {
        Ok(())
    } else {
        tracing::debug!(module = module_key, permissions = %bitfield, "Module access denied");
        Err(GateError::Denied {
            module: module_key.to_owned(),
        })
    }
}

pub fn can_manage_guild(bitfield: Permissions) -> bool {
    MANAGE_GUILD_RULE.permits(bitfield)
}

pub fn can_manage_roles(bitfield: Permissions) -> bool {
    MANAGE_ROLES_RULE.permits(bitfield)
}

/// Alias of [`can_manage_roles`] for reaction-role call sites.
pub fn can_manage_reaction_roles(bitfield: Permissions) -> bool {
    can_manage_roles(bitfield)
}
