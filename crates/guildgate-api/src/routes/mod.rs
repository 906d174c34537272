//! API route modules.

pub mod guilds;
pub mod health;
pub mod liveness;
pub mod modules;
pub mod permissions;
pub mod reaction_roles;
