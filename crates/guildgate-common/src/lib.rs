//! # guildgate-common
//!
//! The authorization core of Guildgate: permission decoding, module policy,
//! guild view aggregation, reaction-role draft validation, and the liveness
//! rate sampler, plus the configuration and error types every other crate uses.
//!
//! Everything except [`sampler`] is pure and performs no I/O.

pub mod config;
pub mod error;
pub mod guilds;
pub mod permissions;
pub mod policy;
pub mod reaction_roles;
pub mod sampler;
pub mod snowflake;
pub mod validation;

pub use error::{GateError, GateResult};
pub use permissions::Permissions;
