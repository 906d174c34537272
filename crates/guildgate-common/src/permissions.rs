//! Permission bitfield decoding — Discord's 64-bit permission integer.
//!
//! Discord ships permissions as a decimal string because several bits sit above
//! the 53-bit range JavaScript clients can represent. Everything here works on a
//! plain `u64`; unknown bits are retained so a bitfield that grows upstream is
//! never silently truncated.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{GateError, GateResult};

bitflags! {
    /// Guild-level permissions as defined by the Discord API.
    ///
    /// Each permission is a single bit. Bit positions must match Discord exactly,
    /// the value is computed upstream and only ever read here.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        const CREATE_INSTANT_INVITE        = 1 << 0;
        const KICK_MEMBERS                 = 1 << 1;
        const BAN_MEMBERS                  = 1 << 2;
        /// Satisfies every other permission check
        const ADMINISTRATOR                = 1 << 3;
        const MANAGE_CHANNELS              = 1 << 4;
        /// Edit guild settings; gates dashboard access to a guild
        const MANAGE_GUILD                 = 1 << 5;
        const ADD_REACTIONS                = 1 << 6;
        const VIEW_AUDIT_LOG               = 1 << 7;
        const PRIORITY_SPEAKER             = 1 << 8;
        const STREAM                       = 1 << 9;
        const VIEW_CHANNEL                 = 1 << 10;
        const SEND_MESSAGES                = 1 << 11;
        const SEND_TTS_MESSAGES            = 1 << 12;
        const MANAGE_MESSAGES              = 1 << 13;
        const EMBED_LINKS                  = 1 << 14;
        const ATTACH_FILES                 = 1 << 15;
        const READ_MESSAGE_HISTORY         = 1 << 16;
        const MENTION_EVERYONE             = 1 << 17;
        const USE_EXTERNAL_EMOJIS          = 1 << 18;
        const VIEW_GUILD_INSIGHTS          = 1 << 19;
        const CONNECT                      = 1 << 20;
        const SPEAK                        = 1 << 21;
        const MUTE_MEMBERS                 = 1 << 22;
        const DEAFEN_MEMBERS               = 1 << 23;
        const MOVE_MEMBERS                 = 1 << 24;
        const USE_VAD                      = 1 << 25;
        const CHANGE_NICKNAME              = 1 << 26;
        const MANAGE_NICKNAMES             = 1 << 27;
        /// Create, edit, and assign roles below the actor's highest role
        const MANAGE_ROLES                 = 1 << 28;
        const MANAGE_WEBHOOKS              = 1 << 29;
        const MANAGE_GUILD_EXPRESSIONS     = 1 << 30;
        const USE_APPLICATION_COMMANDS     = 1 << 31;
        const REQUEST_TO_SPEAK             = 1 << 32;
        const MANAGE_EVENTS                = 1 << 33;
        const MANAGE_THREADS               = 1 << 34;
        const CREATE_PUBLIC_THREADS        = 1 << 35;
        const CREATE_PRIVATE_THREADS       = 1 << 36;
        const USE_EXTERNAL_STICKERS        = 1 << 37;
        const SEND_MESSAGES_IN_THREADS     = 1 << 38;
        const USE_EMBEDDED_ACTIVITIES      = 1 << 39;
        /// Timeout members
        const MODERATE_MEMBERS             = 1 << 40;
        const VIEW_CREATOR_MONETIZATION_ANALYTICS = 1 << 41;
        const USE_SOUNDBOARD               = 1 << 42;
        const CREATE_GUILD_EXPRESSIONS     = 1 << 43;
        const CREATE_EVENTS                = 1 << 44;
    }
}

/// Highest bit position a 64-bit permission field can carry.
pub const MAX_BIT_POSITION: u32 = 63;

impl Permissions {
    /// Parse Discord's decimal-string wire format.
    ///
    /// Only ASCII digits are accepted; signs, whitespace, and values above
    /// `u64::MAX` are rejected with [`GateError::InvalidArgument`].
    pub fn parse(raw: &str) -> GateResult<Self> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GateError::invalid_argument(format!(
                "permission bitfield must be a non-negative decimal integer, got {raw:?}"
            )));
        }
        let bits = raw.parse::<u64>().map_err(|_| {
            GateError::invalid_argument(format!("permission bitfield {raw} exceeds 64 bits"))
        })?;
        Ok(Self::from_bits_retain(bits))
    }

    /// Exact bit test, no administrator shortcut.
    pub fn has(&self, capability: Permissions) -> bool {
        self.contains(capability)
    }

    /// Check if administrator (overrides all other checks).
    pub fn is_administrator(&self) -> bool {
        self.contains(Self::ADMINISTRATOR)
    }

    /// Test an arbitrary bit position, named or not.
    pub fn has_bit(&self, position: u32) -> GateResult<bool> {
        if position > MAX_BIT_POSITION {
            return Err(GateError::invalid_argument(format!(
                "bit position {position} is outside a 64-bit permission field"
            )));
        }
        let mask = 1u64 << position;
        Ok(self.bits() & mask == mask)
    }

    /// Names of every named capability present, lower snake case (`manage_guild`).
    ///
    /// Unknown high bits have no name and are not listed.
    pub fn capability_names(&self) -> Vec<String> {
        self.iter_names()
            .map(|(name, _)| name.to_ascii_lowercase())
            .collect()
    }
}

/// Look up a single named capability. Accepts `manage_guild` or `MANAGE_GUILD`.
pub fn capability(name: &str) -> Option<Permissions> {
    Permissions::from_name(&name.to_ascii_uppercase())
}

/// Decode a bitfield into its capability set.
pub fn decode(bitfield: Permissions) -> Vec<String> {
    bitfield.capability_names()
}

impl FromStr for Permissions {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

// Serialized as a decimal string, the way Discord sends it.
impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.bits())
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BitfieldVisitor;

        impl Visitor<'_> for BitfieldVisitor {
            type Value = Permissions;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a permission bitfield as a decimal string or unsigned integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Permissions::parse(v).map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Permissions::from_bits_retain(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v)
                    .map(Permissions::from_bits_retain)
                    .map_err(|_| E::custom("permission bitfield cannot be negative"))
            }
        }

        deserializer.deserialize_any(BitfieldVisitor)
    }
}
