//! Community, role and member types
//!
//! Shapes follow the Discord REST payloads so the HTTP client can decode them
//! directly; the in-memory platform builds the same values by hand.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Milliseconds between the Unix epoch and the first second of 2015
const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

// ─────────────────────────────────────────────────────────────────
// Identifiers
// ─────────────────────────────────────────────────────────────────

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map($name)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                string_or_u64(deserializer).map($name)
            }
        }
    };
}

snowflake_id!(
    /// Guild identifier
    CommunityId
);
snowflake_id!(
    /// Role identifier. The `@everyone` role shares its guild's id.
    RoleId
);
snowflake_id!(
    /// User identifier of a guild member
    MemberId
);

impl CommunityId {
    /// Id of this guild's `@everyone` role
    pub fn everyone_role(&self) -> RoleId {
        RoleId(self.0)
    }
}

impl MemberId {
    /// Account creation time encoded in the snowflake
    pub fn created_at(&self) -> DateTime<Utc> {
        snowflake_timestamp(self.0)
    }
}

fn snowflake_timestamp(id: u64) -> DateTime<Utc> {
    let ms = (id >> 22) as i64 + DISCORD_EPOCH_MS;
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Discord encodes 64-bit values as strings; accept either form.
fn string_or_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(u64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
        Raw::Num(n) => Ok(n),
    }
}

// ─────────────────────────────────────────────────────────────────
// Capabilities
// ─────────────────────────────────────────────────────────────────

bitflags! {
    /// Permission bits held by a role, positioned as in the Discord bitfield.
    ///
    /// Bits this crate does not name are kept as received, so writing a set
    /// back never drops permissions the guild already had.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CapabilitySet: u64 {
        const ADD_REACTIONS = 1 << 6;
        const VIEW_CHANNEL = 1 << 10;
        const SEND_MESSAGES = 1 << 11;
        const READ_MESSAGE_HISTORY = 1 << 16;
        const CONNECT = 1 << 20;
        const SPEAK = 1 << 21;
    }
}

impl Default for CapabilitySet {
    fn default() -> Self {
        CapabilitySet::empty()
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.bits())
    }
}

impl Serialize for CapabilitySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.bits())
    }
}

impl<'de> Deserialize<'de> for CapabilitySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        string_or_u64(deserializer).map(CapabilitySet::from_bits_retain)
    }
}

// ─────────────────────────────────────────────────────────────────
// Roles & Members
// ─────────────────────────────────────────────────────────────────

/// A named, assignable capability bundle within a guild
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub permissions: CapabilitySet,
}

/// A guild member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub username: String,
    pub bot: bool,
    pub roles: Vec<RoleId>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl Member {
    pub fn has_role(&self, role: RoleId) -> bool {
        self.roles.contains(&role)
    }

    /// When the member's account was created
    pub fn account_created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }
}

/// First role in API order whose name equals `name`.
///
/// Names are the only identity the lifecycle tracks; duplicates after the
/// first are ignored. The guild's `@everyone` role never matches.
pub fn find_role_by_name<'a>(
    roles: &'a [Role],
    community: CommunityId,
    name: &str,
) -> Option<&'a Role> {
    let everyone = community.everyone_role();
    roles.iter().find(|r| r.id != everyone && r.name == name)
}
