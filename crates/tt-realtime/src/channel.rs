//! Room names.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BroadcastError;

/// A named broadcast group.
///
/// Serialized as its room name: `admin` or `portrait<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Channel {
    /// Game masters.
    Admin,
    /// Everyone following one character's portrait.
    Portrait(i64),
}

impl Channel {
    /// The portrait room for a subject.
    pub fn portrait(subject_id: i64) -> Self {
        Self::Portrait(subject_id)
    }

    /// Returns true for the admin room.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Portrait(id) => write!(f, "portrait{id}"),
        }
    }
}

impl FromStr for Channel {
    type Err = BroadcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "admin" {
            return Ok(Self::Admin);
        }
        s.strip_prefix("portrait")
            .and_then(|id| id.parse::<i64>().ok())
            .map(Self::Portrait)
            .ok_or_else(|| BroadcastError::InvalidRoom(s.to_string()))
    }
}

impl From<Channel> for String {
    fn from(channel: Channel) -> Self {
        channel.to_string()
    }
}

impl TryFrom<String> for Channel {
    type Error = BroadcastError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Channel::Admin.to_string(), "admin");
        assert_eq!(Channel::portrait(7).to_string(), "portrait7");
    }

    #[test]
    fn parse() {
        assert_eq!("admin".parse::<Channel>(), Ok(Channel::Admin));
        assert_eq!("portrait42".parse::<Channel>(), Ok(Channel::Portrait(42)));
        assert!("portrait".parse::<Channel>().is_err());
        assert!("portraitx".parse::<Channel>().is_err());
        assert!("lobby".parse::<Channel>().is_err());
    }

    #[test]
    fn serde_as_room_name() {
        let json = serde_json::to_string(&Channel::portrait(3)).unwrap();
        assert_eq!(json, "\"portrait3\"");
        let back: Channel = serde_json::from_str("\"admin\"").unwrap();
        assert!(back.is_admin());
        assert!(serde_json::from_str::<Channel>("\"nowhere\"").is_err());
    }
}
