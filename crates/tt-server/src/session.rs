//! Player sessions.
//!
//! Session mechanics live outside this crate; the service only needs to turn
//! an incoming request into an optional [`Player`].

use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

/// Header carrying the session token.
pub const SESSION_HEADER: &str = "x-session-token";

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player identity; also names the caller's portrait room.
    pub id: i64,
    /// Whether the player is a game master.
    pub admin: bool,
}

impl Player {
    /// A regular player.
    pub fn new(id: i64) -> Self {
        Self { id, admin: false }
    }

    /// A game master.
    pub fn admin(id: i64) -> Self {
        Self { id, admin: true }
    }
}

/// Resolves the caller of a request.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// The player behind these headers, if any.
    async fn resolve(&self, headers: &HeaderMap) -> Option<Player>;
}

/// A fixed token table, loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticSessions {
    tokens: HashMap<String, Player>,
}

impl StaticSessions {
    /// An empty table; every request is anonymous.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token.
    pub fn with_token(mut self, token: impl Into<String>, player: Player) -> Self {
        self.tokens.insert(token.into(), player);
        self
    }

    /// Number of known tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if no tokens are configured.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl FromIterator<(String, Player)> for StaticSessions {
    fn from_iter<I: IntoIterator<Item = (String, Player)>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl SessionResolver for StaticSessions {
    async fn resolve(&self, headers: &HeaderMap) -> Option<Player> {
        let token = headers.get(SESSION_HEADER)?.to_str().ok()?.trim();
        self.tokens.get(token).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_str(token).unwrap());
        headers
    }

    #[tokio::test]
    async fn resolves_known_token() {
        let sessions = StaticSessions::new()
            .with_token("gm", Player::admin(1))
            .with_token("alice", Player::new(7));
        assert_eq!(sessions.resolve(&headers("alice")).await, Some(Player::new(7)));
        assert_eq!(sessions.resolve(&headers("gm")).await, Some(Player::admin(1)));
    }

    #[tokio::test]
    async fn unknown_or_missing_token_is_anonymous() {
        let sessions = StaticSessions::new().with_token("alice", Player::new(7));
        assert_eq!(sessions.resolve(&headers("mallory")).await, None);
        assert_eq!(sessions.resolve(&HeaderMap::new()).await, None);
    }
}
