//! Session identifiers
//!
//! Identifiers are opaque lowercase alphanumeric tokens minted from the OS
//! CSPRNG. Anything a client presents that does not look like one is treated
//! as absent, so a malformed cookie never fails a request.

use crate::error::SessionError;
use rand::Rng;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Characters a session identifier is drawn from
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of freshly minted identifiers (~165 bits of entropy)
pub const DEFAULT_ID_LENGTH: usize = 32;

/// Shortest length accepted for minting
pub const MIN_ID_LENGTH: usize = 16;

/// Longest identifier accepted from a client or for minting
pub const MAX_ID_LENGTH: usize = 128;

/// Opaque session identifier matching `^[a-z0-9]{1,128}$`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Mint a new identifier of [`DEFAULT_ID_LENGTH`] characters
    pub fn generate() -> Self {
        Self::generate_with_length(DEFAULT_ID_LENGTH)
    }

    /// Mint a new identifier of `length` characters.
    ///
    /// The length is clamped to `MIN_ID_LENGTH..=MAX_ID_LENGTH`.
    pub fn generate_with_length(length: usize) -> Self {
        let length = length.clamp(MIN_ID_LENGTH, MAX_ID_LENGTH);
        let mut rng = OsRng;
        let token: String = (0..length)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        Self(token)
    }

    /// Parse a client-supplied value, returning `None` if it is not a valid identifier
    pub fn parse(value: &str) -> Option<Self> {
        if is_valid_token(value) {
            Some(Self(value.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid_token(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_ID_LENGTH
        && value
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for SessionId {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| SessionError::bad_request(format!("Invalid session identifier: {:?}", s)))
    }
}

impl TryFrom<String> for SessionId {
    type Error = SessionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_valid_token(&value) {
            Ok(Self(value))
        } else {
            Err(SessionError::bad_request(format!("Invalid session identifier: {:?}", value)))
        }
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

/// Outcome of resolving the identifier for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedId {
    pub id: SessionId,
    /// `true` when no usable identifier was presented and a new one was minted
    pub minted: bool,
}

/// Resolve the identifier presented in a cookie, minting a fresh one if it is missing or malformed
pub fn resolve_or_create(cookie_value: Option<&str>) -> ResolvedId {
    resolve_or_create_with_length(cookie_value, DEFAULT_ID_LENGTH)
}

/// Same as [`resolve_or_create`], minting identifiers of `length` characters
pub fn resolve_or_create_with_length(cookie_value: Option<&str>, length: usize) -> ResolvedId {
    match cookie_value.and_then(SessionId::parse) {
        Some(id) => ResolvedId { id, minted: false },
        None => ResolvedId {
            id: SessionId::generate_with_length(length),
            minted: true,
        },
    }
}
