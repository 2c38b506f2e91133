//! Opaque access tokens for deep links.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Random bytes per token (256 bits).
const TOKEN_BYTES: usize = 32;

/// Unguessable, URL-safe token that identifies a share in deep links.
///
/// Never derived from the share id, so resolving a link leaks nothing
/// about internal identifiers.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Generates a fresh token from the OS random source.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Wraps a token read back from storage or a request.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ValidationError::empty_field("token"));
        }
        let url_safe = raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !url_safe || raw.len() > 128 {
            return Err(ValidationError::invalid_format("token", "not a share token"));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are bearer credentials; keep them out of logs.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "AccessToken({}…)", prefix)
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the bot deep link for a share token.
pub fn deep_link(bot_username: &str, token: &AccessToken) -> String {
    format!("https://t.me/{}?start=share_{}", bot_username, token.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_tokens_are_url_safe_and_long_enough() {
        let token = AccessToken::generate();
        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(token.as_str().len(), 43);
        assert!(AccessToken::parse(token.as_str()).is_ok());
    }

    #[test]
    fn generated_tokens_do_not_collide() {
        let tokens: HashSet<_> = (0..1000).map(|_| AccessToken::generate()).collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn parse_rejects_empty_and_unsafe_input() {
        assert!(AccessToken::parse("").is_err());
        assert!(AccessToken::parse("abc/def").is_err());
        assert!(AccessToken::parse("a b").is_err());
    }

    #[test]
    fn debug_output_masks_the_token() {
        let token = AccessToken::parse("abcdefghijkl").unwrap();
        assert_eq!(format!("{:?}", token), "AccessToken(abcd…)");
    }

    #[test]
    fn deep_link_uses_token_only() {
        let token = AccessToken::parse("tok_123").unwrap();
        assert_eq!(deep_link("netbot", &token), "https://t.me/netbot?start=share_tok_123");
    }
}
