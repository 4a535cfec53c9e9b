//! Agent capability token minting and hashing.
//!
//! Tokens look like `csa_<agent_id>_<secret>`. The plaintext is returned to
//! the agent exactly once at registration; only the SHA-256 digest is stored.

use rand::Rng;

use crate::types::DbId;

/// Prefix every agent token starts with.
pub const TOKEN_PREFIX: &str = "csa_";

/// Length of the random secret portion.
pub const SECRET_LENGTH: usize = 32;

/// A freshly minted token.
pub struct MintedToken {
    /// The plaintext token (shown to the agent once, never stored).
    pub plaintext: String,
    /// SHA-256 hex digest of the plaintext (stored in `agents.token_hash`).
    pub hash: String,
}

/// Mint a new token bound to `agent_id`.
pub fn mint_token(agent_id: DbId) -> MintedToken {
    let secret: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect();

    let plaintext = format!("{TOKEN_PREFIX}{agent_id}_{secret}");
    let hash = hash_token(&plaintext);

    MintedToken { plaintext, hash }
}

/// Compute the stored digest of a plaintext token.
pub fn hash_token(token: &str) -> String {
    crate::hashing::sha256_hex(token.as_bytes())
}

/// Extract the agent id embedded in a well-formed token.
///
/// Returns `None` for anything that does not match `csa_<id>_<secret>`.
pub fn embedded_agent_id(token: &str) -> Option<DbId> {
    let rest = token.strip_prefix(TOKEN_PREFIX)?;
    let (id, secret) = rest.split_once('_')?;
    if secret.is_empty() {
        return None;
    }
    id.parse::<DbId>().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_token_embeds_agent_id() {
        let token = mint_token(17);
        assert!(token.plaintext.starts_with("csa_17_"));
        assert_eq!(embedded_agent_id(&token.plaintext), Some(17));
        assert_eq!(token.plaintext.len(), "csa_17_".len() + SECRET_LENGTH);
    }

    #[test]
    fn hash_matches_plaintext() {
        let token = mint_token(3);
        assert_eq!(token.hash, hash_token(&token.plaintext));
        assert_ne!(token.hash, token.plaintext);
    }

    #[test]
    fn two_tokens_for_same_agent_differ() {
        assert_ne!(mint_token(5).plaintext, mint_token(5).plaintext);
    }

    #[test]
    fn malformed_tokens_have_no_agent_id() {
        assert_eq!(embedded_agent_id("Bearer abc"), None);
        assert_eq!(embedded_agent_id("csa_abc_def"), None);
        assert_eq!(embedded_agent_id("csa_12_"), None);
        assert_eq!(embedded_agent_id("csa_0_abc"), None);
        assert_eq!(embedded_agent_id("csa_12"), None);
    }
}
