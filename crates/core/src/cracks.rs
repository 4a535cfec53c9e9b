//! Crack submission validation and zap list formatting.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A recovered plaintext for one hash, as reported by the task holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrackSubmission {
    pub hash: String,
    pub plain_text: String,
}

impl CrackSubmission {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.hash.trim().is_empty() {
            return Err(CoreError::Validation("hash must not be empty".into()));
        }
        if self.plain_text.contains('\0') {
            return Err(CoreError::Validation(
                "plain_text must not contain NUL bytes".into(),
            ));
        }
        Ok(())
    }
}

/// Render already-cracked pairs as `hash:plain` lines for the agent to skip.
pub fn format_zaps<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut out = String::new();
    for (hash, plain) in pairs {
        out.push_str(hash);
        out.push(':');
        out.push_str(plain);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_plaintext_is_allowed() {
        let crack = CrackSubmission {
            hash: "5f4dcc3b5aa765d61d8327deb882cf99".into(),
            plain_text: String::new(),
        };
        assert!(crack.validate().is_ok());
    }

    #[test]
    fn blank_hash_is_rejected() {
        let crack = CrackSubmission {
            hash: " ".into(),
            plain_text: "password".into(),
        };
        assert!(crack.validate().is_err());
    }

    #[test]
    fn zaps_are_newline_terminated() {
        let out = format_zaps([("aa", "one"), ("bb", "two")]);
        assert_eq!(out, "aa:one\nbb:two\n");
        assert_eq!(format_zaps(std::iter::empty()), "");
    }
}
