//! Control-token scheme.

use crate::error::AuthError;

/// True when `supplied` is non-empty and equals `control`.
///
/// Plain string equality, not constant-time. Revisit with a constant-time
/// comparison before exposing this to untrusted networks.
pub fn token_matches(supplied: &str, control: &str) -> bool {
    !supplied.is_empty() && supplied == control
}

/// [`token_matches`] as a `Result`.
pub fn check_token(supplied: &str, control: &str) -> Result<(), AuthError> {
    if token_matches(supplied, control) {
        Ok(())
    } else {
        Err(AuthError::TokenMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_matches() {
        assert!(token_matches("secret", "secret"));
        assert!(!token_matches("secret", "Secret"));
        assert!(!token_matches("secret", ""));
    }

    #[test]
    fn test_empty_token_never_matches() {
        assert!(!token_matches("", ""));
        assert!(!token_matches("", "secret"));
        assert_eq!(check_token("", ""), Err(AuthError::TokenMismatch));
    }
}
