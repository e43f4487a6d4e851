//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! handler
//!     → precheck.rs (body is JSON → BaseRequest → token check)
//!     → Authenticator::verify_signature / verify_user_signature
//!         → signature.rs (pooled MD5 over timestamp/secret/user)
//!         → mismatch: envelope gets SIGNATURE_MISMATCH
//!     → business logic
//! ```
//!
//! # Design Decisions
//! - Invoked by handlers, never by the dispatcher
//! - Fail closed: any missing or mismatched field is a rejection, never a panic
//! - Token comparison is plain equality (not constant-time)

pub mod precheck;
pub mod signature;
pub mod token;

use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::http::ResponseEnvelope;

pub use precheck::precheck;
pub use signature::{
    DigestPool, SignedRequest, UserSignedRequest, SIGNATURE_MISMATCH, SIGNATURE_MISMATCH_MESSAGE,
};
pub use token::token_matches;

/// Verifies control tokens and request signatures.
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    control_token: String,
    shared_secret: String,
    digests: DigestPool,
}

impl Authenticator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            control_token: config.control_token.clone(),
            shared_secret: config.shared_secret.clone(),
            digests: DigestPool::new(),
        }
    }

    /// Token scheme.
    pub fn verify_token(&self, supplied: &str) -> bool {
        token::token_matches(supplied, &self.control_token)
    }

    pub fn check_token(&self, supplied: &str) -> Result<(), AuthError> {
        token::check_token(supplied, &self.control_token)
    }

    /// Signature a client must send for `timestamp`.
    pub fn sign(&self, timestamp: i64) -> String {
        signature::plain_signature(&self.digests, timestamp, &self.shared_secret)
    }

    /// Signature a client must send for `user` at `timestamp`.
    pub fn sign_user(&self, user: &str, timestamp: i64) -> String {
        signature::user_signature(&self.digests, user, &self.shared_secret, timestamp)
    }

    /// Plain signature scheme. Marks `response` on mismatch.
    pub fn verify_signature<R>(&self, request: &R, response: &mut ResponseEnvelope) -> bool
    where
        R: SignedRequest + ?Sized,
    {
        let expected = self.sign(request.timestamp());
        Self::settle(expected == request.signature(), response)
    }

    /// User-scoped signature scheme. Marks `response` on mismatch.
    pub fn verify_user_signature<R>(&self, request: &R, response: &mut ResponseEnvelope) -> bool
    where
        R: UserSignedRequest + ?Sized,
    {
        let expected = self.sign_user(request.user(), request.timestamp());
        Self::settle(expected == request.signature(), response)
    }

    fn settle(matched: bool, response: &mut ResponseEnvelope) -> bool {
        if !matched {
            response.set_error(SIGNATURE_MISMATCH, SIGNATURE_MISMATCH_MESSAGE);
        }
        matched
    }

    /// Hex MD5 of the current UNIX time in nanoseconds followed by `salt`.
    ///
    /// Unpredictable enough for request nonces, not for key material.
    pub fn generate_random(&self, salt: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
            .to_string();
        self.digests.hex_digest(&[nanos.as_bytes(), salt.as_bytes()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Signed {
        user: String,
        time: i64,
        sign: String,
    }

    impl SignedRequest for Signed {
        fn timestamp(&self) -> i64 {
            self.time
        }
        fn signature(&self) -> &str {
            &self.sign
        }
    }

    impl UserSignedRequest for Signed {
        fn user(&self) -> &str {
            &self.user
        }
    }

    fn auth(secret: &str) -> Authenticator {
        Authenticator::new(&AuthConfig {
            control_token: "control".into(),
            shared_secret: secret.into(),
        })
    }

    #[test]
    fn test_valid_signature() {
        let a = auth("s3cret");
        let req = Signed {
            user: String::new(),
            time: 1_700_000_000,
            sign: a.sign(1_700_000_000),
        };
        let mut resp = ResponseEnvelope::default();
        assert!(a.verify_signature(&req, &mut resp));
        assert_eq!(resp, ResponseEnvelope::default());
    }

    #[test]
    fn test_any_changed_byte_fails() {
        let a = auth("s3cret");
        let good = a.sign(1_700_000_000);

        // timestamp
        let req = Signed {
            user: String::new(),
            time: 1_700_000_001,
            sign: good.clone(),
        };
        let mut resp = ResponseEnvelope::default();
        assert!(!a.verify_signature(&req, &mut resp));
        assert_eq!(resp.code, SIGNATURE_MISMATCH);
        assert_eq!(resp.message, SIGNATURE_MISMATCH_MESSAGE);

        // secret
        let req = Signed {
            user: String::new(),
            time: 1_700_000_000,
            sign: good.clone(),
        };
        assert!(!auth("s3creT").verify_signature(&req, &mut ResponseEnvelope::default()));

        // signature
        let mut tampered = good.into_bytes();
        tampered[0] = if tampered[0] == b'0' { b'1' } else { b'0' };
        let req = Signed {
            user: String::new(),
            time: 1_700_000_000,
            sign: String::from_utf8(tampered).unwrap(),
        };
        assert!(!a.verify_signature(&req, &mut ResponseEnvelope::default()));
    }

    #[test]
    fn test_user_signature() {
        let a = auth("s3cret");
        let mut req = Signed {
            user: "alice".into(),
            time: 99,
            sign: a.sign_user("alice", 99),
        };
        assert!(a.verify_user_signature(&req, &mut ResponseEnvelope::default()));

        req.user = "bob".into();
        let mut resp = ResponseEnvelope::default();
        assert!(!a.verify_user_signature(&req, &mut resp));
        assert_eq!(resp.code, SIGNATURE_MISMATCH);
    }

    #[test]
    fn test_empty_signature_fails() {
        let a = auth("");
        let req = Signed {
            user: String::new(),
            time: 0,
            sign: String::new(),
        };
        assert!(!a.verify_signature(&req, &mut ResponseEnvelope::default()));
    }

    #[test]
    fn test_token() {
        let a = auth("x");
        assert!(a.verify_token("control"));
        assert!(!a.verify_token(""));
        assert_eq!(a.check_token("nope"), Err(AuthError::TokenMismatch));

        let open = Authenticator::default();
        assert!(!open.verify_token(""));
    }

    #[test]
    fn test_generate_random() {
        let a = auth("x");
        let r = a.generate_random("salt");
        assert_eq!(r.len(), 32);
        assert!(r.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
