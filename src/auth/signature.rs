//! Keyed-digest signature scheme.
//!
//! # Wire contract
//! - plain: `hex(md5(timestamp || secret))`
//! - user-scoped: `hex(md5(user || secret || timestamp))`
//!
//! The timestamp is written as a base-10 integer. Concatenation order is part
//! of the contract; clients compute the same digest.

use md5::{Digest, Md5};

use crate::pool::{Pool, Reusable};

/// Envelope code set when a signature does not match.
pub const SIGNATURE_MISMATCH: i32 = 401;

/// Envelope message set when a signature does not match.
pub const SIGNATURE_MISMATCH_MESSAGE: &str = "Signature mismatched";

/// A request carrying a timestamp and a signature over it.
pub trait SignedRequest {
    fn timestamp(&self) -> i64;
    fn signature(&self) -> &str;
}

/// A signed request scoped to a user identifier.
pub trait UserSignedRequest: SignedRequest {
    fn user(&self) -> &str;
}

impl Reusable for Md5 {
    fn reset(&mut self) {
        Digest::reset(self);
    }
}

/// Pool of MD5 digest computers.
#[derive(Debug, Clone, Default)]
pub struct DigestPool {
    pool: Pool<Md5>,
}

impl DigestPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hex digest of `parts` written in order.
    ///
    /// The computer is reset and returned to the pool on every path.
    pub fn hex_digest(&self, parts: &[&[u8]]) -> String {
        let mut hasher = self.pool.acquire();
        for part in parts {
            hasher.update(part);
        }
        let out = hasher.finalize_reset();
        hasher.release();
        hex::encode(out)
    }

    /// Computers currently parked in the pool.
    pub fn idle(&self) -> usize {
        self.pool.idle()
    }
}

/// Signature for the plain scheme.
pub fn plain_signature(digests: &DigestPool, timestamp: i64, secret: &str) -> String {
    let ts = timestamp.to_string();
    digests.hex_digest(&[ts.as_bytes(), secret.as_bytes()])
}

/// Signature for the user-scoped scheme.
pub fn user_signature(digests: &DigestPool, user: &str, secret: &str, timestamp: i64) -> String {
    let ts = timestamp.to_string();
    digests.hex_digest(&[user.as_bytes(), secret.as_bytes(), ts.as_bytes()])
}
