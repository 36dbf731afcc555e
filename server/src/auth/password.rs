//! Salted SHA-256 password digests, stored as `salt$digest` hex.
//!
//! Demo-grade: good enough to keep plaintext out of the store, not a
//! substitute for a memory-hard KDF.

use rand::Rng;
use sha2::{Digest, Sha256};

fn digest(salt_hex: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn hash(password: &str) -> String {
    let salt: [u8; 16] = rand::rng().random();
    let salt_hex = hex::encode(salt);
    let digest = digest(&salt_hex, password);
    format!("{salt_hex}${digest}")
}

pub fn verify(password: &str, stored: &str) -> bool {
    let Some((salt_hex, expected)) = stored.split_once('$') else {
        return false;
    };
    digest(salt_hex, password) == expected
}
