//! One-way password storage
//!
//! Format: `sha256$<iterations>$<salt-hex>$<digest-hex>`. The digest is
//! SHA-256 over salt and password, re-hashed `iterations` times.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;
pub const DEFAULT_ITERATIONS: u32 = 10_000;

pub fn hash_password(password: &str) -> String {
    hash_with_iterations(password, DEFAULT_ITERATIONS)
}

pub fn hash_with_iterations(password: &str, iterations: u32) -> String {
    let salt: [u8; SALT_LEN] = rand::random();
    let iterations = iterations.max(1);
    let digest = stretch(&salt, password.as_bytes(), iterations);
    format!(
        "{SCHEME}${iterations}${}${}",
        hex::encode(salt),
        hex::encode(digest)
    )
}

/// False for a wrong password and for any malformed hash
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(expected)) else {
        return false;
    };
    if iterations == 0 {
        return false;
    }

    let actual = stretch(&salt, password.as_bytes(), iterations);
    actual.as_slice().ct_eq(&expected).into()
}

fn stretch(salt: &[u8], password: &[u8], iterations: u32) -> [u8; 32] {
    let mut digest: [u8; 32] = Sha256::new()
        .chain_update(salt)
        .chain_update(password)
        .finalize()
        .into();
    for _ in 1..iterations {
        digest = Sha256::new()
            .chain_update(digest)
            .chain_update(salt)
            .chain_update(password)
            .finalize()
            .into();
    }
    digest
}
