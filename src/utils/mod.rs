//! Utility functions and helpers.

pub mod cdn;
pub mod http;
pub mod text;
pub mod url;

use sha2::{Digest, Sha256};

/// One-way tag for an originating address.
///
/// Likes record where they came from without storing the raw address.
pub fn address_tag(address: &str) -> String {
    let digest = Sha256::digest(address.trim().as_bytes());
    hex::encode(digest)
}
