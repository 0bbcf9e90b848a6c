use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::YpError;
use crate::serde::to_canonical_json_bytes;

/// Computes a stable SHA-256 hex digest of the canonical JSON of `value`.
///
/// Randomized reports record this digest of their inputs and options so two
/// artefacts can be matched to the invocation that produced them.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, YpError> {
    let bytes = to_canonical_json_bytes(value)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}
