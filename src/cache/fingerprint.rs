use serde::Serialize;
use sha2::{Digest, Sha256};

/// Deterministic digest of request parameters.
///
/// Parameters are converted to a JSON value first; object keys in a
/// `serde_json::Value` are kept sorted, so field order and map insertion
/// order never change the result.
pub fn fingerprint<P: Serialize + ?Sized>(params: &P) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_value(params)?.to_string();
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(digest.iter().map(|byte| format!("{:02x}", byte)).collect())
}
