//! Stable provenance hashing for replay verification
//!
//! The preimage is `{kind, provenance_version, role, provenance}` serialized
//! as RFC 8785 canonical JSON, so key order never affects the digest.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::SalienceError;
use crate::scorer::Provenance;

/// Default preimage kind for salience provenance
pub const PROVENANCE_KIND: &str = "temporal_gradient.salience_provenance";

/// Current provenance preimage version
pub const PROVENANCE_VERSION: &str = "1";

#[derive(Serialize)]
struct Preimage<'a> {
    kind: &'a str,
    provenance_version: &'a str,
    role: &'a str,
    provenance: &'a Provenance,
}

/// Parameters of the hash preimage besides the provenance map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams<'a> {
    pub kind: &'a str,
    pub provenance_version: &'a str,
    pub role: &'a str,
}

impl Default for HashParams<'_> {
    fn default() -> Self {
        Self {
            kind: PROVENANCE_KIND,
            provenance_version: PROVENANCE_VERSION,
            role: "pipeline",
        }
    }
}

/// Hex SHA-256 over the canonical preimage
pub fn compute_provenance_hash(
    provenance: &Provenance,
    params: HashParams<'_>,
) -> Result<String, SalienceError> {
    let preimage = Preimage {
        kind: params.kind,
        provenance_version: params.provenance_version,
        role: params.role,
        provenance,
    };
    let bytes =
        serde_jcs::to_vec(&preimage).map_err(|e| SalienceError::Provenance(e.to_string()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}
