// fingerprint.rs — SHA-256 content fingerprints.
//
// Fingerprints are lowercase hex SHA-256 digests (64 characters). They are
// exact: any byte change in the input produces a different fingerprint.

use sha2::{Digest, Sha256};

/// Fingerprint of one step's content: `prompt + "|" + output`.
pub fn content_fingerprint(prompt: &str, output: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    hasher.update(b"|");
    hasher.update(output.as_bytes());
    format!("{:x}", hasher.finalize())
}
