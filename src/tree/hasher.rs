//! Hash computation for source tree nodes
//!
//! Digests are BLAKE3 hashes rendered as lowercase hex and truncated to
//! [`DIGEST_HEX_LEN`] characters.

use crate::types::Digest;

/// Number of hex characters kept from the full BLAKE3 digest
pub const DIGEST_HEX_LEN: usize = 16;

/// Separator between digests in an interior node's hash input.
/// Not part of the hex alphabet.
const SEPARATOR: &str = "|";

/// Compute the digest of a node's own content.
pub fn compute_leaf_hash(content: &str) -> Digest {
    let hash = blake3::hash(content.as_bytes());
    hex::encode(&hash.as_bytes()[..DIGEST_HEX_LEN / 2])
}

/// Compute the digest of an interior node from its own digest and the digests
/// of its children.
///
/// Child digests are sorted first, so the result does not depend on the order
/// in which children were enumerated.
pub fn compute_node_hash(own: &str, children: &[Digest]) -> Digest {
    let mut sorted: Vec<&str> = children.iter().map(String::as_str).collect();
    sorted.sort_unstable();

    let mut combined = String::with_capacity(own.len() + sorted.len() * (DIGEST_HEX_LEN + 1));
    combined.push_str(own);
    for child in sorted {
        combined.push_str(SEPARATOR);
        combined.push_str(child);
    }
    compute_leaf_hash(&combined)
}
