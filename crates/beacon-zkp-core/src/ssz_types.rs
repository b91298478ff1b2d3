//! Native (non-circuit) SSZ header and Merkle-proof types.
//!
//! These are the plain-data shapes that witness generation reads from; the in-circuit
//! gadgets in `beacon-zkp-ssz` re-derive the same roots over allocated bits and assert
//! equality, never trusting these values directly.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

/// A Phase-0 beacon block header: five 32-byte SSZ fields, Merkleized over 8 padded leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconBlockHeader {
    /// Slot, little-endian `u64` zero-padded to 32 bytes.
    pub slot: [u8; 32],
    /// Validator index of the proposer, little-endian `u64` zero-padded to 32 bytes.
    pub proposer_index: [u8; 32],
    /// SSZ root of the parent block header.
    pub parent_root: [u8; 32],
    /// SSZ root of the beacon state after this block.
    pub state_root: [u8; 32],
    /// SSZ root of the block body.
    pub body_root: [u8; 32],
}

impl BeaconBlockHeader {
    /// The eight SSZ leaves (five fields plus three zero leaves padding to the next power of
    /// two), in field order.
    #[must_use]
    pub fn leaves(&self) -> [[u8; 32]; 8] {
        [
            self.slot,
            self.proposer_index,
            self.parent_root,
            self.state_root,
            self.body_root,
            [0_u8; 32],
            [0_u8; 32],
            [0_u8; 32],
        ]
    }

    /// Computes the SSZ hash-tree-root: three layers of pairwise SHA-256 over `leaves()`.
    #[must_use]
    pub fn hash_tree_root(&self) -> [u8; 32] {
        let mut layer = self.leaves().to_vec();
        while layer.len() > 1 {
            layer = sha256_layer(&layer);
        }
        layer
            .first()
            .copied()
            .unwrap_or_else(|| unreachable!("hash_tree_root layer never empties"))
    }
}

/// Computes `SHA256(left || right)`.
#[must_use]
pub fn sha256_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Reduces `2p` 32-byte nodes to `p` nodes via pairwise SHA-256 (the native counterpart of the
/// in-circuit `SSZLayer` gadget).
#[must_use]
pub fn sha256_layer(nodes: &[[u8; 32]]) -> Vec<[u8; 32]> {
    assert!(nodes.len() % 2 == 0, "SSZLayer requires an even number of input nodes");
    nodes
        .chunks_exact(2)
        .map(|pair| {
            let (Some(left), Some(right)) = (pair.first(), pair.get(1)) else {
                unreachable!("chunks_exact(2) always yields pairs");
            };
            sha256_pair(left, right)
        })
        .collect()
}

/// A Merkle inclusion proof: a leaf, its generalized index, and the sibling hashes from leaf
/// to root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// The leaf value being proven.
    pub leaf: [u8; 32],
    /// The leaf's index among `2^depth` leaves; bit `l` selects left/right at depth `l`.
    pub index: u64,
    /// Sibling hashes, ordered from the leaf's level up to the root.
    pub branch: Vec<[u8; 32]>,
}

impl MerkleProof {
    /// Restores the Merkle root implied by `leaf`, `branch`, and `index`.
    ///
    /// At depth `l`, bit `l` of `index` selects orientation: `1` means the accumulator is the
    /// right child (sibling is the left), `0` means the accumulator is the left child.
    #[must_use]
    pub fn restore_root(&self) -> [u8; 32] {
        let mut acc = self.leaf;
        for (level, sibling) in self.branch.iter().enumerate() {
            let bit = (self.index >> level) & 1 == 1;
            acc = if bit { sha256_pair(sibling, &acc) } else { sha256_pair(&acc, sibling) };
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::{BeaconBlockHeader, MerkleProof, sha256_pair};

    #[test]
    fn header_root_is_stable() {
        let header = BeaconBlockHeader {
            slot: [1_u8; 32],
            proposer_index: [2_u8; 32],
            parent_root: [3_u8; 32],
            state_root: [4_u8; 32],
            body_root: [5_u8; 32],
        };
        let root_a = header.hash_tree_root();
        let root_b = header.hash_tree_root();
        assert_eq!(root_a, root_b);
        assert_ne!(root_a, [0_u8; 32]);
    }

    #[test]
    fn restore_root_matches_textbook_construction() {
        let leaf = [7_u8; 32];
        let sibling0 = [8_u8; 32];
        let sibling1 = [9_u8; 32];

        // index = 0b10: level 0 leaf is left child, level 1 accumulator is right child.
        let proof = MerkleProof { leaf, index: 0b10, branch: vec![sibling0, sibling1] };

        let level0 = sha256_pair(&leaf, &sibling0);
        let expected = sha256_pair(&sibling1, &level0);

        assert_eq!(proof.restore_root(), expected);
    }

    #[test]
    fn restore_root_over_random_branches_matches_reference() {
        use sha2::{Digest as _, Sha256};

        for seed in 0_u8..32 {
            let leaf = Sha256::digest([seed]).into();
            let depth = 1 + usize::from(seed % 8);
            let branch: Vec<[u8; 32]> = (0..depth)
                .map(|i| Sha256::digest([seed, i as u8]).into())
                .collect();
            let index = u64::from(seed) % (1_u64 << depth);

            let proof = MerkleProof { leaf, index, branch: branch.clone() };

            let mut reference = leaf;
            for (level, sibling) in branch.iter().enumerate() {
                reference = if (index >> level) & 1 == 1 {
                    sha256_pair(sibling, &reference)
                } else {
                    sha256_pair(&reference, sibling)
                };
            }

            assert_eq!(proof.restore_root(), reference);
        }
    }
}
