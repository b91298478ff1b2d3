//! SSZ hash-tree-root gadgets over SHA-256: `SSZLayer`, `SSZArray`, the Phase-0
//! header/sync-committee/signing-root shapes built from it, and `SSZRestoreMerkleRoot`.
//!
//! Every node is a 32-byte value represented as 256 [`Boolean`] bits, MSB-first per byte, the
//! same convention `bellman::gadgets::sha256` expects and [`crate::poseidon`]'s sibling
//! `beacon-zkp-curve::hash_to_curve` module uses.

use bellman::gadgets::boolean::{AllocatedBit, Boolean};
use bellman::gadgets::sha256::sha256;
use bellman::{ConstraintSystem, SynthesisError};
use bls12_381::Scalar;

/// Bits in one SSZ/SHA-256 node.
const NODE_BITS: usize = 256;

/// Witnesses a 32-byte array as 256 MSB-first-per-byte bits.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation failure.
pub fn witness_bytes_be<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    bytes: Option<&[u8; 32]>,
) -> Result<Vec<Boolean>, SynthesisError> {
    let mut bits = Vec::with_capacity(NODE_BITS);
    for byte_idx in 0..32 {
        for bit_idx in (0..8).rev() {
            let value = bytes.map(|b| (b[byte_idx] >> bit_idx) & 1 == 1);
            let bit = AllocatedBit::alloc(cs.namespace(|| format!("byte {byte_idx} bit {bit_idx}")), value)?;
            bits.push(Boolean::from(bit));
        }
    }
    Ok(bits)
}

fn zero_bits<CS: ConstraintSystem<Scalar>>(mut cs: CS, num_bits: usize) -> Result<Vec<Boolean>, SynthesisError> {
    (0..num_bits)
        .map(|i| AllocatedBit::alloc(cs.namespace(|| format!("zero bit {i}")), Some(false)).map(Boolean::from))
        .collect()
}

fn zero_node<CS: ConstraintSystem<Scalar>>(cs: CS) -> Result<Vec<Boolean>, SynthesisError> {
    zero_bits(cs, NODE_BITS)
}

/// `SHA256(left || right)` over bit-vector nodes.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn sha256_pair_bits<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    left: &[Boolean],
    right: &[Boolean],
) -> Result<Vec<Boolean>, SynthesisError> {
    assert_eq!(left.len(), NODE_BITS, "SSZ nodes are 32 bytes");
    assert_eq!(right.len(), NODE_BITS, "SSZ nodes are 32 bytes");
    let mut preimage = Vec::with_capacity(NODE_BITS * 2);
    preimage.extend_from_slice(left);
    preimage.extend_from_slice(right);
    sha256(cs.namespace(|| "sha256(left || right)"), &preimage)
}

/// `SSZLayer`: reduces `2p` nodes to `p` nodes via pairwise SHA-256.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn ssz_layer<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    nodes: &[Vec<Boolean>],
) -> Result<Vec<Vec<Boolean>>, SynthesisError> {
    assert!(nodes.len() % 2 == 0, "SSZLayer requires an even number of input nodes");
    nodes
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| {
            let (Some(left), Some(right)) = (pair.first(), pair.get(1)) else {
                unreachable!("chunks_exact(2) always yields pairs");
            };
            sha256_pair_bits(cs.namespace(|| format!("pair {i}")), left, right)
        })
        .collect()
}

/// `SSZArray(n_bytes, log2b)`: iterates `log2b` [`ssz_layer`] rounds over `2^log2b` leaves,
/// reducing them to a single root.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn ssz_array<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    leaves: Vec<Vec<Boolean>>,
    log2b: u32,
) -> Result<Vec<Boolean>, SynthesisError> {
    assert_eq!(leaves.len(), 1_usize << log2b, "SSZArray leaf count must equal 2^log2b");
    let mut layer = leaves;
    for round in 0..log2b {
        layer = ssz_layer(cs.namespace(|| format!("layer {round}")), &layer)?;
    }
    layer.into_iter().next().ok_or(SynthesisError::Unsatisfiable)
}

/// The five SSZ fields of a Phase-0 beacon block header, each a 32-byte node.
pub struct HeaderFields {
    /// Slot.
    pub slot: Vec<Boolean>,
    /// Proposer index.
    pub proposer_index: Vec<Boolean>,
    /// Parent root.
    pub parent_root: Vec<Boolean>,
    /// State root.
    pub state_root: Vec<Boolean>,
    /// Body root.
    pub body_root: Vec<Boolean>,
}

/// `SSZPhase0BeaconBlockHeader`: packs the five header fields plus three zero leaves and
/// `SSZArray`s them to depth 3.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn ssz_phase0_beacon_block_header<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    fields: HeaderFields,
) -> Result<Vec<Boolean>, SynthesisError> {
    let leaves = vec![
        fields.slot,
        fields.proposer_index,
        fields.parent_root,
        fields.state_root,
        fields.body_root,
        zero_node(cs.namespace(|| "zero leaf 0"))?,
        zero_node(cs.namespace(|| "zero leaf 1"))?,
        zero_node(cs.namespace(|| "zero leaf 2"))?,
    ];
    ssz_array(cs.namespace(|| "header array"), leaves, 3)
}

/// Zero-pads a compressed (48-byte) G1 encoding to a 64-byte SSZ basic-vector chunk pair and
/// Merkleizes it to a single 32-byte leaf.
#[allow(clippy::indexing_slicing, reason = "padded is built to exactly 2*NODE_BITS above")]
fn pad_and_hash_pubkey<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    pubkey_bits: &[Boolean],
) -> Result<Vec<Boolean>, SynthesisError> {
    assert_eq!(pubkey_bits.len(), 48 * 8, "compressed G1 encoding is 48 bytes");
    let mut padded = pubkey_bits.to_vec();
    padded.extend(zero_bits(cs.namespace(|| "pad zeros"), 16 * 8)?);
    let chunks = vec![padded[..NODE_BITS].to_vec(), padded[NODE_BITS..].to_vec()];
    ssz_array(cs.namespace(|| "pubkey chunk pair"), chunks, 1)
}

/// `SSZPhase0SyncCommittee`: builds a `SYNC_COMMITTEE_SIZE`-leaf tree over zero-padded 64-byte
/// public-key encodings, then combines it with the zero-padded aggregate key via
/// `SHA256(pubkeys_root || aggregate_root)`.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn ssz_phase0_sync_committee<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    pubkeys_bits: &[Vec<Boolean>],
    aggregate_pubkey_bits: &[Boolean],
) -> Result<Vec<Boolean>, SynthesisError> {
    let log2_committee = beacon_zkp_core::constants::LOG2_SYNC_COMMITTEE_SIZE;
    assert_eq!(
        pubkeys_bits.len(),
        1_usize << log2_committee,
        "SSZPhase0SyncCommittee requires SYNC_COMMITTEE_SIZE pubkeys"
    );

    let leaves = pubkeys_bits
        .iter()
        .enumerate()
        .map(|(i, bits)| pad_and_hash_pubkey(cs.namespace(|| format!("pubkey leaf {i}")), bits))
        .collect::<Result<Vec<_>, _>>()?;
    let pubkeys_root = ssz_array(cs.namespace(|| "pubkeys tree"), leaves, log2_committee)?;

    let aggregate_root =
        pad_and_hash_pubkey(cs.namespace(|| "aggregate leaf"), aggregate_pubkey_bits)?;

    sha256_pair_bits(cs.namespace(|| "committee root"), &pubkeys_root, &aggregate_root)
}

/// Native counterpart of [`pad_and_hash_pubkey`]: zero-pads a compressed key to 64 bytes and
/// Merkleizes the two 32-byte chunks.
fn native_pubkey_leaf(pubkey: &[u8; beacon_zkp_core::constants::G1_POINT_SIZE]) -> [u8; 32] {
    use beacon_zkp_core::ssz_types::sha256_pair;

    let mut padded = [0_u8; 64];
    let (head, _) = padded.split_at_mut(beacon_zkp_core::constants::G1_POINT_SIZE);
    head.copy_from_slice(pubkey);

    let (left, right) = padded.split_at(32);
    let mut left_chunk = [0_u8; 32];
    left_chunk.copy_from_slice(left);
    let mut right_chunk = [0_u8; 32];
    right_chunk.copy_from_slice(right);
    sha256_pair(&left_chunk, &right_chunk)
}

/// Native counterpart of [`ssz_phase0_sync_committee`], used by witness generation to compute
/// the committee root the circuit re-derives.
///
/// # Panics
/// Panics if the committee size is not a power of two.
#[must_use]
pub fn native_sync_committee_root(
    pubkeys: &[[u8; beacon_zkp_core::constants::G1_POINT_SIZE]],
    aggregate_pubkey: &[u8; beacon_zkp_core::constants::G1_POINT_SIZE],
) -> [u8; 32] {
    use beacon_zkp_core::ssz_types::{sha256_layer, sha256_pair};

    assert!(pubkeys.len().is_power_of_two(), "committee size must be a power of two");

    let mut layer: Vec<[u8; 32]> = pubkeys.iter().map(native_pubkey_leaf).collect();
    while layer.len() > 1 {
        layer = sha256_layer(&layer);
    }
    let pubkeys_root = layer
        .first()
        .copied()
        .unwrap_or_else(|| unreachable!("the reduction never empties a power-of-two layer"));

    sha256_pair(&pubkeys_root, &native_pubkey_leaf(aggregate_pubkey))
}

/// `SSZPhase0SigningRoot`: `SHA256(header_root || domain)`.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn ssz_phase0_signing_root<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    header_root: &[Boolean],
    domain: &[Boolean],
) -> Result<Vec<Boolean>, SynthesisError> {
    sha256_pair_bits(cs.namespace(|| "signing root"), header_root, domain)
}

/// `SSZRestoreMerkleRoot(depth, index)`: ascends a Merkle branch from `leaf`, choosing hash
/// order at each level from bit `l` of the generalized `index` (a compile-time routing constant,
/// not a private witness): `1` puts the running accumulator on the right, `0` on the left.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn ssz_restore_merkle_root<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    leaf: Vec<Boolean>,
    branch: &[Vec<Boolean>],
    index: u64,
) -> Result<Vec<Boolean>, SynthesisError> {
    let mut acc = leaf;
    for (level, sibling) in branch.iter().enumerate() {
        let mut cs = cs.namespace(|| format!("level {level}"));
        let bit = (index >> level) & 1 == 1;
        acc = if bit {
            sha256_pair_bits(cs.namespace(|| "sibling || acc"), sibling, &acc)?
        } else {
            sha256_pair_bits(cs.namespace(|| "acc || sibling"), &acc, sibling)?
        };
    }
    Ok(acc)
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, reason = "fixed-size 32-byte test helper buffer")]
mod tests {
    use bellman::gadgets::test::TestConstraintSystem;
    use bellman::ConstraintSystem;
    use bls12_381::Scalar;

    use super::{ssz_restore_merkle_root, witness_bytes_be};
    use beacon_zkp_core::ssz_types::MerkleProof;

    fn bits_to_bytes(bits: &[bellman::gadgets::boolean::Boolean]) -> [u8; 32] {
        let mut out = [0_u8; 32];
        for (i, byte_bits) in bits.chunks_exact(8).enumerate() {
            let mut byte = 0_u8;
            for bit in byte_bits {
                byte = (byte << 1) | u8::from(bit.get_value().unwrap_or(false));
            }
            out[i] = byte;
        }
        out
    }

    #[test]
    fn restore_root_matches_native_merkle_proof() {
        let mut cs = TestConstraintSystem::<Scalar>::new();

        let leaf = [7_u8; 32];
        let sibling0 = [8_u8; 32];
        let sibling1 = [9_u8; 32];
        let proof = MerkleProof { leaf, index: 0b10, branch: vec![sibling0, sibling1] };

        let leaf_bits = witness_bytes_be(cs.namespace(|| "leaf"), Some(&leaf)).expect("leaf bits");
        let branch_bits: Vec<_> = [sibling0, sibling1]
            .iter()
            .enumerate()
            .map(|(i, s)| witness_bytes_be(cs.namespace(|| format!("sibling {i}")), Some(s)).expect("sibling bits"))
            .collect();

        let root_bits =
            ssz_restore_merkle_root(cs.namespace(|| "restore"), leaf_bits, &branch_bits, proof.index)
                .expect("restore root");

        assert!(cs.is_satisfied());
        assert_eq!(bits_to_bytes(&root_bits), proof.restore_root());
    }

    #[test]
    fn native_committee_root_matches_manual_two_key_tree() {
        use beacon_zkp_core::ssz_types::sha256_pair;

        use super::native_sync_committee_root;

        fn leaf(key: &[u8; 48]) -> [u8; 32] {
            let mut padded = [0_u8; 64];
            padded[..48].copy_from_slice(key);
            let mut left = [0_u8; 32];
            left.copy_from_slice(&padded[..32]);
            let mut right = [0_u8; 32];
            right.copy_from_slice(&padded[32..]);
            sha256_pair(&left, &right)
        }

        let key_a = [1_u8; 48];
        let key_b = [2_u8; 48];
        let aggregate = [3_u8; 48];

        let pubkeys_root = sha256_pair(&leaf(&key_a), &leaf(&key_b));
        let expected = sha256_pair(&pubkeys_root, &leaf(&aggregate));

        assert_eq!(native_sync_committee_root(&[key_a, key_b], &aggregate), expected);
    }
}
