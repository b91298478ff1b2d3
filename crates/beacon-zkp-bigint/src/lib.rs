//! `K`-limb, `N`-bit non-native big-integer arithmetic gadgets over `bls12_381::Scalar`,
//! parameterized so the BLS12-381 base prime fits in `K * N` bits.

pub mod add_sub;
pub mod hints;
pub mod mod_reduce;
pub mod mult;
pub mod num_codec;
pub mod params;
