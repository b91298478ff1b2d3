//! The `Fp -> Fp2 -> Fp6 -> Fp12` tower of non-native field gadgets used by the pairing and
//! hash-to-curve circuits, built on `beacon-zkp-bigint`.

pub mod fp;
pub mod fp12;
pub mod fp2;
pub mod fp6;
