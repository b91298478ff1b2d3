//! `Num2Bits`/`Bits2Num`: the range-check primitives every other gadget in this crate builds
//! on.

use bellman::gadgets::boolean::{AllocatedBit, Boolean};
use bellman::gadgets::num::AllocatedNum;
use bellman::{ConstraintSystem, LinearCombination, SynthesisError};
use bls12_381::Scalar;
use ff::{Field, PrimeField, PrimeFieldBits};

/// Proves that `num` equals `Σ b_i · 2^i` for `n` little-endian boolean signals, i.e. range
/// checks `num` to `[0, 2^n)`.
///
/// Every range check elsewhere in this crate is expressed in terms of this gadget.
///
/// # Errors
/// Returns [`SynthesisError`] if `n` exceeds the field's bit capacity or allocation fails.
pub fn num_to_bits<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    num: &AllocatedNum<Scalar>,
    n: usize,
) -> Result<Vec<Boolean>, SynthesisError> {
    assert!(n < Scalar::NUM_BITS as usize, "Num2Bits width must stay below the field size");

    let values = num.get_value().map(|value| {
        let repr = value.to_le_bits();
        (0..n).map(|i| repr[i]).collect::<Vec<bool>>()
    });

    let mut bits = Vec::with_capacity(n);
    let mut lc = LinearCombination::<Scalar>::zero();
    let mut coeff = Scalar::ONE;

    for i in 0..n {
        let bit_value = values.as_ref().map(|bits| bits[i]);
        let bit = AllocatedBit::alloc(cs.namespace(|| format!("bit {i}")), bit_value)?;
        lc = lc + (coeff, bit.get_variable());
        coeff = coeff.double();
        bits.push(Boolean::from(bit));
    }

    cs.enforce(
        || "bit decomposition matches num",
        |_| lc.clone(),
        |lc| lc + CS::one(),
        |lc| lc + num.get_variable(),
    );

    Ok(bits)
}

/// The inverse direction of [`num_to_bits`]: reassembles `n` little-endian boolean signals
/// into a single allocated field element.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation failure.
pub fn bits_to_num<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    bits: &[Boolean],
) -> Result<AllocatedNum<Scalar>, SynthesisError> {
    let mut value = Some(Scalar::ZERO);
    let mut coeff = Scalar::ONE;
    for bit in bits {
        match bit.get_value() {
            Some(true) => value = value.map(|acc| acc + coeff),
            Some(false) => {}
            None => value = None,
        }
        coeff = coeff.double();
    }

    let num = AllocatedNum::alloc(cs.namespace(|| "reassembled num"), || {
        value.ok_or(SynthesisError::AssignmentMissing)
    })?;

    let mut lc = LinearCombination::<Scalar>::zero();
    let mut coeff = Scalar::ONE;
    for bit in bits {
        lc = lc + &bit.lc(CS::one(), coeff);
        coeff = coeff.double();
    }

    cs.enforce(
        || "num matches bit reassembly",
        |_| lc.clone(),
        |lc| lc + CS::one(),
        |lc| lc + num.get_variable(),
    );

    Ok(num)
}

/// Range-checks a value that may represent a negative integer (via the usual "shift by the
/// bound, then range check the nonnegative result" trick): asserts `|value| < 2^bound_bits` by
/// checking that `value + 2^bound_bits` decomposes into `bound_bits + 1` bits.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation or constraint failure.
pub fn assert_signed_range<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    value: &AllocatedNum<Scalar>,
    bound_bits: u32,
) -> Result<(), SynthesisError> {
    // Carry bounds can exceed 63 bits, so the shift is built by repeated doubling rather than
    // a u64 shift.
    let mut shift = Scalar::ONE;
    for _ in 0..bound_bits {
        shift = shift.double();
    }
    let shifted_value = value.get_value().map(|v| v + shift);

    let shifted = AllocatedNum::alloc(cs.namespace(|| "shifted value"), || {
        shifted_value.ok_or(SynthesisError::AssignmentMissing)
    })?;

    cs.enforce(
        || "shifted = value + 2^bound_bits",
        |lc| lc + value.get_variable() + (shift, CS::one()),
        |lc| lc + CS::one(),
        |lc| lc + shifted.get_variable(),
    );

    num_to_bits(cs.namespace(|| "range check shifted value"), &shifted, (bound_bits + 1) as usize)
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use bellman::gadgets::test::TestConstraintSystem;
    use bellman::ConstraintSystem;

    use super::{bits_to_num, num_to_bits};

    #[test]
    fn num_to_bits_round_trips() {
        let mut cs = TestConstraintSystem::<bls12_381::Scalar>::new();
        let value = bls12_381::Scalar::from(0b1011_0110_u64);
        let num = bellman::gadgets::num::AllocatedNum::alloc(cs.namespace(|| "num"), || Ok(value))
            .expect("alloc");

        let bits = num_to_bits(cs.namespace(|| "decompose"), &num, 16).expect("decompose");
        let reassembled = bits_to_num(cs.namespace(|| "recompose"), &bits).expect("recompose");

        assert!(cs.is_satisfied());
        assert_eq!(reassembled.get_value(), Some(value));
    }
}
