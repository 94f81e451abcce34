//! # Poseidon Hash
//!
//! Poseidon over the Pallas base field with the `P128Pow5T3` parameters
//! (width 3, rate 2) and a constant-length domain. Every hash in the
//! membership protocol goes through this module:
//!
//! - leaf value: `Poseidon([secret])`
//! - tree node: `Poseidon([left, right])`
//! - recursive hash step: `Poseidon([root, previous])`

use halo2_gadgets::poseidon::primitives::{self as poseidon, ConstantLength, P128Pow5T3};
use pasta_curves::pallas;

use crate::error::CryptoError;
use crate::field::FieldElement;

fn hash1(x: pallas::Base) -> pallas::Base {
    poseidon::Hash::<_, P128Pow5T3, ConstantLength<1>, 3, 2>::init().hash([x])
}

fn hash2(left: pallas::Base, right: pallas::Base) -> pallas::Base {
    poseidon::Hash::<_, P128Pow5T3, ConstantLength<2>, 3, 2>::init().hash([left, right])
}

/// Poseidon of two field elements.
pub fn poseidon_hash2(left: &FieldElement, right: &FieldElement) -> FieldElement {
    FieldElement::from_inner(hash2(left.inner(), right.inner()))
}

/// Poseidon of one or two field elements.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidArity`] for any other input length.
pub fn poseidon_hash(inputs: &[FieldElement]) -> Result<FieldElement, CryptoError> {
    match inputs {
        [x] => Ok(FieldElement::from_inner(hash1(x.inner()))),
        [l, r] => Ok(poseidon_hash2(l, r)),
        other => Err(CryptoError::InvalidArity(other.len())),
    }
}

/// The leaf value committed for a secret: `Poseidon([secret])`.
pub fn hash_secret(secret: &FieldElement) -> FieldElement {
    FieldElement::from_inner(hash1(secret.inner()))
}
