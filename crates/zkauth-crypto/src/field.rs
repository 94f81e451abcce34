//! # Field Elements
//!
//! [`FieldElement`] wraps a Pallas base field element, the native value type of
//! the membership circuits. On the wire it is 64 lowercase hex chars of the
//! canonical little-endian representation; non-canonical encodings (values
//! at or above the modulus) are rejected.
//!
//! Secrets are entered as decimal strings, matching how provers write them.

use pasta_curves::group::ff::PrimeField;
use pasta_curves::pallas;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CryptoError;

/// An element of the Pallas base field.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FieldElement(pallas::Base);

impl FieldElement {
    /// The additive identity; also the value of an empty Merkle slot.
    pub fn zero() -> Self {
        Self(pallas::Base::from(0u64))
    }

    /// Embed a small integer.
    pub fn from_u64(value: u64) -> Self {
        Self(pallas::Base::from(value))
    }

    /// Parse a decimal string (no sign, no leading zeros) into the field.
    ///
    /// Values larger than the modulus are reduced.
    pub fn from_decimal(s: &str) -> Result<Self, CryptoError> {
        pallas::Base::from_str_vartime(s.trim())
            .map(Self)
            .ok_or_else(|| {
                CryptoError::InvalidFieldEncoding(format!("not a decimal field value: {s:?}"))
            })
    }

    /// Decode 32 canonical little-endian bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        Option::<pallas::Base>::from(pallas::Base::from_repr(bytes))
            .map(Self)
            .ok_or_else(|| CryptoError::InvalidFieldEncoding("value exceeds field modulus".into()))
    }

    /// Encode as 32 canonical little-endian bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_repr()
    }

    /// Decode from 64 hex chars, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let s = s.trim();
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(stripped, &mut bytes)
            .map_err(|e| CryptoError::InvalidFieldEncoding(format!("{e}")))?;
        Self::from_bytes(bytes)
    }

    /// Encode as 64 lowercase hex chars.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub(crate) fn inner(&self) -> pallas::Base {
        self.0
    }

    pub(crate) fn from_inner(inner: pallas::Base) -> Self {
        Self(inner)
    }
}

impl Default for FieldElement {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::hash::Hash for FieldElement {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

impl std::fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FieldElement({})", self.to_hex())
    }
}

impl std::fmt::Display for FieldElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for FieldElement {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}
