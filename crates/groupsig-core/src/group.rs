//! Traits for operating on the groups of a bilinear pairing.

use rand_core::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use thiserror::Error;

/// Error raised when canonical bytes cannot be decoded into an element.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The buffer does not have the canonical length for this element type.
    #[error("buffer has {got} bytes, canonical encoding needs {want}")]
    Length { want: usize, got: usize },

    /// The bytes have the right length but do not decode to a valid element
    /// (off curve, wrong subgroup, or a scalar above the modulus).
    #[error("bytes do not encode a valid element")]
    InvalidElement,
}

/// Canonical fixed-size byte encoding. Every element of a given concrete
/// type marshals to exactly [`marshal_len`](Encodable::marshal_len) bytes,
/// and two implementations must agree on the bytes for the wire formats
/// built on top to be portable.
pub trait Encodable {
    /// Canonical encoded size in bytes, fixed per concrete type.
    fn marshal_len() -> usize;

    /// Serializes the element into its canonical bytes.
    fn marshal(&self) -> Vec<u8>;

    /// Replaces `self` with the element encoded in `data`. The buffer must
    /// be exactly [`marshal_len`](Encodable::marshal_len) bytes.
    fn unmarshal(&mut self, data: &[u8]) -> Result<(), EncodingError>;
}

/// Element represents an element of a group with the additive notation
/// which is also equipped with a multiplication transformation.
/// Two kinds of implementations exist: Scalar, which forms a ring so RHS is
/// the same type, and Point, which can be multiplied by a scalar of its
/// prime field.
pub trait Element:
    Clone
    + Display
    + Debug
    + Eq
    + PartialEq
    + Send
    + Sync
    + Encodable
    + Serialize
    + for<'a> Deserialize<'a>
{
    /// The right-hand-side argument for multiplication.
    type RHS;

    /// Returns the zero element of the group (the identity point; one in GT).
    fn new() -> Self;

    /// Returns the one element of the group (the fixed generator).
    fn one() -> Self;

    /// Adds the RHS element to the LHS element in place.
    fn add(&mut self, s2: &Self);

    /// Multiplies the LHS element by the RHS element in place.
    fn mul(&mut self, mul: &Self::RHS);

    /// Replaces the element with its additive inverse (the multiplicative
    /// inverse in GT's case).
    fn negate(&mut self);

    /// Samples a random element using the provided RNG.
    fn rand<R: RngCore>(rng: &mut R) -> Self;

    /// Returns the zero element of the group.
    fn zero() -> Self {
        Self::new()
    }
}

/// Scalar can be multiplied by only a Scalar, no other elements.
pub trait Scalar: Element {
    fn set_int(&mut self, i: u64);
    fn inverse(&self) -> Option<Self>;
    fn sub(&mut self, other: &Self);

    /// Attempts to build a scalar from exactly-sized random bytes. Returns
    /// `None` when the bytes land outside the field.
    fn from_random_bytes(bytes: &[u8]) -> Option<Self>;

    /// Total reduction of arbitrary bytes into the field. Used to turn hash
    /// outputs into Fiat–Shamir challenges.
    fn from_bytes_mod_order(bytes: &[u8]) -> Self;
}

/// Basic point functionality that can be multiplied by a scalar.
pub trait Point: Element {
    /// Error which may occur while mapping to the group.
    type Error: Debug;

    /// Maps the provided data to a group element (hash-to-curve).
    fn map(&mut self, data: &[u8]) -> Result<(), <Self as Point>::Error>;
}

/// A curve equipped with a bilinear pairing operation.
pub trait PairingCurve: Clone + Debug + Send + Sync + 'static {
    type Scalar: Scalar<RHS = Self::Scalar>;

    type G1: Point<RHS = Self::Scalar>;

    type G2: Point<RHS = Self::Scalar>;

    type GT: Element<RHS = Self::Scalar>;

    /// Performs a pairing operation between the two group elements.
    fn pair(a: &Self::G1, b: &Self::G2) -> Self::GT;
}
