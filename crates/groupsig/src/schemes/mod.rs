//! The protocol engines, one module per scheme.
//!
//! Every module defines its own typed keys, signature and (where present)
//! proof structures, the wire codecs for them, and the scheme operations as
//! free functions over those types. The polymorphic containers in
//! [`crate::types`] and the dispatch layer in [`crate::api`] are the only
//! code that sees more than one scheme at a time.

pub mod bbs04;
pub mod dl21;
pub mod dl21seq;
pub mod gl19;
pub mod klap20;
pub mod ps16;

use crate::error::{Error, Result};
use groupsig_core::group::{Element, Scalar as _};
use rand_core::RngCore;

pub(crate) type Bls = groupsig_core::curve::bls12381::PairingCurve;
pub(crate) use groupsig_core::curve::bls12381::{Scalar as Fr, G1, G2, GT};

/// Unwraps a key field that the operation requires.
pub(crate) fn req<'a, T>(field: &'a Option<T>, name: &'static str) -> Result<&'a T> {
    field.as_ref().ok_or(Error::MissingField(name))
}

/// Samples a nonzero scalar.
pub(crate) fn rand_nonzero<R: RngCore>(rng: &mut R) -> Fr {
    loop {
        let x = Fr::rand(rng);
        if x != Fr::zero() {
            return x;
        }
    }
}

/// Inverts a scalar, mapping zero to a clean error.
pub(crate) fn inverse(x: &Fr) -> Result<Fr> {
    x.inverse().ok_or(Error::DegenerateScalar)
}
