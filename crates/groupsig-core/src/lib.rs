//! # groupsig-core
//!
//! Algebraic substrate for the `groupsig` crate: generic traits over the
//! groups of a bilinear pairing, a BLS12-381 instantiation backed by
//! arkworks, a small hash shim, and the signature-of-knowledge (SPK)
//! toolkit shared by every group-signature scheme.
//!
//! The traits follow the additive notation throughout; the target group GT
//! reuses the same vocabulary with multiplication standing in for addition
//! and exponentiation for scalar multiplication.
//!
//! ```rust
//! use groupsig_core::curve::bls12381::{G1, Scalar};
//! use groupsig_core::group::Element;
//! use groupsig_core::spk::SpkDlog;
//!
//! let rng = &mut rand::thread_rng();
//! let x = Scalar::rand(rng);
//! let g = G1::one();
//! let mut y = g.clone();
//! y.mul(&x);
//!
//! let pi = SpkDlog::sign(&y, &g, &x, b"context", rng);
//! assert!(pi.verify(&y, &g, b"context"));
//! ```

/// Curve implementations for the traits defined in the [`group`] module.
pub mod curve;

/// Definitions of generic traits with scalars of prime fields and points on
/// elliptic curves, plus canonical byte encoding.
pub mod group;

/// One-shot digests over the hash algorithms the library commits to.
pub mod hash;

/// Fiat–Shamir signatures of knowledge: single discrete logs, multi-base
/// representations over mixed groups, and pairing-homomorphism preimages.
pub mod spk;
