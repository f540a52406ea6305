//! Fiat–Shamir signatures of knowledge (SPKs).
//!
//! Three variants cover everything the scheme engines need:
//!
//! - [`SpkDlog`]: knowledge of `x` with `y = g^x` in a single cyclic group
//!   (instantiable over G1, G2 and GT);
//! - [`SpkRep`]: knowledge of a vector of exponents satisfying a set of
//!   multi-base representation relations, where images and bases may live in
//!   different groups of the pairing;
//! - the pairing-homomorphism helpers below: knowledge of `x` with
//!   `a = e(f, v)^x`, a GT discrete log over a computed base.
//!
//! The challenge hash input order is normative and identical across
//! implementations; see each type's documentation.

mod dlog;
mod rep;

pub use dlog::SpkDlog;
pub use rep::{Elem, SpkError, SpkRep};

use crate::group::PairingCurve;
use rand_core::RngCore;

/// SPK of `x` for `a = e(f, v)^x`: a [`SpkDlog`] in GT over the base
/// `e(f, v)`, which the verifier recomputes from the same pair.
pub fn sign_pairing<C: PairingCurve, R: RngCore>(
    a: &C::GT,
    f: &C::G1,
    v: &C::G2,
    x: &C::Scalar,
    msg: &[u8],
    rng: &mut R,
) -> SpkDlog<C::Scalar> {
    let base = C::pair(f, v);
    SpkDlog::sign(a, &base, x, msg, rng)
}

/// Verifies a proof produced by [`sign_pairing`].
pub fn verify_pairing<C: PairingCurve>(
    pi: &SpkDlog<C::Scalar>,
    a: &C::GT,
    f: &C::G1,
    v: &C::G2,
    msg: &[u8],
) -> bool {
    let base = C::pair(f, v);
    pi.verify(a, &base, msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::bls12381::{PairingCurve as Bls, Scalar, G1, G2};
    use crate::group::{Element, Scalar as _};
    use rand::thread_rng;

    #[test]
    fn pairing_spk() {
        let rng = &mut thread_rng();
        let f = G1::rand(rng);
        let v = G2::rand(rng);
        let x = Scalar::rand(rng);

        let mut a = Bls::pair(&f, &v);
        a.mul(&x);

        let pi = sign_pairing::<Bls, _>(&a, &f, &v, &x, b"open", rng);
        assert!(verify_pairing::<Bls>(&pi, &a, &f, &v, b"open"));
        assert!(!verify_pairing::<Bls>(&pi, &a, &f, &v, b"nope"));

        let mut wrong = a.clone();
        wrong.add(&a);
        assert!(!verify_pairing::<Bls>(&pi, &wrong, &f, &v, b"open"));
    }
}
