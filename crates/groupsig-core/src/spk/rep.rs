use crate::group::{Element, Encodable, PairingCurve, Scalar};
use rand_core::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Errors raised while building or checking a representation proof. These
/// all indicate malformed relation tables, never a failed predicate.
#[derive(Debug, Error)]
pub enum SpkError {
    #[error("relation table references element {got}, only {have} defined")]
    IndexOutOfRange { got: usize, have: usize },

    #[error("term counts cover {covered} terms, index table has {have}")]
    BadTermCounts { covered: usize, have: usize },

    #[error("a relation mixes elements of different groups")]
    MixedGroups,

    #[error("{got} images for {want} term counts")]
    BadRelationCount { want: usize, got: usize },

    #[error("a relation has no terms")]
    EmptyRelation,
}

/// An element of any of the three pairing groups. Representation relations
/// routinely span G1, G2 and GT at once (a pairing equation next to plain
/// point relations), so images and bases are carried through this enum.
pub enum Elem<C: PairingCurve> {
    G1(C::G1),
    G2(C::G2),
    Gt(C::GT),
}

impl<C: PairingCurve> Elem<C> {
    fn mul(&mut self, x: &C::Scalar) {
        match self {
            Elem::G1(e) => e.mul(x),
            Elem::G2(e) => e.mul(x),
            Elem::Gt(e) => e.mul(x),
        }
    }

    fn add(&mut self, other: &Self) -> Result<(), SpkError> {
        match (self, other) {
            (Elem::G1(a), Elem::G1(b)) => a.add(b),
            (Elem::G2(a), Elem::G2(b)) => a.add(b),
            (Elem::Gt(a), Elem::Gt(b)) => a.add(b),
            _ => return Err(SpkError::MixedGroups),
        }
        Ok(())
    }

    fn marshal(&self) -> Vec<u8> {
        match self {
            Elem::G1(e) => e.marshal(),
            Elem::G2(e) => e.marshal(),
            Elem::Gt(e) => e.marshal(),
        }
    }
}

impl<C: PairingCurve> Clone for Elem<C> {
    fn clone(&self) -> Self {
        match self {
            Elem::G1(e) => Elem::G1(e.clone()),
            Elem::G2(e) => Elem::G2(e.clone()),
            Elem::Gt(e) => Elem::Gt(e.clone()),
        }
    }
}

impl<C: PairingCurve> fmt::Debug for Elem<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Elem::G1(e) => write!(f, "G1({:?})", e),
            Elem::G2(e) => write!(f, "G2({:?})", e),
            Elem::Gt(e) => write!(f, "Gt({:?})", e),
        }
    }
}

impl<C: PairingCurve> PartialEq for Elem<C> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Elem::G1(a), Elem::G1(b)) => a == b,
            (Elem::G2(a), Elem::G2(b)) => a == b,
            (Elem::Gt(a), Elem::Gt(b)) => a == b,
            _ => false,
        }
    }
}

/// Signature of knowledge of a representation: exponents `x_1..x_n` with
/// `y_k = ∏_j g_{i(k,j)}^{x_{e(k,j)}}` for each relation `k`.
///
/// The relation structure is a flat list of `(witness index, base index)`
/// pairs plus a per-relation term count; terms are consumed in order. The
/// challenge hashes, in this exact order: the message, every image `y`,
/// every base `g`, every index pair (each index as a little-endian u16),
/// and every commitment product. Responses are `s_e = r_e − c·x_e`.
pub struct SpkRep<C: PairingCurve> {
    pub c: C::Scalar,
    pub s: Vec<C::Scalar>,
}

impl<C: PairingCurve> Clone for SpkRep<C> {
    fn clone(&self) -> Self {
        Self {
            c: self.c.clone(),
            s: self.s.clone(),
        }
    }
}

impl<C: PairingCurve> fmt::Debug for SpkRep<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SpkRep")
            .field("c", &self.c)
            .field("s", &self.s)
            .finish()
    }
}

impl<C: PairingCurve> PartialEq for SpkRep<C> {
    fn eq(&self, other: &Self) -> bool {
        self.c == other.c && self.s == other.s
    }
}

impl<C: PairingCurve> SpkRep<C> {
    /// Produces a proof for the relations described by `(rels, prods)` over
    /// images `ys`, bases `gs` and witnesses `xs`, bound to `msg`.
    pub fn sign<R: RngCore>(
        ys: &[Elem<C>],
        gs: &[Elem<C>],
        xs: &[&C::Scalar],
        rels: &[(u16, u16)],
        prods: &[u16],
        msg: &[u8],
        rng: &mut R,
    ) -> Result<Self, SpkError> {
        check_tables(ys.len(), gs.len(), xs.len(), rels, prods)?;

        let rs: Vec<C::Scalar> = (0..xs.len())
            .map(|_| <C::Scalar as Element>::rand(rng))
            .collect();

        // T_k = prod over the relation's terms of g[gi]^{r[wi]}
        let ts = products::<C>(None, gs, rels, prods, &rs)?;

        let c = challenge::<C>(msg, ys, gs, rels, &ts);

        let s = xs
            .iter()
            .zip(rs)
            .map(|(x, r)| {
                // s = r - c*x
                let mut cx = c.clone();
                cx.mul(x);
                let mut s = r;
                s.sub(&cx);
                s
            })
            .collect();

        Ok(Self { c, s })
    }

    /// Verifies the proof against the same tables it was signed over.
    pub fn verify(
        &self,
        ys: &[Elem<C>],
        gs: &[Elem<C>],
        rels: &[(u16, u16)],
        prods: &[u16],
        msg: &[u8],
    ) -> Result<bool, SpkError> {
        check_tables(ys.len(), gs.len(), self.s.len(), rels, prods)?;

        // T'_k = y_k^c * prod of g[gi]^{s[wi]}
        let ts = products::<C>(Some((ys, &self.c)), gs, rels, prods, &self.s)?;

        Ok(challenge::<C>(msg, ys, gs, rels, &ts) == self.c)
    }
}

fn check_tables(
    ny: usize,
    ng: usize,
    nx: usize,
    rels: &[(u16, u16)],
    prods: &[u16],
) -> Result<(), SpkError> {
    if prods.len() != ny {
        return Err(SpkError::BadRelationCount {
            want: prods.len(),
            got: ny,
        });
    }
    let covered: usize = prods.iter().map(|&n| n as usize).sum();
    if covered != rels.len() {
        return Err(SpkError::BadTermCounts {
            covered,
            have: rels.len(),
        });
    }
    for &(wi, gi) in rels {
        if wi as usize >= nx {
            return Err(SpkError::IndexOutOfRange {
                got: wi as usize,
                have: nx,
            });
        }
        if gi as usize >= ng {
            return Err(SpkError::IndexOutOfRange {
                got: gi as usize,
                have: ng,
            });
        }
    }
    Ok(())
}

/// Computes the per-relation products. With `init = None` this is the
/// prover's commitment `∏ g^{r}`; with `init = Some((ys, c))` it is the
/// verifier's reconstruction `y^c · ∏ g^{s}`.
fn products<C: PairingCurve>(
    init: Option<(&[Elem<C>], &C::Scalar)>,
    gs: &[Elem<C>],
    rels: &[(u16, u16)],
    prods: &[u16],
    exps: &[C::Scalar],
) -> Result<Vec<Elem<C>>, SpkError> {
    let mut out = Vec::with_capacity(prods.len());
    let mut next = 0usize;
    for (k, &n) in prods.iter().enumerate() {
        if n == 0 {
            return Err(SpkError::EmptyRelation);
        }
        let mut acc = match init {
            Some((ys, c)) => {
                let mut y = ys[k].clone();
                y.mul(c);
                Some(y)
            }
            None => None,
        };
        for _ in 0..n {
            let (wi, gi) = rels[next];
            next += 1;
            let mut term = gs[gi as usize].clone();
            term.mul(&exps[wi as usize]);
            match &mut acc {
                Some(a) => a.add(&term)?,
                None => acc = Some(term),
            }
        }
        match acc {
            Some(a) => out.push(a),
            None => return Err(SpkError::EmptyRelation),
        }
    }
    Ok(out)
}

fn challenge<C: PairingCurve>(
    msg: &[u8],
    ys: &[Elem<C>],
    gs: &[Elem<C>],
    rels: &[(u16, u16)],
    ts: &[Elem<C>],
) -> C::Scalar {
    let mut h = Sha256::new();
    h.update(msg);
    for y in ys {
        h.update(y.marshal());
    }
    for g in gs {
        h.update(g.marshal());
    }
    for &(wi, gi) in rels {
        h.update(wi.to_le_bytes());
        h.update(gi.to_le_bytes());
    }
    for t in ts {
        h.update(t.marshal());
    }
    C::Scalar::from_bytes_mod_order(&h.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::bls12381::{PairingCurve as Bls, Scalar, G1, G2};
    use crate::group::{PairingCurve as _, Scalar as _};
    use rand::thread_rng;

    type E = Elem<Bls>;

    // y0 = g0^x0, y1 = g1^x0 * g2^x1, y2 = e(f, v)^x1  -- mixed groups,
    // one witness reused across relations.
    fn tables() -> (Vec<(u16, u16)>, Vec<u16>) {
        (vec![(0, 0), (0, 1), (1, 2), (1, 3)], vec![1, 2, 1])
    }

    fn instance() -> (Vec<E>, Vec<E>, Vec<Scalar>) {
        let rng = &mut thread_rng();
        let x0 = Scalar::rand(rng);
        let x1 = Scalar::rand(rng);

        let g0 = G1::rand(rng);
        let g1 = G1::rand(rng);
        let g2 = G1::rand(rng);
        let gt = Bls::pair(&G1::rand(rng), &G2::rand(rng));

        let mut y0 = g0.clone();
        y0.mul(&x0);
        let mut y1 = g1.clone();
        y1.mul(&x0);
        let mut t = g2.clone();
        t.mul(&x1);
        y1.add(&t);
        let mut y2 = gt.clone();
        y2.mul(&x1);

        (
            vec![E::G1(y0), E::G1(y1), E::Gt(y2)],
            vec![E::G1(g0), E::G1(g1), E::G1(g2), E::Gt(gt)],
            vec![x0, x1],
        )
    }

    #[test]
    fn rep_roundtrip() {
        let rng = &mut thread_rng();
        let (ys, gs, xs) = instance();
        let (rels, prods) = tables();

        let pi = SpkRep::<Bls>::sign(
            &ys,
            &gs,
            &[&xs[0], &xs[1]],
            &rels,
            &prods,
            b"ctx",
            rng,
        )
        .unwrap();

        assert!(pi.verify(&ys, &gs, &rels, &prods, b"ctx").unwrap());
    }

    #[test]
    fn rep_is_not_malleable() {
        let rng = &mut thread_rng();
        let (ys, gs, xs) = instance();
        let (rels, prods) = tables();

        let pi = SpkRep::<Bls>::sign(
            &ys,
            &gs,
            &[&xs[0], &xs[1]],
            &rels,
            &prods,
            b"ctx",
            rng,
        )
        .unwrap();

        // message flip
        assert!(!pi.verify(&ys, &gs, &rels, &prods, b"CTX").unwrap());

        // image flip
        let mut ys2 = ys.clone();
        ys2.swap(0, 1);
        assert!(!pi.verify(&ys2, &gs, &rels, &prods, b"ctx").unwrap());

        // base flip
        let mut gs2 = gs.clone();
        gs2.swap(0, 1);
        assert!(!pi.verify(&ys, &gs2, &rels, &prods, b"ctx").unwrap());

        // index flip
        let mut rels2 = rels.clone();
        rels2[2] = (0, 2);
        assert!(!pi.verify(&ys, &gs, &rels2, &prods, b"ctx").unwrap());

        // challenge flip
        let mut pi2 = pi.clone();
        pi2.c.add(&Scalar::one());
        assert!(!pi2.verify(&ys, &gs, &rels, &prods, b"ctx").unwrap());

        // response flip
        let mut pi3 = pi.clone();
        pi3.s[1].add(&Scalar::one());
        assert!(!pi3.verify(&ys, &gs, &rels, &prods, b"ctx").unwrap());
    }

    #[test]
    fn rejects_bad_tables() {
        let rng = &mut thread_rng();
        let (ys, gs, xs) = instance();

        // term counts not covering the index table
        let res = SpkRep::<Bls>::sign(
            &ys,
            &gs,
            &[&xs[0], &xs[1]],
            &[(0, 0), (0, 1), (1, 2), (1, 3)],
            &[1, 1, 1],
            b"ctx",
            rng,
        );
        assert!(res.is_err());

        // witness index out of range
        let res = SpkRep::<Bls>::sign(
            &ys,
            &gs,
            &[&xs[0]],
            &[(0, 0), (0, 1), (1, 2), (1, 3)],
            &[1, 2, 1],
            b"ctx",
            rng,
        );
        assert!(res.is_err());
    }

    #[test]
    fn mixed_group_relation_is_rejected() {
        let rng = &mut thread_rng();
        let (ys, gs, xs) = instance();

        // second relation would add a GT term onto a G1 product
        let res = SpkRep::<Bls>::sign(
            &ys,
            &gs,
            &[&xs[0], &xs[1]],
            &[(0, 0), (0, 1), (1, 3), (1, 3)],
            &[1, 2, 1],
            b"ctx",
            rng,
        );
        assert!(res.is_err());
    }
}
