//! BBS04: short group signatures from bilinear pairings.
//!
//! Single manager acting as issuer and opener; one-message join where the
//! manager hands the member its credential `(A, x)` with
//! `A = g1^{1/(γ+x)}`. Signatures are linear encryptions `(T1, T2, T3)` of
//! the credential plus a five-relation representation proof. Opening
//! decrypts `T3` with `(ξ1, ξ2)` and scans the GML for the tracing point.
//! The tracing point doubles as a revocation trapdoor: `reveal` publishes
//! it on a CRL and `trace` checks signatures against the CRL.

use crate::crl::{Crl, CrlEntry, Trapdoor};
use crate::error::{Error, Result};
use crate::gml::{Gml, GmlEntry};
use crate::join::{frame, open_frame};
use crate::msg::Message;
use crate::scheme::{KeyType, SchemeCode};
use crate::schemes::{inverse, rand_nonzero, req, Bls, Fr, G1, G2, GT};
use crate::wire::{FieldReader, FieldWriter};
use groupsig_core::group::{Element, PairingCurve, Scalar as _};
use groupsig_core::spk::{Elem, SpkRep};
use rand_core::RngCore;

const SCHEME: SchemeCode = SchemeCode::Bbs04;

/// Public parameters. `hw`, `hg2` and `g1g2` are the pairings of their
/// name, computed once at setup and immutable afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupKey {
    pub g1: Option<G1>,
    pub g2: Option<G2>,
    pub h: Option<G1>,
    pub u: Option<G1>,
    pub v: Option<G1>,
    pub w: Option<G2>,
    pub hw: Option<GT>,
    pub hg2: Option<GT>,
    pub g1g2: Option<GT>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManagerKey {
    pub xi1: Option<Fr>,
    pub xi2: Option<Fr>,
    pub gamma: Option<Fr>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemberKey {
    pub a: Option<G1>,
    pub x: Option<Fr>,
    /// Precomputed `e(A, g2)`.
    pub ag2: Option<GT>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    pub t1: G1,
    pub t2: G1,
    pub t3: G1,
    pub c: Fr,
    pub salpha: Fr,
    pub sbeta: Fr,
    pub sx: Fr,
    pub sdelta1: Fr,
    pub sdelta2: Fr,
}

impl GroupKey {
    fn is_empty(&self) -> bool {
        self.g1.is_none()
            && self.g2.is_none()
            && self.h.is_none()
            && self.u.is_none()
            && self.v.is_none()
            && self.w.is_none()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(SCHEME.code());
        w.put_tag(KeyType::Group.code());
        w.put_opt_elem(self.g1.as_ref());
        w.put_opt_elem(self.g2.as_ref());
        w.put_opt_elem(self.h.as_ref());
        w.put_opt_elem(self.u.as_ref());
        w.put_opt_elem(self.v.as_ref());
        w.put_opt_elem(self.w.as_ref());
        w.put_opt_elem(self.hw.as_ref());
        w.put_opt_elem(self.hg2.as_ref());
        w.put_opt_elem(self.g1g2.as_ref());
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = key_reader(bytes, KeyType::Group)?;
        let key = Self {
            g1: r.take_opt_elem()?,
            g2: r.take_opt_elem()?,
            h: r.take_opt_elem()?,
            u: r.take_opt_elem()?,
            v: r.take_opt_elem()?,
            w: r.take_opt_elem()?,
            hw: r.take_opt_elem()?,
            hg2: r.take_opt_elem()?,
            g1g2: r.take_opt_elem()?,
        };
        r.finish()?;
        Ok(key)
    }
}

impl ManagerKey {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(SCHEME.code());
        w.put_tag(KeyType::Manager.code());
        w.put_opt_elem(self.xi1.as_ref());
        w.put_opt_elem(self.xi2.as_ref());
        w.put_opt_elem(self.gamma.as_ref());
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = key_reader(bytes, KeyType::Manager)?;
        let key = Self {
            xi1: r.take_opt_elem()?,
            xi2: r.take_opt_elem()?,
            gamma: r.take_opt_elem()?,
        };
        r.finish()?;
        Ok(key)
    }
}

impl MemberKey {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(SCHEME.code());
        w.put_tag(KeyType::Member.code());
        w.put_opt_elem(self.a.as_ref());
        w.put_opt_elem(self.x.as_ref());
        w.put_opt_elem(self.ag2.as_ref());
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = key_reader(bytes, KeyType::Member)?;
        let key = Self {
            a: r.take_opt_elem()?,
            x: r.take_opt_elem()?,
            ag2: r.take_opt_elem()?,
        };
        r.finish()?;
        Ok(key)
    }
}

impl Signature {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(SCHEME.code());
        w.put_elem(&self.t1);
        w.put_elem(&self.t2);
        w.put_elem(&self.t3);
        w.put_elem(&self.c);
        w.put_elem(&self.salpha);
        w.put_elem(&self.sbeta);
        w.put_elem(&self.sx);
        w.put_elem(&self.sdelta1);
        w.put_elem(&self.sdelta2);
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = scheme_reader(bytes)?;
        let sig = Self {
            t1: r.take_elem()?,
            t2: r.take_elem()?,
            t3: r.take_elem()?,
            c: r.take_elem()?,
            salpha: r.take_elem()?,
            sbeta: r.take_elem()?,
            sx: r.take_elem()?,
            sdelta1: r.take_elem()?,
            sdelta2: r.take_elem()?,
        };
        r.finish()?;
        Ok(sig)
    }
}

pub(crate) fn scheme_reader(bytes: &[u8]) -> Result<FieldReader> {
    let mut r = FieldReader::new(bytes);
    let got = SchemeCode::from_code(r.take_tag()?)?;
    if got != SCHEME {
        return Err(Error::SchemeMismatch {
            expected: SCHEME,
            got,
        });
    }
    Ok(r)
}

fn key_reader(bytes: &[u8], want: KeyType) -> Result<FieldReader> {
    let mut r = scheme_reader(bytes)?;
    let got = KeyType::from_code(r.take_tag()?)?;
    if got != want {
        return Err(Error::KeyTypeMismatch {
            expected: want,
            got,
        });
    }
    Ok(r)
}

/// Populates an empty group key, returning the manager key.
pub fn setup<R: RngCore>(grpkey: &mut GroupKey, rng: &mut R) -> Result<ManagerKey> {
    if !grpkey.is_empty() {
        return Err(Error::SetupComplete);
    }

    // any element of the cyclic groups generates them
    let g2 = G2::rand(rng);
    let g1 = G1::rand(rng);

    let mut h = G1::rand(rng);
    while h == G1::zero() {
        h = G1::rand(rng);
    }

    let xi1 = rand_nonzero(rng);
    let xi2 = rand_nonzero(rng);
    let gamma = rand_nonzero(rng);

    // u = h^{1/xi1}, v = h^{1/xi2}
    let mut u = h.clone();
    u.mul(&inverse(&xi1)?);
    let mut v = h.clone();
    v.mul(&inverse(&xi2)?);

    // w = g2^gamma
    let mut w = g2.clone();
    w.mul(&gamma);

    grpkey.hw = Some(Bls::pair(&h, &w));
    grpkey.hg2 = Some(Bls::pair(&h, &g2));
    grpkey.g1g2 = Some(Bls::pair(&g1, &g2));
    grpkey.g1 = Some(g1);
    grpkey.g2 = Some(g2);
    grpkey.h = Some(h);
    grpkey.u = Some(u);
    grpkey.v = Some(v);
    grpkey.w = Some(w);

    Ok(ManagerKey {
        xi1: Some(xi1),
        xi2: Some(xi2),
        gamma: Some(gamma),
    })
}

/// Manager side of the single-message join: issues `(A, x)` and records the
/// tracing point.
pub fn join_mgr<R: RngCore>(
    seq: u8,
    mgrkey: &ManagerKey,
    grpkey: &GroupKey,
    gml: &mut Gml,
    rng: &mut R,
) -> Result<Message> {
    if seq != 0 {
        return Err(Error::JoinStep {
            expected: 0,
            got: seq,
        });
    }
    let gamma = req(&mgrkey.gamma, "gamma")?;
    let g1 = req(&grpkey.g1, "g1")?;

    // x with gamma + x invertible
    let (x, exp) = loop {
        let x = rand_nonzero(rng);
        let mut gx = gamma.clone();
        gx.add(&x);
        if let Some(inv) = gx.inverse() {
            break (x, inv);
        }
    };

    let mut a = g1.clone();
    a.mul(&exp);

    let id = gml.len();
    gml.insert(GmlEntry::Bbs04 { id, a: a.clone() })?;

    let mut w = frame(SCHEME, 0);
    w.put_elem(&a);
    w.put_elem(&x);
    Ok(Message::new(w.finish()))
}

/// Member side of the join: stores the issued credential.
pub fn join_mem(seq: u8, memkey: &mut MemberKey, grpkey: &GroupKey, msg_in: &Message) -> Result<()> {
    if seq != 1 {
        return Err(Error::JoinStep {
            expected: 1,
            got: seq,
        });
    }
    let g2 = req(&grpkey.g2, "g2")?;

    let mut r = open_frame(msg_in, SCHEME, 0)?;
    let a: G1 = r.take_elem()?;
    let x: Fr = r.take_elem()?;
    r.finish()?;

    memkey.ag2 = Some(Bls::pair(&a, g2));
    memkey.a = Some(a);
    memkey.x = Some(x);
    Ok(())
}

struct SpkInstance {
    ys: Vec<Elem<Bls>>,
    gs: Vec<Elem<Bls>>,
    rels: Vec<(u16, u16)>,
    prods: Vec<u16>,
}

/// Builds the SPK tables shared by sign and verify. The five relations
/// are T1 = u^α, T2 = v^β, the two cancellation relations for δ1 = xα and
/// δ2 = xβ, and the pairing relation tying T3 to a valid credential.
fn spk_instance(grpkey: &GroupKey, t1: &G1, t2: &G1, t3: &G1) -> Result<SpkInstance> {
    let g2 = req(&grpkey.g2, "g2")?;
    let u = req(&grpkey.u, "u")?;
    let v = req(&grpkey.v, "v")?;
    let w = req(&grpkey.w, "w")?;
    let hw = req(&grpkey.hw, "hw")?;
    let hg2 = req(&grpkey.hg2, "hg2")?;
    let g1g2 = req(&grpkey.g1g2, "g1g2")?;

    let mut neg_u = u.clone();
    neg_u.negate();
    let mut neg_v = v.clone();
    neg_v.negate();
    let mut neg_hw = hw.clone();
    neg_hw.negate();
    let mut neg_hg2 = hg2.clone();
    neg_hg2.negate();

    // y4 = e(g1,g2) / e(T3,w)
    let mut y4 = Bls::pair(t3, w);
    y4.negate();
    y4.add(g1g2);

    let ys = vec![
        Elem::G1(t1.clone()),
        Elem::G1(t2.clone()),
        Elem::G1(G1::zero()),
        Elem::G1(G1::zero()),
        Elem::Gt(y4),
    ];
    let gs = vec![
        Elem::G1(u.clone()),
        Elem::G1(v.clone()),
        Elem::G1(t1.clone()),
        Elem::G1(neg_u),
        Elem::G1(t2.clone()),
        Elem::G1(neg_v),
        Elem::Gt(Bls::pair(t3, g2)),
        Elem::Gt(neg_hw),
        Elem::Gt(neg_hg2),
    ];
    // witnesses: 0 = alpha, 1 = beta, 2 = x, 3 = delta1, 4 = delta2
    let rels = vec![
        (0, 0),
        (1, 1),
        (2, 2),
        (3, 3),
        (2, 4),
        (4, 5),
        (2, 6),
        (0, 7),
        (1, 7),
        (3, 8),
        (4, 8),
    ];
    let prods = vec![1, 1, 2, 2, 5];

    Ok(SpkInstance {
        ys,
        gs,
        rels,
        prods,
    })
}

pub fn sign<R: RngCore>(
    msg: &[u8],
    memkey: &MemberKey,
    grpkey: &GroupKey,
    rng: &mut R,
) -> Result<Signature> {
    let a = req(&memkey.a, "A")?;
    let x = req(&memkey.x, "x")?;
    let u = req(&grpkey.u, "u")?;
    let v = req(&grpkey.v, "v")?;
    let h = req(&grpkey.h, "h")?;

    let alpha = Fr::rand(rng);
    let beta = Fr::rand(rng);

    let mut t1 = u.clone();
    t1.mul(&alpha);
    let mut t2 = v.clone();
    t2.mul(&beta);

    // T3 = A * h^{alpha+beta}
    let mut ab = alpha.clone();
    ab.add(&beta);
    let mut t3 = h.clone();
    t3.mul(&ab);
    t3.add(a);

    let mut delta1 = x.clone();
    delta1.mul(&alpha);
    let mut delta2 = x.clone();
    delta2.mul(&beta);

    let inst = spk_instance(grpkey, &t1, &t2, &t3)?;
    let pi = SpkRep::<Bls>::sign(
        &inst.ys,
        &inst.gs,
        &[&alpha, &beta, x, &delta1, &delta2],
        &inst.rels,
        &inst.prods,
        msg,
        rng,
    )?;

    let [salpha, sbeta, sx, sdelta1, sdelta2]: [Fr; 5] = <[Fr; 5]>::try_from(pi.s)
        .map_err(|_| Error::MissingField("spk responses"))?;

    Ok(Signature {
        t1,
        t2,
        t3,
        c: pi.c,
        salpha,
        sbeta,
        sx,
        sdelta1,
        sdelta2,
    })
}

pub fn verify(sig: &Signature, msg: &[u8], grpkey: &GroupKey) -> Result<bool> {
    let inst = spk_instance(grpkey, &sig.t1, &sig.t2, &sig.t3)?;
    let pi = SpkRep::<Bls> {
        c: sig.c.clone(),
        s: vec![
            sig.salpha.clone(),
            sig.sbeta.clone(),
            sig.sx.clone(),
            sig.sdelta1.clone(),
            sig.sdelta2.clone(),
        ],
    };
    Ok(pi.verify(&inst.ys, &inst.gs, &inst.rels, &inst.prods, msg)?)
}

/// Recovers the signer's tracing point from the linear encryption.
fn tracing_point(sig: &Signature, mgrkey: &ManagerKey) -> Result<G1> {
    let xi1 = req(&mgrkey.xi1, "xi1")?;
    let xi2 = req(&mgrkey.xi2, "xi2")?;

    // A = T3 / (T1^xi1 * T2^xi2)
    let mut t1x = sig.t1.clone();
    t1x.mul(xi1);
    let mut t2x = sig.t2.clone();
    t2x.mul(xi2);
    t1x.add(&t2x);
    t1x.negate();
    let mut a = sig.t3.clone();
    a.add(&t1x);
    Ok(a)
}

/// Identifies the signer against the GML. `None` means no entry matched.
pub fn open(sig: &Signature, mgrkey: &ManagerKey, gml: &Gml) -> Result<Option<u64>> {
    let a = tracing_point(sig, mgrkey)?;
    for entry in gml.iter() {
        if let GmlEntry::Bbs04 { id, a: entry_a } = entry {
            if *entry_a == a {
                return Ok(Some(*id));
            }
        }
    }
    Ok(None)
}

/// Publishes a member's tracing point on the CRL and returns it.
pub fn reveal(id: u64, gml: &Gml, crl: &mut Crl) -> Result<Trapdoor> {
    let entry = gml.get(id).ok_or(Error::UnknownIdentity(id))?;
    let GmlEntry::Bbs04 { a, .. } = entry else {
        return Err(Error::SchemeMismatch {
            expected: SCHEME,
            got: entry.scheme(),
        });
    };
    let trapdoor = Trapdoor::Bbs04(a.clone());
    crl.insert(CrlEntry {
        id,
        trapdoor: trapdoor.clone(),
    })?;
    Ok(trapdoor)
}

/// Tests whether the signature was produced by any revoked member.
pub fn trace(sig: &Signature, mgrkey: &ManagerKey, crl: &Crl) -> Result<bool> {
    let a = tracing_point(sig, mgrkey)?;
    Ok(crl.iter().any(|entry| {
        let Trapdoor::Bbs04(td) = &entry.trapdoor;
        *td == a
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sysenv::Sysenv;

    fn group() -> (GroupKey, ManagerKey, Gml, Sysenv) {
        let mut rng = Sysenv::from_seed(1);
        let mut grpkey = GroupKey::default();
        let mgrkey = setup(&mut grpkey, &mut rng).unwrap();
        (grpkey, mgrkey, Gml::new(SCHEME), rng)
    }

    fn member(
        mgrkey: &ManagerKey,
        grpkey: &GroupKey,
        gml: &mut Gml,
        rng: &mut Sysenv,
    ) -> MemberKey {
        let msg0 = join_mgr(0, mgrkey, grpkey, gml, rng).unwrap();
        let mut memkey = MemberKey::default();
        join_mem(1, &mut memkey, grpkey, &msg0).unwrap();
        memkey
    }

    #[test]
    fn lifecycle() {
        let (grpkey, mgrkey, mut gml, mut rng) = group();
        let memkey = member(&mgrkey, &grpkey, &mut gml, &mut rng);

        let sig = sign(b"hello", &memkey, &grpkey, &mut rng).unwrap();
        assert!(verify(&sig, b"hello", &grpkey).unwrap());
        assert!(!verify(&sig, b"goodbye", &grpkey).unwrap());

        assert_eq!(open(&sig, &mgrkey, &gml).unwrap(), Some(0));
    }

    #[test]
    fn open_distinguishes_members() {
        let (grpkey, mgrkey, mut gml, mut rng) = group();
        let m0 = member(&mgrkey, &grpkey, &mut gml, &mut rng);
        let m1 = member(&mgrkey, &grpkey, &mut gml, &mut rng);

        let s0 = sign(b"m", &m0, &grpkey, &mut rng).unwrap();
        let s1 = sign(b"m", &m1, &grpkey, &mut rng).unwrap();
        assert_eq!(open(&s0, &mgrkey, &gml).unwrap(), Some(0));
        assert_eq!(open(&s1, &mgrkey, &gml).unwrap(), Some(1));
    }

    #[test]
    fn open_fails_on_unknown_member() {
        let (grpkey, mgrkey, mut gml, mut rng) = group();
        let memkey = member(&mgrkey, &grpkey, &mut gml, &mut rng);
        let sig = sign(b"m", &memkey, &grpkey, &mut rng).unwrap();

        let empty = Gml::new(SCHEME);
        assert_eq!(open(&sig, &mgrkey, &empty).unwrap(), None);
    }

    #[test]
    fn wrong_group_key_rejects() {
        let (grpkey, mgrkey, mut gml, mut rng) = group();
        let memkey = member(&mgrkey, &grpkey, &mut gml, &mut rng);
        let sig = sign(b"m", &memkey, &grpkey, &mut rng).unwrap();

        let mut other = GroupKey::default();
        setup(&mut other, &mut rng).unwrap();
        assert!(!verify(&sig, b"m", &other).unwrap());
    }

    #[test]
    fn setup_twice_is_an_error() {
        let (mut grpkey, _mgrkey, _gml, mut rng) = group();
        assert!(matches!(
            setup(&mut grpkey, &mut rng),
            Err(Error::SetupComplete)
        ));
    }

    #[test]
    fn reveal_and_trace() {
        let (grpkey, mgrkey, mut gml, mut rng) = group();
        let m0 = member(&mgrkey, &grpkey, &mut gml, &mut rng);
        let m1 = member(&mgrkey, &grpkey, &mut gml, &mut rng);

        let mut crl = Crl::new(SCHEME);
        reveal(0, &gml, &mut crl).unwrap();

        let s0 = sign(b"m", &m0, &grpkey, &mut rng).unwrap();
        let s1 = sign(b"m", &m1, &grpkey, &mut rng).unwrap();
        assert!(trace(&s0, &mgrkey, &crl).unwrap());
        assert!(!trace(&s1, &mgrkey, &crl).unwrap());

        assert!(reveal(9, &gml, &mut crl).is_err());
    }

    #[test]
    fn wire_roundtrips() {
        let (grpkey, mgrkey, mut gml, mut rng) = group();
        let memkey = member(&mgrkey, &grpkey, &mut gml, &mut rng);
        let sig = sign(b"m", &memkey, &grpkey, &mut rng).unwrap();

        assert_eq!(GroupKey::from_bytes(&grpkey.to_bytes()).unwrap(), grpkey);
        assert_eq!(
            ManagerKey::from_bytes(&mgrkey.to_bytes()).unwrap(),
            mgrkey
        );
        assert_eq!(MemberKey::from_bytes(&memkey.to_bytes()).unwrap(), memkey);
        assert_eq!(Signature::from_bytes(&sig.to_bytes()).unwrap(), sig);

        // key role tags are enforced
        assert!(matches!(
            ManagerKey::from_bytes(&grpkey.to_bytes()),
            Err(Error::KeyTypeMismatch { .. })
        ));
    }

    #[test]
    fn partial_key_roundtrips() {
        let partial = MemberKey {
            a: None,
            x: Some(Fr::one()),
            ag2: None,
        };
        let back = MemberKey::from_bytes(&partial.to_bytes()).unwrap();
        assert_eq!(back, partial);
        assert!(back.a.is_none());
    }

    #[test]
    fn join_step_enforced() {
        let (grpkey, mgrkey, mut gml, mut rng) = group();
        assert!(matches!(
            join_mgr(2, &mgrkey, &grpkey, &mut gml, &mut rng),
            Err(Error::JoinStep { .. })
        ));

        let msg0 = join_mgr(0, &mgrkey, &grpkey, &mut gml, &mut rng).unwrap();
        let mut memkey = MemberKey::default();
        assert!(matches!(
            join_mem(3, &mut memkey, &grpkey, &msg0),
            Err(Error::JoinStep { .. })
        ));
    }
}
