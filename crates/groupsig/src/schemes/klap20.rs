//! KLAP20: PS-style credentials with split issuer and opener authorities.
//!
//! Setup runs in two phases through the same entry point: the first call on
//! an empty group key generates the issuer keypair `(x, y)` and the group
//! parameters, the second generates the opener keypair `(z0, z1)` and
//! completes the key; a third call is an error.
//!
//! Joining members prove knowledge of `α` for `τ = g^α` and deposit the tag
//! `τ̃ = g̃^α` together with the opener-keyed binding pair
//! `(SS1, SS2) = (Z̃0^α, Z̃1^α)`. The issuer returns the credential
//! `(u, v, w) = (g^k, (g^x τ^y)^k, τ^k)`, which satisfies
//! `e(v, g̃) = e(u, X̃)·e(w, Ỹ)` and `w = u^α`. Signatures re-randomize
//! the triple and prove `α` by a discrete log; opening authenticates each
//! GML tag with `(z0, z1)` before matching `e(w̃, g̃) = e(ũ, τ̃)`, and
//! emits a two-relation proof of `z0` that binds the published `Z̃0` to
//! the matched tag.

use crate::error::{Error, Result};
use crate::gml::{Gml, GmlEntry};
use crate::join::{frame, open_frame};
use crate::msg::Message;
use crate::scheme::{KeyType, SchemeCode};
use crate::schemes::{rand_nonzero, req, Bls, Fr, G1, G2};
use crate::wire::{FieldReader, FieldWriter};
use groupsig_core::group::{Element, Encodable, PairingCurve};
use groupsig_core::spk::{Elem, SpkDlog, SpkRep};
use rand_core::RngCore;

const SCHEME: SchemeCode = SchemeCode::Klap20;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupKey {
    pub g: Option<G1>,
    pub gg: Option<G2>,
    /// Issuer public key `X̃ = g̃^x`.
    pub xx: Option<G2>,
    /// Issuer public key `Ỹ = g̃^y`.
    pub yy: Option<G2>,
    /// Opener public key `Z̃0 = g̃^{z0}`; absent until phase 2.
    pub zz0: Option<G2>,
    /// Opener public key `Z̃1 = g̃^{z1}`; absent until phase 2.
    pub zz1: Option<G2>,
}

/// Holds the issuer half after phase 1 and the opener half after phase 2;
/// the two halves live in different key objects in a real deployment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManagerKey {
    pub x: Option<Fr>,
    pub y: Option<Fr>,
    pub z0: Option<Fr>,
    pub z1: Option<Fr>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemberKey {
    pub alpha: Option<Fr>,
    pub u: Option<G1>,
    pub v: Option<G1>,
    pub w: Option<G1>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    pub uu: G1,
    pub vv: G1,
    pub ww: G1,
    pub c: Fr,
    pub s: Fr,
}

/// Opening proof: the matched tag, its binding `SS1`, and an SPK of `z0`
/// for the pair of relations `Z̃0 = g̃^{z0}` and `e(ũ, SS1) = e(ũ, τ̃)^{z0}`.
#[derive(Clone, Debug, PartialEq)]
pub struct Proof {
    pub ttau: G2,
    pub ss1: G2,
    pub c: Fr,
    pub s: Fr,
}

impl GroupKey {
    fn issuer_done(&self) -> bool {
        self.g.is_some()
    }

    fn opener_done(&self) -> bool {
        self.zz0.is_some()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(SCHEME.code());
        w.put_tag(KeyType::Group.code());
        w.put_opt_elem(self.g.as_ref());
        w.put_opt_elem(self.gg.as_ref());
        w.put_opt_elem(self.xx.as_ref());
        w.put_opt_elem(self.yy.as_ref());
        w.put_opt_elem(self.zz0.as_ref());
        w.put_opt_elem(self.zz1.as_ref());
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = key_reader(bytes, KeyType::Group)?;
        let key = Self {
            g: r.take_opt_elem()?,
            gg: r.take_opt_elem()?,
            xx: r.take_opt_elem()?,
            yy: r.take_opt_elem()?,
            zz0: r.take_opt_elem()?,
            zz1: r.take_opt_elem()?,
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
        w.put_opt_elem(self.x.as_ref());
        w.put_opt_elem(self.y.as_ref());
        w.put_opt_elem(self.z0.as_ref());
        w.put_opt_elem(self.z1.as_ref());
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = key_reader(bytes, KeyType::Manager)?;
        let key = Self {
            x: r.take_opt_elem()?,
            y: r.take_opt_elem()?,
            z0: r.take_opt_elem()?,
            z1: r.take_opt_elem()?,
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
        w.put_opt_elem(self.alpha.as_ref());
        w.put_opt_elem(self.u.as_ref());
        w.put_opt_elem(self.v.as_ref());
        w.put_opt_elem(self.w.as_ref());
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = key_reader(bytes, KeyType::Member)?;
        let key = Self {
            alpha: r.take_opt_elem()?,
            u: r.take_opt_elem()?,
            v: r.take_opt_elem()?,
            w: r.take_opt_elem()?,
        };
        r.finish()?;
        Ok(key)
    }
}

impl Signature {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(SCHEME.code());
        w.put_elem(&self.uu);
        w.put_elem(&self.vv);
        w.put_elem(&self.ww);
        w.put_elem(&self.c);
        w.put_elem(&self.s);
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = scheme_reader(bytes)?;
        let sig = Self {
            uu: r.take_elem()?,
            vv: r.take_elem()?,
            ww: r.take_elem()?,
            c: r.take_elem()?,
            s: r.take_elem()?,
        };
        r.finish()?;
        Ok(sig)
    }
}

impl Proof {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(SCHEME.code());
        w.put_elem(&self.ttau);
        w.put_elem(&self.ss1);
        w.put_elem(&self.c);
        w.put_elem(&self.s);
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = scheme_reader(bytes)?;
        let proof = Self {
            ttau: r.take_elem()?,
            ss1: r.take_elem()?,
            c: r.take_elem()?,
            s: r.take_elem()?,
        };
        r.finish()?;
        Ok(proof)
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

/// Two-phase setup. The phase is keyed on the group key's population: an
/// empty key runs the issuer phase, a phase-1 key runs the opener phase,
/// and a complete key is an error.
pub fn setup<R: RngCore>(grpkey: &mut GroupKey, rng: &mut R) -> Result<ManagerKey> {
    if !grpkey.issuer_done() {
        let x = rand_nonzero(rng);
        let y = rand_nonzero(rng);

        let g = G1::rand(rng);
        let gg = G2::rand(rng);

        let mut xx = gg.clone();
        xx.mul(&x);
        let mut yy = gg.clone();
        yy.mul(&y);

        grpkey.g = Some(g);
        grpkey.gg = Some(gg);
        grpkey.xx = Some(xx);
        grpkey.yy = Some(yy);

        return Ok(ManagerKey {
            x: Some(x),
            y: Some(y),
            z0: None,
            z1: None,
        });
    }

    if grpkey.opener_done() {
        return Err(Error::SetupComplete);
    }

    let gg = req(&grpkey.gg, "gg")?;

    let z0 = rand_nonzero(rng);
    let z1 = rand_nonzero(rng);

    let mut zz0 = gg.clone();
    zz0.mul(&z0);
    let mut zz1 = gg.clone();
    zz1.mul(&z1);

    grpkey.zz0 = Some(zz0);
    grpkey.zz1 = Some(zz1);

    Ok(ManagerKey {
        x: None,
        y: None,
        z0: Some(z0),
        z1: Some(z1),
    })
}

pub fn join_mgr<R: RngCore>(
    seq: u8,
    mgrkey: &ManagerKey,
    grpkey: &GroupKey,
    gml: &mut Gml,
    msg_in: Option<&Message>,
    rng: &mut R,
) -> Result<Message> {
    match seq {
        0 => {
            let n = Fr::rand(rng);
            let mut w = frame(SCHEME, 0);
            w.put_elem(&n);
            Ok(Message::new(w.finish()))
        }
        2 => {
            let msg_in = msg_in.ok_or(Error::MissingField("join message"))?;
            let x = req(&mgrkey.x, "x")?;
            let y = req(&mgrkey.y, "y")?;
            let g = req(&grpkey.g, "g")?;
            let gg = req(&grpkey.gg, "gg")?;
            let zz0 = req(&grpkey.zz0, "zz0")?;
            let zz1 = req(&grpkey.zz1, "zz1")?;

            let mut r = open_frame(msg_in, SCHEME, 1)?;
            let n: Fr = r.take_elem()?;
            let tau: G1 = r.take_elem()?;
            let ttau: G2 = r.take_elem()?;
            let ss1: G2 = r.take_elem()?;
            let ss2: G2 = r.take_elem()?;
            let pi = SpkDlog {
                c: r.take_elem()?,
                s: r.take_elem()?,
            };
            r.finish()?;

            if !pi.verify(&tau, g, &n.marshal()) {
                return Err(Error::JoinProof);
            }
            // the tag and both bindings must carry the same alpha as tau
            if Bls::pair(&tau, gg) != Bls::pair(g, &ttau)
                || Bls::pair(&tau, zz0) != Bls::pair(g, &ss1)
                || Bls::pair(&tau, zz1) != Bls::pair(g, &ss2)
            {
                return Err(Error::JoinProof);
            }

            let k = rand_nonzero(rng);
            let mut u = g.clone();
            u.mul(&k);

            // v = (g^x * tau^y)^k
            let mut v = g.clone();
            v.mul(x);
            let mut ty = tau.clone();
            ty.mul(y);
            v.add(&ty);
            v.mul(&k);

            // w = tau^k = u^alpha
            let mut w_cred = tau;
            w_cred.mul(&k);

            let id = gml.len();
            gml.insert(GmlEntry::Klap20 {
                id,
                ttau,
                ss1,
                ss2,
            })?;

            let mut w = frame(SCHEME, 2);
            w.put_elem(&u);
            w.put_elem(&v);
            w.put_elem(&w_cred);
            Ok(Message::new(w.finish()))
        }
        other => Err(Error::JoinStep {
            expected: 0,
            got: other,
        }),
    }
}

pub fn join_mem<R: RngCore>(
    seq: u8,
    memkey: &mut MemberKey,
    grpkey: &GroupKey,
    msg_in: &Message,
    rng: &mut R,
) -> Result<Option<Message>> {
    match seq {
        1 => {
            let g = req(&grpkey.g, "g")?;
            let gg = req(&grpkey.gg, "gg")?;
            let zz0 = req(&grpkey.zz0, "zz0")?;
            let zz1 = req(&grpkey.zz1, "zz1")?;

            let mut r = open_frame(msg_in, SCHEME, 0)?;
            let n: Fr = r.take_elem()?;
            r.finish()?;

            let alpha = rand_nonzero(rng);
            let mut tau = g.clone();
            tau.mul(&alpha);
            let mut ttau = gg.clone();
            ttau.mul(&alpha);
            let mut ss1 = zz0.clone();
            ss1.mul(&alpha);
            let mut ss2 = zz1.clone();
            ss2.mul(&alpha);

            let pi = SpkDlog::sign(&tau, g, &alpha, &n.marshal(), rng);

            memkey.alpha = Some(alpha);

            let mut w = frame(SCHEME, 1);
            w.put_elem(&n);
            w.put_elem(&tau);
            w.put_elem(&ttau);
            w.put_elem(&ss1);
            w.put_elem(&ss2);
            w.put_elem(&pi.c);
            w.put_elem(&pi.s);
            Ok(Some(Message::new(w.finish())))
        }
        3 => {
            let alpha = req(&memkey.alpha, "alpha")?.clone();
            let gg = req(&grpkey.gg, "gg")?;
            let xx = req(&grpkey.xx, "xx")?;
            let yy = req(&grpkey.yy, "yy")?;

            let mut r = open_frame(msg_in, SCHEME, 2)?;
            let u: G1 = r.take_elem()?;
            let v: G1 = r.take_elem()?;
            let w_cred: G1 = r.take_elem()?;
            r.finish()?;

            // credential equation e(v, gg) = e(u, X̃) * e(w, Ỹ)
            let mut rhs = Bls::pair(&u, xx);
            rhs.add(&Bls::pair(&w_cred, yy));
            if Bls::pair(&v, gg) != rhs {
                return Err(Error::JoinProof);
            }
            // and w must be u^alpha
            let mut ua = u.clone();
            ua.mul(&alpha);
            if ua != w_cred {
                return Err(Error::JoinProof);
            }

            memkey.u = Some(u);
            memkey.v = Some(v);
            memkey.w = Some(w_cred);
            Ok(None)
        }
        other => Err(Error::JoinStep {
            expected: 1,
            got: other,
        }),
    }
}

pub fn sign<R: RngCore>(
    msg: &[u8],
    memkey: &MemberKey,
    grpkey: &GroupKey,
    rng: &mut R,
) -> Result<Signature> {
    let alpha = req(&memkey.alpha, "alpha")?;
    let u = req(&memkey.u, "u")?;
    let v = req(&memkey.v, "v")?;
    let w = req(&memkey.w, "w")?;
    // signatures only make sense once the opener phase ran
    req(&grpkey.zz0, "zz0")?;

    let r = rand_nonzero(rng);
    let mut uu = u.clone();
    uu.mul(&r);
    let mut vv = v.clone();
    vv.mul(&r);
    let mut ww = w.clone();
    ww.mul(&r);

    let pi = SpkDlog::sign(&ww, &uu, alpha, msg, rng);

    Ok(Signature {
        uu,
        vv,
        ww,
        c: pi.c,
        s: pi.s,
    })
}

pub fn verify(sig: &Signature, msg: &[u8], grpkey: &GroupKey) -> Result<bool> {
    let gg = req(&grpkey.gg, "gg")?;
    let xx = req(&grpkey.xx, "xx")?;
    let yy = req(&grpkey.yy, "yy")?;

    if sig.uu == G1::zero() {
        return Ok(false);
    }

    // e(vv, gg) = e(uu, X̃) * e(ww, Ỹ)
    let mut rhs = Bls::pair(&sig.uu, xx);
    rhs.add(&Bls::pair(&sig.ww, yy));
    if Bls::pair(&sig.vv, gg) != rhs {
        return Ok(false);
    }

    let pi = SpkDlog {
        c: sig.c.clone(),
        s: sig.s.clone(),
    };
    Ok(pi.verify(&sig.ww, &sig.uu, msg))
}

/// Identifies the signer. Every consulted GML entry is first authenticated
/// against the opener key; a bad binding means the list was tampered with.
pub fn open<R: RngCore>(
    sig: &Signature,
    mgrkey: &ManagerKey,
    grpkey: &GroupKey,
    gml: &Gml,
    rng: &mut R,
) -> Result<Option<(u64, Proof)>> {
    let z0 = req(&mgrkey.z0, "z0")?;
    let z1 = req(&mgrkey.z1, "z1")?;
    let gg = req(&grpkey.gg, "gg")?;
    let zz0 = req(&grpkey.zz0, "zz0")?;

    let lhs = Bls::pair(&sig.ww, gg);

    for entry in gml.iter() {
        let GmlEntry::Klap20 { id, ttau, ss1, ss2 } = entry else {
            continue;
        };

        // SS1 = ttau^{z0}, SS2 = ttau^{z1}
        let mut t0 = ttau.clone();
        t0.mul(z0);
        let mut t1 = ttau.clone();
        t1.mul(z1);
        if t0 != *ss1 || t1 != *ss2 {
            return Err(Error::GmlTampered);
        }

        if Bls::pair(&sig.uu, ttau) != lhs {
            continue;
        }

        // SPK of z0 for Z̃0 = g̃^{z0} and e(uu, SS1) = e(uu, ttau)^{z0}
        let b = Bls::pair(&sig.uu, ttau);
        let e = Bls::pair(&sig.uu, ss1);
        let ys = [Elem::G2(zz0.clone()), Elem::Gt(e)];
        let gs = [Elem::G2(gg.clone()), Elem::Gt(b)];
        let rels = [(0u16, 0u16), (0, 1)];
        let prods = [1u16, 1];

        let pi = SpkRep::<Bls>::sign(&ys, &gs, &[z0], &rels, &prods, &sig.to_bytes(), rng)?;

        let [s]: [Fr; 1] =
            <[Fr; 1]>::try_from(pi.s).map_err(|_| Error::MissingField("spk responses"))?;

        return Ok(Some((
            *id,
            Proof {
                ttau: ttau.clone(),
                ss1: ss1.clone(),
                c: pi.c,
                s,
            },
        )));
    }

    Ok(None)
}

/// Checks an opening proof: the match equation against the claimed tag,
/// and the SPK binding the tag to the published opener key.
pub fn open_verify(proof: &Proof, sig: &Signature, grpkey: &GroupKey) -> Result<bool> {
    let gg = req(&grpkey.gg, "gg")?;
    let zz0 = req(&grpkey.zz0, "zz0")?;

    if Bls::pair(&sig.uu, &proof.ttau) != Bls::pair(&sig.ww, gg) {
        return Ok(false);
    }

    let b = Bls::pair(&sig.uu, &proof.ttau);
    let e = Bls::pair(&sig.uu, &proof.ss1);
    let ys = [Elem::G2(zz0.clone()), Elem::Gt(e)];
    let gs = [Elem::G2(gg.clone()), Elem::Gt(b)];
    let rels = [(0u16, 0u16), (0, 1)];
    let prods = [1u16, 1];

    let pi = SpkRep::<Bls> {
        c: proof.c.clone(),
        s: vec![proof.s.clone()],
    };
    Ok(pi.verify(&ys, &gs, &rels, &prods, &sig.to_bytes())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sysenv::Sysenv;

    fn group() -> (GroupKey, ManagerKey, ManagerKey, Gml, Sysenv) {
        let mut rng = Sysenv::from_seed(11);
        let mut grpkey = GroupKey::default();
        let issuer = setup(&mut grpkey, &mut rng).unwrap();
        let opener = setup(&mut grpkey, &mut rng).unwrap();
        (grpkey, issuer, opener, Gml::new(SCHEME), rng)
    }

    fn member(
        issuer: &ManagerKey,
        grpkey: &GroupKey,
        gml: &mut Gml,
        rng: &mut Sysenv,
    ) -> MemberKey {
        let msg0 = join_mgr(0, issuer, grpkey, gml, None, rng).unwrap();
        let mut memkey = MemberKey::default();
        let msg1 = join_mem(1, &mut memkey, grpkey, &msg0, rng)
            .unwrap()
            .unwrap();
        let msg2 = join_mgr(2, issuer, grpkey, gml, Some(&msg1), rng).unwrap();
        assert!(join_mem(3, &mut memkey, grpkey, &msg2, rng)
            .unwrap()
            .is_none());
        memkey
    }

    #[test]
    fn staged_setup() {
        let mut rng = Sysenv::from_seed(3);
        let mut grpkey = GroupKey::default();

        let issuer = setup(&mut grpkey, &mut rng).unwrap();
        assert!(grpkey.g.is_some());
        assert!(grpkey.zz0.is_none());
        assert!(grpkey.zz1.is_none());
        assert!(issuer.x.is_some() && issuer.z0.is_none());

        let opener = setup(&mut grpkey, &mut rng).unwrap();
        assert!(grpkey.zz0.is_some() && grpkey.zz1.is_some());
        assert!(opener.z0.is_some() && opener.x.is_none());

        assert!(matches!(
            setup(&mut grpkey, &mut rng),
            Err(Error::SetupComplete)
        ));
    }

    #[test]
    fn lifecycle() {
        let (grpkey, issuer, opener, mut gml, mut rng) = group();
        let _m0 = member(&issuer, &grpkey, &mut gml, &mut rng);
        let m1 = member(&issuer, &grpkey, &mut gml, &mut rng);

        let sig = sign(b"payload", &m1, &grpkey, &mut rng).unwrap();
        assert!(verify(&sig, b"payload", &grpkey).unwrap());
        assert!(!verify(&sig, b"other", &grpkey).unwrap());

        let (id, proof) = open(&sig, &opener, &grpkey, &gml, &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(id, 1);
        assert!(open_verify(&proof, &sig, &grpkey).unwrap());

        let mut bad = proof.clone();
        bad.s.add(&Fr::one());
        assert!(!open_verify(&bad, &sig, &grpkey).unwrap());
    }

    #[test]
    fn open_needs_the_opener_half() {
        let (grpkey, issuer, _opener, mut gml, mut rng) = group();
        let memkey = member(&issuer, &grpkey, &mut gml, &mut rng);
        let sig = sign(b"payload", &memkey, &grpkey, &mut rng).unwrap();

        assert!(matches!(
            open(&sig, &issuer, &grpkey, &gml, &mut rng),
            Err(Error::MissingField(_))
        ));
    }

    #[test]
    fn tampered_gml_is_detected() {
        let (grpkey, issuer, opener, mut gml, mut rng) = group();
        let memkey = member(&issuer, &grpkey, &mut gml, &mut rng);
        let sig = sign(b"payload", &memkey, &grpkey, &mut rng).unwrap();

        // swap the binding of the only entry for a random point
        let mut bad = Gml::new(SCHEME);
        let Some(GmlEntry::Klap20 { id, ttau, ss2, .. }) = gml.get(0).cloned() else {
            panic!("entry missing");
        };
        bad.insert(GmlEntry::Klap20 {
            id,
            ttau,
            ss1: G2::rand(&mut rng),
            ss2,
        })
        .unwrap();

        assert!(matches!(
            open(&sig, &opener, &grpkey, &bad, &mut rng),
            Err(Error::GmlTampered)
        ));
    }

    #[test]
    fn wire_roundtrips() {
        let (grpkey, issuer, opener, mut gml, mut rng) = group();
        let memkey = member(&issuer, &grpkey, &mut gml, &mut rng);
        let sig = sign(b"payload", &memkey, &grpkey, &mut rng).unwrap();
        let (_, proof) = open(&sig, &opener, &grpkey, &gml, &mut rng)
            .unwrap()
            .unwrap();

        assert_eq!(GroupKey::from_bytes(&grpkey.to_bytes()).unwrap(), grpkey);
        assert_eq!(ManagerKey::from_bytes(&issuer.to_bytes()).unwrap(), issuer);
        assert_eq!(ManagerKey::from_bytes(&opener.to_bytes()).unwrap(), opener);
        assert_eq!(MemberKey::from_bytes(&memkey.to_bytes()).unwrap(), memkey);
        assert_eq!(Signature::from_bytes(&sig.to_bytes()).unwrap(), sig);
        assert_eq!(Proof::from_bytes(&proof.to_bytes()).unwrap(), proof);
    }

    #[test]
    fn phase1_group_key_roundtrips_with_absent_tail() {
        let mut rng = Sysenv::from_seed(5);
        let mut grpkey = GroupKey::default();
        setup(&mut grpkey, &mut rng).unwrap();

        let back = GroupKey::from_bytes(&grpkey.to_bytes()).unwrap();
        assert_eq!(back, grpkey);
        assert!(back.zz0.is_none());
    }
}
