//! DL21: BBS+ credentials with user-controlled linkability.
//!
//! No opener exists; instead every signature carries a pseudonym
//! `nym = H(scope)^y` bound to a caller-chosen scope string, so the same
//! member is linkable within a scope and unlinkable across scopes.
//! Messages are JSON composites `{"scope": …, "message": …}`; the whole
//! composite is what the proof signs.
//!
//! `identify` lets a member recognize its own signatures; `link` produces
//! a discrete-log proof of `y` over the product of the pseudonyms of
//! several same-scope signatures.

use crate::error::{Error, Result};
use crate::join::{frame, open_frame};
use crate::msg::Message;
use crate::scheme::{KeyType, SchemeCode};
use crate::schemes::{inverse, rand_nonzero, req, Bls, Fr, G1, G2};
use crate::wire::{FieldReader, FieldWriter};
use groupsig_core::group::{Element, Encodable, PairingCurve, Point, Scalar as _};
use groupsig_core::spk::{Elem, SpkDlog, SpkRep};
use rand_core::RngCore;

const SCHEME: SchemeCode = SchemeCode::Dl21;

pub(crate) const SPK_NS: usize = 6;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupKey {
    pub g1: Option<G1>,
    pub g2: Option<G2>,
    pub h1: Option<G1>,
    pub h2: Option<G1>,
    /// Issuer public key `g̃^{isk}`.
    pub ipk: Option<G2>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManagerKey {
    pub isk: Option<Fr>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemberKey {
    pub a: Option<G1>,
    pub x: Option<Fr>,
    pub y: Option<Fr>,
    pub s: Option<Fr>,
    /// `H = h1^y`.
    pub h: Option<G1>,
    pub h2s: Option<G1>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    pub aa: G1,
    pub a_: G1,
    pub d: G1,
    pub nym: G1,
    pub c: Fr,
    pub s: Vec<Fr>,
}

/// Link proof: SPK of `y` over the product-of-pseudonyms relation.
#[derive(Clone, Debug, PartialEq)]
pub struct Proof {
    pub c: Fr,
    pub s: Fr,
}

impl GroupKey {
    fn is_empty(&self) -> bool {
        self.g1.is_none() && self.g2.is_none() && self.ipk.is_none()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(SCHEME.code());
        w.put_tag(KeyType::Group.code());
        w.put_opt_elem(self.g1.as_ref());
        w.put_opt_elem(self.g2.as_ref());
        w.put_opt_elem(self.h1.as_ref());
        w.put_opt_elem(self.h2.as_ref());
        w.put_opt_elem(self.ipk.as_ref());
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = key_reader(bytes, KeyType::Group)?;
        let key = Self {
            g1: r.take_opt_elem()?,
            g2: r.take_opt_elem()?,
            h1: r.take_opt_elem()?,
            h2: r.take_opt_elem()?,
            ipk: r.take_opt_elem()?,
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
        w.put_opt_elem(self.isk.as_ref());
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = key_reader(bytes, KeyType::Manager)?;
        let key = Self {
            isk: r.take_opt_elem()?,
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
        w.put_opt_elem(self.y.as_ref());
        w.put_opt_elem(self.s.as_ref());
        w.put_opt_elem(self.h.as_ref());
        w.put_opt_elem(self.h2s.as_ref());
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = key_reader(bytes, KeyType::Member)?;
        let key = Self {
            a: r.take_opt_elem()?,
            x: r.take_opt_elem()?,
            y: r.take_opt_elem()?,
            s: r.take_opt_elem()?,
            h: r.take_opt_elem()?,
            h2s: r.take_opt_elem()?,
        };
        r.finish()?;
        Ok(key)
    }
}

impl Signature {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(SCHEME.code());
        w.put_elem(&self.aa);
        w.put_elem(&self.a_);
        w.put_elem(&self.d);
        w.put_elem(&self.nym);
        w.put_elem(&self.c);
        for s in &self.s {
            w.put_elem(s);
        }
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = scheme_reader(bytes)?;
        let aa = r.take_elem()?;
        let a_ = r.take_elem()?;
        let d = r.take_elem()?;
        let nym = r.take_elem()?;
        let c = r.take_elem()?;
        let mut s = Vec::with_capacity(SPK_NS);
        for _ in 0..SPK_NS {
            s.push(r.take_elem()?);
        }
        r.finish()?;
        Ok(Self {
            aa,
            a_,
            d,
            nym,
            c,
            s,
        })
    }
}

impl Proof {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(SCHEME.code());
        w.put_elem(&self.c);
        w.put_elem(&self.s);
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = scheme_reader(bytes)?;
        let proof = Self {
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

/// Hashes a scope string (or scope-derived bytes) onto G1.
pub(crate) fn scope_base(scope: &[u8]) -> Result<G1> {
    let mut p = G1::zero();
    p.map(scope).map_err(|_| Error::HashToPoint)?;
    Ok(p)
}

pub fn setup<R: RngCore>(grpkey: &mut GroupKey, rng: &mut R) -> Result<ManagerKey> {
    if !grpkey.is_empty() {
        return Err(Error::SetupComplete);
    }

    let isk = rand_nonzero(rng);

    let g1 = G1::rand(rng);
    let g2 = G2::rand(rng);
    let h1 = G1::rand(rng);
    let h2 = G1::rand(rng);

    let mut ipk = g2.clone();
    ipk.mul(&isk);

    grpkey.g1 = Some(g1);
    grpkey.g2 = Some(g2);
    grpkey.h1 = Some(h1);
    grpkey.h2 = Some(h2);
    grpkey.ipk = Some(ipk);

    Ok(ManagerKey { isk: Some(isk) })
}

pub(crate) fn join_mgr_impl<R: RngCore>(
    scheme: SchemeCode,
    seq: u8,
    isk: &Option<Fr>,
    g1: &Option<G1>,
    h1: &Option<G1>,
    h2: &Option<G1>,
    msg_in: Option<&Message>,
    rng: &mut R,
) -> Result<Message> {
    match seq {
        0 => {
            let n = G1::rand(rng);
            let mut w = frame(scheme, 0);
            w.put_elem(&n);
            Ok(Message::new(w.finish()))
        }
        2 => {
            let msg_in = msg_in.ok_or(Error::MissingField("join message"))?;
            let isk = req(isk, "isk")?;
            let g1 = req(g1, "g1")?;
            let h1 = req(h1, "h1")?;
            let h2 = req(h2, "h2")?;

            let mut r = open_frame(msg_in, scheme, 1)?;
            let n: G1 = r.take_elem()?;
            let big_h: G1 = r.take_elem()?;
            let pi = SpkDlog {
                c: r.take_elem()?,
                s: r.take_elem()?,
            };
            r.finish()?;

            if !pi.verify(&big_h, h1, &n.marshal()) {
                return Err(Error::JoinProof);
            }

            let x = rand_nonzero(rng);
            let s = rand_nonzero(rng);

            // A = (g1 * H * h2^s)^{1/(isk+x)}
            let mut h2s = h2.clone();
            h2s.mul(&s);
            let mut a = g1.clone();
            a.add(&big_h);
            a.add(&h2s);
            let mut exp = isk.clone();
            exp.add(&x);
            a.mul(&inverse(&exp)?);

            let mut w = frame(scheme, 2);
            w.put_elem(&a);
            w.put_elem(&x);
            w.put_elem(&s);
            Ok(Message::new(w.finish()))
        }
        other => Err(Error::JoinStep {
            expected: 0,
            got: other,
        }),
    }
}

pub fn join_mgr<R: RngCore>(
    seq: u8,
    mgrkey: &ManagerKey,
    grpkey: &GroupKey,
    msg_in: Option<&Message>,
    rng: &mut R,
) -> Result<Message> {
    join_mgr_impl(
        SCHEME,
        seq,
        &mgrkey.isk,
        &grpkey.g1,
        &grpkey.h1,
        &grpkey.h2,
        msg_in,
        rng,
    )
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
            let h1 = req(&grpkey.h1, "h1")?;

            let mut r = open_frame(msg_in, SCHEME, 0)?;
            let n: G1 = r.take_elem()?;
            r.finish()?;

            let y = rand_nonzero(rng);
            let mut big_h = h1.clone();
            big_h.mul(&y);

            let pi = SpkDlog::sign(&big_h, h1, &y, &n.marshal(), rng);

            memkey.y = Some(y);
            memkey.h = Some(big_h.clone());

            let mut w = frame(SCHEME, 1);
            w.put_elem(&n);
            w.put_elem(&big_h);
            w.put_elem(&pi.c);
            w.put_elem(&pi.s);
            Ok(Some(Message::new(w.finish())))
        }
        3 => {
            let big_h = req(&memkey.h, "H")?.clone();
            let g1 = req(&grpkey.g1, "g1")?;
            let g2 = req(&grpkey.g2, "g2")?;
            let h2 = req(&grpkey.h2, "h2")?;
            let ipk = req(&grpkey.ipk, "ipk")?;

            let mut r = open_frame(msg_in, SCHEME, 2)?;
            let a: G1 = r.take_elem()?;
            let x: Fr = r.take_elem()?;
            let s: Fr = r.take_elem()?;
            r.finish()?;

            let mut h2s = h2.clone();
            h2s.mul(&s);

            // e(A, ipk * g2^x) = e(g1*H*h2^s, g2)
            let mut tail = g2.clone();
            tail.mul(&x);
            tail.add(ipk);
            let mut base = g1.clone();
            base.add(&big_h);
            base.add(&h2s);
            if Bls::pair(&a, &tail) != Bls::pair(&base, g2) {
                return Err(Error::JoinProof);
            }

            memkey.a = Some(a);
            memkey.x = Some(x);
            memkey.s = Some(s);
            memkey.h2s = Some(h2s);
            Ok(None)
        }
        other => Err(Error::JoinStep {
            expected: 1,
            got: other,
        }),
    }
}

/// Randomized-credential elements and the signing witnesses shared by the
/// DL21 family.
pub(crate) struct RandCred {
    pub aa: G1,
    pub a_: G1,
    pub d: G1,
    pub negx: Fr,
    pub r2: Fr,
    pub r3: Fr,
    pub negss: Fr,
    pub negy: Fr,
}

pub(crate) fn randomize_credential<R: RngCore>(
    memkey: &MemberKeyView,
    rng: &mut R,
) -> Result<RandCred> {
    let r1 = rand_nonzero(rng);
    let r2 = Fr::rand(rng);

    let mut aa = memkey.a.clone();
    aa.mul(&r1);

    // base = g1 * H * h2^s
    let mut base = memkey.g1.clone();
    base.add(&memkey.h);
    base.add(&memkey.h2s);
    base.mul(&r1);

    let mut negx = memkey.x.clone();
    negx.negate();
    let mut a_ = aa.clone();
    a_.mul(&negx);
    a_.add(&base);

    let mut negr2 = r2.clone();
    negr2.negate();
    let mut d = memkey.h2.clone();
    d.mul(&negr2);
    d.add(&base);

    let r3 = inverse(&r1)?;

    let mut r2r3 = r2.clone();
    r2r3.mul(&r3);
    let mut negss = memkey.s.clone();
    negss.sub(&r2r3);
    negss.negate();

    let mut negy = memkey.y.clone();
    negy.negate();

    Ok(RandCred {
        aa,
        a_,
        d,
        negx,
        r2,
        r3,
        negss,
        negy,
    })
}

/// The member and group elements the signing math needs, collected once.
pub(crate) struct MemberKeyView {
    pub a: G1,
    pub x: Fr,
    pub y: Fr,
    pub s: Fr,
    pub h: G1,
    pub h2s: G1,
    pub g1: G1,
    pub h2: G1,
}

impl MemberKeyView {
    fn collect(memkey: &MemberKey, grpkey: &GroupKey) -> Result<Self> {
        Ok(Self {
            a: req(&memkey.a, "A")?.clone(),
            x: req(&memkey.x, "x")?.clone(),
            y: req(&memkey.y, "y")?.clone(),
            s: req(&memkey.s, "s")?.clone(),
            h: req(&memkey.h, "H")?.clone(),
            h2s: req(&memkey.h2s, "h2s")?.clone(),
            g1: req(&grpkey.g1, "g1")?.clone(),
            h2: req(&grpkey.h2, "h2")?.clone(),
        })
    }
}

pub(crate) struct Tables {
    pub ys: Vec<Elem<Bls>>,
    pub gs: Vec<Elem<Bls>>,
    pub rels: Vec<(u16, u16)>,
    pub prods: Vec<u16>,
}

/// The three relations of the signing proof: the pseudonym, the
/// credential randomization on `A_ − d`, and the opening of `g1`.
pub(crate) fn spk_tables(
    hscp: &G1,
    aa: &G1,
    d: &G1,
    h1: &G1,
    h2: &G1,
    g1: &G1,
    nym: &G1,
    a_: &G1,
) -> Tables {
    let mut a_d = d.clone();
    a_d.negate();
    a_d.add(a_);

    let ys = vec![
        Elem::G1(nym.clone()),
        Elem::G1(a_d),
        Elem::G1(g1.clone()),
    ];
    let gs = vec![
        Elem::G1(hscp.clone()),
        Elem::G1(aa.clone()),
        Elem::G1(h2.clone()),
        Elem::G1(d.clone()),
        Elem::G1(h1.clone()),
    ];
    // witnesses: 0 = y, 1 = -x, 2 = r2, 3 = r3, 4 = -(s - r2*r3), 5 = -y
    let rels = vec![(0, 0), (1, 1), (2, 2), (3, 3), (4, 2), (5, 4)];
    let prods = vec![1, 2, 3];

    Tables {
        ys,
        gs,
        rels,
        prods,
    }
}

pub fn sign<R: RngCore>(
    msg: &Message,
    memkey: &MemberKey,
    grpkey: &GroupKey,
    rng: &mut R,
) -> Result<Signature> {
    let scope = msg.json_field("scope")?;
    let view = MemberKeyView::collect(memkey, grpkey)?;
    let h1 = req(&grpkey.h1, "h1")?;

    let hscp = scope_base(scope.as_bytes())?;
    let mut nym = hscp.clone();
    nym.mul(&view.y);

    let cred = randomize_credential(&view, rng)?;

    let tables = spk_tables(
        &hscp, &cred.aa, &cred.d, h1, &view.h2, &view.g1, &nym, &cred.a_,
    );
    let pi = SpkRep::<Bls>::sign(
        &tables.ys,
        &tables.gs,
        &[
            &view.y,
            &cred.negx,
            &cred.r2,
            &cred.r3,
            &cred.negss,
            &cred.negy,
        ],
        &tables.rels,
        &tables.prods,
        msg.as_bytes(),
        rng,
    )?;

    Ok(Signature {
        aa: cred.aa,
        a_: cred.a_,
        d: cred.d,
        nym,
        c: pi.c,
        s: pi.s,
    })
}

pub fn verify(sig: &Signature, msg: &Message, grpkey: &GroupKey) -> Result<bool> {
    let scope = msg.json_field("scope")?;
    let g1 = req(&grpkey.g1, "g1")?;
    let g2 = req(&grpkey.g2, "g2")?;
    let h1 = req(&grpkey.h1, "h1")?;
    let h2 = req(&grpkey.h2, "h2")?;
    let ipk = req(&grpkey.ipk, "ipk")?;

    if sig.aa == G1::zero() || sig.s.len() != SPK_NS {
        return Ok(false);
    }

    if Bls::pair(&sig.a_, g2) != Bls::pair(&sig.aa, ipk) {
        return Ok(false);
    }

    let hscp = scope_base(scope.as_bytes())?;
    let tables = spk_tables(&hscp, &sig.aa, &sig.d, h1, h2, g1, &sig.nym, &sig.a_);

    let pi = SpkRep::<Bls> {
        c: sig.c.clone(),
        s: sig.s.clone(),
    };
    Ok(pi.verify(
        &tables.ys,
        &tables.gs,
        &tables.rels,
        &tables.prods,
        msg.as_bytes(),
    )?)
}

/// Tests whether this member produced the signature, by recomputing the
/// scope pseudonym.
pub fn identify(sig: &Signature, memkey: &MemberKey, msg: &Message) -> Result<bool> {
    let scope = msg.json_field("scope")?;
    let y = req(&memkey.y, "y")?;

    let mut nym = scope_base(scope.as_bytes())?;
    nym.mul(y);
    Ok(nym == sig.nym)
}

/// Builds the binding message for a link proof.
fn link_binding(msg: &Message, sigs: &[Signature], msgs: &[Message]) -> Vec<u8> {
    let mut m = msg.as_bytes().to_vec();
    for (sig, smsg) in sigs.iter().zip(msgs) {
        m.extend_from_slice(&sig.to_bytes());
        m.extend_from_slice(smsg.as_bytes());
    }
    m
}

/// Extracts the common scope of the batch, if there is one.
fn common_scope(msg: &Message, msgs: &[Message]) -> Result<Option<String>> {
    let scope = msg.json_field("scope")?;
    for m in msgs {
        if m.json_field("scope")? != scope {
            return Ok(None);
        }
    }
    Ok(Some(scope))
}

/// Proves that all the given signatures were produced by this member
/// under one scope. `None` means the signatures are not all this
/// member's (or not all in scope).
pub fn link<R: RngCore>(
    memkey: &MemberKey,
    grpkey: &GroupKey,
    msg: &Message,
    sigs: &[Signature],
    msgs: &[Message],
    rng: &mut R,
) -> Result<Option<Proof>> {
    if sigs.len() != msgs.len() {
        return Err(Error::LengthMismatch(sigs.len(), msgs.len()));
    }
    if sigs.is_empty() {
        return Err(Error::LengthMismatch(0, 0));
    }
    let y = req(&memkey.y, "y")?;

    let Some(scope) = common_scope(msg, msgs)? else {
        return Ok(None);
    };
    let hscp = scope_base(scope.as_bytes())?;

    let mut base = G1::zero();
    let mut image = G1::zero();
    for (sig, smsg) in sigs.iter().zip(msgs) {
        if !verify(sig, smsg, grpkey)? || !identify(sig, memkey, smsg)? {
            return Ok(None);
        }
        base.add(&hscp);
        image.add(&sig.nym);
    }

    let pi = SpkDlog::sign(&image, &base, y, &link_binding(msg, sigs, msgs), rng);
    Ok(Some(Proof { c: pi.c, s: pi.s }))
}

/// Checks a link proof over the given signatures and messages.
pub fn verify_link(
    proof: &Proof,
    grpkey: &GroupKey,
    msg: &Message,
    sigs: &[Signature],
    msgs: &[Message],
) -> Result<bool> {
    if sigs.len() != msgs.len() {
        return Err(Error::LengthMismatch(sigs.len(), msgs.len()));
    }
    if sigs.is_empty() {
        return Err(Error::LengthMismatch(0, 0));
    }

    let Some(scope) = common_scope(msg, msgs)? else {
        return Ok(false);
    };
    let hscp = scope_base(scope.as_bytes())?;

    let mut base = G1::zero();
    let mut image = G1::zero();
    for (sig, smsg) in sigs.iter().zip(msgs) {
        if !verify(sig, smsg, grpkey)? {
            return Ok(false);
        }
        base.add(&hscp);
        image.add(&sig.nym);
    }

    let pi = SpkDlog {
        c: proof.c.clone(),
        s: proof.s.clone(),
    };
    Ok(pi.verify(&image, &base, &link_binding(msg, sigs, msgs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sysenv::Sysenv;

    fn composite(scope: &str, message: &str) -> Message {
        Message::new(format!(
            r#"{{"scope":"{}","message":"{}"}}"#,
            scope, message
        ))
    }

    fn group() -> (GroupKey, ManagerKey, Sysenv) {
        let mut rng = Sysenv::from_seed(23);
        let mut grpkey = GroupKey::default();
        let mgrkey = setup(&mut grpkey, &mut rng).unwrap();
        (grpkey, mgrkey, rng)
    }

    fn member(mgrkey: &ManagerKey, grpkey: &GroupKey, rng: &mut Sysenv) -> MemberKey {
        let msg0 = join_mgr(0, mgrkey, grpkey, None, rng).unwrap();
        let mut memkey = MemberKey::default();
        let msg1 = join_mem(1, &mut memkey, grpkey, &msg0, rng)
            .unwrap()
            .unwrap();
        let msg2 = join_mgr(2, mgrkey, grpkey, Some(&msg1), rng).unwrap();
        assert!(join_mem(3, &mut memkey, grpkey, &msg2, rng)
            .unwrap()
            .is_none());
        memkey
    }

    #[test]
    fn lifecycle() {
        let (grpkey, mgrkey, mut rng) = group();
        let memkey = member(&mgrkey, &grpkey, &mut rng);

        let m = composite("svc-A", "m1");
        let sig = sign(&m, &memkey, &grpkey, &mut rng).unwrap();
        assert!(verify(&sig, &m, &grpkey).unwrap());
        assert!(!verify(&sig, &composite("svc-A", "m2"), &grpkey).unwrap());
        // a different scope changes the pseudonym base
        assert!(!verify(&sig, &composite("svc-B", "m1"), &grpkey).unwrap());
    }

    #[test]
    fn pseudonyms_link_within_scope_only() {
        let (grpkey, mgrkey, mut rng) = group();
        let m0 = member(&mgrkey, &grpkey, &mut rng);
        let m1 = member(&mgrkey, &grpkey, &mut rng);

        let sa1 = sign(&composite("svc-A", "m1"), &m0, &grpkey, &mut rng).unwrap();
        let sa2 = sign(&composite("svc-A", "m2"), &m0, &grpkey, &mut rng).unwrap();
        let sb = sign(&composite("svc-B", "m1"), &m0, &grpkey, &mut rng).unwrap();
        let other = sign(&composite("svc-A", "m1"), &m1, &grpkey, &mut rng).unwrap();

        assert_eq!(sa1.nym, sa2.nym);
        assert_ne!(sa1.nym, sb.nym);
        assert_ne!(sa1.nym, other.nym);
    }

    #[test]
    fn identify_is_member_private() {
        let (grpkey, mgrkey, mut rng) = group();
        let m0 = member(&mgrkey, &grpkey, &mut rng);
        let m1 = member(&mgrkey, &grpkey, &mut rng);

        let m = composite("svc-A", "m1");
        let sig = sign(&m, &m0, &grpkey, &mut rng).unwrap();
        assert!(identify(&sig, &m0, &m).unwrap());
        assert!(!identify(&sig, &m1, &m).unwrap());
    }

    #[test]
    fn link_proofs() {
        let (grpkey, mgrkey, mut rng) = group();
        let memkey = member(&mgrkey, &grpkey, &mut rng);

        let m1 = composite("svc-A", "m1");
        let m2 = composite("svc-A", "m2");
        let s1 = sign(&m1, &memkey, &grpkey, &mut rng).unwrap();
        let s2 = sign(&m2, &memkey, &grpkey, &mut rng).unwrap();

        let bind = composite("svc-A", "link");
        let sigs = vec![s1, s2];
        let msgs = vec![m1, m2];

        let proof = link(&memkey, &grpkey, &bind, &sigs, &msgs, &mut rng)
            .unwrap()
            .unwrap();
        assert!(verify_link(&proof, &grpkey, &bind, &sigs, &msgs).unwrap());

        // a cross-scope batch cannot be linked
        let mb = composite("svc-B", "m3");
        let sb = sign(&mb, &memkey, &grpkey, &mut rng).unwrap();
        let mixed_sigs = vec![sigs[0].clone(), sb];
        let mixed_msgs = vec![msgs[0].clone(), mb];
        assert!(link(&memkey, &grpkey, &bind, &mixed_sigs, &mixed_msgs, &mut rng)
            .unwrap()
            .is_none());
        assert!(!verify_link(&proof, &grpkey, &bind, &mixed_sigs, &mixed_msgs).unwrap());
    }

    #[test]
    fn wire_roundtrips() {
        let (grpkey, mgrkey, mut rng) = group();
        let memkey = member(&mgrkey, &grpkey, &mut rng);
        let m = composite("svc-A", "m1");
        let sig = sign(&m, &memkey, &grpkey, &mut rng).unwrap();

        assert_eq!(GroupKey::from_bytes(&grpkey.to_bytes()).unwrap(), grpkey);
        assert_eq!(ManagerKey::from_bytes(&mgrkey.to_bytes()).unwrap(), mgrkey);
        assert_eq!(MemberKey::from_bytes(&memkey.to_bytes()).unwrap(), memkey);
        assert_eq!(Signature::from_bytes(&sig.to_bytes()).unwrap(), sig);
    }
}
