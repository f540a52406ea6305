//! DL21SEQ: DL21 with sequential linkability.
//!
//! Identical credential and proof machinery, but each signature binds a
//! monotone counter into its pseudonym: `nym = H(scope ‖ seq)^y`, with the
//! member key tracking the next counter. Link proofs reveal the counter
//! sequence and verification additionally requires it to be strictly
//! increasing, so a verifier learns the order in which the signatures
//! were produced.

use crate::error::{Error, Result};
use crate::join::{frame, open_frame};
use crate::msg::Message;
use crate::scheme::{KeyType, SchemeCode};
use crate::schemes::dl21::{randomize_credential, spk_tables, MemberKeyView, SPK_NS};
use crate::schemes::{rand_nonzero, req, Bls, Fr, G1, G2};
use crate::wire::{FieldReader, FieldWriter};
use groupsig_core::group::{Element, Encodable, PairingCurve, Point};
use groupsig_core::spk::{SpkDlog, SpkRep};
use rand_core::RngCore;

const SCHEME: SchemeCode = SchemeCode::Dl21Seq;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupKey {
    pub g1: Option<G1>,
    pub g2: Option<G2>,
    pub h1: Option<G1>,
    pub h2: Option<G1>,
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
    pub h: Option<G1>,
    pub h2s: Option<G1>,
    /// Counter for the next signature.
    pub seq: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    pub aa: G1,
    pub a_: G1,
    pub d: G1,
    pub nym: G1,
    /// The counter this signature's pseudonym binds.
    pub seq: u64,
    pub c: Fr,
    pub s: Vec<Fr>,
}

/// Sequential link proof: the revealed counter list plus the SPK of `y`.
#[derive(Clone, Debug, PartialEq)]
pub struct Proof {
    pub x: Vec<u64>,
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
        w.put_opt_u64(self.seq);
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
            seq: r.take_opt_u64()?,
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
        w.put_u64(self.seq);
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
        let seq = r.take_u64()?;
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
            seq,
            c,
            s,
        })
    }
}

impl Proof {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(SCHEME.code());
        w.put_u64(self.x.len() as u64);
        for x in &self.x {
            w.put_u64(*x);
        }
        w.put_elem(&self.c);
        w.put_elem(&self.s);
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = scheme_reader(bytes)?;
        let n = r.take_u64()?;
        let mut x = Vec::with_capacity(n as usize);
        for _ in 0..n {
            x.push(r.take_u64()?);
        }
        let proof = Self {
            x,
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

/// Pseudonym base for one signature: `H(scope ‖ seq)`.
fn seq_base(scope: &str, seq: u64) -> Result<G1> {
    let mut data = scope.as_bytes().to_vec();
    data.extend_from_slice(&seq.to_le_bytes());
    let mut p = G1::zero();
    p.map(&data).map_err(|_| Error::HashToPoint)?;
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

pub fn join_mgr<R: RngCore>(
    seq: u8,
    mgrkey: &ManagerKey,
    grpkey: &GroupKey,
    msg_in: Option<&Message>,
    rng: &mut R,
) -> Result<Message> {
    super::dl21::join_mgr_impl(
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
            memkey.seq = Some(0);
            Ok(None)
        }
        other => Err(Error::JoinStep {
            expected: 1,
            got: other,
        }),
    }
}

fn view(memkey: &MemberKey, grpkey: &GroupKey) -> Result<MemberKeyView> {
    Ok(MemberKeyView {
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

/// Signs and advances the member's counter.
pub fn sign<R: RngCore>(
    msg: &Message,
    memkey: &mut MemberKey,
    grpkey: &GroupKey,
    rng: &mut R,
) -> Result<Signature> {
    let scope = msg.json_field("scope")?;
    let v = view(memkey, grpkey)?;
    let h1 = req(&grpkey.h1, "h1")?;
    let seq = memkey.seq.ok_or(Error::MissingField("seq"))?;

    let hscp = seq_base(&scope, seq)?;
    let mut nym = hscp.clone();
    nym.mul(&v.y);

    let cred = randomize_credential(&v, rng)?;

    let tables = spk_tables(&hscp, &cred.aa, &cred.d, h1, &v.h2, &v.g1, &nym, &cred.a_);
    let pi = SpkRep::<Bls>::sign(
        &tables.ys,
        &tables.gs,
        &[
            &v.y,
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

    memkey.seq = Some(seq + 1);

    Ok(Signature {
        aa: cred.aa,
        a_: cred.a_,
        d: cred.d,
        nym,
        seq,
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

    let hscp = seq_base(&scope, sig.seq)?;
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

pub fn identify(sig: &Signature, memkey: &MemberKey, msg: &Message) -> Result<bool> {
    let scope = msg.json_field("scope")?;
    let y = req(&memkey.y, "y")?;

    let mut nym = seq_base(&scope, sig.seq)?;
    nym.mul(y);
    Ok(nym == sig.nym)
}

fn link_binding(msg: &Message, sigs: &[Signature], msgs: &[Message]) -> Vec<u8> {
    let mut m = msg.as_bytes().to_vec();
    for (sig, smsg) in sigs.iter().zip(msgs) {
        m.extend_from_slice(&sig.to_bytes());
        m.extend_from_slice(smsg.as_bytes());
    }
    m
}

fn common_scope(msg: &Message, msgs: &[Message]) -> Result<Option<String>> {
    let scope = msg.json_field("scope")?;
    for m in msgs {
        if m.json_field("scope")? != scope {
            return Ok(None);
        }
    }
    Ok(Some(scope))
}

/// Proves that the signatures belong to this member, in the order of
/// their counters. Signatures must be presented in strictly increasing
/// counter order.
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
    if !strictly_increasing(sigs) {
        return Ok(None);
    }

    let mut base = G1::zero();
    let mut image = G1::zero();
    for (sig, smsg) in sigs.iter().zip(msgs) {
        if !verify(sig, smsg, grpkey)? || !identify(sig, memkey, smsg)? {
            return Ok(None);
        }
        base.add(&seq_base(&scope, sig.seq)?);
        image.add(&sig.nym);
    }

    let pi = SpkDlog::sign(&image, &base, y, &link_binding(msg, sigs, msgs), rng);
    Ok(Some(Proof {
        x: sigs.iter().map(|s| s.seq).collect(),
        c: pi.c,
        s: pi.s,
    }))
}

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

    // the revealed counters must match the signatures and be strictly
    // monotone
    if proof.x.len() != sigs.len()
        || proof.x.iter().zip(sigs).any(|(x, sig)| *x != sig.seq)
        || !strictly_increasing(sigs)
    {
        return Ok(false);
    }

    let Some(scope) = common_scope(msg, msgs)? else {
        return Ok(false);
    };

    let mut base = G1::zero();
    let mut image = G1::zero();
    for (sig, smsg) in sigs.iter().zip(msgs) {
        if !verify(sig, smsg, grpkey)? {
            return Ok(false);
        }
        base.add(&seq_base(&scope, sig.seq)?);
        image.add(&sig.nym);
    }

    let pi = SpkDlog {
        c: proof.c.clone(),
        s: proof.s.clone(),
    };
    Ok(pi.verify(&image, &base, &link_binding(msg, sigs, msgs)))
}

fn strictly_increasing(sigs: &[Signature]) -> bool {
    sigs.windows(2).all(|w| w[0].seq < w[1].seq)
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
        let mut rng = Sysenv::from_seed(31);
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
    fn counters_advance_and_unlink_pseudonyms() {
        let (grpkey, mgrkey, mut rng) = group();
        let mut memkey = member(&mgrkey, &grpkey, &mut rng);

        let m = composite("svc-A", "m");
        let s0 = sign(&m, &mut memkey, &grpkey, &mut rng).unwrap();
        let s1 = sign(&m, &mut memkey, &grpkey, &mut rng).unwrap();

        assert_eq!(s0.seq, 0);
        assert_eq!(s1.seq, 1);
        assert_eq!(memkey.seq, Some(2));
        // per-counter bases make consecutive pseudonyms distinct
        assert_ne!(s0.nym, s1.nym);

        assert!(verify(&s0, &m, &grpkey).unwrap());
        assert!(verify(&s1, &m, &grpkey).unwrap());
        assert!(identify(&s0, &memkey, &m).unwrap());
    }

    #[test]
    fn sequential_link() {
        let (grpkey, mgrkey, mut rng) = group();
        let mut memkey = member(&mgrkey, &grpkey, &mut rng);

        let m0 = composite("svc-A", "m0");
        let m1 = composite("svc-A", "m1");
        let m2 = composite("svc-A", "m2");
        let s0 = sign(&m0, &mut memkey, &grpkey, &mut rng).unwrap();
        let s1 = sign(&m1, &mut memkey, &grpkey, &mut rng).unwrap();
        let s2 = sign(&m2, &mut memkey, &grpkey, &mut rng).unwrap();

        let bind = composite("svc-A", "link");
        let sigs = vec![s0, s1, s2];
        let msgs = vec![m0, m1, m2];

        let proof = link(&memkey, &grpkey, &bind, &sigs, &msgs, &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(proof.x, vec![0, 1, 2]);
        assert!(verify_link(&proof, &grpkey, &bind, &sigs, &msgs).unwrap());

        // out-of-order presentation breaks monotonicity
        let swapped_sigs = vec![sigs[1].clone(), sigs[0].clone()];
        let swapped_msgs = vec![msgs[1].clone(), msgs[0].clone()];
        assert!(link(&memkey, &grpkey, &bind, &swapped_sigs, &swapped_msgs, &mut rng)
            .unwrap()
            .is_none());
        assert!(
            !verify_link(&proof, &grpkey, &bind, &swapped_sigs, &swapped_msgs).unwrap()
        );

        // a proof with altered counters fails
        let mut bad = proof.clone();
        bad.x[2] = 9;
        assert!(!verify_link(&bad, &grpkey, &bind, &sigs, &msgs).unwrap());
    }

    #[test]
    fn wire_roundtrips() {
        let (grpkey, mgrkey, mut rng) = group();
        let mut memkey = member(&mgrkey, &grpkey, &mut rng);
        let m = composite("svc-A", "m");
        let sig = sign(&m, &mut memkey, &grpkey, &mut rng).unwrap();

        assert_eq!(GroupKey::from_bytes(&grpkey.to_bytes()).unwrap(), grpkey);
        assert_eq!(MemberKey::from_bytes(&memkey.to_bytes()).unwrap(), memkey);
        assert_eq!(Signature::from_bytes(&sig.to_bytes()).unwrap(), sig);

        let proof = Proof {
            x: vec![0, 1],
            c: Fr::one(),
            s: Fr::one(),
        };
        assert_eq!(Proof::from_bytes(&proof.to_bytes()).unwrap(), proof);
    }
}
