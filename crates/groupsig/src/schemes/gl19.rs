//! GL19: BBS+ credentials with expiring membership and convertible
//! pseudonym encryptions.
//!
//! The issuer signs the member's hidden `y` (as `H = h1^y`) into the
//! credential `A = (g1·H·h2^s·h3^d)^{1/(isk+x)}`, where `d` digests the
//! credential expiration `l`; `l` travels in the clear with every
//! signature and is bound into the proof. Each signature carries two
//! ElGamal encryptions of the member handle `h^y`: one under the converter
//! key `cpk`, one under the extractor key `epk`.
//!
//! Blinding wraps the converter ciphertext with a consumer-chosen blinding
//! key; the converter strips its own layer and raises a whole batch to one
//! fresh exponent, so the consumer who unblinds sees a handle `h^{y·r}`
//! that links signatures within the batch and nothing across batches.

use crate::error::{Error, Result};
use crate::join::{frame, open_frame};
use crate::msg::Message;
use crate::scheme::{KeyType, SchemeCode};
use crate::schemes::{inverse, rand_nonzero, req, Bls, Fr, G1, G2};
use crate::wire::{FieldReader, FieldWriter};
use groupsig_core::group::{Element, Encodable, PairingCurve, Point, Scalar as _};
use groupsig_core::hash::{digest, HashAlg};
use groupsig_core::spk::{Elem, SpkDlog, SpkRep};
use rand_core::RngCore;
use std::time::{SystemTime, UNIX_EPOCH};

const SCHEME: SchemeCode = SchemeCode::Gl19;

/// Issued credentials live this long, in seconds.
pub const CRED_LIFETIME: u64 = 30 * 24 * 3600;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupKey {
    /// ElGamal base for the pseudonym encryptions.
    pub g: Option<G1>,
    /// Credential base.
    pub g1: Option<G1>,
    pub gg: Option<G2>,
    /// Base of the member handle `h^y`.
    pub h: Option<G1>,
    pub h1: Option<G1>,
    pub h2: Option<G1>,
    pub h3: Option<G1>,
    /// Issuer public key `g̃^{isk}`.
    pub ipk: Option<G2>,
    /// Converter public key `g^{csk}`.
    pub cpk: Option<G1>,
    /// Extractor public key `g^{esk}`.
    pub epk: Option<G1>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManagerKey {
    pub isk: Option<Fr>,
    pub csk: Option<Fr>,
    pub esk: Option<Fr>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemberKey {
    pub a: Option<G1>,
    pub x: Option<Fr>,
    pub y: Option<Fr>,
    pub s: Option<Fr>,
    /// Credential expiration, seconds since the epoch.
    pub l: Option<u64>,
    /// `d = Blake2b(l)` reduced into Fr.
    pub d: Option<Fr>,
    /// `H = h1^y`.
    pub h: Option<G1>,
    pub h2s: Option<G1>,
    pub h3d: Option<G1>,
}

/// Consumer-side ElGamal keypair for blinding. Only the public half is
/// given to signers and the converter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlindingKey {
    pub pk: Option<G1>,
    pub sk: Option<Fr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    pub aa: G1,
    pub a_: G1,
    pub d: G1,
    pub nym1: G1,
    pub nym2: G1,
    pub ehy1: G1,
    pub ehy2: G1,
    pub expiration: u64,
    pub c: Fr,
    pub s: Vec<Fr>,
}

/// A blinded (and possibly converted) signature handle. `nym3` carries the
/// consumer-layer randomness until conversion consumes it.
#[derive(Clone, Debug, PartialEq)]
pub struct BlindSignature {
    pub nym1: G1,
    pub nym2: G1,
    pub nym3: Option<G1>,
    pub c1: G1,
    pub c2: G1,
}

/// What the consumer recovers: the batch-scoped member handle and the
/// hashed message point.
#[derive(Clone, Debug, PartialEq)]
pub struct UnblindedTag {
    pub nym: G1,
    pub hmsg: G1,
}

const SPK_NS: usize = 8;

impl GroupKey {
    fn is_empty(&self) -> bool {
        self.g.is_none() && self.g1.is_none() && self.gg.is_none() && self.ipk.is_none()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(SCHEME.code());
        w.put_tag(KeyType::Group.code());
        w.put_opt_elem(self.g.as_ref());
        w.put_opt_elem(self.g1.as_ref());
        w.put_opt_elem(self.gg.as_ref());
        w.put_opt_elem(self.h.as_ref());
        w.put_opt_elem(self.h1.as_ref());
        w.put_opt_elem(self.h2.as_ref());
        w.put_opt_elem(self.h3.as_ref());
        w.put_opt_elem(self.ipk.as_ref());
        w.put_opt_elem(self.cpk.as_ref());
        w.put_opt_elem(self.epk.as_ref());
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = key_reader(bytes, KeyType::Group)?;
        let key = Self {
            g: r.take_opt_elem()?,
            g1: r.take_opt_elem()?,
            gg: r.take_opt_elem()?,
            h: r.take_opt_elem()?,
            h1: r.take_opt_elem()?,
            h2: r.take_opt_elem()?,
            h3: r.take_opt_elem()?,
            ipk: r.take_opt_elem()?,
            cpk: r.take_opt_elem()?,
            epk: r.take_opt_elem()?,
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
        w.put_opt_elem(self.csk.as_ref());
        w.put_opt_elem(self.esk.as_ref());
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = key_reader(bytes, KeyType::Manager)?;
        let key = Self {
            isk: r.take_opt_elem()?,
            csk: r.take_opt_elem()?,
            esk: r.take_opt_elem()?,
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
        w.put_opt_u64(self.l);
        w.put_opt_elem(self.d.as_ref());
        w.put_opt_elem(self.h.as_ref());
        w.put_opt_elem(self.h2s.as_ref());
        w.put_opt_elem(self.h3d.as_ref());
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = key_reader(bytes, KeyType::Member)?;
        let key = Self {
            a: r.take_opt_elem()?,
            x: r.take_opt_elem()?,
            y: r.take_opt_elem()?,
            s: r.take_opt_elem()?,
            l: r.take_opt_u64()?,
            d: r.take_opt_elem()?,
            h: r.take_opt_elem()?,
            h2s: r.take_opt_elem()?,
            h3d: r.take_opt_elem()?,
        };
        r.finish()?;
        Ok(key)
    }
}

impl BlindingKey {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(SCHEME.code());
        w.put_tag(KeyType::Blinding.code());
        w.put_opt_elem(self.pk.as_ref());
        w.put_opt_elem(self.sk.as_ref());
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = key_reader(bytes, KeyType::Blinding)?;
        let key = Self {
            pk: r.take_opt_elem()?,
            sk: r.take_opt_elem()?,
        };
        r.finish()?;
        Ok(key)
    }

    /// The public half alone, as handed to signers and the converter.
    pub fn public(&self) -> Self {
        Self {
            pk: self.pk.clone(),
            sk: None,
        }
    }
}

impl Signature {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(SCHEME.code());
        w.put_elem(&self.aa);
        w.put_elem(&self.a_);
        w.put_elem(&self.d);
        w.put_elem(&self.nym1);
        w.put_elem(&self.nym2);
        w.put_elem(&self.ehy1);
        w.put_elem(&self.ehy2);
        w.put_u64(self.expiration);
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
        let nym1 = r.take_elem()?;
        let nym2 = r.take_elem()?;
        let ehy1 = r.take_elem()?;
        let ehy2 = r.take_elem()?;
        let expiration = r.take_u64()?;
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
            nym1,
            nym2,
            ehy1,
            ehy2,
            expiration,
            c,
            s,
        })
    }
}

impl BlindSignature {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(SCHEME.code());
        w.put_elem(&self.nym1);
        w.put_elem(&self.nym2);
        w.put_opt_elem(self.nym3.as_ref());
        w.put_elem(&self.c1);
        w.put_elem(&self.c2);
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = scheme_reader(bytes)?;
        let bsig = Self {
            nym1: r.take_elem()?,
            nym2: r.take_elem()?,
            nym3: r.take_opt_elem()?,
            c1: r.take_elem()?,
            c2: r.take_elem()?,
        };
        r.finish()?;
        Ok(bsig)
    }
}

impl UnblindedTag {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(SCHEME.code());
        w.put_elem(&self.nym);
        w.put_elem(&self.hmsg);
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = scheme_reader(bytes)?;
        let tag = Self {
            nym: r.take_elem()?,
            hmsg: r.take_elem()?,
        };
        r.finish()?;
        Ok(tag)
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

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// `d = Blake2b(l)` reduced into the scalar field.
fn expiration_digest(l: u64) -> Fr {
    Fr::from_bytes_mod_order(&digest(HashAlg::Blake2b, &l.to_le_bytes()))
}

pub fn setup<R: RngCore>(grpkey: &mut GroupKey, rng: &mut R) -> Result<ManagerKey> {
    if !grpkey.is_empty() {
        return Err(Error::SetupComplete);
    }

    let isk = rand_nonzero(rng);
    let csk = rand_nonzero(rng);
    let esk = rand_nonzero(rng);

    let g = G1::rand(rng);
    let g1 = G1::rand(rng);
    let h = G1::rand(rng);
    let h1 = G1::rand(rng);
    let h2 = G1::rand(rng);
    let h3 = G1::rand(rng);
    let gg = G2::rand(rng);

    let mut ipk = gg.clone();
    ipk.mul(&isk);
    let mut cpk = g.clone();
    cpk.mul(&csk);
    let mut epk = g.clone();
    epk.mul(&esk);

    grpkey.g = Some(g);
    grpkey.g1 = Some(g1);
    grpkey.gg = Some(gg);
    grpkey.h = Some(h);
    grpkey.h1 = Some(h1);
    grpkey.h2 = Some(h2);
    grpkey.h3 = Some(h3);
    grpkey.ipk = Some(ipk);
    grpkey.cpk = Some(cpk);
    grpkey.epk = Some(epk);

    Ok(ManagerKey {
        isk: Some(isk),
        csk: Some(csk),
        esk: Some(esk),
    })
}

/// Generates a consumer blinding keypair over the group's ElGamal base.
pub fn blind_key_gen<R: RngCore>(grpkey: &GroupKey, rng: &mut R) -> Result<BlindingKey> {
    let g = req(&grpkey.g, "g")?;
    let sk = rand_nonzero(rng);
    let mut pk = g.clone();
    pk.mul(&sk);
    Ok(BlindingKey {
        pk: Some(pk),
        sk: Some(sk),
    })
}

pub fn join_mgr<R: RngCore>(
    seq: u8,
    mgrkey: &ManagerKey,
    grpkey: &GroupKey,
    msg_in: Option<&Message>,
    rng: &mut R,
) -> Result<Message> {
    match seq {
        0 => {
            let n = G1::rand(rng);
            let mut w = frame(SCHEME, 0);
            w.put_elem(&n);
            Ok(Message::new(w.finish()))
        }
        2 => {
            let msg_in = msg_in.ok_or(Error::MissingField("join message"))?;
            let isk = req(&mgrkey.isk, "isk")?;
            let g1 = req(&grpkey.g1, "g1")?;
            let h1 = req(&grpkey.h1, "h1")?;
            let h2 = req(&grpkey.h2, "h2")?;
            let h3 = req(&grpkey.h3, "h3")?;

            let mut r = open_frame(msg_in, SCHEME, 1)?;
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

            let l = now_secs() + CRED_LIFETIME;
            let d = expiration_digest(l);

            // A = (g1 * H * h2^s * h3^d)^{1/(isk+x)}
            let mut h2s = h2.clone();
            h2s.mul(&s);
            let mut h3d = h3.clone();
            h3d.mul(&d);
            let mut a = g1.clone();
            a.add(&big_h);
            a.add(&h2s);
            a.add(&h3d);
            let mut exp = isk.clone();
            exp.add(&x);
            let inv = exp.inverse().ok_or(Error::DegenerateScalar)?;
            a.mul(&inv);

            // the response is a partially filled member key
            let partial = MemberKey {
                a: Some(a),
                x: Some(x),
                s: Some(s),
                l: Some(l),
                ..Default::default()
            };

            let mut w = frame(SCHEME, 2);
            w.put_bytes(&partial.to_bytes());
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
            let gg = req(&grpkey.gg, "gg")?;
            let g1 = req(&grpkey.g1, "g1")?;
            let h2 = req(&grpkey.h2, "h2")?;
            let h3 = req(&grpkey.h3, "h3")?;
            let ipk = req(&grpkey.ipk, "ipk")?;

            let mut r = open_frame(msg_in, SCHEME, 2)?;
            let partial = MemberKey::from_bytes(r.take_bytes()?)?;
            r.finish()?;

            let a = req(&partial.a, "A")?.clone();
            let x = req(&partial.x, "x")?.clone();
            let s = req(&partial.s, "s")?.clone();
            let l = partial.l.ok_or(Error::MissingField("l"))?;

            let d = expiration_digest(l);
            let mut h2s = h2.clone();
            h2s.mul(&s);
            let mut h3d = h3.clone();
            h3d.mul(&d);

            // credential check: e(A, ipk * gg^x) = e(g1*H*h2^s*h3^d, gg)
            let mut lhs_tail = gg.clone();
            lhs_tail.mul(&x);
            lhs_tail.add(ipk);
            let mut base = g1.clone();
            base.add(&big_h);
            base.add(&h2s);
            base.add(&h3d);
            if Bls::pair(&a, &lhs_tail) != Bls::pair(&base, gg) {
                return Err(Error::JoinProof);
            }

            memkey.a = Some(a);
            memkey.x = Some(x);
            memkey.s = Some(s);
            memkey.l = Some(l);
            memkey.d = Some(d);
            memkey.h2s = Some(h2s);
            memkey.h3d = Some(h3d);
            Ok(None)
        }
        other => Err(Error::JoinStep {
            expected: 1,
            got: other,
        }),
    }
}

struct SpkInstance {
    ys: Vec<Elem<Bls>>,
    gs: Vec<Elem<Bls>>,
    rels: Vec<(u16, u16)>,
    prods: Vec<u16>,
}

/// The six relations of the signing proof: the two ElGamal encryptions of
/// `h^y` (under cpk and epk), the credential randomization relation on
/// `A_ − d`, and the opening of `g1·h3^d`.
fn spk_instance(grpkey: &GroupKey, sig_d: &G1, aa: &G1, images: SpkImages) -> Result<SpkInstance> {
    let g = req(&grpkey.g, "g")?;
    let cpk = req(&grpkey.cpk, "cpk")?;
    let h = req(&grpkey.h, "h")?;
    let h1 = req(&grpkey.h1, "h1")?;
    let h2 = req(&grpkey.h2, "h2")?;
    let epk = req(&grpkey.epk, "epk")?;

    let ys = vec![
        Elem::G1(images.nym1),
        Elem::G1(images.nym2),
        Elem::G1(images.a_d),
        Elem::G1(images.g1h3d),
        Elem::G1(images.ehy1),
        Elem::G1(images.ehy2),
    ];
    let gs = vec![
        Elem::G1(g.clone()),
        Elem::G1(cpk.clone()),
        Elem::G1(h.clone()),
        Elem::G1(aa.clone()),
        Elem::G1(h2.clone()),
        Elem::G1(sig_d.clone()),
        Elem::G1(h1.clone()),
        Elem::G1(epk.clone()),
    ];
    // witnesses: 0 = -x, 1 = y, 2 = r2, 3 = r3, 4 = -(s - r2*r3),
    //            5 = alpha, 6 = -y, 7 = alpha2
    let rels = vec![
        (5, 0),
        (5, 1),
        (1, 2),
        (0, 3),
        (2, 4),
        (3, 5),
        (4, 4),
        (6, 6),
        (7, 0),
        (7, 7),
        (1, 2),
    ];
    let prods = vec![1, 2, 2, 3, 1, 2];

    Ok(SpkInstance {
        ys,
        gs,
        rels,
        prods,
    })
}

struct SpkImages {
    nym1: G1,
    nym2: G1,
    a_d: G1,
    g1h3d: G1,
    ehy1: G1,
    ehy2: G1,
}

/// The message the proof actually signs: caller message followed by the
/// revealed expiration.
fn spk_message(msg: &[u8], expiration: u64) -> Vec<u8> {
    let mut m = Vec::with_capacity(msg.len() + 8);
    m.extend_from_slice(msg);
    m.extend_from_slice(&expiration.to_le_bytes());
    m
}

pub fn sign<R: RngCore>(
    msg: &[u8],
    memkey: &MemberKey,
    grpkey: &GroupKey,
    rng: &mut R,
) -> Result<Signature> {
    let a = req(&memkey.a, "A")?;
    let x = req(&memkey.x, "x")?;
    let y = req(&memkey.y, "y")?;
    let s = req(&memkey.s, "s")?;
    let l = memkey.l.ok_or(Error::MissingField("l"))?;
    let big_h = req(&memkey.h, "H")?;
    let h2s = req(&memkey.h2s, "h2s")?;
    let h3d = req(&memkey.h3d, "h3d")?;
    let g = req(&grpkey.g, "g")?;
    let g1 = req(&grpkey.g1, "g1")?;
    let h = req(&grpkey.h, "h")?;
    let h2 = req(&grpkey.h2, "h2")?;
    let cpk = req(&grpkey.cpk, "cpk")?;
    let epk = req(&grpkey.epk, "epk")?;

    let alpha = Fr::rand(rng);
    let alpha2 = Fr::rand(rng);
    let r1 = rand_nonzero(rng);
    let r2 = Fr::rand(rng);

    // h^y, encrypted twice
    let mut hy = h.clone();
    hy.mul(y);

    let mut nym1 = g.clone();
    nym1.mul(&alpha);
    let mut nym2 = cpk.clone();
    nym2.mul(&alpha);
    nym2.add(&hy);

    let mut ehy1 = g.clone();
    ehy1.mul(&alpha2);
    let mut ehy2 = epk.clone();
    ehy2.mul(&alpha2);
    ehy2.add(&hy);

    // AA = A^{r1}; base = g1*H*h2^s*h3^d
    let mut aa = a.clone();
    aa.mul(&r1);

    let mut base = g1.clone();
    base.add(big_h);
    base.add(h2s);
    base.add(h3d);
    let mut base_r1 = base;
    base_r1.mul(&r1);

    // A_ = AA^{-x} * base^{r1}
    let mut negx = x.clone();
    negx.negate();
    let mut a_ = aa.clone();
    a_.mul(&negx);
    a_.add(&base_r1);

    // d = base^{r1} * h2^{-r2}
    let mut negr2 = r2.clone();
    negr2.negate();
    let mut sig_d = h2.clone();
    sig_d.mul(&negr2);
    sig_d.add(&base_r1);

    let r3 = inverse(&r1)?;

    // ss = -(s - r2*r3)
    let mut r2r3 = r2.clone();
    r2r3.mul(&r3);
    let mut negss = s.clone();
    negss.sub(&r2r3);
    negss.negate();

    let mut negy = y.clone();
    negy.negate();

    // images the proof opens
    let mut a_d = sig_d.clone();
    a_d.negate();
    a_d.add(&a_);
    let mut g1h3d = g1.clone();
    g1h3d.add(h3d);

    let inst = spk_instance(
        grpkey,
        &sig_d,
        &aa,
        SpkImages {
            nym1: nym1.clone(),
            nym2: nym2.clone(),
            a_d,
            g1h3d,
            ehy1: ehy1.clone(),
            ehy2: ehy2.clone(),
        },
    )?;

    let pi = SpkRep::<Bls>::sign(
        &inst.ys,
        &inst.gs,
        &[&negx, y, &r2, &r3, &negss, &alpha, &negy, &alpha2],
        &inst.rels,
        &inst.prods,
        &spk_message(msg, l),
        rng,
    )?;

    Ok(Signature {
        aa,
        a_,
        d: sig_d,
        nym1,
        nym2,
        ehy1,
        ehy2,
        expiration: l,
        c: pi.c,
        s: pi.s,
    })
}

pub fn verify(sig: &Signature, msg: &[u8], grpkey: &GroupKey) -> Result<bool> {
    let gg = req(&grpkey.gg, "gg")?;
    let g1 = req(&grpkey.g1, "g1")?;
    let h3 = req(&grpkey.h3, "h3")?;
    let ipk = req(&grpkey.ipk, "ipk")?;

    if sig.aa == G1::zero() {
        return Ok(false);
    }
    if sig.s.len() != SPK_NS {
        return Ok(false);
    }

    // expired credentials no longer verify
    if sig.expiration < now_secs() {
        return Ok(false);
    }

    // credential randomization: e(A_, gg) = e(AA, ipk)
    if Bls::pair(&sig.a_, gg) != Bls::pair(&sig.aa, ipk) {
        return Ok(false);
    }

    let d = expiration_digest(sig.expiration);
    let mut h3d = h3.clone();
    h3d.mul(&d);
    let mut g1h3d = g1.clone();
    g1h3d.add(&h3d);

    let mut a_d = sig.d.clone();
    a_d.negate();
    a_d.add(&sig.a_);

    let inst = spk_instance(
        grpkey,
        &sig.d,
        &sig.aa,
        SpkImages {
            nym1: sig.nym1.clone(),
            nym2: sig.nym2.clone(),
            a_d,
            g1h3d,
            ehy1: sig.ehy1.clone(),
            ehy2: sig.ehy2.clone(),
        },
    )?;

    let pi = SpkRep::<Bls> {
        c: sig.c.clone(),
        s: sig.s.clone(),
    };
    Ok(pi.verify(
        &inst.ys,
        &inst.gs,
        &inst.rels,
        &inst.prods,
        &spk_message(msg, sig.expiration),
    )?)
}

/// Wraps the converter ciphertext with the consumer's blinding key and
/// encrypts the hashed message alongside.
pub fn blind<R: RngCore>(
    bldkey: &BlindingKey,
    sig: &Signature,
    msg: &[u8],
    grpkey: &GroupKey,
    rng: &mut R,
) -> Result<BlindSignature> {
    let bpk = req(&bldkey.pk, "pk")?;
    let g = req(&grpkey.g, "g")?;
    let cpk = req(&grpkey.cpk, "cpk")?;

    let rho1 = Fr::rand(rng);
    let rho2 = Fr::rand(rng);
    let rho3 = Fr::rand(rng);

    // re-randomize the converter layer, add the consumer layer
    let mut nym1 = g.clone();
    nym1.mul(&rho1);
    nym1.add(&sig.nym1);

    let mut nym2 = cpk.clone();
    nym2.mul(&rho1);
    let mut bl = bpk.clone();
    bl.mul(&rho2);
    nym2.add(&bl);
    nym2.add(&sig.nym2);

    let mut nym3 = g.clone();
    nym3.mul(&rho2);

    // consumer-keyed encryption of the hashed message
    let mut hmsg = G1::zero();
    hmsg.map(msg).map_err(|_| Error::HashToPoint)?;
    let mut c1 = g.clone();
    c1.mul(&rho3);
    let mut c2 = bpk.clone();
    c2.mul(&rho3);
    c2.add(&hmsg);

    Ok(BlindSignature {
        nym1,
        nym2,
        nym3: Some(nym3),
        c1,
        c2,
    })
}

/// Converter-side transformation: strips the cpk layer of every blinded
/// signature in the batch and raises the handles to one fresh exponent.
/// Within a batch, equal members yield equal handles after unblinding;
/// across batches nothing links.
pub fn convert<R: RngCore>(
    bsigs: Vec<BlindSignature>,
    mgrkey: &ManagerKey,
    grpkey: &GroupKey,
    bldkey: &BlindingKey,
    rng: &mut R,
) -> Result<Vec<BlindSignature>> {
    let csk = req(&mgrkey.csk, "csk")?;
    let bpk = req(&bldkey.pk, "pk")?;
    let g = req(&grpkey.g, "g")?;

    let r = rand_nonzero(rng);

    let mut out = Vec::with_capacity(bsigs.len());
    for bsig in bsigs {
        let nym3 = bsig.nym3.ok_or(Error::MissingField("nym3"))?;

        // strip the converter layer: t = nym2 / nym1^{csk}
        let mut t = bsig.nym1.clone();
        t.mul(csk);
        t.negate();
        t.add(&bsig.nym2);

        let mut nym1 = nym3;
        nym1.mul(&r);
        let mut nym2 = t;
        nym2.mul(&r);

        // re-randomize the message ciphertext
        let tau = Fr::rand(rng);
        let mut c1 = g.clone();
        c1.mul(&tau);
        c1.add(&bsig.c1);
        let mut c2 = bpk.clone();
        c2.mul(&tau);
        c2.add(&bsig.c2);

        out.push(BlindSignature {
            nym1,
            nym2,
            nym3: None,
            c1,
            c2,
        });
    }
    Ok(out)
}

/// Consumer-side decryption of a converted signature.
pub fn unblind(bldkey: &BlindingKey, bsig: &BlindSignature) -> Result<UnblindedTag> {
    let sk = req(&bldkey.sk, "sk")?;

    let mut layer = bsig.nym1.clone();
    layer.mul(sk);
    layer.negate();
    let mut nym = bsig.nym2.clone();
    nym.add(&layer);

    let mut mlayer = bsig.c1.clone();
    mlayer.mul(sk);
    mlayer.negate();
    let mut hmsg = bsig.c2.clone();
    hmsg.add(&mlayer);

    Ok(UnblindedTag { nym, hmsg })
}
