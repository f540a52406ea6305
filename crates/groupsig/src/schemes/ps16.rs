//! PS16: group signatures from Pointcheval–Sanders signatures.
//!
//! Three-message join: the manager hands out a nonce, the member commits to
//! its secret `sk` in both source groups with a discrete-log proof, and the
//! manager issues the randomizable credential `(σ1, σ2)` while recording
//! the opening tag `τ̃ = R̃^y`. Signing re-randomizes the credential and
//! proves `sk` in GT. Opening is verifiable: the opener emits a GT
//! discrete-log proof of `y` that anyone can check against the signature.

use crate::error::{Error, Result};
use crate::gml::{Gml, GmlEntry};
use crate::join::{frame, open_frame};
use crate::msg::Message;
use crate::scheme::{KeyType, SchemeCode};
use crate::schemes::{rand_nonzero, req, Bls, Fr, G1, G2, GT};
use crate::wire::{FieldReader, FieldWriter};
use groupsig_core::group::{Element, Encodable, PairingCurve, Scalar as _};
use groupsig_core::spk::SpkDlog;
use rand_core::RngCore;

const SCHEME: SchemeCode = SchemeCode::Ps16;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupKey {
    pub g: Option<G1>,
    pub gg: Option<G2>,
    /// `X̃ = g̃^x`.
    pub xx: Option<G2>,
    /// `Ỹ = g̃^y`.
    pub yy: Option<G2>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManagerKey {
    pub x: Option<Fr>,
    pub y: Option<Fr>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemberKey {
    pub sk: Option<Fr>,
    pub sigma1: Option<G1>,
    pub sigma2: Option<G1>,
    /// Precomputed `e(σ1, g̃)`.
    pub e1: Option<GT>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    pub sigma1: G1,
    pub sigma2: G1,
    pub c: Fr,
    pub s: Fr,
}

/// Verifiable-opening proof: SPK of `y` for `A = B^y` in GT, over the
/// signature bytes. `B = e(σ1, g̃^sk)` is stored for the verifier; `A` is
/// recomputable from the signature and the group key.
#[derive(Clone, Debug, PartialEq)]
pub struct Proof {
    pub b: GT,
    pub c: Fr,
    pub s: Fr,
}

impl GroupKey {
    fn is_empty(&self) -> bool {
        self.g.is_none() && self.gg.is_none() && self.xx.is_none() && self.yy.is_none()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(SCHEME.code());
        w.put_tag(KeyType::Group.code());
        w.put_opt_elem(self.g.as_ref());
        w.put_opt_elem(self.gg.as_ref());
        w.put_opt_elem(self.xx.as_ref());
        w.put_opt_elem(self.yy.as_ref());
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = key_reader(bytes, KeyType::Group)?;
        let key = Self {
            g: r.take_opt_elem()?,
            gg: r.take_opt_elem()?,
            xx: r.take_opt_elem()?,
            yy: r.take_opt_elem()?,
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
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = key_reader(bytes, KeyType::Manager)?;
        let key = Self {
            x: r.take_opt_elem()?,
            y: r.take_opt_elem()?,
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
        w.put_opt_elem(self.sk.as_ref());
        w.put_opt_elem(self.sigma1.as_ref());
        w.put_opt_elem(self.sigma2.as_ref());
        w.put_opt_elem(self.e1.as_ref());
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = key_reader(bytes, KeyType::Member)?;
        let key = Self {
            sk: r.take_opt_elem()?,
            sigma1: r.take_opt_elem()?,
            sigma2: r.take_opt_elem()?,
            e1: r.take_opt_elem()?,
        };
        r.finish()?;
        Ok(key)
    }
}

impl Signature {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(SCHEME.code());
        w.put_elem(&self.sigma1);
        w.put_elem(&self.sigma2);
        w.put_elem(&self.c);
        w.put_elem(&self.s);
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = scheme_reader(bytes)?;
        let sig = Self {
            sigma1: r.take_elem()?,
            sigma2: r.take_elem()?,
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
        w.put_elem(&self.b);
        w.put_elem(&self.c);
        w.put_elem(&self.s);
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = scheme_reader(bytes)?;
        let proof = Self {
            b: r.take_elem()?,
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

pub fn setup<R: RngCore>(grpkey: &mut GroupKey, rng: &mut R) -> Result<ManagerKey> {
    if !grpkey.is_empty() {
        return Err(Error::SetupComplete);
    }

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

    Ok(ManagerKey {
        x: Some(x),
        y: Some(y),
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
        // hand the member a fresh nonce
        0 => {
            let n = Fr::rand(rng);
            let mut w = frame(SCHEME, 0);
            w.put_elem(&n);
            Ok(Message::new(w.finish()))
        }
        // check the member's commitment and issue the credential
        2 => {
            let msg_in = msg_in.ok_or(Error::MissingField("join message"))?;
            let x = req(&mgrkey.x, "x")?;
            let y = req(&mgrkey.y, "y")?;
            let g = req(&grpkey.g, "g")?;
            let gg = req(&grpkey.gg, "gg")?;

            let mut r = open_frame(msg_in, SCHEME, 1)?;
            let n: Fr = r.take_elem()?;
            let q: G1 = r.take_elem()?;
            let rr: G2 = r.take_elem()?;
            let pi = SpkDlog {
                c: r.take_elem()?,
                s: r.take_elem()?,
            };
            r.finish()?;

            if !pi.verify(&q, g, &n.marshal()) {
                return Err(Error::JoinProof);
            }
            // R̃ must carry the same sk as Q
            if Bls::pair(&q, gg) != Bls::pair(g, &rr) {
                return Err(Error::JoinProof);
            }

            let u = rand_nonzero(rng);
            let mut sigma1 = g.clone();
            sigma1.mul(&u);

            // sigma2 = (g^x * Q^y)^u
            let mut sigma2 = g.clone();
            sigma2.mul(x);
            let mut qy = q;
            qy.mul(y);
            sigma2.add(&qy);
            sigma2.mul(&u);

            // tag for the opener: ttau = R̃^y = g̃^{sk*y}
            let mut ttau = rr;
            ttau.mul(y);

            let id = gml.len();
            gml.insert(GmlEntry::Ps16 { id, ttau })?;

            let mut w = frame(SCHEME, 2);
            w.put_elem(&sigma1);
            w.put_elem(&sigma2);
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
        // commit to a fresh sk in both groups, bound to the nonce
        1 => {
            let g = req(&grpkey.g, "g")?;
            let gg = req(&grpkey.gg, "gg")?;

            let mut r = open_frame(msg_in, SCHEME, 0)?;
            let n: Fr = r.take_elem()?;
            r.finish()?;

            let sk = rand_nonzero(rng);
            let mut q = g.clone();
            q.mul(&sk);
            let mut rr = gg.clone();
            rr.mul(&sk);

            let pi = SpkDlog::sign(&q, g, &sk, &n.marshal(), rng);

            memkey.sk = Some(sk);

            let mut w = frame(SCHEME, 1);
            w.put_elem(&n);
            w.put_elem(&q);
            w.put_elem(&rr);
            w.put_elem(&pi.c);
            w.put_elem(&pi.s);
            Ok(Some(Message::new(w.finish())))
        }
        // receive and check the credential
        3 => {
            let sk = req(&memkey.sk, "sk")?.clone();
            let gg = req(&grpkey.gg, "gg")?;
            let xx = req(&grpkey.xx, "xx")?;
            let yy = req(&grpkey.yy, "yy")?;

            let mut r = open_frame(msg_in, SCHEME, 2)?;
            let sigma1: G1 = r.take_elem()?;
            let sigma2: G1 = r.take_elem()?;
            r.finish()?;

            // e(sigma2, gg) must equal e(sigma1, X̃ * Ỹ^sk)
            let mut tail = yy.clone();
            tail.mul(&sk);
            tail.add(xx);
            if Bls::pair(&sigma2, gg) != Bls::pair(&sigma1, &tail) {
                return Err(Error::JoinProof);
            }

            memkey.e1 = Some(Bls::pair(&sigma1, gg));
            memkey.sigma1 = Some(sigma1);
            memkey.sigma2 = Some(sigma2);
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
    let sk = req(&memkey.sk, "sk")?;
    let sigma1 = req(&memkey.sigma1, "sigma1")?;
    let sigma2 = req(&memkey.sigma2, "sigma2")?;
    let yy = req(&grpkey.yy, "yy")?;

    let r = rand_nonzero(rng);
    let mut s1 = sigma1.clone();
    s1.mul(&r);
    let mut s2 = sigma2.clone();
    s2.mul(&r);

    // A = e(sigma2', gg) / e(sigma1', X̃) = B^sk with B = e(sigma1', Ỹ)
    let b = Bls::pair(&s1, yy);
    let mut a = b.clone();
    a.mul(sk);

    let pi = SpkDlog::sign(&a, &b, sk, msg, rng);

    Ok(Signature {
        sigma1: s1,
        sigma2: s2,
        c: pi.c,
        s: pi.s,
    })
}

/// Recomputes the GT image the signing proof commits to.
fn signed_image(sig: &Signature, grpkey: &GroupKey) -> Result<GT> {
    let gg = req(&grpkey.gg, "gg")?;
    let xx = req(&grpkey.xx, "xx")?;

    let mut a = Bls::pair(&sig.sigma2, gg);
    let mut ax = Bls::pair(&sig.sigma1, xx);
    ax.negate();
    a.add(&ax);
    Ok(a)
}

pub fn verify(sig: &Signature, msg: &[u8], grpkey: &GroupKey) -> Result<bool> {
    let yy = req(&grpkey.yy, "yy")?;

    if sig.sigma1 == G1::zero() {
        return Ok(false);
    }

    let a = signed_image(sig, grpkey)?;
    let b = Bls::pair(&sig.sigma1, yy);

    let pi = SpkDlog {
        c: sig.c.clone(),
        s: sig.s.clone(),
    };
    Ok(pi.verify(&a, &b, msg))
}

/// Identifies the signer and produces the verifiable-opening proof.
pub fn open<R: RngCore>(
    sig: &Signature,
    mgrkey: &ManagerKey,
    grpkey: &GroupKey,
    gml: &Gml,
    rng: &mut R,
) -> Result<Option<(u64, Proof)>> {
    let y = req(&mgrkey.y, "y")?;

    let a = signed_image(sig, grpkey)?;

    let mut matched = None;
    for entry in gml.iter() {
        if let GmlEntry::Ps16 { id, ttau } = entry {
            if Bls::pair(&sig.sigma1, ttau) == a {
                matched = Some((*id, ttau.clone()));
                break;
            }
        }
    }
    let Some((id, ttau)) = matched else {
        return Ok(None);
    };

    // B = e(sigma1, g̃^sk) with g̃^sk = ttau^{1/y}; then A = B^y
    let yinv = y.inverse().ok_or(Error::DegenerateScalar)?;
    let mut ggsk = ttau;
    ggsk.mul(&yinv);
    let b = Bls::pair(&sig.sigma1, &ggsk);

    let pi = SpkDlog::sign(&a, &b, y, &sig.to_bytes(), rng);

    Ok(Some((
        id,
        Proof {
            b,
            c: pi.c,
            s: pi.s,
        },
    )))
}

/// Checks an opening proof against the signature it opened.
pub fn open_verify(proof: &Proof, sig: &Signature, grpkey: &GroupKey) -> Result<bool> {
    let a = signed_image(sig, grpkey)?;
    let pi = SpkDlog {
        c: proof.c.clone(),
        s: proof.s.clone(),
    };
    Ok(pi.verify(&a, &proof.b, &sig.to_bytes()))
}
