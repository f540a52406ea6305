//! The registry: one set of entry points over every scheme.
//!
//! Each function reads the scheme off its object arguments, checks that
//! they all agree, and dispatches to the engine. Operations a scheme does
//! not implement return [`Error::Unsupported`]; mixing objects of
//! different schemes in one call is an error before any cryptography
//! runs.

use crate::crl::{Crl, Trapdoor};
use crate::error::{Error, Result};
use crate::gml::Gml;
use crate::msg::Message;
use crate::scheme::SchemeCode;
use crate::schemes::{bbs04, dl21, dl21seq, gl19, klap20, ps16};
use crate::types::{
    BlindSignature, BlindingKey, GroupKey, Identity, ManagerKey, MemberKey, Opening, Proof,
    Signature,
};
use rand_core::RngCore;

pub use crate::schemes::gl19::UnblindedTag;

fn check(expected: SchemeCode, got: SchemeCode) -> Result<()> {
    if expected != got {
        return Err(Error::SchemeMismatch { expected, got });
    }
    Ok(())
}

/// Runs the scheme's setup over a caller-initialized group key, returning
/// the manager key. For KLAP20 the call is staged: the first invocation on
/// an empty key yields the issuer key, the second the opener key, and any
/// further call is an error.
pub fn setup<R: RngCore>(grpkey: &mut GroupKey, rng: &mut R) -> Result<ManagerKey> {
    match grpkey {
        GroupKey::Bbs04(gk) => Ok(ManagerKey::Bbs04(bbs04::setup(gk, rng)?)),
        GroupKey::Ps16(gk) => Ok(ManagerKey::Ps16(ps16::setup(gk, rng)?)),
        GroupKey::Klap20(gk) => Ok(ManagerKey::Klap20(klap20::setup(gk, rng)?)),
        GroupKey::Gl19(gk) => Ok(ManagerKey::Gl19(gl19::setup(gk, rng)?)),
        GroupKey::Dl21(gk) => Ok(ManagerKey::Dl21(dl21::setup(gk, rng)?)),
        GroupKey::Dl21Seq(gk) => Ok(ManagerKey::Dl21Seq(dl21seq::setup(gk, rng)?)),
    }
}

/// Manager side of the join protocol at step `seq` (even steps).
pub fn join_mgr<R: RngCore>(
    seq: u8,
    mgrkey: &ManagerKey,
    grpkey: &GroupKey,
    gml: &mut Gml,
    msg_in: Option<&Message>,
    rng: &mut R,
) -> Result<Message> {
    check(grpkey.scheme(), mgrkey.scheme())?;
    check(grpkey.scheme(), gml.scheme())?;
    match (grpkey, mgrkey) {
        (GroupKey::Bbs04(gk), ManagerKey::Bbs04(mk)) => bbs04::join_mgr(seq, mk, gk, gml, rng),
        (GroupKey::Ps16(gk), ManagerKey::Ps16(mk)) => {
            ps16::join_mgr(seq, mk, gk, gml, msg_in, rng)
        }
        (GroupKey::Klap20(gk), ManagerKey::Klap20(mk)) => {
            klap20::join_mgr(seq, mk, gk, gml, msg_in, rng)
        }
        (GroupKey::Gl19(gk), ManagerKey::Gl19(mk)) => gl19::join_mgr(seq, mk, gk, msg_in, rng),
        (GroupKey::Dl21(gk), ManagerKey::Dl21(mk)) => dl21::join_mgr(seq, mk, gk, msg_in, rng),
        (GroupKey::Dl21Seq(gk), ManagerKey::Dl21Seq(mk)) => {
            dl21seq::join_mgr(seq, mk, gk, msg_in, rng)
        }
        _ => Err(Error::SchemeMismatch {
            expected: grpkey.scheme(),
            got: mgrkey.scheme(),
        }),
    }
}

/// Member side of the join protocol at step `seq` (odd steps). Returns the
/// next message to send, or `None` when the protocol finished.
pub fn join_mem<R: RngCore>(
    seq: u8,
    memkey: &mut MemberKey,
    grpkey: &GroupKey,
    msg_in: &Message,
    rng: &mut R,
) -> Result<Option<Message>> {
    let (expected, got) = (grpkey.scheme(), memkey.scheme());
    check(expected, got)?;
    match (grpkey, memkey) {
        (GroupKey::Bbs04(gk), MemberKey::Bbs04(mk)) => {
            bbs04::join_mem(seq, mk, gk, msg_in).map(|()| None)
        }
        (GroupKey::Ps16(gk), MemberKey::Ps16(mk)) => ps16::join_mem(seq, mk, gk, msg_in, rng),
        (GroupKey::Klap20(gk), MemberKey::Klap20(mk)) => {
            klap20::join_mem(seq, mk, gk, msg_in, rng)
        }
        (GroupKey::Gl19(gk), MemberKey::Gl19(mk)) => gl19::join_mem(seq, mk, gk, msg_in, rng),
        (GroupKey::Dl21(gk), MemberKey::Dl21(mk)) => dl21::join_mem(seq, mk, gk, msg_in, rng),
        (GroupKey::Dl21Seq(gk), MemberKey::Dl21Seq(mk)) => {
            dl21seq::join_mem(seq, mk, gk, msg_in, rng)
        }
        _ => Err(Error::SchemeMismatch { expected, got }),
    }
}

/// Signs a message. DL21-family schemes expect the message to be a JSON
/// composite carrying `scope` and `message` fields; DL21SEQ additionally
/// advances the member key's counter, which is why the key is mutable.
pub fn sign<R: RngCore>(
    msg: &Message,
    memkey: &mut MemberKey,
    grpkey: &GroupKey,
    rng: &mut R,
) -> Result<Signature> {
    let (expected, got) = (grpkey.scheme(), memkey.scheme());
    check(expected, got)?;
    match (grpkey, memkey) {
        (GroupKey::Bbs04(gk), MemberKey::Bbs04(mk)) => {
            Ok(Signature::Bbs04(bbs04::sign(msg.as_bytes(), mk, gk, rng)?))
        }
        (GroupKey::Ps16(gk), MemberKey::Ps16(mk)) => {
            Ok(Signature::Ps16(ps16::sign(msg.as_bytes(), mk, gk, rng)?))
        }
        (GroupKey::Klap20(gk), MemberKey::Klap20(mk)) => {
            Ok(Signature::Klap20(klap20::sign(msg.as_bytes(), mk, gk, rng)?))
        }
        (GroupKey::Gl19(gk), MemberKey::Gl19(mk)) => {
            Ok(Signature::Gl19(gl19::sign(msg.as_bytes(), mk, gk, rng)?))
        }
        (GroupKey::Dl21(gk), MemberKey::Dl21(mk)) => {
            Ok(Signature::Dl21(dl21::sign(msg, mk, gk, rng)?))
        }
        (GroupKey::Dl21Seq(gk), MemberKey::Dl21Seq(mk)) => {
            Ok(Signature::Dl21Seq(dl21seq::sign(msg, mk, gk, rng)?))
        }
        _ => Err(Error::SchemeMismatch { expected, got }),
    }
}

/// Verifies a signature. `Ok(false)` is a cryptographic reject; errors are
/// reserved for malformed inputs.
pub fn verify(sig: &Signature, msg: &Message, grpkey: &GroupKey) -> Result<bool> {
    check(grpkey.scheme(), sig.scheme())?;
    match (grpkey, sig) {
        (GroupKey::Bbs04(gk), Signature::Bbs04(s)) => bbs04::verify(s, msg.as_bytes(), gk),
        (GroupKey::Ps16(gk), Signature::Ps16(s)) => ps16::verify(s, msg.as_bytes(), gk),
        (GroupKey::Klap20(gk), Signature::Klap20(s)) => klap20::verify(s, msg.as_bytes(), gk),
        (GroupKey::Gl19(gk), Signature::Gl19(s)) => gl19::verify(s, msg.as_bytes(), gk),
        (GroupKey::Dl21(gk), Signature::Dl21(s)) => dl21::verify(s, msg, gk),
        (GroupKey::Dl21Seq(gk), Signature::Dl21Seq(s)) => dl21seq::verify(s, msg, gk),
        _ => Err(Error::SchemeMismatch {
            expected: grpkey.scheme(),
            got: sig.scheme(),
        }),
    }
}

/// Identifies a signer against the GML. `Ok(None)` means no entry
/// matched; schemes with verifiable opening also return a proof.
pub fn open<R: RngCore>(
    sig: &Signature,
    mgrkey: &ManagerKey,
    grpkey: &GroupKey,
    gml: &Gml,
    rng: &mut R,
) -> Result<Option<Opening>> {
    check(grpkey.scheme(), sig.scheme())?;
    check(grpkey.scheme(), mgrkey.scheme())?;
    check(grpkey.scheme(), gml.scheme())?;
    let scheme = grpkey.scheme();
    let wrap = |index, proof| {
        Some(Opening {
            id: Identity { scheme, index },
            proof,
        })
    };
    match (grpkey, mgrkey, sig) {
        (GroupKey::Bbs04(_), ManagerKey::Bbs04(mk), Signature::Bbs04(s)) => {
            Ok(bbs04::open(s, mk, gml)?.and_then(|index| wrap(index, None)))
        }
        (GroupKey::Ps16(gk), ManagerKey::Ps16(mk), Signature::Ps16(s)) => {
            Ok(ps16::open(s, mk, gk, gml, rng)?
                .and_then(|(index, proof)| wrap(index, Some(Proof::Ps16(proof)))))
        }
        (GroupKey::Klap20(gk), ManagerKey::Klap20(mk), Signature::Klap20(s)) => {
            Ok(klap20::open(s, mk, gk, gml, rng)?
                .and_then(|(index, proof)| wrap(index, Some(Proof::Klap20(proof)))))
        }
        (GroupKey::Gl19(_), _, _) | (GroupKey::Dl21(_), _, _) | (GroupKey::Dl21Seq(_), _, _) => {
            Err(Error::Unsupported { scheme, op: "open" })
        }
        _ => Err(Error::SchemeMismatch {
            expected: scheme,
            got: sig.scheme(),
        }),
    }
}

/// Verifies an opening proof against the signature it opened.
pub fn open_verify(proof: &Proof, sig: &Signature, grpkey: &GroupKey) -> Result<bool> {
    check(grpkey.scheme(), sig.scheme())?;
    check(grpkey.scheme(), proof.scheme())?;
    match (grpkey, sig, proof) {
        (GroupKey::Ps16(gk), Signature::Ps16(s), Proof::Ps16(p)) => ps16::open_verify(p, s, gk),
        (GroupKey::Klap20(gk), Signature::Klap20(s), Proof::Klap20(p)) => {
            klap20::open_verify(p, s, gk)
        }
        _ => Err(Error::Unsupported {
            scheme: grpkey.scheme(),
            op: "open_verify",
        }),
    }
}

/// Publishes a member's trapdoor on the CRL (BBS04 only).
pub fn reveal(id: u64, gml: &Gml, crl: &mut Crl) -> Result<Trapdoor> {
    check(gml.scheme(), crl.scheme())?;
    match gml.scheme() {
        SchemeCode::Bbs04 => bbs04::reveal(id, gml, crl),
        scheme => Err(Error::Unsupported {
            scheme,
            op: "reveal",
        }),
    }
}

/// Tests a signature against the revocation list (BBS04 only).
pub fn trace(sig: &Signature, mgrkey: &ManagerKey, grpkey: &GroupKey, crl: &Crl) -> Result<bool> {
    check(grpkey.scheme(), sig.scheme())?;
    check(grpkey.scheme(), mgrkey.scheme())?;
    check(grpkey.scheme(), crl.scheme())?;
    match (mgrkey, sig) {
        (ManagerKey::Bbs04(mk), Signature::Bbs04(s)) => bbs04::trace(s, mk, crl),
        _ => Err(Error::Unsupported {
            scheme: grpkey.scheme(),
            op: "trace",
        }),
    }
}

/// Lets a member test whether it produced a signature (DL21 family).
pub fn identify(sig: &Signature, memkey: &MemberKey, msg: &Message) -> Result<bool> {
    check(memkey.scheme(), sig.scheme())?;
    match (memkey, sig) {
        (MemberKey::Dl21(mk), Signature::Dl21(s)) => dl21::identify(s, mk, msg),
        (MemberKey::Dl21Seq(mk), Signature::Dl21Seq(s)) => dl21seq::identify(s, mk, msg),
        _ => Err(Error::Unsupported {
            scheme: memkey.scheme(),
            op: "identify",
        }),
    }
}

fn dl21_sigs(sigs: &[Signature]) -> Result<Vec<&dl21::Signature>> {
    sigs.iter()
        .map(|s| match s {
            Signature::Dl21(s) => Ok(s),
            other => Err(Error::SchemeMismatch {
                expected: SchemeCode::Dl21,
                got: other.scheme(),
            }),
        })
        .collect()
}

fn dl21seq_sigs(sigs: &[Signature]) -> Result<Vec<&dl21seq::Signature>> {
    sigs.iter()
        .map(|s| match s {
            Signature::Dl21Seq(s) => Ok(s),
            other => Err(Error::SchemeMismatch {
                expected: SchemeCode::Dl21Seq,
                got: other.scheme(),
            }),
        })
        .collect()
}

/// Produces a link proof over same-scope signatures (DL21 family).
/// `Ok(None)` means the signatures cannot be linked by this member.
pub fn link<R: RngCore>(
    memkey: &MemberKey,
    grpkey: &GroupKey,
    msg: &Message,
    sigs: &[Signature],
    msgs: &[Message],
    rng: &mut R,
) -> Result<Option<Proof>> {
    check(grpkey.scheme(), memkey.scheme())?;
    match (grpkey, memkey) {
        (GroupKey::Dl21(gk), MemberKey::Dl21(mk)) => {
            let sigs: Vec<dl21::Signature> =
                dl21_sigs(sigs)?.into_iter().cloned().collect();
            Ok(dl21::link(mk, gk, msg, &sigs, msgs, rng)?.map(Proof::Dl21))
        }
        (GroupKey::Dl21Seq(gk), MemberKey::Dl21Seq(mk)) => {
            let sigs: Vec<dl21seq::Signature> =
                dl21seq_sigs(sigs)?.into_iter().cloned().collect();
            Ok(dl21seq::link(mk, gk, msg, &sigs, msgs, rng)?.map(Proof::Dl21Seq))
        }
        _ => Err(Error::Unsupported {
            scheme: grpkey.scheme(),
            op: "link",
        }),
    }
}

/// Verifies a link proof (DL21 family).
pub fn verify_link(
    proof: &Proof,
    grpkey: &GroupKey,
    msg: &Message,
    sigs: &[Signature],
    msgs: &[Message],
) -> Result<bool> {
    check(grpkey.scheme(), proof.scheme())?;
    match (grpkey, proof) {
        (GroupKey::Dl21(gk), Proof::Dl21(p)) => {
            let sigs: Vec<dl21::Signature> =
                dl21_sigs(sigs)?.into_iter().cloned().collect();
            dl21::verify_link(p, gk, msg, &sigs, msgs)
        }
        (GroupKey::Dl21Seq(gk), Proof::Dl21Seq(p)) => {
            let sigs: Vec<dl21seq::Signature> =
                dl21seq_sigs(sigs)?.into_iter().cloned().collect();
            dl21seq::verify_link(p, gk, msg, &sigs, msgs)
        }
        _ => Err(Error::Unsupported {
            scheme: grpkey.scheme(),
            op: "verify_link",
        }),
    }
}

/// Generates a consumer blinding keypair (GL19 only).
pub fn blind_key_gen<R: RngCore>(grpkey: &GroupKey, rng: &mut R) -> Result<BlindingKey> {
    match grpkey {
        GroupKey::Gl19(gk) => Ok(BlindingKey::Gl19(gl19::blind_key_gen(gk, rng)?)),
        _ => Err(Error::Unsupported {
            scheme: grpkey.scheme(),
            op: "blind",
        }),
    }
}

/// Blinds a signature and its message under the consumer key (GL19 only).
pub fn blind<R: RngCore>(
    bldkey: &BlindingKey,
    sig: &Signature,
    msg: &Message,
    grpkey: &GroupKey,
    rng: &mut R,
) -> Result<BlindSignature> {
    check(grpkey.scheme(), sig.scheme())?;
    check(grpkey.scheme(), bldkey.scheme())?;
    match (grpkey, sig, bldkey) {
        (GroupKey::Gl19(gk), Signature::Gl19(s), BlindingKey::Gl19(bk)) => Ok(
            BlindSignature::Gl19(gl19::blind(bk, s, msg.as_bytes(), gk, rng)?),
        ),
        _ => Err(Error::Unsupported {
            scheme: grpkey.scheme(),
            op: "blind",
        }),
    }
}

/// Converter-side batch transformation of blinded signatures (GL19 only).
pub fn convert<R: RngCore>(
    bsigs: Vec<BlindSignature>,
    mgrkey: &ManagerKey,
    grpkey: &GroupKey,
    bldkey: &BlindingKey,
    rng: &mut R,
) -> Result<Vec<BlindSignature>> {
    check(grpkey.scheme(), mgrkey.scheme())?;
    check(grpkey.scheme(), bldkey.scheme())?;
    match (grpkey, mgrkey, bldkey) {
        (GroupKey::Gl19(gk), ManagerKey::Gl19(mk), BlindingKey::Gl19(bk)) => {
            let inner = bsigs
                .into_iter()
                .map(|b| {
                    let BlindSignature::Gl19(b) = b;
                    b
                })
                .collect();
            Ok(gl19::convert(inner, mk, gk, bk, rng)?
                .into_iter()
                .map(BlindSignature::Gl19)
                .collect())
        }
        _ => Err(Error::Unsupported {
            scheme: grpkey.scheme(),
            op: "convert",
        }),
    }
}

/// Consumer-side unblinding of a converted signature (GL19 only).
pub fn unblind(bldkey: &BlindingKey, bsig: &BlindSignature) -> Result<UnblindedTag> {
    check(bldkey.scheme(), bsig.scheme())?;
    match (bldkey, bsig) {
        (BlindingKey::Gl19(bk), BlindSignature::Gl19(b)) => gl19::unblind(bk, b),
    }
}

/// Claiming authorship is not implemented by any of the supported schemes.
pub fn claim<R: RngCore>(
    _sig: &Signature,
    memkey: &MemberKey,
    _grpkey: &GroupKey,
    _rng: &mut R,
) -> Result<Proof> {
    Err(Error::Unsupported {
        scheme: memkey.scheme(),
        op: "claim",
    })
}

/// Counterpart of [`claim`]; never available.
pub fn claim_verify(proof: &Proof, _sig: &Signature, _grpkey: &GroupKey) -> Result<bool> {
    Err(Error::Unsupported {
        scheme: proof.scheme(),
        op: "claim_verify",
    })
}

/// Proving two signatures share an author without a scope is not
/// implemented by any of the supported schemes.
pub fn prove_equality<R: RngCore>(
    memkey: &MemberKey,
    _sigs: &[Signature],
    _rng: &mut R,
) -> Result<Proof> {
    Err(Error::Unsupported {
        scheme: memkey.scheme(),
        op: "prove_equality",
    })
}
