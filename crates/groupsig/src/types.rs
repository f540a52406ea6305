//! Polymorphic containers over the per-scheme types.
//!
//! Each container is a sum type over the schemes that implement the object
//! kind; the handle-table dispatch of the registry becomes an exhaustive
//! match. Every container knows its scheme, serializes to the canonical
//! tagged wire format, and imports with full tag validation.

use crate::error::{Error, Result};
use crate::msg::Message;
use crate::scheme::SchemeCode;
use crate::schemes::{bbs04, dl21, dl21seq, gl19, klap20, ps16};
use crate::wire::{FieldReader, FieldWriter};

fn peek_scheme(bytes: &[u8]) -> Result<SchemeCode> {
    let mut r = FieldReader::new(bytes);
    SchemeCode::from_code(r.take_tag()?)
}

fn unsupported(scheme: SchemeCode, op: &'static str) -> Error {
    Error::Unsupported { scheme, op }
}

macro_rules! dispatch {
    ($self:expr, $inner:pat => $body:expr) => {
        match $self {
            Self::Bbs04($inner) => $body,
            Self::Ps16($inner) => $body,
            Self::Klap20($inner) => $body,
            Self::Gl19($inner) => $body,
            Self::Dl21($inner) => $body,
            Self::Dl21Seq($inner) => $body,
        }
    };
}

/// Group public key.
#[derive(Clone, Debug, PartialEq)]
pub enum GroupKey {
    Bbs04(bbs04::GroupKey),
    Ps16(ps16::GroupKey),
    Klap20(klap20::GroupKey),
    Gl19(gl19::GroupKey),
    Dl21(dl21::GroupKey),
    Dl21Seq(dl21seq::GroupKey),
}

impl GroupKey {
    /// An empty key of the given scheme, ready for `setup`.
    pub fn new(scheme: SchemeCode) -> Result<Self> {
        match scheme {
            SchemeCode::Bbs04 => Ok(Self::Bbs04(Default::default())),
            SchemeCode::Ps16 => Ok(Self::Ps16(Default::default())),
            SchemeCode::Klap20 => Ok(Self::Klap20(Default::default())),
            SchemeCode::Gl19 => Ok(Self::Gl19(Default::default())),
            SchemeCode::Dl21 => Ok(Self::Dl21(Default::default())),
            SchemeCode::Dl21Seq => Ok(Self::Dl21Seq(Default::default())),
            other => Err(unsupported(other, "group key")),
        }
    }

    pub fn scheme(&self) -> SchemeCode {
        match self {
            Self::Bbs04(_) => SchemeCode::Bbs04,
            Self::Ps16(_) => SchemeCode::Ps16,
            Self::Klap20(_) => SchemeCode::Klap20,
            Self::Gl19(_) => SchemeCode::Gl19,
            Self::Dl21(_) => SchemeCode::Dl21,
            Self::Dl21Seq(_) => SchemeCode::Dl21Seq,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        dispatch!(self, k => k.to_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match peek_scheme(bytes)? {
            SchemeCode::Bbs04 => Ok(Self::Bbs04(bbs04::GroupKey::from_bytes(bytes)?)),
            SchemeCode::Ps16 => Ok(Self::Ps16(ps16::GroupKey::from_bytes(bytes)?)),
            SchemeCode::Klap20 => Ok(Self::Klap20(klap20::GroupKey::from_bytes(bytes)?)),
            SchemeCode::Gl19 => Ok(Self::Gl19(gl19::GroupKey::from_bytes(bytes)?)),
            SchemeCode::Dl21 => Ok(Self::Dl21(dl21::GroupKey::from_bytes(bytes)?)),
            SchemeCode::Dl21Seq => Ok(Self::Dl21Seq(dl21seq::GroupKey::from_bytes(bytes)?)),
            other => Err(unsupported(other, "group key import")),
        }
    }

    pub fn size(&self) -> usize {
        self.to_bytes().len()
    }

    pub fn to_base64(&self, wrap: bool) -> String {
        Message::new(self.to_bytes()).to_base64(wrap)
    }

    pub fn from_base64(s: &str) -> Result<Self> {
        Self::from_bytes(Message::from_base64(s)?.as_bytes())
    }
}

/// Manager (issuer and/or opener) private key.
#[derive(Clone, Debug, PartialEq)]
pub enum ManagerKey {
    Bbs04(bbs04::ManagerKey),
    Ps16(ps16::ManagerKey),
    Klap20(klap20::ManagerKey),
    Gl19(gl19::ManagerKey),
    Dl21(dl21::ManagerKey),
    Dl21Seq(dl21seq::ManagerKey),
}

impl ManagerKey {
    pub fn scheme(&self) -> SchemeCode {
        match self {
            Self::Bbs04(_) => SchemeCode::Bbs04,
            Self::Ps16(_) => SchemeCode::Ps16,
            Self::Klap20(_) => SchemeCode::Klap20,
            Self::Gl19(_) => SchemeCode::Gl19,
            Self::Dl21(_) => SchemeCode::Dl21,
            Self::Dl21Seq(_) => SchemeCode::Dl21Seq,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        dispatch!(self, k => k.to_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match peek_scheme(bytes)? {
            SchemeCode::Bbs04 => Ok(Self::Bbs04(bbs04::ManagerKey::from_bytes(bytes)?)),
            SchemeCode::Ps16 => Ok(Self::Ps16(ps16::ManagerKey::from_bytes(bytes)?)),
            SchemeCode::Klap20 => Ok(Self::Klap20(klap20::ManagerKey::from_bytes(bytes)?)),
            SchemeCode::Gl19 => Ok(Self::Gl19(gl19::ManagerKey::from_bytes(bytes)?)),
            SchemeCode::Dl21 => Ok(Self::Dl21(dl21::ManagerKey::from_bytes(bytes)?)),
            SchemeCode::Dl21Seq => Ok(Self::Dl21Seq(dl21seq::ManagerKey::from_bytes(bytes)?)),
            other => Err(unsupported(other, "manager key import")),
        }
    }

    pub fn size(&self) -> usize {
        self.to_bytes().len()
    }

    pub fn to_base64(&self, wrap: bool) -> String {
        Message::new(self.to_bytes()).to_base64(wrap)
    }

    pub fn from_base64(s: &str) -> Result<Self> {
        Self::from_bytes(Message::from_base64(s)?.as_bytes())
    }
}

/// Member private key, built up over the join protocol.
#[derive(Clone, Debug, PartialEq)]
pub enum MemberKey {
    Bbs04(bbs04::MemberKey),
    Ps16(ps16::MemberKey),
    Klap20(klap20::MemberKey),
    Gl19(gl19::MemberKey),
    Dl21(dl21::MemberKey),
    Dl21Seq(dl21seq::MemberKey),
}

impl MemberKey {
    /// An empty key of the given scheme, ready for the join protocol.
    pub fn new(scheme: SchemeCode) -> Result<Self> {
        match scheme {
            SchemeCode::Bbs04 => Ok(Self::Bbs04(Default::default())),
            SchemeCode::Ps16 => Ok(Self::Ps16(Default::default())),
            SchemeCode::Klap20 => Ok(Self::Klap20(Default::default())),
            SchemeCode::Gl19 => Ok(Self::Gl19(Default::default())),
            SchemeCode::Dl21 => Ok(Self::Dl21(Default::default())),
            SchemeCode::Dl21Seq => Ok(Self::Dl21Seq(Default::default())),
            other => Err(unsupported(other, "member key")),
        }
    }

    pub fn scheme(&self) -> SchemeCode {
        match self {
            Self::Bbs04(_) => SchemeCode::Bbs04,
            Self::Ps16(_) => SchemeCode::Ps16,
            Self::Klap20(_) => SchemeCode::Klap20,
            Self::Gl19(_) => SchemeCode::Gl19,
            Self::Dl21(_) => SchemeCode::Dl21,
            Self::Dl21Seq(_) => SchemeCode::Dl21Seq,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        dispatch!(self, k => k.to_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match peek_scheme(bytes)? {
            SchemeCode::Bbs04 => Ok(Self::Bbs04(bbs04::MemberKey::from_bytes(bytes)?)),
            SchemeCode::Ps16 => Ok(Self::Ps16(ps16::MemberKey::from_bytes(bytes)?)),
            SchemeCode::Klap20 => Ok(Self::Klap20(klap20::MemberKey::from_bytes(bytes)?)),
            SchemeCode::Gl19 => Ok(Self::Gl19(gl19::MemberKey::from_bytes(bytes)?)),
            SchemeCode::Dl21 => Ok(Self::Dl21(dl21::MemberKey::from_bytes(bytes)?)),
            SchemeCode::Dl21Seq => Ok(Self::Dl21Seq(dl21seq::MemberKey::from_bytes(bytes)?)),
            other => Err(unsupported(other, "member key import")),
        }
    }

    pub fn size(&self) -> usize {
        self.to_bytes().len()
    }

    pub fn to_base64(&self, wrap: bool) -> String {
        Message::new(self.to_bytes()).to_base64(wrap)
    }

    pub fn from_base64(s: &str) -> Result<Self> {
        Self::from_bytes(Message::from_base64(s)?.as_bytes())
    }
}

/// Blinding keypair (GL19 only).
#[derive(Clone, Debug, PartialEq)]
pub enum BlindingKey {
    Gl19(gl19::BlindingKey),
}

impl BlindingKey {
    pub fn scheme(&self) -> SchemeCode {
        match self {
            Self::Gl19(_) => SchemeCode::Gl19,
        }
    }

    /// The public half alone.
    pub fn public(&self) -> Self {
        match self {
            Self::Gl19(k) => Self::Gl19(k.public()),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Gl19(k) => k.to_bytes(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match peek_scheme(bytes)? {
            SchemeCode::Gl19 => Ok(Self::Gl19(gl19::BlindingKey::from_bytes(bytes)?)),
            other => Err(unsupported(other, "blinding key import")),
        }
    }

    pub fn size(&self) -> usize {
        self.to_bytes().len()
    }

    pub fn to_base64(&self, wrap: bool) -> String {
        Message::new(self.to_bytes()).to_base64(wrap)
    }

    pub fn from_base64(s: &str) -> Result<Self> {
        Self::from_bytes(Message::from_base64(s)?.as_bytes())
    }
}

/// Group signature.
#[derive(Clone, Debug, PartialEq)]
pub enum Signature {
    Bbs04(bbs04::Signature),
    Ps16(ps16::Signature),
    Klap20(klap20::Signature),
    Gl19(gl19::Signature),
    Dl21(dl21::Signature),
    Dl21Seq(dl21seq::Signature),
}

impl Signature {
    pub fn scheme(&self) -> SchemeCode {
        match self {
            Self::Bbs04(_) => SchemeCode::Bbs04,
            Self::Ps16(_) => SchemeCode::Ps16,
            Self::Klap20(_) => SchemeCode::Klap20,
            Self::Gl19(_) => SchemeCode::Gl19,
            Self::Dl21(_) => SchemeCode::Dl21,
            Self::Dl21Seq(_) => SchemeCode::Dl21Seq,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        dispatch!(self, s => s.to_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match peek_scheme(bytes)? {
            SchemeCode::Bbs04 => Ok(Self::Bbs04(bbs04::Signature::from_bytes(bytes)?)),
            SchemeCode::Ps16 => Ok(Self::Ps16(ps16::Signature::from_bytes(bytes)?)),
            SchemeCode::Klap20 => Ok(Self::Klap20(klap20::Signature::from_bytes(bytes)?)),
            SchemeCode::Gl19 => Ok(Self::Gl19(gl19::Signature::from_bytes(bytes)?)),
            SchemeCode::Dl21 => Ok(Self::Dl21(dl21::Signature::from_bytes(bytes)?)),
            SchemeCode::Dl21Seq => Ok(Self::Dl21Seq(dl21seq::Signature::from_bytes(bytes)?)),
            other => Err(unsupported(other, "signature import")),
        }
    }

    pub fn size(&self) -> usize {
        self.to_bytes().len()
    }

    pub fn to_base64(&self, wrap: bool) -> String {
        Message::new(self.to_bytes()).to_base64(wrap)
    }

    pub fn from_base64(s: &str) -> Result<Self> {
        Self::from_bytes(Message::from_base64(s)?.as_bytes())
    }
}

/// Scheme proof: opening proofs (PS16, KLAP20) and link proofs (DL21
/// family).
#[derive(Clone, Debug, PartialEq)]
pub enum Proof {
    Ps16(ps16::Proof),
    Klap20(klap20::Proof),
    Dl21(dl21::Proof),
    Dl21Seq(dl21seq::Proof),
}

impl Proof {
    pub fn scheme(&self) -> SchemeCode {
        match self {
            Self::Ps16(_) => SchemeCode::Ps16,
            Self::Klap20(_) => SchemeCode::Klap20,
            Self::Dl21(_) => SchemeCode::Dl21,
            Self::Dl21Seq(_) => SchemeCode::Dl21Seq,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Ps16(p) => p.to_bytes(),
            Self::Klap20(p) => p.to_bytes(),
            Self::Dl21(p) => p.to_bytes(),
            Self::Dl21Seq(p) => p.to_bytes(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match peek_scheme(bytes)? {
            SchemeCode::Ps16 => Ok(Self::Ps16(ps16::Proof::from_bytes(bytes)?)),
            SchemeCode::Klap20 => Ok(Self::Klap20(klap20::Proof::from_bytes(bytes)?)),
            SchemeCode::Dl21 => Ok(Self::Dl21(dl21::Proof::from_bytes(bytes)?)),
            SchemeCode::Dl21Seq => Ok(Self::Dl21Seq(dl21seq::Proof::from_bytes(bytes)?)),
            other => Err(unsupported(other, "proof import")),
        }
    }

    pub fn size(&self) -> usize {
        self.to_bytes().len()
    }

    pub fn to_base64(&self, wrap: bool) -> String {
        Message::new(self.to_bytes()).to_base64(wrap)
    }

    pub fn from_base64(s: &str) -> Result<Self> {
        Self::from_bytes(Message::from_base64(s)?.as_bytes())
    }
}

/// Blinded signature (GL19 only).
#[derive(Clone, Debug, PartialEq)]
pub enum BlindSignature {
    Gl19(gl19::BlindSignature),
}

impl BlindSignature {
    pub fn scheme(&self) -> SchemeCode {
        match self {
            Self::Gl19(_) => SchemeCode::Gl19,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Gl19(b) => b.to_bytes(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match peek_scheme(bytes)? {
            SchemeCode::Gl19 => Ok(Self::Gl19(gl19::BlindSignature::from_bytes(bytes)?)),
            other => Err(unsupported(other, "blinded signature import")),
        }
    }

    pub fn size(&self) -> usize {
        self.to_bytes().len()
    }

    pub fn to_base64(&self, wrap: bool) -> String {
        Message::new(self.to_bytes()).to_base64(wrap)
    }

    pub fn from_base64(s: &str) -> Result<Self> {
        Self::from_bytes(Message::from_base64(s)?.as_bytes())
    }
}

/// An opened signer identity: an index into the scheme's GML.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identity {
    pub scheme: SchemeCode,
    pub index: u64,
}

impl Identity {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(self.scheme.code());
        w.put_u64(self.index);
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = FieldReader::new(bytes);
        let scheme = SchemeCode::from_code(r.take_tag()?)?;
        let index = r.take_u64()?;
        r.finish()?;
        Ok(Self { scheme, index })
    }
}

/// The result of a successful opening.
#[derive(Clone, Debug, PartialEq)]
pub struct Opening {
    pub id: Identity,
    /// Present for schemes with verifiable opening.
    pub proof: Option<Proof>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(GroupKey: Clone, Send, Sync);
    assert_impl_all!(ManagerKey: Clone, Send, Sync);
    assert_impl_all!(MemberKey: Clone, Send, Sync);
    assert_impl_all!(Signature: Clone, Send, Sync);
    assert_impl_all!(Proof: Clone, Send, Sync);

    #[test]
    fn unknown_scheme_byte_is_an_error() {
        assert!(matches!(
            Signature::from_bytes(&[0x2a, 0, 0, 0, 0]),
            Err(Error::UnknownScheme(0x2a))
        ));
    }

    #[test]
    fn recognized_but_unimplemented_scheme() {
        // KTY04 parses as a scheme code but has no engine
        assert!(matches!(
            Signature::from_bytes(&[8]),
            Err(Error::Unsupported { .. })
        ));
    }

    #[test]
    fn identity_roundtrip() {
        let id = Identity {
            scheme: SchemeCode::Ps16,
            index: 42,
        };
        assert_eq!(Identity::from_bytes(&id.to_bytes()).unwrap(), id);
    }

    #[test]
    fn base64_roundtrip() {
        let key = GroupKey::new(SchemeCode::Bbs04).unwrap();
        let b64 = key.to_base64(true);
        assert_eq!(GroupKey::from_base64(&b64).unwrap(), key);
        assert_eq!(key.size(), key.to_bytes().len());
    }
}
