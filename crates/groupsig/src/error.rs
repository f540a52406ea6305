//! Error type for the whole crate.
//!
//! The API keeps the three outcomes of every operation distinguishable:
//! `Ok(true)` / `Ok(Some(_))` for an accepted predicate, `Ok(false)` /
//! `Ok(None)` for a cryptographic reject (verification failed, opening
//! matched nothing), and `Err(Error)` for violated invariants such as bad
//! tags, truncated buffers, missing key material, or out-of-order protocol
//! steps.

use crate::scheme::{KeyType, SchemeCode};
use crate::wire::WireError;
use groupsig_core::spk::SpkError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A byte that should name a scheme does not.
    #[error("unknown scheme code {0}")]
    UnknownScheme(u8),

    /// A byte that should name a key role does not.
    #[error("unknown key type code {0}")]
    UnknownKeyType(u8),

    /// Objects of different schemes were mixed in one call.
    #[error("scheme mismatch: expected {expected}, got {got}")]
    SchemeMismatch {
        expected: SchemeCode,
        got: SchemeCode,
    },

    /// A serialized key carries the wrong role tag.
    #[error("key type mismatch: expected {expected:?}, got {got:?}")]
    KeyTypeMismatch { expected: KeyType, got: KeyType },

    /// The scheme does not implement the requested operation.
    #[error("{scheme} does not support {op}")]
    Unsupported {
        scheme: SchemeCode,
        op: &'static str,
    },

    /// A key is missing a field the operation needs.
    #[error("required field {0} is absent")]
    MissingField(&'static str),

    /// A join-protocol message arrived out of order or for the wrong step.
    #[error("join protocol: got step {got}, expected {expected}")]
    JoinStep { expected: u8, got: u8 },

    /// A join-protocol message failed its embedded consistency proof.
    #[error("join protocol: request proof did not verify")]
    JoinProof,

    /// Setup was invoked on a fully populated group key.
    #[error("group key is already fully populated")]
    SetupComplete,

    /// A GML entry failed the opener's authentication of its tag.
    #[error("group membership list entry failed authentication")]
    GmlTampered,

    /// The identity is not (or no longer) present in the list.
    #[error("identity {0} is not in the list")]
    UnknownIdentity(u64),

    /// Arguments that must agree in length (signatures and their
    /// messages, for instance) do not.
    #[error("argument lengths differ: {0} vs {1}")]
    LengthMismatch(usize, usize),

    /// A scalar that must be invertible was zero.
    #[error("degenerate scalar: no inverse")]
    DegenerateScalar,

    /// Hashing bytes onto the curve failed.
    #[error("hash-to-curve failed")]
    HashToPoint,

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Spk(#[from] SpkError),

    /// The message is not the JSON composite the scheme expects.
    #[error("message has no usable {0} field")]
    JsonField(&'static str),

    #[error("base64: {0}")]
    Base64(#[from] base64::DecodeError),
}
