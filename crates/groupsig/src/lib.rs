//! # groupsig
//!
//! Group signatures over BLS12-381 behind one polymorphic API. A group
//! member signs so that anyone can check the signature against the group's
//! public key without learning who signed; depending on the scheme, a
//! designated opener can identify the signer (and prove it), members can
//! link their own signatures under chosen scopes, or signatures can be
//! blinded for a converter.
//!
//! Implemented schemes: BBS04, PS16, KLAP20, GL19, DL21 and DL21SEQ. The
//! remaining codes of the registry (CPY06, KTY04) are recognized on the
//! wire but not implemented.
//!
//! ```rust
//! use groupsig::{GroupKey, Gml, MemberKey, Message, SchemeCode, Sysenv};
//!
//! let mut rng = Sysenv::from_entropy();
//!
//! // manager sets the group up
//! let mut grpkey = GroupKey::new(SchemeCode::Bbs04).unwrap();
//! let mgrkey = groupsig::setup(&mut grpkey, &mut rng).unwrap();
//! let mut gml = Gml::new(SchemeCode::Bbs04);
//!
//! // one member joins (single-message protocol for BBS04)
//! let msg0 = groupsig::join_mgr(0, &mgrkey, &grpkey, &mut gml, None, &mut rng).unwrap();
//! let mut memkey = MemberKey::new(SchemeCode::Bbs04).unwrap();
//! groupsig::join_mem(1, &mut memkey, &grpkey, &msg0, &mut rng).unwrap();
//!
//! // sign, verify, open
//! let msg = Message::new(&b"hello"[..]);
//! let sig = groupsig::sign(&msg, &mut memkey, &grpkey, &mut rng).unwrap();
//! assert!(groupsig::verify(&sig, &msg, &grpkey).unwrap());
//! let opened = groupsig::open(&sig, &mgrkey, &grpkey, &gml, &mut rng)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(opened.id.index, 0);
//! ```

/// Registry entry points dispatching on the scheme of their arguments.
pub mod api;

/// Certificate revocation list and trapdoors.
pub mod crl;

/// The crate's error type and tri-state outcome conventions.
pub mod error;

/// Group membership list.
pub mod gml;

mod join;

/// Opaque message container with base64 and JSON-composite helpers.
pub mod msg;

/// Scheme and key-role code registries.
pub mod scheme;

/// The per-scheme protocol engines.
pub mod schemes;

/// Process-level randomness handle.
pub mod sysenv;

/// Polymorphic object containers.
pub mod types;

/// The tag-length-value wire discipline shared by every object.
pub mod wire;

pub use api::*;
pub use crl::{Crl, CrlEntry, Trapdoor};
pub use error::{Error, Result};
pub use gml::{Gml, GmlEntry};
pub use msg::Message;
pub use scheme::{KeyType, SchemeCode};
pub use sysenv::Sysenv;
pub use types::{
    BlindSignature, BlindingKey, GroupKey, Identity, ManagerKey, MemberKey, Opening, Proof,
    Signature,
};
