//! The closed sets of scheme and key-role codes carried on the wire.

use crate::error::Error;
use std::fmt;

/// Scheme identifier carried as the first byte of every polymorphic object.
///
/// The set is closed and the codes are stable; `Cpy06` and `Kty04` are
/// recognized so foreign objects fail cleanly, but no operation is
/// implemented for them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SchemeCode {
    Bbs04 = 1,
    Cpy06 = 2,
    Gl19 = 3,
    Ps16 = 4,
    Klap20 = 5,
    Dl21 = 6,
    Dl21Seq = 7,
    Kty04 = 8,
}

impl SchemeCode {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<Self, Error> {
        match code {
            1 => Ok(SchemeCode::Bbs04),
            2 => Ok(SchemeCode::Cpy06),
            3 => Ok(SchemeCode::Gl19),
            4 => Ok(SchemeCode::Ps16),
            5 => Ok(SchemeCode::Klap20),
            6 => Ok(SchemeCode::Dl21),
            7 => Ok(SchemeCode::Dl21Seq),
            8 => Ok(SchemeCode::Kty04),
            other => Err(Error::UnknownScheme(other)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SchemeCode::Bbs04 => "BBS04",
            SchemeCode::Cpy06 => "CPY06",
            SchemeCode::Gl19 => "GL19",
            SchemeCode::Ps16 => "PS16",
            SchemeCode::Klap20 => "KLAP20",
            SchemeCode::Dl21 => "DL21",
            SchemeCode::Dl21Seq => "DL21SEQ",
            SchemeCode::Kty04 => "KTY04",
        }
    }

    /// Whether the scheme keeps a group membership list for opening.
    pub fn has_gml(self) -> bool {
        matches!(
            self,
            SchemeCode::Bbs04 | SchemeCode::Ps16 | SchemeCode::Klap20 | SchemeCode::Kty04
        )
    }

    /// Whether opening yields a publicly checkable proof.
    pub fn has_open_proof(self) -> bool {
        matches!(self, SchemeCode::Ps16 | SchemeCode::Klap20)
    }

    /// Number of messages exchanged in the join protocol. Message 0 is
    /// always sent by the manager.
    pub fn join_seq(self) -> Result<u8, Error> {
        match self {
            SchemeCode::Bbs04 => Ok(1),
            SchemeCode::Ps16
            | SchemeCode::Klap20
            | SchemeCode::Gl19
            | SchemeCode::Dl21
            | SchemeCode::Dl21Seq => Ok(3),
            other => Err(Error::Unsupported {
                scheme: other,
                op: "join",
            }),
        }
    }
}

impl fmt::Display for SchemeCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key-role tag, the second byte of every serialized key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum KeyType {
    Group = 0,
    Manager = 1,
    Member = 2,
    Blinding = 3,
}

impl KeyType {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<Self, Error> {
        match code {
            0 => Ok(KeyType::Group),
            1 => Ok(KeyType::Manager),
            2 => Ok(KeyType::Member),
            3 => Ok(KeyType::Blinding),
            other => Err(Error::UnknownKeyType(other)),
        }
    }
}
