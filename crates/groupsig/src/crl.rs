//! Certificate revocation list.
//!
//! A list of `(identity, trapdoor)` pairs. A trapdoor lets its holder
//! recognize the corresponding member's signatures; publishing one revokes
//! the member. Of the implemented schemes only BBS04 exposes a usable
//! trapdoor (its tracing point), so the list is keyed the same way as the
//! GML and consulted by `trace`.

use crate::error::{Error, Result};
use crate::scheme::SchemeCode;
use crate::wire::{FieldReader, FieldWriter};
use groupsig_core::curve::bls12381::G1;

/// Scheme-specific opening trapdoor.
#[derive(Clone, Debug, PartialEq)]
pub enum Trapdoor {
    /// The BBS04 tracing point `A` of a member.
    Bbs04(G1),
}

impl Trapdoor {
    pub fn scheme(&self) -> SchemeCode {
        match self {
            Trapdoor::Bbs04(_) => SchemeCode::Bbs04,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(self.scheme().code());
        match self {
            Trapdoor::Bbs04(a) => w.put_elem(a),
        }
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = FieldReader::new(bytes);
        let scheme = SchemeCode::from_code(r.take_tag()?)?;
        let td = match scheme {
            SchemeCode::Bbs04 => Trapdoor::Bbs04(r.take_elem()?),
            other => {
                return Err(Error::Unsupported {
                    scheme: other,
                    op: "trapdoor",
                })
            }
        };
        r.finish()?;
        Ok(td)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CrlEntry {
    pub id: u64,
    pub trapdoor: Trapdoor,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Crl {
    scheme: SchemeCode,
    entries: Vec<CrlEntry>,
}

impl Crl {
    pub fn new(scheme: SchemeCode) -> Self {
        Self {
            scheme,
            entries: Vec::new(),
        }
    }

    pub fn scheme(&self) -> SchemeCode {
        self.scheme
    }

    pub fn len(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an entry, returning its position in the list.
    pub fn insert(&mut self, entry: CrlEntry) -> Result<u64> {
        if entry.trapdoor.scheme() != self.scheme {
            return Err(Error::SchemeMismatch {
                expected: self.scheme,
                got: entry.trapdoor.scheme(),
            });
        }
        self.entries.push(entry);
        Ok(self.len() - 1)
    }

    pub fn get(&self, index: u64) -> Option<&CrlEntry> {
        self.entries.get(index as usize)
    }

    /// Whether the member identity already appears in the list.
    pub fn contains_id(&self, id: u64) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CrlEntry> {
        self.entries.iter()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(self.scheme.code());
        w.put_u64(self.len());
        for entry in &self.entries {
            let mut ew = FieldWriter::new();
            ew.put_u64(entry.id);
            ew.put_bytes(&entry.trapdoor.to_bytes());
            w.put_bytes(&ew.finish());
        }
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = FieldReader::new(bytes);
        let scheme = SchemeCode::from_code(r.take_tag()?)?;
        let n = r.take_u64()?;
        let mut crl = Self::new(scheme);
        for _ in 0..n {
            let block = r.take_bytes()?;
            let mut er = FieldReader::new(block);
            let id = er.take_u64()?;
            let trapdoor = Trapdoor::from_bytes(er.take_bytes()?)?;
            er.finish()?;
            crl.insert(CrlEntry { id, trapdoor })?;
        }
        r.finish()?;
        Ok(crl)
    }
}
