//! Group membership list.
//!
//! Append-only record the opener consults to identify signers. Indices are
//! assigned on insertion and never reused; removal leaves a tombstone so
//! later entries keep their identity. Not thread-safe; callers serialize
//! writes.

use crate::error::{Error, Result};
use crate::scheme::SchemeCode;
use crate::wire::{FieldReader, FieldWriter};
use groupsig_core::curve::bls12381::{G1, G2};

/// Per-member tuple required for opening.
#[derive(Clone, Debug, PartialEq)]
pub enum GmlEntry {
    /// The member's tracing point `A`.
    Bbs04 { id: u64, a: G1 },
    /// An opener-independent tag `τ̃ = g̃^{sk·y}`.
    Ps16 { id: u64, ttau: G2 },
    /// Tag plus the opener-keyed binding pair `(SS1, SS2)`.
    Klap20 {
        id: u64,
        ttau: G2,
        ss1: G2,
        ss2: G2,
    },
}

impl GmlEntry {
    pub fn scheme(&self) -> SchemeCode {
        match self {
            GmlEntry::Bbs04 { .. } => SchemeCode::Bbs04,
            GmlEntry::Ps16 { .. } => SchemeCode::Ps16,
            GmlEntry::Klap20 { .. } => SchemeCode::Klap20,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            GmlEntry::Bbs04 { id, .. }
            | GmlEntry::Ps16 { id, .. }
            | GmlEntry::Klap20 { id, .. } => *id,
        }
    }

    fn write(&self, w: &mut FieldWriter) {
        match self {
            GmlEntry::Bbs04 { id, a } => {
                w.put_u64(*id);
                w.put_elem(a);
            }
            GmlEntry::Ps16 { id, ttau } => {
                w.put_u64(*id);
                w.put_elem(ttau);
            }
            GmlEntry::Klap20 { id, ttau, ss1, ss2 } => {
                w.put_u64(*id);
                w.put_elem(ttau);
                w.put_elem(ss1);
                w.put_elem(ss2);
            }
        }
    }

    fn read(scheme: SchemeCode, r: &mut FieldReader) -> Result<Self> {
        match scheme {
            SchemeCode::Bbs04 => Ok(GmlEntry::Bbs04 {
                id: r.take_u64()?,
                a: r.take_elem()?,
            }),
            SchemeCode::Ps16 => Ok(GmlEntry::Ps16 {
                id: r.take_u64()?,
                ttau: r.take_elem()?,
            }),
            SchemeCode::Klap20 => Ok(GmlEntry::Klap20 {
                id: r.take_u64()?,
                ttau: r.take_elem()?,
                ss1: r.take_elem()?,
                ss2: r.take_elem()?,
            }),
            other => Err(Error::Unsupported {
                scheme: other,
                op: "gml",
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Gml {
    scheme: SchemeCode,
    entries: Vec<Option<GmlEntry>>,
}

impl Gml {
    pub fn new(scheme: SchemeCode) -> Self {
        Self {
            scheme,
            entries: Vec::new(),
        }
    }

    pub fn scheme(&self) -> SchemeCode {
        self.scheme
    }

    /// Number of slots, tombstones included. The next insertion gets this
    /// value as its index.
    pub fn len(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an entry, returning its index. The entry must carry the next
    /// free index and match the list's scheme.
    pub fn insert(&mut self, entry: GmlEntry) -> Result<u64> {
        if entry.scheme() != self.scheme {
            return Err(Error::SchemeMismatch {
                expected: self.scheme,
                got: entry.scheme(),
            });
        }
        let index = self.len();
        if entry.id() != index {
            return Err(Error::UnknownIdentity(entry.id()));
        }
        self.entries.push(Some(entry));
        Ok(index)
    }

    /// Returns the live entry at `index`, if any.
    pub fn get(&self, index: u64) -> Option<&GmlEntry> {
        self.entries.get(index as usize).and_then(|e| e.as_ref())
    }

    /// Tombstones the slot. The index is never reused.
    pub fn remove(&mut self, index: u64) -> Result<()> {
        match self.entries.get_mut(index as usize) {
            Some(slot @ Some(_)) => {
                *slot = None;
                Ok(())
            }
            _ => Err(Error::UnknownIdentity(index)),
        }
    }

    /// Iterates over live entries.
    pub fn iter(&self) -> impl Iterator<Item = &GmlEntry> {
        self.entries.iter().flatten()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        w.put_tag(self.scheme.code());
        w.put_u64(self.len());
        for slot in &self.entries {
            match slot {
                Some(entry) => {
                    let mut ew = FieldWriter::new();
                    entry.write(&mut ew);
                    w.put_bytes(&ew.finish());
                }
                // tombstones survive the round-trip as empty blocks
                None => w.put_bytes(&[]),
            }
        }
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = FieldReader::new(bytes);
        let scheme = SchemeCode::from_code(r.take_tag()?)?;
        let n = r.take_u64()?;
        let mut entries = Vec::with_capacity(n as usize);
        for _ in 0..n {
            let block = r.take_bytes()?;
            if block.is_empty() {
                entries.push(None);
                continue;
            }
            let mut er = FieldReader::new(block);
            let entry = GmlEntry::read(scheme, &mut er)?;
            er.finish()?;
            entries.push(Some(entry));
        }
        r.finish()?;
        Ok(Self { scheme, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groupsig_core::group::Element;

    #[test]
    fn insert_get_remove() {
        let rng = &mut rand::thread_rng();
        let mut gml = Gml::new(SchemeCode::Bbs04);

        let a0 = G1::rand(rng);
        let a1 = G1::rand(rng);
        assert_eq!(gml.insert(GmlEntry::Bbs04 { id: 0, a: a0 }).unwrap(), 0);
        assert_eq!(gml.insert(GmlEntry::Bbs04 { id: 1, a: a1 }).unwrap(), 1);

        assert!(gml.get(0).is_some());
        gml.remove(0).unwrap();
        assert!(gml.get(0).is_none());
        assert!(gml.remove(0).is_err());

        // indices are not reused
        assert_eq!(gml.len(), 2);
        let a2 = G1::rand(rng);
        assert_eq!(gml.insert(GmlEntry::Bbs04 { id: 2, a: a2 }).unwrap(), 2);
        assert_eq!(gml.iter().count(), 2);
    }

    #[test]
    fn scheme_mismatch_rejected() {
        let rng = &mut rand::thread_rng();
        let mut gml = Gml::new(SchemeCode::Ps16);
        let res = gml.insert(GmlEntry::Bbs04 {
            id: 0,
            a: G1::rand(rng),
        });
        assert!(matches!(res, Err(Error::SchemeMismatch { .. })));
    }

    #[test]
    fn wire_roundtrip_with_tombstones() {
        let rng = &mut rand::thread_rng();
        let mut gml = Gml::new(SchemeCode::Klap20);
        for id in 0..3 {
            gml.insert(GmlEntry::Klap20 {
                id,
                ttau: G2::rand(rng),
                ss1: G2::rand(rng),
                ss2: G2::rand(rng),
            })
            .unwrap();
        }
        gml.remove(1).unwrap();

        let bytes = gml.to_bytes();
        let back = Gml::from_bytes(&bytes).unwrap();
        assert_eq!(back, gml);
        assert!(back.get(1).is_none());
        assert!(back.get(2).is_some());
    }
}
