//! The tag-length-value field stream every object serializes through.
//!
//! Format: each field is a 4-byte little-endian length followed by that many
//! bytes. A zero length encodes an absent field; importers rebuild the
//! absent state rather than a default element. Fixed-size elements must
//! carry exactly their canonical length. Importers consume the entire
//! buffer; trailing bytes are an error.

use groupsig_core::group::{Element, EncodingError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("buffer truncated ({need} more bytes needed)")]
    Truncated { need: usize },

    #[error("{0} trailing bytes after the last field")]
    Trailing(usize),

    #[error("field length {got} does not match canonical size {want}")]
    BadLength { want: usize, got: usize },

    #[error("a required field is absent")]
    AbsentField,

    #[error(transparent)]
    Element(#[from] EncodingError),
}

/// Serializes a sequence of length-prefixed fields.
#[derive(Debug, Default)]
pub struct FieldWriter {
    buf: Vec<u8>,
}

impl FieldWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Writes a raw byte with no length prefix (scheme and key-type tags).
    pub fn put_tag(&mut self, b: u8) {
        self.buf.push(b);
    }

    /// Writes a length-prefixed byte block.
    pub fn put_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
        self.buf.extend_from_slice(data);
    }

    /// Writes an element as a length-prefixed canonical encoding.
    pub fn put_elem<E: Element>(&mut self, e: &E) {
        self.put_bytes(&e.marshal());
    }

    /// Writes an optional element; `None` becomes a zero-length field.
    pub fn put_opt_elem<E: Element>(&mut self, e: Option<&E>) {
        match e {
            Some(e) => self.put_elem(e),
            None => self.put_bytes(&[]),
        }
    }

    /// Writes a u64 as a length-prefixed 8-byte little-endian field.
    pub fn put_u64(&mut self, v: u64) {
        self.put_bytes(&v.to_le_bytes());
    }

    /// Writes an optional u64; `None` becomes a zero-length field.
    pub fn put_opt_u64(&mut self, v: Option<u64>) {
        match v {
            Some(v) => self.put_u64(v),
            None => self.put_bytes(&[]),
        }
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Parses a sequence of length-prefixed fields.
#[derive(Debug)]
pub struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Reads a raw tag byte (no length prefix).
    pub fn take_tag(&mut self) -> Result<u8, WireError> {
        if self.pos >= self.buf.len() {
            return Err(WireError::Truncated { need: 1 });
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(b)
    }

    fn take_block(&mut self) -> Result<&'a [u8], WireError> {
        if self.buf.len() - self.pos < 4 {
            return Err(WireError::Truncated {
                need: 4 - (self.buf.len() - self.pos),
            });
        }
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&self.buf[self.pos..self.pos + 4]);
        let len = u32::from_le_bytes(len_bytes) as usize;
        self.pos += 4;

        if self.buf.len() - self.pos < len {
            return Err(WireError::Truncated {
                need: len - (self.buf.len() - self.pos),
            });
        }
        let block = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(block)
    }

    /// Reads a length-prefixed byte block.
    pub fn take_bytes(&mut self) -> Result<&'a [u8], WireError> {
        self.take_block()
    }

    /// Reads a required element field.
    pub fn take_elem<E: Element>(&mut self) -> Result<E, WireError> {
        match self.take_opt_elem()? {
            Some(e) => Ok(e),
            None => Err(WireError::AbsentField),
        }
    }

    /// Reads an optional element field; zero length yields `None`.
    pub fn take_opt_elem<E: Element>(&mut self) -> Result<Option<E>, WireError> {
        let block = self.take_block()?;
        if block.is_empty() {
            return Ok(None);
        }
        if block.len() != E::marshal_len() {
            return Err(WireError::BadLength {
                want: E::marshal_len(),
                got: block.len(),
            });
        }
        let mut e = E::new();
        e.unmarshal(block)?;
        Ok(Some(e))
    }

    /// Reads a required 8-byte little-endian u64 field.
    pub fn take_u64(&mut self) -> Result<u64, WireError> {
        match self.take_opt_u64()? {
            Some(v) => Ok(v),
            None => Err(WireError::AbsentField),
        }
    }

    /// Reads an optional u64 field; zero length yields `None`.
    pub fn take_opt_u64(&mut self) -> Result<Option<u64>, WireError> {
        let block = self.take_block()?;
        if block.is_empty() {
            return Ok(None);
        }
        if block.len() != 8 {
            return Err(WireError::BadLength {
                want: 8,
                got: block.len(),
            });
        }
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(block);
        Ok(Some(u64::from_le_bytes(bytes)))
    }

    /// Asserts that the buffer was consumed exactly.
    pub fn finish(&self) -> Result<(), WireError> {
        let left = self.buf.len() - self.pos;
        if left != 0 {
            return Err(WireError::Trailing(left));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groupsig_core::curve::bls12381::{Scalar, G1};
    use groupsig_core::group::Element;
    use proptest::prelude::*;

    #[test]
    fn element_roundtrip() {
        let rng = &mut rand::thread_rng();
        let p = G1::rand(rng);
        let x = Scalar::rand(rng);

        let mut w = FieldWriter::new();
        w.put_tag(4);
        w.put_elem(&p);
        w.put_opt_elem::<Scalar>(None);
        w.put_elem(&x);
        w.put_u64(77);
        let bytes = w.finish();

        let mut r = FieldReader::new(&bytes);
        assert_eq!(r.take_tag().unwrap(), 4);
        assert_eq!(r.take_elem::<G1>().unwrap(), p);
        assert!(r.take_opt_elem::<Scalar>().unwrap().is_none());
        assert_eq!(r.take_elem::<Scalar>().unwrap(), x);
        assert_eq!(r.take_u64().unwrap(), 77);
        r.finish().unwrap();
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut w = FieldWriter::new();
        w.put_u64(1);
        let mut bytes = w.finish();
        bytes.push(0);

        let mut r = FieldReader::new(&bytes);
        r.take_u64().unwrap();
        assert!(matches!(r.finish(), Err(WireError::Trailing(1))));
    }

    #[test]
    fn truncated_length_rejected() {
        let mut w = FieldWriter::new();
        w.put_bytes(&[1, 2, 3]);
        let bytes = w.finish();

        // claim 3 bytes but provide 2
        let mut r = FieldReader::new(&bytes[..bytes.len() - 1]);
        assert!(matches!(
            r.take_bytes(),
            Err(WireError::Truncated { .. })
        ));
    }

    #[test]
    fn wrong_canonical_size_rejected() {
        let mut w = FieldWriter::new();
        w.put_bytes(&[0u8; 7]);
        let bytes = w.finish();
        let mut r = FieldReader::new(&bytes);
        assert!(matches!(r.take_u64(), Err(WireError::BadLength { .. })));
    }

    proptest! {
        #[test]
        fn arbitrary_field_streams_roundtrip(fields in proptest::collection::vec(
            proptest::option::of(proptest::collection::vec(any::<u8>(), 1..64)),
            0..12,
        )) {
            let mut w = FieldWriter::new();
            for f in &fields {
                match f {
                    Some(data) => w.put_bytes(data),
                    None => w.put_bytes(&[]),
                }
            }
            let bytes = w.finish();

            let mut r = FieldReader::new(&bytes);
            for f in &fields {
                let block = r.take_bytes().unwrap();
                match f {
                    Some(data) => prop_assert_eq!(block, &data[..]),
                    None => prop_assert!(block.is_empty()),
                }
            }
            prop_assert!(r.finish().is_ok());
        }
    }
}
