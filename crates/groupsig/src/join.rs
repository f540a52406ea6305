//! Framing for join-protocol messages.
//!
//! Messages are opaque to the transport but self-describing to the other
//! side: a scheme byte and a step byte precede the TLV payload, so a
//! message from a foreign scheme or replayed out of order is rejected
//! before any field is parsed. Step `k` of a scheme with `n` messages is
//! produced by the manager when `k` is even and by the member when odd;
//! the call consuming message `k` runs at step `k + 1`.

use crate::error::{Error, Result};
use crate::msg::Message;
use crate::scheme::SchemeCode;
use crate::wire::{FieldReader, FieldWriter};

/// Starts a message for the given step.
pub(crate) fn frame(scheme: SchemeCode, seq: u8) -> FieldWriter {
    let mut w = FieldWriter::new();
    w.put_tag(scheme.code());
    w.put_tag(seq);
    w
}

/// Opens an incoming message, checking its scheme and step tags.
pub(crate) fn open_frame<'a>(
    msg: &'a Message,
    scheme: SchemeCode,
    expect_seq: u8,
) -> Result<FieldReader<'a>> {
    let mut r = FieldReader::new(msg.as_bytes());
    let got = SchemeCode::from_code(r.take_tag()?)?;
    if got != scheme {
        return Err(Error::SchemeMismatch {
            expected: scheme,
            got,
        });
    }
    let seq = r.take_tag()?;
    if seq != expect_seq {
        return Err(Error::JoinStep {
            expected: expect_seq,
            got: seq,
        });
    }
    Ok(r)
}
