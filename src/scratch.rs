//! Per-call transfer buffers
//!
//! Every transfer works on its own heap buffer: the caller's bytes are copied
//! in, the transport reads or writes the copy, and the copy is wiped and freed
//! when the buffer goes out of scope. Buffers are never pooled, so nothing
//! from one transaction can surface in another.

use crate::error::ProtocolError;

pub(crate) struct ScratchBuffer {
    buf: Vec<u8>,
}

impl ScratchBuffer {
    /// Zero-filled buffer of `len` bytes
    pub(crate) fn zeroed(len: usize) -> Result<Self, ProtocolError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)?;
        buf.resize(len, 0);
        Ok(Self { buf })
    }

    /// Buffer holding a copy of `data`
    pub(crate) fn duplicate(data: &[u8]) -> Result<Self, ProtocolError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(data.len())?;
        buf.extend_from_slice(data);
        Ok(Self { buf })
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl Drop for ScratchBuffer {
    fn drop(&mut self) {
        self.buf.fill(0);
    }
}
