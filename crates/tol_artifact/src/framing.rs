//! The `string`/`lenbytes` framing primitives shared by the TOC and TOR
//! binary codecs (`spec.md` §4.7: "`string` = u16-length-prefixed UTF-8.
//! `lenbytes` = u32-length-prefixed").
//!
//! This is the same counting convention `tol_codegen`'s internal
//! bytecode wire format uses, duplicated rather than shared through a
//! new crate — each format's framing helpers stay next to the format
//! they serve.

use crate::error::ArtifactError;

pub fn write_string(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u16).to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
}

pub fn write_lenbytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    buf.extend_from_slice(bytes);
}

pub struct Reader<'b> {
    bytes: &'b [u8],
    pos: usize,
    kind: &'static str,
}

impl<'b> Reader<'b> {
    pub fn new(bytes: &'b [u8], kind: &'static str) -> Self {
        Self { bytes, pos: 0, kind }
    }

    pub fn take(&mut self, n: usize) -> Result<&'b [u8], ArtifactError> {
        if self.bytes.len() - self.pos < n {
            return Err(ArtifactError::Truncated { kind: self.kind, offset: self.pos, expected: n });
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn u16(&mut self) -> Result<u16, ArtifactError> {
        Ok(u16::from_be_bytes(self.take(2)?.try_into().unwrap()))
    }

    pub fn u32(&mut self) -> Result<u32, ArtifactError> {
        Ok(u32::from_be_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn string(&mut self, what: &'static str) -> Result<String, ArtifactError> {
        let len = self.u16()? as usize;
        String::from_utf8(self.take(len)?.to_vec()).map_err(|_| ArtifactError::InvalidUtf8(what))
    }

    pub fn lenbytes(&mut self) -> Result<Vec<u8>, ArtifactError> {
        let len = self.u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    pub fn at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }
}
