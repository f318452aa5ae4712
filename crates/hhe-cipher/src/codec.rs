//! TFHE ciphertext vector codec and the TFHE spool flavor
//!
//! Encoded layout: a 4-byte big-endian element count followed by the export
//! bytes of each ciphertext, contiguous. Exports use the crypto library's
//! serde stream form, so decoding consumes exactly one ciphertext's bytes per
//! element.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tfhe::boolean::ciphertext::Ciphertext;
use tfhe::boolean::parameters::BooleanParameters;

use hhe_wire::SpoolReader;

use crate::error::{CipherError, CipherResult};
use crate::tfhe::TfheCtVec;

/// Stateless codec bound to a TFHE parameter set handle.
///
/// The handle marks that a parameter set was loaded before ciphertexts flow;
/// imports themselves are self-describing and bind to it at use time.
#[derive(Clone)]
pub struct TfheCodec {
    params: Option<Arc<BooleanParameters>>,
}

impl TfheCodec {
    pub fn new(params: Arc<BooleanParameters>) -> Self {
        Self {
            params: Some(params),
        }
    }

    /// Codec with no parameter handle; any use reports
    /// [`CipherError::ParamsUnbound`].
    pub fn unbound() -> Self {
        Self { params: None }
    }

    fn ensure_bound(&self) -> CipherResult<&BooleanParameters> {
        self.params.as_deref().ok_or(CipherError::ParamsUnbound)
    }

    pub fn encode(&self, ciphertexts: &[Ciphertext]) -> CipherResult<Vec<u8>> {
        self.ensure_bound()?;
        let mut buf = Vec::new();
        buf.extend_from_slice(&(ciphertexts.len() as u32).to_be_bytes());
        for ct in ciphertexts {
            bincode::serialize_into(&mut buf, ct)
                .map_err(|e| CipherError::Codec(format!("ciphertext export failed: {e}")))?;
        }
        Ok(buf)
    }

    pub fn decode(&self, bytes: &[u8]) -> CipherResult<TfheCtVec> {
        self.ensure_bound()?;
        if bytes.len() < 4 {
            return Err(CipherError::Codec(
                "buffer too short for element count".to_string(),
            ));
        }
        let count = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);

        // a corrupt count could claim billions of elements; grow as imports
        // actually succeed instead of preallocating
        let mut reader = &bytes[4..];
        let mut ciphertexts = Vec::new();
        for index in 0..count {
            let ct: Ciphertext = bincode::deserialize_from(&mut reader).map_err(|e| {
                CipherError::Codec(format!("ciphertext import {index}/{count} failed: {e}"))
            })?;
            ciphertexts.push(ct);
        }
        Ok(ciphertexts)
    }
}

/// Appends one encoded ciphertext vector to the TFHE spool at `path`.
pub fn append_ciphertexts(
    path: &Path,
    ciphertexts: &TfheCtVec,
    codec: &TfheCodec,
) -> CipherResult<()> {
    let buf = codec.encode(ciphertexts)?;
    hhe_wire::append_frame(path, &buf)?;
    Ok(())
}

/// Sequential reader over a TFHE spool: byte frames decoded through the
/// codec. Length-prefix faults surface as frame corruption, decode faults as
/// codec failures.
pub struct TfheSpoolReader {
    inner: SpoolReader,
    codec: TfheCodec,
}

impl TfheSpoolReader {
    pub fn open(path: impl Into<PathBuf>, codec: TfheCodec) -> CipherResult<Self> {
        Ok(Self {
            inner: SpoolReader::open(path)?,
            codec,
        })
    }

    pub fn next(&mut self) -> CipherResult<Option<TfheCtVec>> {
        match self.inner.next()? {
            Some(buf) => Ok(Some(self.codec.decode(&buf)?)),
            None => Ok(None),
        }
    }

    pub fn reset(&mut self) -> CipherResult<()> {
        self.inner.reset()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        self.inner.path()
    }
}
