//! Clear transcipher for testing
//!
//! NOT SECURE - holds the Kreyvium key in the clear, strips the stream
//! cipher directly and re-emits the plaintext bits as trivial ciphertexts.
//! Drives the exact same data plane as the homomorphic transcipher without
//! paying for bootstrapped gate evaluation.

use tfhe::boolean::ciphertext::Ciphertext;

use crate::error::CipherResult;
use crate::kreyvium::Kreyvium;
use crate::tfhe::{TfheCtVec, Transcipher};

pub struct ClearTranscipher {
    kreyvium: Kreyvium,
}

impl ClearTranscipher {
    pub fn new(kreyvium_key: &[u8]) -> CipherResult<Self> {
        Ok(Self {
            kreyvium: Kreyvium::new(kreyvium_key)?,
        })
    }
}

impl Transcipher for ClearTranscipher {
    fn transcipher(&self, stream_ct: &[u8]) -> CipherResult<TfheCtVec> {
        let keystream = self.kreyvium.keystream(stream_ct.len());
        Ok(stream_ct
            .iter()
            .zip(keystream)
            .map(|(&ct_byte, keystream_bit)| Ciphertext::Trivial((ct_byte != 0) ^ keystream_bit))
            .collect())
    }
}
