//! TFHE key material and the crypto collaborators built on it
//!
//! One gate-bootstrapping ciphertext encrypts one bit; an encrypted integer
//! is the vector of its bit ciphertexts, most significant bit of each byte
//! first. The client key encrypts and decrypts, the server (cloud) key
//! evaluates gates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tfhe::boolean::ciphertext::Ciphertext;
use tfhe::boolean::client_key::ClientKey;
use tfhe::boolean::parameters::BooleanParameters;
use tfhe::boolean::server_key::ServerKey;

use crate::bit::{bits_to_bytes, bytes_to_bits, BitAlgebra, TfheBits};
use crate::error::{CipherError, CipherResult};
use crate::kreyvium::{KreyviumState, FIXED_IV, KEY_BYTES};

/// An encrypted integer: one gate-bootstrapping ciphertext per plaintext bit.
pub type TfheCtVec = Vec<Ciphertext>;

/// The full secret key set as persisted by the key store: the client key and
/// the cloud (evaluation) key derived from it.
#[derive(Serialize, Deserialize)]
pub struct TfheSecretKeySet {
    pub client: ClientKey,
    pub server: ServerKey,
}

impl TfheSecretKeySet {
    pub fn generate(params: &BooleanParameters) -> Self {
        let client = ClientKey::new(params);
        let server = ServerKey::new(&client);
        Self { client, server }
    }
}

/// Bit-level TFHE encryptor for the direct (HE) pipeline.
pub struct TfheEncryptor {
    client: Arc<ClientKey>,
}

impl TfheEncryptor {
    pub fn new(client: Arc<ClientKey>) -> Self {
        Self { client }
    }

    pub fn encrypt(&self, block: &[u8]) -> TfheCtVec {
        bytes_to_bits(block)
            .into_iter()
            .map(|bit| self.client.encrypt(bit))
            .collect()
    }
}

/// Bit-level TFHE decryptor used by the trusted third party for both
/// pipelines (a transciphered record decrypts exactly like a directly
/// encrypted one).
pub struct TfheDecryptor {
    client: Arc<ClientKey>,
}

impl TfheDecryptor {
    pub fn new(client: Arc<ClientKey>) -> Self {
        Self { client }
    }

    pub fn decrypt_block(&self, ciphertexts: &TfheCtVec) -> CipherResult<Vec<u8>> {
        if ciphertexts.len() % 8 != 0 {
            return Err(CipherError::Codec(format!(
                "ciphertext bit count {} is not byte aligned",
                ciphertexts.len()
            )));
        }
        let bits: Vec<bool> = ciphertexts
            .iter()
            .map(|ct| self.client.decrypt(ct))
            .collect();
        Ok(bits_to_bytes(&bits))
    }
}

/// Converts a stream-cipher ciphertext (one byte per bit) into TFHE
/// encryptions of the underlying plaintext bits, without access to the
/// plaintext.
pub trait Transcipher: Send {
    fn transcipher(&self, stream_ct: &[u8]) -> CipherResult<TfheCtVec>;
}

/// The Kreyvium-to-TFHE transcipher.
///
/// Holds the Kreyvium key encrypted bit-by-bit under TFHE and evaluates the
/// keystream homomorphically with the cloud key; XORing the public ciphertext
/// bits (as trivial ciphertexts) into the encrypted keystream yields TFHE
/// encryptions of the plaintext bits.
pub struct KreyviumTfhe {
    server: Arc<ServerKey>,
    encrypted_key: Vec<Ciphertext>,
}

impl KreyviumTfhe {
    /// Encrypts every Kreyvium key bit under the client key. This is the
    /// expensive one-off step of server initialisation.
    pub fn new(
        kreyvium_key: &[u8],
        client: &ClientKey,
        server: Arc<ServerKey>,
    ) -> CipherResult<Self> {
        if kreyvium_key.len() != KEY_BYTES {
            return Err(CipherError::KeyLoad(format!(
                "Kreyvium key must be {KEY_BYTES} bytes, got {}",
                kreyvium_key.len()
            )));
        }
        let encrypted_key = bytes_to_bits(kreyvium_key)
            .into_iter()
            .map(|bit| client.encrypt(bit))
            .collect();
        Ok(Self {
            server,
            encrypted_key,
        })
    }
}

impl Transcipher for KreyviumTfhe {
    fn transcipher(&self, stream_ct: &[u8]) -> CipherResult<TfheCtVec> {
        let algebra = TfheBits::new(&self.server);
        let iv: Vec<Ciphertext> = bytes_to_bits(&FIXED_IV)
            .into_iter()
            .map(|bit| algebra.constant(bit))
            .collect();

        let mut state = KreyviumState::new(&algebra, &self.encrypted_key, &iv);
        let keystream = state.keystream(&algebra, stream_ct.len());

        Ok(stream_ct
            .iter()
            .zip(&keystream)
            .map(|(&ct_byte, keystream_bit)| {
                let ct_bit = algebra.constant(ct_byte != 0);
                algebra.xor(keystream_bit, &ct_bit)
            })
            .collect())
    }
}
