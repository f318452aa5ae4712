//! Cryptographic collaborators for the hhe-bench harness
//!
//! This crate is the capability surface the benchmark roles call into: the
//! Kreyvium stream cipher (evaluated in the clear by the client and
//! homomorphically by the server), bit-level TFHE encryption and decryption,
//! the ciphertext vector codec shared by spools and the wire, and the key
//! store.
//!
//! The Kreyvium state machine is generic over a bit algebra, so its clear
//! and homomorphic evaluations are one implementation - the property the
//! whole transciphering pipeline rests on.

pub mod bit;
pub mod codec;
pub mod error;
pub mod keystore;
pub mod kreyvium;
pub mod mock;
pub mod tfhe;

pub use bit::{BitAlgebra, ClearBits, TfheBits};
pub use codec::{append_ciphertexts, TfheCodec, TfheSpoolReader};
pub use error::{CipherError, CipherResult};
pub use kreyvium::{Kreyvium, KreyviumState, FIXED_IV, KEY_BYTES};
pub use mock::ClearTranscipher;
pub use self::tfhe::{
    KreyviumTfhe, TfheCtVec, TfheDecryptor, TfheEncryptor, TfheSecretKeySet, Transcipher,
};
