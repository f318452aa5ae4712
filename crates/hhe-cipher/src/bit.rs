//! Bit algebra shared by the clear and homomorphic cipher evaluations
//!
//! The Kreyvium state machine is written once, generically, over this
//! algebra. Instantiated with [`ClearBits`] it is the plain stream cipher;
//! instantiated with [`TfheBits`] the same code evaluates the keystream under
//! TFHE gate bootstrapping, which is what makes transciphering possible
//! without the two evaluations ever diverging.

use tfhe::boolean::ciphertext::Ciphertext;
use tfhe::boolean::server_key::{BinaryBooleanGates, ServerKey};

/// Boolean algebra over which the stream cipher is evaluated.
pub trait BitAlgebra {
    type Bit: Clone;

    fn constant(&self, value: bool) -> Self::Bit;
    fn xor(&self, a: &Self::Bit, b: &Self::Bit) -> Self::Bit;
    fn and(&self, a: &Self::Bit, b: &Self::Bit) -> Self::Bit;
}

/// Clear evaluation: bits are plain booleans.
pub struct ClearBits;

impl BitAlgebra for ClearBits {
    type Bit = bool;

    fn constant(&self, value: bool) -> bool {
        value
    }

    fn xor(&self, a: &bool, b: &bool) -> bool {
        a ^ b
    }

    fn and(&self, a: &bool, b: &bool) -> bool {
        *a && *b
    }
}

/// Homomorphic evaluation: bits are TFHE gate-bootstrapping ciphertexts and
/// every gate goes through the cloud key.
pub struct TfheBits<'a> {
    server_key: &'a ServerKey,
}

impl<'a> TfheBits<'a> {
    pub fn new(server_key: &'a ServerKey) -> Self {
        Self { server_key }
    }
}

impl BitAlgebra for TfheBits<'_> {
    type Bit = Ciphertext;

    fn constant(&self, value: bool) -> Ciphertext {
        self.server_key.trivial_encrypt(value)
    }

    fn xor(&self, a: &Ciphertext, b: &Ciphertext) -> Ciphertext {
        self.server_key.xor(a, b)
    }

    fn and(&self, a: &Ciphertext, b: &Ciphertext) -> Ciphertext {
        self.server_key.and(a, b)
    }
}

/// Unpacks bytes into bits, most significant bit of each byte first.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for byte in bytes {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1 == 1);
        }
    }
    bits
}

/// Packs bits back into bytes; the bit count must be byte aligned.
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    debug_assert_eq!(bits.len() % 8, 0);
    bits.chunks(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_packing_roundtrip() {
        let bytes = [0x00, 0xFF, 0x5A, 0xA5, 0x01, 0x80];
        assert_eq!(bits_to_bytes(&bytes_to_bits(&bytes)), bytes);
    }

    #[test]
    fn test_msb_first_order() {
        assert_eq!(
            bytes_to_bits(&[0b1000_0001]),
            [true, false, false, false, false, false, false, true]
        );
    }

    #[test]
    fn test_clear_algebra_gates() {
        let algebra = ClearBits;
        assert!(algebra.xor(&true, &false));
        assert!(!algebra.xor(&true, &true));
        assert!(algebra.and(&true, &true));
        assert!(!algebra.and(&true, &false));
        assert!(algebra.constant(true));
    }
}
