//! Kreyvium stream cipher
//!
//! Kreyvium extends Trivium to 128-bit key and IV by adding two rotating
//! auxiliary registers whose active bits feed the keystream and the first
//! feedback tap each clock. The state machine below is generic over the
//! [`BitAlgebra`], so the clear cipher and its homomorphic evaluation run the
//! exact same register schedule.
//!
//! Register layout (1-based positions as in the cipher definition):
//! - Register 1: s1..s93, loaded from K1..K93
//! - Register 2: s94..s177, loaded from IV1..IV84
//! - Register 3: s178..s288, loaded from IV85..IV128, then 66 ones and a zero
//! - K* / IV*: the full 128-bit key and IV, consumed cyclically

use std::collections::VecDeque;

use crate::bit::{bytes_to_bits, BitAlgebra, ClearBits};
use crate::error::{CipherError, CipherResult};

pub const KEY_BYTES: usize = 16;
pub const KEY_BITS: usize = 128;
pub const IV_BYTES: usize = 16;
pub const IV_BITS: usize = 128;

/// Public IV used for every record. Both ends restart the keystream per
/// record, which keeps the client encryptor and the server transcipher
/// stateless and in lockstep.
pub const FIXED_IV: [u8; IV_BYTES] = [0u8; IV_BYTES];

/// Clocks discarded before the first keystream bit (4 x 288).
const WARMUP_CLOCKS: usize = 1152;

/// Kreyvium register state over an arbitrary bit algebra.
pub struct KreyviumState<A: BitAlgebra> {
    reg1: VecDeque<A::Bit>,
    reg2: VecDeque<A::Bit>,
    reg3: VecDeque<A::Bit>,
    key_reg: VecDeque<A::Bit>,
    iv_reg: VecDeque<A::Bit>,
}

impl<A: BitAlgebra> KreyviumState<A> {
    /// Loads the registers and runs the warm-up clocks.
    ///
    /// `key` and `iv` are 128 bits each, first bit first.
    pub fn new(algebra: &A, key: &[A::Bit], iv: &[A::Bit]) -> Self {
        assert_eq!(key.len(), KEY_BITS, "key must be {KEY_BITS} bits");
        assert_eq!(iv.len(), IV_BITS, "iv must be {IV_BITS} bits");

        let reg1: VecDeque<A::Bit> = key[..93].iter().cloned().collect();
        let reg2: VecDeque<A::Bit> = iv[..84].iter().cloned().collect();
        let mut reg3: VecDeque<A::Bit> = iv[84..].iter().cloned().collect();
        for _ in 0..66 {
            reg3.push_back(algebra.constant(true));
        }
        reg3.push_back(algebra.constant(false));

        // auxiliary registers hold the key/IV reversed; the active bit sits
        // at the front and rotates to the back each clock
        let key_reg: VecDeque<A::Bit> = key.iter().rev().cloned().collect();
        let iv_reg: VecDeque<A::Bit> = iv.iter().rev().cloned().collect();

        let mut state = Self {
            reg1,
            reg2,
            reg3,
            key_reg,
            iv_reg,
        };
        for _ in 0..WARMUP_CLOCKS {
            state.clock(algebra);
        }
        state
    }

    /// Advances the state by one clock and returns the keystream bit.
    pub fn clock(&mut self, algebra: &A) -> A::Bit {
        // s66+s93, s162+s177, s243+s288+K*
        let t1 = algebra.xor(&self.reg1[65], &self.reg1[92]);
        let t2 = algebra.xor(&self.reg2[68], &self.reg2[83]);
        let t3 = {
            let taps = algebra.xor(&self.reg3[65], &self.reg3[110]);
            algebra.xor(&taps, &self.key_reg[0])
        };

        let z = algebra.xor(&algebra.xor(&t1, &t2), &t3);

        // feedback: t1 + s91*s92 + s171 + IV*  -> register 2
        //           t2 + s175*s176 + s264      -> register 3
        //           t3 + s286*s287 + s69       -> register 1
        let f2 = {
            let and = algebra.and(&self.reg1[90], &self.reg1[91]);
            let acc = algebra.xor(&t1, &and);
            let acc = algebra.xor(&acc, &self.reg2[77]);
            algebra.xor(&acc, &self.iv_reg[0])
        };
        let f3 = {
            let and = algebra.and(&self.reg2[81], &self.reg2[82]);
            let acc = algebra.xor(&t2, &and);
            algebra.xor(&acc, &self.reg3[86])
        };
        let f1 = {
            let and = algebra.and(&self.reg3[108], &self.reg3[109]);
            let acc = algebra.xor(&t3, &and);
            algebra.xor(&acc, &self.reg1[68])
        };

        self.reg1.pop_back();
        self.reg1.push_front(f1);
        self.reg2.pop_back();
        self.reg2.push_front(f2);
        self.reg3.pop_back();
        self.reg3.push_front(f3);

        self.key_reg.rotate_left(1);
        self.iv_reg.rotate_left(1);

        z
    }

    /// Produces the next `n` keystream bits.
    pub fn keystream(&mut self, algebra: &A, n: usize) -> Vec<A::Bit> {
        (0..n).map(|_| self.clock(algebra)).collect()
    }
}

/// Clear Kreyvium instance bound to one key.
pub struct Kreyvium {
    key_bits: Vec<bool>,
}

impl Kreyvium {
    pub fn new(key: &[u8]) -> CipherResult<Self> {
        if key.len() != KEY_BYTES {
            return Err(CipherError::KeyLoad(format!(
                "Kreyvium key must be {KEY_BYTES} bytes, got {}",
                key.len()
            )));
        }
        Ok(Self {
            key_bits: bytes_to_bits(key),
        })
    }

    /// Keystream for one record, restarted from [`FIXED_IV`].
    pub fn keystream(&self, bits: usize) -> Vec<bool> {
        let algebra = ClearBits;
        let iv = bytes_to_bits(&FIXED_IV);
        let mut state = KreyviumState::new(&algebra, &self.key_bits, &iv);
        state.keystream(&algebra, bits)
    }

    /// Encrypts a block into one ciphertext byte per plaintext bit (0 or 1),
    /// most significant bit of each byte first.
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        let bits = bytes_to_bits(plaintext);
        let keystream = self.keystream(bits.len());
        bits.iter()
            .zip(&keystream)
            .map(|(p, k)| (p ^ k) as u8)
            .collect()
    }

    /// Inverse of [`encrypt`](Self::encrypt): bit-per-byte ciphertext back to
    /// the packed plaintext block.
    pub fn decrypt(&self, ciphertext: &[u8]) -> CipherResult<Vec<u8>> {
        if ciphertext.len() % 8 != 0 {
            return Err(CipherError::Codec(format!(
                "ciphertext bit count {} is not byte aligned",
                ciphertext.len()
            )));
        }
        let keystream = self.keystream(ciphertext.len());
        let bits: Vec<bool> = ciphertext
            .iter()
            .zip(&keystream)
            .map(|(&c, k)| (c != 0) ^ k)
            .collect();
        Ok(crate::bit::bits_to_bytes(&bits))
    }
}
