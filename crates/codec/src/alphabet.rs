//! Symbol set and the reverse lookup used by the decoder.

/// The 85 symbols in digit order: `ALPHABET[d]` encodes digit `d`.
pub const ALPHABET: &[u8; 85] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz!#$%&()*+-;<=>?@^_`{|}~";

/// Terminates a stream. Not part of the alphabet.
pub const SENTINEL: u8 = b']';

/// Inert filler accepted in front of any group.
pub const PAD: u8 = 0;

/// Symbols per group.
pub const GROUP_SYMBOLS: usize = 5;

/// Decoded bytes per group.
pub const GROUP_BYTES: usize = 4;

const RADIX: u8 = 85;
const NOT_A_DIGIT: u8 = u8::MAX;

/// Symbol-to-digit lookup over all 256 byte values.
///
/// Bytes outside the alphabet map to "no digit", so the decoder can reject
/// them instead of reading garbage the way an uninitialised C table would.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeTable {
    digits: [u8; 256],
}

impl DecodeTable {
    pub const fn new() -> Self {
        let mut digits = [NOT_A_DIGIT; 256];
        let mut digit = 0;
        while digit < RADIX {
            digits[ALPHABET[digit as usize] as usize] = digit;
            digit += 1;
        }
        Self { digits }
    }

    /// Digit value `0..85` of `symbol`, or `None` if it is not an alphabet symbol.
    #[inline]
    pub fn digit(&self, symbol: u8) -> Option<u8> {
        match self.digits[symbol as usize] {
            NOT_A_DIGIT => None,
            digit => Some(digit),
        }
    }
}

impl Default for DecodeTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Lookup table evaluated at compile time and shared by every decode call.
pub static DECODE_TABLE: DecodeTable = DecodeTable::new();
