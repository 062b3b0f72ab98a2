// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! 256-bit literal encoding, backed by `ruint`'s `U256`.

use std::fmt;

use ruint::aliases::U256;

use crate::error::LowerError;

/// An integer literal's value, stored as sign and magnitude rather
/// than reduced into the EVM's unsigned word. This is the only
/// representation wide enough for the documented literal range
/// `[-2^255, 2^256)` — wider on both ends than a native `i128` and,
/// for negative values, wider than a plain signed 256-bit int. The
/// original front-end builds constants in exactly this range (e.g.
/// `2**160` address masks, `(2**128-1)*DECIMAL_DIVISOR` fixed-point
/// bounds) that an `i128` cannot represent at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal {
    negative: bool,
    magnitude: U256,
}

impl Literal {
    /// Construct a literal from an `i128`, the convenience path used
    /// by hand-written IR and small source literals.
    pub fn from_i128(value: i128) -> Literal {
        if value < 0 {
            Literal { negative: true, magnitude: U256::from(value.unsigned_abs()) }
        } else {
            Literal { negative: false, magnitude: U256::from(value as u128) }
        }
    }

    /// Construct a literal directly from sign and magnitude, for
    /// values too large to fit in an `i128`.
    pub fn from_parts(negative: bool, magnitude: U256) -> Literal {
        Literal { negative, magnitude }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn magnitude(&self) -> U256 {
        self.magnitude
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.negative && !self.magnitude.is_zero()
    }

    /// Convert to `u64`, for contexts (the `repeat` count, gas
    /// estimation's multiplier) that need a small non-negative
    /// integer rather than the full 256-bit value.
    pub fn to_u64(&self) -> Option<u64> {
        if self.negative {
            return None;
        }
        let be = self.magnitude.to_be_bytes::<32>();
        if be[..24].iter().any(|b| *b != 0) {
            return None;
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&be[24..32]);
        Some(u64::from_be_bytes(buf))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.magnitude)
        } else {
            write!(f, "{}", self.magnitude)
        }
    }
}

/// Largest magnitude a negative literal may carry: `2^255`, the
/// lower bound of the documented range `[-2^255, 2^256)`.
fn max_negative_magnitude() -> U256 {
    U256::from(1u8) << 255
}

/// Validate and reduce a literal into a 256-bit word, then emit its
/// minimal big-endian byte sequence (the empty sequence becomes a
/// single zero byte, matching the original compiler's
/// `num_to_bytearray(x) or [0]`).
pub fn encode_literal(value: &Literal) -> Result<Vec<u8>, LowerError> {
    let reduced = reduce(value);
    let be = reduced.to_be_bytes::<32>();
    let first_nonzero = be.iter().position(|b| *b != 0);
    match first_nonzero {
        Some(i) => Ok(be[i..].to_vec()),
        None => Ok(vec![0]),
    }
}

/// Reduce a literal modulo 2^256, matching Python's `x % 2**256`
/// (always non-negative) rather than Rust/C two's-complement
/// truncation semantics.
fn reduce(value: &Literal) -> U256 {
    if value.negative {
        U256::from(0u8).wrapping_sub(value.magnitude)
    } else {
        value.magnitude
    }
}

/// Range check matching the original compiler: a literal must lie
/// in `[-2^255, 2^256)`. Every non-negative magnitude fits (`U256`'s
/// own range is exactly `[0, 2^256)`); only a negative literal whose
/// magnitude exceeds `2^255` is out of bounds.
pub fn check_range(value: &Literal) -> Result<(), LowerError> {
    if value.negative && value.magnitude > max_negative_magnitude() {
        return Err(LowerError::LiteralOutOfRange(value.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_encodes_to_single_zero_byte() {
        assert_eq!(encode_literal(&Literal::from_i128(0)).unwrap(), vec![0]);
    }

    #[test]
    fn small_positive_literal() {
        assert_eq!(encode_literal(&Literal::from_i128(0x2a)).unwrap(), vec![0x2a]);
        assert_eq!(encode_literal(&Literal::from_i128(256)).unwrap(), vec![0x01, 0x00]);
    }

    #[test]
    fn negative_literal_reduces_modulo_2_256() {
        // -1 mod 2^256 == 0xff..ff
        let bytes = encode_literal(&Literal::from_i128(-1)).unwrap();
        assert_eq!(bytes, vec![0xff; 32]);
    }

    #[test]
    fn negative_bound_is_accepted() {
        let lit = Literal::from_parts(true, max_negative_magnitude());
        assert!(check_range(&lit).is_ok());
    }

    #[test]
    fn past_negative_bound_is_rejected() {
        let lit = Literal::from_parts(true, max_negative_magnitude() + U256::from(1u8));
        assert!(matches!(check_range(&lit), Err(LowerError::LiteralOutOfRange(_))));
    }

    #[test]
    fn large_positive_magnitude_beyond_i128_is_accepted() {
        // 2**160, an address-mask-sized constant no i128 can hold.
        let magnitude = U256::from(1u8) << 160;
        let lit = Literal::from_parts(false, magnitude);
        assert!(check_range(&lit).is_ok());
    }
}
