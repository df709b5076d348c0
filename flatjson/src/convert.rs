// SPDX-License-Identifier: Apache-2.0

// Text-level conversions shared by the node accessors, the tokenizer and
// the path resolver. Everything here is allocation-free and core-only.

use core::fmt;
use core::ops::Deref;

/// Largest `u64` as decimal text, the boundary for 20-digit runs.
const U64_MAX_DIGITS: &[u8] = b"18446744073709551615";
/// Largest positive `i64` as decimal text.
const I64_MAX_DIGITS: &[u8] = b"9223372036854775807";
/// Smallest `i64` as decimal text, sign included.
const I64_MIN_TEXT: &[u8] = b"-9223372036854775808";

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Parses a leading run of decimal digits as a `u64`.
///
/// Accumulation wraps; overflow is rejected afterwards by digit count and
/// a lexicographic compare against the maximum value's digit string, so a
/// run of any length is safe to feed in.
///
/// # Returns
/// The value and the number of bytes consumed, or `None` when the run is
/// empty or does not fit.
pub const fn from_ascii_u64(src: &[u8]) -> Option<(u64, usize)> {
    let mut value: u64 = 0;
    let mut len = 0;
    while len < src.len() {
        let b = src[len];
        if !b.is_ascii_digit() {
            break;
        }
        value = value.wrapping_mul(10).wrapping_add((b - b'0') as u64);
        len += 1;
    }
    if len == 0 || len > U64_MAX_DIGITS.len() {
        return None;
    }
    if len == U64_MAX_DIGITS.len() && lex_gt(src, U64_MAX_DIGITS, len) {
        return None;
    }
    Some((value, len))
}

/// Signed companion of [`from_ascii_u64`], accepting one optional leading
/// `-`. A bare sign with no digits is rejected.
pub const fn from_ascii_i64(src: &[u8]) -> Option<(i64, usize)> {
    let negative = matches!(src, [b'-', ..]);
    let start = negative as usize;

    let mut value: i64 = 0;
    let mut len = start;
    while len < src.len() {
        let b = src[len];
        if !b.is_ascii_digit() {
            break;
        }
        value = value.wrapping_mul(10).wrapping_add((b - b'0') as i64);
        len += 1;
    }
    if len == start {
        return None;
    }
    if negative {
        // I64_MIN_TEXT includes the sign, so compare the whole span.
        if len > I64_MIN_TEXT.len() {
            return None;
        }
        if len == I64_MIN_TEXT.len() && lex_gt(src, I64_MIN_TEXT, len) {
            return None;
        }
        value = value.wrapping_neg();
    } else {
        if len > I64_MAX_DIGITS.len() {
            return None;
        }
        if len == I64_MAX_DIGITS.len() && lex_gt(src, I64_MAX_DIGITS, len) {
            return None;
        }
    }
    Some((value, len))
}

/// Lexicographic greater-than over the first `n` bytes.
const fn lex_gt(a: &[u8], bound: &[u8], n: usize) -> bool {
    let mut i = 0;
    while i < n {
        if a[i] != bound[i] {
            return a[i] > bound[i];
        }
        i += 1;
    }
    false
}

/// Expected byte length of a UTF-8 sequence, judged by its leading byte.
/// Returns 0 for a byte that cannot start a sequence.
pub const fn utf8_len(lead: u8) -> usize {
    match lead >> 3 {
        0b00000..=0b01111 => 1,
        0b11000..=0b11011 => 2,
        0b11100..=0b11101 => 3,
        0b11110 => 4,
        _ => 0,
    }
}

pub(crate) const fn is_high_surrogate(cp: u32) -> bool {
    cp >= 0xD800 && cp <= 0xDBFF
}

pub(crate) const fn is_low_surrogate(cp: u32) -> bool {
    cp >= 0xDC00 && cp <= 0xDFFF
}

pub(crate) const fn combine_surrogate_pair(high: u32, low: u32) -> u32 {
    0x10000 + (((high & 0x3FF) << 10) | (low & 0x3FF))
}

pub(crate) const fn hex_digit(b: u8) -> Option<u32> {
    match b {
        b'0'..=b'9' => Some((b - b'0') as u32),
        b'a'..=b'f' => Some((b - b'a') as u32 + 10),
        b'A'..=b'F' => Some((b - b'A') as u32 + 10),
        _ => None,
    }
}

/// Decodes a lossless-float span (`0x` plus 8 hex digits) to the `f32`
/// with that exact bit pattern. No arithmetic parsing is involved.
///
/// # Panics
/// If `text` is not a well-formed 8-digit hex-float span. Spans taken
/// from parsed nodes are always well formed.
pub fn f32_from_hex(text: &str) -> f32 {
    f32::from_bits(hex_bits(text, 8) as u32)
}

/// Decodes a lossless-float span (`0x` plus 16 hex digits) to the `f64`
/// with that exact bit pattern.
///
/// # Panics
/// If `text` is not a well-formed 16-digit hex-float span.
pub fn f64_from_hex(text: &str) -> f64 {
    f64::from_bits(hex_bits(text, 16))
}

fn hex_bits(text: &str, digits: usize) -> u64 {
    let span = text.as_bytes();
    assert!(
        span.len() == 2 + digits,
        "hex float span must be a 2-byte prefix plus {} digits",
        digits
    );
    let mut bits: u64 = 0;
    for &b in &span[2..] {
        match hex_digit(b) {
            Some(d) => bits = (bits << 4) | d as u64,
            None => panic!("hex float span contains a non-hex digit"),
        }
    }
    bits
}

/// Renders `value`'s bit pattern in the lossless wire form, e.g.
/// `0x4048f5c3` for 3.14f32.
pub fn f32_to_hex(value: f32) -> HexF32 {
    let mut buf = [0u8; 10];
    write_hex(&mut buf, value.to_bits() as u64);
    HexF32 { buf }
}

/// 64-bit companion of [`f32_to_hex`]; 16 digits after the prefix.
pub fn f64_to_hex(value: f64) -> HexF64 {
    let mut buf = [0u8; 18];
    write_hex(&mut buf, value.to_bits());
    HexF64 { buf }
}

fn write_hex(buf: &mut [u8], mut bits: u64) {
    buf[0] = b'0';
    buf[1] = b'x';
    for slot in buf[2..].iter_mut().rev() {
        *slot = HEX_DIGITS[(bits & 0xF) as usize];
        bits >>= 4;
    }
}

/// A stack-allocated rendering of an `f32` bit pattern.
#[derive(Debug, Clone, Copy)]
pub struct HexF32 {
    buf: [u8; 10],
}

/// A stack-allocated rendering of an `f64` bit pattern.
#[derive(Debug, Clone, Copy)]
pub struct HexF64 {
    buf: [u8; 18],
}

macro_rules! impl_hex_text {
    ($name:ident) => {
        impl $name {
            /// The rendered span, `0x` prefix included.
            pub fn as_str(&self) -> &str {
                core::str::from_utf8(&self.buf).unwrap_or_default()
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                self.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_hex_text!(HexF32);
impl_hex_text!(HexF64);

/// Iterator over the logical characters of an escaped string span.
///
/// The span is the text between the quotes of a parsed string, escapes
/// still in wire form. Counting the items measures the decoded length in
/// characters; [`unescaped_len`] measures it in UTF-8 bytes.
pub struct Unescape<'a> {
    bytes: &'a [u8],
    pos: usize,
}

/// Starts decoding `text`, the inside-the-quotes span of a string.
///
/// # Panics
/// Iteration panics on malformed escapes or truncated UTF-8. Spans taken
/// from parsed nodes have already been validated and never trip this.
pub fn unescape(text: &str) -> Unescape<'_> {
    Unescape {
        bytes: text.as_bytes(),
        pos: 0,
    }
}

impl Iterator for Unescape<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        if self.pos >= self.bytes.len() {
            return None;
        }
        let cp = next_codepoint(self.bytes, &mut self.pos);
        match char::from_u32(cp) {
            Some(c) => Some(c),
            None => panic!("string span decoded to an invalid scalar value"),
        }
    }
}

fn next_codepoint(bytes: &[u8], pos: &mut usize) -> u32 {
    let b = bytes[*pos];
    if b != b'\\' {
        let len = utf8_len(b);
        return decode_multibyte(bytes, pos, len);
    }
    assert!(*pos + 1 < bytes.len(), "string span ends inside an escape");
    let esc = bytes[*pos + 1];
    *pos += 2;
    match esc {
        b'\\' => '\\' as u32,
        b'/' => '/' as u32,
        b'"' => '"' as u32,
        b'0' => 0x00,
        b'a' => 0x07,
        b'b' => 0x08,
        b't' => 0x09,
        b'v' => 0x0B,
        b'f' => 0x0C,
        b'r' => 0x0D,
        b'n' => 0x0A,
        b'u' => {
            let high = hex4(bytes, pos);
            if is_high_surrogate(high) {
                // The low half's \u prefix follows immediately.
                assert!(
                    *pos + 2 <= bytes.len() && bytes[*pos] == b'\\' && bytes[*pos + 1] == b'u',
                    "high surrogate not followed by a low surrogate escape"
                );
                *pos += 2;
                let low = hex4(bytes, pos);
                combine_surrogate_pair(high, low)
            } else {
                high
            }
        }
        _ => panic!("unrecognized escape in string span"),
    }
}

fn hex4(bytes: &[u8], pos: &mut usize) -> u32 {
    assert!(*pos + 4 <= bytes.len(), "string span ends inside an escape");
    let mut value = 0;
    for _ in 0..4 {
        value = (value << 4)
            | match hex_digit(bytes[*pos]) {
                Some(d) => d,
                None => panic!("malformed unicode escape in string span"),
            };
        *pos += 1;
    }
    value
}

fn decode_multibyte(bytes: &[u8], pos: &mut usize, len: usize) -> u32 {
    const LEAD_MASK: [u32; 5] = [0x00, 0x7F, 0x1F, 0x0F, 0x07];
    assert!(
        len >= 1 && *pos + len <= bytes.len(),
        "truncated UTF-8 sequence in string span"
    );
    let mut cp = bytes[*pos] as u32 & LEAD_MASK[len];
    for _ in 1..len {
        *pos += 1;
        cp = (cp << 6) | (bytes[*pos] as u32 & 0x3F);
    }
    *pos += 1;
    cp
}

/// Decodes an escaped span into `dest` as UTF-8.
///
/// # Returns
/// The number of bytes written.
///
/// # Panics
/// If `dest` is smaller than [`unescaped_len`] of the same span, or the
/// span is malformed.
pub fn unescape_into(text: &str, dest: &mut [u8]) -> usize {
    let mut written = 0;
    for ch in unescape(text) {
        written += ch.encode_utf8(&mut dest[written..]).len();
    }
    written
}

/// Measure-only companion of [`unescape_into`]: the exact number of UTF-8
/// bytes the decoded span occupies.
pub fn unescaped_len(text: &str) -> usize {
    unescape(text).map(char::len_utf8).sum()
}
