//! Big-endian wire primitives.
//!
//! Shared by the [`exec`](crate::exec) interpreter and by the code the
//! renderer emits, so both read and write bytes the same way.

use std::str;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum WireError {
    #[error("needed {needed} byte(s), {remaining} left")]
    ShortRead { needed: usize, remaining: usize },
    #[error("expected {expected:02X?}, found {found:02X?}")]
    LiteralMismatch { expected: Vec<u8>, found: Vec<u8> },
    #[error("`{0}` is not a number")]
    BadNumericString(String),
    #[error("{value} does not fit in {width} character(s)")]
    TooWide { value: String, width: usize },
}

/// Append the low `bytes` bytes of `value`, most significant first.
pub fn write_int(out: &mut Vec<u8>, value: i128, bytes: usize) {
    let be = value.to_be_bytes();
    let bytes = bytes.min(be.len());
    out.extend_from_slice(&be[be.len() - bytes..]);
}

/// Append `value` as an IEEE float of 4 or 8 bytes.
pub fn write_float(out: &mut Vec<u8>, value: f64, bytes: usize) {
    if bytes == 4 {
        out.extend_from_slice(&(value as f32).to_be_bytes());
    } else {
        out.extend_from_slice(&value.to_be_bytes());
    }
}

pub fn write_zeros(out: &mut Vec<u8>, len: usize) {
    out.resize(out.len() + len, 0);
}

/// Append `value` as exactly `width` ASCII digits, zero padded.
pub fn write_numeric(out: &mut Vec<u8>, value: i128, width: usize) -> Result<(), WireError> {
    pad(out, format!("{value:0width$}"), width)
}

pub fn write_numeric_float(out: &mut Vec<u8>, value: f64, width: usize) -> Result<(), WireError> {
    pad(out, format!("{value:0width$}"), width)
}

fn pad(out: &mut Vec<u8>, text: String, width: usize) -> Result<(), WireError> {
    if text.len() > width {
        return Err(WireError::TooWide { value: text, width });
    }
    out.extend_from_slice(text.as_bytes());
    Ok(())
}

/// Interpret big-endian `bytes`, sign-extending when `signed`.
pub fn decode_int(bytes: &[u8], signed: bool) -> i128 {
    let mut value: i128 = 0;
    for &b in bytes {
        value = (value << 8) | i128::from(b);
    }
    let bits = bytes.len() * 8;
    if signed && bits > 0 && bits < 128 && value & (1 << (bits - 1)) != 0 {
        value -= 1 << bits;
    }
    value
}

/// Cursor over an input buffer.
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        if n > self.remaining() {
            return Err(WireError::ShortRead {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), WireError> {
        self.take(n).map(|_| ())
    }

    pub fn int(&mut self, bytes: usize, signed: bool) -> Result<i128, WireError> {
        self.take(bytes).map(|b| decode_int(b, signed))
    }

    pub fn float(&mut self, bytes: usize) -> Result<f64, WireError> {
        let raw = self.take(bytes)?;
        Ok(match *raw {
            [a, b, c, d] => f64::from(f32::from_be_bytes([a, b, c, d])),
            [a, b, c, d, e, f, g, h] => f64::from_be_bytes([a, b, c, d, e, f, g, h]),
            _ => decode_int(raw, false) as f64,
        })
    }

    pub fn bytes(&mut self, n: usize) -> Result<Vec<u8>, WireError> {
        self.take(n).map(<[u8]>::to_vec)
    }

    /// The next bytes equal `expected`, without consuming them.
    pub fn peek_matches(&self, expected: &[u8]) -> bool {
        self.buf[self.pos..].starts_with(expected)
    }

    /// Consume `expected` or fail without moving.
    pub fn expect(&mut self, expected: &[u8]) -> Result<(), WireError> {
        if self.peek_matches(expected) {
            self.pos += expected.len();
            return Ok(());
        }
        let end = (self.pos + expected.len()).min(self.buf.len());
        Err(WireError::LiteralMismatch {
            expected: expected.to_vec(),
            found: self.buf[self.pos..end].to_vec(),
        })
    }

    /// Consume the longest of `alternatives` the input starts with.
    pub fn choose(&mut self, alternatives: &[&[u8]]) -> Result<Vec<u8>, WireError> {
        let matched = alternatives
            .iter()
            .filter(|a| self.peek_matches(a))
            .max_by_key(|a| a.len());
        match matched {
            Some(bytes) => {
                self.pos += bytes.len();
                Ok(bytes.to_vec())
            }
            None => {
                self.expect(alternatives.first().copied().unwrap_or_default())?;
                Ok(Vec::new())
            }
        }
    }

    fn numeric_text(&mut self, width: usize) -> Result<&'a str, WireError> {
        let raw = self.take(width)?;
        str::from_utf8(raw)
            .map(str::trim)
            .map_err(|_| WireError::BadNumericString(String::from_utf8_lossy(raw).into_owned()))
    }

    pub fn numeric(&mut self, width: usize) -> Result<i128, WireError> {
        let text = self.numeric_text(width)?;
        text.parse()
            .map_err(|_| WireError::BadNumericString(text.to_owned()))
    }

    pub fn numeric_float(&mut self, width: usize) -> Result<f64, WireError> {
        let text = self.numeric_text(width)?;
        text.parse()
            .map_err(|_| WireError::BadNumericString(text.to_owned()))
    }
}

#[cfg(test)]
mod tests;
