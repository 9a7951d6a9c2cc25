//! Canonical JSON helpers and stable SHA-256 hashing used by the ledger and replay layers.
//!
//! The encoding is byte-compatible with `json.dumps(value, sort_keys=True,
//! separators=(",", ":"))`: object keys are sorted by code point, no whitespace
//! is emitted, every non-ASCII code point (and DEL) is written as a lowercase
//! `\uXXXX` escape, and floats use the shortest round-trip repr.

use std::fmt;
use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Sentinel used in place of a predecessor hash for the first record of a chain.
pub const GENESIS: &str = "GENESIS";

/// Serialize a value into canonical JSON text.
pub fn to_canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let bytes = to_canonical_json_bytes(value)?;
    // The formatter only ever emits ASCII.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Serialize a value into canonical JSON bytes.
pub fn to_canonical_json_bytes<T: Serialize + ?Sized>(
    value: &T,
) -> Result<Vec<u8>, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    let sorted = sort_keys(&value);
    let mut buf = Vec::with_capacity(256);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, CanonicalFormatter);
    sorted.serialize(&mut serializer)?;
    Ok(buf)
}

/// Rebuild `value` with every object's keys inserted in sorted order.
///
/// Sorting is done explicitly so the result does not depend on which map
/// implementation `serde_json` was compiled with.
pub fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (key, inner) in entries {
                sorted.insert(key.clone(), sort_keys(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (idx, ch) in fragment.char_indices() {
            if ch.is_ascii() && ch != '\u{7f}' {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..idx])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = idx + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(float_repr(value).as_bytes())
    }

    fn write_f32<W>(&mut self, writer: &mut W, value: f32) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(float_repr(f64::from(value)).as_bytes())
    }
}

/// Shortest round-trip float repr, switching to exponent form outside `1e-4 <= |x| < 1e16`.
fn float_repr(value: f64) -> String {
    // `{:e}` yields the shortest round-trip digits, e.g. `-1.2345e-7`.
    let sci = format!("{:e}", value.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let sign = if value.is_sign_negative() { "-" } else { "" };

    if (-4..16).contains(&exp) {
        let point = exp + 1;
        let body = if point <= 0 {
            format!("0.{}{}", "0".repeat(point.unsigned_abs() as usize), digits)
        } else {
            let point = point as usize;
            if digits.len() > point {
                format!("{}.{}", &digits[..point], &digits[point..])
            } else {
                format!("{}{}.0", digits, "0".repeat(point - digits.len()))
            }
        };
        format!("{sign}{body}")
    } else {
        let mantissa = if digits.len() > 1 {
            format!("{}.{}", &digits[..1], &digits[1..])
        } else {
            digits
        };
        let exp_sign = if exp < 0 { '-' } else { '+' };
        format!("{sign}{mantissa}e{exp_sign}{:02}", exp.unsigned_abs())
    }
}

/// SHA-256 digest of canonical bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; 32]);

impl Hash {
    /// Hash an already-built JSON value.
    pub fn of_value(value: &Value) -> Self {
        // Encoding a `Value` into memory has no failure path: keys are strings
        // and the writer is a `Vec`.
        Self::of_bytes(&to_canonical_json_bytes(value).unwrap_or_default())
    }

    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&Sha256::digest(bytes));
        Hash(digest)
    }

    /// 64 lowercase hex characters, no prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a link as written in a ledger record.
    pub fn from_hex_str(s: &str) -> Result<Self, HashParseError> {
        if s.len() != 64 {
            return Err(HashParseError::InvalidLength(s.len()));
        }
        let mut buf = [0u8; 32];
        hex::decode_to_slice(s, &mut buf)?;
        Ok(Hash(buf))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HashParseError {
    #[error("expected 64 hex characters, got {0}")]
    InvalidLength(usize),
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}
