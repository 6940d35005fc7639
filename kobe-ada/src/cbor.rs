//! Minimal definite-length CBOR (RFC 8949) value codec.
//!
//! Covers what COSE headers, COSE_Sign1, COSE_Key and native scripts need:
//! integers, byte and text strings, arrays, maps, booleans and null. Heads
//! are always written in shortest form. Tags, floats and indefinite lengths
//! are rejected on decode.

use crate::Error;

/// Nesting bound applied while decoding.
pub const MAX_DEPTH: usize = 256;

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_SIMPLE: u8 = 7;

const SIMPLE_FALSE: u8 = 20;
const SIMPLE_TRUE: u8 = 21;
const SIMPLE_NULL: u8 = 22;

/// A decoded CBOR data item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Unsigned integer (major type 0).
    Unsigned(u64),
    /// Negative integer `-1 - n` (major type 1).
    Negative(u64),
    /// Byte string.
    Bytes(Vec<u8>),
    /// UTF-8 text string.
    Text(String),
    /// Array.
    Array(Vec<Value>),
    /// Map, entries in encoded order.
    Map(Vec<(Value, Value)>),
    /// Boolean.
    Bool(bool),
    /// Null.
    Null,
}

impl Value {
    /// Encode to bytes.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Self::Unsigned(n) => write_head(out, MAJOR_UNSIGNED, *n),
            Self::Negative(n) => write_head(out, MAJOR_NEGATIVE, *n),
            Self::Bytes(bytes) => {
                write_head(out, MAJOR_BYTES, bytes.len() as u64);
                out.extend_from_slice(bytes);
            }
            Self::Text(text) => {
                write_head(out, MAJOR_TEXT, text.len() as u64);
                out.extend_from_slice(text.as_bytes());
            }
            Self::Array(items) => {
                write_head(out, MAJOR_ARRAY, items.len() as u64);
                for item in items {
                    item.encode_into(out);
                }
            }
            Self::Map(entries) => {
                write_head(out, MAJOR_MAP, entries.len() as u64);
                for (key, value) in entries {
                    key.encode_into(out);
                    value.encode_into(out);
                }
            }
            Self::Bool(false) => out.push(MAJOR_SIMPLE << 5 | SIMPLE_FALSE),
            Self::Bool(true) => out.push(MAJOR_SIMPLE << 5 | SIMPLE_TRUE),
            Self::Null => out.push(MAJOR_SIMPLE << 5 | SIMPLE_NULL),
        }
    }

    /// Decode exactly one item spanning all of `bytes`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let mut decoder = Decoder { input: bytes };
        let value = decoder.value(0)?;
        if !decoder.input.is_empty() {
            return Err(Error::Cbor(format!(
                "{} trailing bytes",
                decoder.input.len()
            )));
        }
        Ok(value)
    }

    /// The byte string contents, if this is a byte string.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The integer, if this is an integer.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i128> {
        match self {
            Self::Unsigned(n) => Some(*n as i128),
            Self::Negative(n) => Some(-1 - *n as i128),
            _ => None,
        }
    }

    /// The items, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The entries, if this is a map.
    #[must_use]
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up `key` in a map. Returns `None` for non-maps.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        match u64::try_from(n) {
            Ok(n) => Self::Unsigned(n),
            Err(_) => Self::Negative(n.unsigned_abs() - 1),
        }
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Unsigned(n)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Text(text.into())
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

fn write_head(out: &mut Vec<u8>, major: u8, arg: u64) {
    let major = major << 5;
    if arg < 24 {
        out.push(major | arg as u8);
    } else if arg <= u64::from(u8::MAX) {
        out.push(major | 24);
        out.push(arg as u8);
    } else if arg <= u64::from(u16::MAX) {
        out.push(major | 25);
        out.extend_from_slice(&(arg as u16).to_be_bytes());
    } else if arg <= u64::from(u32::MAX) {
        out.push(major | 26);
        out.extend_from_slice(&(arg as u32).to_be_bytes());
    } else {
        out.push(major | 27);
        out.extend_from_slice(&arg.to_be_bytes());
    }
}

struct Decoder<'a> {
    input: &'a [u8],
}

impl<'a> Decoder<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], Error> {
        if self.input.len() < n {
            return Err(Error::Cbor("unexpected end of input".into()));
        }
        let (head, rest) = self.input.split_at(n);
        self.input = rest;
        Ok(head)
    }

    fn head(&mut self) -> Result<(u8, u8, u64), Error> {
        let initial = self.take(1)?[0];
        let major = initial >> 5;
        let info = initial & 0x1f;
        let arg = match info {
            0..=23 => u64::from(info),
            24 => u64::from(self.take(1)?[0]),
            25 => {
                let mut buf = [0u8; 2];
                buf.copy_from_slice(self.take(2)?);
                u64::from(u16::from_be_bytes(buf))
            }
            26 => {
                let mut buf = [0u8; 4];
                buf.copy_from_slice(self.take(4)?);
                u64::from(u32::from_be_bytes(buf))
            }
            27 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(self.take(8)?);
                u64::from_be_bytes(buf)
            }
            31 => return Err(Error::Cbor("indefinite lengths are not supported".into())),
            _ => return Err(Error::Cbor(format!("reserved additional info {info}"))),
        };
        Ok((major, info, arg))
    }

    fn length(&mut self, arg: u64) -> Result<usize, Error> {
        let len = usize::try_from(arg).map_err(|_| Error::Cbor("length overflow".into()))?;
        // Every item takes at least one byte; reject lengths the input cannot hold.
        if len > self.input.len() {
            return Err(Error::Cbor("length exceeds input".into()));
        }
        Ok(len)
    }

    fn value(&mut self, depth: usize) -> Result<Value, Error> {
        if depth > MAX_DEPTH {
            return Err(Error::Cbor(format!("nesting exceeds depth {MAX_DEPTH}")));
        }
        let (major, info, arg) = self.head()?;
        let value = match major {
            MAJOR_UNSIGNED => Value::Unsigned(arg),
            MAJOR_NEGATIVE => Value::Negative(arg),
            MAJOR_BYTES => {
                let len = self.length(arg)?;
                Value::Bytes(self.take(len)?.to_vec())
            }
            MAJOR_TEXT => {
                let len = self.length(arg)?;
                let text = core::str::from_utf8(self.take(len)?)
                    .map_err(|_| Error::Cbor("invalid utf-8 in text string".into()))?;
                Value::Text(text.into())
            }
            MAJOR_ARRAY => {
                let len = self.length(arg)?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.value(depth + 1)?);
                }
                Value::Array(items)
            }
            MAJOR_MAP => {
                let len = self.length(arg)?;
                let mut entries = Vec::with_capacity(len);
                for _ in 0..len {
                    let key = self.value(depth + 1)?;
                    let value = self.value(depth + 1)?;
                    entries.push((key, value));
                }
                Value::Map(entries)
            }
            MAJOR_SIMPLE => match (info, arg) {
                (SIMPLE_FALSE, _) => Value::Bool(false),
                (SIMPLE_TRUE, _) => Value::Bool(true),
                (SIMPLE_NULL, _) => Value::Null,
                _ => return Err(Error::Cbor(format!("unsupported simple value {arg}"))),
            },
            _ => return Err(Error::Cbor("tags are not supported".into())),
        };
        Ok(value)
    }
}
