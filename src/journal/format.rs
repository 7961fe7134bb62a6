//! Versioned binary encoding of the move journal.
//!
//! Layout (little-endian):
//! ```text
//! 0..8   magic  b"DSWPJRNL"
//! 8..10  version u16
//! 10..14 record count u32
//! 14..18 crc32 of the body
//! 18..   body: count x { u32 len, UTF-8 original, u32 len, UTF-8 relocated }
//! ```

use thiserror::Error;

pub const MAGIC: &[u8; 8] = b"DSWPJRNL";
pub const VERSION: u16 = 1;
pub const HEADER_LEN: usize = 18;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("bad magic bytes")]
    BadMagic,
    #[error("unsupported version {0}")]
    UnsupportedVersion(u16),
    #[error("truncated: needed {needed} bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },
    #[error("checksum mismatch (stored {stored:#010x}, computed {computed:#010x})")]
    ChecksumMismatch { stored: u32, computed: u32 },
    #[error("{0} unexpected trailing bytes")]
    TrailingBytes(usize),
    #[error("record {index} holds a path that is not valid UTF-8")]
    InvalidUtf8 { index: usize },
    #[error("path of {0} bytes is too long to store")]
    FieldTooLong(usize),
}

/// Serialize `(original, relocated)` pairs.
pub fn encode<'a, I>(records: I) -> Result<Vec<u8>, FormatError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut body = Vec::new();
    let mut count: u32 = 0;
    for (original, relocated) in records {
        put_str(&mut body, original)?;
        put_str(&mut body, relocated)?;
        count = count
            .checked_add(1)
            .ok_or(FormatError::FieldTooLong(u32::MAX as usize))?;
    }

    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&crc32fast::hash(&body).to_le_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}

fn put_str(buf: &mut Vec<u8>, s: &str) -> Result<(), FormatError> {
    let len = u32::try_from(s.len()).map_err(|_| FormatError::FieldTooLong(s.len()))?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

/// Parse a full journal image back into pairs.
pub fn decode(data: &[u8]) -> Result<Vec<(String, String)>, FormatError> {
    if data.len() < MAGIC.len() {
        return Err(FormatError::Truncated {
            offset: 0,
            needed: HEADER_LEN,
        });
    }
    if &data[0..8] != MAGIC {
        return Err(FormatError::BadMagic);
    }
    if data.len() < HEADER_LEN {
        return Err(FormatError::Truncated {
            offset: data.len(),
            needed: HEADER_LEN - data.len(),
        });
    }
    let version = u16::from_le_bytes([data[8], data[9]]);
    if version != VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }
    let count = u32::from_le_bytes([data[10], data[11], data[12], data[13]]) as usize;
    let stored = u32::from_le_bytes([data[14], data[15], data[16], data[17]]);

    let body = &data[HEADER_LEN..];
    let computed = crc32fast::hash(body);
    if stored != computed {
        return Err(FormatError::ChecksumMismatch { stored, computed });
    }

    let mut cur = Cursor {
        data: body,
        pos: 0,
    };
    // Each record is at least 8 bytes; never trust `count` for allocation beyond that.
    let mut records = Vec::with_capacity(count.min(body.len() / 8));
    for index in 0..count {
        let original = cur.take_str(index)?;
        let relocated = cur.take_str(index)?;
        records.push((original, relocated));
    }
    if cur.pos != body.len() {
        return Err(FormatError::TrailingBytes(body.len() - cur.pos));
    }
    Ok(records)
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&e| e <= self.data.len())
            .ok_or(FormatError::Truncated {
                offset: HEADER_LEN + self.pos,
                needed: n,
            })?;
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn take_str(&mut self, index: usize) -> Result<String, FormatError> {
        let len_bytes = self.take(4)?;
        let len =
            u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]) as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| FormatError::InvalidUtf8 { index })
    }
}
