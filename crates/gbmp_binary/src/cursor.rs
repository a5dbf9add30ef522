//! # Byte Cursor
//!
//! Forward-only reader over a borrowed byte buffer.
//!
//! ## Design
//!
//! - Borrows the caller's buffer, never copies it
//! - Every read advances by exactly the bytes consumed
//! - Short reads are errors ([`BinaryError::OutOfRange`]), never zero-padded

use std::fmt::Write as _;

use crate::error::{BinaryError, BinaryResult};
use crate::schema::{ArrayValue, Endian, FieldKind, FieldValue, IntWidth, Record, RecordSchema};

/// Packs up to 4 bytes into an integer, byte 0 least significant.
#[inline]
#[must_use]
pub fn pack_int_le(bytes: &[u8]) -> u32 {
    bytes.iter().rev().fold(0, |acc, &b| (acc << 8) | u32::from(b))
}

/// Packs up to 4 bytes into an integer, byte 0 most significant.
#[inline]
#[must_use]
pub fn pack_int_be(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0, |acc, &b| (acc << 8) | u32::from(b))
}

#[inline]
fn pack_int(bytes: &[u8], endian: Endian) -> u32 {
    match endian {
        Endian::Little => pack_int_le(bytes),
        Endian::Big => pack_int_be(bytes),
    }
}

/// Stateful reader over an immutable byte slice.
///
/// Invariant: `0 <= position <= len`.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor at offset 0.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Total buffer length.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the underlying buffer is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current read offset.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Bytes left to read.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// True once every byte has been consumed.
    #[inline]
    #[must_use]
    pub const fn is_at_end(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Moves the cursor to an absolute offset.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryError::OutOfRange`] if `position` is past the end.
    pub fn set_position(&mut self, position: usize) -> BinaryResult<()> {
        if position > self.data.len() {
            return Err(BinaryError::OutOfRange {
                position,
                requested: 0,
                available: 0,
            });
        }
        self.position = position;
        Ok(())
    }

    /// Returns up to `n` upcoming bytes without advancing.
    #[must_use]
    pub fn peek_bytes(&self, n: usize) -> &'a [u8] {
        let end = self.position.saturating_add(n).min(self.data.len());
        &self.data[self.position.min(end)..end]
    }

    fn check(&self, n: usize) -> BinaryResult<()> {
        if self.remaining() < n {
            return Err(BinaryError::OutOfRange {
                position: self.position,
                requested: n,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Advances past `n` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryError::OutOfRange`] if fewer than `n` bytes remain.
    pub fn skip(&mut self, n: usize) -> BinaryResult<()> {
        self.check(n)?;
        self.position += n;
        Ok(())
    }

    /// Reads `n` raw bytes, borrowed from the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryError::OutOfRange`] if fewer than `n` bytes remain.
    pub fn read_bytes(&mut self, n: usize) -> BinaryResult<&'a [u8]> {
        self.check(n)?;
        let slice = &self.data[self.position..self.position + n];
        self.position += n;
        Ok(slice)
    }

    /// Reads one unsigned integer of the given width and byte order.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryError::OutOfRange`] on a short buffer.
    pub fn read_int(&mut self, width: IntWidth, endian: Endian) -> BinaryResult<u32> {
        let bytes = self.read_bytes(width.bytes())?;
        Ok(pack_int(bytes, endian))
    }

    /// Reads a single byte.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryError::OutOfRange`] at end of buffer.
    #[inline]
    pub fn read_u8(&mut self) -> BinaryResult<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Reads a little-endian u16.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryError::OutOfRange`] on a short buffer.
    #[inline]
    pub fn read_u16_le(&mut self) -> BinaryResult<u16> {
        Ok(self.read_int(IntWidth::W16, Endian::Little)? as u16)
    }

    /// Reads a big-endian u16.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryError::OutOfRange`] on a short buffer.
    #[inline]
    pub fn read_u16_be(&mut self) -> BinaryResult<u16> {
        Ok(self.read_int(IntWidth::W16, Endian::Big)? as u16)
    }

    /// Reads a little-endian u32.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryError::OutOfRange`] on a short buffer.
    #[inline]
    pub fn read_u32_le(&mut self) -> BinaryResult<u32> {
        self.read_int(IntWidth::W32, Endian::Little)
    }

    /// Reads a big-endian u32.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryError::OutOfRange`] on a short buffer.
    #[inline]
    pub fn read_u32_be(&mut self) -> BinaryResult<u32> {
        self.read_int(IntWidth::W32, Endian::Big)
    }

    /// Reads `count` elements of `width` each.
    ///
    /// Byte arrays come back borrowed; wider elements are decoded one by one
    /// in read order with the given byte order.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryError::OutOfRange`] if `count * width` bytes aren't
    /// available. Nothing is consumed in that case.
    pub fn read_array(
        &mut self,
        width: IntWidth,
        count: usize,
        endian: Endian,
    ) -> BinaryResult<ArrayValue<'a>> {
        let n = count.checked_mul(width.bytes()).ok_or(BinaryError::OutOfRange {
            position: self.position,
            requested: usize::MAX,
            available: self.remaining(),
        })?;
        let bytes = self.read_bytes(n)?;

        Ok(match width {
            IntWidth::W8 => ArrayValue::Bytes(bytes),
            IntWidth::W16 => ArrayValue::U16(
                bytes.chunks_exact(2).map(|c| pack_int(c, endian) as u16).collect(),
            ),
            IntWidth::W32 => {
                ArrayValue::U32(bytes.chunks_exact(4).map(|c| pack_int(c, endian)).collect())
            }
        })
    }

    /// Reads `n` bytes as a string, one character per byte.
    ///
    /// No encoding conversion: byte `0xE9` becomes `'\u{e9}'`.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryError::OutOfRange`] on a short buffer.
    pub fn read_string(&mut self, n: usize) -> BinaryResult<String> {
        Ok(self.read_bytes(n)?.iter().map(|&b| char::from(b)).collect())
    }

    /// Decodes one record, field by field in schema order.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryError::OutOfRange`] if the record is truncated. The
    /// cursor position is unspecified after a failure.
    pub fn decode_record<'s>(&mut self, schema: &'s RecordSchema) -> BinaryResult<Record<'s, 'a>> {
        let mut values = Vec::with_capacity(schema.len());
        for field in schema.fields() {
            let value = match field.kind {
                FieldKind::Int { width, endian } => FieldValue::Int(self.read_int(width, endian)?),
                FieldKind::Array { width, endian, len } => {
                    FieldValue::Array(self.read_array(width, len, endian)?)
                }
            };
            values.push(value);
        }
        Ok(Record::new(schema, values))
    }

    /// Decodes `count` consecutive records with the same schema.
    ///
    /// # Errors
    ///
    /// Fails on the first truncated record.
    pub fn read_records<'s>(
        &mut self,
        count: usize,
        schema: &'s RecordSchema,
    ) -> BinaryResult<Vec<Record<'s, 'a>>> {
        // Cap the pre-allocation: `count` comes from untrusted input.
        let capacity = count.min(self.remaining() / schema.byte_size().max(1));
        let mut records = Vec::with_capacity(capacity);
        for _ in 0..count {
            records.push(self.decode_record(schema)?);
        }
        Ok(records)
    }

    /// Debug description with a hex preview of the next `n` bytes.
    #[must_use]
    pub fn inspect(&self, n: usize) -> String {
        let mut next = String::new();
        for (i, b) in self.peek_bytes(n).iter().enumerate() {
            if i > 0 {
                next.push(' ');
            }
            let _ = write!(next, "{b:02x}");
        }
        format!("[ByteCursor pos={} length={} next={next}]", self.position, self.data.len())
    }
}
