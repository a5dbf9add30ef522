//! # Record Schemas
//!
//! Declarative description of fixed-layout records.
//!
//! A [`RecordSchema`] is an ordered list of named fields, each with a
//! [`FieldKind`]. Schemas are built once (usually into a `static`/`OnceLock`
//! or a long-lived struct) and then handed to
//! [`ByteCursor::decode_record`](crate::ByteCursor::decode_record) for every
//! record, so the layout is never re-derived per record.
//!
//! ## Textual notation
//!
//! Kinds can also be written in the compact notation used by format notes:
//!
//! ```text
//! "8LE"  "16LE"  "32BE"        scalar integers
//! "8arrayLE" "32arrayBE"       arrays, element count given separately
//! ```
//!
//! Unknown notations are rejected when the schema is built, never while
//! decoding.

use crate::error::{BinaryError, BinaryResult};

/// Byte order of a multi-byte integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    /// Byte 0 is least significant.
    Little,
    /// Byte 0 is most significant.
    Big,
}

/// Width of an integer element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    /// 1 byte.
    W8,
    /// 2 bytes.
    W16,
    /// 4 bytes.
    W32,
}

impl IntWidth {
    /// Returns the width in bytes.
    #[inline]
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::W8 => 1,
            Self::W16 => 2,
            Self::W32 => 4,
        }
    }

    /// Maps a byte count back to a width.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryError::Schema`] for anything other than 1, 2 or 4.
    pub fn from_bytes(bytes: usize) -> BinaryResult<Self> {
        match bytes {
            1 => Ok(Self::W8),
            2 => Ok(Self::W16),
            4 => Ok(Self::W32),
            other => Err(BinaryError::Schema(format!(
                "can't build array with {other} bytes per element"
            ))),
        }
    }

    fn from_bits(bits: &str) -> Option<Self> {
        match bits {
            "8" => Some(Self::W8),
            "16" => Some(Self::W16),
            "32" => Some(Self::W32),
            _ => None,
        }
    }
}

/// The primitive layout of one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A single unsigned integer.
    Int {
        /// Element width.
        width: IntWidth,
        /// Byte order.
        endian: Endian,
    },
    /// A fixed number of unsigned integers of the same width.
    Array {
        /// Element width.
        width: IntWidth,
        /// Byte order of each element.
        endian: Endian,
        /// Number of elements.
        len: usize,
    },
}

impl FieldKind {
    /// Unsigned byte.
    pub const U8: Self = Self::Int { width: IntWidth::W8, endian: Endian::Little };
    /// Little-endian u16.
    pub const U16_LE: Self = Self::Int { width: IntWidth::W16, endian: Endian::Little };
    /// Big-endian u16.
    pub const U16_BE: Self = Self::Int { width: IntWidth::W16, endian: Endian::Big };
    /// Little-endian u32.
    pub const U32_LE: Self = Self::Int { width: IntWidth::W32, endian: Endian::Little };
    /// Big-endian u32.
    pub const U32_BE: Self = Self::Int { width: IntWidth::W32, endian: Endian::Big };

    /// Creates an array kind.
    #[inline]
    #[must_use]
    pub const fn array(width: IntWidth, endian: Endian, len: usize) -> Self {
        Self::Array { width, endian, len }
    }

    /// Number of bytes this field occupies in a record.
    #[inline]
    #[must_use]
    pub const fn byte_size(&self) -> usize {
        match *self {
            Self::Int { width, .. } => width.bytes(),
            Self::Array { width, len, .. } => width.bytes() * len,
        }
    }

    /// Parses the compact notation (`"16LE"`, `"32arrayBE"`, ...).
    ///
    /// `len` is the element count and is required for array kinds and
    /// rejected for scalars.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryError::Schema`] if the notation is unknown or the
    /// length doesn't match the kind.
    pub fn parse(notation: &str, len: Option<usize>) -> BinaryResult<Self> {
        let unknown = || BinaryError::Schema(format!("unknown field kind `{notation}`"));

        let (body, endian) = if let Some(body) = notation.strip_suffix("LE") {
            (body, Endian::Little)
        } else if let Some(body) = notation.strip_suffix("BE") {
            (body, Endian::Big)
        } else {
            return Err(unknown());
        };

        match (body.strip_suffix("array"), len) {
            (Some(bits), Some(len)) => {
                let width = IntWidth::from_bits(bits).ok_or_else(unknown)?;
                Ok(Self::Array { width, endian, len })
            }
            (Some(_), None) => Err(BinaryError::Schema(format!(
                "array kind `{notation}` needs an element count"
            ))),
            (None, None) => {
                let width = IntWidth::from_bits(body).ok_or_else(unknown)?;
                Ok(Self::Int { width, endian })
            }
            (None, Some(_)) => Err(BinaryError::Schema(format!(
                "scalar kind `{notation}` takes no element count"
            ))),
        }
    }
}

/// One named field of a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name, unique within the schema.
    pub name: String,
    /// Field layout.
    pub kind: FieldKind,
}

/// An ordered, validated list of fields describing one record layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    fields: Vec<Field>,
    byte_size: usize,
}

impl RecordSchema {
    /// Starts building a schema.
    #[must_use]
    pub fn builder() -> RecordSchemaBuilder {
        RecordSchemaBuilder { fields: Vec::new() }
    }

    /// Builds a schema from `(name, notation, element_count)` triples.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryError::Schema`] for unknown notations, duplicate
    /// names or an empty field list.
    pub fn from_notation(fields: &[(&str, &str, Option<usize>)]) -> BinaryResult<Self> {
        let mut builder = Self::builder();
        for &(name, notation, len) in fields {
            builder = builder.field(name, FieldKind::parse(notation, len)?);
        }
        builder.build()
    }

    /// Fields in declaration order.
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of fields.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false for a built schema; present for API symmetry.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total encoded size of one record in bytes.
    #[inline]
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    /// Position of a field by name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Incremental builder for [`RecordSchema`].
#[derive(Debug, Clone, Default)]
pub struct RecordSchemaBuilder {
    fields: Vec<Field>,
}

impl RecordSchemaBuilder {
    /// Appends a field.
    #[must_use]
    pub fn field(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields.push(Field { name: name.to_string(), kind });
        self
    }

    /// Validates and freezes the schema.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryError::Schema`] if there are no fields, a name
    /// repeats, or an array has zero elements.
    pub fn build(self) -> BinaryResult<RecordSchema> {
        if self.fields.is_empty() {
            return Err(BinaryError::Schema("schema has no fields".to_string()));
        }

        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(BinaryError::Schema(format!("duplicate field `{}`", field.name)));
            }
            if let FieldKind::Array { len: 0, .. } = field.kind {
                return Err(BinaryError::Schema(format!("array field `{}` is empty", field.name)));
            }
        }

        let byte_size = self.fields.iter().map(|f| f.kind.byte_size()).sum();
        Ok(RecordSchema { fields: self.fields, byte_size })
    }
}

/// Decoded array contents.
///
/// Byte arrays borrow the input buffer; wider elements are unpacked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayValue<'a> {
    /// Raw bytes, borrowed from the source buffer.
    Bytes(&'a [u8]),
    /// Unpacked 16-bit elements in read order.
    U16(Vec<u16>),
    /// Unpacked 32-bit elements in read order.
    U32(Vec<u32>),
}

impl ArrayValue<'_> {
    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Bytes(b) => b.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
        }
    }

    /// True if there are no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`, widened to u32.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u32> {
        match self {
            Self::Bytes(b) => b.get(index).map(|&x| u32::from(x)),
            Self::U16(v) => v.get(index).map(|&x| u32::from(x)),
            Self::U32(v) => v.get(index).copied(),
        }
    }

    /// All elements widened to u32.
    #[must_use]
    pub fn to_u32_vec(&self) -> Vec<u32> {
        match self {
            Self::Bytes(b) => b.iter().map(|&x| u32::from(x)).collect(),
            Self::U16(v) => v.iter().map(|&x| u32::from(x)).collect(),
            Self::U32(v) => v.clone(),
        }
    }
}

/// Value of one decoded field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Scalar integer, widened to u32.
    Int(u32),
    /// Array of integers.
    Array(ArrayValue<'a>),
}

/// One decoded record: field values keyed by the schema's names.
#[derive(Debug, Clone)]
pub struct Record<'s, 'a> {
    schema: &'s RecordSchema,
    values: Vec<FieldValue<'a>>,
}

impl<'s, 'a> Record<'s, 'a> {
    pub(crate) fn new(schema: &'s RecordSchema, values: Vec<FieldValue<'a>>) -> Self {
        Self { schema, values }
    }

    /// Looks up a field value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue<'a>> {
        self.schema.index_of(name).map(|i| &self.values[i])
    }

    /// Reads a scalar field.
    ///
    /// # Errors
    ///
    /// Fails if the field is missing or is an array.
    pub fn uint(&self, name: &str) -> BinaryResult<u32> {
        match self.get(name) {
            Some(FieldValue::Int(v)) => Ok(*v),
            Some(FieldValue::Array(_)) => Err(BinaryError::FieldType {
                field: name.to_string(),
                expected: "an integer",
            }),
            None => Err(BinaryError::MissingField(name.to_string())),
        }
    }

    /// Reads an array field.
    ///
    /// # Errors
    ///
    /// Fails if the field is missing or is a scalar.
    pub fn array(&self, name: &str) -> BinaryResult<&ArrayValue<'a>> {
        match self.get(name) {
            Some(FieldValue::Array(v)) => Ok(v),
            Some(FieldValue::Int(_)) => Err(BinaryError::FieldType {
                field: name.to_string(),
                expected: "an array",
            }),
            None => Err(BinaryError::MissingField(name.to_string())),
        }
    }

    /// Iterates `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue<'a>)> + '_ {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .zip(self.values.iter())
    }
}
