//! Binary layout descriptions attached to syntax nodes.
//!
//! `ResolvedType` is what type inference produces for a literal, a sized type
//! keyword or a whole element. `byte_size` is authoritative for layout; the
//! remaining fields refine how those bytes are encoded.

use std::fmt;

/// Native representation of a fixed-width value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Scalar {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl Scalar {
    /// The narrowest native integer holding `bits`, capped at 64.
    pub const fn int(bits: u32, signed: bool) -> Scalar {
        match (bits, signed) {
            (0..=8, true) => Scalar::I8,
            (9..=16, true) => Scalar::I16,
            (17..=32, true) => Scalar::I32,
            (_, true) => Scalar::I64,
            (0..=8, false) => Scalar::U8,
            (9..=16, false) => Scalar::U16,
            (17..=32, false) => Scalar::U32,
            (_, false) => Scalar::U64,
        }
    }

    pub const fn float(bits: u32) -> Scalar {
        if bits <= 32 {
            Scalar::F32
        } else {
            Scalar::F64
        }
    }

    pub const fn bits(self) -> u32 {
        match self {
            Scalar::I8 | Scalar::U8 => 8,
            Scalar::I16 | Scalar::U16 => 16,
            Scalar::I32 | Scalar::U32 | Scalar::F32 => 32,
            Scalar::I64 | Scalar::U64 | Scalar::F64 => 64,
        }
    }

    pub const fn bytes(self) -> usize {
        (self.bits() / 8) as usize
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Scalar::I8 | Scalar::I16 | Scalar::I32 | Scalar::I64 | Scalar::F32 | Scalar::F64
        )
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Scalar::F32 | Scalar::F64)
    }

    /// Rust spelling, used by the source emitter.
    pub const fn rust_name(self) -> &'static str {
        match self {
            Scalar::I8 => "i8",
            Scalar::I16 => "i16",
            Scalar::I32 => "i32",
            Scalar::I64 => "i64",
            Scalar::U8 => "u8",
            Scalar::U16 => "u16",
            Scalar::U32 => "u32",
            Scalar::U64 => "u64",
            Scalar::F32 => "f32",
            Scalar::F64 => "f64",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rust_name())
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Primitive(Scalar),
    String,
    Bitset,
    /// A ranged scalar: a run of elements of one native type.
    Vector(Scalar),
    /// The layout of a whole grammar element.
    Record,
}

/// Classification of a `{min,max}` range.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum RangeShape {
    #[default]
    Unknown,
    /// `{,max}`
    Bounded,
    /// `{min,max}`
    MinMax,
    /// `{,}`
    Unbounded,
    /// `{max}`
    MinUnbounded,
    /// `{min,}`
    MaxUnbounded,
}

/// One side of a range.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum RangeBound {
    Literal(u64),
    /// A sibling field whose unmarshalled value bounds this one.
    Symbol(String),
    /// A `$name` static variable.
    StaticVar(String),
}

impl RangeBound {
    pub fn literal(&self) -> Option<u64> {
        match self {
            RangeBound::Literal(v) => Some(*v),
            RangeBound::Symbol(_) | RangeBound::StaticVar(_) => None,
        }
    }

    pub fn is_symbolic(&self) -> bool {
        !matches!(self, RangeBound::Literal(_))
    }
}

impl fmt::Display for RangeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeBound::Literal(v) => write!(f, "{v}"),
            RangeBound::Symbol(s) | RangeBound::StaticVar(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct TypeRange {
    pub shape: RangeShape,
    pub min: Option<RangeBound>,
    pub max: Option<RangeBound>,
}

impl TypeRange {
    /// Classify a range from its bounds.
    ///
    /// `token_count` counts the tokens after `{` up to and including `}`,
    /// which separates `{,10}` (bounded) from `{10}` (min-unbounded).
    pub fn classify(
        min: Option<RangeBound>,
        max: Option<RangeBound>,
        token_count: usize,
    ) -> TypeRange {
        let shape = match (&min, &max) {
            (Some(_), Some(_)) => RangeShape::MinMax,
            (None, Some(_)) if token_count == 3 => RangeShape::Bounded,
            (None, Some(_)) => RangeShape::MinUnbounded,
            (Some(_), None) => RangeShape::MaxUnbounded,
            (None, None) => RangeShape::Unbounded,
        };
        TypeRange { shape, min, max }
    }

    /// A range whose bounds are both known at compile time.
    pub fn fixed(min: u64, max: u64) -> TypeRange {
        let shape = if min > 0 && max > 0 {
            RangeShape::MinMax
        } else if min == 0 && max > 0 {
            RangeShape::Bounded
        } else {
            RangeShape::Unbounded
        };
        TypeRange {
            shape,
            min: Some(RangeBound::Literal(min)),
            max: Some(RangeBound::Literal(max)),
        }
    }

    pub fn min_value(&self) -> Option<u64> {
        self.min.as_ref().and_then(RangeBound::literal)
    }

    pub fn max_value(&self) -> Option<u64> {
        self.max.as_ref().and_then(RangeBound::literal)
    }

    /// Element count used for sizing: the larger literal bound.
    pub fn size(&self) -> u64 {
        self.min_value()
            .unwrap_or(0)
            .max(self.max_value().unwrap_or(0))
    }

    /// The field absorbs a run of bytes not known at compile time.
    pub fn is_open_ended(&self) -> bool {
        matches!(self.shape, RangeShape::Unbounded | RangeShape::MaxUnbounded)
            || self.max.as_ref().is_some_and(RangeBound::is_symbolic)
    }

    /// Sibling field bounding this range from above, if any.
    pub fn symbolic_max(&self) -> Option<&str> {
        match &self.max {
            Some(RangeBound::Symbol(name)) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        if let Some(min) = &self.min {
            write!(f, "{min}")?;
        }
        f.write_str(",")?;
        if let Some(max) = &self.max {
            write!(f, "{max}")?;
        }
        f.write_str("}")
    }
}

/// Concrete binary layout of a value.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ResolvedType {
    pub kind: TypeKind,
    /// Declared width in bits; for numeric strings, the width in characters.
    pub bit_width: u32,
    pub byte_size: usize,
    /// Encoded as ASCII digits rather than binary.
    pub numeric_string: bool,
    /// Bytes dropped when a declared width exceeded 64 bits.
    pub diff_bytes: usize,
    /// Raw bit count of a ranged bitset.
    pub resolved_bits: u32,
    /// Inferred from a literal rather than declared.
    pub literal: bool,
    pub range: Option<TypeRange>,
}

impl ResolvedType {
    pub fn primitive(scalar: Scalar) -> Self {
        ResolvedType {
            kind: TypeKind::Primitive(scalar),
            bit_width: scalar.bits(),
            byte_size: scalar.bytes(),
            numeric_string: false,
            diff_bytes: 0,
            resolved_bits: 0,
            literal: false,
            range: None,
        }
    }

    pub fn string(len: usize) -> Self {
        ResolvedType {
            kind: TypeKind::String,
            bit_width: (len * 8) as u32,
            byte_size: len,
            numeric_string: false,
            diff_bytes: 0,
            resolved_bits: 0,
            literal: false,
            range: None,
        }
    }

    pub fn bitset(bits: u32) -> Self {
        ResolvedType {
            kind: TypeKind::Bitset,
            bit_width: bits,
            byte_size: bits.div_ceil(8) as usize,
            numeric_string: false,
            diff_bytes: 0,
            resolved_bits: bits,
            literal: false,
            range: None,
        }
    }

    /// Layout of a whole element, `byte_size` being its fixed part.
    pub fn record(byte_size: usize) -> Self {
        ResolvedType {
            kind: TypeKind::Record,
            bit_width: (byte_size * 8) as u32,
            byte_size,
            numeric_string: false,
            diff_bytes: 0,
            resolved_bits: 0,
            literal: false,
            range: None,
        }
    }

    /// The native scalar backing this type, if it has one.
    pub fn scalar(&self) -> Option<Scalar> {
        match self.kind {
            TypeKind::Primitive(s) | TypeKind::Vector(s) => Some(s),
            TypeKind::String | TypeKind::Bitset | TypeKind::Record => None,
        }
    }

    pub fn is_float(&self) -> bool {
        self.scalar().is_some_and(Scalar::is_float)
    }

    pub fn is_signed(&self) -> bool {
        self.scalar().is_some_and(Scalar::is_signed)
    }

    /// Bytes occupied by one element of a vector, or the whole value.
    pub fn element_size(&self) -> usize {
        match self.kind {
            TypeKind::Vector(_) => self.bit_width.div_ceil(8) as usize,
            _ => self.byte_size,
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Primitive(s) if self.numeric_string => {
                write!(f, "{s} as {} digits", self.bit_width)?;
            }
            TypeKind::Primitive(s) => write!(f, "{s}")?,
            TypeKind::String => write!(f, "str[{}]", self.byte_size)?,
            TypeKind::Bitset => write!(f, "bits[{}]", self.resolved_bits)?,
            TypeKind::Vector(s) => write!(f, "[{s}]")?,
            TypeKind::Record => write!(f, "record[{}]", self.byte_size)?,
        }
        if let Some(range) = &self.range {
            write!(f, "{range}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
