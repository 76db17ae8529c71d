//! Data Types - Tensorex Element Type System
//!
//! Defines the element types storable in a tensor and the traits that gate
//! arithmetic and floating point operations. Supports booleans, signed and
//! unsigned integers, and `f32`/`f64`.
//!
//! # Key Features
//! - Type-safe numeric operations via traits
//! - Runtime dtype information via `DType` enum
//! - NumPy type characters for binary interchange
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use core::fmt::Debug;

use num_traits::{Float as NumFloat, Num, NumCast, One, Zero};

// =============================================================================
// DType Enum
// =============================================================================

/// Runtime representation of tensor element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// Boolean type.
    Bool,
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit unsigned integer.
    U32,
    /// 64-bit unsigned integer.
    U64,
    /// 32-bit floating point (single precision).
    F32,
    /// 64-bit floating point (double precision).
    F64,
}

impl DType {
    /// Every supported dtype, in declaration order.
    pub const ALL: [DType; 11] = [
        Self::Bool,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::F32,
        Self::F64,
    ];

    /// Returns the size in bytes of this data type.
    #[must_use]
    pub const fn size_of(self) -> usize {
        match self {
            Self::Bool | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::F64 | Self::I64 | Self::U64 => 8,
        }
    }

    /// Returns true if this is a floating point type.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Returns true if this type can represent negative values.
    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Self::F32 | Self::F64 | Self::I8 | Self::I16 | Self::I32 | Self::I64
        )
    }

    /// Returns true if this is an integer type.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
        )
    }

    /// Returns the name of this data type as a string.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    /// Returns the NumPy kind character (`b`, `i`, `u` or `f`).
    #[must_use]
    pub const fn kind(self) -> char {
        match self {
            Self::Bool => 'b',
            Self::I8 | Self::I16 | Self::I32 | Self::I64 => 'i',
            Self::U8 | Self::U16 | Self::U32 | Self::U64 => 'u',
            Self::F32 | Self::F64 => 'f',
        }
    }

    /// Finds the dtype matching a NumPy kind character and byte size.
    #[must_use]
    pub fn from_kind(kind: char, size: usize) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.kind() == kind && d.size_of() == size)
    }

    /// Parses a dtype from its name (`"f64"`, `"i32"`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }
}

impl Default for DType {
    fn default() -> Self {
        Self::F64
    }
}

impl core::fmt::Display for DType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Scalar Trait
// =============================================================================

/// Trait for all element types that can be stored in a tensor.
pub trait Scalar: Copy + Debug + Default + PartialEq + Send + Sync + 'static {
    /// The runtime dtype for this scalar type.
    const DTYPE: DType;

    /// Returns the dtype for this type.
    #[must_use]
    fn dtype() -> DType {
        Self::DTYPE
    }
}

// =============================================================================
// Numeric Trait
// =============================================================================

/// Trait for numeric types that support arithmetic operations.
pub trait Numeric: Scalar + Num + NumCast + PartialOrd + Zero + One {
    /// The zero value for this type.
    const ZERO: Self;

    /// The one value for this type.
    const ONE: Self;

    /// Returns the minimum value for this type.
    fn min_value() -> Self;

    /// Returns the maximum value for this type.
    fn max_value() -> Self;

    /// Absolute value; identity for unsigned types.
    #[must_use]
    fn abs_value(self) -> Self {
        if self < Self::ZERO {
            Self::ZERO - self
        } else {
            self
        }
    }

    /// Converts a value into this type, saturating to zero when the value
    /// is not representable (NaN into an integer, for instance).
    #[must_use]
    fn cast_from<U: NumCast>(value: U) -> Self {
        <Self as NumCast>::from(value).unwrap_or(Self::ZERO)
    }

    /// Converts this value to `f64`.
    #[must_use]
    fn to_f64_lossy(self) -> f64 {
        num_traits::ToPrimitive::to_f64(&self).unwrap_or(f64::NAN)
    }
}

// =============================================================================
// Float Trait
// =============================================================================

/// Trait for floating point types.
pub trait Float: Numeric + NumFloat {
    /// Not a Number value.
    const NAN: Self;

    /// Positive infinity.
    const INFINITY: Self;

    /// Negative infinity.
    const NEG_INFINITY: Self;

    /// Machine epsilon.
    const EPSILON: Self;
}

// =============================================================================
// Scalar Implementations
// =============================================================================

macro_rules! impl_scalar {
    ($ty:ty, $dtype:expr) => {
        impl Scalar for $ty {
            const DTYPE: DType = $dtype;
        }
    };
}

impl_scalar!(bool, DType::Bool);
impl_scalar!(i8, DType::I8);
impl_scalar!(i16, DType::I16);
impl_scalar!(i32, DType::I32);
impl_scalar!(i64, DType::I64);
impl_scalar!(u8, DType::U8);
impl_scalar!(u16, DType::U16);
impl_scalar!(u32, DType::U32);
impl_scalar!(u64, DType::U64);
impl_scalar!(f32, DType::F32);
impl_scalar!(f64, DType::F64);

// =============================================================================
// Numeric Implementations
// =============================================================================

macro_rules! impl_numeric {
    ($ty:ty, $zero:expr, $one:expr) => {
        impl Numeric for $ty {
            const ZERO: Self = $zero;
            const ONE: Self = $one;

            fn min_value() -> Self {
                <$ty>::MIN
            }

            fn max_value() -> Self {
                <$ty>::MAX
            }
        }
    };
}

impl_numeric!(f32, 0.0, 1.0);
impl_numeric!(f64, 0.0, 1.0);
impl_numeric!(i8, 0, 1);
impl_numeric!(i16, 0, 1);
impl_numeric!(i32, 0, 1);
impl_numeric!(i64, 0, 1);
impl_numeric!(u8, 0, 1);
impl_numeric!(u16, 0, 1);
impl_numeric!(u32, 0, 1);
impl_numeric!(u64, 0, 1);

// =============================================================================
// Float Implementations
// =============================================================================

macro_rules! impl_float {
    ($ty:ty) => {
        impl Float for $ty {
            const NAN: Self = <$ty>::NAN;
            const INFINITY: Self = <$ty>::INFINITY;
            const NEG_INFINITY: Self = <$ty>::NEG_INFINITY;
            const EPSILON: Self = <$ty>::EPSILON;
        }
    };
}

impl_float!(f32);
impl_float!(f64);

// =============================================================================
// Tests
// =============================================================================
