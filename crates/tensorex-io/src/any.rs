//! Any - Runtime-Typed Tensors
//!
//! [`AnyTensor`] holds a tensor whose element type is only known once a file
//! has been opened. It bridges the typed NPY and CSV routines for callers
//! such as the command-line tool.
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use std::io::{BufRead, Write};
use std::path::Path;

use tensorex_core::{DType, Layout, Result, Scalar};
use tensorex_tensor::{PrintOptions, Tensor};

use crate::csv::{dump_csv, load_csv, CsvOptions};
use crate::npy::{decode_data, dump_npy, parse_header, to_npy_bytes};

// =============================================================================
// AnyTensor
// =============================================================================

/// A tensor whose element type is chosen at runtime.
#[derive(Debug, Clone)]
pub enum AnyTensor {
    /// Boolean elements.
    Bool(Tensor<bool>),
    /// `i8` elements.
    I8(Tensor<i8>),
    /// `i16` elements.
    I16(Tensor<i16>),
    /// `i32` elements.
    I32(Tensor<i32>),
    /// `i64` elements.
    I64(Tensor<i64>),
    /// `u8` elements.
    U8(Tensor<u8>),
    /// `u16` elements.
    U16(Tensor<u16>),
    /// `u32` elements.
    U32(Tensor<u32>),
    /// `u64` elements.
    U64(Tensor<u64>),
    /// `f32` elements.
    F32(Tensor<f32>),
    /// `f64` elements.
    F64(Tensor<f64>),
}

macro_rules! dispatch {
    ($value:expr, $t:ident => $body:expr) => {
        match $value {
            AnyTensor::Bool($t) => $body,
            AnyTensor::I8($t) => $body,
            AnyTensor::I16($t) => $body,
            AnyTensor::I32($t) => $body,
            AnyTensor::I64($t) => $body,
            AnyTensor::U8($t) => $body,
            AnyTensor::U16($t) => $body,
            AnyTensor::U32($t) => $body,
            AnyTensor::U64($t) => $body,
            AnyTensor::F32($t) => $body,
            AnyTensor::F64($t) => $body,
        }
    };
}

/// Builds the variant for `dtype`, calling `load` with the matching type.
macro_rules! by_dtype {
    ($dtype:expr, $load:ident ( $($arg:expr),* )) => {
        match $dtype {
            DType::Bool => AnyTensor::Bool($load($($arg),*)?),
            DType::I8 => AnyTensor::I8($load($($arg),*)?),
            DType::I16 => AnyTensor::I16($load($($arg),*)?),
            DType::I32 => AnyTensor::I32($load($($arg),*)?),
            DType::I64 => AnyTensor::I64($load($($arg),*)?),
            DType::U8 => AnyTensor::U8($load($($arg),*)?),
            DType::U16 => AnyTensor::U16($load($($arg),*)?),
            DType::U32 => AnyTensor::U32($load($($arg),*)?),
            DType::U64 => AnyTensor::U64($load($($arg),*)?),
            DType::F32 => AnyTensor::F32($load($($arg),*)?),
            DType::F64 => AnyTensor::F64($load($($arg),*)?),
        }
    };
}

fn dtype_of<T: Scalar>(_: &Tensor<T>) -> DType {
    T::DTYPE
}

fn widen<T: Scalar>(t: &Tensor<T>, f: impl Fn(T) -> f64) -> Result<Tensor<f64>> {
    Tensor::from_vec(t.iter().map(f).collect(), t.shape())
}

impl AnyTensor {
    /// Element type.
    pub fn dtype(&self) -> DType {
        dispatch!(self, t => dtype_of(t))
    }

    /// Shape.
    pub fn shape(&self) -> &[usize] {
        dispatch!(self, t => t.shape())
    }

    /// Number of elements.
    pub fn numel(&self) -> usize {
        dispatch!(self, t => t.numel())
    }

    /// Memory layout.
    pub fn layout(&self) -> Layout {
        dispatch!(self, t => t.layout())
    }

    /// Converts to `f64`; booleans become `0.0` or `1.0`.
    pub fn to_f64(&self) -> Result<Tensor<f64>> {
        match self {
            Self::Bool(t) => widen(t, |v| if v { 1.0 } else { 0.0 }),
            Self::I8(t) => widen(t, f64::from),
            Self::I16(t) => widen(t, f64::from),
            Self::I32(t) => widen(t, f64::from),
            Self::I64(t) => widen(t, |v| v as f64),
            Self::U8(t) => widen(t, f64::from),
            Self::U16(t) => widen(t, f64::from),
            Self::U32(t) => widen(t, f64::from),
            Self::U64(t) => widen(t, |v| v as f64),
            Self::F32(t) => widen(t, f64::from),
            Self::F64(t) => Ok(t.clone()),
        }
    }

    /// Formats the elements with the given print options.
    pub fn display_with(&self, opts: PrintOptions) -> String {
        dispatch!(self, t => t.display_with(opts).to_string())
    }

    // -------------------------------------------------------------------------
    // NPY
    // -------------------------------------------------------------------------

    /// Encodes as `.npy` bytes.
    pub fn to_npy_bytes(&self) -> Vec<u8> {
        dispatch!(self, t => to_npy_bytes(t))
    }

    /// Decodes `.npy` bytes of any supported dtype.
    pub fn from_npy_bytes(bytes: &[u8]) -> Result<Self> {
        let header = parse_header(bytes)?;
        Ok(by_dtype!(header.dtype, decode_data(&header, bytes)))
    }

    /// Loads an `.npy` file of any supported dtype.
    pub fn load_npy(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading npy");
        Self::from_npy_bytes(&std::fs::read(path)?)
    }

    /// Writes to an `.npy` file.
    pub fn dump_npy(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        dispatch!(self, t => dump_npy(path, t))
    }

    // -------------------------------------------------------------------------
    // CSV
    // -------------------------------------------------------------------------

    /// Parses delimited text as elements of `dtype`.
    pub fn load_csv<R: BufRead>(reader: R, opts: &CsvOptions, dtype: DType) -> Result<Self> {
        Ok(by_dtype!(dtype, load_csv(reader, opts)))
    }

    /// Writes a 1-D or 2-D tensor as delimited text.
    pub fn dump_csv<W: Write>(&self, writer: W, delimiter: u8) -> Result<()> {
        dispatch!(self, t => dump_csv(writer, t, delimiter))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_npy_dispatch() {
        let t = Tensor::from_vec(vec![true, false, true], &[3]).unwrap();
        let any = AnyTensor::from_npy_bytes(&to_npy_bytes(&t)).unwrap();
        assert_eq!(any.dtype(), DType::Bool);
        assert_eq!(any.shape(), &[3]);
        assert_eq!(any.to_f64().unwrap().to_vec(), vec![1.0, 0.0, 1.0]);
        assert_eq!(any.display_with(PrintOptions::default()), "{ true, false,  true}");
        assert_eq!(any.to_npy_bytes(), to_npy_bytes(&t));
    }

    #[test]
    fn test_csv_dispatch() {
        let any = AnyTensor::load_csv("1,2\n3,4\n".as_bytes(), &CsvOptions::default(), DType::U8)
            .unwrap();
        assert_eq!(any.dtype(), DType::U8);
        assert_eq!(any.numel(), 4);

        let mut out = Vec::new();
        any.dump_csv(&mut out, b' ').unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1 2\n3 4\n");

        assert!(AnyTensor::load_csv("-1\n".as_bytes(), &CsvOptions::default(), DType::U8).is_err());
    }
}
