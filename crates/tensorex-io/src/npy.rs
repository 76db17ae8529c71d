//! NPY - NumPy Binary Array Files
//!
//! Reads and writes the `.npy` format: a magic string, a format version, a
//! little-endian header length and an ASCII Python dict describing the
//! array, followed by the raw element bytes.
//!
//! ```text
//! \x93NUMPY 0x01 0x00 <u16 len> {'descr': '<f8', 'fortran_order': False, 'shape': (2, 3), }   \n
//! ```
//!
//! Version 1.0 is written whenever the header fits a `u16` length, version
//! 2.0 otherwise. Versions 1.0, 2.0 and 3.0 are read. The header is padded
//! with spaces so that the data starts on a 64-byte boundary.
//!
//! # Key Features
//! - Header inspection without reading array data
//! - Big-endian files are byte-swapped on load
//! - `fortran_order: True` loads into a column-major tensor
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tensorex_core::{DType, Error, Layout, Result, Scalar};
use tensorex_tensor::Tensor;

// =============================================================================
// Constants
// =============================================================================

/// Magic string opening every `.npy` file.
pub const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Alignment of the start of the data section.
const ALIGNMENT: usize = 64;

// =============================================================================
// Element Encoding
// =============================================================================

/// Element types with an NPY wire representation.
pub trait NpyElement: Scalar {
    /// Encodes elements as little-endian bytes.
    fn encode(values: &[Self], out: &mut Vec<u8>);

    /// Decodes elements from bytes in the given byte order.
    fn decode(bytes: &[u8], little_endian: bool) -> Vec<Self>;
}

impl NpyElement for bool {
    fn encode(values: &[Self], out: &mut Vec<u8>) {
        out.extend(values.iter().map(|&v| u8::from(v)));
    }

    fn decode(bytes: &[u8], _little_endian: bool) -> Vec<Self> {
        bytes.iter().map(|&b| b != 0).collect()
    }
}

macro_rules! impl_npy_element {
    ($($ty:ty),*) => {
        $(
            impl NpyElement for $ty {
                fn encode(values: &[Self], out: &mut Vec<u8>) {
                    if cfg!(target_endian = "little") {
                        out.extend_from_slice(bytemuck::cast_slice(values));
                    } else {
                        for v in values {
                            out.extend_from_slice(&v.to_le_bytes());
                        }
                    }
                }

                fn decode(bytes: &[u8], little_endian: bool) -> Vec<Self> {
                    if little_endian == cfg!(target_endian = "little") {
                        return bytemuck::pod_collect_to_vec(bytes);
                    }
                    bytes
                        .chunks_exact(core::mem::size_of::<$ty>())
                        .map(|chunk| {
                            let mut raw = [0u8; core::mem::size_of::<$ty>()];
                            raw.copy_from_slice(chunk);
                            if little_endian {
                                <$ty>::from_le_bytes(raw)
                            } else {
                                <$ty>::from_be_bytes(raw)
                            }
                        })
                        .collect()
                }
            }
        )*
    };
}

impl_npy_element!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

// =============================================================================
// Header
// =============================================================================

/// The decoded header of an `.npy` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpyHeader {
    /// Format version `(major, minor)`.
    pub version: (u8, u8),
    /// Element type.
    pub dtype: DType,
    /// Byte order of the element data.
    pub little_endian: bool,
    /// Whether the data is stored in column-major order.
    pub fortran_order: bool,
    /// Array shape.
    pub shape: Vec<usize>,
    /// Bytes preceding the data section.
    pub data_offset: usize,
}

impl NpyHeader {
    /// Header for a tensor about to be written.
    fn for_tensor<T: Scalar>(tensor: &Tensor<T>) -> Self {
        Self {
            version: (1, 0),
            dtype: T::DTYPE,
            little_endian: true,
            fortran_order: tensor.layout() == Layout::ColumnMajor && tensor.is_contiguous(),
            shape: tensor.shape().to_vec(),
            data_offset: 0,
        }
    }

    /// Number of elements, saturating at `usize::MAX`.
    pub fn numel(&self) -> usize {
        self.shape.iter().fold(1usize, |acc, &d| acc.saturating_mul(d))
    }

    /// Size of the data section in bytes, saturating at `usize::MAX`.
    pub fn data_len(&self) -> usize {
        self.numel().saturating_mul(self.dtype.size_of())
    }

    /// Memory layout of the stored data.
    pub fn layout(&self) -> Layout {
        if self.fortran_order {
            Layout::ColumnMajor
        } else {
            Layout::RowMajor
        }
    }

    /// The NumPy type string, e.g. `<f8` or `|u1`.
    pub fn descr(&self) -> String {
        let order = if self.dtype.size_of() == 1 {
            '|'
        } else if self.little_endian {
            '<'
        } else {
            '>'
        };
        format!("{order}{}{}", self.dtype.kind(), self.dtype.size_of())
    }

    fn dict(&self) -> String {
        let shape = match self.shape.as_slice() {
            [] => "()".to_string(),
            [n] => format!("({n},)"),
            dims => {
                let parts: Vec<String> = dims.iter().map(usize::to_string).collect();
                format!("({})", parts.join(", "))
            }
        };
        let fortran = if self.fortran_order { "True" } else { "False" };
        format!(
            "{{'descr': '{}', 'fortran_order': {fortran}, 'shape': {shape}, }}",
            self.descr()
        )
    }

    /// Encodes the magic string, version, length and padded dict.
    fn encode(&self) -> Vec<u8> {
        let dict = self.dict();
        // Dict plus the newline terminator.
        let body = dict.len() + 1;
        let v1_total = (MAGIC.len() + 4 + body).next_multiple_of(ALIGNMENT);
        let (major, prefix) = if v1_total - MAGIC.len() - 4 <= usize::from(u16::MAX) {
            (1u8, MAGIC.len() + 4)
        } else {
            (2u8, MAGIC.len() + 6)
        };
        let total = (prefix + body).next_multiple_of(ALIGNMENT);
        let header_len = total - prefix;

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(MAGIC);
        out.push(major);
        out.push(0);
        if major == 1 {
            out.extend_from_slice(&(header_len as u16).to_le_bytes());
        } else {
            out.extend_from_slice(&(header_len as u32).to_le_bytes());
        }
        out.extend_from_slice(dict.as_bytes());
        out.resize(total - 1, b' ');
        out.push(b'\n');
        out
    }
}

fn malformed(message: impl Into<String>) -> Error {
    Error::serialization(format!("invalid npy header: {}", message.into()))
}

/// Splits the dict body at the three keys, which must appear in order.
fn key_values(dict: &str) -> Result<[&str; 3]> {
    const KEYS: [&str; 3] = ["'descr':", "'fortran_order':", "'shape':"];
    let mut positions = [0usize; 3];
    for (slot, key) in positions.iter_mut().zip(KEYS) {
        *slot = dict
            .find(key)
            .ok_or_else(|| malformed(format!("missing {key} key")))?;
    }
    if positions[0] >= positions[1] || positions[1] >= positions[2] {
        return Err(malformed("header keys in wrong order"));
    }

    let value = |i: usize, end: usize| {
        dict[positions[i] + KEYS[i].len()..end].trim_end_matches(',')
    };
    Ok([
        value(0, positions[1]),
        value(1, positions[2]),
        value(2, dict.len()),
    ])
}

fn parse_descr(descr: &str) -> Result<(DType, bool)> {
    let descr = descr
        .strip_prefix('\'')
        .and_then(|d| d.strip_suffix('\''))
        .ok_or_else(|| malformed(format!("descr {descr} is not a string")))?;
    let mut chars = descr.chars();
    let order = chars.next().ok_or_else(|| malformed("empty descr"))?;
    let kind = chars.next().ok_or_else(|| malformed("descr without kind"))?;
    let size: usize = chars
        .as_str()
        .parse()
        .map_err(|_| malformed(format!("descr {descr} has no element size")))?;

    let little_endian = match order {
        '<' | '|' => true,
        '=' => cfg!(target_endian = "little"),
        '>' => false,
        other => return Err(malformed(format!("unknown byte order {other:?}"))),
    };
    let dtype = DType::from_kind(kind, size)
        .ok_or_else(|| Error::serialization(format!("unsupported npy dtype '{descr}'")))?;
    Ok((dtype, little_endian))
}

/// Rejects shapes whose extents or byte size do not fit in `usize`.
fn check_extent(shape: &[usize], dtype: DType) -> Result<()> {
    let extent = shape
        .iter()
        .try_fold(dtype.size_of(), |acc, &d| acc.checked_mul(d.max(1)));
    if extent.is_none() {
        return Err(malformed(format!("shape {shape:?} overflows the address space")));
    }
    Ok(())
}

fn parse_shape(shape: &str) -> Result<Vec<usize>> {
    let inner = shape
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| malformed(format!("shape {shape} is not a tuple")))?;
    inner
        .split(',')
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.trim_end_matches('L')
                .parse()
                .map_err(|_| malformed(format!("bad shape entry {part:?}")))
        })
        .collect()
}

/// Parses the header at the front of `bytes`.
pub fn parse_header(bytes: &[u8]) -> Result<NpyHeader> {
    if bytes.len() < MAGIC.len() + 4 || &bytes[..MAGIC.len()] != MAGIC {
        return Err(Error::serialization("not an npy file: magic string mismatch"));
    }
    let major = bytes[6];
    let minor = bytes[7];
    let (len, start) = match major {
        1 => (usize::from(u16::from_le_bytes([bytes[8], bytes[9]])), 10),
        2 | 3 => {
            let raw = bytes
                .get(8..12)
                .ok_or_else(|| malformed("truncated header length"))?;
            (u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize, 12)
        }
        v => {
            return Err(Error::serialization(format!(
                "unsupported npy format version {v}.{minor}"
            )))
        }
    };

    let raw = bytes
        .get(start..start + len)
        .ok_or_else(|| malformed("truncated header"))?;
    let text = std::str::from_utf8(raw).map_err(|_| malformed("header is not text"))?;
    let text = text
        .strip_suffix('\n')
        .ok_or_else(|| malformed("header is not newline terminated"))?;

    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let dict = compact
        .strip_prefix('{')
        .and_then(|d| d.strip_suffix('}'))
        .ok_or_else(|| malformed("header is not a dict"))?;

    let [descr, fortran, shape] = key_values(dict)?;
    let (dtype, little_endian) = parse_descr(descr)?;
    let fortran_order = match fortran {
        "True" => true,
        "False" => false,
        other => return Err(malformed(format!("invalid fortran_order value {other}"))),
    };
    let shape = parse_shape(shape)?;
    check_extent(&shape, dtype)?;

    Ok(NpyHeader {
        version: (major, minor),
        dtype,
        little_endian,
        fortran_order,
        shape,
        data_offset: start + len,
    })
}

/// Reads only the header of an `.npy` file.
pub fn read_header(path: impl AsRef<Path>) -> Result<NpyHeader> {
    let mut file = BufReader::new(File::open(path.as_ref())?);
    let mut prefix = [0u8; 12];
    file.read_exact(&mut prefix)?;
    if &prefix[..MAGIC.len()] != MAGIC {
        return Err(Error::serialization("not an npy file: magic string mismatch"));
    }
    let total = match prefix[6] {
        1 => usize::from(u16::from_le_bytes([prefix[8], prefix[9]])) + 10,
        2 | 3 => u32::from_le_bytes([prefix[8], prefix[9], prefix[10], prefix[11]]) as usize + 12,
        v => {
            return Err(Error::serialization(format!(
                "unsupported npy format version {v}.{}",
                prefix[7]
            )))
        }
    };

    // Reads at most the declared header; a short file surfaces as a truncated header.
    let mut bytes = prefix.to_vec();
    let remaining = total.saturating_sub(prefix.len()) as u64;
    file.take(remaining).read_to_end(&mut bytes)?;
    parse_header(&bytes)
}

// =============================================================================
// Typed Reading and Writing
// =============================================================================

/// Encodes a tensor as `.npy` bytes.
///
/// Column-major contiguous tensors are written with `fortran_order: True`;
/// everything else is written in row-major order.
pub fn to_npy_bytes<T: NpyElement>(tensor: &Tensor<T>) -> Vec<u8> {
    let header = NpyHeader::for_tensor(tensor);
    let data = tensor.to_vec_in(header.layout());
    let mut out = header.encode();
    out.reserve(header.data_len());
    T::encode(&data, &mut out);
    out
}

pub(crate) fn decode_data<T: NpyElement>(header: &NpyHeader, bytes: &[u8]) -> Result<Tensor<T>> {
    if header.dtype != T::DTYPE {
        return Err(Error::DTypeMismatch {
            expected: T::DTYPE,
            actual: header.dtype,
        });
    }
    let data = &bytes[header.data_offset.min(bytes.len())..];
    if data.len() != header.data_len() {
        return Err(Error::serialization(format!(
            "npy data holds {} bytes, header describes {}",
            data.len(),
            header.data_len()
        )));
    }
    let values = T::decode(data, header.little_endian);
    Tensor::from_vec_with_layout(values, &header.shape, header.layout())
}

/// Decodes `.npy` bytes into a tensor of element type `T`.
pub fn from_npy_bytes<T: NpyElement>(bytes: &[u8]) -> Result<Tensor<T>> {
    let header = parse_header(bytes)?;
    decode_data(&header, bytes)
}

/// Writes a tensor to an `.npy` file.
pub fn dump_npy<T: NpyElement>(path: impl AsRef<Path>, tensor: &Tensor<T>) -> Result<()> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), shape = ?tensor.shape(), dtype = %T::DTYPE, "writing npy");
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(&to_npy_bytes(tensor))?;
    file.flush()?;
    Ok(())
}

/// Loads an `.npy` file into a tensor of element type `T`.
pub fn load_npy<T: NpyElement>(path: impl AsRef<Path>) -> Result<Tensor<T>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let header = parse_header(&bytes)?;
    tracing::debug!(path = %path.display(), shape = ?header.shape, dtype = %header.dtype, "loaded npy");
    decode_data(&header, &bytes)
}

// =============================================================================
// Tests
// =============================================================================
