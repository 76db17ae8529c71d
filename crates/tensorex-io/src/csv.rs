//! CSV - Delimited Text Arrays
//!
//! Reads two-dimensional tensors from delimited text and writes one- and
//! two-dimensional tensors back out. Each line is one row; fields are
//! separated by a single-byte delimiter.
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

use tensorex_core::{Error, Result, Scalar};
use tensorex_tensor::Tensor;

// =============================================================================
// Options
// =============================================================================

/// Options for [`load_csv`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field separator.
    pub delimiter: u8,
    /// Leading lines to skip before parsing, e.g. a header row.
    pub skip_rows: usize,
    /// Lines starting with this prefix are ignored.
    pub comments: Option<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            skip_rows: 0,
            comments: Some("#".to_string()),
        }
    }
}

impl CsvOptions {
    /// Sets the field separator.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the number of leading lines to skip.
    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    /// Sets or clears the comment prefix.
    pub fn with_comments(mut self, comments: Option<&str>) -> Self {
        self.comments = comments.map(str::to_string);
        self
    }
}

// =============================================================================
// Reading
// =============================================================================

/// Parses delimited text into a 2-D tensor.
///
/// Blank lines and comment lines are skipped. Every remaining row must have
/// the same number of fields.
///
/// # Example
/// ```rust
/// use tensorex_io::csv::{load_csv, CsvOptions};
///
/// let text = "# x,y\n1,2\n3,4\n";
/// let t = load_csv::<i32, _>(text.as_bytes(), &CsvOptions::default()).unwrap();
/// assert_eq!(t.shape(), &[2, 2]);
/// ```
pub fn load_csv<T, R>(reader: R, opts: &CsvOptions) -> Result<Tensor<T>>
where
    T: Scalar + FromStr,
    R: BufRead,
{
    let delimiter = char::from(opts.delimiter);
    let mut data = Vec::new();
    let mut columns: Option<usize> = None;
    let mut rows = 0usize;

    for (line_no, line) in reader.lines().enumerate().skip(opts.skip_rows) {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        if let Some(prefix) = &opts.comments {
            if line.trim_start().starts_with(prefix.as_str()) {
                continue;
            }
        }

        let before = data.len();
        for field in line.split(delimiter) {
            let field = field.trim();
            let value = field.parse::<T>().map_err(|_| {
                Error::serialization(format!(
                    "line {}: cannot parse {field:?} as {}",
                    line_no + 1,
                    T::DTYPE
                ))
            })?;
            data.push(value);
        }

        let width = data.len() - before;
        match columns {
            None => columns = Some(width),
            Some(expected) if expected != width => {
                return Err(Error::invalid_operation(format!(
                    "line {}: row has {width} fields, expected {expected}",
                    line_no + 1
                )));
            }
            Some(_) => {}
        }
        rows += 1;
    }

    tracing::debug!(rows, columns = columns.unwrap_or(0), "parsed csv");
    Tensor::from_vec(data, &[rows, columns.unwrap_or(0)])
}

// =============================================================================
// Writing
// =============================================================================

/// Writes a 1-D or 2-D tensor as delimited text, one row per line.
///
/// A 1-D tensor is written as a single row.
pub fn dump_csv<T, W>(mut writer: W, tensor: &Tensor<T>, delimiter: u8) -> Result<()>
where
    T: Scalar + Display,
    W: Write,
{
    let width = match tensor.shape() {
        [n] => *n,
        [_, n] => *n,
        shape => {
            return Err(Error::invalid_operation(format!(
                "dump_csv() requires a 1-D or 2-D tensor, got shape {shape:?}"
            )))
        }
    };

    let values = tensor.to_vec();
    let sep = char::from(delimiter).to_string();
    if width > 0 {
        for row in values.chunks(width) {
            let fields: Vec<String> = row.iter().map(ToString::to_string).collect();
            writeln!(writer, "{}", fields.join(&sep))?;
        }
    }
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_basic() {
        let text = "1.5, 2\n3,4.25\n";
        let t = load_csv::<f64, _>(text.as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(t.shape(), &[2, 2]);
        assert_eq!(t.to_vec(), vec![1.5, 2.0, 3.0, 4.25]);
    }

    #[test]
    fn test_skip_rows_comments_and_delimiter() {
        let text = "a;b;c\n# note\n\n1;2;3\n4;5;6\r\n";
        let opts = CsvOptions::default().with_delimiter(b';').with_skip_rows(1);
        let t = load_csv::<i64, _>(text.as_bytes(), &opts).unwrap();
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.to_vec(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = load_csv::<i32, _>("1,2\n3\n".as_bytes(), &CsvOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidOperation { .. }));
        let err = load_csv::<i32, _>("1,x\n".as_bytes(), &CsvOptions::default()).unwrap_err();
        assert!(matches!(err, Error::SerializationError { .. }));
    }

    #[test]
    fn test_empty_input() {
        let t = load_csv::<f32, _>("".as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(t.shape(), &[0, 0]);
    }

    #[test]
    fn test_dump() {
        let t = Tensor::from_vec(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
        let mut out = Vec::new();
        dump_csv(&mut out, &t.transpose(), b',').unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1,4\n2,5\n3,6\n");

        let v = Tensor::from_vec(vec![0.5f64, f64::NAN], &[2]).unwrap();
        let mut out = Vec::new();
        dump_csv(&mut out, &v, b'\t').unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0.5\tNaN\n");

        let cube = Tensor::from_vec(vec![0u8; 8], &[2, 2, 2]).unwrap();
        assert!(dump_csv(Vec::new(), &cube, b',').is_err());
    }

    #[test]
    fn test_nan_reads_back() {
        let t = load_csv::<f64, _>("NaN,inf\n".as_bytes(), &CsvOptions::default()).unwrap();
        let v = t.to_vec();
        assert!(v[0].is_nan());
        assert_eq!(v[1], f64::INFINITY);
    }
}
