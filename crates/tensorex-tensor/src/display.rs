//! Display - Nested-Brace Tensor Printing
//!
//! Tensors print as nested braces, one level per dimension, with columns
//! right-aligned to the widest element:
//!
//! ```text
//! {{  1,  20},
//!  {300,   4}}
//! ```
//!
//! Large tensors are summarized: when the element count exceeds
//! `PrintOptions::threshold`, each long axis keeps `edge_items` leading and
//! trailing entries around a `...` marker. Innermost rows wrap at
//! `line_width` characters.
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use core::fmt;

use tensorex_core::{EngineConfig, PrintOptions, Scalar};

use crate::tensor::Tensor;

// =============================================================================
// Element Rendering
// =============================================================================

/// Element types that can be rendered by the tensor printer.
pub trait DisplayElement: Scalar {
    /// Renders one element. `precision` applies to floating point values.
    fn render(&self, precision: Option<usize>) -> String;
}

macro_rules! impl_display_integer {
    ($($ty:ty),*) => {
        $(
            impl DisplayElement for $ty {
                fn render(&self, _precision: Option<usize>) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_display_integer!(i8, i16, i32, i64, u8, u16, u32, u64);

impl DisplayElement for bool {
    fn render(&self, _precision: Option<usize>) -> String {
        self.to_string()
    }
}

macro_rules! impl_display_float {
    ($($ty:ty),*) => {
        $(
            impl DisplayElement for $ty {
                fn render(&self, precision: Option<usize>) -> String {
                    let v = *self;
                    if v.is_nan() {
                        return "nan".to_string();
                    }
                    if v.is_infinite() {
                        return if v > 0.0 { "inf".to_string() } else { "-inf".to_string() };
                    }
                    if let Some(p) = precision {
                        return format!("{v:.p$}");
                    }

                    let magnitude = v.abs();
                    if magnitude >= 1e16 || (magnitude != 0.0 && magnitude < 1e-4) {
                        return format!("{v:e}");
                    }
                    let mut s = v.to_string();
                    if !s.contains('.') {
                        s.push('.');
                    }
                    s
                }
            }
        )*
    };
}

impl_display_float!(f32, f64);

// =============================================================================
// Layout Plan
// =============================================================================

/// Visible entries of one axis; `None` marks the summarization gap.
fn axis_plan(extent: usize, edge_items: usize, summarize: bool) -> Vec<Option<usize>> {
    if summarize && extent > 2 * edge_items {
        (0..edge_items)
            .map(Some)
            .chain(core::iter::once(None))
            .chain((extent - edge_items..extent).map(Some))
            .collect()
    } else {
        (0..extent).map(Some).collect()
    }
}

/// Calls `f` with every visible multi-index in row-major order.
fn visit(plan: &[Vec<Option<usize>>], prefix: &mut Vec<usize>, f: &mut impl FnMut(&[usize])) {
    let axis = prefix.len();
    if axis == plan.len() {
        f(prefix);
        return;
    }
    for i in plan[axis].iter().flatten() {
        prefix.push(*i);
        visit(plan, prefix, f);
        prefix.pop();
    }
}

struct Printer<'a> {
    plan: &'a [Vec<Option<usize>>],
    width: usize,
    line_width: usize,
}

impl Printer<'_> {
    fn push_indent(out: &mut String, n: usize) {
        out.extend(core::iter::repeat(' ').take(n));
    }

    fn write_block(&self, out: &mut String, axis: usize, cells: &mut impl Iterator<Item = String>) {
        let ndim = self.plan.len();
        out.push('{');

        if axis + 1 == ndim {
            let indent = axis + 1;
            let mut column = indent;
            for (k, entry) in self.plan[axis].iter().enumerate() {
                let item = match entry {
                    Some(_) => format!("{:>w$}", cells.next().unwrap_or_default(), w = self.width),
                    None => "...".to_string(),
                };
                if k > 0 {
                    out.push(',');
                    if column + 2 + item.len() > self.line_width {
                        out.push('\n');
                        Self::push_indent(out, indent);
                        column = indent;
                    } else {
                        out.push(' ');
                        column += 2;
                    }
                }
                out.push_str(&item);
                column += item.len();
            }
        } else {
            let blank_lines = ndim - axis - 1;
            for (k, entry) in self.plan[axis].iter().enumerate() {
                if k > 0 {
                    out.push(',');
                    out.extend(core::iter::repeat('\n').take(blank_lines));
                    Self::push_indent(out, axis + 1);
                }
                match entry {
                    Some(_) => self.write_block(out, axis + 1, cells),
                    None => out.push_str("..."),
                }
            }
        }

        out.push('}');
    }
}

// =============================================================================
// Tensor Formatting
// =============================================================================

/// A tensor paired with print options; see [`Tensor::display_with`].
pub struct TensorDisplay<'a, T: Scalar> {
    tensor: &'a Tensor<T>,
    opts: PrintOptions,
}

impl<T: DisplayElement> TensorDisplay<'_, T> {
    fn render(&self) -> String {
        let t = self.tensor;
        let opts = &self.opts;
        if t.ndim() == 0 {
            return t
                .storage()
                .as_slice()
                .get(t.offset())
                .map(|v| v.render(opts.precision))
                .unwrap_or_default();
        }

        let summarize = t.numel() > opts.threshold;
        let plan: Vec<Vec<Option<usize>>> = t
            .shape()
            .iter()
            .map(|&n| axis_plan(n, opts.edge_items, summarize))
            .collect();

        let mut cells = Vec::new();
        {
            let data = t.storage().as_slice();
            visit(&plan, &mut Vec::with_capacity(t.ndim()), &mut |idx| {
                cells.push(data[t.storage_offset(idx)].render(opts.precision));
            });
        }
        let width = cells.iter().map(String::len).max().unwrap_or(0);

        let printer = Printer {
            plan: &plan,
            width,
            line_width: opts.line_width,
        };
        let mut out = String::new();
        printer.write_block(&mut out, 0, &mut cells.into_iter());
        out
    }
}

impl<T: DisplayElement> fmt::Display for TensorDisplay<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl<T: DisplayElement> Tensor<T> {
    /// Formats with explicit print options instead of the process-wide ones.
    ///
    /// # Example
    /// ```rust
    /// use tensorex_core::PrintOptions;
    /// use tensorex_tensor::Tensor;
    ///
    /// let t = Tensor::from_vec(vec![1.0, 2.5], &[2]).unwrap();
    /// let opts = PrintOptions::default().with_precision(2);
    /// assert_eq!(t.display_with(opts).to_string(), "{1.00, 2.50}");
    /// ```
    pub fn display_with(&self, opts: PrintOptions) -> TensorDisplay<'_, T> {
        TensorDisplay { tensor: self, opts }
    }
}

impl<T: DisplayElement> fmt::Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display_with(EngineConfig::current().print).fmt(f)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> PrintOptions {
        PrintOptions::default()
    }

    #[test]
    fn test_vector_and_scalar() {
        let t = Tensor::from_vec(vec![1, 2, 3], &[3]).unwrap();
        assert_eq!(format!("{t}"), "{1, 2, 3}");
        assert_eq!(Tensor::scalar(5i64).display_with(opts()).to_string(), "5");
        assert_eq!(Tensor::<i32>::from_vec(vec![], &[0]).unwrap().display_with(opts()).to_string(), "{}");
    }

    #[test]
    fn test_matrix_right_aligned() {
        let t = Tensor::from_vec(vec![1, 20, 300, 4], &[2, 2]).unwrap();
        assert_eq!(t.display_with(opts()).to_string(), "{{  1,  20},\n {300,   4}}");
    }

    #[test]
    fn test_views_print_logically() {
        let t = Tensor::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        assert_eq!(t.transpose().display_with(opts()).to_string(), "{{1, 3},\n {2, 4}}");
    }

    #[test]
    fn test_three_dims_separate_blocks() {
        let t = Tensor::from_vec(vec![1, 2, 3, 4], &[2, 1, 2]).unwrap();
        assert_eq!(t.display_with(opts()).to_string(), "{{{1, 2}},\n\n {{3, 4}}}");
    }

    #[test]
    fn test_float_rendering() {
        let t = Tensor::from_vec(vec![1.0, 2.5], &[2]).unwrap();
        assert_eq!(t.display_with(opts()).to_string(), "{ 1., 2.5}");
        assert_eq!(t.display_with(opts().with_precision(2)).to_string(), "{1.00, 2.50}");

        let special = Tensor::from_vec(vec![f64::NAN, f64::INFINITY, f64::NEG_INFINITY], &[3]).unwrap();
        assert_eq!(special.display_with(opts()).to_string(), "{ nan,  inf, -inf}");
        assert_eq!(1e-7f64.render(None), "1e-7");
    }

    #[test]
    fn test_bool_rendering() {
        let t = Tensor::from_vec(vec![true, false], &[2]).unwrap();
        assert_eq!(t.display_with(opts().with_precision(3)).to_string(), "{ true, false}");
    }

    #[test]
    fn test_summarized_vector() {
        let t = Tensor::from_vec((0..10).collect::<Vec<i32>>(), &[10]).unwrap();
        let o = opts().with_threshold(5).with_edge_items(2);
        assert_eq!(t.display_with(o).to_string(), "{0, 1, ..., 8, 9}");
    }

    #[test]
    fn test_summarized_matrix() {
        let t = Tensor::from_vec((0..100).collect::<Vec<i32>>(), &[10, 10]).unwrap();
        let o = opts().with_threshold(20).with_edge_items(1);
        assert_eq!(
            t.display_with(o).to_string(),
            "{{ 0, ...,  9},\n ...,\n {90, ..., 99}}"
        );
    }

    #[test]
    fn test_line_wrapping() {
        let t = Tensor::from_vec((0..30).collect::<Vec<i32>>(), &[30]).unwrap();
        let text = t.display_with(opts().with_line_width(20)).to_string();
        assert!(text.lines().count() > 1);
        assert!(text.lines().all(|l| l.len() <= 21));
        let digits: String = text.chars().filter(char::is_ascii_digit).collect();
        let expected: String = (0..30).map(|i| i.to_string()).collect();
        assert_eq!(digits, expected);
    }
}
