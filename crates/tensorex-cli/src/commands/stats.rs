//! Stats - Summary Statistics Command
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use tensorex_core::DType;
use tensorex_tensor::{reduce, ReduceOptions, Tensor};

use super::utils::{format_shape, load_any, print_header, print_kv};
use crate::cli::StatsArgs;
use crate::error::CliResult;

// =============================================================================
// Statistics
// =============================================================================

struct Summary {
    min: Tensor<f64>,
    max: Tensor<f64>,
    mean: Tensor<f64>,
    std: Tensor<f64>,
    sum: Tensor<f64>,
}

fn summarize(t: &Tensor<f64>, axis: Option<i64>) -> CliResult<Summary> {
    let opts = match axis {
        Some(axis) => ReduceOptions::axis(axis),
        None => ReduceOptions::all(),
    };
    Ok(Summary {
        min: reduce::min(t, &opts)?,
        max: reduce::max(t, &opts)?,
        mean: reduce::mean(t, &opts)?,
        std: reduce::stddev(t, &opts, 0)?,
        sum: reduce::sum(t, &opts)?,
    })
}

// =============================================================================
// Execute Command
// =============================================================================

/// Execute the `stats` command
pub fn execute(args: StatsArgs) -> CliResult<()> {
    let tensor = load_any(&args.file, DType::F64, 0)?;
    let values = tensor.to_f64()?;
    let summary = summarize(&values, args.axis)?;

    print_header(&format!("Statistics for {}", args.file.display()));
    print_kv("DType", &tensor.dtype().to_string());
    print_kv("Shape", &format_shape(tensor.shape()));
    if let Some(axis) = args.axis {
        print_kv("Axis", &axis.to_string());
    }

    let rows = [
        ("Min", &summary.min),
        ("Max", &summary.max),
        ("Mean", &summary.mean),
        ("Std", &summary.std),
        ("Sum", &summary.sum),
    ];
    for (name, value) in rows {
        let text = if value.ndim() == 0 {
            value.item()?.to_string()
        } else {
            value.to_string()
        };
        print_kv(name, &text);
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_all() {
        let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        let s = summarize(&t, None).unwrap();
        assert_eq!(s.min.item().unwrap(), 1.0);
        assert_eq!(s.max.item().unwrap(), 4.0);
        assert_eq!(s.mean.item().unwrap(), 2.5);
        assert_eq!(s.sum.item().unwrap(), 10.0);
        assert!((s.std.item().unwrap() - 1.25f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_summarize_axis() {
        let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        let s = summarize(&t, Some(-1)).unwrap();
        assert_eq!(s.sum.to_vec(), vec![3.0, 7.0]);
        assert_eq!(s.max.to_vec(), vec![2.0, 4.0]);
        assert!(summarize(&t, Some(2)).is_err());
    }
}
