//! File round-trips for tensorex-io.

use std::fs::File;
use std::io::BufReader;

use tempfile::TempDir;
use tensorex_core::{DType, Layout};
use tensorex_io::{
    detect_format, dump_csv, dump_npy, load_csv, load_npy, read_header, AnyTensor, CsvOptions,
    Format,
};
use tensorex_tensor::Tensor;

#[test]
fn test_npy_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("weights.npy");
    let t = Tensor::from_vec((0..12).map(|i| i as f32 * 0.5).collect(), &[3, 4]).unwrap();

    dump_npy(&path, &t).unwrap();
    assert_eq!(detect_format(&path), Some(Format::Npy));

    let header = read_header(&path).unwrap();
    assert_eq!(header.dtype, DType::F32);
    assert_eq!(header.shape, vec![3, 4]);
    assert_eq!(
        std::fs::metadata(&path).unwrap().len() as usize,
        header.data_offset + header.data_len()
    );

    let back: Tensor<f32> = load_npy(&path).unwrap();
    assert_eq!(back.shape(), &[3, 4]);
    assert_eq!(back.to_vec(), t.to_vec());
}

#[test]
fn test_npy_view_is_written_logically() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("t.npy");
    let t = Tensor::from_vec(vec![1i64, 2, 3, 4, 5, 6], &[2, 3]).unwrap().transpose();

    dump_npy(&path, &t).unwrap();
    let back: Tensor<i64> = load_npy(&path).unwrap();
    assert_eq!(back.shape(), &[3, 2]);
    assert_eq!(back.layout(), Layout::RowMajor);
    assert_eq!(back.to_vec(), vec![1, 4, 2, 5, 3, 6]);
}

#[test]
fn test_any_tensor_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("u.npy");
    dump_npy(&path, &Tensor::from_vec(vec![7u16, 8, 9], &[3]).unwrap()).unwrap();

    let any = AnyTensor::load_npy(&path).unwrap();
    assert_eq!(any.dtype(), DType::U16);
    assert_eq!(any.to_f64().unwrap().to_vec(), vec![7.0, 8.0, 9.0]);
    assert!(load_npy::<i32>(&path).is_err());
}

#[test]
fn test_csv_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("table.csv");
    let t = Tensor::from_vec(vec![1.25f64, -2.0, 3.5, 0.0], &[2, 2]).unwrap();

    dump_csv(File::create(&path).unwrap(), &t, b',').unwrap();
    assert_eq!(detect_format(&path), Some(Format::Csv));

    let reader = BufReader::new(File::open(&path).unwrap());
    let back = load_csv::<f64, _>(reader, &CsvOptions::default()).unwrap();
    assert_eq!(back.shape(), &[2, 2]);
    assert_eq!(back.to_vec(), t.to_vec());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = load_npy::<f64>(dir.path().join("absent.npy")).unwrap_err();
    assert!(matches!(err, tensorex_core::Error::Io { .. }));
}

#[test]
fn test_read_header_checks_magic_and_version_first() {
    let dir = TempDir::new().unwrap();

    // A garbage prefix whose length bytes claim a 4 GiB header.
    let not_npy = dir.path().join("not.npy");
    let mut garbage = b"XNUMPY".to_vec();
    garbage.extend_from_slice(&[2, 0, 0xff, 0xff, 0xff, 0xff]);
    std::fs::write(&not_npy, &garbage).unwrap();
    assert!(matches!(
        read_header(&not_npy),
        Err(tensorex_core::Error::SerializationError { .. })
    ));

    let mut future = b"\x93NUMPY".to_vec();
    future.extend_from_slice(&[9, 0, 0xff, 0xff, 0xff, 0xff]);
    let future_path = dir.path().join("future.npy");
    std::fs::write(&future_path, &future).unwrap();
    assert!(read_header(&future_path).is_err());

    // A valid magic with an oversized declared length fails as truncated.
    let mut short = b"\x93NUMPY".to_vec();
    short.extend_from_slice(&[2, 0, 0xff, 0xff, 0xff, 0xff]);
    short.extend_from_slice(b"{'descr': '<f8'");
    let short_path = dir.path().join("short.npy");
    std::fs::write(&short_path, &short).unwrap();
    assert!(matches!(
        read_header(&short_path),
        Err(tensorex_core::Error::SerializationError { .. })
    ));
}
