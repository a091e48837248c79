mod common;

use std::fs;
use std::path::Path;
use common::synthetic_bitmap::bitmap_bytes;
use bmp_grayscale::pipeline::decode_file;
use bmp_grayscale::{run, BmpError, HeaderKind};
use tempfile::TempDir;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write_input(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    path
}

fn assert_missing(path: &Path) {
    assert!(!path.exists(), "{} should not have been created", path.display());
}

#[test]
fn converts_a_2x2_image() {
    init_logger();
    let dir = TempDir::new().unwrap();
    // BGR order: red, black / white, green
    let rows = vec![
        vec![0, 0, 255, 0, 0, 0],
        vec![255, 255, 255, 0, 255, 0],
    ];
    let input = write_input(&dir, "in.bmp", &bitmap_bytes(2, 2, 24, &rows, 0xFF, 0));
    let output = dir.path().join("out.bmp");

    run(&input, &output).unwrap();

    let original = fs::read(&input).unwrap();
    let written = fs::read(&output).unwrap();
    assert_eq!(written.len(), 54 + 2 * 8);
    assert_eq!(&written[..54], &original[..54]);
    assert_eq!(&written[54..62], &[76, 76, 76, 0, 0, 0, 0, 0]);
    assert_eq!(&written[62..70], &[255, 255, 255, 149, 149, 149, 0, 0]);
}

#[test]
fn headers_are_copied_even_with_a_gap_before_the_pixels() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let rows = vec![vec![10, 20, 30, 40, 50, 60, 70, 80, 90]];
    let input_bytes = bitmap_bytes(3, -1, 24, &rows, 0, 12);
    let input = write_input(&dir, "gap.bmp", &input_bytes);
    let output = dir.path().join("gap-out.bmp");

    run(&input, &output).unwrap();

    let written = fs::read(&output).unwrap();
    // data offset and file size still point past the gap; the gap itself is not re-emitted
    assert_eq!(&written[..54], &input_bytes[..54]);
    assert_eq!(u32::from_le_bytes(written[10..14].try_into().unwrap()), 66);
    assert_eq!(written.len(), 54 + 12);

    let expected = |b: u32, g: u32, r: u32| ((299 * r + 587 * g + 114 * b) / 1000) as u8;
    let g0 = expected(10, 20, 30);
    let g1 = expected(40, 50, 60);
    let g2 = expected(70, 80, 90);
    assert_eq!(&written[54..], &[g0, g0, g0, g1, g1, g1, g2, g2, g2, 0, 0, 0]);
}

#[test]
fn rows_keep_file_order() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let rows = vec![vec![0, 0, 0], vec![255, 255, 255]];
    let input = write_input(&dir, "order.bmp", &bitmap_bytes(1, 2, 24, &rows, 0, 0));

    let decoded = decode_file(&input).unwrap();
    assert_eq!(decoded.image.width, 1);
    assert_eq!(decoded.image.height, 2);
    assert_eq!(decoded.image.data[0].r, 0);
    assert_eq!(decoded.image.data[1].r, 255);
}

#[test]
fn missing_input_creates_no_output() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("does-not-exist.bmp");
    let output = dir.path().join("out.bmp");

    let err = run(&input, &output).unwrap_err();
    match &err {
        BmpError::InputOpen { path, .. } => assert_eq!(path, &input),
        other => panic!("unexpected error {other:?}")
    }
    assert!(err.to_string().contains("does-not-exist.bmp"));
    assert_missing(&output);
}

#[test]
fn eight_bit_input_is_rejected_before_output() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let mut bytes = bitmap_bytes(2, 2, 24, &[vec![0; 6], vec![0; 6]], 0, 0);
    bytes[28..30].copy_from_slice(&8u16.to_le_bytes());
    let input = write_input(&dir, "pal8.bmp", &bytes);
    let output = dir.path().join("out.bmp");

    let err = run(&input, &output).unwrap_err();
    assert!(matches!(err, BmpError::UnsupportedFormat { bit_count: 8 }));
    assert_missing(&output);
}

#[test]
fn truncated_header_is_reported() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let bytes = bitmap_bytes(1, 1, 24, &[vec![1, 2, 3]], 0, 0);
    let input = write_input(&dir, "short.bmp", &bytes[..20]);
    let output = dir.path().join("out.bmp");

    let err = run(&input, &output).unwrap_err();
    assert!(matches!(err, BmpError::TruncatedHeader { header: HeaderKind::Info, expected: 40, actual: 6 }));
    assert_missing(&output);
}

#[test]
fn truncated_pixels_report_the_failing_row() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let rows = vec![vec![1; 9], vec![2; 9], vec![3; 9]];
    let bytes = bitmap_bytes(3, 3, 24, &rows, 0, 0);
    // keep row 0 and half of row 1's pixels
    let input = write_input(&dir, "cut.bmp", &bytes[..54 + 12 + 5]);
    let output = dir.path().join("out.bmp");

    let err = run(&input, &output).unwrap_err();
    assert!(matches!(err, BmpError::ShortRowRead { row_index: 1, expected: 3, actual: 1 }));
    assert_eq!(err.to_string(), "Error reading pixel data on row 1 (expected 3, got 1)");
    assert_missing(&output);
}

#[test]
fn zero_width_is_rejected() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let bytes = bitmap_bytes(0, 4, 24, &[], 0, 0);
    let input = write_input(&dir, "empty.bmp", &bytes);
    let output = dir.path().join("out.bmp");

    let err = run(&input, &output).unwrap_err();
    assert!(matches!(err, BmpError::InvalidDimensions { width: 0, height: 4 }));
    assert_missing(&output);
}

#[test]
fn unwritable_output_is_reported() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "in.bmp", &bitmap_bytes(1, 1, 24, &[vec![1, 2, 3]], 0, 0));
    let output = dir.path().join("no-such-dir").join("out.bmp");

    let err = run(&input, &output).unwrap_err();
    assert!(matches!(err, BmpError::OutputOpen { .. }));
}

#[test]
fn converting_twice_changes_nothing() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let rows = vec![
        vec![12, 34, 56, 78, 90, 123, 200, 1, 99, 255, 128, 0, 7, 7, 7],
        vec![0, 0, 0, 255, 255, 255, 13, 14, 15, 250, 3, 90, 44, 88, 22],
    ];
    let input = write_input(&dir, "in.bmp", &bitmap_bytes(5, 2, 24, &rows, 0, 0));
    let once = dir.path().join("once.bmp");
    let twice = dir.path().join("twice.bmp");

    run(&input, &once).unwrap();
    run(&once, &twice).unwrap();
    assert_eq!(fs::read(&once).unwrap(), fs::read(&twice).unwrap());
}

#[test]
fn huge_declared_size_fails_before_allocating() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let mut bytes = bitmap_bytes(1, 1, 24, &[vec![1, 2, 3]], 0, 0);
    bytes[18..22].copy_from_slice(&100_000i32.to_le_bytes());
    bytes[22..26].copy_from_slice(&100_000i32.to_le_bytes());
    bytes.truncate(54);
    let input = write_input(&dir, "huge.bmp", &bytes);
    let output = dir.path().join("out.bmp");

    let err = run(&input, &output).unwrap_err();
    assert!(matches!(err, BmpError::ShortRowRead { row_index: 0, expected: 100_000, actual: 0 }));
    assert_missing(&output);
}
