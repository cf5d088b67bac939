#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_odd_width_integers() {
    let mut out = Vec::new();
    write_int(&mut out, -2, 3);
    assert_eq!(out, vec![0xFF, 0xFF, 0xFE]);
    assert_eq!(decode_int(&out, true), -2);
    assert_eq!(decode_int(&out, false), 0x00FF_FFFE);
}

#[test]
fn test_reader_sequence() {
    let mut out = Vec::new();
    write_int(&mut out, 7, 1);
    write_int(&mut out, 0x0102, 2);
    write_float(&mut out, 1.5, 4);
    out.extend_from_slice(b"OK");

    let mut reader = Reader::new(&out);
    assert_eq!(reader.int(1, false).unwrap(), 7);
    assert_eq!(reader.int(2, false).unwrap(), 0x0102);
    assert_eq!(reader.float(4).unwrap(), 1.5);
    reader.expect(b"OK").unwrap();
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn test_short_read() {
    let mut reader = Reader::new(&[1, 2]);
    assert_eq!(
        reader.int(4, false).unwrap_err(),
        WireError::ShortRead {
            needed: 4,
            remaining: 2
        }
    );
    assert_eq!(reader.position(), 0);
}

#[test]
fn test_literal_mismatch_does_not_consume() {
    let mut reader = Reader::new(b"HELO");
    assert!(reader.expect(b"EHLO").is_err());
    assert_eq!(reader.position(), 0);
    reader.expect(b"HE").unwrap();
    assert!(reader.peek_matches(b"LO"));
}

#[test]
fn test_numeric_strings() {
    let mut out = Vec::new();
    write_numeric(&mut out, 42, 4).unwrap();
    write_numeric(&mut out, -7, 4).unwrap();
    write_numeric_float(&mut out, 1.5, 6).unwrap();
    assert_eq!(out, b"0042-0070001.5".to_vec());

    let mut reader = Reader::new(&out);
    assert_eq!(reader.numeric(4).unwrap(), 42);
    assert_eq!(reader.numeric(4).unwrap(), -7);
    assert_eq!(reader.numeric_float(6).unwrap(), 1.5);

    let mut out = Vec::new();
    assert!(matches!(
        write_numeric(&mut out, 12345, 4),
        Err(WireError::TooWide { width: 4, .. })
    ));
}

#[test]
fn test_choose_prefers_longest() {
    let mut reader = Reader::new(b"\r\nrest");
    let line_ends: [&[u8]; 2] = [b"\n", b"\r\n"];
    assert_eq!(reader.choose(&line_ends).unwrap(), b"\r\n".to_vec());
    assert_eq!(reader.position(), 2);

    let err = reader.choose(&line_ends).unwrap_err();
    assert_eq!(
        err,
        WireError::LiteralMismatch {
            expected: b"\n".to_vec(),
            found: b"r".to_vec(),
        }
    );
    assert_eq!(reader.position(), 2);
}
