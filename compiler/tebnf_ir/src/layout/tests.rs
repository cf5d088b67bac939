#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

fn lit(v: u64) -> Option<RangeBound> {
    Some(RangeBound::Literal(v))
}

#[test]
fn test_range_classification_table() {
    // {5,10}
    assert_eq!(TypeRange::classify(lit(5), lit(10), 4).shape, RangeShape::MinMax);
    // {,10}
    assert_eq!(TypeRange::classify(None, lit(10), 3).shape, RangeShape::Bounded);
    // {5,}
    assert_eq!(TypeRange::classify(lit(5), None, 3).shape, RangeShape::MaxUnbounded);
    // {,}
    assert_eq!(TypeRange::classify(None, None, 2).shape, RangeShape::Unbounded);
    // {10}
    assert_eq!(TypeRange::classify(None, lit(10), 2).shape, RangeShape::MinUnbounded);
}

#[test]
fn test_symbolic_min_is_max_unbounded() {
    let range = TypeRange::classify(Some(RangeBound::StaticVar("$n".into())), None, 3);
    assert_eq!(range.shape, RangeShape::MaxUnbounded);
    assert_eq!(range.min_value(), None);
    assert!(range.min.as_ref().unwrap().is_symbolic());
    assert!(range.is_open_ended());
}

#[test]
fn test_symbolic_max_is_open_ended() {
    let range = TypeRange::classify(lit(0), Some(RangeBound::Symbol("len".into())), 4);
    assert_eq!(range.shape, RangeShape::MinMax);
    assert_eq!(range.symbolic_max(), Some("len"));
    assert!(range.is_open_ended());
    assert_eq!(range.size(), 0);
}

#[test]
fn test_fixed_range_shapes() {
    assert_eq!(TypeRange::fixed(2, 4).shape, RangeShape::MinMax);
    assert_eq!(TypeRange::fixed(0, 4).shape, RangeShape::Bounded);
    assert_eq!(TypeRange::fixed(0, 0).shape, RangeShape::Unbounded);
    assert!(!TypeRange::fixed(0, 4).is_open_ended());
    assert_eq!(TypeRange::fixed(3, 8).size(), 8);
}

#[test]
fn test_scalar_selection() {
    assert_eq!(Scalar::int(8, false), Scalar::U8);
    assert_eq!(Scalar::int(24, true), Scalar::I32);
    assert_eq!(Scalar::int(128, true), Scalar::I64);
    assert_eq!(Scalar::float(32), Scalar::F32);
    assert_eq!(Scalar::float(80), Scalar::F64);
    assert_eq!(Scalar::I16.bytes(), 2);
}

#[test]
fn test_bitset_rounds_up_to_bytes() {
    let ty = ResolvedType::bitset(12);
    assert_eq!(ty.byte_size, 2);
    assert_eq!(ty.resolved_bits, 12);
}

#[test]
fn test_display() {
    let mut ty = ResolvedType::primitive(Scalar::U8);
    ty.kind = TypeKind::Vector(Scalar::U8);
    ty.range = Some(TypeRange::classify(lit(0), Some(RangeBound::Symbol("len".into())), 4));
    assert_eq!(ty.to_string(), "[u8]{0,len}");
    assert_eq!(ResolvedType::string(5).to_string(), "str[5]");
}
