use super::*;

#[test]
fn from_u8_valid() {
    assert_eq!(MetaKind::from_u8(0), Some(MetaKind::Unknown));
    assert_eq!(MetaKind::from_u8(1), Some(MetaKind::Bool));
    assert_eq!(MetaKind::from_u8(2), Some(MetaKind::BitSet));
    assert_eq!(MetaKind::from_u8(13), Some(MetaKind::String));
    assert_eq!(MetaKind::from_u8(16), Some(MetaKind::Class));
    assert_eq!(MetaKind::from_u8(19), Some(MetaKind::DataUnit));
}

#[test]
fn from_u8_invalid() {
    assert_eq!(MetaKind::from_u8(20), None);
    assert_eq!(MetaKind::from_u8(255), None);
}

#[test]
fn discriminants_match_table_order() {
    for (i, kind) in MetaKind::ALL.iter().enumerate() {
        assert_eq!(kind.index(), i);
        assert_eq!(MetaKind::from_u8(i as u8), Some(*kind));
    }
}

#[test]
fn primitive_sizes() {
    assert_eq!(MetaKind::Bool.size_in_bytes(), 1);
    assert_eq!(MetaKind::BitSet.size_in_bytes(), 4);
    assert_eq!(MetaKind::Int8.size_in_bytes(), 1);
    assert_eq!(MetaKind::UInt16.size_in_bytes(), 2);
    assert_eq!(MetaKind::Int32.size_in_bytes(), 4);
    assert_eq!(MetaKind::UInt64.size_in_bytes(), 8);
    assert_eq!(MetaKind::Float.size_in_bytes(), 4);
    assert_eq!(MetaKind::Double.size_in_bytes(), 8);
}

#[test]
fn reference_sizes() {
    assert_eq!(MetaKind::String.size_in_bytes(), 16);
    assert_eq!(MetaKind::Class.size_in_bytes(), 8);
    assert_eq!(MetaKind::Array.size_in_bytes(), 16);
    assert_eq!(MetaKind::Dictionary.size_in_bytes(), 16);
    assert_eq!(MetaKind::DataUnit.size_in_bytes(), 8);
}

#[test]
fn self_sizing_kinds_report_zero() {
    assert_eq!(MetaKind::Enum.size_in_bits(), 0);
    assert_eq!(MetaKind::Struct.size_in_bits(), 0);
    assert_eq!(MetaKind::Struct.alignment(), 0);
}

#[test]
fn alignment_matches_size_for_scalars() {
    for kind in MetaKind::ALL.iter().filter(|k| k.is_primitive()) {
        assert_eq!(kind.alignment(), kind.size_in_bytes(), "{kind:?}");
    }
    assert_eq!(MetaKind::DataUnit.alignment(), 4);
}

#[test]
fn signedness() {
    assert!(MetaKind::Int8.is_signed());
    assert!(MetaKind::Int64.is_signed());
    assert!(MetaKind::Float.is_signed());
    assert!(!MetaKind::UInt32.is_signed());
    assert!(!MetaKind::Bool.is_signed());
}

#[test]
fn type_names() {
    assert_eq!(MetaKind::Int32.type_name(), "s32");
    assert_eq!(MetaKind::UInt8.type_name(), "u8");
    assert_eq!(MetaKind::Double.type_name(), "f64");
    assert_eq!(MetaKind::BitSet.type_name(), "u32");
    assert_eq!(MetaKind::String.type_name(), "string_t");
}

#[test]
fn classification_predicates() {
    assert!(MetaKind::UInt16.is_integer());
    assert!(!MetaKind::Float.is_integer());
    assert!(!MetaKind::Bool.is_primitive());
    assert!(MetaKind::String.is_referenced());
    assert!(!MetaKind::DataUnit.is_referenced());
    assert!(MetaKind::DataUnit.has_members());
    assert!(!MetaKind::String.has_members());
}
