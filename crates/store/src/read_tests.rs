use super::*;

#[test]
fn zero_length_clamps_to_one() {
    assert_eq!(ReadRequest::forwards(0).clamped_length(), 1);
}

#[test]
fn oversized_length_clamps_to_max() {
    assert_eq!(ReadRequest::forwards(u64::MAX).clamped_length(), MAX_READ_LENGTH as usize);
}

#[test]
fn in_range_length_is_kept() {
    assert_eq!(ReadRequest::backwards(25).clamped_length(), 25);
}

#[test]
fn offsets_compose() {
    let request = ReadRequest::forwards(10).from_offset(5);
    assert_eq!(request.offset, Some(5));
    assert_eq!(request.direction, Direction::Forwards);
}

#[test]
fn serde_omits_unset_offset() {
    let wire = serde_json::to_string(&ReadRequest::forwards(10)).unwrap();
    assert!(!wire.contains("offset"));
    let back: ReadRequest = serde_json::from_str(&wire).unwrap();
    assert_eq!(back.offset, None);
}
