//! Property tests: the dispatched operations agree with plain iterator
//! models on arbitrary inputs.
//!
//! Haystacks are drawn from a narrow alphabet so hits and misses both occur
//! often, with lengths spanning well past the four-vector block size of the
//! widest kernel. Alignment properties re-run the scans on slices of the
//! same buffer at every vector phase.

#![cfg(not(miri))]

use proptest::prelude::*;

fn model_find_first(haystack: &[u8], byte: u8) -> Option<usize> {
  haystack.iter().position(|&b| b == byte)
}

fn model_find_last(haystack: &[u8], byte: u8) -> Option<usize> {
  haystack.iter().rposition(|&b| b == byte)
}

fn model_find_first_any(haystack: &[u8], set: &[u8]) -> Option<usize> {
  haystack.iter().position(|b| set.contains(b))
}

fn model_find_last_any(haystack: &[u8], set: &[u8]) -> Option<usize> {
  haystack.iter().rposition(|b| set.contains(b))
}

fn model_find_first_not_any(haystack: &[u8], set: &[u8]) -> Option<usize> {
  haystack.iter().position(|b| !set.contains(b))
}

fn model_find_last_not_any(haystack: &[u8], set: &[u8]) -> Option<usize> {
  haystack.iter().rposition(|b| !set.contains(b))
}

fn model_find_first_substring(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  if needle.len() > haystack.len() {
    return None;
  }
  if needle.is_empty() {
    return Some(0);
  }
  haystack.windows(needle.len()).position(|w| w == needle)
}

fn model_find_last_substring(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  if needle.len() > haystack.len() {
    return None;
  }
  if needle.is_empty() {
    return Some(haystack.len());
  }
  haystack.windows(needle.len()).rposition(|w| w == needle)
}

fn narrow_haystack() -> impl Strategy<Value = Vec<u8>> {
  prop::collection::vec(0u8..6, 0..640)
}

fn narrow_set() -> impl Strategy<Value = Vec<u8>> {
  prop::collection::vec(0u8..6, 0..4)
}

proptest! {
  #[test]
  fn find_first_agrees_with_model(haystack in narrow_haystack(), byte in 0u8..8) {
    prop_assert_eq!(bytescan::find_first(&haystack, byte), model_find_first(&haystack, byte));
  }

  #[test]
  fn find_last_agrees_with_model(haystack in narrow_haystack(), byte in 0u8..8) {
    prop_assert_eq!(bytescan::find_last(&haystack, byte), model_find_last(&haystack, byte));
  }

  #[test]
  fn find_first_agrees_on_arbitrary_bytes(
    haystack in prop::collection::vec(any::<u8>(), 0..640),
    byte in any::<u8>(),
  ) {
    prop_assert_eq!(bytescan::find_first(&haystack, byte), model_find_first(&haystack, byte));
    prop_assert_eq!(bytescan::find_last(&haystack, byte), model_find_last(&haystack, byte));
  }

  #[test]
  fn find_any_agrees_with_model(haystack in narrow_haystack(), set in narrow_set()) {
    prop_assert_eq!(
      bytescan::find_first_any(&haystack, &set),
      model_find_first_any(&haystack, &set)
    );
    prop_assert_eq!(
      bytescan::find_last_any(&haystack, &set),
      model_find_last_any(&haystack, &set)
    );
  }

  #[test]
  fn find_not_any_agrees_with_model(haystack in narrow_haystack(), set in narrow_set()) {
    prop_assert_eq!(
      bytescan::find_first_not_any(&haystack, &set),
      model_find_first_not_any(&haystack, &set)
    );
    prop_assert_eq!(
      bytescan::find_last_not_any(&haystack, &set),
      model_find_last_not_any(&haystack, &set)
    );
  }

  #[test]
  fn byte_scan_agrees_at_every_alignment(
    buf in prop::collection::vec(0u8..6, 160..400),
    byte in 0u8..8,
  ) {
    for off in 0..32 {
      let slice = &buf[off..];
      prop_assert_eq!(bytescan::find_first(slice, byte), model_find_first(slice, byte));
      prop_assert_eq!(bytescan::find_last(slice, byte), model_find_last(slice, byte));
    }
  }

  #[test]
  fn set_scan_agrees_at_every_alignment(
    buf in prop::collection::vec(0u8..6, 160..400),
    set in narrow_set(),
  ) {
    for off in 0..32 {
      let slice = &buf[off..];
      prop_assert_eq!(
        bytescan::find_first_any(slice, &set),
        model_find_first_any(slice, &set)
      );
      prop_assert_eq!(
        bytescan::find_last_not_any(slice, &set),
        model_find_last_not_any(slice, &set)
      );
    }
  }

  #[test]
  fn substring_agrees_with_model(
    haystack in prop::collection::vec(0u8..3, 0..96),
    needle in prop::collection::vec(0u8..3, 0..6),
  ) {
    prop_assert_eq!(
      bytescan::find_first_substring(&haystack, &needle),
      model_find_first_substring(&haystack, &needle)
    );
    prop_assert_eq!(
      bytescan::find_last_substring(&haystack, &needle),
      model_find_last_substring(&haystack, &needle)
    );
  }

  #[test]
  fn first_hit_never_follows_last_hit(haystack in narrow_haystack(), byte in 0u8..8) {
    let first = bytescan::find_first(&haystack, byte);
    let last = bytescan::find_last(&haystack, byte);
    prop_assert_eq!(first.is_some(), last.is_some());
    if let (Some(f), Some(l)) = (first, last) {
      prop_assert!(f <= l);
      prop_assert_eq!(haystack[f], byte);
      prop_assert_eq!(haystack[l], byte);
    }
  }

  #[test]
  fn substring_result_is_a_real_occurrence(
    haystack in prop::collection::vec(0u8..3, 0..96),
    needle in prop::collection::vec(0u8..3, 1..5),
  ) {
    if let Some(at) = bytescan::find_first_substring(&haystack, &needle) {
      prop_assert_eq!(&haystack[at..at + needle.len()], needle.as_slice());
    }
    if let Some(at) = bytescan::find_last_substring(&haystack, &needle) {
      prop_assert_eq!(&haystack[at..at + needle.len()], needle.as_slice());
    }
  }
}
