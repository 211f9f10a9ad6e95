//! End-to-end checks of the public API against plain iterator models.
//!
//! The interesting inputs are the ones that straddle kernel geometry: one
//! byte either side of the 16- and 32-byte vector widths and of the
//! four-vector block sizes, plus every starting alignment a slice can have.

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

fn check_byte_ops(haystack: &[u8], byte: u8) {
  assert_eq!(
    bytescan::find_first(haystack, byte),
    model_find_first(haystack, byte),
    "find_first, len {}",
    haystack.len()
  );
  assert_eq!(
    bytescan::find_last(haystack, byte),
    model_find_last(haystack, byte),
    "find_last, len {}",
    haystack.len()
  );
}

fn check_set_ops(haystack: &[u8], set: &[u8]) {
  assert_eq!(
    bytescan::find_first_any(haystack, set),
    model_find_first_any(haystack, set),
    "find_first_any, len {}",
    haystack.len()
  );
  assert_eq!(
    bytescan::find_last_any(haystack, set),
    model_find_last_any(haystack, set),
    "find_last_any, len {}",
    haystack.len()
  );
  assert_eq!(
    bytescan::find_first_not_any(haystack, set),
    model_find_first_not_any(haystack, set),
    "find_first_not_any, len {}",
    haystack.len()
  );
  assert_eq!(
    bytescan::find_last_not_any(haystack, set),
    model_find_last_not_any(haystack, set),
    "find_last_not_any, len {}",
    haystack.len()
  );
}

/// Lengths one byte either side of the vector widths (16, 32) and the
/// four-vector block sizes (64, 128), plus a few larger ones.
const BOUNDARY_LENGTHS: &[usize] = &[
  0, 1, 2, 7, 15, 16, 17, 31, 32, 33, 63, 64, 65, 127, 128, 129, 255, 256, 257, 1000,
];

#[test]
fn byte_search_matches_model_at_boundary_lengths() {
  for &len in BOUNDARY_LENGTHS {
    // Needle absent, needle at the first byte, at the last byte, and at
    // every position in between for the smaller lengths.
    let buf = vec![b'a'; len];
    check_byte_ops(&buf, b'a');
    check_byte_ops(&buf, b'z');

    let positions: Vec<usize> = if len <= 65 { (0..len).collect() } else { vec![0, len / 2, len - 1] };
    for pos in positions {
      let mut buf = vec![b'a'; len];
      buf[pos] = b'X';
      check_byte_ops(&buf, b'X');
      check_byte_ops(&buf, b'a');
    }
  }
}

#[test]
fn set_search_matches_model_at_boundary_lengths() {
  for &len in BOUNDARY_LENGTHS {
    let buf: Vec<u8> = (0..len).map(|i| b'a' + (i % 3) as u8).collect();
    check_set_ops(&buf, b"c");
    check_set_ops(&buf, b"bc");
    check_set_ops(&buf, b"abc");
    check_set_ops(&buf, b"xyz");
    check_set_ops(&buf, b"");
  }
}

#[test]
fn results_are_stable_across_slice_alignment() {
  // One backing buffer, scanned through every possible 32-byte phase.
  let buf: Vec<u8> = (0..512).map(|i: usize| (i.wrapping_mul(131).wrapping_add(9) % 41) as u8).collect();
  for off in 0..32 {
    let slice = &buf[off..off + 400];
    check_byte_ops(slice, 7);
    check_byte_ops(slice, 40);
    check_byte_ops(slice, 99);
    check_set_ops(slice, &[0, 40]);
    check_set_ops(slice, &[7]);
  }
}

#[test]
fn empty_haystack_finds_nothing() {
  assert_eq!(bytescan::find_first(b"", b'a'), None);
  assert_eq!(bytescan::find_last(b"", b'a'), None);
  assert_eq!(bytescan::find_first_any(b"", b"abc"), None);
  assert_eq!(bytescan::find_last_any(b"", b"abc"), None);
  assert_eq!(bytescan::find_first_not_any(b"", b"abc"), None);
  assert_eq!(bytescan::find_last_not_any(b"", b"abc"), None);
  assert_eq!(bytescan::find_first_substring(b"", b"a"), None);
  assert_eq!(bytescan::find_last_substring(b"", b"a"), None);
}

#[test]
fn trailing_needle_after_sixteen_identical_bytes() {
  // Seventeen bytes: one full 16-byte vector of 'a' plus a final 'X'.
  let buf: &[u8] = b"aaaaaaaaaaaaaaaaX";
  assert_eq!(buf.len(), 17);

  assert_eq!(bytescan::find_first(buf, b'X'), Some(16));
  assert_eq!(bytescan::find_last(buf, b'a'), Some(15));
  assert_eq!(bytescan::find_first(buf, b'Z'), None);
  assert_eq!(bytescan::find_last(buf, b'Z'), None);
}

#[test]
fn set_scan_picks_nearest_member_from_either_end() {
  assert_eq!(bytescan::find_first_any(b"banana", b"nz"), Some(2));
  assert_eq!(bytescan::find_last_any(b"banana", b"nz"), Some(4));
}

#[test]
fn empty_set_matches_nothing_and_its_complement_everything() {
  let buf: &[u8] = b"hello world";
  assert_eq!(bytescan::find_first_any(buf, b""), None);
  assert_eq!(bytescan::find_last_any(buf, b""), None);
  assert_eq!(bytescan::find_first_not_any(buf, b""), Some(0));
  assert_eq!(bytescan::find_last_not_any(buf, b""), Some(buf.len() - 1));
}

#[test]
fn substring_search_basics() {
  let hay: &[u8] = b"abracadabra";
  assert_eq!(bytescan::find_first_substring(hay, b"abra"), Some(0));
  assert_eq!(bytescan::find_last_substring(hay, b"abra"), Some(7));
  assert_eq!(bytescan::find_first_substring(hay, b"cad"), Some(4));
  assert_eq!(bytescan::find_first_substring(hay, b"zzz"), None);
  assert_eq!(bytescan::find_last_substring(hay, b"zzz"), None);
}

#[test]
fn substring_occurrences_may_overlap() {
  assert_eq!(bytescan::find_first_substring(b"aaaa", b"aa"), Some(0));
  assert_eq!(bytescan::find_last_substring(b"aaaa", b"aa"), Some(2));
}

#[test]
fn empty_needle_matches_at_either_end() {
  assert_eq!(bytescan::find_first_substring(b"banana", b""), Some(0));
  assert_eq!(bytescan::find_last_substring(b"banana", b""), Some(6));
  assert_eq!(bytescan::find_first_substring(b"", b""), Some(0));
  assert_eq!(bytescan::find_last_substring(b"", b""), Some(0));
}

#[test]
fn needle_longer_than_haystack_never_matches() {
  assert_eq!(bytescan::find_first_substring(b"ba", b"banana"), None);
  assert_eq!(bytescan::find_last_substring(b"ba", b"banana"), None);
}

#[test]
fn whole_haystack_is_a_match() {
  assert_eq!(bytescan::find_first_substring(b"banana", b"banana"), Some(0));
  assert_eq!(bytescan::find_last_substring(b"banana", b"banana"), Some(0));
}

#[test]
fn first_and_last_are_consistent() {
  let buf: Vec<u8> = (0..700).map(|i: usize| (i % 23) as u8).collect();
  for byte in 0..30u8 {
    let first = bytescan::find_first(&buf, byte);
    let last = bytescan::find_last(&buf, byte);
    match (first, last) {
      (Some(f), Some(l)) => {
        assert!(f <= l);
        assert_eq!(buf[f], byte);
        assert_eq!(buf[l], byte);
      }
      (None, None) => {}
      other => panic!("first/last disagree on presence: {other:?}"),
    }
  }
}

#[test]
fn backend_name_is_reported() {
  let name = bytescan::backend_name();
  assert!(!name.is_empty());
  // The name is stable once resolved.
  assert_eq!(bytescan::backend_name(), name);
}
