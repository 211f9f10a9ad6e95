//! Fuzz target for substring search.
//!
//! Compares forward and backward substring search against sliding-window
//! models, including the empty-needle and needle-longer-than-haystack
//! conventions.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
  haystack: Vec<u8>,
  needle: Vec<u8>,
}

fuzz_target!(|input: Input| {
  let Input { haystack, needle } = input;

  let first = bytescan::find_first_substring(&haystack, &needle);
  let last = bytescan::find_last_substring(&haystack, &needle);

  assert_eq!(first, model_first(&haystack, &needle), "find_first_substring model mismatch");
  assert_eq!(last, model_last(&haystack, &needle), "find_last_substring model mismatch");

  // Any reported offset must be a real occurrence.
  if !needle.is_empty() {
    if let Some(at) = first {
      assert_eq!(&haystack[at..at + needle.len()], needle.as_slice());
    }
    if let Some(at) = last {
      assert_eq!(&haystack[at..at + needle.len()], needle.as_slice());
    }
  }
});

fn model_first(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  if needle.len() > haystack.len() {
    return None;
  }
  if needle.is_empty() {
    return Some(0);
  }
  haystack.windows(needle.len()).position(|w| w == needle)
}

fn model_last(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  if needle.len() > haystack.len() {
    return None;
  }
  if needle.is_empty() {
    return Some(haystack.len());
  }
  haystack.windows(needle.len()).rposition(|w| w == needle)
}
