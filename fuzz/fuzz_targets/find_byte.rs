//! Fuzz target for the single-byte scan kernels.
//!
//! Every kernel available on the host runs on the same slice and must agree
//! with the scalar reference, across arbitrary contents, lengths and
//! starting alignments.

#![no_main]

use arbitrary::Arbitrary;
use bytescan::kernel_test::{
  run_all_find_first_kernels, run_all_find_last_kernels, verify_kernel_agreement,
};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
  haystack: Vec<u8>,
  byte: u8,
  offset: usize,
}

fuzz_target!(|input: Input| {
  let Input { haystack, byte, offset } = input;

  // Scan from an arbitrary offset so the kernels see every alignment phase.
  let start = offset % (haystack.len() + 1);
  let slice = &haystack[start..];

  let forward = verify_kernel_agreement(&run_all_find_first_kernels(slice, byte))
    .unwrap_or_else(|msg| panic!("{msg}"));
  let backward = verify_kernel_agreement(&run_all_find_last_kernels(slice, byte))
    .unwrap_or_else(|msg| panic!("{msg}"));

  // The dispatched entry points return the same offsets as the harness.
  assert_eq!(bytescan::find_first(slice, byte), forward, "dispatched find_first mismatch");
  assert_eq!(bytescan::find_last(slice, byte), backward, "dispatched find_last mismatch");

  // And the agreed offsets really are the first and last occurrences.
  assert_eq!(forward, slice.iter().position(|&b| b == byte), "find_first model mismatch");
  assert_eq!(backward, slice.iter().rposition(|&b| b == byte), "find_last model mismatch");
});
