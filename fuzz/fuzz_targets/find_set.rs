//! Fuzz target for the byte-set scan kernels.
//!
//! Exercises both the membership scan and its complement with arbitrary
//! haystacks, sets (including the empty set) and starting alignments.

#![no_main]

use arbitrary::Arbitrary;
use bytescan::kernel_test::{
  run_all_find_first_any_kernels, run_all_find_first_not_any_kernels,
  run_all_find_last_any_kernels, run_all_find_last_not_any_kernels, verify_kernel_agreement,
};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
  haystack: Vec<u8>,
  set: Vec<u8>,
  offset: usize,
}

fuzz_target!(|input: Input| {
  let Input { haystack, set, offset } = input;

  let start = offset % (haystack.len() + 1);
  let slice = &haystack[start..];

  let first_any = verify_kernel_agreement(&run_all_find_first_any_kernels(slice, &set))
    .unwrap_or_else(|msg| panic!("{msg}"));
  let last_any = verify_kernel_agreement(&run_all_find_last_any_kernels(slice, &set))
    .unwrap_or_else(|msg| panic!("{msg}"));
  let first_not = verify_kernel_agreement(&run_all_find_first_not_any_kernels(slice, &set))
    .unwrap_or_else(|msg| panic!("{msg}"));
  let last_not = verify_kernel_agreement(&run_all_find_last_not_any_kernels(slice, &set))
    .unwrap_or_else(|msg| panic!("{msg}"));

  assert_eq!(bytescan::find_first_any(slice, &set), first_any, "dispatched find_first_any");
  assert_eq!(bytescan::find_last_any(slice, &set), last_any, "dispatched find_last_any");
  assert_eq!(
    bytescan::find_first_not_any(slice, &set),
    first_not,
    "dispatched find_first_not_any"
  );
  assert_eq!(bytescan::find_last_not_any(slice, &set), last_not, "dispatched find_last_not_any");

  assert_eq!(first_any, slice.iter().position(|b| set.contains(b)), "find_first_any model");
  assert_eq!(last_any, slice.iter().rposition(|b| set.contains(b)), "find_last_any model");
  assert_eq!(
    first_not,
    slice.iter().position(|b| !set.contains(b)),
    "find_first_not_any model"
  );
  assert_eq!(
    last_not,
    slice.iter().rposition(|b| !set.contains(b)),
    "find_last_not_any model"
  );
});
