//! x86_64 vectorized scan kernels.
//!
//! Two tiers share one skeleton:
//!
//! - [`sse2`]: 16-byte vectors. SSE2 is part of the x86_64 baseline, so this
//!   tier is always selectable on x86_64 hosts.
//! - [`avx2`]: 32-byte vectors, requires AVX2 and BMI1.
//!
//! Every kernel follows the same plan: an unaligned head load covers the
//! first vector, the cursor then snaps to the next alignment boundary,
//! aligned loads are checked four vectors at a time with a single combined
//! movemask test, leftover whole vectors go one at a time, and an unaligned
//! load flush against the end of the buffer covers the tail. Backward scans
//! run the mirror image, snapping the cursor down from the end. Inputs
//! shorter than one vector fall through to the scalar kernels.
//!
//! All kernels return byte offsets identical to their scalar counterparts on
//! every input. The differential harness in `kernel_test` and the property
//! tests hold them to that.

#![allow(unsafe_code)]

pub(crate) mod avx2;
pub(crate) mod sse2;

/// Offset of the lowest set bit. The caller has already tested `mask != 0`.
#[inline]
pub(crate) fn lowest_bit(mask: u32) -> usize {
  debug_assert!(mask != 0);
  mask.trailing_zeros() as usize
}

/// Offset of the highest set bit. The caller has already tested `mask != 0`.
#[inline]
pub(crate) fn highest_bit(mask: u32) -> usize {
  debug_assert!(mask != 0);
  31 - mask.leading_zeros() as usize
}
