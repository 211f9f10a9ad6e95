//! AVX2 scan kernels, 32 bytes per vector.
//!
//! Requires AVX2 for the vector compares and BMI1 so the 32-bit movemask
//! results can be reduced with branchless `tzcnt`/`lzcnt`-style bit scans.
//!
//! Inputs shorter than one 32-byte vector are handed to the SSE2 tier, which
//! in turn hands anything shorter than 16 bytes to the scalar kernels. AVX2
//! implies SSE2, so the delegation never runs an unsupported instruction.
//!
//! # Safety
//!
//! Same load discipline as the SSE2 tier: unaligned loads for head and tail,
//! aligned loads at offsets snapped to a 32-byte boundary in between, all
//! within the haystack.

#![allow(unsafe_code)]
// Loads go through `_mm256_loadu_si256` or land on addresses snapped to
// vector alignment, so the u8-to-__m256i pointer casts are sound.
#![allow(clippy::cast_ptr_alignment)]

use core::arch::x86_64::{
  __m256i, _mm256_andnot_si256, _mm256_cmpeq_epi8, _mm256_load_si256, _mm256_loadu_si256,
  _mm256_movemask_epi8, _mm256_or_si256, _mm256_set1_epi8, _mm256_setzero_si256,
};

use super::{highest_bit, lowest_bit, sse2};
use crate::scalar;

// ─────────────────────────────────────────────────────────────────────────────
// Single-Byte Kernels
// ─────────────────────────────────────────────────────────────────────────────

/// Find the first occurrence of `byte`, scanning 32 bytes per step.
///
/// # Safety
///
/// Caller must ensure AVX2 and BMI1 are available.
#[target_feature(enable = "avx2", enable = "bmi1")]
pub(crate) unsafe fn find_first_unchecked(haystack: &[u8], byte: u8) -> Option<usize> {
  let len = haystack.len();
  if len < 32 {
    // AVX2 implies SSE2, so the 16-byte kernel's requirement is met.
    return sse2::find_first_unchecked(haystack, byte);
  }

  let ptr = haystack.as_ptr();
  let needle = _mm256_set1_epi8(byte as i8);

  // One unaligned vector covers the head unconditionally.
  // SAFETY: len >= 32, so bytes [0, 32) are in bounds.
  let head = unsafe { _mm256_loadu_si256(ptr as *const __m256i) };
  let mask = _mm256_movemask_epi8(_mm256_cmpeq_epi8(head, needle)) as u32;
  if mask != 0 {
    return Some(lowest_bit(mask));
  }

  // Snap up to the first 32-byte boundary past ptr.
  let mut i = 32 - (ptr as usize & 31);

  // Four aligned vectors per iteration with a single combined test.
  while i + 4 * 32 < len {
    // SAFETY: ptr + i is 32-aligned and i + 128 < len, so all four loads are
    // aligned and in bounds.
    let (a, b, c, d) = unsafe {
      let block = ptr.add(i) as *const __m256i;
      (
        _mm256_load_si256(block),
        _mm256_load_si256(block.add(1)),
        _mm256_load_si256(block.add(2)),
        _mm256_load_si256(block.add(3)),
      )
    };

    let eq_a = _mm256_cmpeq_epi8(a, needle);
    let eq_b = _mm256_cmpeq_epi8(b, needle);
    let eq_c = _mm256_cmpeq_epi8(c, needle);
    let eq_d = _mm256_cmpeq_epi8(d, needle);

    let or_ab = _mm256_or_si256(eq_a, eq_b);
    let or_cd = _mm256_or_si256(eq_c, eq_d);
    if _mm256_movemask_epi8(_mm256_or_si256(or_ab, or_cd)) != 0 {
      let mask = _mm256_movemask_epi8(eq_a) as u32;
      if mask != 0 {
        return Some(i + lowest_bit(mask));
      }
      let mask = _mm256_movemask_epi8(eq_b) as u32;
      if mask != 0 {
        return Some(i + 32 + lowest_bit(mask));
      }
      let mask = _mm256_movemask_epi8(eq_c) as u32;
      if mask != 0 {
        return Some(i + 2 * 32 + lowest_bit(mask));
      }
      // The combined test fired and it was not a, b or c.
      let mask = _mm256_movemask_epi8(eq_d) as u32;
      return Some(i + 3 * 32 + lowest_bit(mask));
    }

    i += 4 * 32;
  }

  // Leftover whole vectors, one at a time.
  while i + 32 <= len {
    // SAFETY: ptr + i is 32-aligned and i + 32 <= len.
    let chunk = unsafe { _mm256_load_si256(ptr.add(i) as *const __m256i) };
    let mask = _mm256_movemask_epi8(_mm256_cmpeq_epi8(chunk, needle)) as u32;
    if mask != 0 {
      return Some(i + lowest_bit(mask));
    }
    i += 32;
  }

  // Fewer than 32 bytes remain: one unaligned vector flush against the end.
  if i < len {
    let i = len - 32;
    // SAFETY: len >= 32, so bytes [len - 32, len) are in bounds.
    let tail = unsafe { _mm256_loadu_si256(ptr.add(i) as *const __m256i) };
    let mask = _mm256_movemask_epi8(_mm256_cmpeq_epi8(tail, needle)) as u32;
    if mask != 0 {
      return Some(i + lowest_bit(mask));
    }
  }

  None
}

/// Find the last occurrence of `byte`, scanning 32 bytes per step from the
/// end of the haystack.
///
/// # Safety
///
/// Caller must ensure AVX2 and BMI1 are available.
#[target_feature(enable = "avx2", enable = "bmi1")]
pub(crate) unsafe fn find_last_unchecked(haystack: &[u8], byte: u8) -> Option<usize> {
  let len = haystack.len();
  if len < 32 {
    // AVX2 implies SSE2, so the 16-byte kernel's requirement is met.
    return sse2::find_last_unchecked(haystack, byte);
  }

  let ptr = haystack.as_ptr();
  let needle = _mm256_set1_epi8(byte as i8);

  // One unaligned vector covers the tail unconditionally.
  // SAFETY: len >= 32, so bytes [len - 32, len) are in bounds.
  let tail = unsafe { _mm256_loadu_si256(ptr.add(len - 32) as *const __m256i) };
  let mask = _mm256_movemask_epi8(_mm256_cmpeq_epi8(tail, needle)) as u32;
  if mask != 0 {
    return Some(len - 32 + highest_bit(mask));
  }

  // Snap down to the last 32-byte boundary at or before the final byte.
  let mut i = (len - 1) - ((ptr as usize + len - 1) & 31);

  // Four aligned vectors per iteration, highest addresses checked first.
  while i > 4 * 32 {
    // SAFETY: ptr + i is 32-aligned and i > 128, so all four loads are
    // aligned and in bounds.
    let (a, b, c, d) = unsafe {
      let block = ptr.add(i - 4 * 32) as *const __m256i;
      (
        _mm256_load_si256(block),
        _mm256_load_si256(block.add(1)),
        _mm256_load_si256(block.add(2)),
        _mm256_load_si256(block.add(3)),
      )
    };

    let eq_a = _mm256_cmpeq_epi8(a, needle);
    let eq_b = _mm256_cmpeq_epi8(b, needle);
    let eq_c = _mm256_cmpeq_epi8(c, needle);
    let eq_d = _mm256_cmpeq_epi8(d, needle);

    let or_ab = _mm256_or_si256(eq_a, eq_b);
    let or_cd = _mm256_or_si256(eq_c, eq_d);
    if _mm256_movemask_epi8(_mm256_or_si256(or_ab, or_cd)) != 0 {
      let mask = _mm256_movemask_epi8(eq_d) as u32;
      if mask != 0 {
        return Some(i - 32 + highest_bit(mask));
      }
      let mask = _mm256_movemask_epi8(eq_c) as u32;
      if mask != 0 {
        return Some(i - 2 * 32 + highest_bit(mask));
      }
      let mask = _mm256_movemask_epi8(eq_b) as u32;
      if mask != 0 {
        return Some(i - 3 * 32 + highest_bit(mask));
      }
      // The combined test fired and it was not d, c or b.
      let mask = _mm256_movemask_epi8(eq_a) as u32;
      return Some(i - 4 * 32 + highest_bit(mask));
    }

    i -= 4 * 32;
  }

  // Leftover whole vectors, one at a time.
  while i >= 32 {
    // SAFETY: ptr + i is 32-aligned and i >= 32.
    let chunk = unsafe { _mm256_load_si256(ptr.add(i - 32) as *const __m256i) };
    let mask = _mm256_movemask_epi8(_mm256_cmpeq_epi8(chunk, needle)) as u32;
    if mask != 0 {
      return Some(i - 32 + highest_bit(mask));
    }
    i -= 32;
  }

  // Fewer than 32 bytes remain below the cursor: one unaligned vector at the
  // start of the buffer.
  if i > 0 {
    // SAFETY: len >= 32, so bytes [0, 32) are in bounds.
    let head = unsafe { _mm256_loadu_si256(ptr as *const __m256i) };
    let mask = _mm256_movemask_epi8(_mm256_cmpeq_epi8(head, needle)) as u32;
    if mask != 0 {
      return Some(highest_bit(mask));
    }
  }

  None
}

// ─────────────────────────────────────────────────────────────────────────────
// Byte-Set Kernels
// ─────────────────────────────────────────────────────────────────────────────

/// Per-lane match vector for `chunk` against `set`, negated when `NEGATE`.
/// See the SSE2 counterpart for the empty-set behavior.
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn set_match_vector<const NEGATE: bool>(chunk: __m256i, set: &[u8]) -> __m256i {
  let mut acc = _mm256_setzero_si256();
  for &b in set {
    acc = _mm256_or_si256(acc, _mm256_cmpeq_epi8(chunk, _mm256_set1_epi8(b as i8)));
  }
  if NEGATE {
    acc = _mm256_andnot_si256(acc, _mm256_set1_epi8(-1));
  }
  acc
}

/// Shared forward scan for `find_first_any` (`NEGATE = false`) and
/// `find_first_not_any` (`NEGATE = true`).
#[target_feature(enable = "avx2", enable = "bmi1")]
unsafe fn find_first_set_unchecked<const NEGATE: bool>(
  haystack: &[u8],
  set: &[u8],
) -> Option<usize> {
  let len = haystack.len();
  if len < 32 {
    // AVX2 implies SSE2, so the 16-byte kernel's requirement is met.
    return if NEGATE {
      sse2::find_first_not_any_unchecked(haystack, set)
    } else {
      sse2::find_first_any_unchecked(haystack, set)
    };
  }

  let ptr = haystack.as_ptr();

  // SAFETY: len >= 32, so bytes [0, 32) are in bounds.
  let head = unsafe { _mm256_loadu_si256(ptr as *const __m256i) };
  let mask = _mm256_movemask_epi8(set_match_vector::<NEGATE>(head, set)) as u32;
  if mask != 0 {
    return Some(lowest_bit(mask));
  }

  let mut i = 32 - (ptr as usize & 31);

  while i + 4 * 32 < len {
    // SAFETY: ptr + i is 32-aligned and i + 128 < len.
    let (a, b, c, d) = unsafe {
      let block = ptr.add(i) as *const __m256i;
      (
        _mm256_load_si256(block),
        _mm256_load_si256(block.add(1)),
        _mm256_load_si256(block.add(2)),
        _mm256_load_si256(block.add(3)),
      )
    };

    let m_a = set_match_vector::<NEGATE>(a, set);
    let m_b = set_match_vector::<NEGATE>(b, set);
    let m_c = set_match_vector::<NEGATE>(c, set);
    let m_d = set_match_vector::<NEGATE>(d, set);

    let or_ab = _mm256_or_si256(m_a, m_b);
    let or_cd = _mm256_or_si256(m_c, m_d);
    if _mm256_movemask_epi8(_mm256_or_si256(or_ab, or_cd)) != 0 {
      let mask = _mm256_movemask_epi8(m_a) as u32;
      if mask != 0 {
        return Some(i + lowest_bit(mask));
      }
      let mask = _mm256_movemask_epi8(m_b) as u32;
      if mask != 0 {
        return Some(i + 32 + lowest_bit(mask));
      }
      let mask = _mm256_movemask_epi8(m_c) as u32;
      if mask != 0 {
        return Some(i + 2 * 32 + lowest_bit(mask));
      }
      let mask = _mm256_movemask_epi8(m_d) as u32;
      return Some(i + 3 * 32 + lowest_bit(mask));
    }

    i += 4 * 32;
  }

  while i + 32 <= len {
    // SAFETY: ptr + i is 32-aligned and i + 32 <= len.
    let chunk = unsafe { _mm256_load_si256(ptr.add(i) as *const __m256i) };
    let mask = _mm256_movemask_epi8(set_match_vector::<NEGATE>(chunk, set)) as u32;
    if mask != 0 {
      return Some(i + lowest_bit(mask));
    }
    i += 32;
  }

  if i < len {
    let i = len - 32;
    // SAFETY: len >= 32, so bytes [len - 32, len) are in bounds.
    let tail = unsafe { _mm256_loadu_si256(ptr.add(i) as *const __m256i) };
    let mask = _mm256_movemask_epi8(set_match_vector::<NEGATE>(tail, set)) as u32;
    if mask != 0 {
      return Some(i + lowest_bit(mask));
    }
  }

  None
}

/// Shared backward scan for `find_last_any` (`NEGATE = false`) and
/// `find_last_not_any` (`NEGATE = true`).
#[target_feature(enable = "avx2", enable = "bmi1")]
unsafe fn find_last_set_unchecked<const NEGATE: bool>(
  haystack: &[u8],
  set: &[u8],
) -> Option<usize> {
  let len = haystack.len();
  if len < 32 {
    // AVX2 implies SSE2, so the 16-byte kernel's requirement is met.
    return if NEGATE {
      sse2::find_last_not_any_unchecked(haystack, set)
    } else {
      sse2::find_last_any_unchecked(haystack, set)
    };
  }

  let ptr = haystack.as_ptr();

  // SAFETY: len >= 32, so bytes [len - 32, len) are in bounds.
  let tail = unsafe { _mm256_loadu_si256(ptr.add(len - 32) as *const __m256i) };
  let mask = _mm256_movemask_epi8(set_match_vector::<NEGATE>(tail, set)) as u32;
  if mask != 0 {
    return Some(len - 32 + highest_bit(mask));
  }

  let mut i = (len - 1) - ((ptr as usize + len - 1) & 31);

  while i > 4 * 32 {
    // SAFETY: ptr + i is 32-aligned and i > 128.
    let (a, b, c, d) = unsafe {
      let block = ptr.add(i - 4 * 32) as *const __m256i;
      (
        _mm256_load_si256(block),
        _mm256_load_si256(block.add(1)),
        _mm256_load_si256(block.add(2)),
        _mm256_load_si256(block.add(3)),
      )
    };

    let m_a = set_match_vector::<NEGATE>(a, set);
    let m_b = set_match_vector::<NEGATE>(b, set);
    let m_c = set_match_vector::<NEGATE>(c, set);
    let m_d = set_match_vector::<NEGATE>(d, set);

    let or_ab = _mm256_or_si256(m_a, m_b);
    let or_cd = _mm256_or_si256(m_c, m_d);
    if _mm256_movemask_epi8(_mm256_or_si256(or_ab, or_cd)) != 0 {
      let mask = _mm256_movemask_epi8(m_d) as u32;
      if mask != 0 {
        return Some(i - 32 + highest_bit(mask));
      }
      let mask = _mm256_movemask_epi8(m_c) as u32;
      if mask != 0 {
        return Some(i - 2 * 32 + highest_bit(mask));
      }
      let mask = _mm256_movemask_epi8(m_b) as u32;
      if mask != 0 {
        return Some(i - 3 * 32 + highest_bit(mask));
      }
      let mask = _mm256_movemask_epi8(m_a) as u32;
      return Some(i - 4 * 32 + highest_bit(mask));
    }

    i -= 4 * 32;
  }

  while i >= 32 {
    // SAFETY: ptr + i is 32-aligned and i >= 32.
    let chunk = unsafe { _mm256_load_si256(ptr.add(i - 32) as *const __m256i) };
    let mask = _mm256_movemask_epi8(set_match_vector::<NEGATE>(chunk, set)) as u32;
    if mask != 0 {
      return Some(i - 32 + highest_bit(mask));
    }
    i -= 32;
  }

  if i > 0 {
    // SAFETY: len >= 32, so bytes [0, 32) are in bounds.
    let head = unsafe { _mm256_loadu_si256(ptr as *const __m256i) };
    let mask = _mm256_movemask_epi8(set_match_vector::<NEGATE>(head, set)) as u32;
    if mask != 0 {
      return Some(highest_bit(mask));
    }
  }

  None
}

/// Find the first byte contained in `set`.
///
/// # Safety
///
/// Caller must ensure AVX2 and BMI1 are available.
#[target_feature(enable = "avx2", enable = "bmi1")]
pub(crate) unsafe fn find_first_any_unchecked(haystack: &[u8], set: &[u8]) -> Option<usize> {
  find_first_set_unchecked::<false>(haystack, set)
}

/// Find the last byte contained in `set`.
///
/// # Safety
///
/// Caller must ensure AVX2 and BMI1 are available.
#[target_feature(enable = "avx2", enable = "bmi1")]
pub(crate) unsafe fn find_last_any_unchecked(haystack: &[u8], set: &[u8]) -> Option<usize> {
  find_last_set_unchecked::<false>(haystack, set)
}

/// Find the first byte not contained in `set`.
///
/// # Safety
///
/// Caller must ensure AVX2 and BMI1 are available.
#[target_feature(enable = "avx2", enable = "bmi1")]
pub(crate) unsafe fn find_first_not_any_unchecked(haystack: &[u8], set: &[u8]) -> Option<usize> {
  find_first_set_unchecked::<true>(haystack, set)
}

/// Find the last byte not contained in `set`.
///
/// # Safety
///
/// Caller must ensure AVX2 and BMI1 are available.
#[target_feature(enable = "avx2", enable = "bmi1")]
pub(crate) unsafe fn find_last_not_any_unchecked(haystack: &[u8], set: &[u8]) -> Option<usize> {
  find_last_set_unchecked::<true>(haystack, set)
}

// ─────────────────────────────────────────────────────────────────────────────
// Runtime Entry Points
// ─────────────────────────────────────────────────────────────────────────────

/// Safe wrapper for runtime dispatch.
#[inline]
pub(crate) fn find_first_runtime(haystack: &[u8], byte: u8) -> Option<usize> {
  // SAFETY: this entry is only selected when AVX2 and BMI1 are detected at
  // runtime.
  unsafe { find_first_unchecked(haystack, byte) }
}

/// Safe wrapper for runtime dispatch.
#[inline]
pub(crate) fn find_last_runtime(haystack: &[u8], byte: u8) -> Option<usize> {
  // SAFETY: this entry is only selected when AVX2 and BMI1 are detected at
  // runtime.
  unsafe { find_last_unchecked(haystack, byte) }
}

/// Safe wrapper for runtime dispatch.
#[inline]
pub(crate) fn find_first_any_runtime(haystack: &[u8], set: &[u8]) -> Option<usize> {
  // SAFETY: this entry is only selected when AVX2 and BMI1 are detected at
  // runtime.
  unsafe { find_first_any_unchecked(haystack, set) }
}

/// Safe wrapper for runtime dispatch.
#[inline]
pub(crate) fn find_last_any_runtime(haystack: &[u8], set: &[u8]) -> Option<usize> {
  // SAFETY: this entry is only selected when AVX2 and BMI1 are detected at
  // runtime.
  unsafe { find_last_any_unchecked(haystack, set) }
}

/// Safe wrapper for runtime dispatch.
#[inline]
pub(crate) fn find_first_not_any_runtime(haystack: &[u8], set: &[u8]) -> Option<usize> {
  // SAFETY: this entry is only selected when AVX2 and BMI1 are detected at
  // runtime.
  unsafe { find_first_not_any_unchecked(haystack, set) }
}

/// Safe wrapper for runtime dispatch.
#[inline]
pub(crate) fn find_last_not_any_runtime(haystack: &[u8], set: &[u8]) -> Option<usize> {
  // SAFETY: this entry is only selected when AVX2 and BMI1 are detected at
  // runtime.
  unsafe { find_last_not_any_unchecked(haystack, set) }
}

// ─────────────────────────────────────────────────────────────────────────────
// Compile-Time Entry Points
// ─────────────────────────────────────────────────────────────────────────────
//
// When AVX2 and BMI1 are enabled for the whole compilation (e.g. with
// `-C target-cpu=x86-64-v3`), the crate root calls these directly and the
// runtime dispatcher is never consulted.

/// Safe wrapper when AVX2 and BMI1 are enabled at compile time.
#[cfg(all(target_feature = "avx2", target_feature = "bmi1"))]
#[inline]
pub(crate) fn find_first_enabled(haystack: &[u8], byte: u8) -> Option<usize> {
  // SAFETY: the features are enabled for the whole compilation.
  unsafe { find_first_unchecked(haystack, byte) }
}

/// Safe wrapper when AVX2 and BMI1 are enabled at compile time.
#[cfg(all(target_feature = "avx2", target_feature = "bmi1"))]
#[inline]
pub(crate) fn find_last_enabled(haystack: &[u8], byte: u8) -> Option<usize> {
  // SAFETY: the features are enabled for the whole compilation.
  unsafe { find_last_unchecked(haystack, byte) }
}

/// Safe wrapper when AVX2 and BMI1 are enabled at compile time.
#[cfg(all(target_feature = "avx2", target_feature = "bmi1"))]
#[inline]
pub(crate) fn find_first_any_enabled(haystack: &[u8], set: &[u8]) -> Option<usize> {
  // SAFETY: the features are enabled for the whole compilation.
  unsafe { find_first_any_unchecked(haystack, set) }
}

/// Safe wrapper when AVX2 and BMI1 are enabled at compile time.
#[cfg(all(target_feature = "avx2", target_feature = "bmi1"))]
#[inline]
pub(crate) fn find_last_any_enabled(haystack: &[u8], set: &[u8]) -> Option<usize> {
  // SAFETY: the features are enabled for the whole compilation.
  unsafe { find_last_any_unchecked(haystack, set) }
}

/// Safe wrapper when AVX2 and BMI1 are enabled at compile time.
#[cfg(all(target_feature = "avx2", target_feature = "bmi1"))]
#[inline]
pub(crate) fn find_first_not_any_enabled(haystack: &[u8], set: &[u8]) -> Option<usize> {
  // SAFETY: the features are enabled for the whole compilation.
  unsafe { find_first_not_any_unchecked(haystack, set) }
}

/// Safe wrapper when AVX2 and BMI1 are enabled at compile time.
#[cfg(all(target_feature = "avx2", target_feature = "bmi1"))]
#[inline]
pub(crate) fn find_last_not_any_enabled(haystack: &[u8], set: &[u8]) -> Option<usize> {
  // SAFETY: the features are enabled for the whole compilation.
  unsafe { find_last_not_any_unchecked(haystack, set) }
}
