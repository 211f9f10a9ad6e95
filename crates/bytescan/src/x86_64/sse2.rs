//! SSE2 scan kernels, 16 bytes per vector.
//!
//! SSE2 is part of the x86_64 baseline, so these kernels are selectable on
//! every x86_64 host. They still sit behind the capability check like any
//! other tier, which keeps the dispatch tables uniform and lets tests force
//! the scalar path by pinning an empty capability set.
//!
//! # Safety
//!
//! The `*_unchecked` kernels require SSE2. The safe `*_runtime` wrappers are
//! only ever reachable through a dispatch table entry whose requirement set
//! contains SSE2, so the feature is known to be present when they run.
//!
//! Inputs shorter than one vector go to the scalar kernels. Past that, every
//! load is either `_mm_loadu_si128` (no alignment requirement) or an aligned
//! load at an offset snapped to a 16-byte boundary, and every load stays
//! within the haystack.

#![allow(unsafe_code)]
// Loads go through `_mm_loadu_si128` or land on addresses snapped to vector
// alignment, so the u8-to-__m128i pointer casts are sound.
#![allow(clippy::cast_ptr_alignment)]

use core::arch::x86_64::{
  __m128i, _mm_andnot_si128, _mm_cmpeq_epi8, _mm_load_si128, _mm_loadu_si128, _mm_movemask_epi8,
  _mm_or_si128, _mm_set1_epi8, _mm_setzero_si128,
};

use super::{highest_bit, lowest_bit};
use crate::scalar;

// ─────────────────────────────────────────────────────────────────────────────
// Single-Byte Kernels
// ─────────────────────────────────────────────────────────────────────────────

/// Find the first occurrence of `byte`, scanning 16 bytes per step.
///
/// # Safety
///
/// Caller must ensure SSE2 is available.
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn find_first_unchecked(haystack: &[u8], byte: u8) -> Option<usize> {
  let len = haystack.len();
  if len < 16 {
    return scalar::find_first(haystack, byte);
  }

  let ptr = haystack.as_ptr();
  let needle = _mm_set1_epi8(byte as i8);

  // One unaligned vector covers the head unconditionally.
  // SAFETY: len >= 16, so bytes [0, 16) are in bounds.
  let head = unsafe { _mm_loadu_si128(ptr as *const __m128i) };
  let mask = _mm_movemask_epi8(_mm_cmpeq_epi8(head, needle)) as u32;
  if mask != 0 {
    return Some(lowest_bit(mask));
  }

  // Snap up to the first 16-byte boundary past ptr. The head vector already
  // covered every offset below it.
  let mut i = 16 - (ptr as usize & 15);

  // Four aligned vectors per iteration with a single combined test.
  while i + 4 * 16 < len {
    // SAFETY: ptr + i is 16-aligned and i + 64 < len, so all four loads are
    // aligned and in bounds.
    let (a, b, c, d) = unsafe {
      let block = ptr.add(i) as *const __m128i;
      (
        _mm_load_si128(block),
        _mm_load_si128(block.add(1)),
        _mm_load_si128(block.add(2)),
        _mm_load_si128(block.add(3)),
      )
    };

    let eq_a = _mm_cmpeq_epi8(a, needle);
    let eq_b = _mm_cmpeq_epi8(b, needle);
    let eq_c = _mm_cmpeq_epi8(c, needle);
    let eq_d = _mm_cmpeq_epi8(d, needle);

    let or_ab = _mm_or_si128(eq_a, eq_b);
    let or_cd = _mm_or_si128(eq_c, eq_d);
    if _mm_movemask_epi8(_mm_or_si128(or_ab, or_cd)) != 0 {
      let mask = _mm_movemask_epi8(eq_a) as u32;
      if mask != 0 {
        return Some(i + lowest_bit(mask));
      }
      let mask = _mm_movemask_epi8(eq_b) as u32;
      if mask != 0 {
        return Some(i + 16 + lowest_bit(mask));
      }
      let mask = _mm_movemask_epi8(eq_c) as u32;
      if mask != 0 {
        return Some(i + 2 * 16 + lowest_bit(mask));
      }
      // The combined test fired and it was not a, b or c.
      let mask = _mm_movemask_epi8(eq_d) as u32;
      return Some(i + 3 * 16 + lowest_bit(mask));
    }

    i += 4 * 16;
  }

  // Leftover whole vectors, one at a time.
  while i + 16 <= len {
    // SAFETY: ptr + i is 16-aligned and i + 16 <= len.
    let chunk = unsafe { _mm_load_si128(ptr.add(i) as *const __m128i) };
    let mask = _mm_movemask_epi8(_mm_cmpeq_epi8(chunk, needle)) as u32;
    if mask != 0 {
      return Some(i + lowest_bit(mask));
    }
    i += 16;
  }

  // Fewer than 16 bytes remain: one unaligned vector flush against the end.
  // Lanes that overlap already-scanned offsets came up clean above, so any
  // set bit in the mask is a genuine first match.
  if i < len {
    let i = len - 16;
    // SAFETY: len >= 16, so bytes [len - 16, len) are in bounds.
    let tail = unsafe { _mm_loadu_si128(ptr.add(i) as *const __m128i) };
    let mask = _mm_movemask_epi8(_mm_cmpeq_epi8(tail, needle)) as u32;
    if mask != 0 {
      return Some(i + lowest_bit(mask));
    }
  }

  None
}

/// Find the last occurrence of `byte`, scanning 16 bytes per step from the
/// end of the haystack.
///
/// # Safety
///
/// Caller must ensure SSE2 is available.
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn find_last_unchecked(haystack: &[u8], byte: u8) -> Option<usize> {
  let len = haystack.len();
  if len < 16 {
    return scalar::find_last(haystack, byte);
  }

  let ptr = haystack.as_ptr();
  let needle = _mm_set1_epi8(byte as i8);

  // One unaligned vector covers the tail unconditionally.
  // SAFETY: len >= 16, so bytes [len - 16, len) are in bounds.
  let tail = unsafe { _mm_loadu_si128(ptr.add(len - 16) as *const __m128i) };
  let mask = _mm_movemask_epi8(_mm_cmpeq_epi8(tail, needle)) as u32;
  if mask != 0 {
    return Some(len - 16 + highest_bit(mask));
  }

  // Snap down to the last 16-byte boundary at or before the final byte. The
  // tail vector already covered every offset from there up.
  let mut i = (len - 1) - ((ptr as usize + len - 1) & 15);

  // Four aligned vectors per iteration, highest addresses checked first.
  while i > 4 * 16 {
    // SAFETY: ptr + i is 16-aligned and i > 64, so all four loads are
    // aligned and in bounds.
    let (a, b, c, d) = unsafe {
      let block = ptr.add(i - 4 * 16) as *const __m128i;
      (
        _mm_load_si128(block),
        _mm_load_si128(block.add(1)),
        _mm_load_si128(block.add(2)),
        _mm_load_si128(block.add(3)),
      )
    };

    let eq_a = _mm_cmpeq_epi8(a, needle);
    let eq_b = _mm_cmpeq_epi8(b, needle);
    let eq_c = _mm_cmpeq_epi8(c, needle);
    let eq_d = _mm_cmpeq_epi8(d, needle);

    let or_ab = _mm_or_si128(eq_a, eq_b);
    let or_cd = _mm_or_si128(eq_c, eq_d);
    if _mm_movemask_epi8(_mm_or_si128(or_ab, or_cd)) != 0 {
      let mask = _mm_movemask_epi8(eq_d) as u32;
      if mask != 0 {
        return Some(i - 16 + highest_bit(mask));
      }
      let mask = _mm_movemask_epi8(eq_c) as u32;
      if mask != 0 {
        return Some(i - 2 * 16 + highest_bit(mask));
      }
      let mask = _mm_movemask_epi8(eq_b) as u32;
      if mask != 0 {
        return Some(i - 3 * 16 + highest_bit(mask));
      }
      // The combined test fired and it was not d, c or b.
      let mask = _mm_movemask_epi8(eq_a) as u32;
      return Some(i - 4 * 16 + highest_bit(mask));
    }

    i -= 4 * 16;
  }

  // Leftover whole vectors, one at a time.
  while i >= 16 {
    // SAFETY: ptr + i is 16-aligned and i >= 16.
    let chunk = unsafe { _mm_load_si128(ptr.add(i - 16) as *const __m128i) };
    let mask = _mm_movemask_epi8(_mm_cmpeq_epi8(chunk, needle)) as u32;
    if mask != 0 {
      return Some(i - 16 + highest_bit(mask));
    }
    i -= 16;
  }

  // Fewer than 16 bytes remain below the cursor: one unaligned vector at the
  // start of the buffer. Lanes at or above the cursor came up clean above.
  if i > 0 {
    // SAFETY: len >= 16, so bytes [0, 16) are in bounds.
    let head = unsafe { _mm_loadu_si128(ptr as *const __m128i) };
    let mask = _mm_movemask_epi8(_mm_cmpeq_epi8(head, needle)) as u32;
    if mask != 0 {
      return Some(highest_bit(mask));
    }
  }

  None
}

// ─────────────────────────────────────────────────────────────────────────────
// Byte-Set Kernels
// ─────────────────────────────────────────────────────────────────────────────

/// Per-lane match vector for `chunk` against `set`: a lane is all-ones when
/// its byte equals any set member, or, with `NEGATE`, when it equals none of
/// them. An empty set therefore matches no lane, or every lane under
/// `NEGATE`.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn set_match_vector<const NEGATE: bool>(chunk: __m128i, set: &[u8]) -> __m128i {
  let mut acc = _mm_setzero_si128();
  for &b in set {
    acc = _mm_or_si128(acc, _mm_cmpeq_epi8(chunk, _mm_set1_epi8(b as i8)));
  }
  if NEGATE {
    acc = _mm_andnot_si128(acc, _mm_set1_epi8(-1));
  }
  acc
}

/// Shared forward scan for `find_first_any` (`NEGATE = false`) and
/// `find_first_not_any` (`NEGATE = true`).
#[target_feature(enable = "sse2")]
unsafe fn find_first_set_unchecked<const NEGATE: bool>(
  haystack: &[u8],
  set: &[u8],
) -> Option<usize> {
  let len = haystack.len();
  if len < 16 {
    return if NEGATE {
      scalar::find_first_not_any(haystack, set)
    } else {
      scalar::find_first_any(haystack, set)
    };
  }

  let ptr = haystack.as_ptr();

  // SAFETY: len >= 16, so bytes [0, 16) are in bounds.
  let head = unsafe { _mm_loadu_si128(ptr as *const __m128i) };
  let mask = _mm_movemask_epi8(set_match_vector::<NEGATE>(head, set)) as u32;
  if mask != 0 {
    return Some(lowest_bit(mask));
  }

  let mut i = 16 - (ptr as usize & 15);

  while i + 4 * 16 < len {
    // SAFETY: ptr + i is 16-aligned and i + 64 < len.
    let (a, b, c, d) = unsafe {
      let block = ptr.add(i) as *const __m128i;
      (
        _mm_load_si128(block),
        _mm_load_si128(block.add(1)),
        _mm_load_si128(block.add(2)),
        _mm_load_si128(block.add(3)),
      )
    };

    let m_a = set_match_vector::<NEGATE>(a, set);
    let m_b = set_match_vector::<NEGATE>(b, set);
    let m_c = set_match_vector::<NEGATE>(c, set);
    let m_d = set_match_vector::<NEGATE>(d, set);

    let or_ab = _mm_or_si128(m_a, m_b);
    let or_cd = _mm_or_si128(m_c, m_d);
    if _mm_movemask_epi8(_mm_or_si128(or_ab, or_cd)) != 0 {
      let mask = _mm_movemask_epi8(m_a) as u32;
      if mask != 0 {
        return Some(i + lowest_bit(mask));
      }
      let mask = _mm_movemask_epi8(m_b) as u32;
      if mask != 0 {
        return Some(i + 16 + lowest_bit(mask));
      }
      let mask = _mm_movemask_epi8(m_c) as u32;
      if mask != 0 {
        return Some(i + 2 * 16 + lowest_bit(mask));
      }
      let mask = _mm_movemask_epi8(m_d) as u32;
      return Some(i + 3 * 16 + lowest_bit(mask));
    }

    i += 4 * 16;
  }

  while i + 16 <= len {
    // SAFETY: ptr + i is 16-aligned and i + 16 <= len.
    let chunk = unsafe { _mm_load_si128(ptr.add(i) as *const __m128i) };
    let mask = _mm_movemask_epi8(set_match_vector::<NEGATE>(chunk, set)) as u32;
    if mask != 0 {
      return Some(i + lowest_bit(mask));
    }
    i += 16;
  }

  if i < len {
    let i = len - 16;
    // SAFETY: len >= 16, so bytes [len - 16, len) are in bounds.
    let tail = unsafe { _mm_loadu_si128(ptr.add(i) as *const __m128i) };
    let mask = _mm_movemask_epi8(set_match_vector::<NEGATE>(tail, set)) as u32;
    if mask != 0 {
      return Some(i + lowest_bit(mask));
    }
  }

  None
}

/// Shared backward scan for `find_last_any` (`NEGATE = false`) and
/// `find_last_not_any` (`NEGATE = true`).
#[target_feature(enable = "sse2")]
unsafe fn find_last_set_unchecked<const NEGATE: bool>(
  haystack: &[u8],
  set: &[u8],
) -> Option<usize> {
  let len = haystack.len();
  if len < 16 {
    return if NEGATE {
      scalar::find_last_not_any(haystack, set)
    } else {
      scalar::find_last_any(haystack, set)
    };
  }

  let ptr = haystack.as_ptr();

  // SAFETY: len >= 16, so bytes [len - 16, len) are in bounds.
  let tail = unsafe { _mm_loadu_si128(ptr.add(len - 16) as *const __m128i) };
  let mask = _mm_movemask_epi8(set_match_vector::<NEGATE>(tail, set)) as u32;
  if mask != 0 {
    return Some(len - 16 + highest_bit(mask));
  }

  let mut i = (len - 1) - ((ptr as usize + len - 1) & 15);

  while i > 4 * 16 {
    // SAFETY: ptr + i is 16-aligned and i > 64.
    let (a, b, c, d) = unsafe {
      let block = ptr.add(i - 4 * 16) as *const __m128i;
      (
        _mm_load_si128(block),
        _mm_load_si128(block.add(1)),
        _mm_load_si128(block.add(2)),
        _mm_load_si128(block.add(3)),
      )
    };

    let m_a = set_match_vector::<NEGATE>(a, set);
    let m_b = set_match_vector::<NEGATE>(b, set);
    let m_c = set_match_vector::<NEGATE>(c, set);
    let m_d = set_match_vector::<NEGATE>(d, set);

    let or_ab = _mm_or_si128(m_a, m_b);
    let or_cd = _mm_or_si128(m_c, m_d);
    if _mm_movemask_epi8(_mm_or_si128(or_ab, or_cd)) != 0 {
      let mask = _mm_movemask_epi8(m_d) as u32;
      if mask != 0 {
        return Some(i - 16 + highest_bit(mask));
      }
      let mask = _mm_movemask_epi8(m_c) as u32;
      if mask != 0 {
        return Some(i - 2 * 16 + highest_bit(mask));
      }
      let mask = _mm_movemask_epi8(m_b) as u32;
      if mask != 0 {
        return Some(i - 3 * 16 + highest_bit(mask));
      }
      let mask = _mm_movemask_epi8(m_a) as u32;
      return Some(i - 4 * 16 + highest_bit(mask));
    }

    i -= 4 * 16;
  }

  while i >= 16 {
    // SAFETY: ptr + i is 16-aligned and i >= 16.
    let chunk = unsafe { _mm_load_si128(ptr.add(i - 16) as *const __m128i) };
    let mask = _mm_movemask_epi8(set_match_vector::<NEGATE>(chunk, set)) as u32;
    if mask != 0 {
      return Some(i - 16 + highest_bit(mask));
    }
    i -= 16;
  }

  if i > 0 {
    // SAFETY: len >= 16, so bytes [0, 16) are in bounds.
    let head = unsafe { _mm_loadu_si128(ptr as *const __m128i) };
    let mask = _mm_movemask_epi8(set_match_vector::<NEGATE>(head, set)) as u32;
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
/// Caller must ensure SSE2 is available.
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn find_first_any_unchecked(haystack: &[u8], set: &[u8]) -> Option<usize> {
  find_first_set_unchecked::<false>(haystack, set)
}

/// Find the last byte contained in `set`.
///
/// # Safety
///
/// Caller must ensure SSE2 is available.
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn find_last_any_unchecked(haystack: &[u8], set: &[u8]) -> Option<usize> {
  find_last_set_unchecked::<false>(haystack, set)
}

/// Find the first byte not contained in `set`.
///
/// # Safety
///
/// Caller must ensure SSE2 is available.
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn find_first_not_any_unchecked(haystack: &[u8], set: &[u8]) -> Option<usize> {
  find_first_set_unchecked::<true>(haystack, set)
}

/// Find the last byte not contained in `set`.
///
/// # Safety
///
/// Caller must ensure SSE2 is available.
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn find_last_not_any_unchecked(haystack: &[u8], set: &[u8]) -> Option<usize> {
  find_last_set_unchecked::<true>(haystack, set)
}

// ─────────────────────────────────────────────────────────────────────────────
// Runtime Entry Points
// ─────────────────────────────────────────────────────────────────────────────

/// Safe wrapper for runtime dispatch.
#[inline]
pub(crate) fn find_first_runtime(haystack: &[u8], byte: u8) -> Option<usize> {
  // SAFETY: this entry is only selected when SSE2 is detected at runtime.
  unsafe { find_first_unchecked(haystack, byte) }
}

/// Safe wrapper for runtime dispatch.
#[inline]
pub(crate) fn find_last_runtime(haystack: &[u8], byte: u8) -> Option<usize> {
  // SAFETY: this entry is only selected when SSE2 is detected at runtime.
  unsafe { find_last_unchecked(haystack, byte) }
}

/// Safe wrapper for runtime dispatch.
#[inline]
pub(crate) fn find_first_any_runtime(haystack: &[u8], set: &[u8]) -> Option<usize> {
  // SAFETY: this entry is only selected when SSE2 is detected at runtime.
  unsafe { find_first_any_unchecked(haystack, set) }
}

/// Safe wrapper for runtime dispatch.
#[inline]
pub(crate) fn find_last_any_runtime(haystack: &[u8], set: &[u8]) -> Option<usize> {
  // SAFETY: this entry is only selected when SSE2 is detected at runtime.
  unsafe { find_last_any_unchecked(haystack, set) }
}

/// Safe wrapper for runtime dispatch.
#[inline]
pub(crate) fn find_first_not_any_runtime(haystack: &[u8], set: &[u8]) -> Option<usize> {
  // SAFETY: this entry is only selected when SSE2 is detected at runtime.
  unsafe { find_first_not_any_unchecked(haystack, set) }
}

/// Safe wrapper for runtime dispatch.
#[inline]
pub(crate) fn find_last_not_any_runtime(haystack: &[u8], set: &[u8]) -> Option<usize> {
  // SAFETY: this entry is only selected when SSE2 is detected at runtime.
  unsafe { find_last_not_any_unchecked(haystack, set) }
}
