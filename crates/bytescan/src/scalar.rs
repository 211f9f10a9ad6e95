//! Portable scan kernels.
//!
//! These run on every target and are the reference semantics for the
//! vectorized kernels: for identical inputs, every other tier must produce
//! exactly what these functions produce. They also finish off buffers shorter
//! than one vector inside the vector kernels themselves.

/// Offset of the first occurrence of `byte`.
#[inline]
pub(crate) fn find_first(haystack: &[u8], byte: u8) -> Option<usize> {
  haystack.iter().position(|&b| b == byte)
}

/// Offset of the last occurrence of `byte`.
#[inline]
pub(crate) fn find_last(haystack: &[u8], byte: u8) -> Option<usize> {
  haystack.iter().rposition(|&b| b == byte)
}

/// Offset of the first byte contained in `set`.
#[inline]
pub(crate) fn find_first_any(haystack: &[u8], set: &[u8]) -> Option<usize> {
  haystack.iter().position(|b| set.contains(b))
}

/// Offset of the last byte contained in `set`.
#[inline]
pub(crate) fn find_last_any(haystack: &[u8], set: &[u8]) -> Option<usize> {
  haystack.iter().rposition(|b| set.contains(b))
}

/// Offset of the first byte not contained in `set`.
///
/// With an empty `set` every byte qualifies, so any non-empty haystack
/// answers `Some(0)`.
#[inline]
pub(crate) fn find_first_not_any(haystack: &[u8], set: &[u8]) -> Option<usize> {
  haystack.iter().position(|b| !set.contains(b))
}

/// Offset of the last byte not contained in `set`.
#[inline]
pub(crate) fn find_last_not_any(haystack: &[u8], set: &[u8]) -> Option<usize> {
  haystack.iter().rposition(|b| !set.contains(b))
}

/// Offset of the first occurrence of `needle` as a contiguous substring.
///
/// An empty needle matches at the start of any haystack, including an empty
/// one. A needle longer than the haystack never matches.
#[inline]
pub(crate) fn find_first_substring(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  if needle.len() > haystack.len() {
    return None;
  }
  if needle.is_empty() {
    return Some(0);
  }
  haystack.windows(needle.len()).position(|window| window == needle)
}

/// Offset of the last occurrence of `needle` as a contiguous substring.
///
/// An empty needle matches at the very end, so it reports the haystack
/// length. A needle longer than the haystack never matches.
#[inline]
pub(crate) fn find_last_substring(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  if needle.len() > haystack.len() {
    return None;
  }
  if needle.is_empty() {
    return Some(haystack.len());
  }
  haystack.windows(needle.len()).rposition(|window| window == needle)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
