//! Vectorized byte and substring search with capability-dispatched kernels.
//!
//! Forward and backward scans for a single byte, for any byte of a set, for
//! any byte outside a set, and for a substring. The byte and set scans run
//! on the widest vector kernel the host supports; every kernel tier returns
//! offsets identical to the scalar reference on every input, so callers never
//! observe which tier served them.
//!
//! ## Quick Start
//!
//! ```
//! assert_eq!(bytescan::find_first(b"banana", b'n'), Some(2));
//! assert_eq!(bytescan::find_last(b"banana", b'n'), Some(4));
//! assert_eq!(bytescan::find_first_any(b"banana", b"nz"), Some(2));
//! assert_eq!(bytescan::find_first_substring(b"banana", b"nan"), Some(2));
//! ```
//!
//! ## Kernel Tiers
//!
//! | Tier | Vector width | Requires |
//! |------|--------------|----------|
//! | `x86_64/avx2` | 32 bytes | AVX2 + BMI1 |
//! | `x86_64/sse2` | 16 bytes | SSE2 |
//! | `scalar` | 1 byte | nothing |
//!
//! Substring search is scalar on every host.
//!
//! ## Dispatch
//!
//! When the top tier's CPU features are enabled at compile time (for example
//! with `-C target-cpu=x86-64-v3`), calls go straight to that tier with no
//! dispatch overhead at all. Otherwise each operation resolves its kernel
//! once, on first use, from the capabilities reported by the [`platform`]
//! crate, and every later call is a single indirect call through the cached
//! function pointer. [`backend_name`] reports which tier is serving.
//!
//! ## `no_std`
//!
//! The crate is `no_std` by default. The `std` feature (on by default)
//! enables `OnceLock`-backed dispatch caching and runtime CPU detection;
//! without it, dispatch still works through atomics and capabilities fall
//! back to compile-time knowledge.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod dispatch;
mod scalar;
#[cfg(target_arch = "x86_64")]
mod x86_64;


// ─────────────────────────────────────────────────────────────────────────────
// Single-Byte Search
// ─────────────────────────────────────────────────────────────────────────────

/// Find the offset of the first occurrence of `byte` in `haystack`.
///
/// Returns `None` when the byte does not occur, including on an empty
/// haystack.
///
/// # Examples
///
/// ```
/// assert_eq!(bytescan::find_first(b"banana", b'n'), Some(2));
/// assert_eq!(bytescan::find_first(b"banana", b'z'), None);
/// assert_eq!(bytescan::find_first(b"", b'a'), None);
/// ```
#[inline]
#[must_use]
pub fn find_first(haystack: &[u8], byte: u8) -> Option<usize> {
  #[cfg(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "bmi1"))]
  {
    x86_64::avx2::find_first_enabled(haystack, byte)
  }
  #[cfg(not(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "bmi1")))]
  {
    dispatch::FIND_FIRST.call(haystack, byte)
  }
}

/// Find the offset of the last occurrence of `byte` in `haystack`.
///
/// Returns `None` when the byte does not occur, including on an empty
/// haystack.
///
/// # Examples
///
/// ```
/// assert_eq!(bytescan::find_last(b"banana", b'n'), Some(4));
/// assert_eq!(bytescan::find_last(b"banana", b'b'), Some(0));
/// assert_eq!(bytescan::find_last(b"banana", b'z'), None);
/// ```
#[inline]
#[must_use]
pub fn find_last(haystack: &[u8], byte: u8) -> Option<usize> {
  #[cfg(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "bmi1"))]
  {
    x86_64::avx2::find_last_enabled(haystack, byte)
  }
  #[cfg(not(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "bmi1")))]
  {
    dispatch::FIND_LAST.call(haystack, byte)
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Byte-Set Search
// ─────────────────────────────────────────────────────────────────────────────

/// Find the offset of the first byte of `haystack` contained in `set`.
///
/// An empty `set` matches nothing, so the result is `None`.
///
/// # Examples
///
/// ```
/// assert_eq!(bytescan::find_first_any(b"banana", b"nz"), Some(2));
/// assert_eq!(bytescan::find_first_any(b"banana", b""), None);
/// ```
#[inline]
#[must_use]
pub fn find_first_any(haystack: &[u8], set: &[u8]) -> Option<usize> {
  #[cfg(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "bmi1"))]
  {
    x86_64::avx2::find_first_any_enabled(haystack, set)
  }
  #[cfg(not(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "bmi1")))]
  {
    dispatch::FIND_FIRST_ANY.call(haystack, set)
  }
}

/// Find the offset of the last byte of `haystack` contained in `set`.
///
/// An empty `set` matches nothing, so the result is `None`.
///
/// # Examples
///
/// ```
/// assert_eq!(bytescan::find_last_any(b"banana", b"nz"), Some(4));
/// assert_eq!(bytescan::find_last_any(b"banana", b"qz"), None);
/// ```
#[inline]
#[must_use]
pub fn find_last_any(haystack: &[u8], set: &[u8]) -> Option<usize> {
  #[cfg(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "bmi1"))]
  {
    x86_64::avx2::find_last_any_enabled(haystack, set)
  }
  #[cfg(not(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "bmi1")))]
  {
    dispatch::FIND_LAST_ANY.call(haystack, set)
  }
}

/// Find the offset of the first byte of `haystack` not contained in `set`.
///
/// An empty `set` contains nothing, so every byte qualifies and the result
/// is `Some(0)` for any non-empty haystack.
///
/// # Examples
///
/// ```
/// assert_eq!(bytescan::find_first_not_any(b"   x", b" "), Some(3));
/// assert_eq!(bytescan::find_first_not_any(b"abc", b""), Some(0));
/// assert_eq!(bytescan::find_first_not_any(b"aaa", b"a"), None);
/// ```
#[inline]
#[must_use]
pub fn find_first_not_any(haystack: &[u8], set: &[u8]) -> Option<usize> {
  #[cfg(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "bmi1"))]
  {
    x86_64::avx2::find_first_not_any_enabled(haystack, set)
  }
  #[cfg(not(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "bmi1")))]
  {
    dispatch::FIND_FIRST_NOT_ANY.call(haystack, set)
  }
}

/// Find the offset of the last byte of `haystack` not contained in `set`.
///
/// An empty `set` contains nothing, so every byte qualifies and the result
/// is the last offset of any non-empty haystack.
///
/// # Examples
///
/// ```
/// assert_eq!(bytescan::find_last_not_any(b"x   ", b" "), Some(0));
/// assert_eq!(bytescan::find_last_not_any(b"abc", b""), Some(2));
/// assert_eq!(bytescan::find_last_not_any(b"aaa", b"a"), None);
/// ```
#[inline]
#[must_use]
pub fn find_last_not_any(haystack: &[u8], set: &[u8]) -> Option<usize> {
  #[cfg(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "bmi1"))]
  {
    x86_64::avx2::find_last_not_any_enabled(haystack, set)
  }
  #[cfg(not(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "bmi1")))]
  {
    dispatch::FIND_LAST_NOT_ANY.call(haystack, set)
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Substring Search
// ─────────────────────────────────────────────────────────────────────────────

/// Find the offset of the first occurrence of `needle` in `haystack`.
///
/// An empty needle matches at the very beginning, so the result is
/// `Some(0)`. A needle longer than the haystack never matches.
///
/// # Examples
///
/// ```
/// assert_eq!(bytescan::find_first_substring(b"banana", b"nan"), Some(2));
/// assert_eq!(bytescan::find_first_substring(b"banana", b""), Some(0));
/// assert_eq!(bytescan::find_first_substring(b"ba", b"banana"), None);
/// ```
#[inline]
#[must_use]
pub fn find_first_substring(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  scalar::find_first_substring(haystack, needle)
}

/// Find the offset of the last occurrence of `needle` in `haystack`.
///
/// An empty needle matches at the very end, so the result is
/// `Some(haystack.len())`. A needle longer than the haystack never matches.
/// Occurrences may overlap; the rightmost start offset wins.
///
/// # Examples
///
/// ```
/// assert_eq!(bytescan::find_last_substring(b"banana", b"na"), Some(4));
/// assert_eq!(bytescan::find_last_substring(b"banana", b""), Some(6));
/// assert_eq!(bytescan::find_last_substring(b"aaaa", b"aa"), Some(2));
/// ```
#[inline]
#[must_use]
pub fn find_last_substring(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  scalar::find_last_substring(haystack, needle)
}

// ─────────────────────────────────────────────────────────────────────────────
// Introspection
// ─────────────────────────────────────────────────────────────────────────────

/// Name of the kernel tier serving the scan calls on this host.
///
/// Useful for logging and benchmark labels. When the top tier is enabled at
/// compile time this is a constant; otherwise it reflects the cached runtime
/// selection.
///
/// # Examples
///
/// ```
/// let name = bytescan::backend_name();
/// assert!(!name.is_empty());
/// ```
#[must_use]
pub fn backend_name() -> &'static str {
  #[cfg(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "bmi1"))]
  {
    "x86_64/avx2"
  }
  #[cfg(not(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "bmi1")))]
  {
    dispatch::FIND_FIRST.backend_name()
  }
}
