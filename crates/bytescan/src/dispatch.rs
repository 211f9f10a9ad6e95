//! Kernel dispatch: selection and caching.
//!
//! This module provides the dispatch machinery for the scan kernels:
//!
//! - [`Candidate`]: A kernel with capability requirements
//! - [`Selected`]: The result of kernel selection
//! - [`select`]: Choose the best kernel from a candidate list
//! - Newtype dispatchers: [`FindByteDispatcher`], [`FindSetDispatcher`]
//!
//! # Design
//!
//! The dispatch system has two paths:
//!
//! 1. **Compile-time selection** (zero-cost): When the top kernel tier is enabled at compile
//!    time, the public functions in the crate root bypass the dispatcher entirely via `cfg`
//!    guards and call that kernel directly.
//!
//! 2. **Runtime selection** (cached): For generic binaries, each operation's dispatcher
//!    resolves its kernel once, on first use, from detected CPU features. Subsequent calls
//!    are a single indirect call through the cached function pointer.
//!
//! # Candidate tables
//!
//! Kernels are registered per operation as an ordered list of [`Candidate`]s, most capable
//! first, ending with the portable fallback whose requirement set is empty. Selection walks
//! the list and takes the first entry whose requirements the detected capabilities satisfy,
//! so the fallback terminates every walk. A table where a later entry requires a superset of
//! an earlier entry's features is defective (the later entry could never win) and is rejected
//! by a debug assertion rather than silently misdispatching.

use platform::Caps;

use crate::scalar;
#[cfg(target_arch = "x86_64")]
use crate::x86_64::{avx2, sse2};
#[cfg(target_arch = "x86_64")]
use platform::caps::x86;

// ─────────────────────────────────────────────────────────────────────────────
// Core Types
// ─────────────────────────────────────────────────────────────────────────────

/// Signature for single-byte scan kernels: `fn(haystack, byte) -> offset`
pub(crate) type FindByteFn = fn(&[u8], u8) -> Option<usize>;

/// Signature for byte-set scan kernels: `fn(haystack, set) -> offset`
pub(crate) type FindSetFn = fn(&[u8], &[u8]) -> Option<usize>;

/// A candidate kernel with capability requirements.
///
/// Candidates are ordered from most to least capable. The dispatcher selects
/// the first candidate whose requirements are satisfied by the detected
/// capabilities.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Candidate<F> {
  /// Human-readable name for diagnostics (e.g., "x86_64/avx2").
  pub name: &'static str,
  /// Required CPU capabilities. Must be a subset of detected caps.
  pub requires: Caps,
  /// The kernel function pointer.
  pub func: F,
}

impl<F> Candidate<F> {
  /// Create a new candidate.
  #[inline]
  #[must_use]
  pub const fn new(name: &'static str, requires: Caps, func: F) -> Self {
    Self { name, requires, func }
  }
}

/// The result of kernel selection.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Selected<F> {
  /// Human-readable name of the selected kernel.
  pub name: &'static str,
  /// The selected kernel function.
  pub func: F,
}

impl<F> Selected<F> {
  /// Create a new selected result.
  #[inline]
  #[must_use]
  pub const fn new(name: &'static str, func: F) -> Self {
    Self { name, func }
  }
}

/// Table discipline checks, debug builds only.
///
/// A table must end with a portable fallback, and no entry may require a
/// superset of an earlier entry's features: the earlier, less demanding entry
/// matches every capability set the later one does, leaving the later entry
/// unreachable.
fn debug_assert_table<F>(candidates: &[Candidate<F>]) {
  if cfg!(debug_assertions) {
    assert!(!candidates.is_empty(), "empty candidate table");
    assert!(
      candidates.last().is_some_and(|c| c.requires.is_empty()),
      "candidate table must end with a portable fallback"
    );
    for (i, earlier) in candidates.iter().enumerate() {
      for later in candidates.iter().skip(i + 1) {
        assert!(
          !(earlier.requires <= later.requires),
          "candidate '{}' is unreachable behind '{}'",
          later.name,
          earlier.name
        );
      }
    }
  }
}

/// Select the best kernel from a candidate list.
///
/// Returns the first candidate whose `requires` is satisfied by `caps`.
///
/// # Panics
///
/// Panics if no candidate matches, which a table ending in a portable
/// fallback (`requires` empty) makes impossible: `caps.has(Caps::NONE)` is
/// true for every capability set.
#[inline]
#[must_use]
pub(crate) fn select<F: Copy>(caps: Caps, candidates: &[Candidate<F>]) -> Selected<F> {
  debug_assert_table(candidates);

  for candidate in candidates {
    if caps.has(candidate.requires) {
      return Selected::new(candidate.name, candidate.func);
    }
  }

  panic!("no matching kernel: candidate table must end with a portable fallback");
}

// ─────────────────────────────────────────────────────────────────────────────
// Newtype Dispatchers
// ─────────────────────────────────────────────────────────────────────────────
//
// Each kernel signature gets its own dispatcher type so a byte-scan slot can
// never be wired to a set-scan kernel.

/// Dispatcher for single-byte scan kernels.
///
/// Caches the selected kernel on first access. Under `std` it uses `OnceLock`
/// for thread-safe initialization; without `std` it uses atomics. Either way
/// the selector runs at most once per slot on the happy path, and every call
/// after the first is one indirect call.
///
/// # Example
///
/// ```ignore
/// static FIND_FIRST: FindByteDispatcher = FindByteDispatcher::new(select_find_first);
///
/// fn find_first(haystack: &[u8], byte: u8) -> Option<usize> {
///     FIND_FIRST.call(haystack, byte)
/// }
/// ```
pub(crate) struct FindByteDispatcher {
  #[cfg(feature = "std")]
  inner: std::sync::OnceLock<Selected<FindByteFn>>,

  #[cfg(not(feature = "std"))]
  func: core::sync::atomic::AtomicPtr<()>,
  #[cfg(not(feature = "std"))]
  name_ptr: core::sync::atomic::AtomicPtr<u8>,
  #[cfg(not(feature = "std"))]
  name_len: core::sync::atomic::AtomicUsize,

  /// The selector function that chooses the best kernel.
  selector: fn() -> Selected<FindByteFn>,
}

impl FindByteDispatcher {
  /// Create a new dispatcher with the given selector function.
  ///
  /// The selector is called once on first access to choose the best kernel.
  #[must_use]
  pub const fn new(selector: fn() -> Selected<FindByteFn>) -> Self {
    Self {
      #[cfg(feature = "std")]
      inner: std::sync::OnceLock::new(),

      #[cfg(not(feature = "std"))]
      func: core::sync::atomic::AtomicPtr::new(core::ptr::null_mut()),
      #[cfg(not(feature = "std"))]
      name_ptr: core::sync::atomic::AtomicPtr::new(core::ptr::null_mut()),
      #[cfg(not(feature = "std"))]
      name_len: core::sync::atomic::AtomicUsize::new(0),

      selector,
    }
  }

  /// Get the selected kernel, initializing on first call.
  #[inline]
  #[must_use]
  pub fn get(&self) -> Selected<FindByteFn> {
    #[cfg(feature = "std")]
    {
      *self.inner.get_or_init(|| (self.selector)())
    }

    #[cfg(not(feature = "std"))]
    {
      use core::sync::atomic::Ordering;

      let func_ptr = self.func.load(Ordering::Acquire);
      if func_ptr.is_null() {
        // First access: run selector and store result
        let selected = (self.selector)();

        self.func.store(selected.func as *mut (), Ordering::Release);

        // Store name pointer and length separately (Rust strings are NOT null-terminated)
        self.name_ptr.store(selected.name.as_ptr() as *mut u8, Ordering::Release);
        self.name_len.store(selected.name.len(), Ordering::Release);

        selected
      } else {
        // Already initialized: reconstruct Selected from cached values
        // SAFETY: func_ptr was stored from a valid FindByteFn
        #[allow(unsafe_code)]
        let func: FindByteFn = unsafe { core::mem::transmute(func_ptr) };

        let name_ptr = self.name_ptr.load(Ordering::Acquire);
        let name_len = self.name_len.load(Ordering::Acquire);

        let name = if name_ptr.is_null() || name_len == 0 {
          "unknown"
        } else {
          // SAFETY: name_ptr and name_len were stored from a valid &'static str
          #[allow(unsafe_code)]
          unsafe {
            core::str::from_utf8_unchecked(core::slice::from_raw_parts(name_ptr, name_len))
          }
        };
        Selected { name, func }
      }
    }
  }

  /// Get the name of the selected kernel.
  #[inline]
  #[must_use]
  pub fn backend_name(&self) -> &'static str {
    self.get().name
  }

  /// Call the selected kernel.
  #[inline]
  #[must_use]
  pub fn call(&self, haystack: &[u8], byte: u8) -> Option<usize> {
    (self.get().func)(haystack, byte)
  }
}

// SAFETY: FindByteDispatcher uses OnceLock (std) or atomic operations (no_std),
// both of which are thread-safe. The stored function pointers are read-only after init.
#[allow(unsafe_code)]
unsafe impl Sync for FindByteDispatcher {}
#[allow(unsafe_code)]
unsafe impl Send for FindByteDispatcher {}

/// Dispatcher for byte-set scan kernels.
///
/// Similar to [`FindByteDispatcher`] but for kernels taking a set of needle
/// bytes.
pub(crate) struct FindSetDispatcher {
  #[cfg(feature = "std")]
  inner: std::sync::OnceLock<Selected<FindSetFn>>,

  #[cfg(not(feature = "std"))]
  func: core::sync::atomic::AtomicPtr<()>,
  #[cfg(not(feature = "std"))]
  name_ptr: core::sync::atomic::AtomicPtr<u8>,
  #[cfg(not(feature = "std"))]
  name_len: core::sync::atomic::AtomicUsize,

  selector: fn() -> Selected<FindSetFn>,
}

impl FindSetDispatcher {
  /// Create a new dispatcher with the given selector function.
  #[must_use]
  pub const fn new(selector: fn() -> Selected<FindSetFn>) -> Self {
    Self {
      #[cfg(feature = "std")]
      inner: std::sync::OnceLock::new(),

      #[cfg(not(feature = "std"))]
      func: core::sync::atomic::AtomicPtr::new(core::ptr::null_mut()),
      #[cfg(not(feature = "std"))]
      name_ptr: core::sync::atomic::AtomicPtr::new(core::ptr::null_mut()),
      #[cfg(not(feature = "std"))]
      name_len: core::sync::atomic::AtomicUsize::new(0),

      selector,
    }
  }

  /// Get the selected kernel, initializing on first call.
  #[inline]
  #[must_use]
  pub fn get(&self) -> Selected<FindSetFn> {
    #[cfg(feature = "std")]
    {
      *self.inner.get_or_init(|| (self.selector)())
    }

    #[cfg(not(feature = "std"))]
    {
      use core::sync::atomic::Ordering;

      let func_ptr = self.func.load(Ordering::Acquire);
      if func_ptr.is_null() {
        let selected = (self.selector)();

        self.func.store(selected.func as *mut (), Ordering::Release);
        self.name_ptr.store(selected.name.as_ptr() as *mut u8, Ordering::Release);
        self.name_len.store(selected.name.len(), Ordering::Release);

        selected
      } else {
        // SAFETY: func_ptr was stored from a valid FindSetFn
        #[allow(unsafe_code)]
        let func: FindSetFn = unsafe { core::mem::transmute(func_ptr) };

        let name_ptr = self.name_ptr.load(Ordering::Acquire);
        let name_len = self.name_len.load(Ordering::Acquire);

        let name = if name_ptr.is_null() || name_len == 0 {
          "unknown"
        } else {
          // SAFETY: name_ptr and name_len were stored from a valid &'static str
          #[allow(unsafe_code)]
          unsafe {
            core::str::from_utf8_unchecked(core::slice::from_raw_parts(name_ptr, name_len))
          }
        };
        Selected { name, func }
      }
    }
  }

  /// Get the name of the selected kernel.
  #[inline]
  #[must_use]
  pub fn backend_name(&self) -> &'static str {
    self.get().name
  }

  /// Call the selected kernel.
  #[inline]
  #[must_use]
  pub fn call(&self, haystack: &[u8], set: &[u8]) -> Option<usize> {
    (self.get().func)(haystack, set)
  }
}

// SAFETY: FindSetDispatcher uses OnceLock (std) or atomic operations (no_std),
// both of which are thread-safe. The stored function pointers are read-only after init.
#[allow(unsafe_code)]
unsafe impl Sync for FindSetDispatcher {}
#[allow(unsafe_code)]
unsafe impl Send for FindSetDispatcher {}

// ─────────────────────────────────────────────────────────────────────────────
// Candidate Tables
// ─────────────────────────────────────────────────────────────────────────────
//
// One table per operation, most capable first, portable fallback last. All
// six share the same tier ladder, so a host reports the same kernel family
// for every operation.

#[cfg(target_arch = "x86_64")]
const FIND_FIRST_CANDIDATES: &[Candidate<FindByteFn>] = &[
  Candidate::new("x86_64/avx2", x86::SCAN256_READY, avx2::find_first_runtime),
  Candidate::new("x86_64/sse2", x86::SCAN128_READY, sse2::find_first_runtime),
  Candidate::new("scalar", Caps::NONE, scalar::find_first),
];
#[cfg(not(target_arch = "x86_64"))]
const FIND_FIRST_CANDIDATES: &[Candidate<FindByteFn>] =
  &[Candidate::new("scalar", Caps::NONE, scalar::find_first)];

#[cfg(target_arch = "x86_64")]
const FIND_LAST_CANDIDATES: &[Candidate<FindByteFn>] = &[
  Candidate::new("x86_64/avx2", x86::SCAN256_READY, avx2::find_last_runtime),
  Candidate::new("x86_64/sse2", x86::SCAN128_READY, sse2::find_last_runtime),
  Candidate::new("scalar", Caps::NONE, scalar::find_last),
];
#[cfg(not(target_arch = "x86_64"))]
const FIND_LAST_CANDIDATES: &[Candidate<FindByteFn>] =
  &[Candidate::new("scalar", Caps::NONE, scalar::find_last)];

#[cfg(target_arch = "x86_64")]
const FIND_FIRST_ANY_CANDIDATES: &[Candidate<FindSetFn>] = &[
  Candidate::new("x86_64/avx2", x86::SCAN256_READY, avx2::find_first_any_runtime),
  Candidate::new("x86_64/sse2", x86::SCAN128_READY, sse2::find_first_any_runtime),
  Candidate::new("scalar", Caps::NONE, scalar::find_first_any),
];
#[cfg(not(target_arch = "x86_64"))]
const FIND_FIRST_ANY_CANDIDATES: &[Candidate<FindSetFn>] =
  &[Candidate::new("scalar", Caps::NONE, scalar::find_first_any)];

#[cfg(target_arch = "x86_64")]
const FIND_LAST_ANY_CANDIDATES: &[Candidate<FindSetFn>] = &[
  Candidate::new("x86_64/avx2", x86::SCAN256_READY, avx2::find_last_any_runtime),
  Candidate::new("x86_64/sse2", x86::SCAN128_READY, sse2::find_last_any_runtime),
  Candidate::new("scalar", Caps::NONE, scalar::find_last_any),
];
#[cfg(not(target_arch = "x86_64"))]
const FIND_LAST_ANY_CANDIDATES: &[Candidate<FindSetFn>] =
  &[Candidate::new("scalar", Caps::NONE, scalar::find_last_any)];

#[cfg(target_arch = "x86_64")]
const FIND_FIRST_NOT_ANY_CANDIDATES: &[Candidate<FindSetFn>] = &[
  Candidate::new("x86_64/avx2", x86::SCAN256_READY, avx2::find_first_not_any_runtime),
  Candidate::new("x86_64/sse2", x86::SCAN128_READY, sse2::find_first_not_any_runtime),
  Candidate::new("scalar", Caps::NONE, scalar::find_first_not_any),
];
#[cfg(not(target_arch = "x86_64"))]
const FIND_FIRST_NOT_ANY_CANDIDATES: &[Candidate<FindSetFn>] =
  &[Candidate::new("scalar", Caps::NONE, scalar::find_first_not_any)];

#[cfg(target_arch = "x86_64")]
const FIND_LAST_NOT_ANY_CANDIDATES: &[Candidate<FindSetFn>] = &[
  Candidate::new("x86_64/avx2", x86::SCAN256_READY, avx2::find_last_not_any_runtime),
  Candidate::new("x86_64/sse2", x86::SCAN128_READY, sse2::find_last_not_any_runtime),
  Candidate::new("scalar", Caps::NONE, scalar::find_last_not_any),
];
#[cfg(not(target_arch = "x86_64"))]
const FIND_LAST_NOT_ANY_CANDIDATES: &[Candidate<FindSetFn>] =
  &[Candidate::new("scalar", Caps::NONE, scalar::find_last_not_any)];

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch Slots
// ─────────────────────────────────────────────────────────────────────────────

fn select_find_first() -> Selected<FindByteFn> {
  select(platform::caps(), FIND_FIRST_CANDIDATES)
}

fn select_find_last() -> Selected<FindByteFn> {
  select(platform::caps(), FIND_LAST_CANDIDATES)
}

fn select_find_first_any() -> Selected<FindSetFn> {
  select(platform::caps(), FIND_FIRST_ANY_CANDIDATES)
}

fn select_find_last_any() -> Selected<FindSetFn> {
  select(platform::caps(), FIND_LAST_ANY_CANDIDATES)
}

fn select_find_first_not_any() -> Selected<FindSetFn> {
  select(platform::caps(), FIND_FIRST_NOT_ANY_CANDIDATES)
}

fn select_find_last_not_any() -> Selected<FindSetFn> {
  select(platform::caps(), FIND_LAST_NOT_ANY_CANDIDATES)
}

pub(crate) static FIND_FIRST: FindByteDispatcher = FindByteDispatcher::new(select_find_first);
pub(crate) static FIND_LAST: FindByteDispatcher = FindByteDispatcher::new(select_find_last);
pub(crate) static FIND_FIRST_ANY: FindSetDispatcher = FindSetDispatcher::new(select_find_first_any);
pub(crate) static FIND_LAST_ANY: FindSetDispatcher = FindSetDispatcher::new(select_find_last_any);
pub(crate) static FIND_FIRST_NOT_ANY: FindSetDispatcher =
  FindSetDispatcher::new(select_find_first_not_any);
pub(crate) static FIND_LAST_NOT_ANY: FindSetDispatcher =
  FindSetDispatcher::new(select_find_last_not_any);

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
