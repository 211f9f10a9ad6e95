//! CPU detection and capability arithmetic for bytescan.
//!
//! This crate is the **single source of truth** for CPU feature detection
//! across the bytescan workspace.
//!
//! # Core Type
//!
//! - [`Caps`]: What instructions can run on this machine, as a set of feature
//!   bits that kernels state their requirements against.
//!
//! # Main Entry Point
//!
//! ```ignore
//! use platform::caps;
//!
//! let caps = caps();
//!
//! if caps.has(platform::caps::x86::SCAN256_READY) {
//!     // Use the AVX2 kernel
//! }
//! ```
//!
//! # Design Philosophy
//!
//! 1. **One API**: Algorithms query `platform::caps()` instead of doing ad-hoc detection.
//! 2. **No false positives**: A reported feature is guaranteed usable; when in doubt the
//!    bit stays clear and dispatch falls back to portable code.
//! 3. **Zero-cost when possible**: Compile-time features come from `cfg!`, avoiding runtime
//!    overhead; [`caps_static()`] is a `const fn`.
//! 4. **Cached otherwise**: Runtime detection is cached in a `OnceLock` (std). Without std
//!    it degrades to the compile-time set.
//! 5. **Miri-safe**: Under Miri, always returns the empty set.

#![no_std]

#[cfg(feature = "std")]
extern crate std;

// ─────────────────────────────────────────────────────────────────────────────
// Core modules
// ─────────────────────────────────────────────────────────────────────────────

pub mod caps;
mod detect;

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

pub use caps::{Arch, Caps};
pub use detect::{caps_static, detect_uncached};

/// Get detected CPU capabilities.
///
/// This is the main entry point for capability-based dispatch.
///
/// # Caching
///
/// - With `std`: Results are cached in a `OnceLock` (one-time detection).
/// - Without `std`: Returns the compile-time feature set.
///
/// # Miri
///
/// Under Miri, always returns the empty set to avoid interpreting SIMD
/// intrinsics.
///
/// # Example
///
/// ```ignore
/// let caps = platform::caps();
///
/// if caps.has(platform::caps::x86::SCAN256_READY) {
///     // Use the AVX2 kernel
/// } else if caps.has(platform::caps::x86::SCAN128_READY) {
///     // Use the SSE2 kernel
/// }
/// ```
#[inline]
#[must_use]
pub fn caps() -> Caps {
  detect::get()
}

/// Initialize with user-supplied capabilities.
///
/// Call this before any call to [`caps()`] to bypass runtime detection.
/// This is useful for:
/// - Bare metal environments without runtime detection support
/// - Embedded systems where the CPU is known at deployment
/// - Testing specific code paths
///
/// # Example
///
/// ```ignore
/// use platform::caps::x86;
///
/// // The deployment target is known to be AVX2-capable.
/// platform::init_with_caps(x86::SCAN256_READY.union(x86::SCAN128_READY));
/// ```
#[inline]
pub fn init_with_caps(caps: Caps) {
  detect::init_with_caps(caps);
}

/// Set or clear the capabilities override.
///
/// When set, [`caps()`] will return the override value instead of detecting.
/// Pass `None` to clear the override and resume detection.
///
/// # Thread Safety
///
/// This function is thread-safe but should typically be called early in
/// program initialization, before any calls to [`caps()`].
///
/// # Example
///
/// ```ignore
/// use platform::Caps;
///
/// // In tests: pin the portable fallback
/// platform::set_caps_override(Some(Caps::NONE));
/// // ... run tests with portable fallback ...
/// platform::set_caps_override(None);
/// ```
#[inline]
pub fn set_caps_override(value: Option<Caps>) {
  detect::set_caps_override(value);
}

/// Check if an override is currently set.
#[inline]
#[must_use]
pub fn has_override() -> bool {
  detect::has_override()
}
