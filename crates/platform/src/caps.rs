//! CPU capability representation and set arithmetic.
//!
//! This module provides a unified capability model for all supported architectures.
//! It answers the question: "What instructions can I legally run on this machine?"
//!
//! # Design
//!
//! [`Caps`] is a 256-bit bitset representing available CPU features. Each bit
//! corresponds to a specific ISA extension. The bits are architecture-specific
//! but the API is uniform across all targets.
//!
//! # Bit Layout
//!
//! - Bits 0-63: x86/x86_64 features
//! - Bits 64-127: aarch64/arm features
//! - Bits 128-255: reserved for future architectures
//!
//! # Usage
//!
//! ```ignore
//! use platform::{caps, Caps};
//! use platform::caps::x86;
//!
//! let c = caps();
//! if c.has(x86::SCAN256_READY) {
//!     // Use the AVX2 path
//! } else if c.has(x86::SCAN128_READY) {
//!     // Use the SSE2 path
//! }
//! ```

// alloc is only needed for tests (feature_names iteration with Vec)
#[cfg(test)]
extern crate alloc;

// ─────────────────────────────────────────────────────────────────────────────
// Core Capability Type
// ─────────────────────────────────────────────────────────────────────────────

/// CPU capabilities: a 256-bit feature bitset.
///
/// This is the core type for capability-based dispatch. Use [`has()`](Caps::has)
/// to check if required features are available.
///
/// # Ordering
///
/// `Caps` implements [`PartialOrd`] as set inclusion: `a <= b` holds when every
/// feature in `a` is also in `b`. Two sets that each carry a feature the other
/// lacks are unordered, so comparisons between them return `false` in both
/// directions. This is a partial order, not a total one.
///
/// # Thread Safety
///
/// `Caps` is `Copy`, `Send`, and `Sync`. It can be freely shared across threads.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Caps(pub(crate) [u64; 4]);

impl Caps {
  /// Empty capability set (no features).
  ///
  /// Kernels requiring `NONE` run on any CPU; this is what the portable
  /// fallback entries in a candidate table declare.
  pub const NONE: Self = Self([0; 4]);

  /// Create a capability set from raw words.
  ///
  /// This is primarily useful for testing and fuzzing.
  /// Normal usage should prefer the predefined constants.
  ///
  /// # Availability
  ///
  /// This function is only available when the `testing` feature is enabled
  /// or in test builds.
  #[cfg(any(test, feature = "testing"))]
  #[inline]
  #[must_use]
  pub const fn from_raw(words: [u64; 4]) -> Self {
    Self(words)
  }

  /// Access the raw underlying words.
  ///
  /// # Availability
  ///
  /// This function is only available when the `testing` feature is enabled
  /// or in test builds.
  #[cfg(any(test, feature = "testing"))]
  #[inline]
  #[must_use]
  pub const fn as_raw(&self) -> &[u64; 4] {
    &self.0
  }

  /// Check if all features in `required` are present.
  ///
  /// This is the core dispatch check, marked `#[inline(always)]` for zero overhead.
  /// `caps.has(Caps::NONE)` is true for every `caps`.
  #[inline(always)]
  #[must_use]
  pub const fn has(self, required: Self) -> bool {
    (self.0[0] & required.0[0]) == required.0[0]
      && (self.0[1] & required.0[1]) == required.0[1]
      && (self.0[2] & required.0[2]) == required.0[2]
      && (self.0[3] & required.0[3]) == required.0[3]
  }

  /// Union of two capability sets.
  #[inline]
  #[must_use]
  pub const fn union(self, other: Self) -> Self {
    Self([
      self.0[0] | other.0[0],
      self.0[1] | other.0[1],
      self.0[2] | other.0[2],
      self.0[3] | other.0[3],
    ])
  }

  /// Intersection of two capability sets.
  #[inline]
  #[must_use]
  pub const fn intersection(self, other: Self) -> Self {
    Self([
      self.0[0] & other.0[0],
      self.0[1] & other.0[1],
      self.0[2] & other.0[2],
      self.0[3] & other.0[3],
    ])
  }

  /// Symmetric difference: features present in exactly one of the two sets.
  #[inline]
  #[must_use]
  pub const fn symmetric_difference(self, other: Self) -> Self {
    Self([
      self.0[0] ^ other.0[0],
      self.0[1] ^ other.0[1],
      self.0[2] ^ other.0[2],
      self.0[3] ^ other.0[3],
    ])
  }

  /// Complement: every bit of the 256-bit universe not in this set.
  ///
  /// The universe includes reserved bits, so `a.complement().complement() == a`
  /// holds for any `a`.
  #[inline]
  #[must_use]
  pub const fn complement(self) -> Self {
    Self([!self.0[0], !self.0[1], !self.0[2], !self.0[3]])
  }

  /// Check if the capability set is empty.
  #[inline]
  #[must_use]
  pub const fn is_empty(self) -> bool {
    self.0[0] == 0 && self.0[1] == 0 && self.0[2] == 0 && self.0[3] == 0
  }

  /// Count the number of features present.
  #[inline]
  #[must_use]
  pub const fn count(self) -> u32 {
    self.0[0].count_ones() + self.0[1].count_ones() + self.0[2].count_ones() + self.0[3].count_ones()
  }

  /// Create a capability set with a single bit set.
  ///
  /// Bit must be 0-255 (enforced by type system via u8).
  #[inline]
  #[must_use]
  pub const fn bit(bit: u8) -> Self {
    let word = (bit / 64) as usize;
    let bit_in_word = bit % 64;
    // Use match instead of indexing to satisfy const evaluation
    let mut bits = [0u64; 4];
    match word {
      0 => bits[0] = 1u64 << bit_in_word,
      1 => bits[1] = 1u64 << bit_in_word,
      2 => bits[2] = 1u64 << bit_in_word,
      _ => bits[3] = 1u64 << bit_in_word,
    }
    Self(bits)
  }

  /// Check if a specific bit is set.
  #[inline]
  #[must_use]
  pub const fn has_bit(self, bit: u8) -> bool {
    let word = (bit / 64) as usize;
    let bit_in_word = bit % 64;
    let bits_word = match word {
      0 => self.0[0],
      1 => self.0[1],
      2 => self.0[2],
      _ => self.0[3],
    };
    (bits_word & (1u64 << bit_in_word)) != 0
  }
}

impl core::ops::BitOr for Caps {
  type Output = Self;

  #[inline]
  fn bitor(self, rhs: Self) -> Self::Output {
    self.union(rhs)
  }
}

impl core::ops::BitAnd for Caps {
  type Output = Self;

  #[inline]
  fn bitand(self, rhs: Self) -> Self::Output {
    self.intersection(rhs)
  }
}

impl core::ops::BitXor for Caps {
  type Output = Self;

  #[inline]
  fn bitxor(self, rhs: Self) -> Self::Output {
    self.symmetric_difference(rhs)
  }
}

impl core::ops::Not for Caps {
  type Output = Self;

  #[inline]
  fn not(self) -> Self::Output {
    self.complement()
  }
}

impl core::ops::BitOrAssign for Caps {
  #[inline]
  fn bitor_assign(&mut self, rhs: Self) {
    *self = self.union(rhs);
  }
}

impl core::ops::BitAndAssign for Caps {
  #[inline]
  fn bitand_assign(&mut self, rhs: Self) {
    *self = self.intersection(rhs);
  }
}

impl core::ops::BitXorAssign for Caps {
  #[inline]
  fn bitxor_assign(&mut self, rhs: Self) {
    *self = self.symmetric_difference(rhs);
  }
}

/// Set inclusion. `a <= b` iff every feature in `a` is present in `b`.
///
/// Distinct sets where neither contains the other compare as unordered:
/// `partial_cmp` returns `None` and `<`, `<=`, `>`, `>=` are all false.
impl PartialOrd for Caps {
  #[inline]
  fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
    if self == other {
      Some(core::cmp::Ordering::Equal)
    } else if other.has(*self) {
      Some(core::cmp::Ordering::Less)
    } else if self.has(*other) {
      Some(core::cmp::Ordering::Greater)
    } else {
      None
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Architecture Identification
// ─────────────────────────────────────────────────────────────────────────────

/// Target architecture enumeration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Arch {
  X86_64,
  X86,
  Aarch64,
  Arm,
  #[default]
  Other,
}

impl Arch {
  /// Get the architecture for the current compilation target.
  #[inline]
  #[must_use]
  pub const fn current() -> Self {
    #[cfg(target_arch = "x86_64")]
    {
      Self::X86_64
    }
    #[cfg(target_arch = "x86")]
    {
      Self::X86
    }
    #[cfg(target_arch = "aarch64")]
    {
      Self::Aarch64
    }
    #[cfg(target_arch = "arm")]
    {
      Self::Arm
    }
    #[cfg(not(any(
      target_arch = "x86_64",
      target_arch = "x86",
      target_arch = "aarch64",
      target_arch = "arm"
    )))]
    {
      Self::Other
    }
  }

  /// Returns the human-readable name for this architecture.
  #[inline]
  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::X86_64 => "x86_64",
      Self::X86 => "x86",
      Self::Aarch64 => "aarch64",
      Self::Arm => "arm",
      Self::Other => "other",
    }
  }
}

impl core::fmt::Display for Arch {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_str(self.name())
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// x86/x86_64 Features (bits 0-63)
// ─────────────────────────────────────────────────────────────────────────────

/// x86/x86_64 CPU features.
///
/// Covers the SSE/AVX vector tiers the scan kernels target, plus the bit
/// manipulation extensions used to turn match masks into indices.
pub mod x86 {
  use super::Caps;

  // ─── SSE Family ───
  pub const SSE2: Caps = Caps::bit(0);
  pub const SSE3: Caps = Caps::bit(1);
  pub const SSSE3: Caps = Caps::bit(2);
  pub const SSE41: Caps = Caps::bit(3);
  pub const SSE42: Caps = Caps::bit(4);

  // ─── AVX Family ───
  pub const AVX: Caps = Caps::bit(5);
  pub const AVX2: Caps = Caps::bit(6);

  // ─── Bit Manipulation ───
  pub const BMI1: Caps = Caps::bit(7);
  pub const BMI2: Caps = Caps::bit(8);
  pub const POPCNT: Caps = Caps::bit(9);
  pub const LZCNT: Caps = Caps::bit(10);

  // ─── Combined Capability Masks ───
  // These represent common feature combinations for dispatch decisions.

  /// 128-bit scan ready: SSE2 (baseline on x86_64).
  ///
  /// Match masks are reduced with `trailing_zeros`/`leading_zeros`, which lower
  /// to `bsf`/`bsr` and are well-defined here because masks are checked nonzero
  /// first, so no BMI requirement.
  pub const SCAN128_READY: Caps = SSE2;

  /// 256-bit scan ready: AVX2 + BMI1 (`tzcnt` for mask reduction).
  pub const SCAN256_READY: Caps = Caps([AVX2.0[0] | BMI1.0[0], 0, 0, 0]);
}

// ─────────────────────────────────────────────────────────────────────────────
// aarch64/arm Features (bits 64-127)
// ─────────────────────────────────────────────────────────────────────────────

/// aarch64 CPU features.
pub mod aarch64 {
  use super::Caps;

  /// Advanced SIMD. Part of the AArch64 baseline.
  pub const NEON: Caps = Caps::bit(64);
}

// ─────────────────────────────────────────────────────────────────────────────
// Feature Name Lookup (for diagnostics)
// ─────────────────────────────────────────────────────────────────────────────

/// Feature name entry: (bit_index, name).
type FeatureEntry = (u8, &'static str);

/// x86/x86_64 feature names.
const X86_FEATURES: &[FeatureEntry] = &[
  (0, "sse2"),
  (1, "sse3"),
  (2, "ssse3"),
  (3, "sse4.1"),
  (4, "sse4.2"),
  (5, "avx"),
  (6, "avx2"),
  (7, "bmi1"),
  (8, "bmi2"),
  (9, "popcnt"),
  (10, "lzcnt"),
];

/// aarch64 feature names.
const AARCH64_FEATURES: &[FeatureEntry] = &[(64, "neon")];

impl Caps {
  /// Returns an iterator over the names of all set feature bits.
  pub fn feature_names(self) -> impl Iterator<Item = &'static str> {
    X86_FEATURES
      .iter()
      .chain(AARCH64_FEATURES.iter())
      .filter_map(move |(bit, name)| if self.has_bit(*bit) { Some(*name) } else { None })
  }
}

impl core::fmt::Debug for Caps {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    let arch = Arch::current();
    write!(f, "Caps({}", arch)?;

    let mut iter = self.feature_names().peekable();
    if iter.peek().is_none() {
      write!(f, ", none)")
    } else {
      write!(f, ", [")?;
      let mut first = true;
      for name in iter {
        if !first {
          write!(f, ", ")?;
        }
        first = false;
        write!(f, "{name}")?;
      }
      write!(f, "])")
    }
  }
}

impl core::fmt::Display for Caps {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    core::fmt::Debug::fmt(self, f)
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_caps_basic() {
    let empty = Caps::NONE;
    assert!(empty.is_empty());
    assert_eq!(empty.count(), 0);

    let bit0 = Caps::bit(0);
    assert!(!bit0.is_empty());
    assert_eq!(bit0.count(), 1);
    assert!(bit0.has_bit(0));
    assert!(!bit0.has_bit(1));
  }

  #[test]
  fn test_caps_union_intersection() {
    let a = Caps::bit(0);
    let b = Caps::bit(1);
    let ab = a.union(b);

    assert!(ab.has_bit(0));
    assert!(ab.has_bit(1));
    assert!(!ab.has_bit(2));
    assert_eq!(ab.count(), 2);

    assert!(ab.has(a));
    assert!(ab.has(b));
    assert!(!a.has(ab));
  }

  #[test]
  fn test_caps_symmetric_difference() {
    let a = Caps::bit(0) | Caps::bit(1);
    let b = Caps::bit(1) | Caps::bit(2);

    let sym = a.symmetric_difference(b);
    assert!(sym.has_bit(0));
    assert!(!sym.has_bit(1));
    assert!(sym.has_bit(2));
    assert_eq!(sym, a ^ b);

    // XOR with self cancels
    assert_eq!(a ^ a, Caps::NONE);
  }

  #[test]
  fn test_caps_complement() {
    let a = Caps::bit(0) | Caps::bit(64) | Caps::bit(255);
    let c = a.complement();

    assert!(!c.has_bit(0));
    assert!(!c.has_bit(64));
    assert!(!c.has_bit(255));
    assert!(c.has_bit(1));
    assert_eq!(c.count(), 256 - 3);

    assert_eq!(c.complement(), a);
    assert_eq!(!Caps::NONE, Caps::NONE.complement());
    assert_eq!((!Caps::NONE).count(), 256);
  }

  #[test]
  fn test_caps_empty_is_subset_of_all() {
    let some = x86::SCAN256_READY;
    assert!(some.has(Caps::NONE));
    assert!(Caps::NONE.has(Caps::NONE));
    assert!(Caps::NONE <= some);
    assert!(Caps::NONE <= Caps::NONE);
  }

  #[test]
  fn test_caps_partial_order_is_subset() {
    let sse2 = x86::SSE2;
    let sse2_avx2 = x86::SSE2 | x86::AVX2;

    assert!(sse2 < sse2_avx2);
    assert!(sse2 <= sse2_avx2);
    assert!(sse2_avx2 > sse2);
    assert!(sse2_avx2 >= sse2);
    assert!(sse2 <= sse2);
    assert!(sse2 >= sse2);

    assert_eq!(sse2.partial_cmp(&sse2_avx2), Some(core::cmp::Ordering::Less));
    assert_eq!(sse2_avx2.partial_cmp(&sse2), Some(core::cmp::Ordering::Greater));
    assert_eq!(sse2.partial_cmp(&sse2), Some(core::cmp::Ordering::Equal));
  }

  #[test]
  fn test_caps_partial_order_incomparable() {
    // Neither contains the other: all four comparisons are false.
    let a = x86::SSE2 | x86::BMI1;
    let b = x86::SSE2 | x86::AVX2;

    assert_eq!(a.partial_cmp(&b), None);
    assert!(!(a < b));
    assert!(!(a <= b));
    assert!(!(a > b));
    assert!(!(a >= b));
    assert_ne!(a, b);
  }

  #[test]
  fn test_caps_word_boundary_63_64() {
    let bit63 = Caps::bit(63);
    let bit64 = Caps::bit(64);

    assert!(bit63.0[0] != 0 && bit63.0[1] == 0);
    assert!(bit64.0[0] == 0 && bit64.0[1] != 0);

    let both = bit63 | bit64;
    assert!(both.has(bit63));
    assert!(both.has(bit64));
    assert_eq!(both.count(), 2);

    assert!((bit63 & bit64).is_empty());
  }

  #[test]
  fn test_x86_combined_masks() {
    assert_eq!(x86::SCAN128_READY, x86::SSE2);

    let scan256 = x86::SCAN256_READY;
    assert!(scan256.has(x86::AVX2));
    assert!(scan256.has(x86::BMI1));
    assert!(!scan256.has(x86::SSE2));
  }

  #[test]
  fn test_feature_names() {
    let caps = x86::SSE42 | x86::BMI1;
    let names: alloc::vec::Vec<_> = caps.feature_names().collect();
    assert!(names.contains(&"sse4.2"));
    assert!(names.contains(&"bmi1"));
    assert!(!names.contains(&"avx2"));
  }

  #[test]
  fn test_arch_current() {
    let arch = Arch::current();
    #[cfg(target_arch = "x86_64")]
    assert_eq!(arch, Arch::X86_64);
    #[cfg(target_arch = "aarch64")]
    assert_eq!(arch, Arch::Aarch64);
  }

  #[test]
  fn test_operators() {
    let a = Caps::bit(0);
    let b = Caps::bit(1);

    assert_eq!(a | b, a.union(b));
    assert_eq!((a | b) & a, a);
    assert_eq!(a ^ b, a.symmetric_difference(b));

    let mut c = a;
    c |= b;
    assert_eq!(c, a | b);
    c &= a;
    assert_eq!(c, a);
    c ^= a;
    assert!(c.is_empty());
  }

  #[test]
  fn test_debug_impl() {
    let caps = x86::SSE42 | x86::BMI1;
    let debug_str = alloc::format!("{:?}", caps);

    assert!(debug_str.contains("Caps("));
    assert!(debug_str.contains("sse4.2"));
    assert!(debug_str.contains("bmi1"));
  }

  #[test]
  fn test_debug_impl_empty() {
    let caps = Caps::NONE;
    let debug_str = alloc::format!("{:?}", caps);
    assert!(debug_str.contains("none"));
  }

  #[test]
  fn test_bit_positions_no_overlap() {
    for i in 0u8..=255 {
      let caps = Caps::bit(i);
      assert_eq!(caps.count(), 1, "Caps::bit({i}) should set exactly 1 bit");
      assert!(caps.has_bit(i), "Caps::bit({i}) should have bit {i} set");

      for j in [0u8, 63, 64, 127, 128, 191, 192, 255] {
        if i != j {
          assert!(!caps.has_bit(j), "Caps::bit({i}) should not have bit {j} set");
        }
      }
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Property-Based Tests (proptest)
// Note: proptest uses filesystem for failure persistence, which Miri doesn't support.
// ─────────────────────────────────────────────────────────────────────────────
