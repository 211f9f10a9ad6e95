//! Fuzz target for Caps binary operations.
//!
//! Tests algebraic properties:
//! - Commutativity: a | b == b | a, a & b == b & a
//! - Associativity: (a | b) | c == a | (b | c)
//! - Distributivity: a & (b | c) == (a & b) | (a & c)
//! - De Morgan's laws under complement
//! - The subset partial order agrees with has()

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use platform::Caps;

#[derive(Arbitrary, Debug)]
struct Input {
  a: [u64; 4],
  b: [u64; 4],
  c: [u64; 4],
}

fuzz_target!(|input: Input| {
  let a = Caps::from_raw(input.a);
  let b = Caps::from_raw(input.b);
  let c = Caps::from_raw(input.c);

  // ─── Commutativity ───
  assert_eq!(a | b, b | a, "union must be commutative");
  assert_eq!(a & b, b & a, "intersection must be commutative");
  assert_eq!(a ^ b, b ^ a, "symmetric difference must be commutative");

  // ─── Associativity ───
  assert_eq!((a | b) | c, a | (b | c), "union must be associative");
  assert_eq!((a & b) & c, a & (b & c), "intersection must be associative");
  assert_eq!((a ^ b) ^ c, a ^ (b ^ c), "symmetric difference must be associative");

  // ─── Distributivity ───
  assert_eq!(a & (b | c), (a & b) | (a & c), "intersection must distribute over union");

  // ─── Symmetric difference decomposition ───
  assert_eq!(a ^ b, (a | b) & !(a & b), "xor must equal union minus intersection");

  // ─── De Morgan ───
  assert_eq!(!(a | b), !a & !b, "De Morgan failed for union");
  assert_eq!(!(a & b), !a | !b, "De Morgan failed for intersection");

  // ─── Subset relationships after union ───
  let ab = a | b;
  assert!(ab.has(a), "union must contain first operand");
  assert!(ab.has(b), "union must contain second operand");

  // ─── Subset relationships after intersection ───
  let ab_inter = a & b;
  assert!(a.has(ab_inter), "first operand must contain intersection");
  assert!(b.has(ab_inter), "second operand must contain intersection");

  // ─── Count bounds ───
  assert!(ab.count() >= a.count().max(b.count()), "union count must be >= max of operand counts");
  assert!(
    ab_inter.count() <= a.count().min(b.count()),
    "intersection count must be <= min of operand counts"
  );

  // ─── Absorption laws ───
  assert_eq!(a | (a & b), a, "absorption law 1 failed");
  assert_eq!(a & (a | b), a, "absorption law 2 failed");

  // ─── Partial order agrees with has() ───
  assert!(a <= ab, "operand must be <= union");
  assert_eq!(a <= b, b.has(a), "a <= b must mean b contains a");
  assert_eq!(a >= b, a.has(b), "a >= b must mean a contains b");
  if a <= b && b <= a {
    assert_eq!(a, b, "mutual containment must mean equality");
  }
});
