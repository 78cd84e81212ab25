//! Shared assertions.

use alias_modref::{AliasAggregator, FunctionModRefBehavior, MemoryLocation, ModRefInfo};

/// Check the symmetry contract: querying in either orientation yields the
/// same kind, and offsets negate.
pub fn assert_alias_symmetric(
    engine: &AliasAggregator,
    loc_a: &MemoryLocation,
    loc_b: &MemoryLocation,
) {
    let ab = engine.alias(loc_a, loc_b);
    let ba = engine.alias(loc_b, loc_a);
    assert_eq!(ab.kind(), ba.kind(), "alias kind must be symmetric");
    match (ab.offset(), ba.offset()) {
        (Some(x), Some(y)) => assert_eq!(x, -y, "offsets must negate under swap"),
        (None, None) => {}
        (x, y) => panic!("offset presence must be symmetric, got {:?} and {:?}", x, y),
    }
}

/// Associativity and commutativity of union/intersect for `ModRefInfo`
pub fn assert_mod_ref_laws(a: ModRefInfo, b: ModRefInfo, c: ModRefInfo) {
    assert_eq!(a | b, b | a);
    assert_eq!(a & b, b & a);
    assert_eq!((a | b) | c, a | (b | c));
    assert_eq!((a & b) & c, a & (b & c));
    assert_eq!(a | ModRefInfo::NO_MOD_REF, a);
    assert_eq!(a & ModRefInfo::MOD_REF, a);
}

/// Associativity and commutativity of union/intersect for behaviors
pub fn assert_behavior_laws(
    a: FunctionModRefBehavior,
    b: FunctionModRefBehavior,
    c: FunctionModRefBehavior,
) {
    assert_eq!(a.union(b), b.union(a));
    assert_eq!(a.intersect(b), b.intersect(a));
    assert_eq!(a.union(b).union(c), a.union(b.union(c)));
    assert_eq!(a.intersect(b).intersect(c), a.intersect(b.intersect(c)));
    assert_eq!(a.union(FunctionModRefBehavior::none()), a);
    assert_eq!(a.intersect(FunctionModRefBehavior::unknown()), a);
}
