//! Opaque program-representation identities and access descriptions.
//!
//! The engine never interprets these beyond identity comparison; all
//! structural knowledge (dominance, uses, loops) comes through the
//! [`ProgramInfo`](crate::shared::ports::ProgramInfo) capability.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a pointer-producing value (interned index for performance)
pub type ValueId = u32;

/// Identifier of an instruction or call site
pub type InstId = u32;

/// Identifier of a basic block
pub type BlockId = u32;

/// Identifier of a function
pub type FunctionId = u32;

/// Opaque type tag consumed only by type-aware analysis components
pub type TypeTag = u32;

/// Extent of a memory reference, in address units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationSize {
    /// The access spans exactly this many bytes
    Exact(u64),

    /// The access spans at most this many bytes
    UpperBound(u64),

    /// Nothing is known about the extent
    Unknown,
}

impl LocationSize {
    /// Byte count when one is known, exact or as an upper bound
    #[inline]
    pub fn value(&self) -> Option<u64> {
        match self {
            LocationSize::Exact(n) | LocationSize::UpperBound(n) => Some(*n),
            LocationSize::Unknown => None,
        }
    }

    /// Whether the extent is known exactly
    #[inline]
    pub fn is_exact(&self) -> bool {
        matches!(self, LocationSize::Exact(_))
    }

    /// Least upper bound of two extents
    pub fn union(self, other: LocationSize) -> LocationSize {
        match (self, other) {
            (LocationSize::Exact(a), LocationSize::Exact(b)) if a == b => LocationSize::Exact(a),
            (a, b) => match (a.value(), b.value()) {
                (Some(x), Some(y)) => LocationSize::UpperBound(x.max(y)),
                _ => LocationSize::Unknown,
            },
        }
    }
}

impl fmt::Display for LocationSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationSize::Exact(n) => write!(f, "{}", n),
            LocationSize::UpperBound(n) => write!(f, "<={}", n),
            LocationSize::Unknown => write!(f, "unknown"),
        }
    }
}

/// How an instruction touches memory, as reported by the program view.
///
/// One description per instruction collapses the per-opcode query surface:
/// every instruction kind maps onto one of these shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryAccess {
    /// Reads through `ptr`. `ordered` marks atomic accesses with an
    /// ordering constraint, which are handled conservatively.
    Load {
        ptr: ValueId,
        size: LocationSize,
        ordered: bool,
    },

    /// Writes through `ptr`
    Store {
        ptr: ValueId,
        size: LocationSize,
        ordered: bool,
    },

    /// A call site; effects are resolved through the component pipeline
    Call,

    /// A memory barrier with unknowable effects
    Barrier,

    /// Does not touch memory
    None,
}

/// A single use of a pointer value, as seen by capture tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerUse {
    /// The use publishes the pointer (stored away, passed to an opaque
    /// call, returned)
    Escape { at: InstId },

    /// The use produces a new pointer into the same object
    Derive { at: InstId, derived: ValueId },

    /// The use reads through the pointer without retaining it
    Read { at: InstId },
}

impl PointerUse {
    /// Instruction performing the use
    #[inline]
    pub fn at(&self) -> InstId {
        match self {
            PointerUse::Escape { at }
            | PointerUse::Derive { at, .. }
            | PointerUse::Read { at } => *at,
        }
    }
}
