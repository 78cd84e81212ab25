//! Alias query results.
//!
//! An [`AliasResult`] is the answer to "may these two memory references
//! designate overlapping storage?". The kind forms a small precision
//! lattice; partial and exact overlaps may additionally carry a signed
//! byte offset between the two references.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Offsets are encodable in a 23-bit signed window; anything wider is
/// dropped rather than clamped, so `has_offset()` stays an honest signal.
const OFFSET_BITS: u32 = 23;
const OFFSET_MIN: i32 = -(1 << (OFFSET_BITS - 1));
const OFFSET_MAX: i32 = (1 << (OFFSET_BITS - 1)) - 1;

#[inline]
fn offset_fits(offset: i32) -> bool {
    (OFFSET_MIN..=OFFSET_MAX).contains(&offset)
}

/// The possible kinds of answer to an alias query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AliasKind {
    /// The two locations never overlap
    NoAlias,

    /// The two locations may or may not overlap (least precise)
    MayAlias,

    /// The two locations overlap, but only partially
    PartialAlias,

    /// The two locations cover exactly the same storage
    MustAlias,
}

impl AliasKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AliasKind::NoAlias => "NoAlias",
            AliasKind::MayAlias => "MayAlias",
            AliasKind::PartialAlias => "PartialAlias",
            AliasKind::MustAlias => "MustAlias",
        }
    }

    /// Rank used when narrowing across components. `MayAlias` carries no
    /// information; `NoAlias` is terminal (nothing can refine it further).
    #[inline]
    pub(crate) fn precision(&self) -> u8 {
        match self {
            AliasKind::MayAlias => 0,
            AliasKind::PartialAlias => 1,
            AliasKind::MustAlias => 2,
            AliasKind::NoAlias => 3,
        }
    }
}

impl fmt::Display for AliasKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an alias query: a kind plus an optional byte offset.
///
/// The offset is only meaningful for `PartialAlias` and `MustAlias` and
/// states how far the second reference begins after the first (negative
/// when it begins before). Swapping the operand order preserves the kind
/// and negates the offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AliasResult {
    kind: AliasKind,
    offset: Option<i32>,
}

impl AliasResult {
    #[inline]
    pub fn new(kind: AliasKind) -> Self {
        Self { kind, offset: None }
    }

    #[inline]
    pub fn no_alias() -> Self {
        Self::new(AliasKind::NoAlias)
    }

    #[inline]
    pub fn may_alias() -> Self {
        Self::new(AliasKind::MayAlias)
    }

    #[inline]
    pub fn partial_alias() -> Self {
        Self::new(AliasKind::PartialAlias)
    }

    #[inline]
    pub fn must_alias() -> Self {
        Self::new(AliasKind::MustAlias)
    }

    #[inline]
    pub fn kind(&self) -> AliasKind {
        self.kind
    }

    /// Boolean view: `NoAlias` is `false`, every other kind is `true`.
    #[inline]
    pub fn aliases(&self) -> bool {
        self.kind != AliasKind::NoAlias
    }

    #[inline]
    pub fn has_offset(&self) -> bool {
        self.offset.is_some()
    }

    #[inline]
    pub fn offset(&self) -> Option<i32> {
        self.offset
    }

    /// Attach a byte offset. Ignored for kinds that cannot carry one and
    /// for values outside the encodable window.
    pub fn set_offset(&mut self, offset: i32) {
        if matches!(self.kind, AliasKind::PartialAlias | AliasKind::MustAlias)
            && offset_fits(offset)
        {
            self.offset = Some(offset);
        }
    }

    /// Builder form of [`set_offset`](Self::set_offset)
    #[inline]
    pub fn with_offset(mut self, offset: i32) -> Self {
        self.set_offset(offset);
        self
    }

    /// The same answer seen with the operands in the opposite order: the
    /// kind is unchanged and the offset negates. Negation landing outside
    /// the encodable window drops the offset.
    pub fn swapped(self) -> Self {
        let mut result = Self::new(self.kind);
        if let Some(offset) = self.offset {
            result.set_offset(-offset);
        }
        result
    }

    #[inline]
    pub(crate) fn swapped_if(self, swap: bool) -> Self {
        if swap {
            self.swapped()
        } else {
            self
        }
    }
}

impl From<AliasKind> for AliasResult {
    fn from(kind: AliasKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for AliasResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{} (off {})", self.kind, offset),
            None => write!(f, "{}", self.kind),
        }
    }
}
