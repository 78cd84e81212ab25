//! Memory reference identity.

use crate::shared::models::{LocationSize, TypeTag, ValueId};
use std::fmt;

/// A memory reference: base pointer identity, extent, and an optional
/// type tag.
///
/// The tag is only consulted by components that disambiguate through type
/// information; it does not participate in cache keys or identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryLocation {
    pub base: ValueId,
    pub size: LocationSize,
    pub type_tag: Option<TypeTag>,
}

impl MemoryLocation {
    #[inline]
    pub fn new(base: ValueId, size: LocationSize) -> Self {
        Self {
            base,
            size,
            type_tag: None,
        }
    }

    /// Reference of unknown extent around the pointer, extending both
    /// before and after it. Used when only the base identity is known.
    #[inline]
    pub fn before_or_after(base: ValueId) -> Self {
        Self::new(base, LocationSize::Unknown)
    }

    #[inline]
    pub fn with_type_tag(mut self, tag: TypeTag) -> Self {
        self.type_tag = Some(tag);
        self
    }
}

impl fmt::Display for MemoryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{} [{}]", self.base, self.size)
    }
}
