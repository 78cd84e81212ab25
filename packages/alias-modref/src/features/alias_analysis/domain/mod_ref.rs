//! Mod/ref lattices.
//!
//! [`ModRefInfo`] is the 2-bit lattice over "may read" and "may write",
//! closed under bitwise union and intersection. [`FunctionModRefBehavior`]
//! summarizes a whole callee as one `ModRefInfo` per disjoint location
//! class, packed into independent 2-bit fields.

use bitflags::bitflags;
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

bitflags! {
    /// Whether an operation may read and/or modify a memory region.
    ///
    /// `NO_MOD_REF` (empty) is the lattice bottom, `MOD_REF` (both bits)
    /// the top. `union` widens, `intersect` narrows.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModRefInfo: u8 {
        /// The operation may read the region
        const REF = 0b01;
        /// The operation may modify the region
        const MOD = 0b10;
    }
}

impl ModRefInfo {
    /// Neither reads nor writes (bottom, identity of union)
    pub const NO_MOD_REF: ModRefInfo = ModRefInfo::empty();

    /// May both read and write (top, identity of intersect)
    pub const MOD_REF: ModRefInfo = ModRefInfo::all();

    #[inline]
    pub fn is_no_mod_ref(self) -> bool {
        self.is_empty()
    }

    #[inline]
    pub fn is_mod_set(self) -> bool {
        self.contains(ModRefInfo::MOD)
    }

    #[inline]
    pub fn is_ref_set(self) -> bool {
        self.contains(ModRefInfo::REF)
    }

    #[inline]
    pub fn is_mod_or_ref_set(self) -> bool {
        !self.is_empty()
    }

    #[inline]
    pub fn is_mod_and_ref_set(self) -> bool {
        self.contains(ModRefInfo::MOD_REF)
    }
}

impl fmt::Display for ModRefInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match (self.is_mod_set(), self.is_ref_set()) {
            (false, false) => "NoModRef",
            (false, true) => "Ref",
            (true, false) => "Mod",
            (true, true) => "ModRef",
        };
        f.write_str(s)
    }
}

/// Disjoint classes of memory a callee might access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationClass {
    /// Memory reached through the call's pointer arguments
    ArgMem = 0,

    /// Memory not addressable from the analyzed representation
    InaccessibleMem = 1,

    /// Any other memory
    Other = 2,
}

impl LocationClass {
    pub const ALL: [LocationClass; 3] = [
        LocationClass::ArgMem,
        LocationClass::InaccessibleMem,
        LocationClass::Other,
    ];

    #[inline]
    fn shift(self) -> u32 {
        (self as u32) * FunctionModRefBehavior::BITS_PER_CLASS
    }
}

/// Summary of how a callee affects memory, per location class.
///
/// Three independent 2-bit `ModRefInfo` fields packed into one byte.
/// Union and intersect distribute over the classes; equality is
/// field-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionModRefBehavior {
    data: u8,
}

impl FunctionModRefBehavior {
    const BITS_PER_CLASS: u32 = 2;
    const CLASS_MASK: u8 = (1 << Self::BITS_PER_CLASS) - 1;

    #[inline]
    fn from_raw(data: u8) -> Self {
        Self { data }
    }

    /// Behavior accessing only the given class, with the given mod-ref
    pub fn new(class: LocationClass, mr: ModRefInfo) -> Self {
        Self::none().with_mod_ref(class, mr)
    }

    /// Behavior accessing every class with the given mod-ref
    pub fn uniform(mr: ModRefInfo) -> Self {
        let mut behavior = Self::none();
        for class in LocationClass::ALL {
            behavior = behavior.with_mod_ref(class, mr);
        }
        behavior
    }

    /// May read and write anything (least precise)
    pub fn unknown() -> Self {
        Self::uniform(ModRefInfo::MOD_REF)
    }

    /// Accesses no memory at all
    pub fn none() -> Self {
        Self::from_raw(0)
    }

    /// At most reads memory, anywhere
    pub fn read_only() -> Self {
        Self::uniform(ModRefInfo::REF)
    }

    /// At most writes memory, anywhere
    pub fn write_only() -> Self {
        Self::uniform(ModRefInfo::MOD)
    }

    /// Accesses at most argument-pointee memory
    pub fn arg_mem_only(mr: ModRefInfo) -> Self {
        Self::new(LocationClass::ArgMem, mr)
    }

    /// Accesses at most inaccessible memory
    pub fn inaccessible_mem_only(mr: ModRefInfo) -> Self {
        Self::new(LocationClass::InaccessibleMem, mr)
    }

    /// Accesses at most inaccessible or argument-pointee memory
    pub fn inaccessible_or_arg_mem_only(mr: ModRefInfo) -> Self {
        Self::none()
            .with_mod_ref(LocationClass::ArgMem, mr)
            .with_mod_ref(LocationClass::InaccessibleMem, mr)
    }

    /// Mod-ref for one location class
    #[inline]
    pub fn mod_ref(self, class: LocationClass) -> ModRefInfo {
        ModRefInfo::from_bits_truncate((self.data >> class.shift()) & Self::CLASS_MASK)
    }

    /// Copy with the class's mod-ref replaced
    pub fn with_mod_ref(self, class: LocationClass, mr: ModRefInfo) -> Self {
        let mut data = self.data;
        data &= !(Self::CLASS_MASK << class.shift());
        data |= mr.bits() << class.shift();
        Self::from_raw(data)
    }

    /// Copy with the class cleared to `NoModRef`
    pub fn without_location(self, class: LocationClass) -> Self {
        self.with_mod_ref(class, ModRefInfo::NO_MOD_REF)
    }

    /// Mod-ref over all classes combined
    pub fn combined_mod_ref(self) -> ModRefInfo {
        let mut mr = ModRefInfo::NO_MOD_REF;
        for class in LocationClass::ALL {
            mr |= self.mod_ref(class);
        }
        mr
    }

    /// Whether the callee accesses no memory
    #[inline]
    pub fn does_not_access_memory(self) -> bool {
        self.data == 0
    }

    /// Whether the callee at most reads memory
    #[inline]
    pub fn only_reads_memory(self) -> bool {
        !self.combined_mod_ref().is_mod_set()
    }

    /// Whether the callee at most writes memory
    #[inline]
    pub fn only_writes_memory(self) -> bool {
        !self.combined_mod_ref().is_ref_set()
    }

    /// Whether the callee at most accesses argument-pointee memory
    #[inline]
    pub fn only_accesses_arg_pointees(self) -> bool {
        self.without_location(LocationClass::ArgMem)
            .does_not_access_memory()
    }

    /// Whether the callee may access argument-pointee memory
    #[inline]
    pub fn does_access_arg_pointees(self) -> bool {
        self.mod_ref(LocationClass::ArgMem).is_mod_or_ref_set()
    }

    /// Whether the callee at most accesses inaccessible memory
    #[inline]
    pub fn only_accesses_inaccessible_mem(self) -> bool {
        self.without_location(LocationClass::InaccessibleMem)
            .does_not_access_memory()
    }

    /// Whether the callee at most accesses inaccessible or
    /// argument-pointee memory
    #[inline]
    pub fn only_accesses_inaccessible_or_arg_mem(self) -> bool {
        self.mod_ref(LocationClass::Other).is_no_mod_ref()
    }

    /// Widening combination (identity: `none()`)
    #[inline]
    pub fn union(self, other: Self) -> Self {
        self | other
    }

    /// Narrowing combination (identity: `unknown()`)
    #[inline]
    pub fn intersect(self, other: Self) -> Self {
        self & other
    }
}

impl BitOr for FunctionModRefBehavior {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self::from_raw(self.data | rhs.data)
    }
}

impl BitOrAssign for FunctionModRefBehavior {
    fn bitor_assign(&mut self, rhs: Self) {
        self.data |= rhs.data;
    }
}

impl BitAnd for FunctionModRefBehavior {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self::from_raw(self.data & rhs.data)
    }
}

impl BitAndAssign for FunctionModRefBehavior {
    fn bitand_assign(&mut self, rhs: Self) {
        self.data &= rhs.data;
    }
}

impl fmt::Display for FunctionModRefBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ArgMem: {}, InaccessibleMem: {}, Other: {}",
            self.mod_ref(LocationClass::ArgMem),
            self.mod_ref(LocationClass::InaccessibleMem),
            self.mod_ref(LocationClass::Other),
        )
    }
}
