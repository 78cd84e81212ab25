//! In-memory program representation implementing the `ProgramInfo`
//! capability for tests.

use alias_modref::{
    BlockId, InstId, LocationSize, MemoryAccess, PointerUse, ProgramInfo, ValueId,
};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// A synthetic function body: instructions are numbered in dominance
/// order, values carry explicit object/use metadata, and loops are
/// recorded as entry boundaries.
///
/// Built through [`ProgramBuilder`](crate::common::ProgramBuilder);
/// instruction removal is supported so capture-invalidation scenarios can
/// mutate the program mid-test.
pub struct TestProgram {
    pub(crate) blocks: Vec<Vec<InstId>>,
    pub(crate) inst_block: HashMap<InstId, BlockId>,
    pub(crate) accesses: HashMap<InstId, MemoryAccess>,
    pub(crate) call_args: HashMap<InstId, Vec<ValueId>>,
    pub(crate) identified: HashSet<ValueId>,
    pub(crate) locals: HashSet<ValueId>,
    pub(crate) underlying: HashMap<ValueId, ValueId>,
    pub(crate) defined_at: HashMap<ValueId, InstId>,
    pub(crate) uses: RefCell<HashMap<ValueId, Vec<PointerUse>>>,
    pub(crate) loop_entries: HashMap<InstId, InstId>,
    pub(crate) merges: HashMap<ValueId, Vec<ValueId>>,
}

impl TestProgram {
    /// Incoming values of a merge (phi-like) value, if `value` is one
    pub fn merge_inputs(&self, value: ValueId) -> Option<&[ValueId]> {
        self.merges.get(&value).map(|inputs| inputs.as_slice())
    }

    /// Drop an instruction from the program: its pointer uses disappear.
    /// Capture providers must be told separately via
    /// `on_instruction_removed`; that split is exactly what the
    /// invalidation tests exercise.
    pub fn remove_instruction(&self, inst: InstId) {
        for uses in self.uses.borrow_mut().values_mut() {
            uses.retain(|u| u.at() != inst);
        }
    }
}

impl ProgramInfo for TestProgram {
    fn dominance_order(&self, a: InstId, b: InstId) -> Ordering {
        a.cmp(&b)
    }

    fn block_of(&self, inst: InstId) -> BlockId {
        self.inst_block.get(&inst).copied().unwrap_or(0)
    }

    fn block_instructions(&self, block: BlockId) -> Vec<InstId> {
        self.blocks
            .get(block as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn call_arguments(&self, call: InstId) -> Vec<ValueId> {
        self.call_args.get(&call).cloned().unwrap_or_default()
    }

    fn memory_access(&self, inst: InstId) -> MemoryAccess {
        self.accesses
            .get(&inst)
            .copied()
            .unwrap_or(MemoryAccess::None)
    }

    fn underlying_object(&self, ptr: ValueId) -> ValueId {
        self.underlying.get(&ptr).copied().unwrap_or(ptr)
    }

    fn defining_instruction(&self, value: ValueId) -> Option<InstId> {
        self.defined_at.get(&value).copied()
    }

    fn is_identified_object(&self, value: ValueId) -> bool {
        self.identified.contains(&value)
    }

    fn is_function_local_object(&self, value: ValueId) -> bool {
        self.locals.contains(&value)
    }

    fn pointer_uses(&self, value: ValueId) -> Vec<PointerUse> {
        self.uses
            .borrow()
            .get(&value)
            .cloned()
            .unwrap_or_default()
    }

    fn loop_entry_before(&self, inst: InstId) -> Option<InstId> {
        self.loop_entries.get(&inst).copied()
    }
}

/// Locations of unknown extent, the common case in these tests
pub fn loc(base: ValueId) -> alias_modref::MemoryLocation {
    alias_modref::MemoryLocation::before_or_after(base)
}

/// Location with an exact extent
pub fn sized_loc(base: ValueId, size: u64) -> alias_modref::MemoryLocation {
    alias_modref::MemoryLocation::new(base, LocationSize::Exact(size))
}
