//! Program-representation capability consumed by the engine.
//!
//! The aggregation engine and the capture providers never own or mutate the
//! program under analysis. Everything they need is read through this trait:
//! identities, dominance structure, call argument operands, pointer uses,
//! and loop boundaries. Hosts implement it over their own IR.

use crate::shared::models::{BlockId, InstId, MemoryAccess, PointerUse, ValueId};
use std::cmp::Ordering;

/// Read-only view of one function's representation.
///
/// Dominance comparisons are only meaningful between instructions of the
/// same function; crossing functions is a caller contract violation.
pub trait ProgramInfo {
    /// Total order consistent with dominance: `Less` means `a` is executed
    /// before `b` on every path reaching `b`.
    fn dominance_order(&self, a: InstId, b: InstId) -> Ordering;

    /// Basic block containing the instruction
    fn block_of(&self, inst: InstId) -> BlockId;

    /// Instructions of a block, in dominance order
    fn block_instructions(&self, block: BlockId) -> Vec<InstId>;

    /// Argument operands of a call site, in call order
    fn call_arguments(&self, call: InstId) -> Vec<ValueId>;

    /// Memory access shape of the instruction
    fn memory_access(&self, inst: InstId) -> MemoryAccess;

    /// Base object a pointer is derived from (the value itself when no
    /// deriving chain is known)
    fn underlying_object(&self, ptr: ValueId) -> ValueId;

    /// Instruction that produced the value, when it has one
    fn defining_instruction(&self, value: ValueId) -> Option<InstId>;

    /// Whether the value is a distinct identifiable object (allocation,
    /// global, …); two distinct identified objects never overlap
    fn is_identified_object(&self, value: ValueId) -> bool;

    /// Whether the value is an identified object local to the function
    /// (stack slot, non-aliased allocation)
    fn is_function_local_object(&self, value: ValueId) -> bool;

    /// All uses of a pointer value, for capture tracking
    fn pointer_uses(&self, value: ValueId) -> Vec<PointerUse>;

    /// When `inst` sits inside a loop: the last point dominating the
    /// outermost enclosing loop. `None` for straight-line code.
    fn loop_entry_before(&self, inst: InstId) -> Option<InstId>;

    /// Whether `a` strictly precedes `b` in dominance order
    fn comes_before(&self, a: InstId, b: InstId) -> bool {
        self.dominance_order(a, b) == Ordering::Less
    }
}
