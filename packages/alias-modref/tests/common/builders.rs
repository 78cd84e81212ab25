//! Builder for synthetic test programs.

use super::fixtures::TestProgram;
use alias_modref::{InstId, LocationSize, MemoryAccess, PointerUse, ValueId};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Grows a [`TestProgram`] instruction by instruction. Instruction ids
/// are handed out in dominance order; `begin_loop`/`end_loop` bracket a
/// region whose instructions are attributed to the boundary instruction
/// created by `begin_loop`.
pub struct ProgramBuilder {
    blocks: Vec<Vec<InstId>>,
    inst_block: HashMap<InstId, u32>,
    accesses: HashMap<InstId, MemoryAccess>,
    call_args: HashMap<InstId, Vec<ValueId>>,
    identified: HashSet<ValueId>,
    locals: HashSet<ValueId>,
    underlying: HashMap<ValueId, ValueId>,
    defined_at: HashMap<ValueId, InstId>,
    uses: HashMap<ValueId, Vec<PointerUse>>,
    loop_entries: HashMap<InstId, InstId>,
    merges: HashMap<ValueId, Vec<ValueId>>,
    loop_stack: Vec<InstId>,
    next_value: ValueId,
    next_inst: InstId,
    current_block: u32,
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self {
            blocks: vec![Vec::new()],
            inst_block: HashMap::new(),
            accesses: HashMap::new(),
            call_args: HashMap::new(),
            identified: HashSet::new(),
            locals: HashSet::new(),
            underlying: HashMap::new(),
            defined_at: HashMap::new(),
            uses: HashMap::new(),
            loop_entries: HashMap::new(),
            merges: HashMap::new(),
            loop_stack: Vec::new(),
            next_value: 0,
            next_inst: 0,
            current_block: 0,
        }
    }

    fn fresh_inst(&mut self, access: MemoryAccess) -> InstId {
        let inst = self.next_inst;
        self.next_inst += 1;
        self.blocks[self.current_block as usize].push(inst);
        self.inst_block.insert(inst, self.current_block);
        self.accesses.insert(inst, access);
        if let Some(&entry) = self.loop_stack.first() {
            self.loop_entries.insert(inst, entry);
        }
        inst
    }

    fn fresh_value(&mut self) -> ValueId {
        let value = self.next_value;
        self.next_value += 1;
        value
    }

    /// Start a new basic block; subsequent instructions land in it
    pub fn begin_block(&mut self) -> u32 {
        self.blocks.push(Vec::new());
        self.current_block = (self.blocks.len() - 1) as u32;
        self.current_block
    }

    /// Non-memory instruction
    pub fn inst(&mut self) -> InstId {
        self.fresh_inst(MemoryAccess::None)
    }

    /// Local allocation: an identified, function-local object
    pub fn alloc(&mut self) -> ValueId {
        let value = self.fresh_value();
        let inst = self.fresh_inst(MemoryAccess::None);
        self.identified.insert(value);
        self.locals.insert(value);
        self.defined_at.insert(value, inst);
        value
    }

    /// Global object: identified but not function-local
    pub fn global(&mut self) -> ValueId {
        let value = self.fresh_value();
        self.identified.insert(value);
        value
    }

    /// Incoming parameter: opaque pointer, nothing identified about it
    pub fn param(&mut self) -> ValueId {
        self.fresh_value()
    }

    /// Pointer derived from `base` (offset computation, cast, …)
    pub fn derived(&mut self, base: ValueId) -> ValueId {
        let value = self.fresh_value();
        let inst = self.fresh_inst(MemoryAccess::None);
        let root = self.underlying.get(&base).copied().unwrap_or(base);
        self.underlying.insert(value, root);
        self.defined_at.insert(value, inst);
        self.uses.entry(base).or_default().push(PointerUse::Derive {
            at: inst,
            derived: value,
        });
        value
    }

    /// Merge (phi-like) value joining several incoming pointers
    pub fn merge(&mut self, inputs: &[ValueId]) -> ValueId {
        let value = self.fresh_value();
        let inst = self.fresh_inst(MemoryAccess::None);
        self.defined_at.insert(value, inst);
        self.merges.insert(value, inputs.to_vec());
        value
    }

    /// Rewire a merge's incoming values. Needed for mutually recursive
    /// merges, whose inputs only exist after both are created.
    pub fn set_merge_inputs(&mut self, merge: ValueId, inputs: &[ValueId]) {
        self.merges.insert(merge, inputs.to_vec());
    }

    pub fn load(&mut self, ptr: ValueId, size: LocationSize) -> InstId {
        let inst = self.fresh_inst(MemoryAccess::Load {
            ptr,
            size,
            ordered: false,
        });
        self.uses
            .entry(ptr)
            .or_default()
            .push(PointerUse::Read { at: inst });
        inst
    }

    pub fn ordered_load(&mut self, ptr: ValueId, size: LocationSize) -> InstId {
        let inst = self.fresh_inst(MemoryAccess::Load {
            ptr,
            size,
            ordered: true,
        });
        self.uses
            .entry(ptr)
            .or_default()
            .push(PointerUse::Read { at: inst });
        inst
    }

    pub fn store(&mut self, ptr: ValueId, size: LocationSize) -> InstId {
        let inst = self.fresh_inst(MemoryAccess::Store {
            ptr,
            size,
            ordered: false,
        });
        self.uses
            .entry(ptr)
            .or_default()
            .push(PointerUse::Read { at: inst });
        inst
    }

    pub fn barrier(&mut self) -> InstId {
        self.fresh_inst(MemoryAccess::Barrier)
    }

    /// Call site. Arguments are recorded but not treated as escapes;
    /// scenarios that want an argument to escape say so with `escape`.
    pub fn call(&mut self, args: &[ValueId]) -> InstId {
        let inst = self.fresh_inst(MemoryAccess::Call);
        self.call_args.insert(inst, args.to_vec());
        inst
    }

    /// Instruction that publishes `value` (stores it away, returns it, …)
    pub fn escape(&mut self, value: ValueId) -> InstId {
        let inst = self.fresh_inst(MemoryAccess::None);
        self.uses
            .entry(value)
            .or_default()
            .push(PointerUse::Escape { at: inst });
        inst
    }

    /// Open a loop; returns the boundary instruction dominating it
    pub fn begin_loop(&mut self) -> InstId {
        let entry = self.fresh_inst(MemoryAccess::None);
        self.loop_stack.push(entry);
        entry
    }

    pub fn end_loop(&mut self) {
        self.loop_stack.pop();
    }

    pub fn finish(self) -> Rc<TestProgram> {
        Rc::new(TestProgram {
            blocks: self.blocks,
            inst_block: self.inst_block,
            accesses: self.accesses,
            call_args: self.call_args,
            identified: self.identified,
            locals: self.locals,
            underlying: self.underlying,
            defined_at: self.defined_at,
            uses: RefCell::new(self.uses),
            loop_entries: self.loop_entries,
            merges: self.merges,
        })
    }
}
