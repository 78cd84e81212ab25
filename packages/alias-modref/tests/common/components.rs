//! Test doubles implementing the component port.

use super::fixtures::TestProgram;
use alias_modref::{
    AggregationLink, AliasAnalysisComponent, AliasKind, AliasResult, FunctionId,
    FunctionModRefBehavior, InstId, MemoryLocation, ModRefInfo, QueryContext, ValueId,
};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Shared record of the (base, base) pairs a component was asked about.
/// Tests clone the handle before registering the component, since the
/// aggregate takes ownership of the component itself.
pub type QueryLog = Rc<RefCell<Vec<(ValueId, ValueId)>>>;

/// Counts how often the log contains the unordered pair
pub fn pair_queries(log: &QueryLog, a: ValueId, b: ValueId) -> usize {
    log.borrow()
        .iter()
        .filter(|(x, y)| (*x == a && *y == b) || (*x == b && *y == a))
        .count()
}

/// Component answering from a fixed script, conservative for everything
/// not scripted.
#[derive(Default)]
pub struct ScriptedAliasAnalysis {
    answers: HashMap<(ValueId, ValueId), AliasResult>,
    constants: HashSet<ValueId>,
    call_behaviors: HashMap<InstId, FunctionModRefBehavior>,
    function_behaviors: HashMap<FunctionId, FunctionModRefBehavior>,
    arg_mod_refs: HashMap<(InstId, usize), ModRefInfo>,
    log: QueryLog,
}

impl ScriptedAliasAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script an alias answer for the unordered pair. The result is
    /// stored against `(a, b)` as given; queries in the other orientation
    /// see it swapped.
    pub fn with_alias(mut self, a: ValueId, b: ValueId, result: AliasResult) -> Self {
        if a <= b {
            self.answers.insert((a, b), result);
        } else {
            self.answers.insert((b, a), result.swapped());
        }
        self
    }

    pub fn with_constant_memory(mut self, base: ValueId) -> Self {
        self.constants.insert(base);
        self
    }

    pub fn with_call_behavior(mut self, call: InstId, behavior: FunctionModRefBehavior) -> Self {
        self.call_behaviors.insert(call, behavior);
        self
    }

    pub fn with_function_behavior(
        mut self,
        function: FunctionId,
        behavior: FunctionModRefBehavior,
    ) -> Self {
        self.function_behaviors.insert(function, behavior);
        self
    }

    pub fn with_arg_mod_ref(mut self, call: InstId, arg_idx: usize, mr: ModRefInfo) -> Self {
        self.arg_mod_refs.insert((call, arg_idx), mr);
        self
    }

    pub fn log_handle(&self) -> QueryLog {
        Rc::clone(&self.log)
    }
}

impl AliasAnalysisComponent for ScriptedAliasAnalysis {
    fn alias(
        &self,
        loc_a: &MemoryLocation,
        loc_b: &MemoryLocation,
        _ctx: &mut QueryContext,
    ) -> AliasResult {
        self.log.borrow_mut().push((loc_a.base, loc_b.base));
        let (x, y, swapped) = if loc_a.base <= loc_b.base {
            (loc_a.base, loc_b.base, false)
        } else {
            (loc_b.base, loc_a.base, true)
        };
        match self.answers.get(&(x, y)) {
            Some(result) if swapped => result.swapped(),
            Some(result) => *result,
            None => AliasResult::may_alias(),
        }
    }

    fn points_to_constant_memory(
        &self,
        loc: &MemoryLocation,
        _ctx: &mut QueryContext,
        _or_local: bool,
    ) -> bool {
        self.constants.contains(&loc.base)
    }

    fn arg_mod_ref_info(&self, call: InstId, arg_idx: usize) -> ModRefInfo {
        self.arg_mod_refs
            .get(&(call, arg_idx))
            .copied()
            .unwrap_or(ModRefInfo::MOD_REF)
    }

    fn call_mod_ref_behavior(&self, call: InstId) -> FunctionModRefBehavior {
        self.call_behaviors
            .get(&call)
            .copied()
            .unwrap_or_else(FunctionModRefBehavior::unknown)
    }

    fn function_mod_ref_behavior(&self, function: FunctionId) -> FunctionModRefBehavior {
        self.function_behaviors
            .get(&function)
            .copied()
            .unwrap_or_else(FunctionModRefBehavior::unknown)
    }
}

/// Component resolving merge (phi-like) values by folding the aggregate's
/// answers over their incoming pointers.
///
/// Recursing through the aggregation link is what drives the engine's
/// speculative cache: a merge whose inputs lead back to the merge itself
/// re-queries the in-flight pair.
pub struct MergeResolverAnalysis {
    program: Rc<TestProgram>,
    link: AggregationLink,
    log: QueryLog,
}

impl MergeResolverAnalysis {
    pub fn new(program: Rc<TestProgram>) -> Self {
        Self {
            program,
            link: AggregationLink::default(),
            log: QueryLog::default(),
        }
    }

    pub fn log_handle(&self) -> QueryLog {
        Rc::clone(&self.log)
    }
}

impl AliasAnalysisComponent for MergeResolverAnalysis {
    fn attach(&mut self, link: AggregationLink) {
        self.link = link;
    }

    fn alias(
        &self,
        loc_a: &MemoryLocation,
        loc_b: &MemoryLocation,
        ctx: &mut QueryContext,
    ) -> AliasResult {
        let (merge_loc, other_loc) = if self.program.merge_inputs(loc_a.base).is_some() {
            (loc_a, loc_b)
        } else if self.program.merge_inputs(loc_b.base).is_some() {
            (loc_b, loc_a)
        } else {
            return AliasResult::may_alias();
        };
        self.log.borrow_mut().push((merge_loc.base, other_loc.base));

        let Some(engine) = self.link.aggregate() else {
            // Standalone fallback: nothing else to consult.
            return AliasResult::may_alias();
        };

        let inputs: Vec<ValueId> = self
            .program
            .merge_inputs(merge_loc.base)
            .map(|inputs| inputs.to_vec())
            .unwrap_or_default();

        let mut combined: Option<AliasKind> = None;
        for input in inputs {
            let input_loc = MemoryLocation::new(input, merge_loc.size);
            let kind = engine.alias_in(&input_loc, other_loc, ctx).kind();
            combined = Some(match combined {
                None => kind,
                Some(previous) if previous == kind => previous,
                // Incoming edges disagree: nothing precise can be said.
                Some(_) => return AliasResult::may_alias(),
            });
        }
        combined.map(AliasResult::new).unwrap_or_else(AliasResult::may_alias)
    }
}
