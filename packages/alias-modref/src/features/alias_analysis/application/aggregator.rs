//! The aggregation and dispatch engine.
//!
//! An [`AliasAggregator`] owns an ordered list of analysis components and
//! answers every query by folding their answers into the most precise
//! sound result. Registration order is significant: it is both the
//! precision priority and the order in which answers are consulted.
//!
//! The engine also owns the assumption-based alias cache: its `alias`
//! path seeds, confirms, and purges speculative entries, so any component
//! that recurses back through its [`AggregationLink`] automatically
//! participates in cycle breaking.

use crate::features::alias_analysis::application::batch::BatchSession;
use crate::features::alias_analysis::domain::{
    normalized_pair, AliasKind, AliasResult, CacheEntry, FunctionModRefBehavior, MemoryLocation,
    ModRefInfo, QueryContext, DEFINITIVE,
};
use crate::features::alias_analysis::ports::{AggregationLink, AliasAnalysisComponent};
use crate::features::capture::infrastructure::FunctionCaptureInfo;
use crate::shared::models::{BlockId, FunctionId, InstId, MemoryAccess, ValueId};
use crate::shared::ports::ProgramInfo;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

/// Key identifying what a registered component's results depend on.
///
/// Recorded at registration purely so the aggregate can report itself
/// stale when the host invalidates one of its parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvalidationKey(String);

impl InvalidationKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InvalidationKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for InvalidationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builder collecting components before the aggregate is frozen.
///
/// Components are registered in priority order; `build` attaches each one
/// to the finished aggregate and returns it inside an `Rc`, immutable from
/// then on.
pub struct AliasAggregatorBuilder {
    ir: Rc<dyn ProgramInfo>,
    components: Vec<Box<dyn AliasAnalysisComponent>>,
    dependency_keys: Vec<InvalidationKey>,
}

impl AliasAggregatorBuilder {
    pub fn new(ir: Rc<dyn ProgramInfo>) -> Self {
        Self {
            ir,
            components: Vec::new(),
            dependency_keys: Vec::new(),
        }
    }

    /// Append a component, with the invalidation key its results depend on
    pub fn register(
        mut self,
        component: Box<dyn AliasAnalysisComponent>,
        key: InvalidationKey,
    ) -> Self {
        self.components.push(component);
        self.dependency_keys.push(key);
        self
    }

    pub fn build(self) -> Rc<AliasAggregator> {
        let AliasAggregatorBuilder {
            ir,
            mut components,
            dependency_keys,
        } = self;
        Rc::new_cyclic(|handle| {
            for component in components.iter_mut() {
                component.attach(AggregationLink::Aggregated(handle.clone()));
            }
            AliasAggregator {
                ir,
                components,
                dependency_keys,
            }
        })
    }
}

/// Aggregated alias and mod-ref query interface over registered
/// components.
///
/// One aggregator is built per analyzed function and lives for that
/// function's analysis lifetime. It is single-threaded; independent
/// aggregators over independent functions share nothing.
pub struct AliasAggregator {
    ir: Rc<dyn ProgramInfo>,
    components: Vec<Box<dyn AliasAnalysisComponent>>,
    dependency_keys: Vec<InvalidationKey>,
}

impl fmt::Debug for AliasAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AliasAggregator")
            .field("component_count", &self.components.len())
            .field("dependency_keys", &self.dependency_keys)
            .finish_non_exhaustive()
    }
}

impl AliasAggregator {
    /// Program view this aggregator reads
    pub fn program(&self) -> &Rc<dyn ProgramInfo> {
        &self.ir
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn dependency_keys(&self) -> &[InvalidationKey] {
        &self.dependency_keys
    }

    /// Whether any registered component's key is in the change set. A
    /// `true` answer means the host must discard and rebuild the
    /// aggregate.
    pub fn invalidate(&self, changed: &FxHashSet<InvalidationKey>) -> bool {
        let stale = self.dependency_keys.iter().any(|key| changed.contains(key));
        if stale {
            debug!("aggregate invalidated by component dependency change");
        }
        stale
    }

    /// Context for one root query, backed by the context-free capture
    /// provider.
    pub fn fresh_context(&self) -> QueryContext {
        QueryContext::new(Rc::new(FunctionCaptureInfo::new(Rc::clone(&self.ir))))
    }

    // ------------------------------------------------------------------
    // Alias queries
    // ------------------------------------------------------------------

    pub fn alias(&self, loc_a: &MemoryLocation, loc_b: &MemoryLocation) -> AliasResult {
        let mut ctx = self.fresh_context();
        self.alias_in(loc_a, loc_b, &mut ctx)
    }

    /// The main alias entry point: cache-protocol wrapper around the
    /// component dispatch. Recursive sub-queries on the same pair observe
    /// the optimistic seed instead of diverging.
    pub fn alias_in(
        &self,
        loc_a: &MemoryLocation,
        loc_b: &MemoryLocation,
        ctx: &mut QueryContext,
    ) -> AliasResult {
        ctx.stats.alias_queries += 1;

        // Distinct identified objects never overlap, at any size.
        if loc_a.base != loc_b.base
            && self.ir.is_identified_object(loc_a.base)
            && self.ir.is_identified_object(loc_b.base)
        {
            return AliasResult::no_alias();
        }

        let (key, swapped) = normalized_pair(loc_a, loc_b);

        if let Some(entry) = ctx.cache.get_mut(&key) {
            ctx.stats.cache_hits += 1;
            if !entry.is_definitive() {
                entry.assumption_uses += 1;
                ctx.assumption_uses += 1;
                ctx.stats.speculative_hits += 1;
            }
            return entry.result.swapped_if(swapped);
        }

        // Seed the in-flight pair optimistically so the recursive arm of a
        // cyclic value sees a definite answer.
        ctx.cache.insert(
            key,
            CacheEntry {
                result: AliasResult::no_alias(),
                assumption_uses: 0,
            },
        );
        let orig_assumption_uses = ctx.assumption_uses;
        let orig_assumption_based = ctx.assumption_based.len();

        let mut result = AliasResult::may_alias();
        for component in &self.components {
            let answer = component.alias(loc_a, loc_b, ctx);
            if answer.kind().precision() > result.kind().precision() {
                result = answer;
            }
            if result.kind() == AliasKind::NoAlias {
                break;
            }
        }

        let entry = ctx
            .cache
            .get_mut(&key)
            .expect("in-flight alias pair must stay cached");
        let speculative_uses = entry.assumption_uses;
        let disproven = speculative_uses > 0 && result.kind() != AliasKind::NoAlias;
        if disproven {
            // Results that consumed the seed are built on a false premise;
            // so is this one, in the general case.
            result = AliasResult::may_alias();
        }
        entry.result = result.swapped_if(swapped);
        entry.assumption_uses = DEFINITIVE;

        ctx.assumption_uses -= speculative_uses;
        if disproven {
            ctx.stats.assumptions_disproven += 1;
            let purged = ctx.assumption_based.len() - orig_assumption_based;
            while ctx.assumption_based.len() > orig_assumption_based {
                if let Some(stale) = ctx.assumption_based.pop() {
                    ctx.cache.remove(&stale);
                    ctx.stats.entries_purged += 1;
                }
            }
            trace!(purged, "purged results derived from a disproven assumption");
        }

        // Still derived from assumptions further up the chain: remember the
        // pair so those can purge it in turn.
        if orig_assumption_uses != ctx.assumption_uses && result.kind() != AliasKind::MayAlias {
            ctx.assumption_based.push(key);
        }
        result
    }

    pub fn is_no_alias(&self, loc_a: &MemoryLocation, loc_b: &MemoryLocation) -> bool {
        self.alias(loc_a, loc_b).kind() == AliasKind::NoAlias
    }

    pub fn is_must_alias(&self, loc_a: &MemoryLocation, loc_b: &MemoryLocation) -> bool {
        self.alias(loc_a, loc_b).kind() == AliasKind::MustAlias
    }

    pub fn points_to_constant_memory(&self, loc: &MemoryLocation, or_local: bool) -> bool {
        let mut ctx = self.fresh_context();
        self.points_to_constant_memory_in(loc, &mut ctx, or_local)
    }

    pub fn points_to_constant_memory_in(
        &self,
        loc: &MemoryLocation,
        ctx: &mut QueryContext,
        or_local: bool,
    ) -> bool {
        self.components
            .iter()
            .any(|component| component.points_to_constant_memory(loc, ctx, or_local))
    }

    // ------------------------------------------------------------------
    // Mod-ref queries
    // ------------------------------------------------------------------

    pub fn arg_mod_ref_info(&self, call: InstId, arg_idx: usize) -> ModRefInfo {
        let mut result = ModRefInfo::MOD_REF;
        for component in &self.components {
            result &= component.arg_mod_ref_info(call, arg_idx);
            if result.is_no_mod_ref() {
                break;
            }
        }
        result
    }

    pub fn call_mod_ref_behavior(&self, call: InstId) -> FunctionModRefBehavior {
        let mut result = FunctionModRefBehavior::unknown();
        for component in &self.components {
            result &= component.call_mod_ref_behavior(call);
            if result.does_not_access_memory() {
                break;
            }
        }
        result
    }

    pub fn function_mod_ref_behavior(&self, function: FunctionId) -> FunctionModRefBehavior {
        let mut result = FunctionModRefBehavior::unknown();
        for component in &self.components {
            result &= component.function_mod_ref_behavior(function);
            if result.does_not_access_memory() {
                break;
            }
        }
        result
    }

    pub fn does_not_access_memory(&self, call: InstId) -> bool {
        self.call_mod_ref_behavior(call).does_not_access_memory()
    }

    pub fn only_reads_memory(&self, call: InstId) -> bool {
        self.call_mod_ref_behavior(call).only_reads_memory()
    }

    pub fn function_does_not_access_memory(&self, function: FunctionId) -> bool {
        self.function_mod_ref_behavior(function)
            .does_not_access_memory()
    }

    pub fn function_only_reads_memory(&self, function: FunctionId) -> bool {
        self.function_mod_ref_behavior(function).only_reads_memory()
    }

    pub fn mod_ref_info_call_loc(&self, call: InstId, loc: &MemoryLocation) -> ModRefInfo {
        let mut ctx = self.fresh_context();
        self.mod_ref_info_call_loc_in(call, loc, &mut ctx)
    }

    /// Mod-ref of a call on a location: component dispatch, then
    /// refinement through the aggregate's own behavior, argument, capture
    /// and constant-memory knowledge.
    pub fn mod_ref_info_call_loc_in(
        &self,
        call: InstId,
        loc: &MemoryLocation,
        ctx: &mut QueryContext,
    ) -> ModRefInfo {
        let mut result = ModRefInfo::MOD_REF;
        for component in &self.components {
            result &= component.mod_ref_info_call_loc(call, loc, ctx);
            if result.is_no_mod_ref() {
                return result;
            }
        }

        let behavior = self.call_mod_ref_behavior(call);
        if behavior.does_not_access_memory() {
            return ModRefInfo::NO_MOD_REF;
        }
        if behavior.only_reads_memory() {
            result &= ModRefInfo::REF;
        } else if behavior.only_writes_memory() {
            result &= ModRefInfo::MOD;
        }

        if behavior.only_accesses_arg_pointees() || behavior.only_accesses_inaccessible_or_arg_mem()
        {
            let mut all_args_mask = ModRefInfo::NO_MOD_REF;
            if behavior.does_access_arg_pointees() {
                for (arg_idx, arg) in self.ir.call_arguments(call).into_iter().enumerate() {
                    let arg_loc = MemoryLocation::before_or_after(arg);
                    if self.alias_in(&arg_loc, loc, ctx).aliases() {
                        all_args_mask |= self.arg_mod_ref_info(call, arg_idx);
                    }
                }
            }
            if all_args_mask.is_no_mod_ref() {
                return ModRefInfo::NO_MOD_REF;
            }
            result &= all_args_mask;
        }

        // A function-local object that has not escaped by the call can
        // only be reached through the call's own pointer arguments.
        let object = self.ir.underlying_object(loc.base);
        if self.ir.is_function_local_object(object)
            && self.ir.defining_instruction(object) != Some(call)
            && ctx.capture.is_not_captured_before_or_at(object, call)
        {
            result &= self.mod_ref_through_arguments(call, object, ctx);
            if result.is_no_mod_ref() {
                return result;
            }
        }

        // Constant memory can be read but never modified.
        if result.is_mod_set() && self.points_to_constant_memory_in(loc, ctx, false) {
            result &= ModRefInfo::REF;
        }
        result
    }

    /// Union of the call's per-argument effects over arguments that may
    /// alias `object`.
    fn mod_ref_through_arguments(
        &self,
        call: InstId,
        object: ValueId,
        ctx: &mut QueryContext,
    ) -> ModRefInfo {
        let object_loc = MemoryLocation::before_or_after(object);
        let mut result = ModRefInfo::NO_MOD_REF;
        for (arg_idx, arg) in self.ir.call_arguments(call).into_iter().enumerate() {
            let arg_loc = MemoryLocation::before_or_after(arg);
            if !self.alias_in(&arg_loc, &object_loc, ctx).aliases() {
                continue;
            }
            result |= self.arg_mod_ref_info(call, arg_idx);
            if result.is_mod_and_ref_set() {
                break;
            }
        }
        result
    }

    pub fn mod_ref_info_call_pair(&self, call_a: InstId, call_b: InstId) -> ModRefInfo {
        let mut ctx = self.fresh_context();
        self.mod_ref_info_call_pair_in(call_a, call_b, &mut ctx)
    }

    /// Mod-ref of `call_a` on the memory `call_b` may access.
    pub fn mod_ref_info_call_pair_in(
        &self,
        call_a: InstId,
        call_b: InstId,
        ctx: &mut QueryContext,
    ) -> ModRefInfo {
        let mut result = ModRefInfo::MOD_REF;
        for component in &self.components {
            result &= component.mod_ref_info_call_pair(call_a, call_b, ctx);
            if result.is_no_mod_ref() {
                return result;
            }
        }

        let behavior_a = self.call_mod_ref_behavior(call_a);
        if behavior_a.does_not_access_memory() {
            return ModRefInfo::NO_MOD_REF;
        }
        let behavior_b = self.call_mod_ref_behavior(call_b);
        if behavior_b.does_not_access_memory() {
            return ModRefInfo::NO_MOD_REF;
        }

        if behavior_a.only_reads_memory() && behavior_b.only_reads_memory() {
            return ModRefInfo::NO_MOD_REF;
        }
        if behavior_a.only_reads_memory() {
            result &= ModRefInfo::REF;
        } else if behavior_a.only_writes_memory() {
            result &= ModRefInfo::MOD;
        }

        // When one side only touches its argument pointees, the pairwise
        // answer is the union over those pointees of the other side's
        // effect on them.
        if behavior_b.only_accesses_arg_pointees() {
            if !behavior_b.does_access_arg_pointees() {
                return ModRefInfo::NO_MOD_REF;
            }
            let mut refined = ModRefInfo::NO_MOD_REF;
            for (arg_idx, arg) in self.ir.call_arguments(call_b).into_iter().enumerate() {
                let arg_loc = MemoryLocation::before_or_after(arg);
                // If call_b writes the pointee, any access by call_a
                // matters; if it only reads, only a write by call_a does.
                let arg_behavior = self.arg_mod_ref_info(call_b, arg_idx);
                let mut arg_mask = ModRefInfo::NO_MOD_REF;
                if arg_behavior.is_mod_set() {
                    arg_mask = ModRefInfo::MOD_REF;
                } else if arg_behavior.is_ref_set() {
                    arg_mask = ModRefInfo::MOD;
                }
                arg_mask &= self.mod_ref_info_call_loc_in(call_a, &arg_loc, ctx);
                refined = (refined | arg_mask) & result;
                if refined == result {
                    break;
                }
            }
            return refined;
        }

        if behavior_a.only_accesses_arg_pointees() {
            if !behavior_a.does_access_arg_pointees() {
                return ModRefInfo::NO_MOD_REF;
            }
            let mut refined = ModRefInfo::NO_MOD_REF;
            for (arg_idx, arg) in self.ir.call_arguments(call_a).into_iter().enumerate() {
                let arg_loc = MemoryLocation::before_or_after(arg);
                let arg_behavior = self.arg_mod_ref_info(call_a, arg_idx);
                let other = self.mod_ref_info_call_loc_in(call_b, &arg_loc, ctx);
                if (arg_behavior.is_mod_set() && other.is_mod_or_ref_set())
                    || (arg_behavior.is_ref_set() && other.is_mod_set())
                {
                    refined = (refined | arg_behavior) & result;
                }
                if refined == result {
                    break;
                }
            }
            return refined;
        }
        result
    }

    pub fn mod_ref_info(&self, inst: InstId, loc: Option<&MemoryLocation>) -> ModRefInfo {
        let mut ctx = self.fresh_context();
        self.mod_ref_info_in(inst, loc, &mut ctx)
    }

    /// Mod-ref of any instruction on an optional location; with no
    /// location, answers whether the instruction accesses memory at all.
    pub fn mod_ref_info_in(
        &self,
        inst: InstId,
        loc: Option<&MemoryLocation>,
        ctx: &mut QueryContext,
    ) -> ModRefInfo {
        match self.ir.memory_access(inst) {
            MemoryAccess::Load { ptr, size, ordered } => {
                if ordered {
                    return ModRefInfo::MOD_REF;
                }
                if let Some(loc) = loc {
                    let load_loc = MemoryLocation::new(ptr, size);
                    if !self.alias_in(&load_loc, loc, ctx).aliases() {
                        return ModRefInfo::NO_MOD_REF;
                    }
                }
                ModRefInfo::REF
            }
            MemoryAccess::Store { ptr, size, ordered } => {
                if ordered {
                    return ModRefInfo::MOD_REF;
                }
                if let Some(loc) = loc {
                    let store_loc = MemoryLocation::new(ptr, size);
                    if !self.alias_in(&store_loc, loc, ctx).aliases() {
                        return ModRefInfo::NO_MOD_REF;
                    }
                    // A store cannot modify constant memory.
                    if self.points_to_constant_memory_in(loc, ctx, false) {
                        return ModRefInfo::NO_MOD_REF;
                    }
                }
                ModRefInfo::MOD
            }
            MemoryAccess::Call => match loc {
                Some(loc) => self.mod_ref_info_call_loc_in(inst, loc, ctx),
                None => self.call_mod_ref_behavior(inst).combined_mod_ref(),
            },
            MemoryAccess::Barrier => ModRefInfo::MOD_REF,
            MemoryAccess::None => ModRefInfo::NO_MOD_REF,
        }
    }

    pub fn mod_ref_info_inst_call(&self, inst: InstId, call: InstId) -> ModRefInfo {
        let mut ctx = self.fresh_context();
        self.mod_ref_info_inst_call_in(inst, call, &mut ctx)
    }

    /// Whether an instruction and a call may touch the same memory.
    pub fn mod_ref_info_inst_call_in(
        &self,
        inst: InstId,
        call: InstId,
        ctx: &mut QueryContext,
    ) -> ModRefInfo {
        match self.ir.memory_access(inst) {
            MemoryAccess::Call => self.mod_ref_info_call_pair_in(inst, call, ctx),
            MemoryAccess::Barrier => ModRefInfo::MOD_REF,
            MemoryAccess::Load { ptr, size, .. } | MemoryAccess::Store { ptr, size, .. } => {
                let accessed = MemoryLocation::new(ptr, size);
                if self
                    .mod_ref_info_call_loc_in(call, &accessed, ctx)
                    .is_mod_or_ref_set()
                {
                    ModRefInfo::MOD_REF
                } else {
                    ModRefInfo::NO_MOD_REF
                }
            }
            MemoryAccess::None => ModRefInfo::NO_MOD_REF,
        }
    }

    pub fn call_captures_before(&self, call: InstId, loc: &MemoryLocation) -> ModRefInfo {
        let mut ctx = self.fresh_context();
        self.call_captures_before_in(call, loc, &mut ctx)
    }

    /// Mod-ref of a call on a location whose underlying object is a
    /// function-local that has not escaped by the call: only the call's
    /// own arguments can reach it.
    pub fn call_captures_before_in(
        &self,
        call: InstId,
        loc: &MemoryLocation,
        ctx: &mut QueryContext,
    ) -> ModRefInfo {
        let object = self.ir.underlying_object(loc.base);
        if !self.ir.is_function_local_object(object) {
            return ModRefInfo::MOD_REF;
        }
        if !matches!(self.ir.memory_access(call), MemoryAccess::Call) {
            return ModRefInfo::MOD_REF;
        }
        if self.ir.defining_instruction(object) == Some(call) {
            return ModRefInfo::MOD_REF;
        }
        if !ctx.capture.is_not_captured_before_or_at(object, call) {
            return ModRefInfo::MOD_REF;
        }

        let result = self.mod_ref_through_arguments(call, object, ctx);
        if result.is_mod_and_ref_set() {
            ModRefInfo::MOD_REF
        } else {
            result
        }
    }

    // ------------------------------------------------------------------
    // Higher level helpers
    // ------------------------------------------------------------------

    /// Whether executing the block could modify the location
    pub fn can_block_modify(&self, block: BlockId, loc: &MemoryLocation) -> bool {
        let insts = self.ir.block_instructions(block);
        match (insts.first(), insts.last()) {
            (Some(&first), Some(&last)) => {
                self.can_instruction_range_mod_ref(first, last, loc, ModRefInfo::MOD)
            }
            _ => false,
        }
    }

    /// Whether any instruction in `[first, last]` (inclusive, same block)
    /// could mod/ref the location according to `mode`.
    pub fn can_instruction_range_mod_ref(
        &self,
        first: InstId,
        last: InstId,
        loc: &MemoryLocation,
        mode: ModRefInfo,
    ) -> bool {
        debug_assert_eq!(
            self.ir.block_of(first),
            self.ir.block_of(last),
            "range endpoints must share a block"
        );
        let block = self.ir.block_of(first);
        let mut session = BatchSession::new(self);
        for inst in self.ir.block_instructions(block) {
            if self.ir.dominance_order(inst, first) == Ordering::Less {
                continue;
            }
            if session.mod_ref_info(inst, Some(loc)).intersects(mode) {
                return true;
            }
            if inst == last {
                break;
            }
        }
        false
    }
}
