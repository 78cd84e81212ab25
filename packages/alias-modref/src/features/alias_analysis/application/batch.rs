//! Batched query sessions.

use crate::features::alias_analysis::application::aggregator::AliasAggregator;
use crate::features::alias_analysis::domain::{
    AliasKind, AliasResult, FunctionModRefBehavior, MemoryLocation, ModRefInfo, QueryContext,
    QueryStats,
};
use crate::features::capture::ports::CaptureInfo;
use crate::shared::models::InstId;
use std::rc::Rc;

/// Read-only query interface reusing one [`QueryContext`] across many
/// independent queries.
///
/// Amortizes cache hits over a sequence of queries issued between two
/// fixed points in program time. Correctness precondition, not enforced:
/// the program representation must not change during the session.
/// Violating it yields silently stale results. To leave batch mode,
/// drop the session or create a new one.
pub struct BatchSession<'a> {
    engine: &'a AliasAggregator,
    ctx: QueryContext,
}

impl<'a> BatchSession<'a> {
    /// Session backed by the default context-free capture provider
    pub fn new(engine: &'a AliasAggregator) -> Self {
        Self {
            ctx: engine.fresh_context(),
            engine,
        }
    }

    /// Session consulting a caller-owned capture provider
    pub fn with_capture_info(engine: &'a AliasAggregator, capture: Rc<dyn CaptureInfo>) -> Self {
        Self {
            ctx: QueryContext::new(capture),
            engine,
        }
    }

    pub fn alias(&mut self, loc_a: &MemoryLocation, loc_b: &MemoryLocation) -> AliasResult {
        self.engine.alias_in(loc_a, loc_b, &mut self.ctx)
    }

    pub fn is_no_alias(&mut self, loc_a: &MemoryLocation, loc_b: &MemoryLocation) -> bool {
        self.alias(loc_a, loc_b).kind() == AliasKind::NoAlias
    }

    pub fn is_must_alias(&mut self, loc_a: &MemoryLocation, loc_b: &MemoryLocation) -> bool {
        self.alias(loc_a, loc_b).kind() == AliasKind::MustAlias
    }

    pub fn points_to_constant_memory(&mut self, loc: &MemoryLocation, or_local: bool) -> bool {
        self.engine
            .points_to_constant_memory_in(loc, &mut self.ctx, or_local)
    }

    pub fn arg_mod_ref_info(&self, call: InstId, arg_idx: usize) -> ModRefInfo {
        self.engine.arg_mod_ref_info(call, arg_idx)
    }

    pub fn call_mod_ref_behavior(&self, call: InstId) -> FunctionModRefBehavior {
        self.engine.call_mod_ref_behavior(call)
    }

    pub fn mod_ref_info_call_loc(&mut self, call: InstId, loc: &MemoryLocation) -> ModRefInfo {
        self.engine.mod_ref_info_call_loc_in(call, loc, &mut self.ctx)
    }

    pub fn mod_ref_info_call_pair(&mut self, call_a: InstId, call_b: InstId) -> ModRefInfo {
        self.engine
            .mod_ref_info_call_pair_in(call_a, call_b, &mut self.ctx)
    }

    pub fn mod_ref_info(&mut self, inst: InstId, loc: Option<&MemoryLocation>) -> ModRefInfo {
        self.engine.mod_ref_info_in(inst, loc, &mut self.ctx)
    }

    pub fn mod_ref_info_inst_call(&mut self, inst: InstId, call: InstId) -> ModRefInfo {
        self.engine.mod_ref_info_inst_call_in(inst, call, &mut self.ctx)
    }

    pub fn call_captures_before(&mut self, call: InstId, loc: &MemoryLocation) -> ModRefInfo {
        self.engine.call_captures_before_in(call, loc, &mut self.ctx)
    }

    /// Counters accumulated by this session's context
    pub fn stats(&self) -> &QueryStats {
        &self.ctx.stats
    }

    /// Number of memoized pairs held by the session
    pub fn cached_results(&self) -> usize {
        self.ctx.cached_results()
    }
}
