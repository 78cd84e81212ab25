//! Port implemented by pluggable alias-analysis components.
//!
//! Every method has a conservative default, so a component implements only
//! the queries it can actually improve; anything else degrades to the
//! least precise lattice value instead of erroring.

use crate::features::alias_analysis::application::aggregator::AliasAggregator;
use crate::features::alias_analysis::domain::{
    AliasResult, FunctionModRefBehavior, MemoryLocation, ModRefInfo, QueryContext,
};
use crate::shared::models::{FunctionId, InstId};
use std::rc::{Rc, Weak};

/// Back-reference from a component to the aggregate it is registered in.
///
/// Decided once at registration and never mutated afterwards. A component
/// that needs an auxiliary sub-query ("does anything else alias this?")
/// routes it through [`aggregate`](Self::aggregate) so every registered
/// component contributes; standalone components answer from themselves
/// alone, with conservative defaults for what they cannot resolve.
#[derive(Debug, Clone, Default)]
pub enum AggregationLink {
    #[default]
    Standalone,
    Aggregated(Weak<AliasAggregator>),
}

impl AggregationLink {
    /// The owning aggregate, when one is attached and still alive
    pub fn aggregate(&self) -> Option<Rc<AliasAggregator>> {
        match self {
            AggregationLink::Standalone => None,
            AggregationLink::Aggregated(weak) => weak.upgrade(),
        }
    }

    #[inline]
    pub fn is_aggregated(&self) -> bool {
        matches!(self, AggregationLink::Aggregated(_))
    }
}

/// Capability contract satisfied by every registered analysis component.
///
/// The default bodies are the maximally conservative answers; a concrete
/// component overrides the subset it can sharpen and may explicitly
/// delegate the rest here.
pub trait AliasAnalysisComponent {
    /// Called exactly once when the component is registered into an
    /// aggregate, handing it the back-reference for proxied sub-queries.
    fn attach(&mut self, link: AggregationLink) {
        let _ = link;
    }

    /// May the two references designate overlapping storage?
    fn alias(
        &self,
        loc_a: &MemoryLocation,
        loc_b: &MemoryLocation,
        ctx: &mut QueryContext,
    ) -> AliasResult {
        let _ = (loc_a, loc_b, ctx);
        AliasResult::may_alias()
    }

    /// Does the location point to constant memory (or, with `or_local`,
    /// to a function-local allocation)?
    fn points_to_constant_memory(
        &self,
        loc: &MemoryLocation,
        ctx: &mut QueryContext,
        or_local: bool,
    ) -> bool {
        let _ = (loc, ctx, or_local);
        false
    }

    /// Per-argument mod-ref of a call on its own pointer argument
    fn arg_mod_ref_info(&self, call: InstId, arg_idx: usize) -> ModRefInfo {
        let _ = (call, arg_idx);
        ModRefInfo::MOD_REF
    }

    /// Memory behavior of a call site
    fn call_mod_ref_behavior(&self, call: InstId) -> FunctionModRefBehavior {
        let _ = call;
        FunctionModRefBehavior::unknown()
    }

    /// Memory behavior of a function, independent of any call site
    fn function_mod_ref_behavior(&self, function: FunctionId) -> FunctionModRefBehavior {
        let _ = function;
        FunctionModRefBehavior::unknown()
    }

    /// Mod-ref of a call site on a memory location
    fn mod_ref_info_call_loc(
        &self,
        call: InstId,
        loc: &MemoryLocation,
        ctx: &mut QueryContext,
    ) -> ModRefInfo {
        let _ = (call, loc, ctx);
        ModRefInfo::MOD_REF
    }

    /// Mod-ref of one call site on the memory another may access
    fn mod_ref_info_call_pair(
        &self,
        call_a: InstId,
        call_b: InstId,
        ctx: &mut QueryContext,
    ) -> ModRefInfo {
        let _ = (call_a, call_b, ctx);
        ModRefInfo::MOD_REF
    }
}
