/*
 * alias-modref - Aggregation and query-caching engine for alias/mod-ref
 * analysis
 *
 * Feature-First Hexagonal Architecture:
 * - shared/   : Opaque program ids and the program-view capability
 * - features/ : Vertical slices (alias_analysis, capture)
 *
 * Given two memory references (or a call site and a reference), the engine
 * answers "may these conflict?" by consulting an ordered set of pluggable
 * analysis components and combining their answers into the most precise
 * sound result, while caching results per root query and breaking cycles
 * through program structure with speculative assumptions.
 */

pub mod errors;
pub mod features;
pub mod shared;

pub use errors::{AliasModRefError, Result};

pub use features::alias_analysis::{
    AggregationLink, AliasAggregator, AliasAggregatorBuilder, AliasAnalysisComponent, AliasKind,
    AliasResult, BatchSession, ComponentFactory, ComponentRegistry, ConservativeAliasAnalysis,
    FunctionModRefBehavior, InvalidationKey, LocationClass, MemoryLocation, ModRefInfo,
    QueryContext, QueryStats,
};
pub use features::capture::{CaptureInfo, EarliestEscapeInfo, FunctionCaptureInfo};

pub use shared::models::{
    BlockId, FunctionId, InstId, LocationSize, MemoryAccess, PointerUse, TypeTag, ValueId,
};
pub use shared::ports::ProgramInfo;
