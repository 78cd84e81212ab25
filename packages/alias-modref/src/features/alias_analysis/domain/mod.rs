//! Domain value objects and per-query state.

pub mod alias_result;
pub mod memory_location;
pub mod mod_ref;
pub mod query_context;

pub use alias_result::{AliasKind, AliasResult};
pub use memory_location::MemoryLocation;
pub use mod_ref::{FunctionModRefBehavior, LocationClass, ModRefInfo};
pub use query_context::{
    normalized_pair, CacheEntry, LocPair, QueryContext, QueryStats, ReducedLocation,
};

pub(crate) use query_context::DEFINITIVE;
