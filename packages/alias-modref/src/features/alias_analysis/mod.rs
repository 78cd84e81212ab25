//! # Alias & Mod-Ref Aggregation
//!
//! The query surface of the crate: lattice value types, the per-query
//! assumption cache, the component port, and the aggregation engine that
//! folds an ordered set of pluggable analyses into one answer.
//!
//! A query flows: caller → [`AliasAggregator`] → cache (directly or via a
//! [`BatchSession`]) → on miss, registration-ordered component dispatch
//! with narrowing → memoization (possibly as a tentative assumption).
//!
//! [`AliasAggregator`]: application::aggregator::AliasAggregator
//! [`BatchSession`]: application::batch::BatchSession

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::aggregator::{AliasAggregator, AliasAggregatorBuilder, InvalidationKey};
pub use application::batch::BatchSession;
pub use application::registry::{ComponentFactory, ComponentRegistry};
pub use domain::{
    AliasKind, AliasResult, FunctionModRefBehavior, LocationClass, MemoryLocation, ModRefInfo,
    QueryContext, QueryStats,
};
pub use infrastructure::ConservativeAliasAnalysis;
pub use ports::{AggregationLink, AliasAnalysisComponent};
