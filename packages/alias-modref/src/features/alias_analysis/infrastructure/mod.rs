//! Concrete components shipped with the engine.

mod conservative;

pub use conservative::ConservativeAliasAnalysis;
