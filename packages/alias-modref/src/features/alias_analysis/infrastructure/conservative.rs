//! The do-nothing component.

use crate::features::alias_analysis::ports::AliasAnalysisComponent;

/// Answers every query with its most conservative lattice value.
///
/// Useful as the registry baseline, as an explicit delegation target for
/// components that implement only part of the capability, and in tests
/// that need a registered component with no opinions.
#[derive(Debug, Default)]
pub struct ConservativeAliasAnalysis;

impl ConservativeAliasAnalysis {
    pub fn new() -> Self {
        Self
    }
}

impl AliasAnalysisComponent for ConservativeAliasAnalysis {}
