//! Named component factories and pipeline construction.
//!
//! Hosts describe an aggregation pipeline as a comma-separated list of
//! registered component names, in priority order. Building resolves each
//! name through the registry; unknown names are configuration errors, not
//! silently skipped entries.

use crate::errors::{AliasModRefError, Result};
use crate::features::alias_analysis::application::aggregator::{
    AliasAggregator, AliasAggregatorBuilder, InvalidationKey,
};
use crate::features::alias_analysis::infrastructure::ConservativeAliasAnalysis;
use crate::features::alias_analysis::ports::AliasAnalysisComponent;
use crate::shared::ports::ProgramInfo;
use std::rc::Rc;

/// Constructor for one component over a program view.
pub type ComponentFactory =
    Box<dyn Fn(Rc<dyn ProgramInfo>) -> Box<dyn AliasAnalysisComponent>>;

struct RegisteredFactory {
    name: String,
    key: InvalidationKey,
    factory: ComponentFactory,
}

/// Registry of named component factories.
#[derive(Default)]
pub struct ComponentRegistry {
    factories: Vec<RegisteredFactory>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in `conservative` component
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register("conservative", InvalidationKey::from("conservative"), |_| {
                Box::new(ConservativeAliasAnalysis::new())
            })
            .ok();
        registry
    }

    /// Register a factory under a unique name.
    pub fn register<F>(&mut self, name: &str, key: InvalidationKey, factory: F) -> Result<()>
    where
        F: Fn(Rc<dyn ProgramInfo>) -> Box<dyn AliasAnalysisComponent> + 'static,
    {
        if self.contains(name) {
            return Err(AliasModRefError::DuplicateComponent(name.to_string()));
        }
        self.factories.push(RegisteredFactory {
            name: name.to_string(),
            key,
            factory: Box::new(factory),
        });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.iter().any(|f| f.name == name)
    }

    pub fn component_names(&self) -> Vec<&str> {
        self.factories.iter().map(|f| f.name.as_str()).collect()
    }

    /// Build an aggregator from a pipeline specification such as
    /// `"tbaa,basic"`. Component order in the spec becomes registration
    /// (priority) order. An empty spec builds an engine with no
    /// components, which answers every query conservatively.
    pub fn build_pipeline(
        &self,
        spec: &str,
        ir: Rc<dyn ProgramInfo>,
    ) -> Result<Rc<AliasAggregator>> {
        let mut builder = AliasAggregatorBuilder::new(Rc::clone(&ir));
        let spec = spec.trim();
        if !spec.is_empty() {
            for name in spec.split(',') {
                let name = name.trim();
                if name.is_empty() {
                    return Err(AliasModRefError::InvalidPipeline(format!(
                        "empty component name in \"{}\"",
                        spec
                    )));
                }
                let registered = self
                    .factories
                    .iter()
                    .find(|f| f.name == name)
                    .ok_or_else(|| AliasModRefError::UnknownComponent(name.to_string()))?;
                builder = builder.register(
                    (registered.factory)(Rc::clone(&ir)),
                    registered.key.clone(),
                );
            }
        }
        Ok(builder.build())
    }
}
