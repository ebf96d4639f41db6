//! Recipe lookup by name.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Recipe, RecipeContext, VhostRecipe};
use crate::error::{CookError, Result};
use crate::provision::Provisioner;

/// Builds a recipe for one invocation.
pub type RecipeFactory = fn(Arc<RecipeContext>, Arc<dyn Provisioner>) -> Box<dyn Recipe>;

/// Known recipes, by name.
#[derive(Debug, Clone, Default)]
pub struct RecipeRegistry {
    factories: BTreeMap<String, RecipeFactory>,
}

impl RecipeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every recipe shipped in this crate.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("example_com", |ctx, prov| -> Box<dyn Recipe> {
            Box::new(VhostRecipe::example_com(ctx, prov))
        });
        registry
    }

    pub fn register(&mut self, name: &str, factory: RecipeFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Instantiate `name`.
    pub fn create(
        &self,
        name: &str,
        context: Arc<RecipeContext>,
        provisioner: Arc<dyn Provisioner>,
    ) -> Result<Box<dyn Recipe>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| CookError::UnknownRecipe {
                name: name.to_string(),
            })?;
        Ok(factory(context, provisioner))
    }

    /// Instantiate several recipes in order, failing on the first unknown name.
    pub fn create_all(
        &self,
        names: &[String],
        context: &Arc<RecipeContext>,
        provisioner: &Arc<dyn Provisioner>,
    ) -> Result<Vec<Box<dyn Recipe>>> {
        names
            .iter()
            .map(|name| self.create(name, Arc::clone(context), Arc::clone(provisioner)))
            .collect()
    }
}
