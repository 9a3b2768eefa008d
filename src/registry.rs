use std::{collections::BTreeMap, sync::Arc};

use tracing::{debug, info};

use crate::{
    error::{FilterError, Result},
    filter::{FilterDefinition, FilterInstance},
    node::{NodeFactory, OperationNode},
    value::ParamValue,
};

/// Filters registered under unique names.
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    filters: BTreeMap<String, Arc<FilterDefinition>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: FilterDefinition) -> Result<Arc<FilterDefinition>> {
        let name = definition.name().to_string();
        if self.filters.contains_key(&name) {
            return Err(FilterError::DuplicateFilter { name });
        }
        let definition = Arc::new(definition);
        info!(filter = %name, title = %definition.info().title, "registered filter");
        self.filters.insert(name, Arc::clone(&definition));
        Ok(definition)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<FilterDefinition>> {
        self.filters.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<FilterDefinition>> {
        self.filters.values()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Attaches the filter registered as `name`. Internal nodes whose kind is
    /// itself a registered filter become nested filter instances; everything
    /// else comes from `host`.
    pub fn attach(&self, name: &str, host: &dyn NodeFactory) -> Result<FilterInstance> {
        let definition = self
            .filters
            .get(name)
            .ok_or_else(|| FilterError::MissingOperation {
                kind: name.to_string(),
            })?;
        let factory = LayeredFactory {
            registry: self,
            host,
            stack: vec![name.to_string()],
        };
        definition.attach(&factory)
    }

    pub fn factory<'a>(&'a self, host: &'a dyn NodeFactory) -> LayeredFactory<'a> {
        LayeredFactory {
            registry: self,
            host,
            stack: Vec::new(),
        }
    }
}

/// Resolves registered filter names before falling back to the host.
pub struct LayeredFactory<'a> {
    registry: &'a FilterRegistry,
    host: &'a dyn NodeFactory,
    /// Filters currently being attached, outermost first.
    stack: Vec<String>,
}

impl NodeFactory for LayeredFactory<'_> {
    fn create(&self, kind: &str, initial: &[(String, ParamValue)]) -> Result<Box<dyn OperationNode>> {
        let Some(definition) = self.registry.get(kind) else {
            return self.host.create(kind, initial);
        };

        if self.stack.iter().any(|s| s == kind) {
            let mut chain = self.stack.clone();
            chain.push(kind.to_string());
            return Err(FilterError::RecursiveFilter {
                name: kind.to_string(),
                chain: chain.join(" -> "),
            });
        }

        let mut stack = self.stack.clone();
        stack.push(kind.to_string());
        debug!(filter = kind, depth = stack.len(), "attaching nested filter");
        let nested = LayeredFactory {
            registry: self.registry,
            host: self.host,
            stack,
        };

        let mut instance = definition.attach(&nested)?;
        instance.set_many(initial.iter().map(|(k, v)| (k.as_str(), v.clone())))?;
        Ok(Box::new(instance))
    }
}
