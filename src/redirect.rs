//! Forwarding of exposed parameters to internal node parameters.

use serde::Serialize;
use tracing::{trace, warn};

use crate::{
    error::{FilterError, Result},
    graph::{NodeId, Topology},
    node::OperationNode,
    schema::ParamSchema,
    value::{ParamValue, canonical_name},
};

/// One forwarding rule: exposed parameter -> (internal node, parameter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectEntry {
    pub exposed: String,
    pub node: NodeId,
    pub param: String,
}

/// All forwarding rules of a filter, in registration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RedirectTable {
    entries: Vec<RedirectEntry>,
    /// Entry indices per exposed parameter position.
    #[serde(skip)]
    by_param: Vec<Vec<usize>>,
}

impl RedirectTable {
    pub(crate) fn push(&mut self, exposed: &str, node: NodeId, param: &str) {
        self.entries.push(RedirectEntry {
            exposed: canonical_name(exposed),
            node,
            param: canonical_name(param),
        });
    }

    /// Resolves every rule against the schema and topology. Each exposed
    /// parameter needs at least one rule.
    pub(crate) fn resolve(&mut self, filter: &str, schema: &ParamSchema, topology: &Topology) -> Result<()> {
        let mut by_param = vec![Vec::new(); schema.len()];
        for (i, e) in self.entries.iter().enumerate() {
            let Some(pos) = schema.position(&e.exposed) else {
                return Err(FilterError::UnknownParam {
                    owner: filter.to_string(),
                    param: e.exposed.clone(),
                });
            };
            if !topology.operation_ids().any(|id| id == e.node) {
                return Err(FilterError::UnknownNode {
                    filter: filter.to_string(),
                    node: format!("#{}", e.node.0),
                });
            }
            by_param[pos].push(i);
        }
        if let Some(pos) = by_param.iter().position(Vec::is_empty) {
            return Err(FilterError::Unredirected {
                filter: filter.to_string(),
                param: schema.spec_at(pos).name.clone(),
            });
        }
        self.by_param = by_param;
        Ok(())
    }

    pub fn entries(&self) -> &[RedirectEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rules for the exposed parameter at `position`, in registration order.
    pub fn targets(&self, position: usize) -> impl Iterator<Item = &RedirectEntry> {
        self.by_param
            .get(position)
            .into_iter()
            .flatten()
            .map(|i| &self.entries[*i])
    }

    /// Checks that every target parameter exists on the instantiated nodes.
    pub(crate) fn check_targets(&self, topology: &Topology, nodes: &[Option<Box<dyn OperationNode>>]) -> Result<()> {
        for e in &self.entries {
            let present = nodes
                .get(e.node.0)
                .and_then(Option::as_ref)
                .is_some_and(|n| n.has_param(&e.param));
            if !present {
                return Err(FilterError::MissingRedirectTarget {
                    exposed: e.exposed.clone(),
                    node: topology.entry(e.node).label.clone(),
                    param: e.param.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Undo log for a batch of target writes. Either every write lands or,
/// after [`Propagation::rollback`], none does.
#[derive(Default)]
pub(crate) struct Propagation {
    undo: Vec<(NodeId, String, ParamValue)>,
}

impl Propagation {
    pub(crate) fn write(
        &mut self,
        nodes: &mut [Option<Box<dyn OperationNode>>],
        entry: &RedirectEntry,
        value: &ParamValue,
    ) -> Result<()> {
        let Some(node) = nodes.get_mut(entry.node.0).and_then(Option::as_mut) else {
            return Err(FilterError::UnknownNode {
                filter: String::new(),
                node: format!("#{}", entry.node.0),
            });
        };
        let previous = node.get(&entry.param);
        node.set(&entry.param, value.clone())?;
        trace!(exposed = %entry.exposed, kind = node.kind(), param = %entry.param, %value, "redirect");
        if let Some(previous) = previous {
            self.undo.push((entry.node, entry.param.clone(), previous));
        }
        Ok(())
    }

    pub(crate) fn rollback(self, nodes: &mut [Option<Box<dyn OperationNode>>]) {
        for (id, param, previous) in self.undo.into_iter().rev() {
            if let Some(node) = nodes.get_mut(id.0).and_then(Option::as_mut) {
                if let Err(e) = node.set(&param, previous) {
                    warn!(kind = node.kind(), %param, error = %e, "rollback write rejected");
                }
            }
        }
    }
}
