//! Declarative description of a filter's internal graph.

use crate::{
    graph::{NodeId, NodeRole, Topology},
    node::{AUX_PORT, INPUT_PORT},
    redirect::RedirectTable,
};

/// Node declarations, links and redirect rules of one filter, before any
/// node exists. Structural problems surface when the blueprint is turned
/// into a [`crate::filter::FilterDefinition`].
#[derive(Debug, Clone, Default)]
pub struct Blueprint {
    pub(crate) topology: Topology,
    pub(crate) redirects: RedirectTable,
}

impl Blueprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> NodeId {
        Topology::INPUT
    }

    pub fn output(&self) -> NodeId {
        Topology::OUTPUT
    }

    /// Declares an internal node of `kind`. The same kind may be declared
    /// any number of times under different labels.
    pub fn node(&mut self, label: &str, kind: &str) -> NodeId {
        self.topology.add_node(label, kind, NodeRole::Operation)
    }

    /// Declares a node that is created and receives redirects but is never
    /// linked into the pipeline.
    pub fn detached(&mut self, label: &str, kind: &str) -> NodeId {
        self.topology.add_node(label, kind, NodeRole::Detached)
    }

    /// Links each node's output into the next node's main input.
    pub fn chain(&mut self, nodes: &[NodeId]) -> &mut Self {
        for pair in nodes.windows(2) {
            self.topology.add_link(pair[0], pair[1], INPUT_PORT);
        }
        self
    }

    pub fn connect(&mut self, from: NodeId, to: NodeId, port: &str) -> &mut Self {
        self.topology.add_link(from, to, port);
        self
    }

    /// Shorthand for linking `from` into `to`'s auxiliary input.
    pub fn aux(&mut self, from: NodeId, to: NodeId) -> &mut Self {
        self.connect(from, to, AUX_PORT)
    }

    /// Forwards exposed parameter `exposed` to `param` on `node`. Calling it
    /// again for the same exposed name adds another target.
    pub fn redirect(&mut self, exposed: &str, node: NodeId, param: &str) -> &mut Self {
        self.redirects.push(exposed, node, param);
        self
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }
}
