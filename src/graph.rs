use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::{
    error::{FilterError, Result},
    node::{AUX_PORT, INPUT_PORT},
};

/// Index of a node inside one [`Topology`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// The filter's own input terminal.
    InputProxy,
    /// The filter's own output terminal.
    OutputProxy,
    Operation,
    /// Created and parameterized but never linked.
    Detached,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeEntry {
    pub label: String,
    pub kind: String,
    pub role: NodeRole,
}

/// Directed edge from `from`'s output into `to`'s `port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Link {
    pub from: NodeId,
    pub to: NodeId,
    pub port: String,
}

impl Link {
    pub fn is_aux(&self) -> bool {
        self.port == AUX_PORT
    }
}

pub const INPUT_PROXY_LABEL: &str = "input";
pub const OUTPUT_PROXY_LABEL: &str = "output";
const PROXY_KIND: &str = "proxy";

/// Fixed node set and links of one filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topology {
    nodes: Vec<NodeEntry>,
    links: Vec<Link>,
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}

impl Topology {
    pub const INPUT: NodeId = NodeId(0);
    pub const OUTPUT: NodeId = NodeId(1);

    pub fn new() -> Self {
        let proxy = |label: &str, role| NodeEntry {
            label: label.to_string(),
            kind: PROXY_KIND.to_string(),
            role,
        };
        Self {
            nodes: vec![
                proxy(INPUT_PROXY_LABEL, NodeRole::InputProxy),
                proxy(OUTPUT_PROXY_LABEL, NodeRole::OutputProxy),
            ],
            links: Vec::new(),
        }
    }

    pub(crate) fn add_node(&mut self, label: &str, kind: &str, role: NodeRole) -> NodeId {
        self.nodes.push(NodeEntry {
            label: label.to_string(),
            kind: kind.to_string(),
            role,
        });
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn add_link(&mut self, from: NodeId, to: NodeId, port: &str) {
        self.links.push(Link {
            from,
            to,
            port: port.to_string(),
        });
    }

    pub fn input_proxy(&self) -> NodeId {
        Self::INPUT
    }

    pub fn output_proxy(&self) -> NodeId {
        Self::OUTPUT
    }

    pub fn nodes(&self) -> &[NodeEntry] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn entry(&self, id: NodeId) -> &NodeEntry {
        &self.nodes[id.0]
    }

    pub fn find(&self, label: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.label == label).map(NodeId)
    }

    /// Operation and detached nodes, in declaration order.
    pub fn operation_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| matches!(n.role, NodeRole::Operation | NodeRole::Detached))
            .map(|(i, _)| NodeId(i))
    }

    /// Sources linked into `to`'s `port`.
    pub fn sources_of(&self, to: NodeId, port: &str) -> Vec<NodeId> {
        self.links
            .iter()
            .filter(|l| l.to == to && l.port == port)
            .map(|l| l.from)
            .collect()
    }

    pub fn topo_sort(&self) -> Option<Vec<NodeId>> {
        let mut indeg: Vec<usize> = vec![0; self.nodes.len()];
        let mut outgoing: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for l in &self.links {
            indeg[l.to.0] += 1;
            outgoing.entry(l.from).or_default().push(l.to);
        }

        let mut q: VecDeque<NodeId> = indeg
            .iter()
            .enumerate()
            .filter_map(|(i, d)| if *d == 0 { Some(NodeId(i)) } else { None })
            .collect();
        let mut order: Vec<NodeId> = Vec::with_capacity(self.nodes.len());

        while let Some(n) = q.pop_front() {
            order.push(n);
            if let Some(nexts) = outgoing.get(&n) {
                for m in nexts {
                    indeg[m.0] -= 1;
                    if indeg[m.0] == 0 {
                        q.push_back(*m);
                    }
                }
            }
        }

        (order.len() == self.nodes.len()).then_some(order)
    }

    pub fn upstream_reachable(&self, start: NodeId) -> HashSet<NodeId> {
        let mut incoming: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for l in &self.links {
            incoming.entry(l.to).or_default().push(l.from);
        }
        walk(start, &incoming)
    }

    pub fn downstream_reachable(&self, start: NodeId) -> HashSet<NodeId> {
        let mut outgoing: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for l in &self.links {
            outgoing.entry(l.from).or_default().push(l.to);
        }
        walk(start, &outgoing)
    }

    /// Nodes strictly between the proxies on the shortest path that only
    /// follows links into main `input` ports. `None` if the output proxy
    /// cannot be reached that way.
    pub fn main_chain(&self) -> Option<Vec<NodeId>> {
        let mut prev: HashMap<NodeId, NodeId> = HashMap::new();
        let mut seen: HashSet<NodeId> = HashSet::from([Self::INPUT]);
        let mut q: VecDeque<NodeId> = VecDeque::from([Self::INPUT]);

        while let Some(n) = q.pop_front() {
            if n == Self::OUTPUT {
                let mut chain = Vec::new();
                let mut cur = n;
                while let Some(p) = prev.get(&cur) {
                    if *p != Self::INPUT {
                        chain.push(*p);
                    }
                    cur = *p;
                }
                chain.reverse();
                return Some(chain);
            }
            for l in self.links.iter().filter(|l| l.from == n && l.port == INPUT_PORT) {
                if seen.insert(l.to) {
                    prev.insert(l.to, n);
                    q.push_back(l.to);
                }
            }
        }
        None
    }

    /// Linked operation nodes that are not on the main chain. These only
    /// reach the output through an auxiliary input somewhere downstream.
    pub fn side_chain(&self) -> Vec<NodeId> {
        let main: HashSet<NodeId> = self.main_chain().unwrap_or_default().into_iter().collect();
        self.nodes
            .iter()
            .enumerate()
            .filter(|(i, n)| n.role == NodeRole::Operation && !main.contains(&NodeId(*i)))
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    /// Structural checks that need no host engine.
    pub fn validate(&self, filter: &str) -> Result<()> {
        let mut labels: HashSet<&str> = HashSet::new();
        for n in &self.nodes {
            if !labels.insert(n.label.as_str()) {
                return Err(FilterError::DuplicateNode {
                    filter: filter.to_string(),
                    node: n.label.clone(),
                });
            }
        }

        for l in &self.links {
            if let Some(id) = [l.from, l.to].into_iter().find(|id| id.0 >= self.nodes.len()) {
                return Err(FilterError::UnknownNode {
                    filter: filter.to_string(),
                    node: format!("#{}", id.0),
                });
            }
        }

        for l in &self.links {
            let bad = if l.to == Self::INPUT {
                Some(l.to)
            } else if l.from == Self::OUTPUT {
                Some(l.from)
            } else if self.nodes[l.from.0].role == NodeRole::Detached {
                Some(l.from)
            } else if self.nodes[l.to.0].role == NodeRole::Detached {
                Some(l.to)
            } else {
                None
            };
            if let Some(id) = bad {
                return Err(FilterError::Unreachable {
                    filter: filter.to_string(),
                    node: self.nodes[id.0].label.clone(),
                });
            }
        }

        if self.topo_sort().is_none() {
            return Err(FilterError::Cycle {
                filter: filter.to_string(),
            });
        }

        let from_input = self.downstream_reachable(Self::INPUT);
        let to_output = self.upstream_reachable(Self::OUTPUT);
        for (i, n) in self.nodes.iter().enumerate() {
            if n.role == NodeRole::Detached {
                continue;
            }
            let id = NodeId(i);
            if !from_input.contains(&id) || !to_output.contains(&id) {
                return Err(FilterError::Unreachable {
                    filter: filter.to_string(),
                    node: n.label.clone(),
                });
            }
        }
        Ok(())
    }
}

fn walk(start: NodeId, edges: &HashMap<NodeId, Vec<NodeId>>) -> HashSet<NodeId> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut stack: Vec<NodeId> = vec![start];
    while let Some(n) = stack.pop() {
        if !visited.insert(n) {
            continue;
        }
        if let Some(nexts) = edges.get(&n) {
            stack.extend(nexts.iter().copied());
        }
    }
    visited
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(kinds: &[&str]) -> (Topology, Vec<NodeId>) {
        let mut t = Topology::new();
        let ids: Vec<NodeId> = kinds
            .iter()
            .enumerate()
            .map(|(i, k)| t.add_node(&format!("n{i}"), k, NodeRole::Operation))
            .collect();
        let mut prev = Topology::INPUT;
        for id in &ids {
            t.add_link(prev, *id, INPUT_PORT);
            prev = *id;
        }
        t.add_link(prev, Topology::OUTPUT, INPUT_PORT);
        (t, ids)
    }

    #[test]
    fn linear_chain_is_the_main_chain() {
        let (t, ids) = chain(&["a", "b", "c"]);
        t.validate("t").unwrap();
        assert_eq!(t.main_chain(), Some(ids));
        assert!(t.side_chain().is_empty());
    }

    #[test]
    fn aux_branch_is_a_side_chain() {
        let mut t = Topology::new();
        let over = t.add_node("over", "gegl:over", NodeRole::Operation);
        let blur = t.add_node("blur", "gegl:median-blur", NodeRole::Operation);
        t.add_link(Topology::INPUT, over, INPUT_PORT);
        t.add_link(over, Topology::OUTPUT, INPUT_PORT);
        t.add_link(Topology::INPUT, blur, INPUT_PORT);
        t.add_link(blur, over, AUX_PORT);

        t.validate("t").unwrap();
        assert_eq!(t.main_chain(), Some(vec![over]));
        assert_eq!(t.side_chain(), vec![blur]);
        assert_eq!(t.sources_of(over, AUX_PORT), vec![blur]);
    }

    #[test]
    fn cycle_is_rejected() {
        let (mut t, ids) = chain(&["a", "b"]);
        t.add_link(ids[1], ids[0], AUX_PORT);
        assert!(matches!(t.validate("t"), Err(FilterError::Cycle { .. })));
        assert!(t.topo_sort().is_none());
    }

    #[test]
    fn dangling_node_is_rejected_unless_detached() {
        let (mut t, _) = chain(&["a"]);
        t.add_node("parked", "b", NodeRole::Detached);
        t.validate("t").unwrap();

        t.add_node("dangling", "c", NodeRole::Operation);
        let err = t.validate("t").unwrap_err();
        assert!(matches!(err, FilterError::Unreachable { node, .. } if node == "dangling"));
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let (mut t, _) = chain(&["a"]);
        t.add_node("n0", "b", NodeRole::Detached);
        assert!(matches!(
            t.validate("t"),
            Err(FilterError::DuplicateNode { .. })
        ));
    }

    #[test]
    fn upstream_reachability_stops_at_sources() {
        let (t, ids) = chain(&["a", "b", "c"]);
        let up = t.upstream_reachable(ids[1]);
        assert!(up.contains(&ids[0]) && up.contains(&Topology::INPUT));
        assert!(!up.contains(&ids[2]));
    }
}
