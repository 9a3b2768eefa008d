use std::{fmt, sync::Arc};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, trace, warn};

use crate::{
    blueprint::Blueprint,
    error::{FilterError, Result},
    graph::{NodeId, NodeRole, Topology},
    node::{INPUT_PORT, NodeFactory, OperationNode},
    redirect::{Propagation, RedirectTable},
    schema::ParamSchema,
    value::ParamValue,
};

/// Registration keys of a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterInfo {
    /// Unique name, `namespace:filter`.
    pub name: String,
    pub title: String,
    pub categories: Vec<String>,
    pub description: String,
    /// Hash the host uses for reference renders. Declared, not computed.
    pub reference_hash: String,
}

impl FilterInfo {
    pub fn new(name: &str, title: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            categories: Vec::new(),
            description: String::new(),
            reference_hash: String::new(),
        }
    }

    /// Colon separated, as hosts list them (`artistic:light`).
    pub fn categories(mut self, categories: &str) -> Self {
        self.categories = categories
            .split(':')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn reference_hash(mut self, hash: &str) -> Self {
        self.reference_hash = hash.to_string();
        self
    }
}

/// A macro filter: exposed parameters, a fixed internal graph and the
/// redirects between them. Immutable once constructed.
#[derive(Debug, Clone, Serialize)]
pub struct FilterDefinition {
    info: FilterInfo,
    schema: ParamSchema,
    topology: Topology,
    redirects: RedirectTable,
}

#[derive(Serialize)]
struct FingerprintView<'a> {
    name: &'a str,
    schema: &'a ParamSchema,
    topology: &'a Topology,
    redirects: &'a RedirectTable,
}

impl FilterDefinition {
    /// Checks the blueprint against the schema: acyclic, every linked node
    /// between the proxies, every exposed parameter redirected, every
    /// redirect naming a declared node.
    pub fn new(info: FilterInfo, schema: ParamSchema, blueprint: Blueprint) -> Result<Self> {
        let Blueprint {
            topology,
            mut redirects,
        } = blueprint;
        topology.validate(&info.name)?;
        redirects.resolve(&info.name, &schema, &topology)?;
        Ok(Self {
            info,
            schema,
            topology,
            redirects,
        })
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn info(&self) -> &FilterInfo {
        &self.info
    }

    pub fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn redirects(&self) -> &RedirectTable {
        &self.redirects
    }

    pub fn describe(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// SHA-256 over the canonical JSON form of name, schema, topology and
    /// redirects, as lowercase hex.
    pub fn fingerprint(&self) -> Result<String> {
        let view = FingerprintView {
            name: &self.info.name,
            schema: &self.schema,
            topology: &self.topology,
            redirects: &self.redirects,
        };
        let bytes = serde_json::to_vec(&view)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Creates every internal node through `factory`, checks links and
    /// redirect targets against the created nodes, then pushes the default
    /// values through the redirects. Nothing is returned on failure.
    pub fn attach(self: &Arc<Self>, factory: &dyn NodeFactory) -> Result<FilterInstance> {
        let name = self.name();
        debug!(filter = name, nodes = self.topology.nodes().len(), "attaching filter");

        let mut nodes: Vec<Option<Box<dyn OperationNode>>> =
            Vec::with_capacity(self.topology.nodes().len());
        for entry in self.topology.nodes() {
            let node = match entry.role {
                NodeRole::InputProxy | NodeRole::OutputProxy => None,
                NodeRole::Operation | NodeRole::Detached => {
                    let node = factory.create(&entry.kind, &[]).inspect_err(|e| {
                        warn!(filter = name, node = %entry.label, kind = %entry.kind, error = %e, "node creation failed");
                    })?;
                    Some(node)
                }
            };
            nodes.push(node);
        }

        for link in self.topology.links() {
            let accepts = match &nodes[link.to.0] {
                Some(node) => node.accepts_input(&link.port),
                None => link.port == INPUT_PORT,
            };
            if !accepts {
                let to = self.topology.entry(link.to);
                return Err(FilterError::UnknownPort {
                    node: to.label.clone(),
                    kind: to.kind.clone(),
                    port: link.port.clone(),
                });
            }
            trace!(
                filter = name,
                from = %self.topology.entry(link.from).label,
                to = %self.topology.entry(link.to).label,
                port = %link.port,
                "link"
            );
        }

        self.redirects.check_targets(&self.topology, &nodes)?;

        let mut instance = FilterInstance {
            definition: Arc::clone(self),
            nodes,
            values: self.schema.defaults(),
        };
        instance.apply()?;
        debug!(filter = name, redirects = self.redirects.len(), "filter attached");
        Ok(instance)
    }
}

/// A live, attached filter. Owns its internal nodes; every parameter write
/// goes through the exposed parameters and their redirects.
pub struct FilterInstance {
    definition: Arc<FilterDefinition>,
    nodes: Vec<Option<Box<dyn OperationNode>>>,
    values: Vec<ParamValue>,
}

impl fmt::Debug for FilterInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterInstance")
            .field("filter", &self.definition.name())
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

impl FilterInstance {
    /// Pushes every current value to every target, in registration order.
    fn apply(&mut self) -> Result<()> {
        let def = Arc::clone(&self.definition);
        let mut propagation = Propagation::default();
        for entry in def.redirects.entries() {
            let Some(pos) = def.schema.position(&entry.exposed) else {
                continue;
            };
            if let Err(e) = propagation.write(&mut self.nodes, entry, &self.values[pos]) {
                propagation.rollback(&mut self.nodes);
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn definition(&self) -> &Arc<FilterDefinition> {
        &self.definition
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn topology(&self) -> &Topology {
        &self.definition.topology
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.definition
            .schema
            .position(name)
            .map(|pos| &self.values[pos])
    }

    /// Exposed parameters and their current values, in declaration order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.definition
            .schema
            .iter()
            .zip(&self.values)
            .map(|(spec, v)| (spec.name.as_str(), v))
    }

    /// Validates and writes one exposed parameter, mirroring it to all of
    /// its targets. On any failure nothing changes.
    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<()> {
        self.set_many([(name, value.into())])
    }

    /// Writes several exposed parameters as one unit: all are validated
    /// before any target is touched, and a target rejecting a value undoes
    /// every write made so far.
    pub fn set_many<'a>(&mut self, writes: impl IntoIterator<Item = (&'a str, ParamValue)>) -> Result<()> {
        let def = Arc::clone(&self.definition);

        let mut staged: Vec<(usize, ParamValue)> = Vec::new();
        for (name, value) in writes {
            let pos = def
                .schema
                .position(name)
                .ok_or_else(|| FilterError::UnknownParam {
                    owner: def.name().to_string(),
                    param: name.to_string(),
                })?;
            let value = def.schema.spec_at(pos).validate(value)?;
            staged.push((pos, value));
        }

        let mut propagation = Propagation::default();
        for (pos, value) in &staged {
            for entry in def.redirects.targets(*pos) {
                if let Err(e) = propagation.write(&mut self.nodes, entry, value) {
                    propagation.rollback(&mut self.nodes);
                    return Err(e);
                }
            }
        }

        for (pos, value) in staged {
            trace!(filter = def.name(), param = %def.schema.spec_at(pos).name, %value, "set");
            self.values[pos] = value;
        }
        Ok(())
    }

    /// Restores every exposed parameter to its declared default.
    pub fn reset(&mut self) -> Result<()> {
        let def = Arc::clone(&self.definition);
        self.set_many(def.schema.iter().map(|s| (s.name.as_str(), s.default.clone())))
    }

    pub fn node_by_id(&self, id: NodeId) -> Option<&dyn OperationNode> {
        self.nodes.get(id.0)?.as_deref()
    }

    /// Read-only view of an internal node. Redirect targets are only written
    /// through the exposed parameters.
    pub fn node(&self, label: &str) -> Option<&dyn OperationNode> {
        self.node_by_id(self.topology().find(label)?)
    }

    pub fn target_value(&self, label: &str, param: &str) -> Option<ParamValue> {
        self.node(label)?.get(param)
    }

    /// JSON view of exposed values and every redirect target's current value.
    pub fn snapshot(&self) -> serde_json::Value {
        let params: serde_json::Map<String, serde_json::Value> = self
            .values()
            .map(|(k, v)| (k.to_string(), v.to_json()))
            .collect();

        let topology = self.topology();
        let nodes: Vec<serde_json::Value> = topology
            .operation_ids()
            .map(|id| {
                let entry = topology.entry(id);
                let targets: serde_json::Map<String, serde_json::Value> = self
                    .definition
                    .redirects
                    .entries()
                    .iter()
                    .filter(|e| e.node == id)
                    .filter_map(|e| {
                        let v = self.node_by_id(id)?.get(&e.param)?;
                        Some((e.param.clone(), v.to_json()))
                    })
                    .collect();
                serde_json::json!({
                    "label": entry.label,
                    "kind": entry.kind,
                    "role": entry.role,
                    "params": targets,
                })
            })
            .collect();

        serde_json::json!({
            "filter": self.name(),
            "params": params,
            "nodes": nodes,
        })
    }
}

/// An attached filter can itself be an internal node of another filter.
impl OperationNode for FilterInstance {
    fn kind(&self) -> &str {
        self.definition.name()
    }

    fn has_param(&self, name: &str) -> bool {
        self.definition.schema.position(name).is_some()
    }

    fn get(&self, name: &str) -> Option<ParamValue> {
        FilterInstance::get(self, name).cloned()
    }

    fn set(&mut self, name: &str, value: ParamValue) -> Result<()> {
        FilterInstance::set(self, name, value)
    }
}
