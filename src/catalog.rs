//! Reference host engine: a catalogue of primitive operation kinds.
//!
//! Catalog nodes carry parameter values and port declarations only. They do
//! no pixel work; they stand in for the host library so filters can be
//! attached, inspected and tested.

use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
    sync::Arc,
};

use serde::Deserialize;
use tracing::{debug, trace};

use crate::{
    error::{FilterError, Result},
    node::{INPUT_PORT, NodeFactory, OperationNode},
    value::{ParamType, ParamValue, canonical_name},
};

const DEFAULT_CATALOG_JSON: &str = include_str!("../assets/operation-catalog.json");

#[derive(Debug, Clone, Deserialize)]
struct RawCatalog {
    #[serde(rename = "schemaVersion")]
    #[allow(dead_code)]
    schema_version: u32,
    #[serde(default)]
    operations: Vec<RawOperation>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawOperation {
    kind: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default = "default_inputs")]
    inputs: Vec<String>,
    #[serde(default)]
    params: HashMap<String, RawParam>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawParam {
    #[serde(rename = "type")]
    ty: ParamType,
    default: serde_json::Value,
}

fn default_inputs() -> Vec<String> {
    vec![INPUT_PORT.to_string()]
}

/// Declared shape of one primitive operation.
#[derive(Debug, Clone)]
pub struct OperationDef {
    pub kind: String,
    pub category: Option<String>,
    pub inputs: Vec<String>,
    /// Canonical parameter name -> (type, default).
    pub params: BTreeMap<String, (ParamType, ParamValue)>,
}

impl OperationDef {
    fn from_raw(raw: RawOperation) -> Result<Self> {
        let mut params = BTreeMap::new();
        for (name, p) in raw.params {
            let default = ParamValue::from_json(&p.default, p.ty).ok_or_else(|| {
                FilterError::Catalog(format!(
                    "{}.{name}: default {} is not a valid {}",
                    raw.kind, p.default, p.ty
                ))
            })?;
            params.insert(canonical_name(&name), (p.ty, default));
        }
        Ok(Self {
            kind: raw.kind,
            category: raw.category,
            inputs: raw.inputs,
            params,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct OperationCatalog {
    ops: HashMap<String, Arc<OperationDef>>,
}

impl OperationCatalog {
    /// The catalogue bundled with the crate.
    pub fn load_default() -> Result<Self> {
        Self::from_json_str(DEFAULT_CATALOG_JSON)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&text)?;
        debug!(path = %path.display(), operations = catalog.len(), "loaded operation catalog");
        Ok(catalog)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: RawCatalog = serde_json::from_str(text)?;
        let mut catalog = Self::default();
        for op in raw.operations {
            let def = OperationDef::from_raw(op)?;
            if catalog.ops.contains_key(&def.kind) {
                return Err(FilterError::Catalog(format!(
                    "operation '{}' listed twice",
                    def.kind
                )));
            }
            catalog.ops.insert(def.kind.clone(), Arc::new(def));
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn get(&self, kind: &str) -> Option<&OperationDef> {
        self.ops.get(kind).map(Arc::as_ref)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.ops.contains_key(kind)
    }

    pub fn insert(&mut self, def: OperationDef) {
        self.ops.insert(def.kind.clone(), Arc::new(def));
    }

    /// Drops an operation kind, as if the host had never registered it.
    pub fn remove(&mut self, kind: &str) -> bool {
        self.ops.remove(kind).is_some()
    }

    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.ops.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl NodeFactory for OperationCatalog {
    fn create(&self, kind: &str, initial: &[(String, ParamValue)]) -> Result<Box<dyn OperationNode>> {
        let def = self
            .ops
            .get(kind)
            .cloned()
            .ok_or_else(|| FilterError::MissingOperation {
                kind: kind.to_string(),
            })?;

        let values = def
            .params
            .iter()
            .map(|(name, (_, default))| (name.clone(), default.clone()))
            .collect();
        let mut node = CatalogNode { def, values };
        for (name, value) in initial {
            node.set(name, value.clone())?;
        }
        trace!(kind, "catalog node created");
        Ok(Box::new(node))
    }
}

/// A primitive node backed by an [`OperationDef`].
#[derive(Debug, Clone)]
pub struct CatalogNode {
    def: Arc<OperationDef>,
    values: BTreeMap<String, ParamValue>,
}

impl OperationNode for CatalogNode {
    fn kind(&self) -> &str {
        &self.def.kind
    }

    fn has_param(&self, name: &str) -> bool {
        self.def.params.contains_key(&canonical_name(name))
    }

    fn get(&self, name: &str) -> Option<ParamValue> {
        self.values.get(&canonical_name(name)).cloned()
    }

    fn set(&mut self, name: &str, value: ParamValue) -> Result<()> {
        let key = canonical_name(name);
        let Some((ty, _)) = self.def.params.get(&key) else {
            return Err(FilterError::UnknownParam {
                owner: self.def.kind.clone(),
                param: key,
            });
        };
        let got = value.ty();
        let value = value
            .coerce_to(*ty)
            .ok_or_else(|| FilterError::TypeMismatch {
                param: format!("{}.{key}", self.def.kind),
                expected: *ty,
                got,
            })?;
        self.values.insert(key, value);
        Ok(())
    }

    fn accepts_input(&self, port: &str) -> bool {
        self.def.inputs.iter().any(|p| p == port)
    }
}
