//! Named parameter values stored as JSON.
//!
//! ```json
//! { "filter": "gegl:chrome", "name": "gold", "params": { "value": "#ffd700", "glow": 9.0 } }
//! ```

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{FilterError, Result},
    filter::FilterInstance,
    value::{ParamType, ParamValue},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub filter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,
}

fn json_type(v: &serde_json::Value) -> ParamType {
    match v {
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => ParamType::Int,
        serde_json::Value::Number(_) => ParamType::Double,
        _ => ParamType::String,
    }
}

impl Preset {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let preset = Self::from_json_str(&text)?;
        debug!(path = %path.display(), filter = %preset.filter, "loaded preset");
        Ok(preset)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Current values of every exposed parameter of `instance`.
    pub fn capture(instance: &FilterInstance, name: Option<&str>) -> Self {
        Self {
            filter: instance.name().to_string(),
            name: name.map(str::to_string),
            params: instance
                .values()
                .map(|(k, v)| (k.to_string(), v.to_json()))
                .collect(),
        }
    }

    /// Writes every listed value in one atomic batch. Parameters the preset
    /// does not mention keep their current values.
    pub fn apply(&self, instance: &mut FilterInstance) -> Result<()> {
        if self.filter != instance.name() {
            return Err(FilterError::PresetMismatch {
                preset: self.filter.clone(),
                filter: instance.name().to_string(),
            });
        }

        let schema = instance.definition().schema();
        let mut writes: Vec<(&str, ParamValue)> = Vec::with_capacity(self.params.len());
        for (name, raw) in &self.params {
            let spec = schema.get(name).ok_or_else(|| FilterError::UnknownParam {
                owner: self.filter.clone(),
                param: name.clone(),
            })?;
            let value = ParamValue::from_json(raw, spec.ty).ok_or_else(|| FilterError::TypeMismatch {
                param: name.clone(),
                expected: spec.ty,
                got: json_type(raw),
            })?;
            writes.push((name.as_str(), value));
        }
        instance.set_many(writes)
    }
}
