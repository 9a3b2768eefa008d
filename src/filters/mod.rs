//! Built-in macro filters.

pub mod chrome;
pub mod edgesmooth;
pub mod metallic;

use crate::{error::Result, registry::FilterRegistry, schema::ParamSpec};

const COLOR_MODEL_LABEL: &str = "[color-model {rgb} : rgb-label, color-model {hsl} : hsl-label]";

/// A per-channel alien-map frequency, labelled for both color models.
fn solarization(name: &str, label: &str, default: f64, channel: u8, rgb: &str, hsl: &str) -> ParamSpec {
    ParamSpec::double(name, label, default)
        .ui_meta("sensitive", &format!("! cpn-{channel}-keep"))
        .ui_meta("label", COLOR_MODEL_LABEL)
        .ui_meta("rgb-label", rgb)
        .ui_meta("hsl-label", hsl)
}

/// Registry holding every built-in filter. Nested filters are registered
/// before the filters that embed them.
pub fn builtin_registry() -> Result<FilterRegistry> {
    let mut registry = FilterRegistry::new();
    registry.register(metallic::definition()?)?;
    registry.register(edgesmooth::definition()?)?;
    registry.register(chrome::definition()?)?;
    Ok(registry)
}
