use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::{
    color::Color,
    error::{FilterError, Result},
    value::{ParamType, ParamValue, canonical_name},
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    fn contains_range(&self, other: &Range) -> bool {
        other.min >= self.min && other.max <= self.max
    }

    fn intersect(&self, other: &Range) -> Range {
        Range::new(self.min.max(other.min), self.max.min(other.max))
    }
}

/// Presentation hints. Advisory only: nothing here takes part in validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UiHints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Unevaluated sensitivity predicate, e.g. `! cpn-1-keep`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

/// Declaration of one exposed parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: ParamType,
    pub default: ParamValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_range: Option<Range>,
    pub ui: UiHints,
}

impl ParamSpec {
    fn new(name: &str, label: &str, default: ParamValue) -> Self {
        Self {
            name: canonical_name(name),
            label: label.to_string(),
            description: None,
            ty: default.ty(),
            default,
            value_range: None,
            ui: UiHints::default(),
        }
    }

    pub fn double(name: &str, label: &str, default: f64) -> Self {
        Self::new(name, label, ParamValue::Double(default))
    }

    pub fn int(name: &str, label: &str, default: i64) -> Self {
        Self::new(name, label, ParamValue::Int(default))
    }

    pub fn string(name: &str, label: &str, default: &str) -> Self {
        Self::new(name, label, ParamValue::String(default.to_string()))
    }

    pub fn color(name: &str, label: &str, default: Color) -> Self {
        Self::new(name, label, ParamValue::Color(default))
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    pub fn value_range(mut self, min: f64, max: f64) -> Self {
        self.value_range = Some(Range::new(min, max));
        self
    }

    pub fn ui_range(mut self, min: f64, max: f64) -> Self {
        self.ui.range = Some(Range::new(min, max));
        self
    }

    pub fn ui_gamma(mut self, gamma: f64) -> Self {
        self.ui.gamma = Some(gamma);
        self
    }

    /// Free-form UI metadata. `unit`, `sensitive` and `role` get their own
    /// fields; any other key lands in [`UiHints::meta`].
    pub fn ui_meta(mut self, key: &str, value: &str) -> Self {
        let value = value.to_string();
        match key {
            "unit" => self.ui.unit = Some(value),
            "sensitive" => self.ui.sensitive = Some(value),
            "role" => self.ui.role = Some(value),
            other => {
                self.ui.meta.insert(other.to_string(), value);
            }
        }
        self
    }

    /// Type-checks and range-checks `value`, returning it coerced to the
    /// parameter's type.
    pub fn validate(&self, value: ParamValue) -> Result<ParamValue> {
        let got = value.ty();
        let value = value
            .coerce_to(self.ty)
            .ok_or_else(|| FilterError::TypeMismatch {
                param: self.name.clone(),
                expected: self.ty,
                got,
            })?;

        if let (Some(range), Some(v)) = (self.value_range, value.as_f64()) {
            // Written so that NaN fails the lower bound.
            if !(v >= range.min) {
                return Err(FilterError::BelowRange {
                    param: self.name.clone(),
                    value: v,
                    limit: range.min,
                });
            }
            if v > range.max {
                return Err(FilterError::AboveRange {
                    param: self.name.clone(),
                    value: v,
                    limit: range.max,
                });
            }
        }
        Ok(value)
    }

    fn check(mut self) -> Result<Self> {
        let invalid = |reason: String| FilterError::InvalidSchema {
            param: self.name.clone(),
            reason,
        };

        if let Some(r) = self.value_range {
            if !self.ty.is_numeric() {
                return Err(invalid(format!("value_range on a {} parameter", self.ty)));
            }
            if !(r.min <= r.max) {
                return Err(invalid(format!("empty value_range {}..{}", r.min, r.max)));
            }
        }
        if let Some(g) = self.ui.gamma {
            if !(g > 0.0) {
                return Err(invalid(format!("ui_gamma must be positive, got {g}")));
            }
        }
        if let Some(ui) = self.ui.range {
            if !(ui.min <= ui.max) {
                return Err(invalid(format!("empty ui_range {}..{}", ui.min, ui.max)));
            }
            if let Some(r) = self.value_range {
                if !r.contains_range(&ui) {
                    let clipped = r.intersect(&ui);
                    debug!(
                        param = %self.name,
                        ui_min = ui.min,
                        ui_max = ui.max,
                        min = clipped.min,
                        max = clipped.max,
                        "ui_range clipped to value_range"
                    );
                    self.ui.range = if clipped.min <= clipped.max {
                        Some(clipped)
                    } else {
                        None
                    };
                }
            }
        }

        if let Err(e) = self.validate(self.default.clone()) {
            return Err(invalid(format!("default out of range: {e}")));
        }
        Ok(self)
    }
}

/// Ordered set of exposed parameters with name lookup.
#[derive(Debug, Clone, Serialize)]
pub struct ParamSchema {
    params: Vec<ParamSpec>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ParamSchema {
    pub fn new(params: Vec<ParamSpec>) -> Result<Self> {
        let mut index = HashMap::with_capacity(params.len());
        let mut checked = Vec::with_capacity(params.len());
        for spec in params {
            let spec = spec.check()?;
            if index.insert(spec.name.clone(), checked.len()).is_some() {
                return Err(FilterError::InvalidSchema {
                    param: spec.name,
                    reason: "declared twice".to_string(),
                });
            }
            checked.push(spec);
        }
        Ok(Self {
            params: checked,
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&canonical_name(name)).copied()
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.position(name).map(|i| &self.params[i])
    }

    pub fn spec_at(&self, index: usize) -> &ParamSpec {
        &self.params[index]
    }

    pub fn defaults(&self) -> Vec<ParamValue> {
        self.params.iter().map(|p| p.default.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_default_outside_range() {
        let err = ParamSchema::new(vec![
            ParamSpec::double("solar2", "Green", 2.0).value_range(2.2, 4.0),
        ])
        .unwrap_err();
        assert!(matches!(err, FilterError::InvalidSchema { .. }), "{err}");
    }

    #[test]
    fn wide_ui_range_is_clipped_to_value_range() {
        let schema = ParamSchema::new(vec![
            ParamSpec::int("radius2", "Radius", 2)
                .value_range(-20.0, 20.0)
                .ui_range(0.0, 100.0),
        ])
        .unwrap();
        let spec = schema.get("radius2").unwrap();
        assert_eq!(spec.ui.range, Some(Range::new(0.0, 20.0)));
        assert_eq!(spec.value_range, Some(Range::new(-20.0, 20.0)));
    }

    #[test]
    fn lookups_fold_underscores() {
        let schema = ParamSchema::new(vec![
            ParamSpec::double("alpha_percentile2", "Median edges", 73.0).value_range(0.0, 100.0),
        ])
        .unwrap();
        assert_eq!(schema.position("alpha-percentile2"), Some(0));
        assert_eq!(schema.position("alpha_percentile2"), Some(0));
        assert_eq!(schema.spec_at(0).name, "alpha-percentile2");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = ParamSchema::new(vec![
            ParamSpec::int("radius", "a", 1),
            ParamSpec::int("radius", "b", 1),
        ])
        .unwrap_err();
        assert_eq!(err.param(), Some("radius"));
    }

    #[test]
    fn ui_meta_routes_known_keys() {
        let spec = ParamSpec::double("solar1", "Red", 2.7)
            .ui_meta("sensitive", "! cpn-1-keep")
            .ui_meta("unit", "degree")
            .ui_meta("rgb-label", "Red frequency");
        assert_eq!(spec.ui.sensitive.as_deref(), Some("! cpn-1-keep"));
        assert_eq!(spec.ui.unit.as_deref(), Some("degree"));
        assert_eq!(
            spec.ui.meta.get("rgb-label").map(String::as_str),
            Some("Red frequency")
        );
    }

    #[test]
    fn nan_is_out_of_range() {
        let spec = ParamSpec::double("gaus", "Blur", 1.0).value_range(0.0, 3.0);
        let err = spec.validate(ParamValue::Double(f64::NAN)).unwrap_err();
        assert!(matches!(err, FilterError::BelowRange { .. }));
    }

    #[test]
    fn range_checks_name_the_bound() {
        let spec = ParamSpec::double("opacity", "Opacity", 1.0).value_range(1.0, 3.0);
        assert_eq!(
            spec.validate(ParamValue::Double(0.5)).unwrap_err().bound(),
            Some(crate::error::Bound::Min)
        );
        assert_eq!(
            spec.validate(ParamValue::Double(3.5)).unwrap_err().bound(),
            Some(crate::error::Bound::Max)
        );
        assert_eq!(
            spec.validate(ParamValue::Int(2)).unwrap(),
            ParamValue::Double(2.0)
        );
    }
}
