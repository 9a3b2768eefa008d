use meta_filter_forge::{
    FilterError, ParamValue, Result,
    catalog::OperationCatalog,
    filters::{builtin_registry, edgesmooth},
    node::{NodeFactory, OperationNode},
};

/// Gaussian blur that refuses vertical deviations above a limit, so the
/// second target of a fan-out can fail after the first one was written.
struct CappedBlur {
    inner: Box<dyn OperationNode>,
    limit: f64,
}

impl OperationNode for CappedBlur {
    fn kind(&self) -> &str {
        self.inner.kind()
    }

    fn has_param(&self, name: &str) -> bool {
        self.inner.has_param(name)
    }

    fn get(&self, name: &str) -> Option<ParamValue> {
        self.inner.get(name)
    }

    fn set(&mut self, name: &str, value: ParamValue) -> Result<()> {
        if let Some(v) = value.as_f64().filter(|v| name == "std-dev-y" && *v > self.limit) {
            return Err(FilterError::AboveRange {
                param: name.to_string(),
                value: v,
                limit: self.limit,
            });
        }
        self.inner.set(name, value)
    }
}

struct CappedHost {
    catalog: OperationCatalog,
    limit: f64,
}

impl NodeFactory for CappedHost {
    fn create(&self, kind: &str, initial: &[(String, ParamValue)]) -> Result<Box<dyn OperationNode>> {
        let inner = self.catalog.create(kind, initial)?;
        if kind == "gegl:gaussian-blur" {
            Ok(Box::new(CappedBlur {
                inner,
                limit: self.limit,
            }))
        } else {
            Ok(inner)
        }
    }
}

fn attach(limit: f64) -> meta_filter_forge::FilterInstance {
    let host = CappedHost {
        catalog: OperationCatalog::load_default().unwrap(),
        limit,
    };
    builtin_registry()
        .unwrap()
        .attach(edgesmooth::NAME, &host)
        .unwrap()
}

#[test]
fn rejected_second_target_rolls_back_the_first() {
    let mut f = attach(2.5);
    f.set("gaus", 2.0).unwrap();

    let err = f.set("gaus", 2.75).unwrap_err();
    assert!(matches!(err, FilterError::AboveRange { .. }), "{err}");

    assert_eq!(f.get("gaus"), Some(&ParamValue::Double(2.0)));
    assert_eq!(f.target_value("gaussian", "std-dev-x"), Some(ParamValue::Double(2.0)));
    assert_eq!(f.target_value("gaussian", "std-dev-y"), Some(ParamValue::Double(2.0)));
}

#[test]
fn batch_write_is_all_or_nothing() {
    let mut f = attach(2.5);
    let err = f
        .set_many([
            ("radius", ParamValue::Int(9)),
            ("value", ParamValue::Double(2.0)),
            ("gaus", ParamValue::Double(2.9)),
        ])
        .unwrap_err();
    assert!(matches!(err, FilterError::AboveRange { .. }));

    assert_eq!(f.get("radius"), Some(&ParamValue::Int(2)));
    assert_eq!(f.target_value("median", "radius"), Some(ParamValue::Int(2)));
    assert_eq!(f.target_value("opacity", "value"), Some(ParamValue::Double(1.2)));
    assert_eq!(f.target_value("gaussian", "std-dev-x"), Some(ParamValue::Double(1.0)));
}

#[test]
fn invalid_entry_in_a_batch_touches_no_target() {
    let mut f = attach(10.0);
    let err = f
        .set_many([
            ("radius", ParamValue::Int(9)),
            ("alpha_percentile", ParamValue::Double(101.0)),
        ])
        .unwrap_err();
    assert_eq!(err.param(), Some("alpha-percentile"));
    assert_eq!(f.target_value("median", "radius"), Some(ParamValue::Int(2)));
}

#[test]
fn failing_default_makes_attach_fail() {
    let host = CappedHost {
        catalog: OperationCatalog::load_default().unwrap(),
        limit: 0.5,
    };
    let err = builtin_registry()
        .unwrap()
        .attach(edgesmooth::NAME, &host)
        .unwrap_err();
    assert!(matches!(err, FilterError::AboveRange { param, .. } if param == "std-dev-y"));
}
