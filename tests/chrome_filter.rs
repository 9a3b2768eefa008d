use meta_filter_forge::{
    FilterInstance, ParamValue,
    catalog::OperationCatalog,
    color::Color,
    filters::{builtin_registry, chrome, edgesmooth, metallic},
};

fn attach() -> FilterInstance {
    let registry = builtin_registry().expect("register built-ins");
    let catalog = OperationCatalog::load_default().expect("load catalog");
    registry.attach(chrome::NAME, &catalog).expect("attach chrome")
}

#[test]
fn main_chain_has_nine_primitives_in_order() {
    let f = attach();
    let t = f.topology();
    let chain: Vec<&str> = t
        .main_chain()
        .unwrap()
        .into_iter()
        .map(|id| t.entry(id).label.as_str())
        .collect();
    assert_eq!(
        chain,
        [
            "color",
            "bevel",
            "metallic",
            "glow",
            "sharpen",
            "softglow",
            "noisereduction",
            "smoothedge",
            "opacity"
        ]
    );
    assert!(t.side_chain().is_empty());
}

#[test]
fn nested_filters_are_attached_as_nodes() {
    let f = attach();
    assert_eq!(f.node("metallic").map(|n| n.kind()), Some(metallic::NAME));
    assert_eq!(f.node("smoothedge").map(|n| n.kind()), Some(edgesmooth::NAME));
    assert_eq!(f.node("bevel").map(|n| n.kind()), Some("gegl:bevel"));
}

#[test]
fn defaults_reach_bevel_and_nested_filters() {
    let f = attach();
    assert_eq!(f.target_value("bevel", "radius1"), Some(ParamValue::Double(7.0)));
    assert_eq!(f.target_value("bevel", "bevel1"), Some(ParamValue::Double(58.0)));
    assert_eq!(f.target_value("bevel", "azimuth"), Some(ParamValue::Double(60.0)));
    assert_eq!(f.target_value("bevel", "th"), Some(ParamValue::Double(0.21)));
    assert_eq!(f.target_value("glow", "strength"), Some(ParamValue::Double(6.0)));
    assert_eq!(f.target_value("softglow", "glow-radius"), Some(ParamValue::Double(3.0)));
    assert_eq!(f.target_value("sharpen", "scale"), Some(ParamValue::Double(0.2)));
    assert_eq!(f.target_value("metallic", "smooth"), Some(ParamValue::Int(2)));
    assert_eq!(f.target_value("smoothedge", "alpha-percentile2"), Some(ParamValue::Double(50.0)));

    let color: Color = "#ffb386".parse().unwrap();
    assert_eq!(f.target_value("color", "value"), Some(ParamValue::Color(color)));
}

#[test]
fn writes_travel_through_nested_filters() {
    let mut f = attach();
    f.set("lightmetal", -3.0).unwrap();
    f.set("smoothmetal", ParamValue::Int(5)).unwrap();
    f.set("smoothedge", 12.5).unwrap();

    assert_eq!(f.target_value("metallic", "light"), Some(ParamValue::Double(-3.0)));
    assert_eq!(f.target_value("metallic", "smooth"), Some(ParamValue::Int(5)));
    assert_eq!(f.target_value("smoothedge", "alpha_percentile2"), Some(ParamValue::Double(12.5)));
}

#[test]
fn snapshot_lists_nested_filter_targets() {
    let mut f = attach();
    f.set("solar3", 3.25).unwrap();
    let snap = f.snapshot();
    let node = snap["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["label"] == "metallic")
        .unwrap();
    assert_eq!(node["kind"], metallic::NAME);
    assert_eq!(node["params"]["solar3"], 3.25);
    assert_eq!(snap["params"]["solar3"], 3.25);
}

#[test]
fn chrome_ranges_are_tighter_than_nested_ones() {
    let mut f = attach();
    // metallic allows solar1 up to 4.0; chrome stops at 2.8
    assert!(f.set("solar1", 3.0).is_err());
    assert_eq!(f.target_value("metallic", "solar1"), Some(ParamValue::Double(2.7)));
    assert!(f.set("lightmetal", 8.0).is_err());
    assert!(f.set("th", 0.19).is_err());
    f.set("th", 0.23).unwrap();
    assert_eq!(f.target_value("bevel", "th"), Some(ParamValue::Double(0.23)));
}

#[test]
fn color_parameter_rejects_other_types() {
    let mut f = attach();
    let err = f.set("value", 1.0).unwrap_err();
    assert!(matches!(err, meta_filter_forge::FilterError::TypeMismatch { .. }), "{err}");

    let gold: Color = "#ffd700".parse().unwrap();
    f.set("value", gold).unwrap();
    assert_eq!(f.target_value("color", "value"), Some(ParamValue::Color(gold)));
}

#[test]
fn glow_accepts_very_large_strengths() {
    let mut f = attach();
    f.set("glow", 1.0e12).unwrap();
    assert_eq!(f.target_value("glow", "strength"), Some(ParamValue::Double(1.0e12)));
    assert!(f.set("glow", -0.1).is_err());
}
