use meta_filter_forge::{
    ParamValue,
    catalog::OperationCatalog,
    filters::{builtin_registry, metallic},
    graph::NodeRole,
};

fn attach() -> meta_filter_forge::FilterInstance {
    let registry = builtin_registry().expect("register built-ins");
    let catalog = OperationCatalog::load_default().expect("load catalog");
    registry.attach(metallic::NAME, &catalog).expect("attach metallic")
}

#[test]
fn defaults_land_on_internal_nodes() {
    let f = attach();

    assert_eq!(f.target_value("solar", "cpn-1-frequency"), Some(ParamValue::Double(2.7)));
    assert_eq!(f.target_value("solar", "cpn-2-frequency"), Some(ParamValue::Double(2.8)));
    assert_eq!(f.target_value("solar", "cpn-3-frequency"), Some(ParamValue::Double(2.1)));
    assert_eq!(f.target_value("light", "lightness"), Some(ParamValue::Double(0.0)));
    assert_eq!(f.target_value("smooth", "iterations"), Some(ParamValue::Int(2)));
    assert_eq!(f.target_value("desat", "scale"), Some(ParamValue::Double(0.0)));

    assert_eq!(f.node("solar").map(|n| n.kind()), Some("gegl:alien-map"));
    assert_eq!(f.node("light").map(|n| n.kind()), Some("gegl:hue-chroma"));
    assert_eq!(f.node("smooth").map(|n| n.kind()), Some("gegl:noise-reduction"));
}

#[test]
fn writes_are_mirrored_and_read_back() {
    let mut f = attach();
    f.set("solar2", 3.5).unwrap();
    f.set("smooth", ParamValue::Int(6)).unwrap();
    f.set("light", -4.25).unwrap();

    assert_eq!(f.get("solar2"), Some(&ParamValue::Double(3.5)));
    assert_eq!(f.target_value("solar", "cpn-2-frequency"), Some(ParamValue::Double(3.5)));
    assert_eq!(f.target_value("smooth", "iterations"), Some(ParamValue::Int(6)));
    assert_eq!(f.target_value("light", "lightness"), Some(ParamValue::Double(-4.25)));
}

#[test]
fn out_of_range_write_keeps_previous_value() {
    let mut f = attach();
    let err = f.set("solar2", 2.0).unwrap_err();
    assert_eq!(err.param(), Some("solar2"));
    assert_eq!(f.get("solar2"), Some(&ParamValue::Double(2.8)));
    assert_eq!(f.target_value("solar", "cpn-2-frequency"), Some(ParamValue::Double(2.8)));

    assert!(f.set("desaturate", 0.5).is_err());
    assert!(f.set("smooth", ParamValue::Int(9)).is_err());
    assert_eq!(f.get("smooth"), Some(&ParamValue::Int(2)));
}

#[test]
fn main_chain_has_four_primitives() {
    let f = attach();
    let topology = f.topology();
    let labels: Vec<&str> = topology
        .main_chain()
        .unwrap()
        .into_iter()
        .map(|id| topology.entry(id).label.as_str())
        .collect();
    assert_eq!(labels, ["solar", "desat", "smooth", "light"]);
}

#[test]
fn colorize_node_is_created_but_not_linked() {
    let f = attach();
    let topology = f.topology();
    let id = topology.find("ocolor").unwrap();
    assert_eq!(topology.entry(id).role, NodeRole::Detached);
    assert!(topology.links().iter().all(|l| l.from != id && l.to != id));
    assert_eq!(f.node("ocolor").map(|n| n.kind()), Some("gimp:colorize"));
}

#[test]
fn reset_restores_defaults_everywhere() {
    let mut f = attach();
    f.set("solar1", 0.5).unwrap();
    f.set("smooth", ParamValue::Int(0)).unwrap();
    f.reset().unwrap();
    assert_eq!(f.get("solar1"), Some(&ParamValue::Double(2.7)));
    assert_eq!(f.target_value("solar", "cpn-1-frequency"), Some(ParamValue::Double(2.7)));
    assert_eq!(f.target_value("smooth", "iterations"), Some(ParamValue::Int(2)));
}
