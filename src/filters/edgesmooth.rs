//! Smooths rough alpha edges: a median/blur/opacity side branch is laid
//! under the image with `dst-atop`.

use crate::{
    blueprint::Blueprint,
    error::Result,
    filter::{FilterDefinition, FilterInfo},
    schema::{ParamSchema, ParamSpec},
};

pub const NAME: &str = "lb:edgesmooth";

/// Default for the embedded graph node.
pub const DEFAULT_GRAPH: &str = "  id=1  gegl:over aux=[ ref=1  xor aux=[  ref=1  median-blur radius=2.4 alpha-percentile=2    ]  ";

const RADIUS_HELP: &str = "Neighborhood radius, a negative value will calculate with inverted percentiles";

fn radius(name: &str, default: i64, limit: f64) -> ParamSpec {
    ParamSpec::int(name, "Radius", default)
        .value_range(-limit, limit)
        .ui_range(0.0, 100.0)
        .ui_meta("unit", "pixel-distance")
        .description(RADIUS_HELP)
        .ui_meta("role", "output-extent")
}

pub fn definition() -> Result<FilterDefinition> {
    let info = FilterInfo::new(NAME, "Rough Edge Smoother")
        .categories("edge-smoother")
        .reference_hash("45ed5656a11bgxxdt27730vaefe2g4f1b2ac")
        .description("Applies a median blur and a few other things around a transparent image's edges");

    let schema = ParamSchema::new(vec![
        ParamSpec::string("string", "custom gegl graph", DEFAULT_GRAPH).ui_meta("role", "output-extent"),
        radius("radius", 2, 400.0),
        ParamSpec::double("alpha_percentile", "Alpha percentile", 2.0)
            .value_range(0.0, 100.0)
            .description("Neighborhood alpha percentile")
            .ui_meta("role", "output-extent"),
        radius("radius2", 2, 20.0),
        ParamSpec::double("percentile2", "Percentile", 1.0)
            .value_range(0.0, 100.0)
            .description("Neighborhood color percentile")
            .ui_meta("role", "output-extent"),
        ParamSpec::double("alpha_percentile2", "Median edges", 73.0)
            .value_range(0.0, 100.0)
            .description("Neighborhood alpha percentile"),
        radius("radius3", 2, 400.0),
        ParamSpec::double("gaus", "Blur Edge", 1.0)
            .description("Standard deviation for the horizontal axis")
            .value_range(0.0, 3.0)
            .ui_range(0.24, 3.0)
            .ui_gamma(3.0)
            .ui_meta("unit", "pixel-distance")
            .ui_meta("axis", "x"),
        ParamSpec::double("value", "Increase Opacity", 1.2)
            .description("Global opacity value that is always used on top of the optional auxiliary input buffer.")
            .value_range(1.0, 6.0)
            .ui_range(1.0, 3.5),
    ])?;

    let mut bp = Blueprint::new();
    let (input, output) = (bp.input(), bp.output());
    bp.detached("over", "gegl:over");
    bp.detached("xor", "gegl:xor");
    let median = bp.node("median", "gegl:median-blur");
    let median2 = bp.node("median2", "gegl:median-blur");
    let median3 = bp.detached("median3", "gegl:median-blur");
    let gaussian = bp.node("gaussian", "gegl:gaussian-blur");
    let opacity = bp.node("opacity", "gegl:opacity");
    let behind = bp.node("behind", "gegl:dst-atop");
    let graph = bp.node("graph", "gegl:gegl");

    bp.chain(&[input, graph, behind, output]);
    bp.chain(&[input, median, gaussian, opacity, median2]);
    bp.aux(median2, behind);

    bp.redirect("gaus", gaussian, "std-dev-x")
        .redirect("gaus", gaussian, "std-dev-y")
        .redirect("radius", median, "radius")
        .redirect("radius2", median2, "radius")
        .redirect("radius3", median3, "radius")
        .redirect("percentile2", median2, "percentile")
        .redirect("alpha_percentile", median, "alpha-percentile")
        .redirect("alpha_percentile2", median2, "alpha-percentile")
        .redirect("value", opacity, "value")
        .redirect("string", graph, "string");

    FilterDefinition::new(info, schema, bp)
}
