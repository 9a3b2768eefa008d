//! Metal effect: solarize with alien-map, then desaturate, smooth and
//! shift lightness.

use crate::{
    blueprint::Blueprint,
    error::Result,
    filter::{FilterDefinition, FilterInfo},
    schema::{ParamSchema, ParamSpec},
};

use super::solarization;

pub const NAME: &str = "gegl:metallic";

pub fn definition() -> Result<FilterDefinition> {
    let info = FilterInfo::new(NAME, "Add a metal effect to subjects")
        .categories("artistic")
        .reference_hash("45ed5656h28ff20fjf25sb2ac")
        .description("Metalize people (works best on human skin).");

    let schema = ParamSchema::new(vec![
        solarization("solar1", "Solarization of Red Channel", 2.7, 1, "Red frequency", "Hue frequency")
            .value_range(0.0, 4.0),
        solarization("solar2", "Solarization of Green Channel", 2.8, 2, "Green frequency", "Saturation frequency")
            .value_range(2.2, 4.0),
        solarization("solar3", "Solarization of Blue Channel", 2.1, 3, "Blue frequency", "Lightness frequency")
            .value_range(0.0, 4.0),
        ParamSpec::double("light", "Lightness", 0.0)
            .description("Lightness adjustment")
            .value_range(-10.0, 10.0),
        ParamSpec::int("smooth", "Smoothness", 2)
            .description("Smoothness")
            .value_range(0.0, 8.0)
            .ui_range(0.0, 8.0),
        ParamSpec::double("desaturate", "Desaturation Channel Lock", 0.0)
            .description("Pins the saturation node to full desaturation")
            .value_range(0.0, 0.0)
            .ui_range(0.0, 0.0)
            .ui_meta("role", "output-extent"),
    ])?;

    let mut bp = Blueprint::new();
    let (input, output) = (bp.input(), bp.output());
    let solar = bp.node("solar", "gegl:alien-map");
    let desat = bp.node("desat", "gegl:saturation");
    let smooth = bp.node("smooth", "gegl:noise-reduction");
    let light = bp.node("light", "gegl:hue-chroma");
    bp.detached("ocolor", "gimp:colorize");

    bp.chain(&[input, solar, desat, smooth, light, output]);

    bp.redirect("solar1", solar, "cpn-1-frequency")
        .redirect("solar2", solar, "cpn-2-frequency")
        .redirect("solar3", solar, "cpn-3-frequency")
        .redirect("desaturate", desat, "scale")
        .redirect("light", light, "lightness")
        .redirect("smooth", smooth, "iterations");

    FilterDefinition::new(info, schema, bp)
}
