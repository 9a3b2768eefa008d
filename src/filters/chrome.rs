//! Chrome text styler. Nests the metallic and edge smoothing filters.

use crate::{
    blueprint::Blueprint,
    error::Result,
    filter::{FilterDefinition, FilterInfo},
    schema::{ParamSchema, ParamSpec},
};

use super::{edgesmooth, metallic, solarization};

pub const NAME: &str = "gegl:chrome";

pub fn definition() -> Result<FilterDefinition> {
    let info = FilterInfo::new(NAME, "Chrome metal text styler")
        .categories("artistic")
        .reference_hash("450056eat8b351dt25700ftevfe2g4fonf1c")
        .description(
            "Make metal chrome text styling effects. Works best on 100-500p text. \
             Fails on very small text and wide and excessively bold fonts.",
        );

    let schema = ParamSchema::new(vec![
        ParamSpec::color("value", "Color", "#ffb386".parse()?)
            .description("The color to paint over the input")
            .ui_meta("role", "output-extent"),
        ParamSpec::double("bvradius", "Radius of bevel (higher for larger text)", 7.0)
            .value_range(5.0, 15.0)
            .ui_range(5.0, 9.0)
            .ui_gamma(1.5),
        ParamSpec::double("bevelconfig", "Depth Angle (larger text needs lower)", 58.0)
            .description("Elevation angle (degrees)")
            .value_range(45.0, 80.0)
            .ui_meta("unit", "degree"),
        ParamSpec::double("azimuth", "Rotate Lighting to alter chrome effect", 60.0)
            .description("Light angle (degrees)")
            .value_range(28.0, 350.0)
            .ui_meta("unit", "degree")
            .ui_meta("direction", "ccw"),
        solarization("solar1", "Solarization of Red Channel", 2.7, 1, "Red frequency", "Hue frequency")
            .value_range(2.0, 2.8),
        solarization("solar2", "Solarization of Green Channel", 2.8, 2, "Green frequency", "Saturation frequency")
            .value_range(2.2, 2.8),
        solarization("solar3", "Solarization of Blue Channel", 2.1, 3, "Blue frequency", "Lightness frequency")
            .value_range(0.0, 4.0),
        ParamSpec::double("lightmetal", "Darkness to Light", 0.0)
            .description("Lightness adjustment")
            .value_range(-10.0, 7.0),
        ParamSpec::int("smoothmetal", "Smooth metal", 2)
            .description("Smoothness")
            .value_range(0.0, 7.0)
            .ui_range(0.0, 7.0),
        ParamSpec::double("glow", "Glow effect (bloom)", 6.0)
            .description("Glow strength")
            .value_range(0.0, f64::MAX)
            .ui_range(0.0, 14.0),
        ParamSpec::double("softglow", "Soft glow effect", 3.0)
            .value_range(1.0, 7.0)
            .ui_meta("unit", "pixel-distance"),
        ParamSpec::double("sharpen", "Sharpen Metal", 0.2)
            .description("Scaling factor for unsharp-mask, the strength of effect")
            .value_range(0.0, 0.9)
            .ui_range(0.0, 0.9)
            .ui_gamma(3.0),
        ParamSpec::double("smoothedge", "Median to smooth rough edges", 50.0)
            .value_range(0.0, 100.0)
            .description("Neighborhood alpha percentile"),
        ParamSpec::double("opacity", "Above 100% opacity for edges", 1.0)
            .description("Global opacity value that is always used on top of the optional auxiliary input buffer.")
            .value_range(1.0, 3.0)
            .ui_range(1.0, 3.0),
        ParamSpec::double("th", "Low looks nicer but makes unspaced text fuse", 0.210)
            .value_range(0.195, 0.230)
            .ui_range(0.195, 0.230),
    ])?;

    let mut bp = Blueprint::new();
    let (input, output) = (bp.input(), bp.output());
    let color = bp.node("color", "gegl:color-overlay");
    let bevel = bp.node("bevel", "gegl:bevel");
    let metal = bp.node("metallic", metallic::NAME);
    let glow = bp.node("glow", "gegl:bloom");
    let sharpen = bp.node("sharpen", "gegl:unsharp-mask");
    let softglow = bp.node("softglow", "gegl:softglow");
    let noise = bp.node("noisereduction", "gegl:noise-reduction");
    let edges = bp.node("smoothedge", edgesmooth::NAME);
    let opacity = bp.node("opacity", "gegl:opacity");

    bp.chain(&[
        input, color, bevel, metal, glow, sharpen, softglow, noise, edges, opacity, output,
    ]);

    bp.redirect("value", color, "value")
        .redirect("th", bevel, "th")
        .redirect("azimuth", bevel, "azimuth")
        .redirect("bvradius", bevel, "radius1")
        .redirect("bevelconfig", bevel, "bevel1")
        .redirect("solar1", metal, "solar1")
        .redirect("solar2", metal, "solar2")
        .redirect("solar3", metal, "solar3")
        .redirect("lightmetal", metal, "light")
        .redirect("smoothmetal", metal, "smooth")
        .redirect("glow", glow, "strength")
        .redirect("sharpen", sharpen, "scale")
        .redirect("softglow", softglow, "glow-radius")
        .redirect("smoothedge", edges, "alpha-percentile2")
        .redirect("opacity", opacity, "value");

    FilterDefinition::new(info, schema, bp)
}
