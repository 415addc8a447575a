//! The vector backend: converts a [`SealLayout`] into a self-contained SVG document.  Unlike the
//! raster backend, arc text isn't transformed character by character; instead each arc gets an
//! invisible `<path>` and the characters are laid along it with `<textPath>`, at the offsets that
//! the layout engine computed.

use itertools::Itertools;
use log::debug;
use simple_xml_builder::XMLElement;

use crate::{
    config::{color_to_hex, SealConfig},
    layout::{self, ArcSide, ArcText, Emblem, SealLayout},
    V2,
};

const BACKDROP_COLOR: &str = "#FFFFFF";
const EMBLEM_GLYPH_COLOR: &str = "#FFFFFF";

/// Renders a seal as an SVG document.  This is a pure function: the same configuration always
/// produces byte-identical output.
///
/// All user-supplied text is escaped before being embedded in the markup.
pub fn render_seal_document(config: &SealConfig) -> String {
    layout::warn_ignored_settings(config);
    let layout = layout::layout_seal(config);
    debug!("Rendering {}px seal to SVG", layout.size);
    gen_svg(&layout, config).to_string()
}

/// Generate the root `<svg>` element for a seal
pub fn gen_svg(layout: &SealLayout, config: &SealConfig) -> XMLElement {
    let size_str = layout.size.to_string();
    let mut root = XMLElement::new("svg");
    root.add_attribute("width", &size_str);
    root.add_attribute("height", &size_str);
    root.add_attribute("viewBox", &format!("0 0 {} {}", size_str, size_str));
    root.add_attribute("xmlns", "http://www.w3.org/2000/svg");
    root.add_attribute("xmlns:xlink", "http://www.w3.org/1999/xlink");

    // The backdrop sits outside the group, so it's neither rotated nor faded
    if !config.no_white_background {
        let mut backdrop = XMLElement::new("rect");
        backdrop.add_attribute("x", "0");
        backdrop.add_attribute("y", "0");
        backdrop.add_attribute("width", &size_str);
        backdrop.add_attribute("height", &size_str);
        backdrop.add_attribute("fill", BACKDROP_COLOR);
        root.add_child(backdrop);
    }

    let color = color_to_hex(config.color);
    let mut group = XMLElement::new("g");
    group.add_attribute(
        "transform",
        &format!(
            "rotate({} {} {})",
            config.rotation, layout.centre.x, layout.centre.y
        ),
    );
    group.add_attribute("opacity", &config.alpha().to_string());

    if let Some(border) = layout.border {
        let mut circle = circle_elem(layout.centre, border.radius);
        circle.add_attribute("fill", "none");
        circle.add_attribute("stroke", &color);
        circle.add_attribute("stroke-width", &border.stroke_width.to_string());
        group.add_child(circle);
    }

    if let Some(company_name) = &layout.company_name {
        add_arc_text(&mut group, company_name, layout.centre, config, &color);
    }
    if let Some(seal_name) = &layout.seal_name {
        let mut text = text_elem(config, seal_name.font_size, &color);
        text.add_attribute("x", &seal_name.position.x.to_string());
        text.add_attribute("y", &seal_name.position.y.to_string());
        text.add_text(&seal_name.text);
        group.add_child(text);
    }
    if let Some(code) = &layout.code {
        add_arc_text(&mut group, code, layout.centre, config, &color);
    }

    match &layout.emblem {
        Some(Emblem::Star { vertices }) => {
            // A whitespace-delimited list of `x,y` pairs
            let coord_string = vertices
                .iter()
                .map(|vert| format!("{},{}", vert.x, vert.y))
                .join(" ");
            let mut star = XMLElement::new("polygon");
            star.add_attribute("points", &coord_string);
            star.add_attribute("fill", &color);
            group.add_child(star);
        }
        Some(Emblem::Party {
            radius,
            glyph,
            font_size,
        }) => {
            let mut disc = circle_elem(layout.centre, *radius);
            disc.add_attribute("fill", &color);
            group.add_child(disc);

            let mut text = text_elem(config, *font_size, EMBLEM_GLYPH_COLOR);
            text.add_attribute("x", &layout.centre.x.to_string());
            text.add_attribute("y", &layout.centre.y.to_string());
            text.add_attribute("font-weight", "bold");
            text.add_text(glyph);
            group.add_child(text);
        }
        None => {}
    }

    root.add_child(group);
    root
}

/// The `id` of the invisible path which the text on `side` follows
pub fn arc_path_id(side: ArcSide) -> &'static str {
    match side {
        ArcSide::Top => "companyNameArc",
        ArcSide::Bottom => "codeArc",
    }
}

/// Adds the path for some arc text, followed by a group containing its characters.  Every
/// character is its own `<text>` whose `startOffset` is that character's distance along the path,
/// so that each glyph is centred exactly where the layout engine placed it.
fn add_arc_text(
    parent: &mut XMLElement,
    text: &ArcText,
    centre: V2,
    config: &SealConfig,
    color: &str,
) {
    let path_id = arc_path_id(text.side);
    let path = text.path(centre);
    let mid_offset = path.length() / 2.0;

    let mut path_elem = XMLElement::new("path");
    path_elem.add_attribute("id", path_id);
    path_elem.add_attribute("d", &path.svg_path_str());
    path_elem.add_attribute("fill", "none");
    path_elem.add_attribute("stroke", "none");
    parent.add_child(path_elem);

    let href = format!("#{}", path_id);
    let mut chars = XMLElement::new("g");
    add_text_style_attrs(&mut chars, config, text.font_size, color);
    for c in &text.chars {
        let mut text_path = XMLElement::new("textPath");
        text_path.add_attribute("href", &href);
        text_path.add_attribute("xlink:href", &href);
        text_path.add_attribute(
            "startOffset",
            &(mid_offset + text.offset_from_mid(c)).to_string(),
        );
        text_path.add_text(&c.ch.to_string());

        let mut char_elem = XMLElement::new("text");
        char_elem.add_child(text_path);
        chars.add_child(char_elem);
    }
    parent.add_child(chars);
}

/// Creates a `<text>` element carrying the seal's text styling, centred on its position
fn text_elem(config: &SealConfig, font_size: f32, fill: &str) -> XMLElement {
    let mut text = XMLElement::new("text");
    add_text_style_attrs(&mut text, config, font_size, fill);
    text
}

/// Add SVG attributes which style all text inside `xml_elem`.  Text is anchored on its centre,
/// both horizontally and vertically.
fn add_text_style_attrs(
    xml_elem: &mut XMLElement,
    config: &SealConfig,
    font_size: f32,
    fill: &str,
) {
    xml_elem.add_attribute("font-family", &config.font);
    xml_elem.add_attribute("font-size", &format!("{}px", font_size));
    xml_elem.add_attribute("fill", fill);
    xml_elem.add_attribute("text-anchor", "middle");
    xml_elem.add_attribute("dominant-baseline", "middle");
}

fn circle_elem(centre: V2, radius: f32) -> XMLElement {
    let mut circle = XMLElement::new("circle");
    circle.add_attribute("cx", &centre.x.to_string());
    circle.add_attribute("cy", &centre.y.to_string());
    circle.add_attribute("r", &radius.to_string());
    circle
}
