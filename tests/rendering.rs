use rgb::RGB8;
use sealgen::{
    layout::{self, ArcSide},
    raster::DrawCommand,
    render_seal, render_seal_document, CenterMark, RecordingSurface, SealConfig, V2,
};

const TOLERANCE: f32 = 1e-2; // degrees or pixels

fn assert_close(a: f32, b: f32) {
    assert!((a - b).abs() < TOLERANCE, "{} != {}", a, b);
}

/// Difference between two angles in degrees, normalised to `-180..180`
fn angle_diff(a: f32, b: f32) -> f32 {
    (a - b + 540.0).rem_euclid(360.0) - 180.0
}

fn angle_around(centre: V2, pt: V2) -> f32 {
    (pt.y - centre.y).atan2(pt.x - centre.x).to_degrees()
}

fn scenario_a() -> SealConfig {
    SealConfig {
        company_name: "ABC".to_owned(),
        seal_name: "X".to_owned(),
        code: "123".to_owned(),
        seal_size: 160.0,
        border_width: 8.0,
        ring_padding: 3.0,
        center_mark: CenterMark::None,
        rotation: 0.0,
        opacity: 100.0,
        color: RGB8::new(255, 0, 0),
        ..SealConfig::default()
    }
}

fn render_to_recording(config: &SealConfig) -> RecordingSurface {
    let size = config.seal_size.round() as u32;
    let mut surface = RecordingSurface::new(size, size);
    render_seal(&mut surface, config).unwrap();
    surface
}

/////////////////
// SVG PARSING //
/////////////////

/// Returns the value of attribute `name` in the markup of a single element
fn attr<'a>(elem: &'a str, name: &str) -> &'a str {
    let key = format!(" {}=\"", name);
    let start = elem.find(&key).unwrap_or_else(|| panic!("No {} in {}", name, elem)) + key.len();
    let len = elem[start..].find('"').unwrap();
    &elem[start..start + len]
}

/// The start tag of the element whose `id` is `id`
fn elem_with_id<'a>(doc: &'a str, id: &str) -> &'a str {
    let id_pos = doc.find(&format!("id=\"{}\"", id)).unwrap();
    let start = doc[..id_pos].rfind('<').unwrap();
    let end = id_pos + doc[id_pos..].find('>').unwrap();
    &doc[start..=end]
}

/// `(startOffset, text)` of each `<textPath>` following the path with the given `id`
fn text_path_offsets(doc: &str, id: &str) -> Vec<(f32, String)> {
    let after_path = &doc[doc.find(&format!("id=\"{}\"", id)).unwrap()..];
    let group_end = after_path.find("</g>").unwrap();
    let group = &after_path[..group_end];

    let mut offsets = Vec::new();
    let mut rest = group;
    while let Some(start) = rest.find("<textPath") {
        let tag_end = start + rest[start..].find('>').unwrap();
        let close = tag_end + rest[tag_end..].find("</textPath>").unwrap();
        let offset = attr(&rest[start..=tag_end], "startOffset").parse().unwrap();
        offsets.push((offset, rest[tag_end + 1..close].to_owned()));
        rest = &rest[close..];
    }
    offsets
}

/// The circle, direction and extent described by an arc path's `d` attribute.  The path is a
/// move followed by any number of arc segments, each sweeping less than half a turn.
struct ParsedArc {
    radius: f32,
    clockwise: bool,
    start_angle: f32,
    length: f32,
}

fn parse_arc(d: &str, centre: V2) -> ParsedArc {
    let tokens = d.split_whitespace().collect::<Vec<_>>();
    let num = |i: usize| -> f32 { tokens[i].parse().unwrap() };
    assert_eq!(tokens[0], "M");
    assert_eq!((tokens.len() - 3) % 8, 0);

    let angles = std::iter::once(3)
        .chain((3..tokens.len()).step_by(8).map(|i| i + 8))
        .map(|end| angle_around(centre, V2::new(num(end - 2), num(end - 1))))
        .collect::<Vec<_>>();
    let swept = angles
        .windows(2)
        .map(|pair| angle_diff(pair[1], pair[0]).abs())
        .sum::<f32>();
    assert_eq!(tokens[3], "A");
    let radius = num(4);
    ParsedArc {
        radius,
        clockwise: tokens[8] == "1",
        start_angle: angles[0],
        length: swept.to_radians() * radius,
    }
}

impl ParsedArc {
    /// The angle reached after travelling `offset` along the path from its start
    fn angle_at(&self, offset: f32) -> f32 {
        let direction = if self.clockwise { 1.0 } else { -1.0 };
        self.start_angle + direction * (offset / self.radius).to_degrees()
    }
}

///////////
// TESTS //
///////////

#[test]
fn scenario_a_geometry() {
    let config = scenario_a();
    assert_close(layout::border_geometry(&config).unwrap().radius, 76.0);
    assert_close(layout::text_radius(&config), 73.0);

    let surface = render_to_recording(&config);
    let border = surface
        .commands()
        .iter()
        .find_map(|c| match &c.command {
            DrawCommand::StrokePath { path, style } => Some((path.clone(), style.clone())),
            _ => None,
        })
        .unwrap();
    assert_close(border.1.line_width, 8.0);
    assert_eq!(border.1.stroke_color, RGB8::new(255, 0, 0));
    match border.0.segments()[0] {
        sealgen::raster::PathSegment::Arc { radius, centre, .. } => {
            assert_close(radius, 76.0);
            assert_close(centre.x, 80.0);
            assert_close(centre.y, 80.0);
        }
        other => panic!("Border should be a circle, got {:?}", other),
    }

    let doc = render_seal_document(&config);
    assert!(doc.contains(r#"r="76""#));
    assert!(doc.contains(r##"stroke="#FF0000""##));
}

#[test]
fn scenario_b_single_character_on_top() {
    let config = SealConfig {
        company_name: "A".to_owned(),
        character_spacing: 0.0,
        ..scenario_a()
    };
    let chars = layout::arc_character_positions(
        "A",
        &config,
        ArcSide::Top,
        layout::COMPANY_ARC_ANGLE,
        layout::COMPANY_FONT_SCALE,
    );
    assert_eq!(chars[0].angle.0, -90.0);

    // The vector backend places it on the midpoint of its path
    let doc = render_seal_document(&config);
    let arc = parse_arc(attr(elem_with_id(&doc, "companyNameArc"), "d"), V2::new(80.0, 80.0));
    let offsets = text_path_offsets(&doc, "companyNameArc");
    assert_eq!(offsets.len(), 1);
    assert_close(angle_diff(arc.angle_at(offsets[0].0), -90.0), 0.0);
}

#[test]
fn scenario_c_backdrop_ignores_opacity() {
    let config = SealConfig {
        opacity: 0.0,
        no_white_background: false,
        center_mark: CenterMark::Star,
        ..scenario_a()
    };
    let surface = render_to_recording(&config);
    let (backdrop, rest) = surface.commands().split_first().unwrap();
    assert!(matches!(
        backdrop.command,
        DrawCommand::FillRect { color, .. } if color == RGB8::new(255, 255, 255)
    ));
    assert_eq!(backdrop.alpha, 1.0);
    assert!(!rest.is_empty());
    for cmd in rest {
        assert_eq!(cmd.alpha, 0.0, "{:?} should be fully transparent", cmd.command);
    }

    let doc = render_seal_document(&config);
    let rect = &doc[doc.find("<rect").unwrap()..];
    assert!(!rect[..rect.find('>').unwrap()].contains("opacity"));
    assert!(doc.contains(r#"opacity="0""#));
}

#[test]
fn no_backdrop_in_either_backend() {
    let config = SealConfig {
        no_white_background: true,
        ..scenario_a()
    };
    let surface = render_to_recording(&config);
    assert!(!surface
        .commands()
        .iter()
        .any(|c| matches!(c.command, DrawCommand::FillRect { .. })));
    assert!(!render_seal_document(&config).contains("<rect"));
}

#[test]
fn scenario_d_star_emblem() {
    let config = SealConfig {
        center_mark: CenterMark::Star,
        sign_scale: 200.0,
        seal_size: 160.0,
        ..SealConfig::default()
    };
    let geometry = layout::emblem_geometry(&config);
    assert_close(geometry.outer_radius, 40.0);
    assert_close(geometry.inner_radius, 20.0);

    let surface = render_to_recording(&config);
    let star = surface
        .commands()
        .iter()
        .find_map(|c| match &c.command {
            DrawCommand::FillPath { path, .. } => Some(path.clone()),
            _ => None,
        })
        .unwrap();
    // Move to the apex, then 9 more vertices, then close
    assert_eq!(star.segments().len(), 11);
    match star.segments()[0] {
        sealgen::raster::PathSegment::MoveTo(apex) => {
            assert_close(apex.x, 80.0);
            assert_close(apex.y, 40.0);
        }
        other => panic!("Star should start at its apex, got {:?}", other),
    }

    let doc = render_seal_document(&config);
    let polygon = &doc[doc.find("<polygon").unwrap()..];
    let points = attr(&polygon[..polygon.find('>').unwrap() + 1], "points");
    assert_eq!(points.split_whitespace().count(), 10);
}

#[test]
fn vector_output_is_idempotent() {
    for config in &[SealConfig::default(), scenario_a()] {
        assert_eq!(render_seal_document(config), render_seal_document(config));
    }
}

/// Checks that every arc character sits on the SVG path at the same angle that the raster
/// backend draws it at
fn assert_backends_agree(config: &SealConfig) {
    let centre = V2::new(config.seal_size / 2.0, config.seal_size / 2.0);
    let layout = layout::layout_seal(config);
    let doc = render_seal_document(config);
    let surface = render_to_recording(config);

    let raster_chars = surface
        .commands()
        .iter()
        .filter_map(|c| match &c.command {
            DrawCommand::FillText { text, .. } => Some((text.clone(), c.transform)),
            _ => None,
        })
        .collect::<Vec<_>>();

    let company_name = layout.company_name.unwrap();
    // The code is drawn after the company name and seal name
    let code_start = company_name.chars.len() + layout.seal_name.iter().count();
    let fields = [
        ("companyNameArc", company_name, 0),
        ("codeArc", layout.code.unwrap(), code_start),
    ];
    for (id, arc_text, raster_start) in fields.iter() {
        let arc = parse_arc(attr(elem_with_id(&doc, id), "d"), centre);
        assert_close(arc.radius, arc_text.radius);
        let offsets = text_path_offsets(&doc, id);
        assert_eq!(offsets.len(), arc_text.chars.len());

        for (i, (placed, (offset, text))) in arc_text.chars.iter().zip(&offsets).enumerate() {
            // Vector backend: the character must be on the path, at the right angle
            assert_eq!(text, &placed.ch.to_string());
            assert!(
                (0.0..=arc.length).contains(offset),
                "{} at offset {} is off the {}px path",
                text,
                offset,
                arc.length
            );
            assert_close(angle_diff(arc.angle_at(*offset), placed.angle.0), 0.0);

            // Raster backend: where the glyph origin lands, and how it's rotated
            let (raster_text, transform) = &raster_chars[raster_start + i];
            assert_eq!(raster_text, text);
            let origin = transform.apply(V2::new(0.0, 0.0));
            assert_close(angle_diff(angle_around(centre, origin), placed.angle.0), 0.0);
            assert_close(angle_diff(transform.rotation_angle().0, placed.rotation.0), 0.0);
        }
    }
}

#[test]
fn backends_agree_on_arc_character_angles() {
    for &(spacing, seal_size) in &[(0.0, 160.0), (10.0, 160.0), (-6.0, 220.0), (4.0, 300.0)] {
        assert_backends_agree(&SealConfig {
            company_name: "示例公司名称ABC".to_owned(),
            code: "1234567890".to_owned(),
            character_spacing: spacing,
            seal_size,
            ..SealConfig::default()
        });
    }
}

#[test]
fn backends_agree_when_text_winds_past_a_full_turn() {
    let configs = [
        SealConfig {
            company_name: "ABCDEFGHIJ".to_owned(),
            character_spacing: 30.0,
            ..SealConfig::default()
        },
        SealConfig {
            company_name: "上海市浦东新区示例科技发展有限公司".to_owned(),
            ..SealConfig::default()
        },
    ];
    for config in &configs {
        let spread = layout::layout_seal(config).company_name.unwrap().spread;
        assert!(spread.0 > 359.0, "spread is only {}°", spread.0);
        assert_backends_agree(config);
    }
}

#[test]
fn rotation_is_applied_to_the_whole_seal() {
    let config = SealConfig {
        rotation: 90.0,
        ..scenario_a()
    };
    let surface = render_to_recording(&config);
    let seal_name = surface
        .commands()
        .iter()
        .find(|c| matches!(&c.command, DrawCommand::FillText { text, .. } if text == "X"))
        .unwrap();
    // The seal name sits 40px below the centre; rotating by 90° clockwise moves it to the left
    let position = match &seal_name.command {
        DrawCommand::FillText { position, .. } => seal_name.transform.apply(*position),
        _ => unreachable!(),
    };
    assert_close(position.x, 40.0);
    assert_close(position.y, 80.0);

    // Per-character transforms don't leak into the seal name
    assert_close(seal_name.transform.rotation_angle().0, 90.0);
}

#[test]
fn text_is_escaped_in_vector_output() {
    let config = SealConfig {
        company_name: "<&>".to_owned(),
        seal_name: "<script>alert(1)</script>".to_owned(),
        code: "a&b".to_owned(),
        ..SealConfig::default()
    };
    let doc = render_seal_document(&config);
    assert!(!doc.contains("<script>"));
    assert!(doc.contains("&lt;script&gt;"));
    assert!(doc.contains("&amp;"));
    assert!(!doc.contains("a&b"));
}

#[test]
fn empty_fields_draw_nothing() {
    let config = SealConfig {
        company_name: String::new(),
        seal_name: String::new(),
        code: String::new(),
        center_mark: CenterMark::None,
        border_width: 0.0,
        no_white_background: true,
        ..SealConfig::default()
    };
    assert!(render_to_recording(&config).commands().is_empty());

    let doc = render_seal_document(&config);
    assert!(!doc.contains("<text"));
    assert!(!doc.contains("<path"));
    assert!(!doc.contains("<circle"));
}

#[test]
fn unknown_center_mark_renders_like_none() {
    let unknown = SealConfig {
        center_mark: CenterMark::Unknown("dragon".to_owned()),
        ..SealConfig::default()
    };
    let none = SealConfig {
        center_mark: CenterMark::None,
        ..SealConfig::default()
    };
    assert_eq!(render_seal_document(&unknown), render_seal_document(&none));
}

#[test]
fn config_json_round_trip_renders_identically() {
    let config = scenario_a();
    let reloaded = SealConfig::from_json(&config.to_json().unwrap()).unwrap();
    assert_eq!(reloaded, config);
    assert_eq!(render_seal_document(&reloaded), render_seal_document(&config));
}
