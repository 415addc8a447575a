//! The layout engine: pure functions which turn a [`SealConfig`] into the positions, angles and
//! radii of everything drawn on the seal.  Nothing in here draws anything; both backends consume
//! the [`SealLayout`] produced by [`layout_seal`], so they can never disagree about where a
//! character goes.

use angle::{Angle, Deg, Rad};
use itertools::Itertools;
use log::{trace, warn};

use crate::{
    config::{CenterMark, SealConfig},
    utils::{self, CircularArc},
    V2,
};

/// The seal size that all the other proportions were tuned against
pub const REFERENCE_SEAL_SIZE: f32 = 160.0;

/// Angle available to the company name along the top arc
pub const COMPANY_ARC_ANGLE: Deg<f32> = Deg(160.0);
/// Angle available to the code along the bottom arc
pub const CODE_ARC_ANGLE: Deg<f32> = Deg(100.0);

// Font sizes, as multiples of `SealConfig::font_size`
pub const COMPANY_FONT_SCALE: f32 = 1.0;
pub const SEAL_NAME_FONT_SCALE: f32 = 0.8;
pub const CODE_FONT_SCALE: f32 = 0.5;

/// How far the seal name sits below the centre, as a multiple of the seal size
pub const SEAL_NAME_OFFSET: f32 = (120.0 - 80.0) / REFERENCE_SEAL_SIZE;

const GLYPH_INSET: f32 = 0.7; // multiples of the font size
const SPACING_ANGLE_FACTOR: f32 = 0.1;
const EMBLEM_RADIUS: f32 = 20.0 / REFERENCE_SEAL_SIZE; // multiples of the seal size
const STAR_POINTS: usize = 5;

// The party emblem is a placeholder: a disc with one glyph on it
pub const PARTY_DISC_SCALE: f32 = 0.8; // multiples of the emblem's outer radius
pub const PARTY_GLYPH_SCALE: f32 = 0.8; // multiples of the disc radius
pub const PARTY_GLYPH: &str = "党";

/// The geometry of everything on a seal, in the seal's own (unrotated) pixel space
#[derive(Debug, Clone)]
pub struct SealLayout {
    /// Side length of the square image
    pub size: f32,
    pub centre: V2,
    pub border: Option<BorderGeometry>,
    pub company_name: Option<ArcText>,
    pub seal_name: Option<CentredText>,
    pub code: Option<ArcText>,
    pub emblem: Option<Emblem>,
}

/// The ring drawn around the edge of the seal
#[derive(Debug, Clone, Copy)]
pub struct BorderGeometry {
    pub radius: f32,
    pub stroke_width: f32,
}

/// Which arc some text runs along.  These are mirror images: text on the top arc runs clockwise
/// and text on the bottom arc runs anti-clockwise, so that both read left-to-right with the tops
/// of the glyphs facing outwards (top) or inwards (bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArcSide {
    Top,
    Bottom,
}

impl ArcSide {
    /// The angle around which the text is centred
    pub fn centre_angle(self) -> Deg<f32> {
        match self {
            ArcSide::Top => Deg(-90.0),
            ArcSide::Bottom => Deg(90.0),
        }
    }

    /// `1.0` if successive characters advance clockwise, `-1.0` if they advance anti-clockwise
    pub fn direction(self) -> f32 {
        match self {
            ArcSide::Top => 1.0,
            ArcSide::Bottom => -1.0,
        }
    }

    /// What's added to a character's angle to get the rotation that stands it upright
    fn tangent_offset(self) -> Deg<f32> {
        match self {
            ArcSide::Top => Deg(90.0),
            ArcSide::Bottom => Deg(-90.0),
        }
    }
}

/// A single character placed on an arc
#[derive(Debug, Clone, Copy)]
pub struct PlacedChar {
    pub ch: char,
    /// Where the character sits on the circle
    pub angle: Deg<f32>,
    /// The centre of the character's glyph
    pub position: V2,
    /// How far the glyph must be rotated (clockwise) to lie tangent to the arc
    pub rotation: Deg<f32>,
}

/// A text field laid out along an arc
#[derive(Debug, Clone)]
pub struct ArcText {
    pub side: ArcSide,
    pub font_size: f32,
    /// Radius of the circle through the centres of the glyphs
    pub radius: f32,
    /// Angle between the first and last characters
    pub spread: Deg<f32>,
    pub chars: Vec<PlacedChar>,
}

impl ArcText {
    /// The arc which this text follows, running in reading order and centred on the middle of the
    /// text.  It overhangs the first and last characters by roughly a glyph so that neither end
    /// falls off the path.  Widely spaced text can wind around the circle more than once, in
    /// which case so does the path.
    pub fn path(&self, centre: V2) -> CircularArc {
        let overhang = Rad(self.font_size / self.radius).to_deg().0;
        let span = self.spread.0.abs() + 2.0 * overhang;
        CircularArc::centred_on(
            centre,
            self.radius,
            self.side.centre_angle(),
            Deg(span),
            self.side == ArcSide::Top,
        )
    }

    /// The signed distance, along the arc, from the middle of the text to `c`
    pub fn offset_from_mid(&self, c: &PlacedChar) -> f32 {
        let swept = (c.angle.0 - self.side.centre_angle().0) * self.side.direction();
        Deg(swept).to_rad().0 * self.radius
    }
}

/// A single line of horizontal text, centred on a point
#[derive(Debug, Clone)]
pub struct CentredText {
    pub text: String,
    pub position: V2,
    pub font_size: f32,
}

/// The mark drawn in the middle of the seal
#[derive(Debug, Clone)]
pub enum Emblem {
    /// A filled polygon
    Star { vertices: Vec<V2> },
    /// A filled disc with a glyph drawn on top of it
    Party {
        radius: f32,
        glyph: &'static str,
        font_size: f32,
    },
}

/// Radii of the centre emblem
#[derive(Debug, Clone, Copy)]
pub struct EmblemGeometry {
    pub outer_radius: f32,
    /// Only used by the star
    pub inner_radius: f32,
}

/// Compute the full layout of a seal
pub fn layout_seal(config: &SealConfig) -> SealLayout {
    let size = config.seal_size.max(0.0);
    let centre = V2::new(size / 2.0, size / 2.0);

    let layout = SealLayout {
        size,
        centre,
        border: border_geometry(config),
        company_name: arc_text(
            &config.company_name,
            config,
            ArcSide::Top,
            COMPANY_ARC_ANGLE,
            COMPANY_FONT_SCALE,
        ),
        seal_name: seal_name(config),
        code: arc_text(
            &config.code,
            config,
            ArcSide::Bottom,
            CODE_ARC_ANGLE,
            CODE_FONT_SCALE,
        ),
        emblem: emblem(config, centre),
    };
    trace!("{:?}", layout);
    layout
}

/// Log a warning for every setting which won't be rendered as written
pub(crate) fn warn_ignored_settings(config: &SealConfig) {
    for message in config.ignored_settings().into_iter().chain(clamped_radii(config)) {
        warn!("{}", message);
    }
}

/// Describes every radius which has to be clamped to zero because the rings and text don't fit
/// inside the seal
fn clamped_radii(config: &SealConfig) -> Vec<String> {
    let raw_text_radius = (config.seal_size - config.border_width) / 2.0 - config.ring_padding;
    if raw_text_radius < 0.0 {
        return vec![format!(
            "Border and ring padding leave no room for text (text radius {}); clamping to 0",
            raw_text_radius
        )];
    }
    let fields = [
        ("company name", &config.company_name, COMPANY_FONT_SCALE),
        ("code", &config.code, CODE_FONT_SCALE),
    ];
    fields
        .iter()
        .filter(|(_, text, _)| !text.is_empty())
        .filter_map(|&(name, _, font_scale)| {
            let raw_radius = raw_text_radius - scaled_font_size(config, font_scale) * GLYPH_INSET;
            (raw_radius < 0.0).then(|| {
                format!(
                    "The {}'s font is too large for its ring (glyph radius {}); not drawing it",
                    name, raw_radius
                )
            })
        })
        .collect_vec()
}

/// The border ring, or `None` if no border should be drawn
pub fn border_geometry(config: &SealConfig) -> Option<BorderGeometry> {
    if !(config.border_width > 0.0) {
        return None;
    }
    let radius = (config.seal_size - config.border_width) / 2.0;
    (radius > 0.0).then(|| BorderGeometry {
        radius,
        stroke_width: config.border_width,
    })
}

/// The radius of the circle which arc text is laid out against, clamped to be non-negative
pub fn text_radius(config: &SealConfig) -> f32 {
    let radius = (config.seal_size - config.border_width) / 2.0 - config.ring_padding;
    // `f32::max` ignores NaN, so this is also non-negative for nonsense inputs
    radius.max(0.0)
}

/// The actual font size of some text, given its size relative to the company name
pub fn scaled_font_size(config: &SealConfig, font_scale: f32) -> f32 {
    config.font_size * font_scale * (config.seal_size / REFERENCE_SEAL_SIZE)
}

/// The radius at which glyphs of a given size are centred.  This is pulled in from the text
/// radius so that the glyphs sit inside it.
pub fn glyph_radius(config: &SealConfig, font_size: f32) -> f32 {
    (text_radius(config) - font_size * GLYPH_INSET).max(0.0)
}

/// Angle between the first and last of `num_chars` characters spread along an arc
fn arc_spread(
    num_chars: usize,
    config: &SealConfig,
    available_angle: Deg<f32>,
    font_size: f32,
) -> Deg<f32> {
    if num_chars <= 1 {
        return Deg(0.0);
    }
    let gaps = (num_chars - 1) as f32;
    let angle_per_char = available_angle.0 / num_chars as f32;
    // Spacing is an angular adjustment proportional to the font size and inversely proportional
    // to the radius, so that bigger seals need less angle per unit of spacing
    let radius = text_radius(config);
    let spacing = if radius > 0.0 {
        let angle_per_unit = Rad(font_size / radius).to_deg().0 * SPACING_ANGLE_FACTOR;
        config.character_spacing * gaps * angle_per_unit
    } else {
        0.0
    };
    Deg(angle_per_char * gaps + spacing)
}

/// Places every character of `text` on the arc on the given `side` of the seal.  The characters
/// are centred on the side's centre angle, and spread evenly across (roughly) `available_angle`.
pub fn arc_character_positions(
    text: &str,
    config: &SealConfig,
    side: ArcSide,
    available_angle: Deg<f32>,
    font_scale: f32,
) -> Vec<PlacedChar> {
    let chars = text.chars().collect_vec();
    let num_chars = chars.len();
    let font_size = scaled_font_size(config, font_scale);
    let spread = arc_spread(num_chars, config, available_angle, font_size);

    let centre_angle = side.centre_angle().0;
    let seal_centre = V2::new(config.seal_size / 2.0, config.seal_size / 2.0);
    let radius = glyph_radius(config, font_size);
    // Walk from one end of the spread to the other, in reading order
    let start_angle = centre_angle - side.direction() * spread.0 / 2.0;
    let step = if num_chars > 1 {
        side.direction() * spread.0 / (num_chars - 1) as f32
    } else {
        0.0
    };

    chars
        .into_iter()
        .enumerate()
        .map(|(i, ch)| {
            let angle = if num_chars > 1 {
                Deg(start_angle + i as f32 * step)
            } else {
                Deg(centre_angle)
            };
            let placed = PlacedChar {
                ch,
                angle,
                position: utils::polar(seal_centre, radius, angle),
                rotation: Deg(angle.0 + side.tangent_offset().0),
            };
            trace!("Placed {:?} at {}°", ch, angle.0);
            placed
        })
        .collect_vec()
}

/// Lays out a text field along an arc, returning `None` if there's nothing visible to draw
fn arc_text(
    text: &str,
    config: &SealConfig,
    side: ArcSide,
    available_angle: Deg<f32>,
    font_scale: f32,
) -> Option<ArcText> {
    let font_size = scaled_font_size(config, font_scale);
    let radius = glyph_radius(config, font_size);
    if text.is_empty() || !(font_size > 0.0) || !(radius > 0.0) {
        return None;
    }
    let chars = arc_character_positions(text, config, side, available_angle, font_scale);
    Some(ArcText {
        side,
        font_size,
        radius,
        spread: arc_spread(chars.len(), config, available_angle, font_size),
        chars,
    })
}

fn seal_name(config: &SealConfig) -> Option<CentredText> {
    let font_size = scaled_font_size(config, SEAL_NAME_FONT_SCALE);
    if config.seal_name.is_empty() || !(font_size > 0.0) {
        return None;
    }
    let centre = config.seal_size / 2.0;
    Some(CentredText {
        text: config.seal_name.clone(),
        position: V2::new(centre, centre + config.seal_size * SEAL_NAME_OFFSET),
        font_size,
    })
}

/// The radii of the centre emblem.  The party emblem's disc is [`PARTY_DISC_SCALE`] times the
/// outer radius.
pub fn emblem_geometry(config: &SealConfig) -> EmblemGeometry {
    let outer_radius = config.seal_size * EMBLEM_RADIUS * (config.sign_scale / 100.0);
    EmblemGeometry {
        outer_radius,
        inner_radius: outer_radius / 2.0,
    }
}

/// The vertices of a five-pointed star with its top point straight up, alternating between the
/// outer and inner radius.
pub fn star_vertices(centre: V2, geometry: EmblemGeometry) -> Vec<V2> {
    let step = 360.0 / (STAR_POINTS * 2) as f32;
    (0..STAR_POINTS * 2)
        .map(|i| {
            let radius = if i % 2 == 0 {
                geometry.outer_radius
            } else {
                geometry.inner_radius
            };
            utils::polar(centre, radius, Deg(-90.0 + i as f32 * step))
        })
        .collect_vec()
}

fn emblem(config: &SealConfig, centre: V2) -> Option<Emblem> {
    let geometry = emblem_geometry(config);
    if !(geometry.outer_radius > 0.0) {
        return None;
    }
    match config.center_mark {
        CenterMark::Star => Some(Emblem::Star {
            vertices: star_vertices(centre, geometry),
        }),
        CenterMark::Party => {
            let radius = geometry.outer_radius * PARTY_DISC_SCALE;
            Some(Emblem::Party {
                radius,
                glyph: PARTY_GLYPH,
                font_size: radius * PARTY_GLYPH_SCALE,
            })
        }
        CenterMark::None | CenterMark::Unknown(_) => None,
    }
}
