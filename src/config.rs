//! The declarative description of a seal.  A [`SealConfig`] is the only input to the renderers;
//! it is re-created wholesale by the caller for every render and never mutated by the engine.

use std::fmt::{Display, Formatter};

use rgb::RGB8;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Everything needed to render a seal.  Lengths are in pixels, angles in degrees, and percentages
/// are out of 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SealConfig {
    /// Rendered along the top arc
    pub company_name: String,
    /// Rendered horizontally, slightly below the centre
    pub seal_name: String,
    /// Rendered along the bottom arc
    pub code: String,

    /// Font face name, resolved by whatever draws the glyphs
    pub font: String,
    /// Font size of the company name on a 160px seal.  All other text is sized relative to this.
    pub font_size: f32,
    /// Reserved: accepted and stored, but not used by the layout
    pub font_height: f32,
    /// Widens (positive) or narrows (negative) the angular spread of arc text
    pub character_spacing: f32,
    /// Inset of the text circle from the border
    pub ring_padding: f32,
    /// Width of the border ring.  `0` means no border is drawn
    pub border_width: f32,

    pub center_mark: CenterMark,
    /// Size of the centre emblem, as a percentage of its default size
    pub sign_scale: f32,

    /// Side length of the (square) output
    pub seal_size: f32,
    /// Space the caller leaves around the seal when presenting it.  Never drawn by the engine.
    pub margin: f32,
    /// Clockwise rotation of the whole seal about its centre
    pub rotation: f32,
    /// Colour of the border, text and emblem
    #[serde(with = "hex_color")]
    pub color: RGB8,

    /// Reserved: accepted and stored, but currently renders nothing
    pub ring_anti_counterfeiting: bool,
    /// If `true`, no opaque white backdrop is drawn behind the seal
    pub no_white_background: bool,
    /// Opacity of everything except the backdrop
    pub opacity: f32,
    /// Reserved: accepted and stored, but currently renders nothing
    pub effect: Effect,
}

impl SealConfig {
    /// Parses a configuration from its JSON form.  Fields missing from the JSON take their
    /// default values.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialises this configuration to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the invariants that a well-formed configuration should satisfy.  The renderers
    /// don't require this to pass (they clamp out-of-range values instead), but callers that
    /// accept configurations from users should reject anything this rejects.
    pub fn validate(&self) -> Result<()> {
        let numbers = [
            ("fontSize", self.font_size),
            ("fontHeight", self.font_height),
            ("characterSpacing", self.character_spacing),
            ("ringPadding", self.ring_padding),
            ("borderWidth", self.border_width),
            ("signScale", self.sign_scale),
            ("sealSize", self.seal_size),
            ("margin", self.margin),
            ("rotation", self.rotation),
            ("opacity", self.opacity),
        ];
        if let Some((name, value)) = numbers.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::InvalidConfig(format!("{} must be finite, got {}", name, value)));
        }

        let positive = [
            ("sealSize", self.seal_size),
            ("fontSize", self.font_size),
            ("signScale", self.sign_scale),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(Error::InvalidConfig(format!("{} must be > 0, got {}", name, value)));
            }
        }

        let non_negative = [
            ("borderWidth", self.border_width),
            ("ringPadding", self.ring_padding),
            ("margin", self.margin),
        ];
        for (name, value) in non_negative {
            if value < 0.0 {
                return Err(Error::InvalidConfig(format!("{} must be >= 0, got {}", name, value)));
            }
        }

        if !(0.0..=100.0).contains(&self.opacity) {
            return Err(Error::InvalidConfig(format!(
                "opacity must be between 0 and 100, got {}",
                self.opacity
            )));
        }
        Ok(())
    }

    /// The opacity as an alpha multiplier, clamped to `0.0..=1.0`
    pub fn alpha(&self) -> f32 {
        let alpha = self.opacity / 100.0;
        if alpha.is_nan() {
            return 1.0;
        }
        alpha.clamp(0.0, 1.0)
    }

    /// Describes every setting which won't be rendered exactly as written: features which are
    /// accepted but not implemented, and out-of-range values which the renderers clamp.
    pub(crate) fn ignored_settings(&self) -> Vec<String> {
        let mut ignored = Vec::new();
        if self.effect != Effect::None {
            ignored.push(format!(
                "Seal effect '{}' is not implemented; rendering without it",
                self.effect
            ));
        }
        if self.ring_anti_counterfeiting {
            ignored.push(
                "Anti-counterfeiting ring is not implemented; rendering without it".to_owned(),
            );
        }
        if !(0.0..=100.0).contains(&self.opacity) {
            ignored.push(format!(
                "Opacity {} is outside 0..=100; clamping to {}",
                self.opacity,
                self.alpha() * 100.0
            ));
        }
        ignored
    }
}

impl Default for SealConfig {
    fn default() -> Self {
        Self {
            company_name: "示例公司名称".to_owned(),
            seal_name: "专用章".to_owned(),
            code: "1234567890".to_owned(),

            font: "SimSun".to_owned(),
            font_size: 24.0,
            font_height: 150.0,
            character_spacing: 10.0,
            ring_padding: 3.0,
            border_width: 8.0,

            center_mark: CenterMark::Star,
            sign_scale: 100.0,

            seal_size: 160.0,
            margin: 0.0,
            rotation: 0.0,
            color: RGB8::new(255, 0, 0),

            ring_anti_counterfeiting: false,
            no_white_background: false,
            opacity: 100.0,
            effect: Effect::None,
        }
    }
}

/// The emblem drawn in the middle of the seal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CenterMark {
    None,
    /// A five-pointed star
    Star,
    /// A filled disc carrying a single bold glyph
    Party,
    /// A mark this version doesn't know how to draw.  Kept so that it survives a round trip
    /// through JSON, but rendered the same as [`CenterMark::None`].
    Unknown(String),
}

impl From<String> for CenterMark {
    fn from(s: String) -> Self {
        match s.as_str() {
            "none" => Self::None,
            "star" => Self::Star,
            "party" => Self::Party,
            _ => Self::Unknown(s),
        }
    }
}

impl From<CenterMark> for String {
    fn from(mark: CenterMark) -> Self {
        mark.to_string()
    }
}

impl Display for CenterMark {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CenterMark::None => write!(f, "none"),
            CenterMark::Star => write!(f, "star"),
            CenterMark::Party => write!(f, "party"),
            CenterMark::Unknown(s) => write!(f, "{}", s),
        }
    }
}

/// Post-processing effects.  None of these are implemented yet; every variant renders the same as
/// [`Effect::None`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Effect {
    None,
    Aging,
    InkSpread,
    Unknown(String),
}

impl From<String> for Effect {
    fn from(s: String) -> Self {
        match s.as_str() {
            "none" => Self::None,
            "aging" => Self::Aging,
            "inkSpread" => Self::InkSpread,
            _ => Self::Unknown(s),
        }
    }
}

impl From<Effect> for String {
    fn from(effect: Effect) -> Self {
        effect.to_string()
    }
}

impl Display for Effect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::None => write!(f, "none"),
            Effect::Aging => write!(f, "aging"),
            Effect::InkSpread => write!(f, "inkSpread"),
            Effect::Unknown(s) => write!(f, "{}", s),
        }
    }
}

/// Formats a colour as `#RRGGBB`
pub fn color_to_hex(color: RGB8) -> String {
    format!("#{:02X}{:02X}{:02X}", color.r, color.g, color.b)
}

/// Parses a colour from either `#RRGGBB` or the short form `#RGB`
pub fn parse_hex_color(s: &str) -> Result<RGB8> {
    let err = || Error::InvalidColor(s.to_owned());
    let digits = s.trim().strip_prefix('#').ok_or_else(err)?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(err());
    }
    let channel = |hex: &str| u8::from_str_radix(hex, 16).map_err(|_| err());
    match digits.len() {
        6 => Ok(RGB8::new(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        )),
        // `#F80` is shorthand for `#FF8800`
        3 => {
            let expand = |i: usize| channel(&digits[i..=i]).map(|v| v * 17);
            Ok(RGB8::new(expand(0)?, expand(1)?, expand(2)?))
        }
        _ => Err(err()),
    }
}

/// (De)serialises an [`RGB8`] as a `#RRGGBB` string
mod hex_color {
    use rgb::RGB8;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(color: &RGB8, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::color_to_hex(*color))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RGB8, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_hex_color(&s).map_err(de::Error::custom)
    }
}
