//! Geometry helpers shared by the layout engine and both backends.  Angles follow screen
//! conventions throughout: measured in degrees **clockwise** from the +X axis, because the y-axis
//! points down.  So -90° is straight up and +90° is straight down.

use angle::{Angle, Deg, Rad};
use itertools::Itertools;

use crate::V2;

/// Returns the point at `angle` on the circle of `radius` around `centre`
pub fn polar(centre: V2, radius: f32, angle: Deg<f32>) -> V2 {
    let rad = angle.to_rad().0;
    V2::new(centre.x + rad.cos() * radius, centre.y + rad.sin() * radius)
}

/// The largest angle swept by one segment of [`CircularArc::svg_path_str`]
pub const MAX_SEGMENT_ANGLE: f32 = 90.0;

/// A section of a circle, swept from `start_angle` to `end_angle`.  The sweep is clockwise if
/// `end_angle > start_angle` and anti-clockwise otherwise.
#[derive(Debug, Clone, Copy)]
pub struct CircularArc {
    pub centre: V2,
    pub radius: f32,
    pub start_angle: Deg<f32>,
    pub end_angle: Deg<f32>,
}

impl CircularArc {
    /// Creates an arc of total angular size `span`, centred on `mid_angle`.  `clockwise`
    /// determines which end the arc starts from.
    pub fn centred_on(
        centre: V2,
        radius: f32,
        mid_angle: Deg<f32>,
        span: Deg<f32>,
        clockwise: bool,
    ) -> Self {
        let half_span = if clockwise { span.0 / 2.0 } else { -span.0 / 2.0 };
        Self {
            centre,
            radius,
            start_angle: Deg(mid_angle.0 - half_span),
            end_angle: Deg(mid_angle.0 + half_span),
        }
    }

    pub fn start(&self) -> V2 {
        polar(self.centre, self.radius, self.start_angle)
    }

    pub fn end(&self) -> V2 {
        polar(self.centre, self.radius, self.end_angle)
    }

    pub fn mid_angle(&self) -> Deg<f32> {
        Deg((self.start_angle.0 + self.end_angle.0) / 2.0)
    }

    pub fn is_clockwise(&self) -> bool {
        self.end_angle.0 >= self.start_angle.0
    }

    /// The length of the arc, measured along the circle
    pub fn length(&self) -> f32 {
        Deg((self.end_angle.0 - self.start_angle.0).abs()).to_rad().0 * self.radius
    }

    /// Returns the angle reached after travelling `offset` along the arc from its midpoint.
    /// Negative offsets travel back towards the start.
    pub fn angle_at_offset_from_mid(&self, offset: f32) -> Deg<f32> {
        let direction = if self.is_clockwise() { 1.0 } else { -1.0 };
        let swept = Rad(offset / self.radius).to_deg().0;
        Deg(self.mid_angle().0 + direction * swept)
    }

    /// Generates an SVG path string (i.e. the value of a `d` attribute) for this arc.  The arc is
    /// split into segments of at most [`MAX_SEGMENT_ANGLE`], so arcs of any size (even ones which
    /// wind around the circle more than once) can be expressed without the `large-arc-flag`.
    pub fn svg_path_str(&self) -> String {
        let sweep = self.end_angle.0 - self.start_angle.0;
        let num_segments = ((sweep.abs() / MAX_SEGMENT_ANGLE).ceil() as usize).max(2);
        let sweep_flag = if self.is_clockwise() { 1 } else { 0 };

        let start = self.start();
        let segments = (1..=num_segments)
            .map(|i| {
                let angle = self.start_angle.0 + sweep * i as f32 / num_segments as f32;
                let pt = polar(self.centre, self.radius, Deg(angle));
                format!(
                    "A {r} {r} 0 0 {} {} {}",
                    sweep_flag,
                    pt.x,
                    pt.y,
                    r = self.radius
                )
            })
            .join(" ");
        format!("M {} {} {}", start.x, start.y, segments)
    }
}

/// A 2D affine transformation, stored as the matrix
///
/// ```text
/// | a  c  e |
/// | b  d  f |
/// | 0  0  1 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translation(offset: V2) -> Self {
        Self {
            e: offset.x,
            f: offset.y,
            ..Self::IDENTITY
        }
    }

    /// A **clockwise** rotation about the origin (clockwise because the y-axis points down)
    pub fn rotation(angle: impl Angle<f32>) -> Self {
        let rad = angle.to_rad().0;
        let (sin, cos) = (rad.sin(), rad.cos());
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Returns the transform which applies `other` first, then `self`.  This is how canvas
    /// transforms compose: `ctx.translate(..); ctx.rotate(..)` rotates in the translated space.
    pub fn pre_concat(&self, other: &Transform) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn apply(&self, pt: V2) -> V2 {
        V2::new(
            self.a * pt.x + self.c * pt.y + self.e,
            self.b * pt.x + self.d * pt.y + self.f,
        )
    }

    /// The angle by which this transform rotates the +X axis
    pub fn rotation_angle(&self) -> Deg<f32> {
        Rad(self.b.atan2(self.a)).to_deg()
    }
}
