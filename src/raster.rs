//! The raster backend: replays a [`SealLayout`] as a sequence of draw calls against an immediate
//! mode 2D [`Surface`], in the style of an HTML canvas.  Arc text is drawn one character at a
//! time, each inside its own saved transform.

use std::ops::{Deref, DerefMut};

use angle::Deg;
use log::debug;
use rgb::RGB8;

use crate::{
    config::SealConfig,
    error::{Error, Result},
    layout::{self, ArcText, Emblem, SealLayout},
    utils::Transform,
    V2,
};

const BACKDROP_COLOR: RGB8 = RGB8::new(255, 255, 255);
const EMBLEM_GLYPH_COLOR: RGB8 = RGB8::new(255, 255, 255);

/// A 2D drawing surface with a canvas-like state model.  The current transform and global alpha
/// are part of the surface's state, and are pushed/popped by [`save`](Surface::save) and
/// [`restore`](Surface::restore).
pub trait Surface {
    /// Dimensions of the surface, in pixels
    fn size(&self) -> (u32, u32);

    /// Resets every pixel to transparent.  Doesn't affect the state stack.
    fn clear(&mut self);

    fn save(&mut self);
    fn restore(&mut self);

    fn translate(&mut self, offset: V2);
    /// Rotates the coordinate system **clockwise**
    fn rotate(&mut self, angle: Deg<f32>);
    /// Sets the alpha which multiplies everything drawn from now on
    fn set_global_alpha(&mut self, alpha: f32);

    fn fill_rect(&mut self, min: V2, size: V2, color: RGB8);
    fn fill_path(&mut self, path: &Path, color: RGB8);
    fn stroke_path(&mut self, path: &Path, style: &StrokeStyle);
    /// Draws `text` centred (both horizontally and vertically) on `position`
    fn fill_text(&mut self, text: &str, position: V2, style: &TextStyle);
}

/// Saves the state of a [`Surface`], restoring it when dropped.  Any transforms applied through
/// this guard can't leak out of it, whichever way the scope is exited.
pub struct SavedState<'s, S: Surface + ?Sized> {
    surface: &'s mut S,
}

impl<'s, S: Surface + ?Sized> SavedState<'s, S> {
    pub fn new(surface: &'s mut S) -> Self {
        surface.save();
        Self { surface }
    }
}

impl<S: Surface + ?Sized> Deref for SavedState<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: Surface + ?Sized> DerefMut for SavedState<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: Surface + ?Sized> Drop for SavedState<'_, S> {
    fn drop(&mut self) {
        self.surface.restore();
    }
}

/// A path made of straight lines and circular arcs
#[derive(Debug, Clone, Default)]
pub struct Path {
    segments: Vec<PathSegment>,
}

#[derive(Debug, Clone, Copy)]
pub enum PathSegment {
    MoveTo(V2),
    LineTo(V2),
    /// A clockwise arc around `centre`.  Like canvas arcs, this draws a line from the current
    /// point to the start of the arc.
    Arc {
        centre: V2,
        radius: f32,
        start_angle: Deg<f32>,
        end_angle: Deg<f32>,
    },
    Close,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, pt: V2) -> &mut Self {
        self.segments.push(PathSegment::MoveTo(pt));
        self
    }

    pub fn line_to(&mut self, pt: V2) -> &mut Self {
        self.segments.push(PathSegment::LineTo(pt));
        self
    }

    pub fn arc(
        &mut self,
        centre: V2,
        radius: f32,
        start_angle: Deg<f32>,
        end_angle: Deg<f32>,
    ) -> &mut Self {
        self.segments.push(PathSegment::Arc {
            centre,
            radius,
            start_angle,
            end_angle,
        });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.segments.push(PathSegment::Close);
        self
    }

    /// A full circle
    pub fn circle(centre: V2, radius: f32) -> Self {
        let mut path = Self::new();
        path.arc(centre, radius, Deg(0.0), Deg(360.0));
        path
    }

    /// A closed polygon through `vertices`
    pub fn polygon(vertices: &[V2]) -> Self {
        let mut path = Self::new();
        if let Some((first, rest)) = vertices.split_first() {
            path.move_to(*first);
            for v in rest {
                path.line_to(*v);
            }
            path.close();
        }
        path
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

/// How a path's outline is drawn
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub line_width: f32,
    pub stroke_color: RGB8,
}

/// How text is drawn.  Text is always anchored on its centre.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub fill_color: RGB8,
    pub font_size: f32,
    pub font_family: String,
    pub bold: bool,
}

/// Renders a seal onto `surface`, which must already be sized to `seal_size × seal_size`.
///
/// The surface is cleared, then the whole seal is drawn rotated by `config.rotation` about its
/// centre.  The backdrop is drawn first, unrotated and at full opacity; everything else is drawn
/// with the configured opacity.  The surface's state is left as it was found.
pub fn render_seal<S: Surface + ?Sized>(surface: &mut S, config: &SealConfig) -> Result<()> {
    let expected = config.seal_size.max(0.0).round() as u32;
    let (width, height) = surface.size();
    if (width, height) != (expected, expected) {
        return Err(Error::SurfaceSize {
            expected,
            width,
            height,
        });
    }

    layout::warn_ignored_settings(config);
    let layout = layout::layout_seal(config);
    debug!(
        "Rendering {}px seal to raster ({} + {} arc chars)",
        layout.size,
        layout.company_name.as_ref().map_or(0, |t| t.chars.len()),
        layout.code.as_ref().map_or(0, |t| t.chars.len()),
    );

    surface.clear();
    let mut surface = SavedState::new(surface);
    if !config.no_white_background {
        surface.set_global_alpha(1.0);
        surface.fill_rect(V2::new(0.0, 0.0), V2::new(layout.size, layout.size), BACKDROP_COLOR);
    }

    // Rotate the whole image about its centre
    surface.translate(layout.centre);
    surface.rotate(Deg(config.rotation));
    surface.translate(V2::new(-layout.centre.x, -layout.centre.y));
    surface.set_global_alpha(config.alpha());

    draw_seal(&mut *surface, &layout, config);
    Ok(())
}

/// Issues the draw calls for everything except the backdrop, in z-order
fn draw_seal<S: Surface + ?Sized>(surface: &mut S, layout: &SealLayout, config: &SealConfig) {
    let color = config.color;

    if let Some(border) = layout.border {
        let style = StrokeStyle {
            line_width: border.stroke_width,
            stroke_color: color,
        };
        surface.stroke_path(&Path::circle(layout.centre, border.radius), &style);
    }

    if let Some(company_name) = &layout.company_name {
        draw_arc_text(surface, company_name, &text_style(config, company_name.font_size));
    }
    if let Some(seal_name) = &layout.seal_name {
        let style = text_style(config, seal_name.font_size);
        surface.fill_text(&seal_name.text, seal_name.position, &style);
    }
    if let Some(code) = &layout.code {
        draw_arc_text(surface, code, &text_style(config, code.font_size));
    }

    match &layout.emblem {
        Some(Emblem::Star { vertices }) => surface.fill_path(&Path::polygon(vertices), color),
        Some(Emblem::Party {
            radius,
            glyph,
            font_size,
        }) => {
            surface.fill_path(&Path::circle(layout.centre, *radius), color);
            let style = TextStyle {
                fill_color: EMBLEM_GLYPH_COLOR,
                bold: true,
                ..text_style(config, *font_size)
            };
            surface.fill_text(glyph, layout.centre, &style);
        }
        None => {}
    }
}

/// Draws each character inside its own saved state, translated to its position and rotated to
/// lie along the arc
fn draw_arc_text<S: Surface + ?Sized>(surface: &mut S, text: &ArcText, style: &TextStyle) {
    let mut buf = [0u8; 4];
    for c in &text.chars {
        let mut surface = SavedState::new(&mut *surface);
        surface.translate(c.position);
        surface.rotate(c.rotation);
        surface.fill_text(c.ch.encode_utf8(&mut buf), V2::new(0.0, 0.0), style);
    }
}

fn text_style(config: &SealConfig, font_size: f32) -> TextStyle {
    TextStyle {
        fill_color: config.color,
        font_size,
        font_family: config.font.clone(),
        bold: false,
    }
}

////////////////////////
// RECORDING SURFACE //
////////////////////////

/// A [`Surface`] which doesn't rasterise anything, but instead records every draw call along with
/// the transform and alpha that were in effect when it was made.  Useful for inspecting exactly
/// what a render does, or for replaying it onto a real rasteriser.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    state: SurfaceState,
    saved_states: Vec<SurfaceState>,
    commands: Vec<RecordedCommand>,
    /// Number of times `clear` has been called
    clears: usize,
}

#[derive(Debug, Clone, Copy)]
struct SurfaceState {
    transform: Transform,
    alpha: f32,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            transform: Transform::IDENTITY,
            alpha: 1.0,
        }
    }
}

/// A single draw call made against a [`RecordingSurface`]
#[derive(Debug, Clone)]
pub struct RecordedCommand {
    pub command: DrawCommand,
    /// The surface's full transform when the command was issued
    pub transform: Transform,
    /// The surface's global alpha when the command was issued
    pub alpha: f32,
}

#[derive(Debug, Clone)]
pub enum DrawCommand {
    FillRect { min: V2, size: V2, color: RGB8 },
    FillPath { path: Path, color: RGB8 },
    StrokePath { path: Path, style: StrokeStyle },
    FillText { text: String, position: V2, style: TextStyle },
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            state: SurfaceState::default(),
            saved_states: Vec::new(),
            commands: Vec::new(),
            clears: 0,
        }
    }

    /// Every draw call made since the surface was last cleared
    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    pub fn clear_count(&self) -> usize {
        self.clears
    }

    /// How many [`save`](Surface::save)s haven't yet been matched by a
    /// [`restore`](Surface::restore)
    pub fn save_depth(&self) -> usize {
        self.saved_states.len()
    }

    pub fn transform(&self) -> Transform {
        self.state.transform
    }

    pub fn global_alpha(&self) -> f32 {
        self.state.alpha
    }

    fn record(&mut self, command: DrawCommand) {
        self.commands.push(RecordedCommand {
            command,
            transform: self.state.transform,
            alpha: self.state.alpha,
        });
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.clears += 1;
    }

    fn save(&mut self) {
        self.saved_states.push(self.state);
    }

    fn restore(&mut self) {
        // Like a canvas, restoring with nothing saved does nothing
        if let Some(state) = self.saved_states.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, offset: V2) {
        self.state.transform = self
            .state
            .transform
            .pre_concat(&Transform::translation(offset));
    }

    fn rotate(&mut self, angle: Deg<f32>) {
        self.state.transform = self.state.transform.pre_concat(&Transform::rotation(angle));
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha;
    }

    fn fill_rect(&mut self, min: V2, size: V2, color: RGB8) {
        self.record(DrawCommand::FillRect { min, size, color });
    }

    fn fill_path(&mut self, path: &Path, color: RGB8) {
        self.record(DrawCommand::FillPath {
            path: path.clone(),
            color,
        });
    }

    fn stroke_path(&mut self, path: &Path, style: &StrokeStyle) {
        self.record(DrawCommand::StrokePath {
            path: path.clone(),
            style: style.clone(),
        });
    }

    fn fill_text(&mut self, text: &str, position: V2, style: &TextStyle) {
        self.record(DrawCommand::FillText {
            text: text.to_owned(),
            position,
            style: style.clone(),
        });
    }
}
