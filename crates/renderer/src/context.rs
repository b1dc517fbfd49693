//! A stateful 2D drawing context over a [`Surface`].
//!
//! Mirrors the cairo model the style verbs are written against: a current
//! path that survives `fill_preserve`/`stroke_preserve`, a graphics state
//! (transform, source color, line settings, clip) that is pushed and popped
//! with `save`/`restore`, and user/device distance conversion.
//!
//! Clip paths are recorded on the graphics state and only rasterised into a
//! mask when something is drawn under them.

use std::rc::Rc;

use tiny_skia::{
    Color, FillRule, FilterQuality, LineCap, LineJoin, Mask, Paint, Path, PathBuilder, Pixmap,
    PixmapPaint, Rect, Stroke, Transform,
};

use crate::surface::Surface;

/// Bezier handle length for a quarter circle.
const KAPPA: f64 = 0.552_284_749_830_793_4;

#[derive(Clone)]
struct GraphicsState {
    transform: Transform,
    source: Color,
    line_width: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    clips: Vec<ClipPath>,
    clip_mask: Option<Rc<Mask>>,
}

/// A clip path and the transform current when it was set; `None` clips everything.
#[derive(Clone)]
struct ClipPath {
    path: Option<Path>,
    transform: Transform,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            source: Color::BLACK,
            line_width: 2.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            clips: Vec::new(),
            clip_mask: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PathElement {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CubicTo(f64, f64, f64, f64, f64, f64),
    Close,
}

/// Drawing context bound to a single surface for the duration of a render.
pub struct Context {
    surface: Surface,
    state: GraphicsState,
    saved: Vec<GraphicsState>,
    path: Vec<PathElement>,
    current_point: Option<(f64, f64)>,
    subpath_start: Option<(f64, f64)>,
}

impl Context {
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            state: GraphicsState::default(),
            saved: Vec::new(),
            path: Vec::new(),
            current_point: None,
            subpath_start: None,
        }
    }

    /// Release the context and hand back the surface it drew on.
    pub fn into_surface(self) -> Surface {
        self.surface
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Push a copy of the graphics state.
    pub fn save(&mut self) {
        self.saved.push(self.state.clone());
    }

    /// Pop the graphics state pushed by the matching `save`.
    ///
    /// An unbalanced restore leaves the state untouched.
    pub fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    /// Scale user space relative to the current transform.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.state.transform = self.state.transform.pre_scale(sx as f32, sy as f32);
    }

    pub fn set_source_rgba(&mut self, r: f64, g: f64, b: f64, a: f64) {
        let clamp = |v: f64| v.clamp(0.0, 1.0) as f32;
        if let Some(color) = Color::from_rgba(clamp(r), clamp(g), clamp(b), clamp(a)) {
            self.state.source = color;
        }
    }

    pub fn source_rgba(&self) -> [f32; 4] {
        let c = self.state.source;
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
    }

    pub fn line_width(&self) -> f64 {
        self.state.line_width
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.state.line_join = join;
    }

    pub fn line_join(&self) -> LineJoin {
        self.state.line_join
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = cap;
    }

    pub fn line_cap(&self) -> LineCap {
        self.state.line_cap
    }

    pub fn has_clip(&self) -> bool {
        !self.state.clips.is_empty()
    }

    /// Convert a distance vector from user space to device space.
    pub fn user_to_device_distance(&self, dx: f64, dy: f64) -> (f64, f64) {
        distance(&self.state.transform, dx, dy)
    }

    /// Convert a distance vector from device space to user space.
    pub fn device_to_user_distance(&self, dx: f64, dy: f64) -> (f64, f64) {
        match self.state.transform.invert() {
            Some(inverse) => distance(&inverse, dx, dy),
            None => (dx, dy),
        }
    }

    /// Discard the current path.
    pub fn new_path(&mut self) {
        self.path.clear();
        self.current_point = None;
        self.subpath_start = None;
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.path.push(PathElement::MoveTo(x, y));
        self.current_point = Some((x, y));
        self.subpath_start = Some((x, y));
    }

    /// Add a line to `(x, y)`; without a current point this behaves as `move_to`.
    pub fn line_to(&mut self, x: f64, y: f64) {
        if self.current_point.is_none() {
            self.move_to(x, y);
            return;
        }
        self.path.push(PathElement::LineTo(x, y));
        self.current_point = Some((x, y));
    }

    pub fn close_path(&mut self) {
        if self.current_point.is_none() {
            return;
        }
        self.path.push(PathElement::Close);
        self.current_point = self.subpath_start;
    }

    /// Add a full circle as a new closed sub-path.
    pub fn circle(&mut self, xc: f64, yc: f64, radius: f64) {
        let k = KAPPA * radius;
        self.move_to(xc + radius, yc);
        self.path.extend([
            PathElement::CubicTo(xc + radius, yc + k, xc + k, yc + radius, xc, yc + radius),
            PathElement::CubicTo(xc - k, yc + radius, xc - radius, yc + k, xc - radius, yc),
            PathElement::CubicTo(xc - radius, yc - k, xc - k, yc - radius, xc, yc - radius),
            PathElement::CubicTo(xc + k, yc - radius, xc + radius, yc - k, xc + radius, yc),
            PathElement::Close,
        ]);
    }

    pub fn has_path(&self) -> bool {
        self.path
            .iter()
            .any(|el| !matches!(el, PathElement::MoveTo(..)))
    }

    /// Fill the current path with the source color, keeping the path.
    pub fn fill_preserve(&mut self) {
        let Some(path) = self.build_path() else {
            return;
        };
        let paint = self.paint_for_source();
        let mask = self.clip_mask();
        self.surface.pixmap_mut().fill_path(
            &path,
            &paint,
            FillRule::Winding,
            self.state.transform,
            mask.as_deref(),
        );
    }

    /// Stroke the current path with the source color, keeping the path.
    pub fn stroke_preserve(&mut self) {
        let Some(path) = self.build_path() else {
            return;
        };
        let paint = self.paint_for_source();
        let mask = self.clip_mask();
        let state = &self.state;
        let stroke = Stroke {
            width: state.line_width as f32,
            line_cap: state.line_cap,
            line_join: state.line_join,
            ..Stroke::default()
        };
        self.surface.pixmap_mut().stroke_path(
            &path,
            &paint,
            &stroke,
            state.transform,
            mask.as_deref(),
        );
    }

    /// Paint the source color over the whole clip region.
    pub fn paint(&mut self) {
        let paint = self.paint_for_source();
        let (width, height) = (self.surface.width(), self.surface.height());
        let Some(rect) = Rect::from_xywh(0.0, 0.0, width as f32, height as f32) else {
            return;
        };
        let mask = self.clip_mask();
        self.surface
            .pixmap_mut()
            .fill_rect(rect, &paint, Transform::identity(), mask.as_deref());
    }

    /// Intersect the clip region with the current path, then clear the path.
    pub fn clip(&mut self) {
        self.state.clips.push(ClipPath {
            path: self.build_path(),
            transform: self.state.transform,
        });
        self.state.clip_mask = None;
        self.new_path();
    }

    /// Composite straight RGBA pixels stretched over the whole surface.
    pub fn draw_rgba_image(&mut self, width: u32, height: u32, rgba: &[u8]) -> bool {
        let Some(mut image) = Pixmap::new(width, height) else {
            return false;
        };
        if rgba.len() != image.pixels().len() * 4 {
            return false;
        }
        for (dst, src) in image.pixels_mut().iter_mut().zip(rgba.chunks_exact(4)) {
            *dst = tiny_skia::ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }

        let transform = Transform::from_scale(
            self.surface.width() as f32 / width as f32,
            self.surface.height() as f32 / height as f32,
        );
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        let mask = self.clip_mask();
        self.surface
            .pixmap_mut()
            .draw_pixmap(0, 0, image.as_ref(), &paint, transform, mask.as_deref());
        true
    }

    /// Rasterise the recorded clips, reusing the mask until the clip changes.
    fn clip_mask(&mut self) -> Option<Rc<Mask>> {
        if self.state.clips.is_empty() {
            return None;
        }
        if let Some(mask) = &self.state.clip_mask {
            return Some(Rc::clone(mask));
        }

        let mut mask = Mask::new(self.surface.width(), self.surface.height())?;
        mask.data_mut().fill(255);
        for clip in &self.state.clips {
            match &clip.path {
                Some(path) => mask.intersect_path(path, FillRule::Winding, true, clip.transform),
                None => mask.data_mut().fill(0),
            }
        }
        let mask = Rc::new(mask);
        self.state.clip_mask = Some(Rc::clone(&mask));
        Some(mask)
    }

    fn paint_for_source(&self) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(self.state.source);
        paint.anti_alias = true;
        paint
    }

    fn build_path(&self) -> Option<Path> {
        let mut pb = PathBuilder::new();
        for element in &self.path {
            match *element {
                PathElement::MoveTo(x, y) => pb.move_to(x as f32, y as f32),
                PathElement::LineTo(x, y) => pb.line_to(x as f32, y as f32),
                PathElement::CubicTo(x1, y1, x2, y2, x, y) => pb.cubic_to(
                    x1 as f32, y1 as f32, x2 as f32, y2 as f32, x as f32, y as f32,
                ),
                PathElement::Close => pb.close(),
            }
        }
        pb.finish()
    }
}

fn distance(transform: &Transform, dx: f64, dy: f64) -> (f64, f64) {
    let (sx, kx, ky, sy) = (
        transform.sx as f64,
        transform.kx as f64,
        transform.ky as f64,
        transform.sy as f64,
    );
    (sx * dx + kx * dy, ky * dx + sy * dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(width: u32, height: u32) -> Context {
        Context::new(Surface::new(width, height).unwrap())
    }

    fn rect(ctx: &mut Context, x0: f64, y0: f64, x1: f64, y1: f64) {
        ctx.move_to(x0, y0);
        ctx.line_to(x1, y0);
        ctx.line_to(x1, y1);
        ctx.line_to(x0, y1);
        ctx.close_path();
    }

    #[test]
    fn test_defaults_match_fresh_context() {
        let ctx = context(4, 4);
        assert_eq!(ctx.line_width(), 2.0);
        assert_eq!(ctx.line_join(), LineJoin::Miter);
        assert_eq!(ctx.line_cap(), LineCap::Butt);
        assert_eq!(ctx.source_rgba(), [0.0, 0.0, 0.0, 1.0]);
        assert!(!ctx.has_clip());
    }

    #[test]
    fn test_fill_preserve_keeps_path() {
        let mut ctx = context(10, 10);
        rect(&mut ctx, 0.0, 0.0, 10.0, 10.0);
        ctx.set_source_rgba(1.0, 0.0, 0.0, 1.0);
        ctx.fill_preserve();
        assert!(ctx.has_path());
        assert_eq!(ctx.surface().pixel(5, 5), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_save_restore_scopes_state() {
        let mut ctx = context(4, 4);
        ctx.save();
        ctx.set_line_width(7.0);
        ctx.set_line_cap(LineCap::Round);
        ctx.scale(2.0, 2.0);
        ctx.restore();
        assert_eq!(ctx.line_width(), 2.0);
        assert_eq!(ctx.line_cap(), LineCap::Butt);
        assert_eq!(ctx.user_to_device_distance(1.0, 1.0), (1.0, 1.0));

        // unbalanced restore is a no-op
        ctx.restore();
        assert_eq!(ctx.line_width(), 2.0);
    }

    #[test]
    fn test_distance_conversion() {
        let mut ctx = context(4, 4);
        ctx.scale(4.0, 0.5);
        assert_eq!(ctx.user_to_device_distance(1.0, 2.0), (4.0, 1.0));
        assert_eq!(ctx.device_to_user_distance(4.0, 1.0), (1.0, 2.0));
    }

    #[test]
    fn test_line_to_without_point_moves() {
        let mut ctx = context(4, 4);
        ctx.line_to(1.0, 1.0);
        assert!(!ctx.has_path());
        ctx.line_to(2.0, 2.0);
        assert!(ctx.has_path());
        ctx.new_path();
        assert!(!ctx.has_path());
    }

    #[test]
    fn test_clip_limits_paint() {
        let mut ctx = context(10, 10);
        rect(&mut ctx, 0.0, 0.0, 5.0, 10.0);
        ctx.clip();
        assert!(!ctx.has_path());
        ctx.set_source_rgba(0.0, 0.0, 1.0, 1.0);
        ctx.paint();
        assert_eq!(ctx.surface().pixel(2, 5), Some([0, 0, 255, 255]));
        assert_eq!(ctx.surface().pixel(8, 5), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_restore_drops_clip() {
        let mut ctx = context(10, 10);
        ctx.save();
        rect(&mut ctx, 0.0, 0.0, 5.0, 10.0);
        ctx.clip();
        ctx.restore();
        assert!(!ctx.has_clip());
        ctx.paint();
        assert_eq!(ctx.surface().pixel(8, 5), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_clip_discarded_by_restore_is_never_rasterised() {
        let mut ctx = context(64, 64);
        ctx.save();
        rect(&mut ctx, 0.0, 0.0, 5.0, 5.0);
        ctx.clip();
        assert!(ctx.has_clip());
        assert!(ctx.state.clip_mask.is_none());
        ctx.restore();
        assert!(!ctx.has_clip());
        assert!(ctx.state.clip_mask.is_none());

        rect(&mut ctx, 0.0, 0.0, 5.0, 5.0);
        ctx.clip();
        ctx.paint();
        assert!(ctx.state.clip_mask.is_some());
    }

    #[test]
    fn test_nested_clips_intersect() {
        let mut ctx = context(10, 10);
        rect(&mut ctx, 0.0, 0.0, 6.0, 10.0);
        ctx.clip();
        ctx.set_source_rgba(1.0, 0.0, 0.0, 1.0);
        ctx.paint();
        rect(&mut ctx, 4.0, 0.0, 10.0, 10.0);
        ctx.clip();
        ctx.set_source_rgba(0.0, 0.0, 1.0, 1.0);
        ctx.paint();
        assert_eq!(ctx.surface().pixel(2, 5), Some([255, 0, 0, 255]));
        assert_eq!(ctx.surface().pixel(5, 5), Some([0, 0, 255, 255]));
        assert_eq!(ctx.surface().pixel(8, 5), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_clip_keeps_transform_it_was_set_under() {
        let mut ctx = context(10, 10);
        ctx.save();
        ctx.scale(2.0, 2.0);
        rect(&mut ctx, 0.0, 0.0, 2.0, 5.0);
        ctx.clip();
        ctx.scale(0.5, 0.5);
        ctx.paint();
        ctx.restore();
        assert_eq!(ctx.surface().pixel(2, 5), Some([0, 0, 0, 255]));
        assert_eq!(ctx.surface().pixel(6, 5), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_empty_clip_hides_everything() {
        let mut ctx = context(4, 4);
        ctx.clip();
        ctx.paint();
        assert_eq!(ctx.surface().pixel(1, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_circle_fill() {
        let mut ctx = context(20, 20);
        ctx.circle(10.0, 10.0, 5.0);
        ctx.set_source_rgba(0.0, 1.0, 0.0, 1.0);
        ctx.fill_preserve();
        assert_eq!(ctx.surface().pixel(10, 10), Some([0, 255, 0, 255]));
        assert_eq!(ctx.surface().pixel(1, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_draw_rgba_image_stretches() {
        let mut ctx = context(4, 4);
        let pixel = [255u8, 255, 0, 255];
        assert!(ctx.draw_rgba_image(1, 1, &pixel));
        assert_eq!(ctx.surface().pixel(2, 2), Some([255, 255, 0, 255]));
        assert!(!ctx.draw_rgba_image(2, 2, &pixel));
    }
}
