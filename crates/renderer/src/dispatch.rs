//! Geometry dispatch: walks feature geometries and turns them into drawing
//! commands on the render context.
//!
//! Areal and linear rings become paths in surface-local coordinates, thinned
//! so that consecutive vertices closer than half a device pixel collapse.
//! Points become circles sized by the rule's `radius` style.

use geo::{Coord, Geometry, LineString};
use projection::Projection;
use tiles_common::Bounds;
use tracing::trace;

use crate::context::Context;
use crate::rule::Rule;
use crate::style::{apply_styles, lookup_style, parse_number, StyleTarget, RADIUS};

/// Minimum device-space step between emitted path vertices.
pub const SIMPLIFY_THRESHOLD: f64 = 0.5;

/// Everything a render pass shares across layers and rules.
pub(crate) struct Frame<'a> {
    pub ctx: &'a mut Context,
    pub bounds: Bounds,
    pub projection: Projection,
}

/// The style stage run once a path or point set is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finisher {
    Polygon,
    LineString,
    Point,
}

impl Finisher {
    fn finish(self, ctx: &mut Context, rule: &Rule) {
        let keys: &[&str] = match self {
            Finisher::Polygon | Finisher::Point => {
                ctx.close_path();
                &["weight", "fill", "stroke"]
            }
            Finisher::LineString => &["weight", "fill"],
        };
        apply_styles(&mut StyleTarget::Context(ctx), rule.styles(), keys);
    }
}

/// How a geometry is drawn.
#[derive(Debug, PartialEq)]
pub enum Shape<'a> {
    Collection(Vec<&'a Geometry<f64>>),
    Paths(Vec<&'a LineString<f64>>, Finisher),
    Points(Vec<Coord<f64>>),
    Unsupported,
}

pub fn classify(geometry: &Geometry<f64>) -> Shape<'_> {
    match geometry {
        Geometry::GeometryCollection(collection) => Shape::Collection(collection.iter().collect()),
        Geometry::Polygon(polygon) => Shape::Paths(
            std::iter::once(polygon.exterior())
                .chain(polygon.interiors())
                .collect(),
            Finisher::Polygon,
        ),
        Geometry::MultiPolygon(polygons) => Shape::Paths(
            polygons
                .iter()
                .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
                .collect(),
            Finisher::Polygon,
        ),
        Geometry::LineString(line) => Shape::Paths(vec![line], Finisher::LineString),
        Geometry::MultiLineString(lines) => {
            Shape::Paths(lines.iter().collect(), Finisher::LineString)
        }
        Geometry::Point(point) => Shape::Points(vec![point.0]),
        Geometry::MultiPoint(points) => Shape::Points(points.iter().map(|p| p.0).collect()),
        Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => Shape::Unsupported,
    }
}

/// Thin a vertex run in surface-local space.
///
/// The first and last vertices are always kept. Each vertex in between is
/// kept only when its offset from the last kept vertex, converted with
/// `to_device`, reaches [`SIMPLIFY_THRESHOLD`] on either axis.
pub fn simplify_path<F>(points: &[(f64, f64)], to_device: F) -> Vec<(f64, f64)>
where
    F: Fn(f64, f64) -> (f64, f64),
{
    let Some((&first, rest)) = points.split_first() else {
        return Vec::new();
    };
    let (last, middle) = match rest.split_last() {
        Some((&last, middle)) => (last, middle),
        None => (first, rest),
    };

    let mut kept = vec![first];
    let mut anchor = first;
    for &point in middle {
        let (dx, dy) = to_device(point.0 - anchor.0, point.1 - anchor.1);
        if dx.abs() >= SIMPLIFY_THRESHOLD || dy.abs() >= SIMPLIFY_THRESHOLD {
            kept.push(point);
            anchor = point;
        }
    }
    kept.push(last);
    kept
}

pub(crate) fn dispatch(frame: &mut Frame<'_>, geometry: &Geometry<f64>, rule: &Rule) {
    match classify(geometry) {
        Shape::Collection(children) => {
            for child in children {
                dispatch(frame, child, rule);
            }
        }
        Shape::Paths(rings, finisher) => {
            for ring in rings {
                plot_path(frame, ring, rule, finisher);
            }
        }
        Shape::Points(points) => plot_points(frame, &points, rule),
        Shape::Unsupported => trace!("ignoring unsupported geometry type"),
    }
}

fn plot_path(frame: &mut Frame<'_>, ring: &LineString<f64>, rule: &Rule, finisher: Finisher) {
    let local: Vec<(f64, f64)> = ring
        .coords()
        .map(|c| frame.bounds.to_local(c.x, c.y))
        .collect();
    let ctx = &mut *frame.ctx;
    let vertices = simplify_path(&local, |dx, dy| ctx.user_to_device_distance(dx, dy));
    let Some((&(x0, y0), rest)) = vertices.split_first() else {
        return;
    };
    trace!(input = local.len(), kept = vertices.len(), "plotting path");

    ctx.save();
    ctx.new_path();
    ctx.move_to(x0, y0);
    for &(x, y) in rest {
        ctx.line_to(x, y);
    }
    apply_styles(
        &mut StyleTarget::Context(&mut *ctx),
        rule.styles(),
        &["line-join", "line-cap"],
    );
    finisher.finish(ctx, rule);
    ctx.close_path();
    ctx.clip();
    ctx.restore();
}

fn plot_points(frame: &mut Frame<'_>, points: &[Coord<f64>], rule: &Rule) {
    let Some(radius) = lookup_style(rule.styles(), RADIUS) else {
        trace!(points = points.len(), "no radius style, skipping points");
        return;
    };
    let ctx = &mut *frame.ctx;
    let (radius, _) = ctx.device_to_user_distance(parse_number(radius.arg()), 0.0);

    ctx.save();
    ctx.new_path();
    for point in points {
        let (x, y) = frame.bounds.to_local(point.x, point.y);
        ctx.circle(x, y, radius.abs());
    }
    apply_styles(
        &mut StyleTarget::Context(&mut *ctx),
        rule.styles(),
        &["line-join", "line-cap"],
    );
    Finisher::Point.finish(ctx, rule);
    ctx.clip();
    ctx.restore();
}
