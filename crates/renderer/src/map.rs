//! The map: extent, projection, output size and an ordered stack of layers.
//!
//! A map is built up through mutators that each report a status. Failures
//! are also recorded on the map and stay there until a later successful call
//! of the same kind replaces them; render failures are never cleared. A map
//! only renders while [`Map::is_valid`] holds.

use std::io::Write;
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

use projection::Projection;
use tiles_common::{Bounds, Status, TileCoord, TilesError, TilesResult, TILE_SIZE};
use tracing::{debug, info, warn};

use crate::context::Context;
use crate::dispatch::Frame;
use crate::layer::{FailurePolicy, Layer, VectorLayer};
use crate::raster::RasterLayer;
use crate::surface::Surface;

/// Which mutator recorded an error, and so which mutator may clear it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorOrigin {
    Projection,
    Render,
}

#[derive(Debug, Clone)]
struct RecordedError {
    origin: ErrorOrigin,
    error: TilesError,
}

#[derive(Default)]
pub struct Map {
    bounds: Option<Bounds>,
    projection: Option<Projection>,
    width: u32,
    height: u32,
    layers: Vec<Layer>,
    failure_policy: FailurePolicy,
    error: Option<RecordedError>,
}

impl Map {
    /// An empty, invalid map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `srs` and make it the active projection.
    pub fn set_projection(&mut self, srs: &str) -> TilesResult<()> {
        match Projection::from_user_input(srs) {
            Ok(projection) => {
                debug!(srs, "parsed projection");
                self.use_projection(projection);
                Ok(())
            }
            Err(err) => Err(self.fail(ErrorOrigin::Projection, err.into())),
        }
    }

    fn use_projection(&mut self, projection: Projection) {
        debug!(projection = %projection, "projection set");
        self.projection = Some(projection);
        self.clear(ErrorOrigin::Projection);
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    /// The active projection as a proj4 string.
    pub fn srs(&self) -> Option<String> {
        self.projection.map(|p| p.to_proj4())
    }

    /// Store the output size; zero sizes make the map invalid.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Replace the extent with the smallest rectangle covering both corners.
    pub fn set_bounds(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> TilesResult<()> {
        let bounds = Bounds::from_corners(x1, y1, x2, y2);
        debug!(
            min_x = bounds.min_x(),
            min_y = bounds.min_y(),
            max_x = bounds.max_x(),
            max_y = bounds.max_y(),
            "bounds set"
        );
        self.bounds = Some(bounds);
        Ok(())
    }

    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    /// Configure the map to render slippy tile `z/x/y`.
    pub fn set_slippy_tile(&mut self, x: u32, y: u32, z: u32) -> TilesResult<()> {
        self.set_size(TILE_SIZE, TILE_SIZE);
        self.use_projection(Projection::web_mercator());
        let tile = TileCoord::new(z, x, y).mercator_bounds();
        self.set_bounds(tile.max_x(), tile.min_y(), tile.min_x(), tile.max_y())
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Append a layer; layers render in insertion order.
    pub fn add_layer(&mut self, layer: impl Into<Layer>) -> &mut Layer {
        let index = self.layers.len();
        self.layers.push(layer.into());
        &mut self.layers[index]
    }

    pub fn add_vector_layer(&mut self, layer: VectorLayer) {
        self.add_layer(layer);
    }

    /// Add a shared raster layer; the map becomes one of its owners.
    pub fn add_raster_layer(&mut self, layer: &Rc<RasterLayer>) {
        self.add_layer(Rc::clone(layer));
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    pub fn set_failure_policy(&mut self, policy: FailurePolicy) {
        self.failure_policy = policy;
    }

    /// Status of the most recent recorded failure, or `Ok`.
    pub fn status(&self) -> Status {
        self.error
            .as_ref()
            .map_or(Status::Ok, |recorded| recorded.error.status())
    }

    pub fn status_message(&self) -> Option<&str> {
        self.last_error().map(TilesError::message)
    }

    pub fn last_error(&self) -> Option<&TilesError> {
        self.error.as_ref().map(|recorded| &recorded.error)
    }

    /// True when the map can be rendered right now.
    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }

    fn check(&self) -> Result<(Bounds, Projection), String> {
        if let Some(recorded) = &self.error {
            return Err(format!("map has a recorded error: {}", recorded.error));
        }
        let bounds = self.bounds.ok_or("map has no bounds")?;
        let projection = self.projection.ok_or("map has no projection")?;
        if self.width == 0 || self.height == 0 {
            return Err(format!("map size {}x{} is empty", self.width, self.height));
        }
        if self.layers.is_empty() {
            return Err("map has no layers".to_string());
        }
        Ok((bounds, projection))
    }

    /// Render every layer into a new surface.
    ///
    /// An invalid map yields `InvalidState` without recording anything. A
    /// failing layer stops the remaining layers and is recorded on the map,
    /// but the partially drawn surface is still returned.
    pub fn build_surface(&mut self) -> TilesResult<Surface> {
        self.render().map(|(surface, _)| surface)
    }

    /// Render and PNG-encode to `path`.
    pub fn render_to_file(&mut self, path: impl AsRef<Path>) -> TilesResult<()> {
        let path = path.as_ref();
        let (surface, failure) = self.render()?;
        surface
            .save_png(path)
            .map_err(|err| self.fail(ErrorOrigin::Render, err))?;
        info!(path = %path.display(), "map written");
        failure.map_or(Ok(()), Err)
    }

    /// Render and PNG-encode into `writer`.
    pub fn render_to_stream<W: Write>(&mut self, writer: &mut W) -> TilesResult<()> {
        let (surface, failure) = self.render()?;
        surface
            .write_png(writer)
            .map_err(|err| self.fail(ErrorOrigin::Render, err))?;
        failure.map_or(Ok(()), Err)
    }

    fn render(&mut self) -> TilesResult<(Surface, Option<TilesError>)> {
        let (bounds, projection) = self.check().map_err(|reason| {
            debug!(reason = %reason, "map is not renderable");
            TilesError::InvalidState(reason)
        })?;

        let surface =
            Surface::new(self.width, self.height).map_err(|err| self.fail(ErrorOrigin::Render, err))?;
        let mut ctx = Context::new(surface);

        let sx = self.width as f64 / bounds.width();
        let sy = self.height as f64 / bounds.height();
        if sx.is_finite() && sy.is_finite() && sx > 0.0 && sy > 0.0 {
            ctx.scale(sx, sy);
        } else {
            warn!(
                width = bounds.width(),
                height = bounds.height(),
                "degenerate bounds, rendering without scaling"
            );
        }

        let started = Instant::now();
        let mut failure = None;
        {
            let mut frame = Frame {
                ctx: &mut ctx,
                bounds,
                projection,
            };
            for (index, layer) in self.layers.iter().enumerate() {
                debug!(layer = index, kind = layer.kind(), "rendering layer");
                if let Err(err) = layer.process(&mut frame, self.failure_policy) {
                    warn!(layer = index, error = %err, "layer failed, skipping remaining layers");
                    failure = Some(err);
                    break;
                }
            }
        }
        if let Some(err) = &failure {
            self.fail(ErrorOrigin::Render, err.clone());
        }

        info!(
            width = self.width,
            height = self.height,
            layers = self.layers.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = failure.is_none(),
            "map rendered"
        );
        Ok((ctx.into_surface(), failure))
    }

    fn fail(&mut self, origin: ErrorOrigin, error: TilesError) -> TilesError {
        debug!(status = %error.status(), error = %error, "recording map error");
        self.error = Some(RecordedError {
            origin,
            error: error.clone(),
        });
        error
    }

    fn clear(&mut self, origin: ErrorOrigin) {
        if self.error.as_ref().map(|recorded| recorded.origin) == Some(origin) {
            self.error = None;
        }
    }
}
