//! Raster layers: RGBA images composited across the whole map surface.
//!
//! A raster layer is shared by reference count; every map holding it keeps it
//! alive, and it is released when the last holder drops it.

use std::cell::RefCell;
use std::rc::Rc;

use tiles_common::{TilesError, TilesResult};
use tracing::{debug, warn};

use crate::dispatch::Frame;

/// Minimum number of bands a raster source must carry.
pub const REQUIRED_BANDS: u8 = 4;

#[derive(Debug)]
pub struct RasterLayer {
    source: String,
    error: RefCell<Option<TilesError>>,
}

impl RasterLayer {
    pub fn new(source: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            source: source.into(),
            error: RefCell::new(None),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of current holders of `layer`.
    pub fn owners(layer: &Rc<Self>) -> usize {
        Rc::strong_count(layer)
    }

    /// The error recorded by the most recent failed render, if any.
    pub fn last_error(&self) -> Option<TilesError> {
        self.error.borrow().clone()
    }

    fn record(&self, err: TilesError) -> TilesError {
        warn!(source = %self.source, error = %err, "raster layer failed");
        *self.error.borrow_mut() = Some(err.clone());
        err
    }

    /// Read the source and stretch it over the full surface.
    pub(crate) fn process(&self, frame: &mut Frame<'_>) -> TilesResult<()> {
        let image = image::open(&self.source).map_err(|e| {
            self.record(TilesError::DataSourceError(format!(
                "error opening raster source {}: {}",
                self.source, e
            )))
        })?;

        let bands = image.color().channel_count();
        if bands < REQUIRED_BANDS {
            return Err(self.record(TilesError::DataSourceError(format!(
                "raster layer must have {} bands, {} has {}",
                REQUIRED_BANDS, self.source, bands
            ))));
        }

        let rgba = image.to_rgba8();
        debug!(
            source = %self.source,
            width = rgba.width(),
            height = rgba.height(),
            "compositing raster"
        );
        if !frame
            .ctx
            .draw_rgba_image(rgba.width(), rgba.height(), rgba.as_raw())
        {
            return Err(self.record(TilesError::RenderError(format!(
                "could not composite raster {}",
                self.source
            ))));
        }

        self.error.borrow_mut().take();
        Ok(())
    }
}

impl Drop for RasterLayer {
    fn drop(&mut self) {
        debug!(source = %self.source, "releasing raster layer");
    }
}
