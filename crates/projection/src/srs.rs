//! Spatial reference parsing and reprojection.

use std::collections::HashMap;
use std::fmt;

use tiles_common::{Bounds, TilesError};
use tracing::debug;

use crate::mercator;

/// proj4 definition of spherical Web Mercator, used for slippy tiles.
pub const WEB_MERCATOR: &str = "+proj=merc +a=6378137 +b=6378137 +lat_ts=0.0 +lon_0=0.0 \
     +x_0=0.0 +y_0=0 +k=1.0 +units=m +nadgrids=@null +wktext +no_defs";

/// proj4 definition of geographic WGS84.
pub const WGS84: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// An active spatial reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Projection {
    /// Longitude/latitude in degrees.
    Geographic,
    /// Spherical Mercator in meters.
    WebMercator,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    #[error("bad projection string: {0}")]
    Unparseable(String),

    #[error("unsupported projection: {0}")]
    Unsupported(String),
}

impl From<ProjectionError> for TilesError {
    fn from(err: ProjectionError) -> Self {
        TilesError::ProjectionError(err.to_string())
    }
}

impl Projection {
    /// The fixed projection used for slippy tiles.
    pub fn web_mercator() -> Self {
        Projection::WebMercator
    }

    /// Parse a user supplied projection string.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326", "epsg:3857", "CRS:84", "WGS84"
    /// - "+proj=longlat +datum=WGS84"
    /// - "+proj=merc +a=6378137 +b=6378137 ..."
    pub fn from_user_input(input: &str) -> Result<Self, ProjectionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ProjectionError::Unparseable(input.to_string()));
        }

        if trimmed.starts_with('+') {
            return Self::from_proj4(trimmed);
        }

        match trimmed.to_uppercase().as_str() {
            "EPSG:4326" | "EPSG:4269" | "CRS:84" | "WGS84" => Ok(Projection::Geographic),
            "EPSG:3857" | "EPSG:900913" | "EPSG:3785" => Ok(Projection::WebMercator),
            upper if upper.starts_with("EPSG:") => {
                Err(ProjectionError::Unsupported(trimmed.to_string()))
            }
            _ => Err(ProjectionError::Unparseable(trimmed.to_string())),
        }
    }

    fn from_proj4(definition: &str) -> Result<Self, ProjectionError> {
        let mut params = HashMap::new();
        for token in definition.split_whitespace() {
            let token = token
                .strip_prefix('+')
                .ok_or_else(|| ProjectionError::Unparseable(definition.to_string()))?;
            match token.split_once('=') {
                Some((key, value)) => params.insert(key, value),
                None => params.insert(token, ""),
            };
        }

        let proj = params
            .get("proj")
            .ok_or_else(|| ProjectionError::Unparseable(definition.to_string()))?;

        let projection = match *proj {
            "longlat" | "latlong" | "lonlat" | "latlon" => Projection::Geographic,
            "merc" => {
                let spherical = ["a", "b", "R"].iter().all(|key| {
                    params
                        .get(key)
                        .map_or(true, |v| v.parse::<f64>().ok() == Some(mercator::RADIUS))
                });
                if !spherical {
                    return Err(ProjectionError::Unsupported(definition.to_string()));
                }
                Projection::WebMercator
            }
            other => return Err(ProjectionError::Unsupported(format!("+proj={}", other))),
        };

        debug!(definition, ?projection, "parsed proj4 definition");
        Ok(projection)
    }

    /// Export the active definition as a proj4 string.
    pub fn to_proj4(&self) -> String {
        match self {
            Projection::Geographic => WGS84.to_string(),
            Projection::WebMercator => WEB_MERCATOR.to_string(),
        }
    }

    /// Transform a single point from this projection into `to`.
    pub fn transform(&self, to: &Projection, x: f64, y: f64) -> (f64, f64) {
        match (self, to) {
            (Projection::Geographic, Projection::WebMercator) => mercator::forward(x, y),
            (Projection::WebMercator, Projection::Geographic) => mercator::inverse(x, y),
            _ => (x, y),
        }
    }

    /// Reproject a bounds rectangle from this projection into `to`.
    ///
    /// Both supported frames keep meridians and parallels axis-aligned, so
    /// the reprojected corners still describe the full rectangle.
    pub fn reproject_bounds(&self, bounds: &Bounds, to: &Projection) -> Bounds {
        if self == to {
            return *bounds;
        }
        let (x1, y1) = self.transform(to, bounds.nw.x, bounds.nw.y);
        let (x2, y2) = self.transform(to, bounds.se.x, bounds.se.y);
        Bounds::from_corners(x1, y1, x2, y2)
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Projection::Geographic => "EPSG:4326",
            Projection::WebMercator => "EPSG:3857",
        };
        write!(f, "{}", code)
    }
}
