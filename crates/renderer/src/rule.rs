//! Rules pair a data-source query with the styles its features are drawn with.

use geo::{Coord, MapCoords, Rect};
use serde::{Deserialize, Serialize};
use tiles_common::TilesResult;
use tracing::{debug, trace};

use crate::dispatch::{dispatch, Frame};
use crate::source::DataSource;
use crate::style::{self, Style};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    query: String,
    #[serde(default)]
    styles: Vec<Style>,
}

impl Rule {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            styles: Vec::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Styles in insertion order.
    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    /// Append a style and return it for further editing.
    pub fn add_style(&mut self, key: impl Into<String>, arg: impl Into<String>) -> &mut Style {
        let index = self.styles.len();
        self.styles.push(Style::new(key, arg));
        &mut self.styles[index]
    }

    pub fn with_style(mut self, key: impl Into<String>, arg: impl Into<String>) -> Self {
        self.add_style(key, arg);
        self
    }

    /// First style with a matching key.
    pub fn lookup_style(&self, key: &str) -> Option<&Style> {
        style::lookup_style(&self.styles, key)
    }

    /// Query `source` for the frame's extent and draw every returned feature.
    ///
    /// Returns the number of features dispatched.
    pub(crate) fn process(&self, source: &dyn DataSource, frame: &mut Frame<'_>) -> TilesResult<usize> {
        let native = *source.projection();
        let target = frame.projection;

        let extent = target.reproject_bounds(&frame.bounds, &native);
        let clip = Rect::new(
            (extent.min_x(), extent.min_y()),
            (extent.max_x(), extent.max_y()),
        )
        .to_polygon();

        let features = source.query(&self.query, &clip)?;
        let mut drawn = 0;
        for geometry in features {
            let Some(geometry) = geometry else {
                trace!("skipping feature without geometry");
                continue;
            };
            if native == target {
                dispatch(frame, &geometry, self);
            } else {
                let geometry = geometry.map_coords(|c| {
                    let (x, y) = native.transform(&target, c.x, c.y);
                    Coord { x, y }
                });
                dispatch(frame, &geometry, self);
            }
            drawn += 1;
        }

        debug!(source = source.name(), query = %self.query, features = drawn, "rule processed");
        Ok(drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styles_keep_insertion_order() {
        let mut rule = Rule::new("SELECT * FROM roads");
        rule.add_style("fill", "#ff0000");
        rule.add_style("stroke", "#000000").set_arg("#111111");
        rule.add_style("fill", "#00ff00");

        assert_eq!(rule.query(), "SELECT * FROM roads");
        let keys: Vec<_> = rule.styles().iter().map(|s| s.key()).collect();
        assert_eq!(keys, ["fill", "stroke", "fill"]);
        assert_eq!(rule.lookup_style("fill").map(|s| s.arg()), Some("#ff0000"));
        assert_eq!(rule.lookup_style("stroke").map(|s| s.arg()), Some("#111111"));
        assert!(rule.lookup_style("radius").is_none());
    }
}
