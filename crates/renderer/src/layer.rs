//! Layers: the ordered units a map renders.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tiles_common::TilesResult;
use tracing::{debug, warn};

use crate::dispatch::Frame;
use crate::raster::RasterLayer;
use crate::rule::Rule;
use crate::source::{self, DataSource};

/// What a vector layer does when one of its rules fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the layer and fail the render.
    #[default]
    AbortLayer,
    /// Log the failure and continue with the next rule.
    SkipRule,
}

pub enum Layer {
    Vector(VectorLayer),
    Raster(Rc<RasterLayer>),
}

impl Layer {
    pub fn kind(&self) -> &'static str {
        match self {
            Layer::Vector(_) => "vector",
            Layer::Raster(_) => "raster",
        }
    }

    pub(crate) fn process(&self, frame: &mut Frame<'_>, policy: FailurePolicy) -> TilesResult<()> {
        match self {
            Layer::Vector(layer) => layer.process(frame, policy),
            Layer::Raster(layer) => layer.process(frame),
        }
    }
}

impl From<VectorLayer> for Layer {
    fn from(layer: VectorLayer) -> Self {
        Layer::Vector(layer)
    }
}

impl From<Rc<RasterLayer>> for Layer {
    fn from(layer: Rc<RasterLayer>) -> Self {
        Layer::Raster(layer)
    }
}

/// A data source plus the rules drawn from it, in order.
pub struct VectorLayer {
    source: Box<dyn DataSource>,
    rules: Vec<Rule>,
}

impl VectorLayer {
    pub fn new(source: impl DataSource + 'static) -> Self {
        Self::from_boxed(Box::new(source))
    }

    pub fn from_boxed(source: Box<dyn DataSource>) -> Self {
        Self {
            source,
            rules: Vec::new(),
        }
    }

    /// Open the source named by `identifier`; see [`source::open`].
    pub fn open(identifier: &str) -> TilesResult<Self> {
        Ok(Self::from_boxed(source::open(identifier)?))
    }

    pub fn source(&self) -> &dyn DataSource {
        self.source.as_ref()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Append a rule for `query` and return it for styling.
    pub fn add_rule(&mut self, query: impl Into<String>) -> &mut Rule {
        self.push_rule(Rule::new(query))
    }

    pub fn push_rule(&mut self, rule: Rule) -> &mut Rule {
        let index = self.rules.len();
        self.rules.push(rule);
        &mut self.rules[index]
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    fn process(&self, frame: &mut Frame<'_>, policy: FailurePolicy) -> TilesResult<()> {
        debug!(source = self.source.name(), rules = self.rules.len(), "rendering vector layer");
        for (index, rule) in self.rules.iter().enumerate() {
            if let Err(err) = rule.process(self.source.as_ref(), frame) {
                match policy {
                    FailurePolicy::AbortLayer => return Err(err),
                    FailurePolicy::SkipRule => {
                        warn!(rule = index, query = rule.query(), error = %err, "skipping failed rule");
                    }
                }
            }
        }
        Ok(())
    }
}
