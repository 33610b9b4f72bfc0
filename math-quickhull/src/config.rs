//! Hull construction configuration

use crate::{ConvexHullError, Result};
use serde::{Deserialize, Serialize};

/// Quickhull configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HullConfig {
    /// Explicit visibility tolerance. When `None` it is derived from the
    /// bounding box of the input points.
    pub tolerance: Option<f64>,
    /// Multiplier applied to machine epsilon when deriving the tolerance
    pub tolerance_scale: f64,
    /// Minimum number of points scanned at once before the visibility
    /// tests fan out over rayon (below this, sequential is faster)
    pub parallel_threshold: usize,
}

impl Default for HullConfig {
    fn default() -> Self {
        Self {
            tolerance: None,
            tolerance_scale: 3.0,
            parallel_threshold: 100,
        }
    }
}

impl HullConfig {
    /// Use a fixed tolerance instead of the derived one
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Change the parallel threshold
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Check that the numeric settings are usable
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance_scale.is_finite() || self.tolerance_scale < 0.0 {
            return Err(ConvexHullError::InvalidConfig(format!(
                "tolerance_scale must be finite and >= 0, got {}",
                self.tolerance_scale
            )));
        }
        if let Some(tolerance) = self.tolerance
            && (!tolerance.is_finite() || tolerance < 0.0)
        {
            return Err(ConvexHullError::InvalidConfig(format!(
                "tolerance must be finite and >= 0, got {tolerance}"
            )));
        }
        Ok(())
    }
}
