use std::str::FromStr;

use crate::error::LayoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityMode {
    /// Keep the first table even when its confidence is low.
    BestEffort,
    /// Fail the read when the first table has low confidence.
    Strict,
    /// Skip low-confidence tables and keep the first confident one.
    SkipAmbiguous,
}

impl FromStr for QualityMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "best-effort" => Ok(Self::BestEffort),
            "strict" => Ok(Self::Strict),
            "skip-ambiguous" => Ok(Self::SkipAmbiguous),
            other => Err(format!(
                "invalid quality mode '{other}', expected best-effort, strict or skip-ambiguous"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadOptions {
    /// Minimum cells required per candidate table row.
    pub min_cols: usize,
    pub quality_mode: QualityMode,
    /// Vertical distance, in points, under which two spans share a line.
    pub line_tolerance: f32,
}

impl ReadOptions {
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidOption`] when `min_cols` is below 2 or
    /// `line_tolerance` is negative or not finite.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.min_cols < 2 {
            return Err(LayoutError::InvalidOption(
                "min_cols must be at least 2".to_string(),
            ));
        }
        if !self.line_tolerance.is_finite() || self.line_tolerance < 0.0 {
            return Err(LayoutError::InvalidOption(format!(
                "line_tolerance must be a non-negative number, got {}",
                self.line_tolerance
            )));
        }
        Ok(())
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            min_cols: 2,
            quality_mode: QualityMode::BestEffort,
            line_tolerance: 2.0,
        }
    }
}
