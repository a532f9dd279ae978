use crate::error::{Error, Result};

/// User-adjustable knobs for one detection run.
///
/// All fields are optional from the caller's point of view: `default()`
/// matches the interactive app's initial slider values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectionConfig {
    score_threshold: f32,
    line_width: u32,
    font_size: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.1,
            line_width: 3,
            font_size: 16,
        }
    }
}

impl DetectionConfig {
    pub fn with_score_threshold(mut self, score_threshold: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&score_threshold) {
            return Err(Error::Config(format!(
                "score_threshold must be within [0, 1], got {score_threshold}"
            )));
        }
        self.score_threshold = score_threshold;
        Ok(self)
    }

    pub fn with_line_width(mut self, line_width: u32) -> Result<Self> {
        if line_width < 1 {
            return Err(Error::Config(format!(
                "line_width must be at least 1, got {line_width}"
            )));
        }
        self.line_width = line_width;
        Ok(self)
    }

    pub fn with_font_size(mut self, font_size: u32) -> Result<Self> {
        if font_size < 1 {
            return Err(Error::Config(format!(
                "font_size must be at least 1, got {font_size}"
            )));
        }
        self.font_size = font_size;
        Ok(self)
    }

    pub fn score_threshold(&self) -> f32 {
        self.score_threshold
    }

    pub fn line_width(&self) -> u32 {
        self.line_width
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }
}
