//! Per-frame gesture classification.
//!
//! The raw label is a distance bucket between two fingertips:
//!
//! ```text
//!   0 ───────── T1 ───────── T2 ──────────▶ d (px)
//!      Close         Mid          Far
//! ```
//!
//! No temporal smoothing happens here; that is the debouncer's job.

use serde::{Deserialize, Serialize};

use super::landmarks::{LandmarkFrame, ids};

/// Raw gesture label for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureLabel {
    /// No hand, or the hand lacks the measured landmarks.
    None,
    Close,
    Mid,
    Far,
}

impl GestureLabel {
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

/// Classifier parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// First landmark of the measured pair.
    pub landmark_a: u8,
    /// Second landmark of the measured pair.
    pub landmark_b: u8,
    /// Distances below this are `Close` (pixels).
    pub close_below_px: f32,
    /// Distances at or above this are `Far` (pixels).
    pub far_from_px: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            landmark_a: ids::THUMB_TIP,
            landmark_b: ids::INDEX_TIP,
            close_below_px: 40.0,
            far_from_px: 80.0,
        }
    }
}

/// Buckets landmark distances into [`GestureLabel`]s.
#[derive(Debug, Clone, Copy)]
pub struct GestureClassifier {
    config: ClassifierConfig,
}

impl GestureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Distance between the configured landmark pair, if both are present.
    pub fn measure(&self, frame: &LandmarkFrame) -> Option<f32> {
        let a = frame.get(self.config.landmark_a)?;
        let b = frame.get(self.config.landmark_b)?;
        Some(a.distance(b))
    }

    /// Classify one tick. `None` input means the perception source saw no hand.
    pub fn classify(&self, frame: Option<&LandmarkFrame>) -> GestureLabel {
        match frame.and_then(|f| self.measure(f)) {
            Some(d) => self.bucket(d),
            None => GestureLabel::None,
        }
    }

    fn bucket(&self, distance: f32) -> GestureLabel {
        if distance < self.config.close_below_px {
            GestureLabel::Close
        } else if distance < self.config.far_from_px {
            GestureLabel::Mid
        } else {
            GestureLabel::Far
        }
    }
}
