//! Hand landmark frames.
//!
//! Ids follow the 21-point hand model used by the upstream hand-pose
//! detector (wrist = 0, fingertips at 4/8/12/16/20). Coordinates are in
//! pixels of the mirrored camera frame.

use heapless::LinearMap;
use serde::{Deserialize, Serialize};

/// Number of landmarks in one tracked hand.
pub const HAND_LANDMARKS: usize = 21;

/// Well-known landmark ids.
pub mod ids {
    pub const WRIST: u8 = 0;
    pub const THUMB_TIP: u8 = 4;
    pub const INDEX_TIP: u8 = 8;
    pub const MIDDLE_TIP: u8 = 12;
    pub const RING_TIP: u8 = 16;
    pub const PINKY_TIP: u8 = 20;
}

/// A 2-D landmark coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Landmarks of the single tracked hand for one sampling tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkFrame {
    points: LinearMap<u8, Point, HAND_LANDMARKS>,
}

impl LandmarkFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a landmark. Returns `false` once the frame already
    /// holds [`HAND_LANDMARKS`] distinct ids.
    pub fn insert(&mut self, id: u8, point: Point) -> bool {
        self.points.insert(id, point).is_ok()
    }

    pub fn get(&self, id: u8) -> Option<Point> {
        self.points.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Build a frame from `(id, point)` pairs, ignoring overflow.
    pub fn from_points(points: impl IntoIterator<Item = (u8, Point)>) -> Self {
        let mut frame = Self::new();
        for (id, p) in points {
            if !frame.insert(id, p) {
                break;
            }
        }
        frame
    }
}
