// src/pose.rs
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// One estimated body keypoint in source-frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub confidence: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

/// Wrist and shoulder landmarks of a single detected person.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseObservation {
    pub right_wrist: Landmark,
    pub right_shoulder: Landmark,
    pub left_wrist: Landmark,
    pub left_shoulder: Landmark,
}

impl PoseObservation {
    pub fn wrist(&self, side: Side) -> &Landmark {
        match side {
            Side::Left => &self.left_wrist,
            Side::Right => &self.right_wrist,
        }
    }

    pub fn shoulder(&self, side: Side) -> &Landmark {
        match side {
            Side::Left => &self.left_shoulder,
            Side::Right => &self.right_shoulder,
        }
    }
}

/// A timestamped pose sample. `pose` is `None` when nobody was detected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    pub timestamp_ms: u64,
    #[serde(default)]
    pub pose: Option<PoseObservation>,
}

impl PoseFrame {
    pub fn new(timestamp_ms: u64, pose: Option<PoseObservation>) -> Self {
        Self { timestamp_ms, pose }
    }

    pub fn empty(timestamp_ms: u64) -> Self {
        Self { timestamp_ms, pose: None }
    }
}
