// src/classifier.rs
use nalgebra::Point2;

use crate::config::GestureConfig;
use crate::pose::{PoseObservation, Side};

/// Per-side raised-arm result for one observation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ArmSignals {
    /// Wrist position of the right arm, present only when raised.
    pub right: Option<Point2<f64>>,
    /// Wrist position of the left arm, present only when raised.
    pub left: Option<Point2<f64>>,
}

impl ArmSignals {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn right_raised(&self) -> bool {
        self.right.is_some()
    }

    pub fn left_raised(&self) -> bool {
        self.left.is_some()
    }

    pub fn is_raised(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left_raised(),
            Side::Right => self.right_raised(),
        }
    }

    /// The side that drives navigation this tick. Right wins over left.
    pub fn dominant(&self) -> Option<(Side, Point2<f64>)> {
        self.right
            .map(|p| (Side::Right, p))
            .or_else(|| self.left.map(|p| (Side::Left, p)))
    }
}

#[derive(Debug, Clone)]
pub struct GestureClassifier {
    confidence_threshold: f64,
    wrist_offset_px: f64,
}

impl GestureClassifier {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            confidence_threshold: config.confidence_threshold,
            wrist_offset_px: config.wrist_offset_px,
        }
    }

    pub fn classify(&self, pose: Option<&PoseObservation>) -> ArmSignals {
        let Some(pose) = pose else {
            return ArmSignals::none();
        };

        ArmSignals {
            right: self.raised_wrist(pose, Side::Right),
            left: self.raised_wrist(pose, Side::Left),
        }
    }

    fn raised_wrist(&self, pose: &PoseObservation, side: Side) -> Option<Point2<f64>> {
        let wrist = pose.wrist(side);
        let shoulder = pose.shoulder(side);

        // NaN confidences or coordinates fail every comparison below
        let confident = wrist.confidence > self.confidence_threshold
            && shoulder.confidence > self.confidence_threshold;
        // Image y grows downward
        let above = wrist.y < shoulder.y - self.wrist_offset_px;

        (confident && above).then(|| wrist.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Landmark;

    fn pose(right_wrist_y: f64, left_wrist_y: f64, confidence: f64) -> PoseObservation {
        PoseObservation {
            right_wrist: Landmark::new(240.0, right_wrist_y, confidence),
            right_shoulder: Landmark::new(200.0, 140.0, confidence),
            left_wrist: Landmark::new(80.0, left_wrist_y, confidence),
            left_shoulder: Landmark::new(120.0, 140.0, confidence),
        }
    }

    #[test]
    fn test_right_raised_reports_wrist_position() {
        let classifier = GestureClassifier::new(&GestureConfig::default());
        let signals = classifier.classify(Some(&pose(40.0, 200.0, 0.9)));

        assert_eq!(signals.right, Some(Point2::new(240.0, 40.0)));
        assert!(!signals.left_raised());
    }

    #[test]
    fn test_offset_boundary_is_exclusive() {
        let classifier = GestureClassifier::new(&GestureConfig::default());
        // Exactly 60px above the shoulder is not enough
        let signals = classifier.classify(Some(&pose(80.0, 79.0, 0.9)));

        assert!(!signals.right_raised());
        assert!(signals.left_raised());
    }

    #[test]
    fn test_confidence_must_exceed_threshold() {
        let classifier = GestureClassifier::new(&GestureConfig::default());

        assert_eq!(classifier.classify(Some(&pose(10.0, 10.0, 0.6))), ArmSignals::none());

        let mut weak_shoulder = pose(10.0, 200.0, 0.9);
        weak_shoulder.right_shoulder.confidence = 0.3;
        assert!(!classifier.classify(Some(&weak_shoulder)).right_raised());
    }

    #[test]
    fn test_missing_pose_is_no_signal() {
        let classifier = GestureClassifier::new(&GestureConfig::default());
        assert_eq!(classifier.classify(None), ArmSignals::none());
    }

    #[test]
    fn test_nan_landmarks_are_ignored() {
        let classifier = GestureClassifier::new(&GestureConfig::default());
        let mut broken = pose(f64::NAN, 200.0, 0.9);
        broken.left_wrist.confidence = f64::NAN;

        assert_eq!(classifier.classify(Some(&broken)), ArmSignals::none());
    }

    #[test]
    fn test_right_dominates_when_both_raised() {
        let classifier = GestureClassifier::new(&GestureConfig::default());
        let signals = classifier.classify(Some(&pose(30.0, 30.0, 0.95)));

        assert!(signals.right_raised() && signals.left_raised());
        assert_eq!(signals.dominant().map(|(side, _)| side), Some(Side::Right));
    }
}
