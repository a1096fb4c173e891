// src/simulation.rs - Scripted synthetic pose stream for demos and tests
use std::str::FromStr;

use crate::error::{ScriptError, SourceError};
use crate::pose::{Landmark, PoseFrame, PoseObservation};
use crate::source::{PoseSource, PoseTrace};

// Source frame is 320x240, mirrored like a selfie camera
const SHOULDER_Y: f64 = 140.0;
const RIGHT_SHOULDER_X: f64 = 200.0;
const LEFT_SHOULDER_X: f64 = 120.0;
const RAISED_WRIST_Y: f64 = 40.0;
const LOWERED_WRIST_Y: f64 = 200.0;
const STRONG_CONFIDENCE: f64 = 0.9;
const WEAK_CONFIDENCE: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimPose {
    RaiseRight,
    RaiseLeft,
    RaiseBoth,
    Rest,
    /// Nobody in frame.
    Absent,
    /// Right arm raised but tracked with low confidence.
    Weak,
}

impl FromStr for SimPose {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "right" => Ok(SimPose::RaiseRight),
            "left" => Ok(SimPose::RaiseLeft),
            "both" => Ok(SimPose::RaiseBoth),
            "rest" => Ok(SimPose::Rest),
            "absent" | "none" => Ok(SimPose::Absent),
            "weak" => Ok(SimPose::Weak),
            other => Err(ScriptError::UnknownPose(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimPhase {
    pub pose: SimPose,
    pub duration_ms: u64,
}

/// Parses `pose:duration_ms` phases separated by commas, e.g.
/// `right:1200,rest:400,left:1100`.
pub fn parse_script(script: &str) -> Result<Vec<SimPhase>, ScriptError> {
    script
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (pose, duration) = part
                .split_once(':')
                .ok_or_else(|| ScriptError::MalformedPhase(part.to_string()))?;
            let duration_ms = duration
                .trim()
                .parse::<u64>()
                .map_err(|_| ScriptError::MalformedPhase(part.to_string()))?;
            Ok(SimPhase {
                pose: pose.parse()?,
                duration_ms,
            })
        })
        .collect()
}

pub struct SimulatedPoseSource {
    phases: Vec<SimPhase>,
    tick_ms: u64,
    phase_index: usize,
    phase_elapsed_ms: u64,
    sim_time_ms: u64,
    deny_access: bool,
    started: bool,
}

impl SimulatedPoseSource {
    pub fn new(phases: Vec<SimPhase>, tick_ms: u64) -> Result<Self, ScriptError> {
        if tick_ms == 0 {
            return Err(ScriptError::ZeroTick);
        }
        Ok(Self {
            phases,
            tick_ms,
            phase_index: 0,
            phase_elapsed_ms: 0,
            sim_time_ms: 0,
            deny_access: false,
            started: false,
        })
    }

    pub fn from_script(script: &str, tick_ms: u64) -> Result<Self, ScriptError> {
        Self::new(parse_script(script)?, tick_ms)
    }

    /// Behaves like a camera whose permission prompt was declined.
    pub fn denying_access(mut self) -> Self {
        self.deny_access = true;
        self
    }

    /// Renders the whole script into a trace.
    pub fn into_trace(mut self) -> PoseTrace {
        self.started = true;
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame() {
            frames.push(frame);
        }
        PoseTrace {
            frames,
            skipped_lines: 0,
        }
    }

    fn observation(&self, pose: SimPose) -> Option<PoseObservation> {
        // Small hand tremor so the wrists never sit perfectly still
        let t = self.sim_time_ms as f64 / 1000.0;
        let jitter_x = 3.0 * (t * 7.0).sin();
        let jitter_y = 4.0 * (t * 5.0).cos();

        let wrist_y = |raised: bool| {
            if raised {
                RAISED_WRIST_Y + jitter_y
            } else {
                LOWERED_WRIST_Y + jitter_y
            }
        };

        let (right_up, left_up, confidence) = match pose {
            SimPose::RaiseRight => (true, false, STRONG_CONFIDENCE),
            SimPose::RaiseLeft => (false, true, STRONG_CONFIDENCE),
            SimPose::RaiseBoth => (true, true, STRONG_CONFIDENCE),
            SimPose::Rest => (false, false, STRONG_CONFIDENCE),
            SimPose::Weak => (true, false, WEAK_CONFIDENCE),
            SimPose::Absent => return None,
        };

        Some(PoseObservation {
            right_wrist: Landmark::new(RIGHT_SHOULDER_X + 40.0 + jitter_x, wrist_y(right_up), confidence),
            right_shoulder: Landmark::new(RIGHT_SHOULDER_X, SHOULDER_Y, STRONG_CONFIDENCE),
            left_wrist: Landmark::new(LEFT_SHOULDER_X - 40.0 + jitter_x, wrist_y(left_up), confidence),
            left_shoulder: Landmark::new(LEFT_SHOULDER_X, SHOULDER_Y, STRONG_CONFIDENCE),
        })
    }
}

impl PoseSource for SimulatedPoseSource {
    fn start(&mut self) -> Result<(), SourceError> {
        if self.deny_access {
            return Err(SourceError::PermissionDenied("camera access denied".into()));
        }
        self.started = true;
        Ok(())
    }

    fn next_frame(&mut self) -> Option<PoseFrame> {
        if !self.started {
            return None;
        }

        while let Some(phase) = self.phases.get(self.phase_index) {
            if self.phase_elapsed_ms < phase.duration_ms {
                break;
            }
            self.phase_index += 1;
            self.phase_elapsed_ms = 0;
        }
        let phase = *self.phases.get(self.phase_index)?;

        let frame = PoseFrame::new(self.sim_time_ms, self.observation(phase.pose));
        self.phase_elapsed_ms += self.tick_ms;
        self.sim_time_ms += self.tick_ms;
        Some(frame)
    }

    fn stop(&mut self) {
        self.started = false;
    }
}
