// src/engine.rs
use nalgebra::Point2;
use tracing::{debug, info, warn};

use crate::accumulator::{Direction, GestureAccumulator, GestureState, GestureStatus};
use crate::classifier::GestureClassifier;
use crate::config::GestureConfig;
use crate::error::SourceError;
use crate::navigation::{NavigationCommand, NavigationSink};
use crate::pose::PoseFrame;
use crate::source::PoseSource;

/// What the viewer needs to draw after one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureFeedback {
    pub timestamp_ms: u64,
    pub status: GestureStatus,
    pub progress: f64,
    pub accumulated_ms: u64,
    pub hand_position: Option<Point2<f64>>,
    pub person_detected: bool,
    pub right_raised: bool,
    pub left_raised: bool,
    pub fired: Option<NavigationCommand>,
    pub current_index: usize,
}

impl GestureFeedback {
    /// Direction shown on the progress ring, if any.
    pub fn indicator(&self) -> Option<Direction> {
        match self.status {
            GestureStatus::Accumulating(direction) => Some(direction),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: usize,
    pub advances: usize,
    pub retreats: usize,
    pub final_index: usize,
}

/// Wires classifier, accumulator and navigation sink together.
///
/// The accumulator only exists while gesture control is enabled; disabling
/// drops it so a later enable starts from `Idle`.
pub struct GestureEngine<S: NavigationSink> {
    config: GestureConfig,
    classifier: GestureClassifier,
    accumulator: Option<GestureAccumulator>,
    sink: S,
    last_source_error: Option<String>,
}

impl<S: NavigationSink> GestureEngine<S> {
    pub fn new(config: GestureConfig, sink: S) -> Self {
        Self {
            classifier: GestureClassifier::new(&config),
            config,
            accumulator: None,
            sink,
            last_source_error: None,
        }
    }

    pub fn enable(&mut self) {
        if self.accumulator.is_none() {
            info!("Gesture control enabled");
            self.accumulator = Some(GestureAccumulator::new(self.config.clone()));
            self.last_source_error = None;
        }
    }

    pub fn disable(&mut self) {
        if self.accumulator.take().is_some() {
            info!("Gesture control disabled");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.accumulator.is_some()
    }

    /// Feeds one frame. Returns `None` while gesture control is disabled.
    pub fn observe(&mut self, frame: &PoseFrame) -> Option<GestureFeedback> {
        let accumulator = self.accumulator.as_mut()?;

        let signals = self.classifier.classify(frame.pose.as_ref());
        let fired = accumulator
            .tick(&signals, frame.timestamp_ms)
            .map(Direction::command);

        if let Some(command) = fired {
            self.sink.apply(command);
            info!(
                "Navigation {} -> page {}/{}",
                command.as_str(),
                self.sink.current_index() + 1,
                self.sink.page_count()
            );
        }

        let state = accumulator.state();
        Some(GestureFeedback {
            timestamp_ms: frame.timestamp_ms,
            status: state.status,
            progress: accumulator.progress(),
            accumulated_ms: state.accumulated_ms,
            hand_position: state.active_hand_position,
            person_detected: frame.pose.is_some(),
            right_raised: signals.right_raised(),
            left_raised: signals.left_raised(),
            fired,
            current_index: self.sink.current_index(),
        })
    }

    /// Direct user navigation, e.g. the prev/next buttons.
    pub fn click(&mut self, command: NavigationCommand) -> usize {
        self.sink.apply(command);
        debug!("Click {} -> page {}", command.as_str(), self.sink.current_index());
        self.sink.current_index()
    }

    /// Enables gesture control and drains `source` until it ends.
    ///
    /// A source that fails to start is reported once. The engine is only
    /// disabled again when this call was the one that enabled it, so
    /// progress held by an already enabled engine survives.
    pub fn run<P, F>(&mut self, source: &mut P, mut on_tick: F) -> Result<RunSummary, SourceError>
    where
        P: PoseSource,
        F: FnMut(&PoseFrame, &GestureFeedback),
    {
        let was_enabled = self.is_enabled();
        self.enable();
        if let Err(e) = source.start() {
            warn!("Pose source failed to start: {}", e);
            self.last_source_error = Some(e.to_string());
            if !was_enabled {
                self.disable();
            }
            return Err(e);
        }

        let mut summary = RunSummary::default();
        while let Some(frame) = source.next_frame() {
            let Some(feedback) = self.observe(&frame) else {
                break;
            };
            summary.frames += 1;
            match feedback.fired {
                Some(NavigationCommand::Advance) => summary.advances += 1,
                Some(NavigationCommand::Retreat) => summary.retreats += 1,
                None => {}
            }
            on_tick(&frame, &feedback);
        }

        source.stop();
        if !was_enabled {
            self.disable();
        }
        summary.final_index = self.sink.current_index();
        Ok(summary)
    }

    pub fn state(&self) -> Option<&GestureState> {
        self.accumulator.as_ref().map(|a| a.state())
    }

    pub fn progress(&self) -> f64 {
        self.accumulator.as_ref().map_or(0.0, |a| a.progress())
    }

    pub fn last_source_error(&self) -> Option<&str> {
        self.last_source_error.as_deref()
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
