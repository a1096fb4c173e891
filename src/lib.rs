// src/lib.rs
//! Raised-arm gesture navigation for a paginated section viewer.
//!
//! Pose frames go through the [`classifier`], the [`accumulator`] turns
//! sustained raised-arm signals into navigation commands, and the
//! [`engine`] applies them to a [`navigation::NavigationSink`].

pub mod accumulator;
pub mod actor;
pub mod classifier;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod navigation;
pub mod pose;
pub mod simulation;
pub mod source;

pub use accumulator::{transition, Direction, GestureAccumulator, GestureState, GestureStatus, Transition};
pub use classifier::{ArmSignals, GestureClassifier};
pub use config::{GestureConfig, Settings};
pub use engine::{GestureEngine, GestureFeedback, RunSummary};
pub use error::{ConfigError, EngineClosed, NavigationError, ScriptError, SourceError};
pub use navigation::{NavigationCommand, NavigationSink, SectionDeck};
pub use pose::{Landmark, PoseFrame, PoseObservation, Side};
pub use source::{PoseSource, PoseTrace, TraceSource};
