// src/accumulator.rs
//! Debounces raised-arm signals into confirmed navigation commands.
//!
//! A raised arm has to be held long enough to fill the threshold. Gaps in the
//! signal drain the accumulated time at a fixed rate per tick, and every
//! confirmed gesture is followed by a cooldown during which signals are
//! ignored.

use nalgebra::Point2;
use serde::Serialize;
use tracing::{debug, info};

use crate::classifier::ArmSignals;
use crate::config::GestureConfig;
use crate::navigation::NavigationCommand;
use crate::pose::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Next,
    Prev,
}

impl Direction {
    pub fn from_side(side: Side) -> Self {
        match side {
            Side::Right => Direction::Next,
            Side::Left => Direction::Prev,
        }
    }

    pub fn command(self) -> NavigationCommand {
        match self {
            Direction::Next => NavigationCommand::Advance,
            Direction::Prev => NavigationCommand::Retreat,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Next => "next",
            Direction::Prev => "prev",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureStatus {
    Idle,
    Accumulating(Direction),
    Cooldown,
}

impl GestureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureStatus::Idle => "idle",
            GestureStatus::Accumulating(Direction::Next) => "next",
            GestureStatus::Accumulating(Direction::Prev) => "prev",
            GestureStatus::Cooldown => "cooldown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GestureState {
    pub status: GestureStatus,
    /// Always below the threshold between ticks.
    pub accumulated_ms: u64,
    pub last_fired_at: Option<u64>,
    /// UI feedback only.
    pub active_hand_position: Option<Point2<f64>>,
}

impl Default for GestureState {
    fn default() -> Self {
        Self {
            status: GestureStatus::Idle,
            accumulated_ms: 0,
            last_fired_at: None,
            active_hand_position: None,
        }
    }
}

/// Result of feeding one tick through [`transition`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: GestureState,
    pub fired: Option<Direction>,
    /// Percentage of the threshold filled, `0.0..=100.0`.
    pub progress: f64,
}

fn progress_of(accumulated_ms: u64, threshold_ms: u64) -> f64 {
    (accumulated_ms as f64 * 100.0 / threshold_ms as f64).min(100.0)
}

/// Pure state transition for one tick.
pub fn transition(
    config: &GestureConfig,
    state: &GestureState,
    signals: &ArmSignals,
    now_ms: u64,
    delta_ms: u64,
) -> Transition {
    let dominant = signals.dominant();
    let mut next = state.clone();
    next.active_hand_position = dominant.map(|(_, p)| p);

    if state.status == GestureStatus::Cooldown {
        let cooling = state
            .last_fired_at
            .map_or(false, |fired| now_ms < fired.saturating_add(config.cooldown_ms));
        if cooling {
            return Transition {
                state: next,
                fired: None,
                progress: 0.0,
            };
        }
        next.status = GestureStatus::Idle;
        next.accumulated_ms = 0;
    }

    let Some((side, _)) = dominant else {
        next.accumulated_ms = next.accumulated_ms.saturating_sub(config.decay_per_tick_ms);
        if next.accumulated_ms == 0 {
            next.status = GestureStatus::Idle;
        }
        let progress = progress_of(next.accumulated_ms, config.threshold_ms);
        return Transition {
            state: next,
            fired: None,
            progress,
        };
    };

    let direction = Direction::from_side(side);
    if let GestureStatus::Accumulating(current) = next.status {
        if current != direction {
            // Switching arms starts the new direction from zero
            next.accumulated_ms = 0;
        }
    }
    next.status = GestureStatus::Accumulating(direction);
    next.accumulated_ms = next.accumulated_ms.saturating_add(delta_ms);

    if next.accumulated_ms >= config.threshold_ms {
        next.status = GestureStatus::Cooldown;
        next.accumulated_ms = 0;
        next.last_fired_at = Some(now_ms);
        next.active_hand_position = None;
        return Transition {
            state: next,
            fired: Some(direction),
            progress: 0.0,
        };
    }

    let progress = progress_of(next.accumulated_ms, config.threshold_ms);
    Transition {
        state: next,
        fired: None,
        progress,
    }
}

/// Stateful wrapper around [`transition`] that measures tick deltas.
#[derive(Debug, Clone)]
pub struct GestureAccumulator {
    config: GestureConfig,
    state: GestureState,
    last_tick_at: Option<u64>,
    progress: f64,
}

impl GestureAccumulator {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: GestureState::default(),
            last_tick_at: None,
            progress: 0.0,
        }
    }

    pub fn tick(&mut self, signals: &ArmSignals, now_ms: u64) -> Option<Direction> {
        // Out-of-order timestamps contribute nothing
        let delta_ms = self
            .last_tick_at
            .map(|last| now_ms.saturating_sub(last))
            .unwrap_or(self.config.nominal_tick_ms);
        self.last_tick_at = Some(now_ms);

        let step = transition(&self.config, &self.state, signals, now_ms, delta_ms);

        if step.state.status != self.state.status {
            debug!(
                "Gesture status {} -> {} (accumulated {}ms)",
                self.state.status.as_str(),
                step.state.status.as_str(),
                step.state.accumulated_ms
            );
        }
        if let Some(direction) = step.fired {
            info!("Gesture confirmed: {} at {}ms", direction.as_str(), now_ms);
        }

        self.state = step.state;
        self.progress = step.progress;
        step.fired
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.state = GestureState::default();
        self.last_tick_at = None;
        self.progress = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn right() -> ArmSignals {
        ArmSignals {
            right: Some(Point2::new(240.0, 40.0)),
            left: None,
        }
    }

    fn left() -> ArmSignals {
        ArmSignals {
            right: None,
            left: Some(Point2::new(80.0, 40.0)),
        }
    }

    fn feed(acc: &mut GestureAccumulator, signals: ArmSignals, ticks: usize, start_ms: u64) -> (Vec<Direction>, u64) {
        let mut fired = Vec::new();
        let mut now = start_ms;
        for _ in 0..ticks {
            if let Some(d) = acc.tick(&signals, now) {
                fired.push(d);
            }
            now += 16;
        }
        (fired, now)
    }

    #[test]
    fn test_transition_accumulates_from_idle() {
        let config = GestureConfig::default();
        let step = transition(&config, &GestureState::default(), &right(), 0, 250);

        assert_eq!(step.state.status, GestureStatus::Accumulating(Direction::Next));
        assert_eq!(step.state.accumulated_ms, 250);
        assert_eq!(step.progress, 25.0);
        assert!(step.fired.is_none());
        assert_eq!(step.state.active_hand_position, Some(Point2::new(240.0, 40.0)));
    }

    #[test]
    fn test_transition_fires_at_threshold() {
        let config = GestureConfig::default();
        let state = GestureState {
            status: GestureStatus::Accumulating(Direction::Prev),
            accumulated_ms: 990,
            ..GestureState::default()
        };
        let step = transition(&config, &state, &left(), 5000, 16);

        assert_eq!(step.fired, Some(Direction::Prev));
        assert_eq!(step.state.status, GestureStatus::Cooldown);
        assert_eq!(step.state.accumulated_ms, 0);
        assert_eq!(step.state.last_fired_at, Some(5000));
        assert!(step.state.active_hand_position.is_none());
        assert_eq!(step.progress, 0.0);
    }

    #[test]
    fn test_cooldown_ignores_signal_until_elapsed() {
        let config = GestureConfig::default();
        let state = GestureState {
            status: GestureStatus::Cooldown,
            last_fired_at: Some(1000),
            ..GestureState::default()
        };

        let held = transition(&config, &state, &right(), 2999, 16);
        assert_eq!(held.state.status, GestureStatus::Cooldown);
        assert_eq!(held.state.accumulated_ms, 0);
        assert_eq!(held.progress, 0.0);

        let released = transition(&config, &state, &right(), 3000, 16);
        assert_eq!(released.state.status, GestureStatus::Accumulating(Direction::Next));
        assert_eq!(released.state.accumulated_ms, 16);
    }

    #[test]
    fn test_cooldown_expires_to_idle_without_signal() {
        let config = GestureConfig::default();
        let state = GestureState {
            status: GestureStatus::Cooldown,
            last_fired_at: Some(0),
            ..GestureState::default()
        };
        let step = transition(&config, &state, &ArmSignals::none(), 2000, 16);
        assert_eq!(step.state.status, GestureStatus::Idle);
    }

    #[test]
    fn test_no_signal_decays_by_fixed_step() {
        let config = GestureConfig::default();
        let state = GestureState {
            status: GestureStatus::Accumulating(Direction::Next),
            accumulated_ms: 120,
            ..GestureState::default()
        };

        // Delta is irrelevant to decay
        let step = transition(&config, &state, &ArmSignals::none(), 0, 500);
        assert_eq!(step.state.accumulated_ms, 70);
        assert_eq!(step.state.status, GestureStatus::Accumulating(Direction::Next));
        assert_eq!(step.progress, 7.0);

        let step = transition(&config, &step.state, &ArmSignals::none(), 0, 16);
        let step = transition(&config, &step.state, &ArmSignals::none(), 0, 16);
        assert_eq!(step.state.accumulated_ms, 0);
        assert_eq!(step.state.status, GestureStatus::Idle);
        assert_eq!(step.progress, 0.0);
    }

    #[test]
    fn test_direction_switch_restarts_from_zero() {
        let config = GestureConfig::default();
        let state = GestureState {
            status: GestureStatus::Accumulating(Direction::Next),
            accumulated_ms: 900,
            ..GestureState::default()
        };
        let step = transition(&config, &state, &left(), 0, 16);

        assert_eq!(step.state.status, GestureStatus::Accumulating(Direction::Prev));
        assert_eq!(step.state.accumulated_ms, 16);
        assert!(step.fired.is_none());
    }

    #[test]
    fn test_sustained_raise_fires_once_then_cools_down() {
        let mut acc = GestureAccumulator::new(GestureConfig::default());

        let (fired, now) = feed(&mut acc, right(), 62, 0);
        assert!(fired.is_empty());
        assert_eq!(acc.state().accumulated_ms, 992);

        let (fired, now) = feed(&mut acc, right(), 1, now);
        assert_eq!(fired, vec![Direction::Next]);
        assert_eq!(acc.state().status, GestureStatus::Cooldown);

        // 992 + 2000 is the end of the window; ticks before it stay quiet
        let (fired, _) = feed(&mut acc, right(), 124, now);
        assert!(fired.is_empty());
        assert_eq!(acc.state().status, GestureStatus::Cooldown);
    }

    #[test]
    fn test_first_tick_uses_nominal_delta() {
        let mut acc = GestureAccumulator::new(GestureConfig::default());
        acc.tick(&right(), 10_000);
        assert_eq!(acc.state().accumulated_ms, 16);
    }

    #[test]
    fn test_backwards_timestamp_adds_nothing() {
        let mut acc = GestureAccumulator::new(GestureConfig::default());
        acc.tick(&right(), 100);
        acc.tick(&right(), 50);
        assert_eq!(acc.state().accumulated_ms, 16);
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut acc = GestureAccumulator::new(GestureConfig::default());
        feed(&mut acc, left(), 10, 0);
        assert!(acc.progress() > 0.0);

        acc.reset();
        assert_eq!(acc.state(), &GestureState::default());
        assert_eq!(acc.progress(), 0.0);
    }
}
