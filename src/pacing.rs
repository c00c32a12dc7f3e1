use std::time::Duration;

use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

/// Slowest rate the controller will run at, in generations per second.
pub const MIN_RATE: f64 = 1.0;

/// Fastest rate the controller will run at, in generations per second.
pub const MAX_RATE: f64 = 1000.0;

/// Most generations a single tick hands out. Anything owed beyond it stays owed and is handed
/// out by the following ticks.
pub const MAX_STEPS_PER_TICK: u64 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingState {
    Stopped,
    Running,
}

/// What a single [`PacingController::tick`] decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The controller is stopped. Nothing may be stepped or rendered.
    Stopped,

    /// First tick after a start. The tick time became the anchor.
    Anchored,

    /// Less than one interval has elapsed since the anchor.
    Waiting,

    /// Step this many generations, then render once.
    Advance(u64),
}

/// Converts wall-clock time into whole generations.
///
/// Ticks may arrive at any cadence. Each tick that finds at least one interval elapsed since the
/// anchor yields `floor(elapsed / interval)` generations, at most [`MAX_STEPS_PER_TICK`], and moves
/// the anchor forward by exactly that many intervals, so the sub-interval remainder carries into
/// the next tick.
#[derive(Debug, Clone)]
pub struct PacingController {
    state: PacingState,

    /// Generations per second, within [`MIN_RATE`] and [`MAX_RATE`]
    rate: f64,

    /// Time of the last accounted interval boundary, in milliseconds
    anchor: Option<f64>,
}

impl PacingController {
    pub fn new(rate: f64) -> Self {
        Self {
            state: PacingState::Stopped,
            rate: clamp_rate(rate),
            anchor: None,
        }
    }

    pub fn state(&self) -> PacingState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PacingState::Running
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Change the rate. It applies from the next tick on; time already elapsed since the anchor
    /// is measured against the new interval. Returns the rate actually in effect.
    pub fn set_rate(&mut self, rate: f64) -> f64 {
        self.rate = clamp_rate(rate);
        self.rate
    }

    /// Milliseconds per generation at the current rate.
    pub fn interval_ms(&self) -> f64 {
        1000.0 / self.rate
    }

    /// Returns `true` if the controller was stopped and is now running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }

        self.state = PacingState::Running;
        self.anchor = None;
        info!(rate = self.rate, "pacing started");

        true
    }

    /// Returns `true` if the controller was running and is now stopped. Any tick that arrives
    /// afterwards reports [`Tick::Stopped`] until the next [`PacingController::start`].
    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }

        self.state = PacingState::Stopped;
        self.anchor = None;
        info!("pacing paused");

        true
    }

    /// Account for the time `now`, measured from any fixed origin the host likes.
    pub fn tick(&mut self, now: Duration) -> Tick {
        if !self.is_running() {
            return Tick::Stopped;
        }

        let now = now.as_nanos() as f64 / 1_000_000.0;

        let Some(anchor) = self.anchor else {
            self.anchor = Some(now);
            return Tick::Anchored;
        };

        let elapsed = now - anchor;
        let interval = self.interval_ms();

        // also catches a clock that went backwards
        if !(elapsed >= interval) {
            return Tick::Waiting;
        }

        let owed = (elapsed / interval).floor();
        let iterations = owed.min(MAX_STEPS_PER_TICK as f64);

        if iterations < owed {
            self.anchor = Some(anchor + iterations * interval);
            debug!(owed, iterations, "catch-up capped");
        } else {
            self.anchor = Some(now - elapsed % interval);
        }

        trace!(elapsed, interval, iterations, "tick");

        Tick::Advance(iterations as u64)
    }
}

impl Default for PacingController {
    fn default() -> Self {
        Self::new(60.0)
    }
}

/// Clamp the rate to [`MIN_RATE`]..=[`MAX_RATE`]. Anything non-finite becomes [`MIN_RATE`].
pub fn clamp_rate(rate: f64) -> f64 {
    if !rate.is_finite() || rate < MIN_RATE {
        warn!(rate, "rate clamped to {MIN_RATE}");
        MIN_RATE
    } else if rate > MAX_RATE {
        warn!(rate, "rate clamped to {MAX_RATE}");
        MAX_RATE
    } else {
        rate
    }
}
