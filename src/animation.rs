//! Interpolated color transitions and the idle lightshow.
//!
//! [`AnimationEngine`] turns "fade this LED to that color" into a run of
//! timed writes on the [`Scheduler`], and owns the idle lightshow that
//! keeps the surface moving until the first button press. All state the
//! scheduled work needs lives in the engine itself; tasks carry only plain
//! data and are dispatched by [`AnimationEngine::service`].

use crate::color::{self, Color};
use crate::config::{LedBounds, MAX_TRANSITION_STEPS, SurfaceConfig, Transition};
use crate::led::{LedState, MidiOutput};
use crate::scheduler::{CancelToken, Scheduler};
use crate::time::{TimeInstant, TimeSource};
use crate::types::{LedAddress, SurfaceError};
use heapless::Vec as BoundedVec;
use log::{debug, info, trace, warn};
use std::collections::BTreeSet;

/// One write of an interpolation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedWrite {
    /// Delay from the start of the run.
    pub delay_ms: u64,
    pub color: Color,
}

/// The `steps + 1` writes of one interpolation run, in firing order.
pub type InterpolationPlan = BoundedVec<PlannedWrite, { MAX_TRANSITION_STEPS as usize + 1 }>;

/// Computes the writes for a transition from `start` to `target`.
///
/// Write `k` lands at `transition.delay_at(k)` with `lerp(start, target, k / steps)`;
/// the last write is exactly `target`.
///
/// # Errors
/// * `ZeroSteps` - `transition.steps` is zero
/// * `TooManySteps` - `transition.steps` exceeds [`MAX_TRANSITION_STEPS`]
pub fn plan_interpolation(
    start: Color,
    target: Color,
    transition: Transition,
) -> Result<InterpolationPlan, SurfaceError> {
    transition.validate()?;

    let steps = transition.steps;
    let mut plan = InterpolationPlan::new();
    for k in 0..=steps {
        let color = if k == steps {
            target
        } else {
            color::lerp(start, target, f32::from(k) / f32::from(steps))
        };
        let write = PlannedWrite {
            delay_ms: transition.delay_at(k),
            color,
        };
        plan.push(write).map_err(|_| SurfaceError::TooManySteps {
            requested: steps,
            max: MAX_TRANSITION_STEPS,
        })?;
    }
    Ok(plan)
}

/// Work items the engine puts on its scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// One step of an interpolation run.
    Write {
        address: LedAddress,
        color: Color,
        run: CancelToken,
        last: bool,
    },
    /// Next frame of the idle lightshow.
    IdleStep,
    /// Start the idle lightshow.
    ArmIdle,
}

/// State of the idle lightshow.
///
/// At most one session is active. Its token groups the pending reschedule
/// together with every rainbow run it started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdleSession {
    active: bool,
    step: u32,
    token: Option<CancelToken>,
}

impl IdleSession {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of lightshow frames produced so far.
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Cancellation group of the running session.
    pub fn token(&self) -> Option<CancelToken> {
        self.token
    }
}

/// Timing for engine-driven animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationConfig {
    /// Fade used for each idle lightshow frame.
    pub idle_transition: Transition,

    /// Period between idle lightshow frames; at least one millisecond.
    pub idle_period_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            idle_transition: Transition::IDLE,
            idle_period_ms: 50,
        }
    }
}

impl From<&SurfaceConfig> for AnimationConfig {
    fn from(config: &SurfaceConfig) -> Self {
        Self {
            idle_transition: config.idle_transition,
            idle_period_ms: config.effective_idle_period_ms(),
        }
    }
}

/// Drives LED colors through scheduled, cancellable transitions.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `C` - Time source implementation type
/// * `O` - MIDI output implementation type
pub struct AnimationEngine<'t, C: TimeSource, O: MidiOutput> {
    leds: LedState<O>,
    scheduler: Scheduler<'t, C, Task>,
    idle: IdleSession,
    runs: BTreeSet<CancelToken>,
    config: AnimationConfig,
}

impl<'t, C: TimeSource, O: MidiOutput> AnimationEngine<'t, C, O> {
    /// Creates an engine with no LEDs touched and nothing scheduled.
    pub fn new(clock: &'t C, output: O, bounds: LedBounds, mut config: AnimationConfig) -> Self {
        config.idle_period_ms = config.idle_period_ms.max(1);
        Self {
            leds: LedState::new(output, bounds),
            scheduler: Scheduler::new(clock),
            idle: IdleSession::default(),
            runs: BTreeSet::new(),
            config,
        }
    }

    /// Fades `address` from its current color to `target`.
    ///
    /// The start color is read now; the run's writes are scheduled at
    /// `transition.delay_at(k)` and share a fresh cancellation group, which
    /// is returned. Nothing is scheduled when the request is rejected.
    pub fn interpolate(
        &mut self,
        address: LedAddress,
        target: Color,
        transition: Transition,
    ) -> Result<CancelToken, SurfaceError> {
        self.leds.bounds().check(address)?;
        transition.validate()?;

        let run = self.scheduler.token();
        self.schedule_run(run, address, target, transition)?;
        self.runs.insert(run);
        Ok(run)
    }

    fn schedule_run(
        &mut self,
        run: CancelToken,
        address: LedAddress,
        target: Color,
        transition: Transition,
    ) -> Result<(), SurfaceError> {
        let start = self.leds.get(address)?;
        let plan = plan_interpolation(start, target, transition)?;
        let last_index = plan.len() - 1;

        for (index, write) in plan.iter().enumerate() {
            let task = Task::Write {
                address,
                color: write.color,
                run,
                last: index == last_index,
            };
            self.scheduler.after_in(run, write.delay_ms, task);
        }
        Ok(())
    }

    /// Writes a color immediately, without a transition.
    pub fn set_color(&mut self, address: LedAddress, color: Color) -> Result<(), SurfaceError> {
        self.leds.set(address, color)
    }

    /// Scales every touched LED by `level / 127` and writes the result
    /// immediately.
    ///
    /// The scaled color replaces the stored one. A transport failure on one
    /// LED is logged and the rest are still written.
    pub fn apply_brightness(&mut self, level: u8) -> Result<(), SurfaceError> {
        if level > color::MAX_CHANNEL {
            return Err(SurfaceError::LevelOutOfRange(level));
        }

        let addresses: Vec<LedAddress> = self.leds.addresses().collect();
        for address in addresses {
            let current = self.leds.get(address)?;
            let scaled = color::scale_brightness(current, level);
            match self.leds.set(address, scaled) {
                Ok(()) | Err(SurfaceError::OutputUnavailable) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Schedules the one-shot start of the idle lightshow.
    ///
    /// The arming is independent of animation runs and survives
    /// [`cancel_animations`](Self::cancel_animations).
    pub fn arm_idle(&mut self, delay_ms: u64) -> CancelToken {
        debug!("idle lightshow armed in {} ms", delay_ms);
        self.scheduler.after(delay_ms, Task::ArmIdle)
    }

    /// Starts the idle lightshow from frame zero.
    ///
    /// An already running session is cancelled first, so there is never
    /// more than one.
    pub fn start_idle(&mut self) {
        if let Some(token) = self.idle.token.take() {
            self.scheduler.cancel(token);
        }

        info!("starting idle lightshow");
        self.idle = IdleSession {
            active: true,
            step: 0,
            token: Some(self.scheduler.token()),
        };
        self.idle_step();
    }

    fn idle_step(&mut self) {
        if !self.idle.active {
            return;
        }
        let Some(token) = self.idle.token else {
            return;
        };

        trace!("idle frame {}", self.idle.step);
        let addresses: Vec<LedAddress> = self.leds.addresses().collect();
        for address in addresses {
            let phase = u32::from(address.0).wrapping_add(self.idle.step);
            let target = color::rainbow(phase);
            if let Err(err) = self.schedule_run(token, address, target, self.config.idle_transition) {
                warn!("idle frame skipped {}: {}", address, err);
            }
        }

        self.idle.step = self.idle.step.wrapping_add(1);
        self.scheduler.after_in(token, self.config.idle_period_ms, Task::IdleStep);
    }

    /// Stops the idle lightshow.
    ///
    /// Cancels the pending frame and every rainbow run still in flight.
    /// Returns whether a session was active; calling it again is a no-op.
    pub fn stop_idle(&mut self) -> bool {
        let was_active = self.idle.active;
        self.idle.active = false;
        if let Some(token) = self.idle.token.take() {
            let dropped = self.scheduler.cancel(token);
            info!("idle lightshow stopped, {} pending writes dropped", dropped);
        }
        was_active
    }

    /// Cancels one interpolation run. Returns how many writes were dropped.
    pub fn cancel(&mut self, run: CancelToken) -> usize {
        self.runs.remove(&run);
        self.scheduler.cancel(run)
    }

    /// Stops idle and cancels every interpolation run still in flight.
    pub fn cancel_animations(&mut self) {
        self.stop_idle();
        for run in std::mem::take(&mut self.runs) {
            self.scheduler.cancel(run);
        }
    }

    /// Delivers every task that has come due.
    ///
    /// # Returns
    /// * `Some(duration)` - service again after this long
    /// * `None` - nothing is scheduled
    pub fn service(&mut self) -> Option<<C::Instant as TimeInstant>::Duration> {
        while let Some(task) = self.scheduler.pop_due() {
            self.dispatch(task);
        }
        self.scheduler.next_due_in()
    }

    fn dispatch(&mut self, task: Task) {
        match task {
            Task::Write {
                address,
                color,
                run,
                last,
            } => {
                if last {
                    self.runs.remove(&run);
                }
                if let Err(err) = self.leds.set(address, color) {
                    warn!("scheduled write to {} failed: {}", address, err);
                }
            }
            Task::IdleStep => self.idle_step(),
            Task::ArmIdle => {
                debug!("no-input timeout elapsed");
                self.start_idle();
            }
        }
    }

    /// Scheduled writes for one LED as `(delay from now, color)`, in
    /// firing order.
    pub fn pending_writes(&self, address: LedAddress) -> Vec<(u64, Color)> {
        let now = self.scheduler.now_ms();
        self.scheduler
            .iter()
            .filter_map(|(fire_at, _, task)| match *task {
                Task::Write {
                    address: target,
                    color,
                    ..
                } if target == address => Some((fire_at.saturating_sub(now), color)),
                _ => None,
            })
            .collect()
    }

    /// Interpolation runs that still have writes pending.
    pub fn active_runs(&self) -> usize {
        self.runs.len()
    }

    /// Drops all scheduled work, forgets every LED color and ends idle.
    pub fn reset(&mut self) {
        let dropped = self.scheduler.cancel_all();
        self.leds.reset();
        self.idle = IdleSession::default();
        self.runs.clear();
        info!("surface reset, {} pending tasks dropped", dropped);
    }

    pub fn idle(&self) -> &IdleSession {
        &self.idle
    }

    pub fn leds(&self) -> &LedState<O> {
        &self.leds
    }

    pub fn leds_mut(&mut self) -> &mut LedState<O> {
        &mut self.leds
    }

    pub fn scheduler(&self) -> &Scheduler<'t, C, Task> {
        &self.scheduler
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }
}
