#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Color`**: 7-bit RGB value with `lerp`, `scale_brightness` and the idle `rainbow`
//! - **`LedState`**: Current color of every LED; the only path to MIDI output
//! - **`MidiOutput`**: Trait to implement for your MIDI transport
//! - **`Scheduler`**: Time-ordered task queue with group cancellation (`CancelToken`)
//! - **`AnimationEngine`**: Interpolated transitions and the idle lightshow
//! - **`ModeStateMachine`**: Session / Mixer / Effects cycle and per-mode pad colors
//! - **`SessionView`**: Trait to implement for the host's clip slots
//! - **`InputReactor`**: Routes surface input to all of the above
//! - **`SurfaceEvent`**: What the host should do after an input (launch a clip, apply an encoder)
//! - **`TimeSource`**: Trait to implement for your timing system (`SystemClock` on std)
//!
//! Nothing here blocks or spawns threads. The host calls
//! [`InputReactor::service`] from its loop and sleeps for the duration it
//! returns; every color write happens inside that call.

pub mod animation;
pub mod color;
pub mod config;
pub mod led;
pub mod midi;
pub mod mode;
pub mod reactor;
pub mod scheduler;
pub mod session;
pub mod subscription;
pub mod time;
pub mod types;

pub use animation::{AnimationConfig, AnimationEngine, IdleSession, PlannedWrite, Task, plan_interpolation};
pub use color::Color;
pub use config::{GridLayout, LedBounds, MAX_TRANSITION_STEPS, SurfaceConfig, Transition};
pub use led::{LedState, MidiOutput};
pub use midi::MidiMessage;
pub use mode::{ControlMapping, Mode, ModeStateMachine, PadPolicy};
pub use reactor::{EncoderAssignment, InputReactor, SurfaceEvent};
pub use scheduler::{CancelToken, Scheduler};
pub use session::{ClipPalette, ClipState, SessionView};
pub use subscription::{Binding, Source, Subscription, Subscriptions};
pub use time::{SystemClock, TimeDuration, TimeInstant, TimeSource};
pub use types::{GridPosition, LedAddress, SurfaceError};
