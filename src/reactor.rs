//! Input handling for the whole surface.
//!
//! [`InputReactor`] owns the animation engine, the mode state machine, the
//! host session view and the control registry. Raw MIDI comes in through
//! [`InputReactor::handle_midi`], is routed through the registry and ends up
//! as mode switches, idle exits, brightness changes, or [`SurfaceEvent`]s
//! the host acts on.

use crate::animation::{AnimationConfig, AnimationEngine};
use crate::config::SurfaceConfig;
use crate::led::MidiOutput;
use crate::midi::MidiMessage;
use crate::mode::{ControlMapping, Mode, ModeStateMachine};
use crate::session::SessionView;
use crate::subscription::{Binding, Source, Subscription, Subscriptions};
use crate::time::{TimeInstant, TimeSource};
use crate::types::{GridPosition, LedAddress, SurfaceError};
use log::{debug, info, warn};

/// Where an encoder value should be applied under the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderAssignment {
    /// Host parameter group; `None` in Session mode, where encoders are unmapped.
    pub mapping: Option<ControlMapping>,
    /// Zero-based encoder index.
    pub index: u8,
    /// Absolute encoder level, `0..=127`.
    pub value: u8,
}

/// Input the host has to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// A pad was pressed in Session mode.
    LaunchClip(GridPosition),
    /// An encoder moved.
    Encoder(EncoderAssignment),
}

/// Routes surface input to modes and animations.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `C` - Time source implementation type
/// * `O` - MIDI output implementation type
/// * `S` - Host session view
pub struct InputReactor<'t, C: TimeSource, O: MidiOutput, S: SessionView> {
    engine: AnimationEngine<'t, C, O>,
    modes: ModeStateMachine,
    session: S,
    subscriptions: Subscriptions,
    config: SurfaceConfig,
}

impl<'t, C: TimeSource, O: MidiOutput, S: SessionView> InputReactor<'t, C, O, S> {
    /// Brings the surface up in Session mode.
    ///
    /// Binds the stock controls, paints the Session mode colors and arms
    /// the idle lightshow once. The arming is never renewed by later input.
    /// It is scheduled after the initial paint so the lightshow starts from
    /// settled colors when both come due together.
    pub fn new(clock: &'t C, output: O, session: S, config: SurfaceConfig) -> Self {
        let engine = AnimationEngine::new(clock, output, config.led_bounds(), AnimationConfig::from(&config));
        let mut reactor = Self {
            engine,
            modes: ModeStateMachine::new(&config),
            session,
            subscriptions: Subscriptions::new(),
            config,
        };

        reactor.bind_controls();
        reactor.refresh();
        reactor.engine.arm_idle(reactor.config.idle_arm_delay_ms);
        reactor
    }

    fn bind_controls(&mut self) {
        let mut bindings = vec![(Source::Note, self.config.mode_button, Binding::ModeSwitch)];
        for position in self.config.layout.positions() {
            if let Some(address) = self.config.layout.address_of(position) {
                if address.0 != self.config.mode_button {
                    bindings.push((Source::Note, address.0, Binding::Pad));
                }
            }
        }
        bindings.push((Source::ControlChange, self.config.brightness_controller, Binding::Brightness));
        for (index, controller) in (0u8..).zip(self.config.encoders()) {
            bindings.push((Source::ControlChange, controller, Binding::Encoder(index)));
        }

        for (source, number, binding) in bindings {
            if let Err(err) = self.subscriptions.subscribe(source, number, binding) {
                warn!("control not bound: {}", err);
            }
        }
    }

    /// Binds an additional control.
    pub fn subscribe(&mut self, source: Source, number: u8, binding: Binding) -> Result<Subscription, SurfaceError> {
        self.subscriptions.subscribe(source, number, binding)
    }

    /// Releases one control binding.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.subscriptions.release(subscription)
    }

    /// Handles one raw MIDI message from the surface.
    ///
    /// Messages on other channels, of other kinds, or from unbound controls
    /// are ignored. Returns an event when the host has something to do.
    pub fn handle_midi(&mut self, bytes: &[u8]) -> Option<SurfaceEvent> {
        let Some(message) = MidiMessage::parse(bytes) else {
            debug!("ignoring MIDI message {:02X?}", bytes);
            return None;
        };
        if message.channel() != self.config.midi_channel {
            debug!("ignoring message on channel {}", message.channel());
            return None;
        }

        match message {
            MidiMessage::NoteOn { note, velocity, .. } => self.on_note(note, velocity),
            MidiMessage::NoteOff { note, .. } => self.on_note(note, 0),
            MidiMessage::ControlChange { controller, value, .. } => self.on_control(controller, value),
        }
    }

    /// A button sent `value`; anything above zero is a press.
    ///
    /// Any pad press ends the idle lightshow. In Session mode it also asks
    /// the host to launch the clip under the pad.
    pub fn on_note(&mut self, note: u8, value: u8) -> Option<SurfaceEvent> {
        let Some(binding) = self.subscriptions.binding(Source::Note, note) else {
            debug!("note {} is not bound", note);
            return None;
        };
        if value == 0 {
            return None;
        }

        match binding {
            Binding::ModeSwitch => {
                self.on_mode_switch();
                None
            }
            Binding::Pad => {
                self.exit_idle();
                self.launch_clip(note)
            }
            Binding::Brightness | Binding::Encoder(_) => {
                debug!("note {} bound to {:?}, ignoring", note, binding);
                None
            }
        }
    }

    fn launch_clip(&self, note: u8) -> Option<SurfaceEvent> {
        if self.modes.mode().mapping() != ControlMapping::ClipLaunch {
            return None;
        }
        let position = self.config.layout.position_of(LedAddress(note))?;
        debug!("launching clip at {}", position);
        Some(SurfaceEvent::LaunchClip(position))
    }

    /// A knob or encoder moved to `value`.
    ///
    /// Every bound control ends the idle lightshow before it is routed.
    pub fn on_control(&mut self, controller: u8, value: u8) -> Option<SurfaceEvent> {
        let binding = self.subscriptions.binding(Source::ControlChange, controller)?;
        match binding {
            Binding::Brightness => {
                self.on_brightness(value);
                None
            }
            Binding::Encoder(index) => {
                self.exit_idle();
                Some(SurfaceEvent::Encoder(EncoderAssignment {
                    mapping: self.modes.mode().encoder_mapping(),
                    index,
                    value,
                }))
            }
            Binding::Pad | Binding::ModeSwitch => {
                debug!("controller {} bound to {:?}, ignoring", controller, binding);
                None
            }
        }
    }

    /// Advances to the next mode.
    pub fn on_mode_switch(&mut self) {
        self.modes.on_mode_switch(&mut self.engine, &self.session);
    }

    /// Applies the brightness knob level to every touched LED.
    ///
    /// Idle is stopped without a repaint so the scaled colors stay put.
    pub fn on_brightness(&mut self, level: u8) {
        self.engine.stop_idle();
        if let Err(err) = self.engine.apply_brightness(level) {
            warn!("brightness change rejected: {}", err);
        }
    }

    /// The host reports a clip slot changed state.
    ///
    /// Only repaints in Session mode; other modes do not show clip state.
    pub fn on_clip_state_changed(&mut self, position: GridPosition) {
        if self.modes.mode() != Mode::Session {
            debug!("clip change at {} ignored in {} mode", position, self.modes.mode());
            return;
        }
        if let Err(err) = self.modes.update_pad(&mut self.engine, &self.session, position) {
            warn!("clip change at {} rejected: {}", position, err);
        }
    }

    /// Repaints the current mode without changing it.
    pub fn refresh(&mut self) {
        self.modes.refresh(&mut self.engine, &self.session);
    }

    fn exit_idle(&mut self) {
        if self.engine.stop_idle() {
            self.refresh();
        }
    }

    /// Delivers due animation work. See [`AnimationEngine::service`].
    pub fn service(&mut self) -> Option<<C::Instant as TimeInstant>::Duration> {
        self.engine.service()
    }

    /// Tears the surface down: releases every control and drops all
    /// scheduled work and LED state. Returns how many controls were bound.
    ///
    /// Dropping the reactor does the same, so an explicit call is only
    /// needed to keep using the reactor afterwards.
    pub fn disconnect(&mut self) -> usize {
        let released = self.subscriptions.release_all();
        self.engine.reset();
        info!("disconnected, {} controls released", released);
        released
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn engine(&self) -> &AnimationEngine<'t, C, O> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut AnimationEngine<'t, C, O> {
        &mut self.engine
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Host session view, for hosts that update it in place.
    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }
}

impl<C: TimeSource, O: MidiOutput, S: SessionView> Drop for InputReactor<'_, C, O, S> {
    fn drop(&mut self) {
        if !self.subscriptions.is_empty() {
            self.disconnect();
        }
    }
}
