//! Performance modes and the state machine that cycles through them.
//!
//! The surface is always in exactly one [`Mode`]. The mode button advances
//! `Session -> Mixer -> Effects -> Session`; each switch cancels in-flight
//! animations, fades the indicator to the new mode's color and repaints the
//! pads with the mode's policy.

use crate::animation::AnimationEngine;
use crate::color::Color;
use crate::config::{GridLayout, SurfaceConfig, Transition};
use crate::led::MidiOutput;
use crate::session::{ClipPalette, SessionView};
use crate::time::TimeSource;
use crate::types::{GridPosition, LedAddress, SurfaceError};
use log::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Performance mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    /// Pads launch clips and show their transport state.
    #[default]
    Session,
    /// Encoders control track volume and pan.
    Mixer,
    /// Encoders control device parameters.
    Effects,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Session, Mode::Mixer, Mode::Effects];

    /// Successor in the mode cycle.
    pub fn next(self) -> Self {
        match self {
            Mode::Session => Mode::Mixer,
            Mode::Mixer => Mode::Effects,
            Mode::Effects => Mode::Session,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Session => "Session",
            Mode::Mixer => "Mixer",
            Mode::Effects => "Effects",
        }
    }

    /// Color of the mode indicator LED.
    pub fn indicator_color(self) -> Color {
        match self {
            Mode::Session => Color::PURPLE,
            Mode::Mixer => Color::CYAN,
            Mode::Effects => Color::YELLOW,
        }
    }

    /// Control mapping the mode applies: pads launch clips in Session,
    /// encoders drive the host in the other two.
    pub fn mapping(self) -> ControlMapping {
        match self {
            Mode::Session => ControlMapping::ClipLaunch,
            Mode::Mixer => ControlMapping::VolumePan,
            Mode::Effects => ControlMapping::DeviceControls,
        }
    }

    /// Host parameter group for encoder movement, if encoders are mapped.
    pub fn encoder_mapping(self) -> Option<ControlMapping> {
        match self.mapping() {
            ControlMapping::ClipLaunch => None,
            mapping => Some(mapping),
        }
    }

    /// How the pads are colored in this mode.
    pub fn pad_policy(self) -> PadPolicy {
        match self {
            Mode::Session => PadPolicy::ClipState,
            Mode::Mixer => PadPolicy::Fixed(Color::new(0, 40, 40)),
            Mode::Effects => PadPolicy::Fixed(Color::new(40, 40, 0)),
        }
    }
}

impl core::fmt::Display for Mode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Control assignment for a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ControlMapping {
    ClipLaunch,
    VolumePan,
    DeviceControls,
}

/// Pad coloring rule of a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadPolicy {
    /// Each pad reflects its clip slot.
    ClipState,
    /// Every pad shows the same color.
    Fixed(Color),
}

/// Owns the current mode and repaints the surface for it.
#[derive(Debug, Clone)]
pub struct ModeStateMachine {
    mode: Mode,
    layout: GridLayout,
    indicator: LedAddress,
    indicator_transition: Transition,
    pad_transition: Transition,
    palette: ClipPalette,
}

impl ModeStateMachine {
    /// Starts in [`Mode::Session`].
    pub fn new(config: &SurfaceConfig) -> Self {
        Self {
            mode: Mode::Session,
            layout: config.layout,
            indicator: config.indicator,
            indicator_transition: config.indicator_transition,
            pad_transition: config.pad_transition,
            palette: ClipPalette::default(),
        }
    }

    /// Replaces the clip state palette used in Session mode.
    pub fn with_palette(mut self, palette: ClipPalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn palette(&self) -> &ClipPalette {
        &self.palette
    }

    /// Advances to the next mode and repaints.
    ///
    /// Every pending animation, idle lightshow included, is cancelled before
    /// the new mode's colors are scheduled.
    pub fn on_mode_switch<C, O, S>(&mut self, engine: &mut AnimationEngine<'_, C, O>, session: &S) -> Mode
    where
        C: TimeSource,
        O: MidiOutput,
        S: SessionView + ?Sized,
    {
        engine.cancel_animations();
        self.mode = self.mode.next();
        info!("switched to mode: {}", self.mode);
        self.refresh(engine, session);
        self.mode
    }

    /// Re-applies the indicator and pad colors of the current mode.
    pub fn refresh<C, O, S>(&self, engine: &mut AnimationEngine<'_, C, O>, session: &S)
    where
        C: TimeSource,
        O: MidiOutput,
        S: SessionView + ?Sized,
    {
        debug!("refreshing {} mode colors", self.mode);
        if let Err(err) = engine.interpolate(
            self.indicator,
            self.mode.indicator_color(),
            self.indicator_transition,
        ) {
            warn!("mode indicator not updated: {}", err);
        }

        for position in self.layout.positions() {
            if let Err(err) = self.update_pad(engine, session, position) {
                warn!("pad {} not updated: {}", position, err);
            }
        }
    }

    /// Fades one pad to the color the current mode gives it.
    ///
    /// The indicator LED is left alone when it sits inside the grid.
    pub fn update_pad<C, O, S>(
        &self,
        engine: &mut AnimationEngine<'_, C, O>,
        session: &S,
        position: GridPosition,
    ) -> Result<(), SurfaceError>
    where
        C: TimeSource,
        O: MidiOutput,
        S: SessionView + ?Sized,
    {
        let address = self
            .layout
            .address_of(position)
            .ok_or(SurfaceError::PositionOutOfRange(position))?;
        if address == self.indicator {
            return Ok(());
        }

        let target = match self.mode.pad_policy() {
            PadPolicy::ClipState => self.palette.color_of(session, position),
            PadPolicy::Fixed(color) => color,
        };
        engine.interpolate(address, target, self.pad_transition)?;
        Ok(())
    }
}
