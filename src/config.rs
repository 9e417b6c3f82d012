//! Surface configuration and the default constant table.
//!
//! Every timing and layout number the surface uses lives here so callers
//! never rely on implicit per-call defaults.

use crate::types::{GridPosition, LedAddress, SurfaceError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Upper bound on interpolation steps for a single transition.
pub const MAX_TRANSITION_STEPS: u16 = 64;

/// Duration and resolution of one color transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transition {
    /// Total time from the first write to the last.
    pub duration_ms: u64,

    /// Number of interpolation steps; a run issues `steps + 1` writes.
    pub steps: u16,
}

impl Transition {
    /// General-purpose fade.
    pub const DEFAULT: Transition = Transition::new(500, 20);

    /// One idle lightshow fade.
    pub const IDLE: Transition = Transition::new(500, 10);

    /// Pad updates from clip state or a mode palette.
    pub const PAD: Transition = Transition::new(200, 20);

    /// Mode indicator fade after a mode switch.
    pub const MODE_INDICATOR: Transition = Transition::new(1000, 20);

    /// Creates a transition.
    #[inline]
    pub const fn new(duration_ms: u64, steps: u16) -> Self {
        Self { duration_ms, steps }
    }

    /// Checks the step count against `1..=MAX_TRANSITION_STEPS`.
    pub fn validate(&self) -> Result<(), SurfaceError> {
        if self.steps == 0 {
            return Err(SurfaceError::ZeroSteps);
        }
        if self.steps > MAX_TRANSITION_STEPS {
            return Err(SurfaceError::TooManySteps {
                requested: self.steps,
                max: MAX_TRANSITION_STEPS,
            });
        }
        Ok(())
    }

    /// Delay of step `k` from the start of the run, floored to whole
    /// milliseconds.
    pub fn delay_at(&self, k: u16) -> u64 {
        if self.steps == 0 {
            return 0;
        }
        self.duration_ms.saturating_mul(u64::from(k)) / u64::from(self.steps)
    }
}

impl Default for Transition {
    fn default() -> Self {
        Transition::DEFAULT
    }
}

/// Row-major pad grid addressed by consecutive note numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridLayout {
    /// Note number of the pad at row 0, column 0.
    pub first_address: u8,
    pub rows: u8,
    pub columns: u8,
}

impl GridLayout {
    /// Creates a layout.
    pub const fn new(first_address: u8, rows: u8, columns: u8) -> Self {
        Self {
            first_address,
            rows,
            columns,
        }
    }

    /// Number of pads in the grid.
    pub fn len(&self) -> usize {
        usize::from(self.rows) * usize::from(self.columns)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// LED address of a grid position, or `None` outside the grid.
    pub fn address_of(&self, position: GridPosition) -> Option<LedAddress> {
        if position.row >= self.rows || position.column >= self.columns {
            return None;
        }
        let offset = u16::from(position.row) * u16::from(self.columns) + u16::from(position.column);
        let note = u16::from(self.first_address) + offset;
        u8::try_from(note).ok().map(LedAddress)
    }

    /// Grid position of an LED address, or `None` when it is not a pad.
    pub fn position_of(&self, address: LedAddress) -> Option<GridPosition> {
        let offset = address.0.checked_sub(self.first_address)?;
        if self.columns == 0 || usize::from(offset) >= self.len() {
            return None;
        }
        Some(GridPosition::new(offset / self.columns, offset % self.columns))
    }

    /// All positions, row by row.
    pub fn positions(&self) -> impl Iterator<Item = GridPosition> + use<> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |column| GridPosition::new(row, column)))
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        GridLayout::new(36, 1, 8)
    }
}

/// Inclusive range of LED addresses the surface accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LedBounds {
    pub first: u8,
    pub last: u8,
}

impl LedBounds {
    pub const fn new(first: u8, last: u8) -> Self {
        Self { first, last }
    }

    #[inline]
    pub fn contains(&self, address: LedAddress) -> bool {
        (self.first..=self.last).contains(&address.0)
    }

    /// Returns the address back when it is in range.
    pub fn check(&self, address: LedAddress) -> Result<LedAddress, SurfaceError> {
        if self.contains(address) {
            Ok(address)
        } else {
            Err(SurfaceError::AddressOutOfRange(address))
        }
    }
}

/// Everything the surface needs to know about the hardware and its timing.
///
/// `Default` reproduces the stock layout: eight pads on notes 36-43, the
/// mode button (and its indicator) on note 40, brightness on CC 14 and
/// eight encoders on CC 21-28, all on MIDI channel 1.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct SurfaceConfig {
    pub layout: GridLayout,

    /// LED that shows the active mode.
    pub indicator: LedAddress,

    /// Note number of the mode switch button.
    pub mode_button: u8,

    /// Controller number of the brightness knob.
    pub brightness_controller: u8,

    /// Controller number of the first encoder; the rest follow consecutively.
    pub first_encoder: u8,
    pub encoder_count: u8,

    /// Zero-based MIDI channel the surface listens on.
    pub midi_channel: u8,

    /// Delay from construction until the idle lightshow starts.
    pub idle_arm_delay_ms: u64,

    /// Period between idle lightshow steps.
    pub idle_period_ms: u64,

    pub idle_transition: Transition,
    pub pad_transition: Transition,
    pub indicator_transition: Transition,
}

impl SurfaceConfig {
    /// Address range covering the grid and the indicator.
    pub fn led_bounds(&self) -> LedBounds {
        let first = self.layout.first_address;
        let last = match self.layout.len() {
            0 => first,
            len => {
                let last = usize::from(first) + len - 1;
                u8::try_from(last).unwrap_or(u8::MAX)
            }
        };
        LedBounds::new(first.min(self.indicator.0), last.max(self.indicator.0))
    }

    /// Idle period with a floor of one millisecond, so an idle step can
    /// never come due again inside the delivery pass that scheduled it.
    pub fn effective_idle_period_ms(&self) -> u64 {
        self.idle_period_ms.max(1)
    }

    /// Controller numbers of the encoders.
    pub fn encoders(&self) -> impl Iterator<Item = u8> + use<> {
        let first = self.first_encoder;
        (0..self.encoder_count).filter_map(move |index| first.checked_add(index))
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            layout: GridLayout::default(),
            indicator: LedAddress(40),
            mode_button: 40,
            brightness_controller: 14,
            first_encoder: 21,
            encoder_count: 8,
            midi_channel: 0,
            idle_arm_delay_ms: 1000,
            idle_period_ms: 50,
            idle_transition: Transition::IDLE,
            pad_transition: Transition::PAD,
            indicator_transition: Transition::MODE_INDICATOR,
        }
    }
}
