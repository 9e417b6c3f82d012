//! Core value types and the crate error.

use crate::subscription::{Binding, Source};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifies one physical pad or indicator LED.
///
/// On the wire this is the MIDI note number the surface lights, so it is
/// stable for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct LedAddress(pub u8);

impl From<u8> for LedAddress {
    fn from(note: u8) -> Self {
        LedAddress(note)
    }
}

impl From<LedAddress> for u8 {
    fn from(address: LedAddress) -> Self {
        address.0
    }
}

impl core::fmt::Display for LedAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "led {}", self.0)
    }
}

/// A cell of the pad grid, row-major from the top-left pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridPosition {
    /// Zero-based row.
    pub row: u8,

    /// Zero-based column.
    pub column: u8,
}

impl GridPosition {
    /// Creates a grid position.
    #[inline]
    pub const fn new(row: u8, column: u8) -> Self {
        Self { row, column }
    }
}

impl core::fmt::Display for GridPosition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Errors reported at the API boundary of the surface.
///
/// None of these are fatal. Callers on the input path log them and leave
/// the surface unchanged for the offending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceError {
    /// Address outside the declared LED range.
    AddressOutOfRange(LedAddress),

    /// Grid position outside the configured layout.
    PositionOutOfRange(GridPosition),

    /// A color channel above the 7-bit maximum.
    ChannelOutOfRange(u8),

    /// A brightness level above the 7-bit maximum.
    LevelOutOfRange(u8),

    /// Transition with zero interpolation steps.
    ZeroSteps,

    /// Transition with more steps than an interpolation plan can hold.
    TooManySteps {
        requested: u16,
        max: u16,
    },

    /// A control is already bound in the subscription registry.
    AlreadySubscribed {
        source: Source,
        number: u8,
    },

    /// A control of this kind cannot drive the requested binding.
    BindingMismatch {
        source: Source,
        number: u8,
        binding: Binding,
    },

    /// The MIDI output rejected a write.
    OutputUnavailable,
}

impl core::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SurfaceError::AddressOutOfRange(address) => {
                write!(f, "{} is outside the declared surface", address)
            }
            SurfaceError::PositionOutOfRange(position) => {
                write!(f, "grid position {} is outside the layout", position)
            }
            SurfaceError::ChannelOutOfRange(value) => {
                write!(f, "color channel {} exceeds 127", value)
            }
            SurfaceError::LevelOutOfRange(level) => {
                write!(f, "brightness level {} exceeds 127", level)
            }
            SurfaceError::ZeroSteps => {
                write!(f, "transition must have at least one step")
            }
            SurfaceError::TooManySteps { requested, max } => {
                write!(
                    f,
                    "transition requests {} steps, at most {} are supported",
                    requested, max
                )
            }
            SurfaceError::AlreadySubscribed { source, number } => {
                write!(f, "{:?} {} is already subscribed", source, number)
            }
            SurfaceError::BindingMismatch { source, number, binding } => {
                write!(f, "{:?} {} cannot drive {:?}", source, number, binding)
            }
            SurfaceError::OutputUnavailable => {
                write!(f, "MIDI output unavailable")
            }
        }
    }
}

impl std::error::Error for SurfaceError {}
