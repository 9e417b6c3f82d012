//! 7-bit RGB colors and the math the animations are built on.
//!
//! Pads accept channel intensities in `0..=127`, so [`Color`] keeps that
//! invariant for every value it holds. Interpolation goes through
//! `palette`'s [`Mix`] on `f32` channels and rounds back to integers.

use crate::types::SurfaceError;
use palette::{Mix, Srgb};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Highest intensity a single channel can carry.
pub const MAX_CHANNEL: u8 = 127;

/// Number of distinct idle rainbow phases before the pattern repeats.
pub const RAINBOW_PERIOD: u32 = 50;

/// An RGB color with each channel in `0..=127`.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(from = "[u8; 3]", into = "[u8; 3]")
)]
pub struct Color(Srgb<u8>);

impl Color {
    pub const OFF: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(127, 127, 127);
    pub const RED: Color = Color::new(127, 0, 0);
    pub const GREEN: Color = Color::new(0, 127, 0);
    pub const BLUE: Color = Color::new(0, 0, 127);
    pub const PURPLE: Color = Color::new(127, 0, 127);
    pub const CYAN: Color = Color::new(0, 127, 127);
    pub const YELLOW: Color = Color::new(127, 127, 0);
    pub const AMBER: Color = Color::new(127, 64, 0);

    /// Creates a color, clamping each channel to `0..=127`.
    #[inline]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Color(Srgb::new(clamp_channel(red), clamp_channel(green), clamp_channel(blue)))
    }

    /// Creates a color, rejecting channels above `127` instead of clamping.
    pub fn try_new(red: u8, green: u8, blue: u8) -> Result<Self, SurfaceError> {
        for channel in [red, green, blue] {
            if channel > MAX_CHANNEL {
                return Err(SurfaceError::ChannelOutOfRange(channel));
            }
        }
        Ok(Color(Srgb::new(red, green, blue)))
    }

    #[inline]
    pub fn red(&self) -> u8 {
        self.0.red
    }

    #[inline]
    pub fn green(&self) -> u8 {
        self.0.green
    }

    #[inline]
    pub fn blue(&self) -> u8 {
        self.0.blue
    }

    /// Returns the channels as `[red, green, blue]`.
    #[inline]
    pub fn channels(&self) -> [u8; 3] {
        [self.0.red, self.0.green, self.0.blue]
    }

    fn to_f32(self) -> Srgb<f32> {
        Srgb::new(
            f32::from(self.0.red),
            f32::from(self.0.green),
            f32::from(self.0.blue),
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::OFF
    }
}

impl core::fmt::Debug for Color {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Color({}, {}, {})", self.0.red, self.0.green, self.0.blue)
    }
}

impl From<[u8; 3]> for Color {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Color::new(red, green, blue)
    }
}

impl From<Color> for [u8; 3] {
    fn from(color: Color) -> Self {
        color.channels()
    }
}

impl From<Color> for Srgb<u8> {
    fn from(color: Color) -> Self {
        color.0
    }
}

const fn clamp_channel(value: u8) -> u8 {
    if value > MAX_CHANNEL { MAX_CHANNEL } else { value }
}

fn round_channel(value: f32) -> u8 {
    // Saturating float-to-int cast; the clamp keeps us inside 7 bits.
    value.round().clamp(0.0, f32::from(MAX_CHANNEL)) as u8
}

/// Linear interpolation between two colors.
///
/// `t` is clamped to `[0, 1]`. Each channel is rounded to the nearest
/// integer independently; both endpoints come back exactly.
pub fn lerp(from: Color, to: Color, t: f32) -> Color {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let mixed = from.to_f32().mix(to.to_f32(), t);
    Color(Srgb::new(
        round_channel(mixed.red),
        round_channel(mixed.green),
        round_channel(mixed.blue),
    ))
}

/// Scales every channel by `level / 127`, flooring.
///
/// Levels above `127` behave like `127`.
pub fn scale_brightness(color: Color, level: u8) -> Color {
    let level = u16::from(clamp_channel(level));
    let scale = |channel: u8| (u16::from(channel) * level / u16::from(MAX_CHANNEL)) as u8;
    Color(Srgb::new(
        scale(color.red()),
        scale(color.green()),
        scale(color.blue()),
    ))
}

/// Idle lightshow color for a phase.
///
/// Cycles every [`RAINBOW_PERIOD`] phases through three different integer
/// multipliers per channel (`x5`, `x3`, `x7`, each mod 127).
pub fn rainbow(phase: u32) -> Color {
    let offset = phase % RAINBOW_PERIOD;
    let channel = |multiplier: u32| (offset * multiplier % u32::from(MAX_CHANNEL)) as u8;
    Color(Srgb::new(channel(5), channel(3), channel(7)))
}
