//! Read-only view of the host session and the clip color policy.

use crate::color::Color;
use crate::types::GridPosition;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Clip slot queries answered by the host session.
///
/// The surface only ever reads these; it never changes transport state.
pub trait SessionView {
    fn has_clip(&self, position: GridPosition) -> bool;
    fn is_playing(&self, position: GridPosition) -> bool;
    fn is_triggered(&self, position: GridPosition) -> bool;
    fn is_recording(&self, position: GridPosition) -> bool;
}

impl<S: SessionView + ?Sized> SessionView for &S {
    fn has_clip(&self, position: GridPosition) -> bool {
        (**self).has_clip(position)
    }

    fn is_playing(&self, position: GridPosition) -> bool {
        (**self).is_playing(position)
    }

    fn is_triggered(&self, position: GridPosition) -> bool {
        (**self).is_triggered(position)
    }

    fn is_recording(&self, position: GridPosition) -> bool {
        (**self).is_recording(position)
    }
}

/// Transport state of one clip slot, as far as pad color is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ClipState {
    Empty,
    Stopped,
    Triggered,
    Playing,
    Recording,
}

impl ClipState {
    /// Resolves a slot's state by priority:
    /// recording > playing > triggered > stopped > empty.
    ///
    /// Higher-priority flags win regardless of the others, so a recording
    /// slot is `Recording` even if the host also reports it as playing.
    pub fn resolve<S: SessionView + ?Sized>(session: &S, position: GridPosition) -> Self {
        if session.is_recording(position) {
            ClipState::Recording
        } else if session.is_playing(position) {
            ClipState::Playing
        } else if session.is_triggered(position) {
            ClipState::Triggered
        } else if session.has_clip(position) {
            ClipState::Stopped
        } else {
            ClipState::Empty
        }
    }
}

/// Pad color for each clip state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClipPalette {
    pub empty: Color,
    pub stopped: Color,
    pub triggered: Color,
    pub playing: Color,
    pub recording: Color,
}

impl ClipPalette {
    pub fn color(&self, state: ClipState) -> Color {
        match state {
            ClipState::Empty => self.empty,
            ClipState::Stopped => self.stopped,
            ClipState::Triggered => self.triggered,
            ClipState::Playing => self.playing,
            ClipState::Recording => self.recording,
        }
    }

    /// Resolves a slot and returns its color.
    pub fn color_of<S: SessionView + ?Sized>(&self, session: &S, position: GridPosition) -> Color {
        self.color(ClipState::resolve(session, position))
    }
}

impl Default for ClipPalette {
    fn default() -> Self {
        Self {
            empty: Color::OFF,
            stopped: Color::new(0, 0, 48),
            triggered: Color::AMBER,
            playing: Color::GREEN,
            recording: Color::RED,
        }
    }
}
