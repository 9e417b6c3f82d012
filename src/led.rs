//! Authoritative per-LED color state and the MIDI output boundary.
//!
//! [`LedState`] is the only place hardware output happens: every color
//! write goes through [`LedState::set`], which records the color and then
//! emits the two wire messages from [`midi::encode_color`].

use crate::color::Color;
use crate::config::LedBounds;
use crate::midi;
use crate::types::{LedAddress, SurfaceError};
use log::warn;
use std::collections::BTreeMap;

/// Trait for abstracting the MIDI transport.
///
/// Implement this for whatever connection reaches the surface. Errors are
/// reported back to [`LedState::set`]; the stored color is kept either way
/// so the surface converges once the transport recovers.
pub trait MidiOutput {
    /// Transport error, logged on failure.
    type Error: core::fmt::Debug;

    /// Sends one complete MIDI message.
    fn send(&mut self, message: &[u8]) -> Result<(), Self::Error>;
}

#[cfg(feature = "midir")]
impl MidiOutput for midir::MidiOutputConnection {
    type Error = midir::SendError;

    fn send(&mut self, message: &[u8]) -> Result<(), Self::Error> {
        midir::MidiOutputConnection::send(self, message)
    }
}

/// Current color of every LED the surface has touched.
///
/// Entries are created lazily, either by the first write or by the first
/// [`get`](Self::get), and only removed by [`reset`](Self::reset).
pub struct LedState<O: MidiOutput> {
    output: O,
    bounds: LedBounds,
    colors: BTreeMap<LedAddress, Color>,
}

impl<O: MidiOutput> LedState<O> {
    /// Creates an empty state writing to `output`.
    pub fn new(output: O, bounds: LedBounds) -> Self {
        Self {
            output,
            bounds,
            colors: BTreeMap::new(),
        }
    }

    /// Returns the stored color, starting the entry at off when the LED
    /// has never been touched.
    pub fn get(&mut self, address: LedAddress) -> Result<Color, SurfaceError> {
        let address = self.bounds.check(address)?;
        Ok(*self.colors.entry(address).or_insert(Color::OFF))
    }

    /// Stores `color` and writes it to the surface.
    ///
    /// # Errors
    /// * `AddressOutOfRange` - nothing is stored or sent
    /// * `OutputUnavailable` - the color is stored but the transport failed
    pub fn set(&mut self, address: LedAddress, color: Color) -> Result<(), SurfaceError> {
        let address = self.bounds.check(address)?;
        self.colors.insert(address, color);

        for message in midi::encode_color(address, color) {
            if let Err(err) = self.output.send(&message) {
                warn!("MIDI write for {} failed: {:?}", address, err);
                return Err(SurfaceError::OutputUnavailable);
            }
        }
        Ok(())
    }

    /// Stored color without creating an entry.
    pub fn color(&self, address: LedAddress) -> Option<Color> {
        self.colors.get(&address).copied()
    }

    /// Addresses with a stored color, ascending.
    pub fn addresses(&self) -> impl Iterator<Item = LedAddress> + '_ {
        self.colors.keys().copied()
    }

    pub fn contains(&self, address: LedAddress) -> bool {
        self.colors.contains_key(&address)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn bounds(&self) -> LedBounds {
        self.bounds
    }

    /// Forgets every stored color. Nothing is sent.
    pub fn reset(&mut self) {
        self.colors.clear();
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }
}
