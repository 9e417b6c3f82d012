//! MIDI wire format for pad colors and raw input.
//!
//! A color write is two three-byte messages on the same note: the first
//! packs the low nibbles of red and green into the velocity byte, the
//! second carries blue on its own status byte. Red and green therefore
//! lose their top bits on the wire; [`LedState`](crate::led::LedState)
//! keeps the full 7-bit value.

use crate::color::Color;
use crate::types::LedAddress;

/// Status byte of the red/green message.
pub const RED_GREEN_STATUS: u8 = 0x90;

/// Status byte of the blue message.
pub const BLUE_STATUS: u8 = 0x92;

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const CONTROL_CHANGE: u8 = 0xB0;

/// Packs red and green into one data byte, four bits each.
#[inline]
pub fn pack_red_green(color: Color) -> u8 {
    ((color.red() & 0x0F) << 4) | (color.green() & 0x0F)
}

/// Encodes a color write for one LED.
pub fn encode_color(address: LedAddress, color: Color) -> [[u8; 3]; 2] {
    [
        [RED_GREEN_STATUS, address.0, pack_red_green(color)],
        [BLUE_STATUS, address.0, color.blue()],
    ]
}

/// Channel voice messages the surface reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
}

impl MidiMessage {
    /// Parses a raw message.
    ///
    /// Note-on with velocity zero is reported as note-off. Anything that is
    /// not a complete note or control change message yields `None`.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let &[status, data1, data2, ..] = bytes else {
            return None;
        };
        let channel = status & 0x0F;
        let data1 = data1 & 0x7F;
        let data2 = data2 & 0x7F;

        match status & 0xF0 {
            NOTE_ON if data2 > 0 => Some(MidiMessage::NoteOn {
                channel,
                note: data1,
                velocity: data2,
            }),
            NOTE_ON | NOTE_OFF => Some(MidiMessage::NoteOff {
                channel,
                note: data1,
            }),
            CONTROL_CHANGE => Some(MidiMessage::ControlChange {
                channel,
                controller: data1,
                value: data2,
            }),
            _ => None,
        }
    }

    /// Zero-based channel of the message.
    pub fn channel(&self) -> u8 {
        match *self {
            MidiMessage::NoteOn { channel, .. }
            | MidiMessage::NoteOff { channel, .. }
            | MidiMessage::ControlChange { channel, .. } => channel,
        }
    }
}
