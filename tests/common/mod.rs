//! Shared test infrastructure for padlight integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use padlight::{
    AnimationConfig, AnimationEngine, GridPosition, LedBounds, MidiOutput, SessionView, TimeDuration,
    TimeInstant, TimeSource,
};
use std::collections::BTreeMap;

// ============================================================================
// Mock Time Types
// ============================================================================

/// Mock duration type for testing (wraps milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestDuration(pub u64);

impl TimeDuration for TestDuration {
    const ZERO: Self = TestDuration(0);

    fn as_millis(&self) -> u64 {
        self.0
    }

    fn from_millis(millis: u64) -> Self {
        TestDuration(millis)
    }
}

/// Mock instant type for testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestInstant(pub u64);

impl TimeInstant for TestInstant {
    type Duration = TestDuration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        TestDuration(self.0 - earlier.0)
    }
}

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current_time: core::cell::Cell<TestInstant>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: core::cell::Cell::new(TestInstant(0)),
        }
    }

    /// Advance time by the given number of milliseconds
    pub fn advance(&self, millis: u64) {
        let current = self.current_time.get();
        self.current_time.set(TestInstant(current.0 + millis));
    }
}

impl TimeSource for MockTimeSource {
    type Instant = TestInstant;

    fn now(&self) -> TestInstant {
        self.current_time.get()
    }
}

// ============================================================================
// Mock MIDI Output
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortClosed;

/// Mock MIDI output that records every message it is handed
#[derive(Debug, Default)]
pub struct MockMidiOut {
    messages: Vec<Vec<u8>>,
    /// When set, every send fails and nothing is recorded.
    pub offline: bool,
}

impl MockMidiOut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Vec<u8>] {
        &self.messages
    }

    /// Messages addressed to one note, in send order
    pub fn messages_for(&self, note: u8) -> Vec<&[u8]> {
        self.messages
            .iter()
            .filter(|message| message.get(1) == Some(&note))
            .map(Vec::as_slice)
            .collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl MidiOutput for MockMidiOut {
    type Error = PortClosed;

    fn send(&mut self, message: &[u8]) -> Result<(), Self::Error> {
        if self.offline {
            return Err(PortClosed);
        }
        self.messages.push(message.to_vec());
        Ok(())
    }
}

// ============================================================================
// Mock Session
// ============================================================================

/// Flags of one clip slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotFlags {
    pub clip: bool,
    pub playing: bool,
    pub triggered: bool,
    pub recording: bool,
}

/// Mock host session; slots not set are empty
#[derive(Debug, Default)]
pub struct MockSession {
    slots: BTreeMap<GridPosition, SlotFlags>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, position: GridPosition, flags: SlotFlags) {
        self.slots.insert(position, flags);
    }

    fn slot(&self, position: GridPosition) -> SlotFlags {
        self.slots.get(&position).copied().unwrap_or_default()
    }
}

impl SessionView for MockSession {
    fn has_clip(&self, position: GridPosition) -> bool {
        self.slot(position).clip
    }

    fn is_playing(&self, position: GridPosition) -> bool {
        self.slot(position).playing
    }

    fn is_triggered(&self, position: GridPosition) -> bool {
        self.slot(position).triggered
    }

    fn is_recording(&self, position: GridPosition) -> bool {
        self.slot(position).recording
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

/// Engine over the stock 36..=43 LED range with default timing
pub fn engine(clock: &MockTimeSource) -> AnimationEngine<'_, MockTimeSource, MockMidiOut> {
    AnimationEngine::new(
        clock,
        MockMidiOut::new(),
        LedBounds::new(36, 43),
        AnimationConfig::default(),
    )
}
