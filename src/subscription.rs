//! Registry of which control drives which surface function.
//!
//! Each physical control is identified by its message kind and number.
//! Subscribing binds it to a [`Binding`] and hands back a [`Subscription`]
//! that releases exactly that binding later; teardown releases them all.

use crate::types::SurfaceError;
use log::debug;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind of MIDI message a control sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Source {
    /// Note on/off, keyed by note number.
    Note,
    /// Control change, keyed by controller number.
    ControlChange,
}

/// What a control does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Binding {
    /// A grid pad.
    Pad,
    /// The mode switch button.
    ModeSwitch,
    /// The brightness knob.
    Brightness,
    /// An encoder, by zero-based index.
    Encoder(u8),
}

impl Binding {
    /// Kind of control that can drive this binding.
    pub fn source(self) -> Source {
        match self {
            Binding::Pad | Binding::ModeSwitch => Source::Note,
            Binding::Brightness | Binding::Encoder(_) => Source::ControlChange,
        }
    }
}

/// Handle to one registered binding.
///
/// Bindings live as long as the registry holding them. Release one early
/// with [`Subscriptions::release`]; the rest go with
/// [`Subscriptions::release_all`] or when the owner is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subscription(u32);

/// Bindings keyed by `(source, number)`.
#[derive(Debug, Default)]
pub struct Subscriptions {
    entries: BTreeMap<(Source, u8), (Subscription, Binding)>,
    next_id: u32,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a control.
    ///
    /// # Errors
    /// * `BindingMismatch` - notes drive pads and the mode switch, control
    ///   changes drive the knob and encoders
    /// * `AlreadySubscribed` - the control is already bound; the existing
    ///   binding is kept
    pub fn subscribe(&mut self, source: Source, number: u8, binding: Binding) -> Result<Subscription, SurfaceError> {
        if binding.source() != source {
            return Err(SurfaceError::BindingMismatch {
                source,
                number,
                binding,
            });
        }
        if self.entries.contains_key(&(source, number)) {
            return Err(SurfaceError::AlreadySubscribed { source, number });
        }

        let handle = Subscription(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.insert((source, number), (handle, binding));
        debug!("{:?} {} bound to {:?}", source, number, binding);
        Ok(handle)
    }

    /// Releases one binding. Returns `false` if it was already released.
    pub fn release(&mut self, handle: Subscription) -> bool {
        let before = self.entries.len();
        self.entries.retain(|_, (existing, _)| *existing != handle);
        before != self.entries.len()
    }

    /// Releases every binding, returning how many there were.
    pub fn release_all(&mut self) -> usize {
        let released = self.entries.len();
        self.entries.clear();
        released
    }

    /// Binding of a control, if it is subscribed.
    pub fn binding(&self, source: Source, number: u8) -> Option<Binding> {
        self.entries.get(&(source, number)).map(|&(_, binding)| binding)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
