//! Section navigation state for rendered presentations.
//!
//! The embedded client script in [`crate::render`] follows exactly these
//! rules; this module is the caller-owned model of them. Each operation
//! takes a state by value and returns the next one.

/// Which section of `len` sections is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavState {
    active: usize,
    len: usize,
}

impl NavState {
    /// Initial state: section 0 active.
    pub fn new(len: usize) -> Self {
        Self { active: 0, len }
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Moves forward; a no-op on the last section.
    pub fn advance(self) -> Self {
        if self.active + 1 < self.len {
            Self {
                active: self.active + 1,
                ..self
            }
        } else {
            self
        }
    }

    /// Moves backward; a no-op on the first section.
    pub fn retreat(self) -> Self {
        if self.active > 0 {
            Self {
                active: self.active - 1,
                ..self
            }
        } else {
            self
        }
    }

    /// Direct selection; out-of-range indices are ignored.
    pub fn select(self, index: usize) -> Self {
        if index < self.len {
            Self {
                active: index,
                ..self
            }
        } else {
            self
        }
    }

    pub fn apply(self, key: NavKey) -> Self {
        match key {
            NavKey::Forward => self.advance(),
            NavKey::Backward => self.retreat(),
        }
    }
}

/// Keyboard navigation intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Forward,
    Backward,
}

impl NavKey {
    /// Forward keys.
    pub const FORWARD_KEYS: [&'static str; 3] = ["ArrowRight", "PageDown", " "];
    /// Backward keys.
    pub const BACKWARD_KEYS: [&'static str; 2] = ["ArrowLeft", "PageUp"];

    /// Maps a DOM `KeyboardEvent.key` value to an intent.
    pub fn from_key(key: &str) -> Option<Self> {
        if Self::FORWARD_KEYS.contains(&key) {
            Some(NavKey::Forward)
        } else if Self::BACKWARD_KEYS.contains(&key) {
            Some(NavKey::Backward)
        } else {
            None
        }
    }
}
