//! Keyboard input service.
//!
//! The frame loop calls [`InputSource::listen`] once at the start of every
//! frame; every query after that sees the same snapshot until the next frame.

use std::collections::{HashSet, VecDeque};

use crate::components::Vec2;

/// Keys the demo reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
    Escape,
}

/// Source of keyboard state.
pub trait InputSource {
    /// Refresh the pressed-key snapshot for this frame.
    fn listen(&mut self);

    fn is_pressed(&self, key: Key) -> bool;

    /// `+1` when only `positive` is held, `-1` when only `negative` is, else `0`.
    fn axis(&self, negative: Key, positive: Key) -> f32 {
        let mut value = 0.0;
        if self.is_pressed(positive) {
            value += 1.0;
        }
        if self.is_pressed(negative) {
            value -= 1.0;
        }
        value
    }

    fn vertical(&self, negative: Key, positive: Key) -> f32 {
        self.axis(negative, positive)
    }

    fn horizontal(&self, negative: Key, positive: Key) -> f32 {
        self.axis(negative, positive)
    }

    /// WASD as a 2D direction, +y up.
    fn keyboard_2d(&self) -> Vec2 {
        Vec2::new(self.horizontal(Key::A, Key::D), self.vertical(Key::S, Key::W))
    }
}

/// Input driven by a script of per-frame key sets, for headless runs and tests.
///
/// Each [`listen`](InputSource::listen) pops the next scripted frame. Once the
/// script runs out, the last snapshot stays held.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    pressed: HashSet<Key>,
    script: VecDeque<HashSet<Key>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the keys held during one upcoming frame.
    pub fn push_frame(&mut self, keys: &[Key]) {
        self.script.push_back(keys.iter().copied().collect());
    }

    /// Queue the same keys for `frames` upcoming frames.
    pub fn hold(&mut self, keys: &[Key], frames: usize) {
        for _ in 0..frames {
            self.push_frame(keys);
        }
    }

    /// Press a key in the current snapshot.
    pub fn press(&mut self, key: Key) {
        self.pressed.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.pressed.remove(&key);
    }

    /// Frames still queued.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl InputSource for ScriptedInput {
    fn listen(&mut self) {
        if let Some(next) = self.script.pop_front() {
            self.pressed = next;
        }
    }

    fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }
}
