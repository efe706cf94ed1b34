use crate::constants::{KEY_PITCH_STEP_RAD, KEY_YAW_STEP_RAD, KEY_ZOOM_STEP_DEG};
use crate::error::PanoError;
use fnv::FnvHashSet;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewKey {
    Left,
    Right,
    Up,
    Down,
    ZoomIn,
    ZoomOut,
}

impl ViewKey {
    /// Maps a DOM `KeyboardEvent.key` value onto a view key.
    #[inline]
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(ViewKey::Left),
            "ArrowRight" | "d" | "D" => Some(ViewKey::Right),
            "ArrowUp" | "w" | "W" => Some(ViewKey::Up),
            "ArrowDown" | "s" | "S" => Some(ViewKey::Down),
            "+" | "=" => Some(ViewKey::ZoomIn),
            "-" | "_" => Some(ViewKey::ZoomOut),
            _ => None,
        }
    }
}

impl FromStr for ViewKey {
    type Err = PanoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dom_key(s).ok_or_else(|| PanoError::UnknownKey(s.to_string()))
    }
}

/// Angular (radians) and zoom (degrees) change for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KeyDelta {
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
}

impl KeyDelta {
    pub fn is_zero(&self) -> bool {
        self.yaw == 0.0 && self.pitch == 0.0 && self.fov == 0.0
    }
}

#[derive(Clone, Debug)]
pub struct KeyConfig {
    pub yaw_step: f32,
    pub pitch_step: f32,
    pub zoom_step: f32,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            yaw_step: KEY_YAW_STEP_RAD,
            pitch_step: KEY_PITCH_STEP_RAD,
            zoom_step: KEY_ZOOM_STEP_DEG,
        }
    }
}

/// Currently held view keys.
#[derive(Debug, Default)]
pub struct KeyState {
    config: KeyConfig,
    held: FnvHashSet<ViewKey>,
    disabled: bool,
}

impl KeyState {
    pub fn new(config: KeyConfig) -> Self {
        Self {
            config,
            held: FnvHashSet::default(),
            disabled: false,
        }
    }

    /// Returns `true` if the key was not already held.
    pub fn key_down(&mut self, key: ViewKey) -> bool {
        if self.disabled {
            return false;
        }
        self.held.insert(key)
    }

    pub fn key_up(&mut self, key: ViewKey) -> bool {
        self.held.remove(&key)
    }

    pub fn is_held(&self, key: ViewKey) -> bool {
        self.held.contains(&key)
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// Disabling drops every held key so nothing is replayed on re-enable.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.disabled = !enabled;
        if !enabled {
            self.held.clear();
        }
    }

    pub fn delta(&self) -> KeyDelta {
        let mut d = KeyDelta::default();
        for key in &self.held {
            match key {
                ViewKey::Left => d.yaw += self.config.yaw_step,
                ViewKey::Right => d.yaw -= self.config.yaw_step,
                ViewKey::Up => d.pitch += self.config.pitch_step,
                ViewKey::Down => d.pitch -= self.config.pitch_step,
                ViewKey::ZoomIn => d.fov -= self.config.zoom_step,
                ViewKey::ZoomOut => d.fov += self.config.zoom_step,
            }
        }
        d
    }
}
