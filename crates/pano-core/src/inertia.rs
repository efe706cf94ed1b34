use crate::constants::{INERTIA_DAMPING, INERTIA_EPSILON_PX};
use glam::Vec2;

#[derive(Clone, Debug)]
pub struct InertiaConfig {
    /// Per-tick velocity multiplier, expected in `[0, 1)`.
    pub damping: f32,
    /// Speed (pixels per tick) below which the session ends.
    pub epsilon: f32,
}

impl Default for InertiaConfig {
    fn default() -> Self {
        Self {
            damping: INERTIA_DAMPING,
            epsilon: INERTIA_EPSILON_PX,
        }
    }
}

/// Post-release drag continuation with geometric decay.
#[derive(Clone, Debug, Default)]
pub struct InertiaModel {
    config: InertiaConfig,
    velocity: Vec2,
}

impl InertiaModel {
    pub fn new(config: InertiaConfig) -> Self {
        Self {
            config,
            velocity: Vec2::ZERO,
        }
    }

    /// Seeds a new session from the last observed drag delta.
    pub fn release(&mut self, velocity: Vec2) {
        if !velocity.is_finite() || velocity.length() < self.config.epsilon {
            self.velocity = Vec2::ZERO;
            return;
        }
        self.velocity = velocity;
    }

    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }

    pub fn is_active(&self) -> bool {
        self.velocity != Vec2::ZERO
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Returns this tick's pixel delta and decays the stored velocity.
    pub fn step(&mut self) -> Option<Vec2> {
        if !self.is_active() {
            return None;
        }
        let delta = self.velocity;
        // A damping of 1 or more would never terminate.
        let damping = self.config.damping.clamp(0.0, 0.999);
        self.velocity *= damping;
        if self.velocity.length() < self.config.epsilon {
            self.velocity = Vec2::ZERO;
        }
        Some(delta)
    }
}
