//! Absolute orientation from device sensors.
//!
//! Readings are converted straight into a camera rotation and never depend on
//! the previous camera state. Only the newest reading between two ticks
//! matters, so the source keeps a single slot instead of a queue.

use glam::{EulerRot, Quat, Vec3};
use std::f32::consts::FRAC_PI_2;

/// Raw sensor angles in degrees, plus the screen rotation angle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DeviceReading {
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
    pub screen: f32,
}

impl DeviceReading {
    pub fn new(alpha: f32, beta: f32, gamma: f32, screen: f32) -> Self {
        Self {
            alpha,
            beta,
            gamma,
            screen,
        }
    }

    pub fn to_radians(self) -> Option<AbsoluteOrientation> {
        let vals = [self.alpha, self.beta, self.gamma, self.screen];
        if vals.iter().any(|v| !v.is_finite()) {
            return None;
        }
        Some(AbsoluteOrientation {
            alpha: self.alpha.to_radians(),
            beta: self.beta.to_radians(),
            gamma: self.gamma.to_radians(),
            screen: self.screen.to_radians(),
        })
    }
}

/// Sensor angles in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AbsoluteOrientation {
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
    pub screen: f32,
}

impl AbsoluteOrientation {
    /// Device frame to world frame.
    ///
    /// The sensor Euler angles are applied in YXZ order, then the camera is
    /// turned -90 deg about X so it looks out of the back of the device, then
    /// the screen rotation is undone about Z.
    pub fn rotation(&self) -> Quat {
        let device = Quat::from_euler(EulerRot::YXZ, self.alpha, self.beta, -self.gamma);
        let back_camera = Quat::from_axis_angle(Vec3::X, -FRAC_PI_2);
        let screen = Quat::from_axis_angle(Vec3::Z, -self.screen);
        device * back_camera * screen
    }

    /// Yaw and pitch of the camera looking along the rotated -Z axis.
    pub fn yaw_pitch(&self) -> (f32, f32) {
        yaw_pitch_from_rotation(self.rotation())
    }
}

pub fn yaw_pitch_from_rotation(q: Quat) -> (f32, f32) {
    let forward = q * Vec3::NEG_Z;
    let pitch = forward.y.clamp(-1.0, 1.0).asin();
    let yaw = (-forward.x).atan2(-forward.z);
    (yaw, pitch)
}

/// Why enabling the sensor source succeeded or failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionOutcome {
    Granted,
    Denied,
    Unavailable,
}

#[derive(Debug, Default)]
pub struct AbsoluteOrientationSource {
    enabled: bool,
    disposed: bool,
    latest: Option<AbsoluteOrientation>,
}

impl AbsoluteOrientationSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completes an enable request. Returns `false` unless permission was
    /// granted, leaving the source inert.
    pub fn enable(&mut self, outcome: PermissionOutcome) -> bool {
        if self.disposed {
            return false;
        }
        match outcome {
            PermissionOutcome::Granted => {
                self.enabled = true;
                log::info!("[gyro] device orientation enabled");
                true
            }
            PermissionOutcome::Denied => {
                log::info!("[gyro] permission denied");
                false
            }
            PermissionOutcome::Unavailable => {
                log::info!("[gyro] device orientation unavailable");
                false
            }
        }
    }

    pub fn disable(&mut self) {
        self.enabled = false;
        self.latest = None;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.disposed
    }

    /// Stores the reading, replacing any not yet consumed.
    pub fn on_reading(&mut self, reading: DeviceReading) {
        if !self.is_enabled() {
            return;
        }
        match reading.to_radians() {
            Some(abs) => self.latest = Some(abs),
            None => log::warn!("[gyro] skipping non-finite reading {:?}", reading),
        }
    }

    pub fn take_latest(&mut self) -> Option<AbsoluteOrientation> {
        self.latest.take()
    }

    pub fn dispose(&mut self) {
        self.disposed = true;
        self.enabled = false;
        self.latest = None;
    }
}
