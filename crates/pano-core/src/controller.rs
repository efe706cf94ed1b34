//! The single writer of the camera orientation.
//!
//! Input handlers never touch [`Orientation`] directly. They queue
//! [`ViewCommand`]s, and [`OrientationController::tick`] drains the queue once
//! per animation frame, runs auto-rotate, inertia and held keys, clamps, and
//! hands the result to the render target.

use crate::constants::*;
use crate::device::AbsoluteOrientation;
use crate::inertia::{InertiaConfig, InertiaModel};
use crate::keys::KeyDelta;
use glam::{EulerRot, Quat, Vec2, Vec3};
use smallvec::SmallVec;

/// Camera state: yaw and pitch in radians, field of view in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            fov: DEFAULT_FOV_DEG,
        }
    }
}

impl Orientation {
    pub fn new(yaw: f32, pitch: f32, fov: f32) -> Self {
        Self { yaw, pitch, fov }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Unit view direction; yaw 0 and pitch 0 look down -Z.
    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }
}

/// Optional angular bounds. Missing pitch bounds fall back to +-pi/2; missing
/// yaw bounds leave yaw free so the horizon can wrap.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewLimits {
    pub min_yaw: Option<f32>,
    pub max_yaw: Option<f32>,
    pub min_pitch: Option<f32>,
    pub max_pitch: Option<f32>,
}

impl ViewLimits {
    pub fn pitch(min: f32, max: f32) -> Self {
        Self {
            min_pitch: Some(min),
            max_pitch: Some(max),
            ..Self::default()
        }
    }

    pub fn with_yaw(mut self, min: f32, max: f32) -> Self {
        self.min_yaw = Some(min);
        self.max_yaw = Some(max);
        self
    }

    pub fn pitch_range(&self) -> (f32, f32) {
        (
            self.min_pitch.unwrap_or(DEFAULT_MIN_PITCH),
            self.max_pitch.unwrap_or(DEFAULT_MAX_PITCH),
        )
    }

    pub fn is_inverted(&self) -> bool {
        let (lo, hi) = self.pitch_range();
        let yaw_inverted = matches!((self.min_yaw, self.max_yaw), (Some(a), Some(b)) if a > b);
        lo > hi || yaw_inverted
    }

    pub fn clamp_pitch(&self, pitch: f32) -> f32 {
        let (lo, hi) = self.pitch_range();
        clamp_lenient(pitch, lo, hi)
    }

    pub fn clamp_yaw(&self, mut yaw: f32) -> f32 {
        if let Some(min) = self.min_yaw {
            yaw = yaw.max(min);
        }
        if let Some(max) = self.max_yaw {
            yaw = yaw.min(max);
        }
        yaw
    }
}

/// Clamp that never panics: an inverted range collapses onto `hi`.
#[inline]
pub fn clamp_lenient(v: f32, lo: f32, hi: f32) -> f32 {
    v.max(lo).min(hi)
}

/// Receives the clamped orientation after every tick.
pub trait RenderTarget {
    fn set_view(&mut self, view: &Orientation);
}

impl<F: FnMut(&Orientation)> RenderTarget for F {
    fn set_view(&mut self, view: &Orientation) {
        self(view)
    }
}

#[derive(Clone, Debug)]
pub struct ControllerConfig {
    pub drag_radians_per_pixel: f32,
    pub min_fov: f32,
    pub max_fov: f32,
    pub initial: Orientation,
    pub auto_rotate: bool,
    /// Radians of yaw per millisecond.
    pub auto_rotate_speed: f32,
    pub inertia: InertiaConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            drag_radians_per_pixel: DRAG_RADIANS_PER_PIXEL,
            min_fov: MIN_FOV_DEG,
            max_fov: MAX_FOV_DEG,
            initial: Orientation::default(),
            auto_rotate: false,
            auto_rotate_speed: AUTO_ROTATE_RAD_PER_MS,
            inertia: InertiaConfig::default(),
        }
    }
}

/// Input queued between ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewCommand {
    DragStart,
    Drag(Vec2),
    DragEnd { velocity: Vec2 },
    Absolute(AbsoluteOrientation),
    Zoom(f32),
    /// Pinch scale; the field of view is divided by it.
    ZoomScale(f32),
    LookAt { yaw: f32, pitch: f32 },
    SetFov(f32),
    Reset,
}

pub struct OrientationController {
    config: ControllerConfig,
    orientation: Orientation,
    limits: Option<ViewLimits>,
    // Cleared but never shrunk, so steady-state ticks do not allocate.
    inbox: SmallVec<[ViewCommand; 8]>,
    inertia: InertiaModel,
    dragging: bool,
    device_active: bool,
    auto_rotate: bool,
    target: Option<Box<dyn RenderTarget>>,
}

impl Default for OrientationController {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

impl OrientationController {
    pub fn new(config: ControllerConfig) -> Self {
        let mut ctl = Self {
            orientation: config.initial,
            limits: None,
            inbox: SmallVec::new(),
            inertia: InertiaModel::new(config.inertia.clone()),
            dragging: false,
            device_active: false,
            auto_rotate: config.auto_rotate,
            target: None,
            config,
        };
        ctl.clamp();
        ctl
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn view_limits(&self) -> Option<ViewLimits> {
        self.limits
    }

    pub fn fov_range(&self) -> (f32, f32) {
        (self.config.min_fov, self.config.max_fov)
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_inertia_active(&self) -> bool {
        self.inertia.is_active()
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.auto_rotate
    }

    pub fn set_render_target(&mut self, target: Box<dyn RenderTarget>) {
        self.target = Some(target);
    }

    pub fn clear_render_target(&mut self) {
        self.target = None;
    }

    pub fn set_view_limits(&mut self, limits: Option<ViewLimits>) {
        if let Some(l) = &limits {
            if l.is_inverted() {
                log::warn!("[view] inverted view limits {:?}; clamping to the upper bound", l);
            }
        }
        self.limits = limits;
        self.clamp();
    }

    pub fn set_fov_range(&mut self, min_fov: f32, max_fov: f32) {
        if min_fov > max_fov {
            log::warn!("[view] inverted fov range {}..{}", min_fov, max_fov);
        }
        self.config.min_fov = min_fov;
        self.config.max_fov = max_fov;
        self.clamp();
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.auto_rotate = enabled;
    }

    pub fn set_auto_rotate_speed(&mut self, rad_per_ms: f32) {
        if rad_per_ms.is_finite() {
            self.config.auto_rotate_speed = rad_per_ms;
        }
    }

    /// While a sensor source drives the view, auto-rotate stays off.
    pub fn set_device_orientation_active(&mut self, active: bool) {
        self.device_active = active;
    }

    pub fn push(&mut self, command: ViewCommand) {
        self.inbox.push(command);
    }

    pub fn pending_commands(&self) -> usize {
        self.inbox.len()
    }

    /// Pixel drag to angular change. Positive `dx` decreases yaw, positive
    /// `dy` raises pitch.
    pub fn apply_drag_delta(&mut self, dx: f32, dy: f32) {
        if !dx.is_finite() || !dy.is_finite() {
            log::warn!("[view] skipping non-finite drag ({}, {})", dx, dy);
            return;
        }
        let s = self.config.drag_radians_per_pixel;
        self.orientation.yaw -= dx * s;
        self.orientation.pitch += dy * s;
        self.clamp();
    }

    /// Replaces yaw and pitch with the orientation implied by sensor angles.
    pub fn apply_absolute(&mut self, alpha: f32, beta: f32, gamma: f32, screen: f32) {
        let abs = AbsoluteOrientation {
            alpha,
            beta,
            gamma,
            screen,
        };
        let (yaw, pitch) = abs.yaw_pitch();
        if !yaw.is_finite() || !pitch.is_finite() {
            log::warn!("[view] skipping degenerate absolute orientation {:?}", abs);
            return;
        }
        self.orientation.yaw = yaw;
        self.orientation.pitch = pitch;
        self.clamp();
    }

    pub fn apply_zoom_delta(&mut self, delta_fov: f32) {
        if !delta_fov.is_finite() {
            return;
        }
        self.orientation.fov += delta_fov;
        self.clamp();
    }

    /// Spreading contacts (`scale > 1`) narrows the field of view.
    pub fn apply_zoom_scale(&mut self, scale: f32) {
        if !scale.is_finite() || scale <= 0.0 {
            return;
        }
        self.orientation.fov /= scale;
        self.clamp();
    }

    pub fn look_at(&mut self, yaw: f32, pitch: f32) {
        if yaw.is_finite() && pitch.is_finite() {
            self.orientation.yaw = yaw;
            self.orientation.pitch = pitch;
            self.inertia.stop();
            self.clamp();
        }
    }

    pub fn set_fov(&mut self, fov: f32) {
        if fov.is_finite() {
            self.orientation.fov = fov;
            self.clamp();
        }
    }

    pub fn reset_view(&mut self) {
        self.orientation = self.config.initial;
        self.inertia.stop();
        self.clamp();
    }

    /// One animation frame: drain queued input, then auto-rotate, inertia and
    /// held keys, in that order. Publishes and returns the clamped result.
    pub fn tick(&mut self, dt_ms: f64, keys: KeyDelta) -> Orientation {
        let dt_ms = if dt_ms.is_finite() && dt_ms > 0.0 {
            dt_ms as f32
        } else {
            0.0
        };

        for i in 0..self.inbox.len() {
            let command = self.inbox[i];
            self.apply_command(command);
        }
        self.inbox.clear();

        if self.auto_rotate && !self.dragging && !self.device_active {
            self.orientation.yaw += self.config.auto_rotate_speed * dt_ms;
        }

        if !self.dragging {
            if let Some(delta) = self.inertia.step() {
                self.apply_drag_delta(delta.x, delta.y);
            }
        }

        if !keys.is_zero() {
            self.orientation.yaw += keys.yaw;
            self.orientation.pitch += keys.pitch;
            self.orientation.fov += keys.fov;
        }

        self.clamp();
        if let Some(target) = self.target.as_mut() {
            target.set_view(&self.orientation);
        }
        self.orientation
    }

    fn apply_command(&mut self, command: ViewCommand) {
        match command {
            ViewCommand::DragStart => {
                self.dragging = true;
                self.inertia.stop();
            }
            ViewCommand::Drag(d) => self.apply_drag_delta(d.x, d.y),
            ViewCommand::DragEnd { velocity } => {
                self.dragging = false;
                self.inertia.release(velocity);
            }
            ViewCommand::Absolute(a) => self.apply_absolute(a.alpha, a.beta, a.gamma, a.screen),
            ViewCommand::Zoom(d) => self.apply_zoom_delta(d),
            ViewCommand::ZoomScale(s) => self.apply_zoom_scale(s),
            ViewCommand::LookAt { yaw, pitch } => self.look_at(yaw, pitch),
            ViewCommand::SetFov(fov) => self.set_fov(fov),
            ViewCommand::Reset => self.reset_view(),
        }
    }

    fn clamp(&mut self) {
        let o = &mut self.orientation;
        match &self.limits {
            Some(l) => {
                o.pitch = l.clamp_pitch(o.pitch);
                o.yaw = l.clamp_yaw(o.yaw);
            }
            None => o.pitch = clamp_lenient(o.pitch, DEFAULT_MIN_PITCH, DEFAULT_MAX_PITCH),
        }
        o.fov = clamp_lenient(o.fov, self.config.min_fov, self.config.max_fov);
    }
}
