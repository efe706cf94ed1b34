//! Wiring of all input, view and quality components behind one frame loop.

use crate::constants::WHEEL_FOV_PER_UNIT;
use crate::controller::{
    ControllerConfig, Orientation, OrientationController, RenderTarget, ViewCommand, ViewLimits,
};
use crate::device::{AbsoluteOrientationSource, DeviceReading, PermissionOutcome};
use crate::error::PanoError;
use crate::gesture::{GestureConfig, GestureEvent, Motion, PointerAccumulator, PointerSample};
use crate::keys::{KeyConfig, KeyState, ViewKey};
use crate::perf::{PerformanceSampler, SamplerConfig};
use crate::quality::{
    AdaptiveQualityGovernor, GovernorConfig, QualityCallback, QualityPreset, QualitySettings,
};
use glam::Vec2;

#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub gesture: GestureConfig,
    pub keys: KeyConfig,
    pub controller: ControllerConfig,
    pub sampler: SamplerConfig,
    pub governor: GovernorConfig,
    pub preset: QualityPreset,
    pub limits: Option<ViewLimits>,
    pub wheel_fov_per_unit: f32,
    pub double_tap_resets_view: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            keys: KeyConfig::default(),
            controller: ControllerConfig::default(),
            sampler: SamplerConfig::default(),
            governor: GovernorConfig::default(),
            preset: QualityPreset::High,
            limits: None,
            wheel_fov_per_unit: WHEEL_FOV_PER_UNIT,
            double_tap_resets_view: true,
        }
    }
}

pub struct PanoramaViewer {
    pointer: PointerAccumulator,
    keys: KeyState,
    device: AbsoluteOrientationSource,
    controller: OrientationController,
    sampler: PerformanceSampler,
    governor: AdaptiveQualityGovernor,
    gestures: Vec<GestureEvent>,
    wheel_fov_per_unit: f32,
    double_tap_resets_view: bool,
    enabled: bool,
    disposed: bool,
}

impl Default for PanoramaViewer {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl PanoramaViewer {
    pub fn new(config: ViewerConfig) -> Self {
        let mut controller = OrientationController::new(config.controller);
        controller.set_view_limits(config.limits);
        Self {
            pointer: PointerAccumulator::new(config.gesture),
            keys: KeyState::new(config.keys),
            device: AbsoluteOrientationSource::new(),
            controller,
            sampler: PerformanceSampler::new(config.sampler),
            governor: AdaptiveQualityGovernor::new(config.governor, config.preset),
            gestures: Vec::new(),
            wheel_fov_per_unit: config.wheel_fov_per_unit,
            double_tap_resets_view: config.double_tap_resets_view,
            enabled: true,
            disposed: false,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.controller.orientation()
    }

    pub fn quality(&self) -> QualitySettings {
        self.governor.current_settings()
    }

    pub fn controller(&self) -> &OrientationController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut OrientationController {
        &mut self.controller
    }

    pub fn governor_mut(&mut self) -> &mut AdaptiveQualityGovernor {
        &mut self.governor
    }

    pub fn sampler(&self) -> &PerformanceSampler {
        &self.sampler
    }

    pub fn pointer(&self) -> &PointerAccumulator {
        &self.pointer
    }

    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn set_render_target(&mut self, target: Box<dyn RenderTarget>) {
        self.controller.set_render_target(target);
    }

    pub fn set_quality_callback(&mut self, callback: QualityCallback) {
        self.governor.set_on_change(callback);
    }

    pub fn set_view_limits(&mut self, limits: Option<ViewLimits>) {
        self.controller.set_view_limits(limits);
    }

    pub fn set_preset(&mut self, preset: QualityPreset) {
        self.governor.set_preset(preset);
    }

    pub fn set_preset_by_name(&mut self, name: &str) -> Result<(), PanoError> {
        self.governor.set_preset_by_name(name)
    }

    pub fn pointer_down(&mut self, sample: PointerSample) {
        if self.pointer.contact_start(sample) && self.pointer.active_contacts() == 1 {
            self.controller.push(ViewCommand::DragStart);
        }
    }

    pub fn pointer_move(&mut self, sample: PointerSample) {
        match self.pointer.contact_move(sample) {
            Some(Motion::Drag(delta)) => self.controller.push(ViewCommand::Drag(delta)),
            Some(Motion::Pinch { scale, .. }) => self.controller.push(ViewCommand::ZoomScale(scale)),
            _ => {}
        }
    }

    pub fn pointer_up(&mut self, sample: PointerSample) {
        if let Some(velocity) = self.pointer.contact_end(sample) {
            self.controller.push(ViewCommand::DragEnd { velocity });
        }
    }

    pub fn pointer_cancel(&mut self, id: i32) {
        if self.pointer.contact_cancel(id).is_some() {
            self.controller.push(ViewCommand::DragEnd {
                velocity: Vec2::ZERO,
            });
        }
    }

    pub fn wheel(&mut self, delta_y: f32) {
        if self.enabled && !self.disposed {
            self.controller
                .push(ViewCommand::Zoom(delta_y * self.wheel_fov_per_unit));
        }
    }

    /// Returns `true` when the DOM key maps to a view key and was consumed.
    pub fn key_down(&mut self, key: &str) -> bool {
        if !self.enabled || self.disposed {
            return false;
        }
        match ViewKey::from_dom_key(key) {
            Some(k) => {
                self.keys.key_down(k);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        ViewKey::from_dom_key(key).is_some_and(|k| self.keys.key_up(k))
    }

    /// Window blur: nothing stays held while the page has no focus.
    pub fn release_all_keys(&mut self) {
        self.keys.clear();
    }

    pub fn enable_device_orientation(&mut self, outcome: PermissionOutcome) -> bool {
        let ok = self.device.enable(outcome);
        if ok {
            self.controller.set_device_orientation_active(true);
        }
        ok
    }

    pub fn disable_device_orientation(&mut self) {
        self.device.disable();
        self.controller.set_device_orientation_active(false);
    }

    pub fn device_orientation_enabled(&self) -> bool {
        self.device.is_enabled()
    }

    /// Readings arriving while input is disabled are dropped.
    pub fn device_orientation(&mut self, reading: DeviceReading) {
        if self.enabled && !self.disposed {
            self.device.on_reading(reading);
        }
    }

    /// One animation frame. Gestures recognised since the previous frame are
    /// appended to `out`.
    pub fn frame(&mut self, now_ms: f64, out: &mut Vec<GestureEvent>) -> Orientation {
        if self.disposed {
            return self.controller.orientation();
        }
        self.pointer.poll(now_ms);
        self.pointer.drain_gestures(&mut self.gestures);
        for g in &self.gestures {
            if self.double_tap_resets_view && matches!(g, GestureEvent::DoubleTap { .. }) {
                self.controller.push(ViewCommand::Reset);
            }
        }
        out.append(&mut self.gestures);

        if let Some(abs) = self.device.take_latest() {
            self.controller.push(ViewCommand::Absolute(abs));
        }

        let dt = self.sampler.update(now_ms).unwrap_or(0.0);
        let view = self.controller.tick(dt, self.keys.delta());
        self.governor.update(now_ms, &self.sampler);
        view
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.disposed || enabled == self.enabled {
            return;
        }
        // A drag start may still be queued, so contacts count as dragging.
        let dragging = self.controller.is_dragging() || self.pointer.active_contacts() > 0;
        self.enabled = enabled;
        self.pointer.set_enabled(enabled);
        self.keys.set_enabled(enabled);
        if !enabled {
            self.device.take_latest();
            if dragging {
                self.controller.push(ViewCommand::DragEnd {
                    velocity: Vec2::ZERO,
                });
            }
        }
        log::info!("[view] input enabled={}", enabled);
    }

    /// Idempotent. Cancels pending timers and drops every callback.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.pointer.dispose();
        self.keys.set_enabled(false);
        self.device.dispose();
        self.controller.clear_render_target();
        self.governor.set_enabled(false);
        self.governor.clear_on_change();
        self.gestures.clear();
        log::info!("[view] disposed");
    }
}
