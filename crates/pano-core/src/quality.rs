//! Closed-loop render quality control.
//!
//! [`AdaptiveQualityGovernor`] compares smoothed FPS against a target and
//! walks one quality dimension per decision. The band below the target is
//! wider than the band above it, which keeps the loop from flapping.

use crate::constants::*;
use crate::error::PanoError;
use crate::perf::PerformanceSampler;
use std::fmt;
use std::str::FromStr;

const EPS: f32 = 1e-4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualitySettings {
    pub pixel_ratio: f32,
    pub render_scale: f32,
    pub antialiasing: bool,
    /// Texture resolution factor in `[0, 1]`.
    pub texture_quality: f32,
}

impl Default for QualitySettings {
    fn default() -> Self {
        QualityPreset::High.settings()
    }
}

impl QualitySettings {
    /// Backing-store multiplier for the canvas.
    pub fn effective_scale(&self) -> f32 {
        self.pixel_ratio * self.render_scale
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QualityPreset {
    Ultra,
    High,
    Medium,
    Low,
}

impl QualityPreset {
    pub const ALL: [QualityPreset; 4] = [
        QualityPreset::Ultra,
        QualityPreset::High,
        QualityPreset::Medium,
        QualityPreset::Low,
    ];

    pub fn settings(self) -> QualitySettings {
        match self {
            QualityPreset::Ultra => QualitySettings {
                pixel_ratio: 2.0,
                render_scale: 1.0,
                antialiasing: true,
                texture_quality: 1.0,
            },
            QualityPreset::High => QualitySettings {
                pixel_ratio: 1.5,
                render_scale: 1.0,
                antialiasing: true,
                texture_quality: 1.0,
            },
            QualityPreset::Medium => QualitySettings {
                pixel_ratio: 1.0,
                render_scale: 1.0,
                antialiasing: true,
                texture_quality: 0.75,
            },
            QualityPreset::Low => QualitySettings {
                pixel_ratio: 1.0,
                render_scale: 0.75,
                antialiasing: false,
                texture_quality: 0.5,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            QualityPreset::Ultra => "ultra",
            QualityPreset::High => "high",
            QualityPreset::Medium => "medium",
            QualityPreset::Low => "low",
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QualityPreset {
    type Err = PanoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PanoError::UnknownPreset(s.to_string()))
    }
}

#[derive(Clone, Debug)]
pub struct GovernorConfig {
    pub target_fps: f32,
    pub adjustment_interval_ms: f64,
    /// Decrease when FPS falls below `target_fps - lower_margin`.
    pub lower_margin: f32,
    /// Increase when FPS rises above `target_fps + upper_margin`.
    pub upper_margin: f32,
    pub max_pixel_ratio: f32,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            adjustment_interval_ms: ADJUSTMENT_INTERVAL_MS,
            lower_margin: FPS_LOWER_MARGIN,
            upper_margin: FPS_UPPER_MARGIN,
            max_pixel_ratio: PIXEL_RATIO_CEILING,
        }
    }
}

pub type QualityCallback = Box<dyn FnMut(QualitySettings)>;

pub struct AdaptiveQualityGovernor {
    config: GovernorConfig,
    settings: QualitySettings,
    // Armed by the first `update`; decisions run one interval later.
    last_adjustment_ms: Option<f64>,
    enabled: bool,
    adjustments: u64,
    on_change: Option<QualityCallback>,
}

impl AdaptiveQualityGovernor {
    pub fn new(config: GovernorConfig, preset: QualityPreset) -> Self {
        let settings = clamp_pixel_ratio(preset.settings(), &config);
        Self {
            config,
            settings,
            last_adjustment_ms: None,
            enabled: true,
            adjustments: 0,
            on_change: None,
        }
    }

    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    pub fn current_settings(&self) -> QualitySettings {
        self.settings
    }

    /// Number of single-dimension steps taken so far.
    pub fn adjustments(&self) -> u64 {
        self.adjustments
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_on_change(&mut self, callback: QualityCallback) {
        self.on_change = Some(callback);
    }

    pub fn clear_on_change(&mut self) {
        self.on_change = None;
    }

    pub fn set_target_fps(&mut self, fps: f32) {
        if fps.is_finite() && fps > 0.0 {
            self.config.target_fps = fps;
        } else {
            log::warn!("[quality] ignoring target fps {}", fps);
        }
    }

    /// Device pixel ratio cap. A current pixel ratio above the new cap is
    /// lowered to it and published.
    pub fn set_max_pixel_ratio(&mut self, ratio: f32) {
        if !(ratio.is_finite() && ratio > 0.0) {
            log::warn!("[quality] ignoring max pixel ratio {}", ratio);
            return;
        }
        self.config.max_pixel_ratio = ratio;
        let clamped = clamp_pixel_ratio(self.settings, &self.config);
        if clamped != self.settings {
            log::info!("[quality] pixel ratio capped at {}", clamped.pixel_ratio);
            self.settings = clamped;
            self.publish();
        }
    }

    /// Replaces the settings wholesale and publishes at once, outside the
    /// adjustment interval. The preset's pixel ratio is capped by the device.
    pub fn set_preset(&mut self, preset: QualityPreset) {
        log::info!("[quality] preset {}", preset);
        self.settings = clamp_pixel_ratio(preset.settings(), &self.config);
        self.publish();
    }

    pub fn set_preset_by_name(&mut self, name: &str) -> Result<(), PanoError> {
        let preset = name.parse::<QualityPreset>()?;
        self.set_preset(preset);
        Ok(())
    }

    /// Called every tick; runs a decision at most once per interval.
    /// Returns `true` if a quality step was taken.
    pub fn update(&mut self, now_ms: f64, sampler: &PerformanceSampler) -> bool {
        if !self.enabled || !now_ms.is_finite() {
            return false;
        }
        let Some(last) = self.last_adjustment_ms else {
            self.last_adjustment_ms = Some(now_ms);
            return false;
        };
        if now_ms - last < self.config.adjustment_interval_ms {
            return false;
        }
        let Some(fps) = sampler.fps() else {
            log::debug!("[quality] no fps reading yet");
            return false;
        };
        self.last_adjustment_ms = Some(now_ms);

        if fps < self.config.target_fps - self.config.lower_margin {
            self.decrease_quality()
        } else if fps > self.config.target_fps + self.config.upper_margin {
            self.increase_quality()
        } else {
            false
        }
    }

    /// Lowers the first dimension that still has room, in the order pixel
    /// ratio, render scale, antialiasing, texture quality.
    pub fn decrease_quality(&mut self) -> bool {
        let s = &mut self.settings;
        let changed = if let Some(v) = lower(s.pixel_ratio, PIXEL_RATIO_STEP, PIXEL_RATIO_FLOOR) {
            s.pixel_ratio = v;
            true
        } else if let Some(v) = lower(s.render_scale, RENDER_SCALE_STEP, RENDER_SCALE_FLOOR) {
            s.render_scale = v;
            true
        } else if s.antialiasing {
            s.antialiasing = false;
            true
        } else if let Some(v) = lower(
            s.texture_quality,
            TEXTURE_QUALITY_STEP,
            TEXTURE_QUALITY_FLOOR,
        ) {
            s.texture_quality = v;
            true
        } else {
            false
        };
        if changed {
            log::debug!("[quality] decreased to {:?}", self.settings);
            self.adjustments += 1;
            self.publish();
        }
        changed
    }

    /// Raises the first dimension that still has room, in the reverse order
    /// of [`decrease_quality`](Self::decrease_quality).
    pub fn increase_quality(&mut self) -> bool {
        let ratio_ceiling = pixel_ratio_ceiling(&self.config);
        let s = &mut self.settings;
        let changed = if let Some(v) = raise(
            s.texture_quality,
            TEXTURE_QUALITY_STEP,
            TEXTURE_QUALITY_CEILING,
        ) {
            s.texture_quality = v;
            true
        } else if !s.antialiasing {
            s.antialiasing = true;
            true
        } else if let Some(v) = raise(s.render_scale, RENDER_SCALE_STEP, RENDER_SCALE_CEILING) {
            s.render_scale = v;
            true
        } else if let Some(v) = raise(s.pixel_ratio, PIXEL_RATIO_STEP, ratio_ceiling) {
            s.pixel_ratio = v;
            true
        } else {
            false
        };
        if changed {
            log::debug!("[quality] increased to {:?}", self.settings);
            self.adjustments += 1;
            self.publish();
        }
        changed
    }

    fn publish(&mut self) {
        let settings = self.settings;
        if let Some(cb) = self.on_change.as_mut() {
            cb(settings);
        }
    }
}

// Keeps repeated 0.1 steps from accumulating float drift.
#[inline]
fn snap(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

// Bounds apply after snapping so a fractional bound is never overshot.
fn raise(v: f32, step: f32, ceiling: f32) -> Option<f32> {
    let next = snap(v + step).min(ceiling);
    (next > v + EPS).then_some(next)
}

fn lower(v: f32, step: f32, floor: f32) -> Option<f32> {
    let next = snap(v - step).max(floor);
    (next < v - EPS).then_some(next)
}

fn pixel_ratio_ceiling(config: &GovernorConfig) -> f32 {
    config.max_pixel_ratio.min(PIXEL_RATIO_CEILING)
}

fn clamp_pixel_ratio(mut settings: QualitySettings, config: &GovernorConfig) -> QualitySettings {
    settings.pixel_ratio = settings.pixel_ratio.min(pixel_ratio_ceiling(config));
    settings
}
