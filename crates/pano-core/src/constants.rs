use std::f32::consts::FRAC_PI_2;

// Default tuning for gestures, view control and the quality governor.

// Gesture classification
pub const TAP_MAX_DISTANCE_PX: f32 = 10.0;
pub const TAP_MAX_DURATION_MS: f64 = 300.0;
pub const DOUBLE_TAP_WINDOW_MS: f64 = 300.0;
pub const LONG_PRESS_DELAY_MS: f64 = 500.0;
pub const SWIPE_MIN_DISTANCE_PX: f32 = 50.0;
pub const SWIPE_MAX_DURATION_MS: f64 = 300.0;
pub const PINCH_ROTATE_THRESHOLD_DEG: f32 = 5.0; // rejects two-finger jitter

// Drag and inertia
pub const DRAG_RADIANS_PER_PIXEL: f32 = 0.1 * std::f32::consts::PI / 180.0; // 0.1 deg per px
pub const INERTIA_DAMPING: f32 = 0.95;
pub const INERTIA_EPSILON_PX: f32 = 0.01; // per-tick speed below which inertia stops

// Keyboard (per tick while held)
pub const KEY_YAW_STEP_RAD: f32 = 0.02;
pub const KEY_PITCH_STEP_RAD: f32 = 0.02;
pub const KEY_ZOOM_STEP_DEG: f32 = 1.0;

// Field of view and angular limits
pub const DEFAULT_FOV_DEG: f32 = 75.0;
pub const MIN_FOV_DEG: f32 = 30.0;
pub const MAX_FOV_DEG: f32 = 100.0;
pub const DEFAULT_MIN_PITCH: f32 = -FRAC_PI_2;
pub const DEFAULT_MAX_PITCH: f32 = FRAC_PI_2;
pub const WHEEL_FOV_PER_UNIT: f32 = 0.05;

// Auto-rotate
pub const AUTO_ROTATE_RAD_PER_MS: f32 = 0.0001;

// Performance sampling
pub const SAMPLER_WINDOW: usize = 60;

// Quality governor
pub const DEFAULT_TARGET_FPS: f32 = 55.0;
pub const ADJUSTMENT_INTERVAL_MS: f64 = 2000.0;
pub const FPS_LOWER_MARGIN: f32 = 10.0;
pub const FPS_UPPER_MARGIN: f32 = 5.0;

pub const PIXEL_RATIO_STEP: f32 = 0.25;
pub const PIXEL_RATIO_FLOOR: f32 = 1.0;
pub const PIXEL_RATIO_CEILING: f32 = 2.0;
pub const RENDER_SCALE_STEP: f32 = 0.1;
pub const RENDER_SCALE_FLOOR: f32 = 0.75;
pub const RENDER_SCALE_CEILING: f32 = 1.0;
pub const TEXTURE_QUALITY_STEP: f32 = 0.1;
pub const TEXTURE_QUALITY_FLOOR: f32 = 0.5;
pub const TEXTURE_QUALITY_CEILING: f32 = 1.0;
