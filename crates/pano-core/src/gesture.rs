//! Pointer/touch gesture recognition.
//!
//! [`PointerAccumulator`] turns raw contact start/move/end records into
//! continuous drag or pinch motion plus discrete [`GestureEvent`]s. It knows
//! nothing about the camera; callers decide what a drag or a tap means.

use crate::constants::*;
use crate::timer::{TimerHandle, TimerQueue};
use fnv::FnvHashMap;
use glam::Vec2;

/// One observation of an active contact. `t` is in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub id: i32,
    pub x: f32,
    pub y: f32,
    pub t: f64,
}

impl PointerSample {
    pub fn new(id: i32, x: f32, y: f32, t: f64) -> Self {
        Self { id, x, y, t }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.t.is_finite()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    Tap {
        position: Vec2,
    },
    DoubleTap {
        position: Vec2,
    },
    LongPress {
        position: Vec2,
    },
    Swipe {
        position: Vec2,
        delta: Vec2,
    },
    PinchRotate {
        center: Vec2,
        rotation_deg: f32,
        scale: f32,
    },
}

impl GestureEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GestureEvent::Tap { .. } => "tap",
            GestureEvent::DoubleTap { .. } => "doubletap",
            GestureEvent::LongPress { .. } => "longpress",
            GestureEvent::Swipe { .. } => "swipe",
            GestureEvent::PinchRotate { .. } => "pinchrotate",
        }
    }

    pub fn position(&self) -> Vec2 {
        match *self {
            GestureEvent::Tap { position }
            | GestureEvent::DoubleTap { position }
            | GestureEvent::LongPress { position }
            | GestureEvent::Swipe { position, .. } => position,
            GestureEvent::PinchRotate { center, .. } => center,
        }
    }
}

/// Continuous motion produced by a contact move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    /// Pixel delta of the only active contact since its previous sample.
    Drag(Vec2),
    /// Two-contact update; `scale` is relative to the previous update.
    Pinch { scale: f32, rotation_deg: f32 },
}

#[derive(Clone, Debug)]
pub struct GestureConfig {
    pub tap_max_distance: f32,
    pub tap_max_duration_ms: f64,
    pub double_tap_window_ms: f64,
    pub long_press_delay_ms: f64,
    pub swipe_min_distance: f32,
    pub swipe_max_duration_ms: f64,
    pub pinch_rotate_threshold_deg: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_max_distance: TAP_MAX_DISTANCE_PX,
            tap_max_duration_ms: TAP_MAX_DURATION_MS,
            double_tap_window_ms: DOUBLE_TAP_WINDOW_MS,
            long_press_delay_ms: LONG_PRESS_DELAY_MS,
            swipe_min_distance: SWIPE_MIN_DISTANCE_PX,
            swipe_max_duration_ms: SWIPE_MAX_DURATION_MS,
            pinch_rotate_threshold_deg: PINCH_ROTATE_THRESHOLD_DEG,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Contact {
    start: PointerSample,
    last: Vec2,
    last_delta: Vec2,
    // Second contact of a double-tap; its own end must not count as a tap.
    suppress_tap: bool,
    // Took part in a multi-contact gesture at some point.
    multi: bool,
}

impl Contact {
    fn new(sample: PointerSample) -> Self {
        Self {
            start: sample,
            last: sample.position(),
            last_delta: Vec2::ZERO,
            suppress_tap: false,
            multi: false,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct PinchTracking {
    a: i32,
    b: i32,
    last_distance: f32,
    last_angle_deg: f32,
}

pub struct PointerAccumulator {
    config: GestureConfig,
    contacts: FnvHashMap<i32, Contact>,
    pinch: Option<PinchTracking>,
    last_tap_ms: Option<f64>,
    long_press: Option<TimerHandle>,
    timers: TimerQueue<Vec2>,
    outbox: Vec<GestureEvent>,
    enabled: bool,
    disposed: bool,
}

impl Default for PointerAccumulator {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl PointerAccumulator {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            contacts: FnvHashMap::default(),
            pinch: None,
            last_tap_ms: None,
            long_press: None,
            timers: TimerQueue::new(),
            outbox: Vec::new(),
            enabled: true,
            disposed: false,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    #[inline]
    fn accepts_input(&self) -> bool {
        self.enabled && !self.disposed
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn active_contacts(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    pub fn long_press_pending(&self) -> bool {
        self.long_press.is_some()
    }

    /// Records a new contact. Returns `false` when the sample was ignored.
    pub fn contact_start(&mut self, sample: PointerSample) -> bool {
        if !self.accepts_input() {
            return false;
        }
        if !sample.is_finite() {
            log::warn!("[gesture] ignoring non-finite contact start {:?}", sample);
            return false;
        }
        if self.contacts.remove(&sample.id).is_some() {
            log::debug!("[gesture] contact {} restarted without an end", sample.id);
            self.cancel_long_press();
        }

        let mut contact = Contact::new(sample);
        if self.contacts.is_empty() {
            let is_double = self.last_tap_ms.is_some_and(|last| {
                let gap = sample.t - last;
                (0.0..self.config.double_tap_window_ms).contains(&gap)
            });
            if is_double {
                self.last_tap_ms = None;
                contact.suppress_tap = true;
                self.emit(GestureEvent::DoubleTap {
                    position: sample.position(),
                });
            } else {
                let deadline = sample.t + self.config.long_press_delay_ms;
                self.long_press = Some(self.timers.schedule(deadline, sample.position()));
            }
            self.contacts.insert(sample.id, contact);
        } else {
            self.cancel_long_press();
            contact.multi = true;
            for c in self.contacts.values_mut() {
                c.multi = true;
            }
            self.contacts.insert(sample.id, contact);
            if self.pinch.is_none() {
                self.begin_pinch();
            }
        }
        true
    }

    pub fn contact_move(&mut self, sample: PointerSample) -> Option<Motion> {
        if !self.accepts_input() || !sample.is_finite() {
            return None;
        }
        let contact = self.contacts.get_mut(&sample.id)?;
        let pos = sample.position();
        let delta = pos - contact.last;
        contact.last = pos;
        contact.last_delta = delta;
        self.cancel_long_press();

        if let Some(pinch) = self.pinch {
            if pinch.a == sample.id || pinch.b == sample.id {
                return self.update_pinch();
            }
            return None;
        }
        (self.contacts.len() == 1).then_some(Motion::Drag(delta))
    }

    /// Classifies and removes a contact.
    ///
    /// Returns the release velocity (pixels per move) once the last contact
    /// lifts, or `None` while other contacts remain or the id is unknown.
    pub fn contact_end(&mut self, sample: PointerSample) -> Option<Vec2> {
        if !self.accepts_input() {
            return None;
        }
        let contact = self.contacts.remove(&sample.id)?;
        self.cancel_long_press();

        let end = if sample.x.is_finite() && sample.y.is_finite() {
            sample.position()
        } else {
            contact.last
        };
        let delta = end - contact.start.position();
        let dt = sample.t - contact.start.t;
        let distance = delta.length();

        if !contact.multi && dt.is_finite() {
            if distance > self.config.swipe_min_distance && dt < self.config.swipe_max_duration_ms
            {
                self.emit(GestureEvent::Swipe {
                    position: contact.start.position(),
                    delta,
                });
            } else if distance < self.config.tap_max_distance
                && dt < self.config.tap_max_duration_ms
                && !contact.suppress_tap
            {
                self.emit(GestureEvent::Tap { position: end });
                self.last_tap_ms = Some(sample.t);
            }
        }

        self.after_removal(sample.id);
        self.contacts.is_empty().then(|| {
            if contact.multi {
                Vec2::ZERO
            } else {
                contact.last_delta
            }
        })
    }

    /// Drops a contact without classifying it (e.g. `pointercancel`).
    pub fn contact_cancel(&mut self, id: i32) -> Option<Vec2> {
        if !self.accepts_input() {
            return None;
        }
        self.contacts.remove(&id)?;
        self.cancel_long_press();
        self.after_removal(id);
        self.contacts.is_empty().then_some(Vec2::ZERO)
    }

    /// Fires the long-press timer if its deadline has passed.
    pub fn poll(&mut self, now_ms: f64) {
        while let Some((handle, position)) = self.timers.pop_expired(now_ms) {
            if self.long_press == Some(handle) {
                self.long_press = None;
            }
            if self.accepts_input() {
                self.emit(GestureEvent::LongPress { position });
            }
        }
    }

    pub fn drain_gestures(&mut self, out: &mut Vec<GestureEvent>) {
        out.append(&mut self.outbox);
    }

    /// While disabled all handlers are no-ops. Contacts left over from before
    /// the disable are discarded on re-enable instead of being replayed.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        self.cancel_long_press();
        if enabled {
            self.contacts.clear();
            self.pinch = None;
            self.last_tap_ms = None;
        }
        self.enabled = enabled;
        log::debug!("[gesture] enabled={}", enabled);
    }

    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.timers.clear();
        self.long_press = None;
        self.contacts.clear();
        self.pinch = None;
        self.outbox.clear();
        log::debug!("[gesture] disposed");
    }

    fn emit(&mut self, event: GestureEvent) {
        log::debug!("[gesture] {} at {:?}", event.name(), event.position());
        self.outbox.push(event);
    }

    fn cancel_long_press(&mut self) {
        if let Some(handle) = self.long_press.take() {
            self.timers.cancel(handle);
        }
    }

    fn after_removal(&mut self, id: i32) {
        if self.contacts.len() < 2 {
            self.pinch = None;
        } else if self.pinch.is_some_and(|p| p.a == id || p.b == id) {
            self.pinch = None;
            self.begin_pinch();
        }
    }

    fn begin_pinch(&mut self) {
        let mut ids: Vec<i32> = self.contacts.keys().copied().collect();
        ids.sort_unstable();
        if let [a, b, ..] = *ids.as_slice() {
            let (distance, angle) = self.separation(a, b);
            self.pinch = Some(PinchTracking {
                a,
                b,
                last_distance: distance,
                last_angle_deg: angle,
            });
        }
    }

    fn separation(&self, a: i32, b: i32) -> (f32, f32) {
        let pa = self.contacts.get(&a).map(|c| c.last).unwrap_or_default();
        let pb = self.contacts.get(&b).map(|c| c.last).unwrap_or_default();
        let d = pb - pa;
        (d.length(), d.y.atan2(d.x).to_degrees())
    }

    fn update_pinch(&mut self) -> Option<Motion> {
        let mut pinch = self.pinch?;
        let (distance, angle) = self.separation(pinch.a, pinch.b);
        let previous_distance = pinch.last_distance;
        let rotation = wrap_degrees(angle - pinch.last_angle_deg);
        pinch.last_distance = distance;
        pinch.last_angle_deg = angle;
        self.pinch = Some(pinch);

        // Coincident contacts give no usable scale.
        if previous_distance <= f32::EPSILON || !distance.is_finite() {
            return None;
        }
        let scale = distance / previous_distance;
        if rotation.abs() > self.config.pinch_rotate_threshold_deg {
            let center = self
                .contacts
                .get(&pinch.a)
                .zip(self.contacts.get(&pinch.b))
                .map(|(a, b)| (a.last + b.last) * 0.5)
                .unwrap_or_default();
            self.emit(GestureEvent::PinchRotate {
                center,
                rotation_deg: rotation,
                scale,
            });
        }
        Some(Motion::Pinch {
            scale,
            rotation_deg: rotation,
        })
    }
}

/// Maps an angle difference into `[-180, 180)`.
#[inline]
pub fn wrap_degrees(deg: f32) -> f32 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}
