// Host-side tests for the orientation controller: clamping, input fusion and
// the per-tick ordering of auto-rotate, inertia and keys.

use glam::Vec2;
use pano_core::*;
use rand::prelude::*;
use std::cell::RefCell;
use std::f32::consts::{FRAC_PI_2, TAU};
use std::rc::Rc;

fn approx(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() <= tol
}

#[test]
fn drag_past_pitch_limit_lands_exactly_on_the_limit() {
    let mut ctl = OrientationController::default();
    ctl.set_view_limits(Some(ViewLimits::pitch(-0.3, 0.3)));
    ctl.apply_drag_delta(0.0, 10000.0);
    assert_eq!(ctl.orientation().pitch, 0.3);
}

#[test]
fn pitch_is_bounded_even_without_limits() {
    let mut ctl = OrientationController::default();
    ctl.apply_drag_delta(0.0, -1.0e6);
    assert_eq!(ctl.orientation().pitch, -FRAC_PI_2);
    ctl.apply_drag_delta(0.0, 2.0e6);
    assert_eq!(ctl.orientation().pitch, FRAC_PI_2);
}

#[test]
fn yaw_is_free_unless_configured() {
    let mut ctl = OrientationController::default();
    ctl.apply_drag_delta(-1.0e5, 0.0);
    assert!(ctl.orientation().yaw > TAU, "yaw {}", ctl.orientation().yaw);

    ctl.set_view_limits(Some(ViewLimits::default().with_yaw(-1.0, 1.0)));
    assert_eq!(ctl.orientation().yaw, 1.0);
    ctl.apply_drag_delta(1.0e5, 0.0);
    assert_eq!(ctl.orientation().yaw, -1.0);
}

#[test]
fn drag_sign_convention() {
    let mut ctl = OrientationController::default();
    ctl.apply_drag_delta(100.0, 0.0);
    let o = ctl.orientation();
    assert!(approx(o.yaw, -100.0 * DRAG_RADIANS_PER_PIXEL, 1e-6));
    assert_eq!(o.pitch, 0.0);

    ctl.apply_drag_delta(0.0, 100.0);
    assert!(approx(ctl.orientation().pitch, 100.0 * DRAG_RADIANS_PER_PIXEL, 1e-6));
}

#[test]
fn zoom_is_clamped_to_fov_range() {
    let mut ctl = OrientationController::default();
    ctl.apply_zoom_delta(1000.0);
    assert_eq!(ctl.orientation().fov, MAX_FOV_DEG);
    ctl.apply_zoom_delta(-1000.0);
    assert_eq!(ctl.orientation().fov, MIN_FOV_DEG);
    ctl.apply_zoom_delta(f32::NAN);
    assert_eq!(ctl.orientation().fov, MIN_FOV_DEG);
}

#[test]
fn queued_zoom_scales_multiply() {
    let mut ctl = OrientationController::default();
    ctl.set_fov(75.0);
    ctl.push(ViewCommand::ZoomScale(1.5));
    ctl.push(ViewCommand::ZoomScale(200.0 / 150.0));
    ctl.push(ViewCommand::ZoomScale(0.0));
    ctl.push(ViewCommand::ZoomScale(f32::NAN));
    let view = ctl.tick(16.0, KeyDelta::default());
    assert!(approx(view.fov, 37.5, 1e-3));

    ctl.apply_zoom_scale(0.01);
    assert_eq!(ctl.orientation().fov, MAX_FOV_DEG);
}

#[test]
fn inverted_ranges_collapse_instead_of_panicking() {
    let mut ctl = OrientationController::default();
    ctl.set_view_limits(Some(ViewLimits::pitch(0.5, -0.5)));
    assert_eq!(ctl.orientation().pitch, -0.5);
    ctl.apply_drag_delta(0.0, 500.0);
    assert_eq!(ctl.orientation().pitch, -0.5);

    ctl.set_fov_range(90.0, 40.0);
    assert_eq!(ctl.orientation().fov, 40.0);
}

#[test]
fn upright_device_looks_at_the_horizon() {
    let mut ctl = OrientationController::default();
    ctl.apply_absolute(0.0, FRAC_PI_2, 0.0, 0.0);
    let o = ctl.orientation();
    assert!(approx(o.yaw, 0.0, 1e-4), "yaw {}", o.yaw);
    assert!(approx(o.pitch, 0.0, 1e-4), "pitch {}", o.pitch);
}

#[test]
fn flat_device_looks_straight_down() {
    let mut ctl = OrientationController::default();
    ctl.apply_absolute(0.0, 0.0, 0.0, 0.0);
    assert!(approx(ctl.orientation().pitch, -FRAC_PI_2, 1e-3));
}

#[test]
fn compass_heading_turns_yaw() {
    let mut ctl = OrientationController::default();
    ctl.apply_absolute(FRAC_PI_2, FRAC_PI_2, 0.0, 0.0);
    assert!(approx(ctl.orientation().yaw, FRAC_PI_2, 1e-4));
}

#[test]
fn absolute_readings_replace_rather_than_accumulate() {
    let mut ctl = OrientationController::default();
    ctl.apply_drag_delta(300.0, 40.0);
    ctl.apply_absolute(0.0, FRAC_PI_2, 0.0, 0.0);
    let first = ctl.orientation();
    ctl.apply_absolute(0.0, FRAC_PI_2, 0.0, 0.0);
    assert_eq!(ctl.orientation(), first);
    assert!(approx(first.yaw, 0.0, 1e-4));
}

#[test]
fn absolute_pitch_respects_limits() {
    let mut ctl = OrientationController::default();
    ctl.set_view_limits(Some(ViewLimits::pitch(-0.3, 0.3)));
    ctl.apply_absolute(0.0, 0.0, 0.0, 0.0);
    assert_eq!(ctl.orientation().pitch, -0.3);
}

#[test]
fn auto_rotate_advances_yaw_by_speed_times_dt() {
    let mut ctl = OrientationController::new(ControllerConfig {
        auto_rotate: true,
        auto_rotate_speed: 0.001,
        ..ControllerConfig::default()
    });
    ctl.tick(100.0, KeyDelta::default());
    assert!(approx(ctl.orientation().yaw, 0.1, 1e-6));
}

#[test]
fn auto_rotate_yields_to_drag_and_device_orientation() {
    let mut ctl = OrientationController::new(ControllerConfig {
        auto_rotate: true,
        auto_rotate_speed: 0.001,
        ..ControllerConfig::default()
    });
    ctl.push(ViewCommand::DragStart);
    ctl.tick(100.0, KeyDelta::default());
    assert_eq!(ctl.orientation().yaw, 0.0);

    ctl.push(ViewCommand::DragEnd {
        velocity: Vec2::ZERO,
    });
    ctl.set_device_orientation_active(true);
    ctl.tick(100.0, KeyDelta::default());
    assert_eq!(ctl.orientation().yaw, 0.0);

    ctl.set_device_orientation_active(false);
    ctl.tick(100.0, KeyDelta::default());
    assert!(ctl.orientation().yaw > 0.0);
}

#[test]
fn inertia_decays_strictly_then_stays_at_zero() {
    let mut ctl = OrientationController::default();
    ctl.push(ViewCommand::DragStart);
    ctl.tick(16.0, KeyDelta::default());
    ctl.push(ViewCommand::DragEnd {
        velocity: Vec2::new(20.0, 0.0),
    });

    let mut steps = Vec::new();
    let mut prev = ctl.orientation().yaw;
    for _ in 0..1000 {
        ctl.tick(16.0, KeyDelta::default());
        let yaw = ctl.orientation().yaw;
        steps.push((yaw - prev).abs());
        prev = yaw;
    }

    let moving = steps.iter().take_while(|d| **d > 0.0).count();
    assert!(moving > 10 && moving < 1000, "inertia ran {moving} ticks");
    for pair in steps[..moving].windows(2) {
        assert!(pair[1] < pair[0], "not decaying: {:?}", pair);
    }
    assert!(steps[moving..].iter().all(|d| *d == 0.0));
    assert!(!ctl.is_inertia_active());
}

#[test]
fn new_drag_stops_inertia() {
    let mut ctl = OrientationController::default();
    ctl.push(ViewCommand::DragEnd {
        velocity: Vec2::new(20.0, 0.0),
    });
    ctl.tick(16.0, KeyDelta::default());
    assert!(ctl.is_inertia_active());

    ctl.push(ViewCommand::DragStart);
    let before = ctl.tick(16.0, KeyDelta::default());
    assert!(!ctl.is_inertia_active());
    let after = ctl.tick(16.0, KeyDelta::default());
    assert_eq!(before, after);
}

#[test]
fn keys_and_drag_compose_within_one_tick() {
    let mut ctl = OrientationController::default();
    ctl.push(ViewCommand::DragStart);
    ctl.push(ViewCommand::Drag(Vec2::new(10.0, 0.0)));
    let keys = KeyDelta {
        yaw: 0.05,
        pitch: 0.0,
        fov: -2.0,
    };
    let o = ctl.tick(16.0, keys);
    assert!(approx(o.yaw, -10.0 * DRAG_RADIANS_PER_PIXEL + 0.05, 1e-6));
    assert!(approx(o.fov, DEFAULT_FOV_DEG - 2.0, 1e-5));
}

#[test]
fn queued_commands_wait_for_tick() {
    let mut ctl = OrientationController::default();
    ctl.push(ViewCommand::LookAt {
        yaw: 1.0,
        pitch: 0.2,
    });
    ctl.push(ViewCommand::SetFov(60.0));
    assert_eq!(ctl.pending_commands(), 2);
    assert_eq!(ctl.orientation(), Orientation::default());

    let o = ctl.tick(16.0, KeyDelta::default());
    assert_eq!(ctl.pending_commands(), 0);
    assert_eq!(o, Orientation::new(1.0, 0.2, 60.0));

    ctl.push(ViewCommand::Reset);
    assert_eq!(ctl.tick(16.0, KeyDelta::default()), Orientation::default());
}

#[test]
fn render_target_sees_every_clamped_tick() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let mut ctl = OrientationController::default();
    ctl.set_view_limits(Some(ViewLimits::pitch(-0.3, 0.3)));
    ctl.set_render_target(Box::new(move |o: &Orientation| sink.borrow_mut().push(*o)));

    ctl.push(ViewCommand::Drag(Vec2::new(0.0, 10000.0)));
    ctl.tick(16.0, KeyDelta::default());
    ctl.tick(16.0, KeyDelta::default());

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|o| o.pitch == 0.3));
}

#[test]
fn forward_vector_matches_yaw_and_pitch() {
    let o = Orientation::new(FRAC_PI_2, 0.0, 75.0);
    let f = o.forward();
    assert!(approx(f.x, -1.0, 1e-5) && approx(f.z, 0.0, 1e-5));
    let (yaw, pitch) = yaw_pitch_from_rotation(Orientation::new(0.4, -0.2, 75.0).rotation());
    assert!(approx(yaw, 0.4, 1e-5) && approx(pitch, -0.2, 1e-5));
}

#[test]
fn clamp_invariant_holds_for_random_input_sequences() {
    let mut rng = StdRng::seed_from_u64(7);
    for round in 0..20 {
        let mut ctl = OrientationController::default();
        let limits = if round % 2 == 0 {
            let lo = rng.gen_range(-1.5f32..0.0);
            let hi = rng.gen_range(0.0f32..1.5);
            Some(ViewLimits::pitch(lo, hi))
        } else {
            None
        };
        ctl.set_view_limits(limits);
        let (lo, hi) = limits.unwrap_or_default().pitch_range();

        for _ in 0..200 {
            match rng.gen_range(0..4) {
                0 => ctl.apply_drag_delta(
                    rng.gen_range(-5000.0f32..5000.0),
                    rng.gen_range(-5000.0f32..5000.0),
                ),
                1 => ctl.apply_absolute(
                    rng.gen_range(0.0f32..TAU),
                    rng.gen_range(-3.2f32..3.2),
                    rng.gen_range(-1.6f32..1.6),
                    rng.gen_range(-1.6f32..1.6),
                ),
                2 => ctl.apply_zoom_delta(rng.gen_range(-200.0f32..200.0)),
                _ => {
                    if rng.gen_bool(0.3) {
                        ctl.push(ViewCommand::DragEnd {
                            velocity: Vec2::new(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0)),
                        });
                    }
                    let keys = KeyDelta {
                        yaw: rng.gen_range(-0.1..0.1),
                        pitch: rng.gen_range(-0.5..0.5),
                        fov: rng.gen_range(-5.0..5.0),
                    };
                    ctl.tick(rng.gen_range(0.0..50.0), keys);
                }
            }
            let o = ctl.orientation();
            assert!(o.pitch >= lo && o.pitch <= hi, "pitch {} outside {lo}..{hi}", o.pitch);
            assert!(o.fov >= MIN_FOV_DEG && o.fov <= MAX_FOV_DEG, "fov {}", o.fov);
            assert!(o.yaw.is_finite());
        }
    }
}
