// Host-side tests for post-release inertia.

use glam::Vec2;
use pano_core::{InertiaConfig, InertiaModel};

#[test]
fn steps_shrink_geometrically_until_zero() {
    let mut inertia = InertiaModel::new(InertiaConfig::default());
    inertia.release(Vec2::new(10.0, -4.0));
    let mut mags = Vec::new();
    while let Some(d) = inertia.step() {
        mags.push(d.length());
        assert!(mags.len() < 10_000, "inertia never terminated");
    }
    assert!(mags.len() > 1);
    assert!((mags[0] - Vec2::new(10.0, -4.0).length()).abs() < 1e-5);
    for pair in mags.windows(2) {
        assert!(pair[1] < pair[0]);
        assert!((pair[1] / pair[0] - 0.95).abs() < 1e-4);
    }
    assert!(!inertia.is_active());
    assert_eq!(inertia.step(), None);
}

#[test]
fn tiny_or_invalid_release_velocity_does_not_start() {
    let mut inertia = InertiaModel::default();
    inertia.release(Vec2::new(0.001, 0.0));
    assert!(!inertia.is_active());
    inertia.release(Vec2::new(f32::NAN, 1.0));
    assert!(!inertia.is_active());
}

#[test]
fn stop_and_runaway_damping() {
    let mut inertia = InertiaModel::new(InertiaConfig {
        damping: 1.5,
        epsilon: 0.01,
    });
    inertia.release(Vec2::new(1.0, 0.0));
    let ticks = std::iter::from_fn(|| inertia.step()).take(100_000).count();
    assert!(ticks < 100_000, "damping above one must still terminate");

    inertia.release(Vec2::new(5.0, 5.0));
    inertia.stop();
    assert_eq!(inertia.velocity(), Vec2::ZERO);
}
