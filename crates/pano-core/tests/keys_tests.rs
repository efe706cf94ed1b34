// Host-side tests for held-key tracking.

use pano_core::{KeyConfig, KeyDelta, KeyState, PanoError, ViewKey};

#[test]
fn dom_keys_map_to_view_keys() {
    assert_eq!(ViewKey::from_dom_key("ArrowLeft"), Some(ViewKey::Left));
    assert_eq!(ViewKey::from_dom_key("D"), Some(ViewKey::Right));
    assert_eq!(ViewKey::from_dom_key("w"), Some(ViewKey::Up));
    assert_eq!(ViewKey::from_dom_key("ArrowDown"), Some(ViewKey::Down));
    assert_eq!(ViewKey::from_dom_key("+"), Some(ViewKey::ZoomIn));
    assert_eq!(ViewKey::from_dom_key("_"), Some(ViewKey::ZoomOut));
    assert_eq!(ViewKey::from_dom_key("Enter"), None);
    assert_eq!(
        "Tab".parse::<ViewKey>(),
        Err(PanoError::UnknownKey("Tab".into()))
    );
}

#[test]
fn held_keys_produce_a_constant_delta() {
    let cfg = KeyConfig::default();
    let mut keys = KeyState::new(cfg.clone());
    assert!(keys.delta().is_zero());

    assert!(keys.key_down(ViewKey::Left));
    assert!(!keys.key_down(ViewKey::Left), "auto-repeat is not a new press");
    keys.key_down(ViewKey::Up);
    keys.key_down(ViewKey::ZoomIn);
    let expected = KeyDelta {
        yaw: cfg.yaw_step,
        pitch: cfg.pitch_step,
        fov: -cfg.zoom_step,
    };
    assert_eq!(keys.delta(), expected);
    assert_eq!(keys.delta(), expected);

    keys.key_up(ViewKey::Up);
    keys.key_up(ViewKey::ZoomIn);
    assert_eq!(keys.delta().pitch, 0.0);
    assert_eq!(keys.delta().fov, 0.0);
}

#[test]
fn opposite_keys_cancel() {
    let mut keys = KeyState::default();
    keys.key_down(ViewKey::Left);
    keys.key_down(ViewKey::Right);
    assert_eq!(keys.delta().yaw, 0.0);
}

#[test]
fn disabling_drops_held_keys_without_replay() {
    let mut keys = KeyState::default();
    keys.key_down(ViewKey::Right);
    keys.set_enabled(false);
    assert_eq!(keys.held_count(), 0);
    assert!(!keys.key_down(ViewKey::Left));
    keys.set_enabled(true);
    assert!(keys.delta().is_zero());
    assert!(!keys.key_up(ViewKey::Right));
}
