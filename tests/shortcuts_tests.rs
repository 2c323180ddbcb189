// Host-side tests for pure keyboard functions.
// The main crate is wasm-only, so we include the pure-Rust module directly.

#![allow(dead_code)]
mod shortcuts {
    include!("../src/events/shortcuts.rs");
}

use shortcuts::*;

#[test]
fn brackets_cycle_presets() {
    assert_eq!(shortcut_for_key("["), Some(Shortcut::CyclePreset(-1)));
    assert_eq!(shortcut_for_key("]"), Some(Shortcut::CyclePreset(1)));
}

#[test]
fn letter_toggles_ignore_case() {
    for (lower, upper, expected) in [
        ("b", "B", Shortcut::ToggleBypass),
        ("m", "M", Shortcut::ToggleMotion),
        ("v", "V", Shortcut::ToggleVisualizer),
    ] {
        assert_eq!(shortcut_for_key(lower), Some(expected));
        assert_eq!(shortcut_for_key(upper), Some(expected));
    }
}

#[test]
fn arrows_adjust_volume_and_suppress_scrolling() {
    let up = shortcut_for_key("ArrowUp").unwrap();
    let down = shortcut_for_key("ArrowDown").unwrap();
    assert_eq!(up, Shortcut::Volume(1));
    assert_eq!(down, Shortcut::Volume(-1));
    assert!(wants_prevent_default(up));
    assert!(!wants_prevent_default(Shortcut::ToggleBypass));
}

#[test]
fn unmapped_keys_do_nothing() {
    for key in ["x", " ", "Enter", "ArrowLeft", "1", ""] {
        assert_eq!(shortcut_for_key(key), None, "key {key:?}");
    }
}

#[test]
fn volume_nudge_is_clamped() {
    assert!((nudge_volume(0.5, 1, 0.05) - 0.55).abs() < 1e-6);
    assert_eq!(nudge_volume(0.98, 1, 0.05), 1.0);
    assert_eq!(nudge_volume(0.02, -1, 0.05), 0.0);
}

#[test]
fn form_fields_keep_their_keys() {
    assert!(ignored_target("INPUT"));
    assert!(ignored_target("textarea"));
    assert!(ignored_target("SELECT"));
    assert!(!ignored_target("BUTTON"));
    assert!(!ignored_target("BODY"));
}
