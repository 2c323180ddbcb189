/// Keyboard actions understood by the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    CyclePreset(i32),
    ToggleBypass,
    ToggleMotion,
    ToggleVisualizer,
    /// Signed number of volume steps.
    Volume(i32),
}

#[inline]
pub fn shortcut_for_key(key: &str) -> Option<Shortcut> {
    match key {
        "[" => Some(Shortcut::CyclePreset(-1)),
        "]" => Some(Shortcut::CyclePreset(1)),
        "b" | "B" => Some(Shortcut::ToggleBypass),
        "m" | "M" => Some(Shortcut::ToggleMotion),
        "v" | "V" => Some(Shortcut::ToggleVisualizer),
        "ArrowUp" => Some(Shortcut::Volume(1)),
        "ArrowDown" => Some(Shortcut::Volume(-1)),
        _ => None,
    }
}

/// Arrow keys scroll the page unless the default is suppressed.
#[inline]
pub fn wants_prevent_default(shortcut: Shortcut) -> bool {
    matches!(shortcut, Shortcut::Volume(_))
}

/// Keys typed into text fields belong to the field, not the page.
#[inline]
pub fn ignored_target(tag_name: &str) -> bool {
    matches!(
        tag_name.to_ascii_uppercase().as_str(),
        "INPUT" | "TEXTAREA" | "SELECT"
    )
}

#[inline]
pub fn nudge_volume(volume: f32, steps: i32, step: f32) -> f32 {
    (volume + steps as f32 * step).clamp(0.0, 1.0)
}
