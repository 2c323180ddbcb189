use crate::constants::{HUD_HIDDEN_CLASS, HUD_ID};
use soundstage_core::{FrameOutput, Preset};
use web_sys as web;

/// Below this confidence the tempo is shown as unknown.
const BPM_DISPLAY_MIN_CONFIDENCE: f32 = 0.15;

#[inline]
pub fn is_hidden(document: &web::Document) -> bool {
    document
        .get_element_by_id(HUD_ID)
        .map(|el| el.class_list().contains(HUD_HIDDEN_CLASS))
        .unwrap_or(true)
}

pub fn set_visible(document: &web::Document, visible: bool) {
    if let Some(el) = document.get_element_by_id(HUD_ID) {
        _ = el.class_list().toggle_with_force(HUD_HIDDEN_CLASS, !visible);
    }
}

fn tempo_text(bpm: f32, confidence: f32) -> String {
    if confidence < BPM_DISPLAY_MIN_CONFIDENCE || bpm <= 0.0 {
        "-- BPM".to_string()
    } else {
        format!("{:.0} BPM ({:.0}%)", bpm, confidence * 100.0)
    }
}

/// Refresh the stage readout: preset, tempo, beat pulse and band levels.
/// The pulse and levels are exposed as CSS variables for the page to animate.
pub fn update(
    document: &web::Document,
    out: &FrameOutput,
    preset: &Preset,
    bypass: bool,
    visible: bool,
) {
    if !visible {
        if !is_hidden(document) {
            set_visible(document, false);
        }
        return;
    }
    let Some(el) = document.get_element_by_id(HUD_ID) else {
        return;
    };
    if is_hidden(document) {
        set_visible(document, true);
    }
    let mode = if bypass { " • A/B bypass" } else { "" };
    let text = format!(
        "{} • {}{}",
        preset.name,
        tempo_text(out.tempo.bpm, out.tempo.confidence),
        mode
    );
    if el.text_content().as_deref() != Some(text.as_str()) {
        el.set_text_content(Some(&text));
    }
    if el.get_attribute("title").as_deref() != Some(preset.description) {
        _ = el.set_attribute("title", preset.description);
    }
    let style = format!(
        "--beat-pulse:{:.3};--level-low:{:.3};--level-mid:{:.3};--level-high:{:.3};--energy:{:.3};--peak:{:.3}",
        out.tempo.pulse,
        out.bands.low,
        out.bands.mid,
        out.bands.high,
        out.bands.energy(),
        out.waveform_peak
    );
    _ = el.set_attribute("style", &style);
}
