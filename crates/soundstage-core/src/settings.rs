//! Plain-data settings snapshot. The engine only converts to and from JSON;
//! storing the string is the host's business.

use crate::controls::{Controls, Eq3};
use crate::error::EngineError;
use serde::de::{DeserializeOwned, Error as _};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    pub preset: String,
    pub volume: f32,
    pub depth: f32,
    pub focus: f32,
    pub early_mix: f32,
    pub reverb_length: f32,
    pub reverb_tone: f32,
    pub motion_enabled: bool,
    pub motion_intensity: f32,
    pub eq_bass: f32,
    pub eq_mid: f32,
    pub eq_treble: f32,
    pub visualizer: bool,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self::capture("studio", &Controls::default())
    }
}

impl SettingsSnapshot {
    pub fn capture(preset: &str, c: &Controls) -> Self {
        Self {
            preset: preset.to_string(),
            volume: c.volume,
            depth: c.depth,
            focus: c.focus,
            early_mix: c.early_mix,
            reverb_length: c.reverb_length,
            reverb_tone: c.reverb_tone,
            motion_enabled: c.motion_enabled,
            motion_intensity: c.motion_intensity,
            eq_bass: c.eq.bass_db,
            eq_mid: c.eq.mid_db,
            eq_treble: c.eq.treble_db,
            visualizer: c.visualizer_enabled,
        }
    }

    /// Controls with every value clamped into range.
    pub fn controls(&self) -> Controls {
        Controls {
            volume: self.volume,
            depth: self.depth,
            focus: self.focus,
            early_mix: self.early_mix,
            reverb_length: self.reverb_length,
            reverb_tone: self.reverb_tone,
            motion_enabled: self.motion_enabled,
            motion_intensity: self.motion_intensity,
            eq: Eq3 {
                bass_db: self.eq_bass,
                mid_db: self.eq_mid,
                treble_db: self.eq_treble,
            },
            visualizer_enabled: self.visualizer,
        }
        .sanitized()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse a stored snapshot. Only malformed JSON or a non-object top
    /// level is an error; each field that is missing, `null` or of the wrong
    /// type keeps its default while the others are still restored.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(map) = value else {
            return Err(serde_json::Error::custom("settings must be a JSON object").into());
        };
        let mut s = Self::default();
        read_field(&map, &["preset"], &mut s.preset);
        read_field(&map, &["volume"], &mut s.volume);
        read_field(&map, &["depth"], &mut s.depth);
        read_field(&map, &["focus"], &mut s.focus);
        read_field(&map, &["earlyMix"], &mut s.early_mix);
        read_field(&map, &["reverbLength"], &mut s.reverb_length);
        read_field(&map, &["reverbTone"], &mut s.reverb_tone);
        read_field(&map, &["motionEnabled", "motionToggle"], &mut s.motion_enabled);
        read_field(&map, &["motionIntensity"], &mut s.motion_intensity);
        read_field(&map, &["eqBass"], &mut s.eq_bass);
        read_field(&map, &["eqMid"], &mut s.eq_mid);
        read_field(&map, &["eqTreble"], &mut s.eq_treble);
        read_field(&map, &["visualizer"], &mut s.visualizer);
        Ok(s)
    }

    /// Parse, logging and falling back to defaults on corrupt input.
    pub fn from_json_or_default(json: &str) -> Self {
        Self::from_json(json).unwrap_or_else(|e| {
            log::warn!("[settings] {e}; using defaults");
            Self::default()
        })
    }
}

/// Overwrite `slot` with the first key present in `map` that parses as `T`.
fn read_field<T: DeserializeOwned>(map: &Map<String, Value>, keys: &[&str], slot: &mut T) {
    let Some((key, value)) = keys.iter().find_map(|k| map.get(*k).map(|v| (*k, v))) else {
        return;
    };
    match T::deserialize(value) {
        Ok(v) => *slot = v,
        Err(e) => log::warn!("[settings] ignoring `{key}`: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let s = SettingsSnapshot::from_json(r#"{"depth": 40, "preset": "hall"}"#).unwrap();
        assert_eq!(s.depth, 40.0);
        assert_eq!(s.preset, "hall");
        assert_eq!(s.volume, Controls::default().volume);
    }

    #[test]
    fn legacy_motion_toggle_key_is_accepted() {
        let s = SettingsSnapshot::from_json(r#"{"motionToggle": false}"#).unwrap();
        assert!(!s.motion_enabled);
    }

    #[test]
    fn corrupt_json_falls_back() {
        assert!(matches!(
            SettingsSnapshot::from_json("{not json"),
            Err(EngineError::Settings(_))
        ));
        assert_eq!(
            SettingsSnapshot::from_json_or_default("[1,2"),
            SettingsSnapshot::default()
        );
    }

    #[test]
    fn one_bad_field_keeps_the_rest() {
        let s = SettingsSnapshot::from_json(
            r#"{"preset":"cathedral","volume":0.3,"depth":null,"motionToggle":false,"eqMid":"loud"}"#,
        )
        .unwrap();
        assert_eq!(s.preset, "cathedral");
        assert_eq!(s.volume, 0.3);
        assert!(!s.motion_enabled);
        assert_eq!(s.depth, Controls::default().depth);
        assert_eq!(s.eq_mid, Controls::default().eq.mid_db);
    }

    #[test]
    fn non_object_json_is_rejected() {
        assert!(matches!(
            SettingsSnapshot::from_json("[1, 2]"),
            Err(EngineError::Settings(_))
        ));
    }

    #[test]
    fn json_round_trip_keeps_every_field() {
        let mut c = Controls::default();
        c.set_depth(33.0);
        c.motion_enabled = false;
        let s = SettingsSnapshot::capture("club", &c);
        assert_eq!(SettingsSnapshot::from_json(&s.to_json()).unwrap(), s);
    }

    #[test]
    fn out_of_range_values_are_clamped_on_read() {
        let s = SettingsSnapshot::from_json(r#"{"depth": 900, "eqBass": -40}"#).unwrap();
        let c = s.controls();
        assert_eq!(c.depth, 100.0);
        assert_eq!(c.eq.bass_db, -12.0);
    }
}
