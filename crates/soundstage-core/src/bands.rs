//! Band energies and waveform peak read from the analyser snapshots.

use crate::constants::{HIGH_BAND, LOW_BAND, MID_BAND};

/// Normalized energies of the three analysis bands, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BandLevels {
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

impl BandLevels {
    pub fn sample(spectrum: &[u8]) -> Self {
        Self {
            low: band_average(spectrum, LOW_BAND.0, LOW_BAND.1),
            mid: band_average(spectrum, MID_BAND.0, MID_BAND.1),
            high: band_average(spectrum, HIGH_BAND.0, HIGH_BAND.1),
        }
    }

    /// Single loudness figure for the stage readout, leaning on the low band.
    pub fn energy(&self) -> f32 {
        (self.low * 1.2 + self.mid + self.high * 0.8) / 3.0
    }
}

/// Mean of `data[from..to]` scaled to `[0, 1]`; ranges past the end are
/// truncated and an empty range yields 0.
pub fn band_average(data: &[u8], from: usize, to: usize) -> f32 {
    let end = to.min(data.len());
    if end <= from {
        return 0.0;
    }
    let sum: u32 = data[from..end].iter().map(|&v| v as u32).sum();
    sum as f32 / (end - from) as f32 / 255.0
}

/// Peak deviation of an 8-bit time-domain snapshot from its 128 midpoint.
pub fn waveform_peak(wave: &[u8]) -> f32 {
    wave.iter()
        .map(|&v| (v as f32 - 128.0).abs() / 128.0)
        .fold(0.0, f32::max)
        .min(1.0)
}
