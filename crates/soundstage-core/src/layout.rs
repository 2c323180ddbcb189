//! Fixed layout of the direct-path bands and the stereo accompaniment panners.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BandId {
    Low,
    Mid,
    High,
}

/// Musical part a band is assumed to carry; selects its motion layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Bass,
    Vocal,
    Drum,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    Lowpass,
    Highpass,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandFilter {
    pub kind: FilterKind,
    pub frequency_hz: f32,
    pub q: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cone {
    pub inner_deg: f32,
    pub outer_deg: f32,
    pub outer_gain: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandLayout {
    pub id: BandId,
    pub role: Role,
    pub filters: &'static [BandFilter],
    pub gain: f32,
    /// One entry per lane; a zero delay means the lane has no delay line.
    pub lane_delays_sec: &'static [f32],
    pub elevation: f32,
    pub depth: f32,
    pub spread: f32,
    pub rolloff: f32,
    pub cone: Cone,
}

impl BandLayout {
    pub fn lane_count(&self) -> usize {
        self.lane_delays_sec.len().max(1)
    }

    /// Static per-lane gain; split lanes share the band's energy.
    pub fn lane_gain(&self) -> f32 {
        if self.lane_count() > 1 {
            0.55
        } else {
            1.0
        }
    }

    /// Highest highpass in the chain, or 0 when the band has none.
    pub fn highpass_floor_hz(&self) -> f32 {
        self.filters
            .iter()
            .filter(|f| f.kind == FilterKind::Highpass)
            .map(|f| f.frequency_hz)
            .fold(0.0, f32::max)
    }
}

const DEFAULT_CONE: Cone = Cone {
    inner_deg: 90.0,
    outer_deg: 210.0,
    outer_gain: 0.35,
};

pub const DIRECT_BANDS: [BandLayout; 3] = [
    BandLayout {
        id: BandId::Low,
        role: Role::Bass,
        filters: &[BandFilter {
            kind: FilterKind::Lowpass,
            frequency_hz: 240.0,
            q: 0.7,
        }],
        gain: 0.92,
        lane_delays_sec: &[0.0],
        elevation: -0.08,
        depth: 0.1,
        spread: 0.0,
        rolloff: 0.8,
        cone: Cone {
            inner_deg: 180.0,
            outer_deg: 300.0,
            outer_gain: 0.6,
        },
    },
    BandLayout {
        id: BandId::Mid,
        role: Role::Vocal,
        filters: &[
            BandFilter {
                kind: FilterKind::Highpass,
                frequency_hz: 180.0,
                q: 0.7,
            },
            BandFilter {
                kind: FilterKind::Lowpass,
                frequency_hz: 5200.0,
                q: 0.7,
            },
        ],
        gain: 1.0,
        lane_delays_sec: &[0.0],
        elevation: 0.06,
        depth: -0.05,
        spread: 0.0,
        rolloff: 1.0,
        cone: DEFAULT_CONE,
    },
    BandLayout {
        id: BandId::High,
        role: Role::Drum,
        filters: &[BandFilter {
            kind: FilterKind::Highpass,
            frequency_hz: 4200.0,
            q: 0.7,
        }],
        gain: 0.82,
        lane_delays_sec: &[0.0, 0.012],
        elevation: 0.14,
        depth: 0.05,
        spread: 0.55,
        rolloff: 1.1,
        cone: DEFAULT_CONE,
    },
];

pub fn band(id: BandId) -> &'static BandLayout {
    match id {
        BandId::Low => &DIRECT_BANDS[0],
        BandId::Mid => &DIRECT_BANDS[1],
        BandId::High => &DIRECT_BANDS[2],
    }
}

/// Band-pass applied to the side (L-R) signal before it reaches the
/// accompaniment panners.
pub const ACCOMPANIMENT_HIGHPASS_HZ: f32 = 180.0;
pub const ACCOMPANIMENT_LOWPASS_HZ: f32 = 7800.0;
