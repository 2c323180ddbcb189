use crate::constants::*;
use glam::Vec3;
use soundstage_core::constants::EARLY_COUNT;
use soundstage_core::layout::{
    BandId, BandLayout, FilterKind, ACCOMPANIMENT_HIGHPASS_HZ, ACCOMPANIMENT_LOWPASS_HZ,
    DIRECT_BANDS,
};
use soundstage_core::{generate_impulse, FrameOutput, ImpulseSpec, ListenerPose};
use wasm_bindgen::JsValue;
use web_sys as web;

fn js<T>(r: Result<T, JsValue>, label: &str) -> anyhow::Result<T> {
    r.map_err(|e| anyhow::anyhow!("{label}: {e:?}"))
}

fn create_gain(ctx: &web::AudioContext, value: f32, label: &str) -> anyhow::Result<web::GainNode> {
    let g = js(web::GainNode::new(ctx), label)?;
    g.gain().set_value(value);
    Ok(g)
}

fn create_filter(
    ctx: &web::AudioContext,
    kind: web::BiquadFilterType,
    frequency_hz: f32,
    q: f32,
    label: &str,
) -> anyhow::Result<web::BiquadFilterNode> {
    let f = js(web::BiquadFilterNode::new(ctx), label)?;
    f.set_type(kind);
    f.frequency().set_value(frequency_hz);
    f.q().set_value(q);
    Ok(f)
}

fn create_delay(ctx: &web::AudioContext, max_sec: f64, label: &str) -> anyhow::Result<web::DelayNode> {
    js(ctx.create_delay_with_max_delay_time(max_sec), label)
}

struct PannerShape {
    distance_model: web::DistanceModelType,
    max_distance: f64,
    rolloff: f64,
    cone: Option<(f64, f64, f64)>,
}

fn create_panner(ctx: &web::AudioContext, shape: PannerShape) -> anyhow::Result<web::PannerNode> {
    let p = js(web::PannerNode::new(ctx), "PannerNode")?;
    p.set_panning_model(web::PanningModelType::Hrtf);
    p.set_distance_model(shape.distance_model);
    p.set_ref_distance(1.0);
    p.set_max_distance(shape.max_distance);
    p.set_rolloff_factor(shape.rolloff);
    if let Some((inner, outer, outer_gain)) = shape.cone {
        p.set_cone_inner_angle(inner);
        p.set_cone_outer_angle(outer);
        p.set_cone_outer_gain(outer_gain);
    }
    Ok(p)
}

#[inline]
fn connect(from: &web::AudioNode, to: &web::AudioNode) {
    _ = from.connect_with_audio_node(to);
}

#[inline]
fn ramp(param: &web::AudioParam, value: f32, now: f64, tau: f64) {
    if value.is_finite() {
        _ = param.set_target_at_time(value, now, tau);
    }
}

/// Older engines lack the AudioParam position/orientation attributes.
fn has_property(target: &JsValue, name: &str) -> bool {
    js_sys::Reflect::has(target, &JsValue::from_str(name)).unwrap_or(false)
}

pub struct Lane {
    pub air: web::BiquadFilterNode,
    pub delay: Option<web::DelayNode>,
    pub panner: web::PannerNode,
}

pub struct BandChain {
    pub id: BandId,
    pub gain: web::GainNode,
    pub lanes: Vec<Lane>,
}

pub struct EarlyTap {
    pub delay: web::DelayNode,
    pub filter: web::BiquadFilterNode,
    pub panner: web::PannerNode,
}

/// The whole WebAudio node graph driven by the engine.
pub struct SpatialGraph {
    pub ctx: web::AudioContext,
    pub analyser: web::AnalyserNode,
    master: web::GainNode,
    eq: [web::BiquadFilterNode; 3],
    direct: web::GainNode,
    bands: Vec<BandChain>,
    side_gains: [web::GainNode; 2],
    side_panners: [web::PannerNode; 2],
    taps: Vec<EarlyTap>,
    early_gain: web::GainNode,
    early_highpass: web::BiquadFilterNode,
    reverb_highpass: web::BiquadFilterNode,
    pre_delay: web::DelayNode,
    convolver: web::ConvolverNode,
    reverb_tone: web::BiquadFilterNode,
    reverb_low_shelf: web::BiquadFilterNode,
    reverb_presence: web::BiquadFilterNode,
    reverb_gain: web::GainNode,
    param_positions: bool,
    listener_params: bool,
}

fn build_band(
    ctx: &web::AudioContext,
    layout: &BandLayout,
    input: &web::AudioNode,
    output: &web::AudioNode,
) -> anyhow::Result<BandChain> {
    let mut last: web::AudioNode = input.clone();
    for f in layout.filters {
        let kind = match f.kind {
            FilterKind::Lowpass => web::BiquadFilterType::Lowpass,
            FilterKind::Highpass => web::BiquadFilterType::Highpass,
        };
        let filter = create_filter(ctx, kind, f.frequency_hz, f.q, "band filter")?;
        connect(&last, &filter);
        last = filter.into();
    }
    let gain = create_gain(ctx, layout.gain, "band gain")?;
    connect(&last, &gain);

    let mut lanes = Vec::with_capacity(layout.lane_count());
    for i in 0..layout.lane_count() {
        let lane_gain = create_gain(ctx, layout.lane_gain(), "lane gain")?;
        let air = create_filter(ctx, web::BiquadFilterType::Lowpass, 20000.0, 0.65, "air")?;
        let panner = create_panner(
            ctx,
            PannerShape {
                distance_model: web::DistanceModelType::Inverse,
                max_distance: 100.0,
                rolloff: layout.rolloff as f64,
                cone: Some((
                    layout.cone.inner_deg as f64,
                    layout.cone.outer_deg as f64,
                    layout.cone.outer_gain as f64,
                )),
            },
        )?;
        let base_delay = layout.lane_delays_sec.get(i).copied().unwrap_or(0.0);
        connect(&gain, &lane_gain);
        let delay = if base_delay > 0.0 {
            let d = create_delay(ctx, LANE_DELAY_MAX_SEC, "lane delay")?;
            d.delay_time().set_value(base_delay);
            connect(&lane_gain, &d);
            connect(&d, &air);
            Some(d)
        } else {
            connect(&lane_gain, &air);
            None
        };
        connect(&air, &panner);
        connect(&panner, output);
        lanes.push(Lane { air, delay, panner });
    }
    Ok(BandChain {
        id: layout.id,
        gain,
        lanes,
    })
}

impl SpatialGraph {
    /// Route `media` through the spatial stage into the context destination.
    pub fn build(media: &web::HtmlMediaElement, volume: f32) -> anyhow::Result<Self> {
        let ctx = js(web::AudioContext::new(), "AudioContext")?;
        let source = js(ctx.create_media_element_source(media), "MediaElementSource")?;

        let master = create_gain(&ctx, volume, "master")?;
        let eq = [
            create_filter(&ctx, web::BiquadFilterType::Lowshelf, EQ_LOW_SHELF_HZ, 0.8, "eq low")?,
            create_filter(&ctx, web::BiquadFilterType::Peaking, EQ_MID_PEAK_HZ, EQ_MID_Q, "eq mid")?,
            create_filter(&ctx, web::BiquadFilterType::Highshelf, EQ_HIGH_SHELF_HZ, 0.7, "eq high")?,
        ];
        let analyser = js(ctx.create_analyser(), "AnalyserNode")?;
        analyser.set_fft_size(ANALYSER_FFT_SIZE);
        analyser.set_smoothing_time_constant(ANALYSER_SMOOTHING);
        connect(&master, &eq[0]);
        connect(&eq[0], &eq[1]);
        connect(&eq[1], &eq[2]);
        connect(&eq[2], &analyser);
        connect(&analyser, &ctx.destination());

        // Mid (L+R)/2 feeds the direct, early and reverb paths; side (L-R)
        // feeds the accompaniment panners.
        let splitter = js(ctx.create_channel_splitter_with_number_of_outputs(2), "splitter")?;
        connect(&source, &splitter);
        let mid_bus = create_gain(&ctx, 1.0, "mid bus")?;
        for ch in 0..2 {
            let g = create_gain(&ctx, 0.5, "mid tap")?;
            _ = splitter.connect_with_audio_node_and_output(&g, ch);
            connect(&g, &mid_bus);
        }

        let mut side_gains = Vec::with_capacity(2);
        let mut side_panners = Vec::with_capacity(2);
        for (sign_l, sign_r) in [(0.5, -0.5), (-0.5, 0.5)] {
            let from_l = create_gain(&ctx, sign_l, "side L")?;
            let from_r = create_gain(&ctx, sign_r, "side R")?;
            let hp = create_filter(
                &ctx,
                web::BiquadFilterType::Highpass,
                ACCOMPANIMENT_HIGHPASS_HZ,
                0.7,
                "side hp",
            )?;
            let lp = create_filter(
                &ctx,
                web::BiquadFilterType::Lowpass,
                ACCOMPANIMENT_LOWPASS_HZ,
                0.7,
                "side lp",
            )?;
            let gain = create_gain(&ctx, 0.52, "side gain")?;
            let panner = create_panner(
                &ctx,
                PannerShape {
                    distance_model: web::DistanceModelType::Inverse,
                    max_distance: 80.0,
                    rolloff: 0.35,
                    cone: Some((150.0, 250.0, 0.6)),
                },
            )?;
            _ = splitter.connect_with_audio_node_and_output(&from_l, 0);
            _ = splitter.connect_with_audio_node_and_output(&from_r, 1);
            connect(&from_l, &hp);
            connect(&from_r, &hp);
            connect(&hp, &lp);
            connect(&lp, &gain);
            connect(&gain, &panner);
            connect(&panner, &master);
            side_gains.push(gain);
            side_panners.push(panner);
        }

        let direct = create_gain(&ctx, 1.0, "direct")?;
        connect(&mid_bus, &direct);
        let bands = DIRECT_BANDS
            .iter()
            .map(|layout| build_band(&ctx, layout, &direct, &master))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let early_send = create_gain(&ctx, 1.0, "early send")?;
        let early_highpass =
            create_filter(&ctx, web::BiquadFilterType::Highpass, 140.0, 0.7, "early hp")?;
        let early_gain = create_gain(&ctx, 0.0, "early gain")?;
        connect(&mid_bus, &early_send);
        connect(&early_send, &early_highpass);
        let mut taps = Vec::with_capacity(EARLY_COUNT);
        for _ in 0..EARLY_COUNT {
            let delay = create_delay(&ctx, EARLY_DELAY_MAX_SEC, "early delay")?;
            let filter =
                create_filter(&ctx, web::BiquadFilterType::Lowpass, 8000.0, 0.7, "early lp")?;
            let panner = create_panner(
                &ctx,
                PannerShape {
                    distance_model: web::DistanceModelType::Linear,
                    max_distance: 15.0,
                    rolloff: 0.8,
                    cone: None,
                },
            )?;
            connect(&early_highpass, &delay);
            connect(&delay, &filter);
            connect(&filter, &panner);
            connect(&panner, &early_gain);
            taps.push(EarlyTap {
                delay,
                filter,
                panner,
            });
        }
        connect(&early_gain, &master);

        let reverb_send = create_gain(&ctx, 1.0, "reverb send")?;
        let reverb_highpass =
            create_filter(&ctx, web::BiquadFilterType::Highpass, 180.0, 0.7, "reverb hp")?;
        let pre_delay = create_delay(&ctx, PRE_DELAY_MAX_SEC, "pre-delay")?;
        let convolver = js(web::ConvolverNode::new(&ctx), "ConvolverNode")?;
        convolver.set_normalize(true);
        let reverb_tone =
            create_filter(&ctx, web::BiquadFilterType::Lowpass, 7500.0, 0.7, "reverb tone")?;
        let reverb_low_shelf = create_filter(
            &ctx,
            web::BiquadFilterType::Lowshelf,
            REVERB_LOW_SHELF_HZ,
            0.7,
            "reverb shelf",
        )?;
        let reverb_presence = create_filter(
            &ctx,
            web::BiquadFilterType::Peaking,
            REVERB_PRESENCE_HZ,
            REVERB_PRESENCE_Q,
            "reverb presence",
        )?;
        let reverb_gain = create_gain(&ctx, 0.0, "reverb gain")?;
        connect(&mid_bus, &reverb_send);
        connect(&reverb_send, &reverb_highpass);
        connect(&reverb_highpass, &pre_delay);
        connect(&pre_delay, &convolver);
        connect(&convolver, &reverb_tone);
        connect(&reverb_tone, &reverb_low_shelf);
        connect(&reverb_low_shelf, &reverb_presence);
        connect(&reverb_presence, &reverb_gain);
        connect(&reverb_gain, &master);

        let param_positions = has_property(&side_panners[0], "positionX");
        let listener_params = has_property(&ctx.listener(), "forwardX");
        if !param_positions {
            log::warn!("[audio] PannerNode.positionX unavailable; using setPosition");
        }

        let [left_gain, right_gain]: [web::GainNode; 2] = side_gains
            .try_into()
            .map_err(|_| anyhow::anyhow!("side gain count"))?;
        let [left_panner, right_panner]: [web::PannerNode; 2] = side_panners
            .try_into()
            .map_err(|_| anyhow::anyhow!("side panner count"))?;

        log::info!(
            "[audio] graph ready: {} band lanes, {} early taps, {} Hz",
            bands.iter().map(|b| b.lanes.len()).sum::<usize>(),
            taps.len(),
            ctx.sample_rate()
        );

        Ok(Self {
            ctx,
            analyser,
            master,
            eq,
            direct,
            bands,
            side_gains: [left_gain, right_gain],
            side_panners: [left_panner, right_panner],
            taps,
            early_gain,
            early_highpass,
            reverb_highpass,
            pre_delay,
            convolver,
            reverb_tone,
            reverb_low_shelf,
            reverb_presence,
            reverb_gain,
            param_positions,
            listener_params,
        })
    }

    pub fn resume(&self) {
        _ = self.ctx.resume();
    }

    fn set_panner_position(&self, panner: &web::PannerNode, p: Vec3, now: f64) {
        if self.param_positions {
            ramp(&panner.position_x(), p.x, now, PANNER_RAMP_TAU_SEC);
            ramp(&panner.position_y(), p.y, now, PANNER_RAMP_TAU_SEC);
            ramp(&panner.position_z(), p.z, now, PANNER_RAMP_TAU_SEC);
        } else if p.is_finite() {
            #[allow(deprecated)]
            panner.set_position(p.x as f64, p.y as f64, p.z as f64);
        }
    }

    fn set_listener(&self, pose: &ListenerPose, now: f64) {
        let l = self.ctx.listener();
        if self.listener_params {
            ramp(&l.position_x(), pose.position.x, now, LISTENER_RAMP_TAU_SEC);
            ramp(&l.position_y(), pose.position.y, now, LISTENER_RAMP_TAU_SEC);
            ramp(&l.position_z(), pose.position.z, now, LISTENER_RAMP_TAU_SEC);
            ramp(&l.forward_x(), pose.forward.x, now, LISTENER_RAMP_TAU_SEC);
            ramp(&l.forward_y(), pose.forward.y, now, LISTENER_RAMP_TAU_SEC);
            ramp(&l.forward_z(), pose.forward.z, now, LISTENER_RAMP_TAU_SEC);
            ramp(&l.up_x(), pose.up.x, now, LISTENER_RAMP_TAU_SEC);
            ramp(&l.up_y(), pose.up.y, now, LISTENER_RAMP_TAU_SEC);
            ramp(&l.up_z(), pose.up.z, now, LISTENER_RAMP_TAU_SEC);
        } else if pose.position.is_finite() && pose.forward.is_finite() {
            let (p, f, u) = (pose.position, pose.forward, pose.up);
            #[allow(deprecated)]
            l.set_position(p.x as f64, p.y as f64, p.z as f64);
            #[allow(deprecated)]
            l.set_orientation(
                f.x as f64, f.y as f64, f.z as f64, u.x as f64, u.y as f64, u.z as f64,
            );
        }
    }

    /// Push one frame of engine targets into the graph as smoothed ramps.
    pub fn apply(&self, out: &FrameOutput) {
        let now = self.ctx.current_time();
        let m = &out.mix;

        ramp(&self.master.gain(), m.master_gain, now, GAIN_RAMP_TAU_SEC);
        ramp(&self.eq[0].gain(), m.eq.bass_db, now, GAIN_RAMP_TAU_SEC);
        ramp(&self.eq[1].gain(), m.eq.mid_db, now, GAIN_RAMP_TAU_SEC);
        ramp(&self.eq[2].gain(), m.eq.treble_db, now, GAIN_RAMP_TAU_SEC);
        ramp(&self.direct.gain(), m.direct_gain, now, GAIN_RAMP_TAU_SEC);

        for (chain, mix) in self.bands.iter().zip(m.bands.iter()) {
            debug_assert_eq!(chain.id, mix.id);
            ramp(&chain.gain.gain(), mix.gain, now, GAIN_RAMP_TAU_SEC);
            for (i, lane) in chain.lanes.iter().enumerate() {
                ramp(&lane.air.frequency(), mix.air_cutoff_hz, now, FILTER_RAMP_TAU_SEC);
                if let Some(d) = &lane.delay {
                    let target = mix.lane_delays_sec.get(i).copied().unwrap_or(0.0);
                    ramp(&d.delay_time(), target, now, DELAY_RAMP_TAU_SEC);
                }
            }
        }
        let lane_panners = self.bands.iter().flat_map(|b| b.lanes.iter());
        for (lane, target) in lane_panners.zip(out.panners.lanes.iter()) {
            self.set_panner_position(&lane.panner, target.position, now);
        }

        ramp(&self.side_gains[0].gain(), m.side_left_gain, now, GAIN_RAMP_TAU_SEC);
        ramp(&self.side_gains[1].gain(), m.side_right_gain, now, GAIN_RAMP_TAU_SEC);
        for (panner, p) in self.side_panners.iter().zip(out.panners.accompaniment) {
            self.set_panner_position(panner, p, now);
        }

        ramp(&self.early_gain.gain(), m.early_gain, now, GAIN_RAMP_TAU_SEC);
        ramp(
            &self.early_highpass.frequency(),
            out.room.early_highpass_hz,
            now,
            FILTER_RAMP_TAU_SEC,
        );
        for (i, tap) in self.taps.iter().enumerate() {
            ramp(&tap.delay.delay_time(), out.room.tap_delays_sec[i], now, DELAY_RAMP_TAU_SEC);
            ramp(&tap.filter.frequency(), m.early_cutoff_hz, now, FILTER_RAMP_TAU_SEC);
            self.set_panner_position(&tap.panner, out.panners.early_taps[i], now);
        }

        ramp(&self.reverb_gain.gain(), m.reverb_gain, now, GAIN_RAMP_TAU_SEC);
        ramp(
            &self.reverb_highpass.frequency(),
            out.room.reverb_highpass_hz,
            now,
            FILTER_RAMP_TAU_SEC,
        );
        ramp(&self.pre_delay.delay_time(), out.room.pre_delay_sec, now, DELAY_RAMP_TAU_SEC);
        ramp(&self.reverb_tone.frequency(), m.reverb_tone_hz, now, FILTER_RAMP_TAU_SEC);
        ramp(&self.reverb_low_shelf.gain(), m.reverb_low_shelf_db, now, GAIN_RAMP_TAU_SEC);
        ramp(&self.reverb_presence.gain(), m.reverb_presence_db, now, GAIN_RAMP_TAU_SEC);

        self.set_listener(&out.listener, now);
    }

    /// Replace the convolution buffer with a freshly generated impulse.
    pub fn load_impulse(&self, spec: &ImpulseSpec) {
        let sr = self.ctx.sample_rate();
        let [mut left, mut right] = generate_impulse(sr, spec, IMPULSE_SEED);
        if left.is_empty() {
            return;
        }
        let ir = match self.ctx.create_buffer(2, left.len() as u32, sr) {
            Ok(b) => b,
            Err(e) => {
                log::error!("[audio] impulse buffer: {:?}", e);
                return;
            }
        };
        _ = ir.copy_to_channel(&mut left, 0);
        _ = ir.copy_to_channel(&mut right, 1);
        self.convolver.set_buffer(Some(&ir));
        log::debug!(
            "[audio] impulse {:.2}s decay {:.2}",
            spec.duration_sec,
            spec.decay
        );
    }
}
