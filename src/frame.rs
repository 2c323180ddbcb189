use crate::audio::SpatialGraph;
use crate::{hud, storage};
use instant::Instant;
use soundstage_core::{FrameInput, SpatialEngine};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type TickClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Handles shared by the frame loop and every event listener.
#[derive(Clone)]
pub struct App {
    pub engine: Rc<RefCell<SpatialEngine>>,
    pub graph: Rc<RefCell<Option<SpatialGraph>>>,
    pub media: web::HtmlMediaElement,
    pub document: web::Document,
    clock: Instant,
    running: Rc<Cell<bool>>,
    tick: TickClosure,
}

impl App {
    pub fn new(engine: SpatialEngine, media: web::HtmlMediaElement, document: web::Document) -> Self {
        Self {
            engine: Rc::new(RefCell::new(engine)),
            graph: Rc::new(RefCell::new(None)),
            media,
            document,
            clock: Instant::now(),
            running: Rc::new(Cell::new(false)),
            tick: Rc::new(RefCell::new(None)),
        }
    }

    #[inline]
    pub fn now_sec(&self) -> f64 {
        self.clock.elapsed().as_secs_f64()
    }

    /// Browsers only allow an AudioContext to start after a user gesture, so
    /// the graph is built on first play.
    pub fn ensure_graph(&self) {
        if let Some(g) = self.graph.borrow().as_ref() {
            g.resume();
            return;
        }
        let (volume, spec) = {
            let mut e = self.engine.borrow_mut();
            (e.controls().volume, e.sync_impulse())
        };
        match SpatialGraph::build(&self.media, volume) {
            Ok(g) => {
                g.load_impulse(&spec);
                g.resume();
                *self.graph.borrow_mut() = Some(g);
            }
            Err(e) => log::error!("[audio] graph build failed: {:?}", e),
        }
        self.wake();
    }

    pub fn persist(&self) {
        let json = self.engine.borrow().settings_snapshot().to_json();
        storage::save_settings(&json);
    }

    /// Run at least one frame, then keep going while the engine asks for it.
    pub fn wake(&self) {
        if self.running.replace(true) {
            return;
        }
        if let (Some(w), Some(cb)) = (web::window(), self.tick.borrow().as_ref()) {
            _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        } else {
            self.running.set(false);
        }
    }
}

pub struct FrameContext {
    pub app: App,
    spectrum: Vec<u8>,
    waveform: Vec<u8>,
}

impl FrameContext {
    pub fn new(app: App) -> Self {
        Self {
            app,
            spectrum: Vec::new(),
            waveform: Vec::new(),
        }
    }

    fn read_analyser(&mut self, graph: Option<&SpatialGraph>) {
        match graph {
            Some(g) => {
                let bins = g.analyser.frequency_bin_count() as usize;
                let size = g.analyser.fft_size() as usize;
                self.spectrum.resize(bins, 0);
                self.waveform.resize(size, 128);
                g.analyser.get_byte_frequency_data(&mut self.spectrum);
                g.analyser.get_byte_time_domain_data(&mut self.waveform);
            }
            None => {
                self.spectrum.clear();
                self.waveform.clear();
            }
        }
    }

    /// One display frame. Returns whether the loop should keep running.
    pub fn frame(&mut self) -> bool {
        let app = self.app.clone();
        let graph = app.graph.borrow();
        self.read_analyser(graph.as_ref());

        let input = FrameInput {
            now_sec: app.now_sec(),
            playback_time_sec: app.media.current_time(),
            spectrum: &self.spectrum,
            waveform: &self.waveform,
            paused: app.media.paused(),
        };
        let (out, preset, bypass, visualizer, keep_running) = {
            let mut engine = app.engine.borrow_mut();
            let out = engine.tick(&input);
            let preset = engine.catalog().resolve(engine.preset_id()).clone();
            (
                out,
                preset,
                engine.bypass(),
                engine.controls().visualizer_enabled,
                engine.should_run_loop(),
            )
        };

        if let Some(g) = graph.as_ref() {
            g.apply(&out);
            if let Some(spec) = &out.impulse {
                g.load_impulse(spec);
            }
        }
        if out.persist_requested {
            app.persist();
        }
        hud::update(&app.document, &out, &preset, bypass, visualizer);
        keep_running
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let app = frame_ctx.borrow().app.clone();
    let tick = app.tick.clone();
    let tick_clone = tick.clone();
    let running = app.running.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let keep_running = frame_ctx.borrow_mut().frame();
        if !keep_running {
            running.set(false);
            return;
        }
        if let (Some(w), Some(cb)) = (web::window(), tick_clone.borrow().as_ref()) {
            _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));
    app.wake();
}
