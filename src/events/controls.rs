use crate::constants::*;
use crate::dom;
use crate::frame::App;
use soundstage_core::{ApplyMode, Controls, SpatialEngine};
use std::cell::RefCell;
use std::rc::Rc;
use web_sys as web;

/// Push the engine's current controls, preset and bypass state back into the
/// page widgets.
pub fn sync_inputs(app: &App) {
    let (c, preset_id, bypass): (Controls, &'static str, bool) = {
        let e = app.engine.borrow();
        (*e.controls(), e.preset_id(), e.bypass())
    };
    let doc = &app.document;
    dom::set_input_value(doc, VOLUME_INPUT_ID, c.volume);
    dom::set_input_value(doc, DEPTH_INPUT_ID, c.depth);
    dom::set_input_value(doc, FOCUS_INPUT_ID, c.focus);
    dom::set_input_value(doc, EARLY_MIX_INPUT_ID, c.early_mix);
    dom::set_input_value(doc, REVERB_LENGTH_INPUT_ID, c.reverb_length);
    dom::set_input_value(doc, REVERB_TONE_INPUT_ID, c.reverb_tone);
    dom::set_input_value(doc, MOTION_INTENSITY_INPUT_ID, c.motion_intensity);
    dom::set_input_value(doc, EQ_BASS_INPUT_ID, c.eq.bass_db);
    dom::set_input_value(doc, EQ_MID_INPUT_ID, c.eq.mid_db);
    dom::set_input_value(doc, EQ_TREBLE_INPUT_ID, c.eq.treble_db);
    dom::set_checked(doc, MOTION_TOGGLE_ID, c.motion_enabled);
    dom::set_checked(doc, VISUALIZER_TOGGLE_ID, c.visualizer_enabled);
    dom::toggle_class(doc, BYPASS_BUTTON_ID, BYPASS_ACTIVE_CLASS, bypass);
    for (el, id) in dom::elements_with_attr(doc, PRESET_ATTR) {
        _ = el
            .class_list()
            .toggle_with_force(PRESET_ACTIVE_CLASS, id == preset_id);
    }
}

/// Wire a range input to an engine setter. Every change wakes the loop so
/// the new targets reach the graph even when nothing else is animating.
fn wire_range(app: &App, id: &str, set: fn(&mut SpatialEngine, f32)) {
    let app_in = app.clone();
    dom::on_range_input(&app.document, id, move |v| {
        set(&mut app_in.engine.borrow_mut(), v);
        app_in.wake();
    });
}

fn wire_eq(app: &App, id: &str, band: usize) {
    let app_in = app.clone();
    dom::on_range_input(&app.document, id, move |v| {
        let mut eng = app_in.engine.borrow_mut();
        let eq = eng.controls().eq;
        let mut db = [eq.bass_db, eq.mid_db, eq.treble_db];
        db[band] = v;
        eng.set_eq(db[0], db[1], db[2]);
        drop(eng);
        app_in.wake();
    });
}

fn wire_presets(app: &App) {
    for (el, id) in dom::elements_with_attr(&app.document, PRESET_ATTR) {
        let app_click = app.clone();
        dom::on_event(&el, "click", move || {
            let now = app_click.now_sec();
            app_click
                .engine
                .borrow_mut()
                .apply_preset(&id, now, ApplyMode::default());
            sync_inputs(&app_click);
            app_click.wake();
        });
    }
}

fn wire_buttons(app: &App) {
    let app_bypass = app.clone();
    dom::add_click_listener(&app.document, BYPASS_BUTTON_ID, move || {
        app_bypass.engine.borrow_mut().toggle_bypass();
        sync_inputs(&app_bypass);
        app_bypass.wake();
    });

    let app_reset = app.clone();
    dom::add_click_listener(&app.document, RESET_BUTTON_ID, move || {
        app_reset.engine.borrow_mut().reset_settings();
        log::info!("[settings] reset to defaults");
        sync_inputs(&app_reset);
        app_reset.wake();
    });
}

/// Local files play through an object URL; the previous one is released
/// when a new file replaces it.
fn wire_file_input(app: &App) {
    let Some(input) = dom::input_element(&app.document, FILE_INPUT_ID) else {
        log::warn!("[dom] missing #{FILE_INPUT_ID}");
        return;
    };
    let current_url: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
    let source = input.clone();
    let app_file = app.clone();
    dom::on_event(&input, "change", move || {
        let Some(file) = source.files().and_then(|list| list.get(0)) else {
            return;
        };
        let url = match web::Url::create_object_url_with_blob(&file) {
            Ok(u) => u,
            Err(e) => {
                log::error!("[media] object URL failed: {:?}", e);
                return;
            }
        };
        if let Some(old) = current_url.borrow_mut().replace(url.clone()) {
            _ = web::Url::revoke_object_url(&old);
        }
        log::info!("[media] loading {}", file.name());
        app_file.media.set_src(&url);
        app_file.ensure_graph();
        _ = app_file.media.play();
    });
}

fn wire_media(app: &App) {
    let app_play = app.clone();
    dom::on_event(&app.media, "play", move || app_play.ensure_graph());

    // A new source (including one set by the page itself) starts tempo and
    // adaptive tracking from scratch.
    let app_load = app.clone();
    dom::on_event(&app.media, "loadedmetadata", move || {
        app_load.engine.borrow_mut().on_track_loaded();
    });

    let app_pause = app.clone();
    dom::on_event(&app.media, "pause", move || app_pause.wake());
}

pub fn wire_controls(app: &App) {
    wire_range(app, VOLUME_INPUT_ID, SpatialEngine::set_volume);
    wire_range(app, DEPTH_INPUT_ID, SpatialEngine::set_depth);
    wire_range(app, FOCUS_INPUT_ID, SpatialEngine::set_focus);
    wire_range(app, EARLY_MIX_INPUT_ID, SpatialEngine::set_early_mix);
    wire_range(app, REVERB_LENGTH_INPUT_ID, SpatialEngine::set_reverb_length);
    wire_range(app, REVERB_TONE_INPUT_ID, SpatialEngine::set_reverb_tone);
    wire_range(app, MOTION_INTENSITY_INPUT_ID, SpatialEngine::set_motion_intensity);
    wire_eq(app, EQ_BASS_INPUT_ID, 0);
    wire_eq(app, EQ_MID_INPUT_ID, 1);
    wire_eq(app, EQ_TREBLE_INPUT_ID, 2);

    let app_motion = app.clone();
    dom::on_checkbox_change(&app.document, MOTION_TOGGLE_ID, move |on| {
        app_motion.engine.borrow_mut().set_motion_enabled(on);
        app_motion.wake();
    });
    let app_vis = app.clone();
    dom::on_checkbox_change(&app.document, VISUALIZER_TOGGLE_ID, move |on| {
        app_vis.engine.borrow_mut().set_visualizer_enabled(on);
        app_vis.wake();
    });

    wire_presets(app);
    wire_buttons(app);
    wire_file_input(app);
    wire_media(app);
}
