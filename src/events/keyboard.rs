use super::controls::sync_inputs;
use super::shortcuts::{ignored_target, nudge_volume, shortcut_for_key, wants_prevent_default, Shortcut};
use crate::constants::VOLUME_STEP;
use crate::frame::App;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn handle_global_keydown(ev: &web::KeyboardEvent, app: &App) {
    if ev.ctrl_key() || ev.meta_key() || ev.alt_key() {
        return;
    }
    let typing = ev
        .target()
        .and_then(|t| t.dyn_into::<web::Element>().ok())
        .map(|el| ignored_target(&el.tag_name()))
        .unwrap_or(false);
    if typing {
        return;
    }
    let Some(shortcut) = shortcut_for_key(&ev.key()) else {
        return;
    };
    if wants_prevent_default(shortcut) {
        ev.prevent_default();
    }
    let now = app.now_sec();
    {
        let mut eng = app.engine.borrow_mut();
        match shortcut {
            Shortcut::CyclePreset(step) => {
                let id = eng.cycle_preset(step, now);
                log::info!("[keys] preset -> {id}");
            }
            Shortcut::ToggleBypass => {
                let on = eng.toggle_bypass();
                log::info!("[keys] bypass={on}");
            }
            Shortcut::ToggleMotion => {
                let on = !eng.controls().motion_enabled;
                eng.set_motion_enabled(on);
            }
            Shortcut::ToggleVisualizer => {
                let on = !eng.controls().visualizer_enabled;
                eng.set_visualizer_enabled(on);
            }
            Shortcut::Volume(steps) => {
                let v = nudge_volume(eng.controls().volume, steps, VOLUME_STEP);
                eng.set_volume(v);
            }
        }
    }
    sync_inputs(app);
    app.wake();
}

pub fn wire_global_keydown(app: App) {
    let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        handle_global_keydown(&ev, &app);
    }) as Box<dyn FnMut(_)>);
    if let Some(w) = web::window() {
        _ = w.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
