#![cfg(target_arch = "wasm32")]
use soundstage_core::SpatialEngine;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod audio;
mod constants;
mod dom;
mod events;
mod frame;
mod hud;
mod storage;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("soundstage starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

fn build_engine() -> SpatialEngine {
    let mut engine = SpatialEngine::new(rand::random::<u64>());
    match storage::load_settings() {
        Some(json) => engine.restore_settings(&json),
        None => log::info!("[settings] no stored settings; using defaults"),
    }
    engine
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let media: web::HtmlMediaElement = document
        .get_element_by_id(constants::MEDIA_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", constants::MEDIA_ID))?
        .dyn_into::<web::HtmlMediaElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    let app = frame::App::new(build_engine(), media, document);
    events::controls::sync_inputs(&app);
    events::controls::wire_controls(&app);
    events::keyboard::wire_global_keydown(app.clone());

    // The graph itself waits for the first play; the loop can already drive
    // the HUD and any preset animation.
    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext::new(app)));
    frame::start_loop(frame_ctx);
    Ok(())
}
