#![cfg(target_arch = "wasm32")]
use eye_core::{SceneState, Viewport, ASSET_URL};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod dom;
mod events;
mod frame;
mod loader;

fn wire_resize(canvas: &web::HtmlCanvasElement, state: Rc<RefCell<SceneState>>) {
    dom::sync_canvas_backing_size(canvas);
    let canvas_resize = canvas.clone();
    let resize_closure = Closure::wrap(Box::new(move || {
        dom::sync_canvas_backing_size(&canvas_resize);
        let (w, h) = dom::viewport_css_size();
        state.borrow_mut().on_resize(w, h);
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
    }
    resize_closure.forget();
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("eye-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas = dom::find_canvas(&document, "canvas.webgl")?;

    let (w, h) = dom::viewport_css_size();
    let state = Rc::new(RefCell::new(SceneState::new(Viewport::new(w, h))));

    wire_resize(&canvas, state.clone());
    events::wire_pointer_handlers(&document, state.clone());
    events::wire_hotspot_toggle_h(state.clone());

    // The model arrives whenever it arrives; the frame loop does not wait for it.
    let state_for_load = state.clone();
    spawn_local(async move {
        let result = loader::load_model(ASSET_URL).await;
        state_for_load.borrow_mut().on_asset_loaded(result);
    });

    let gpu = frame::init_gpu(&canvas).await;
    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        state,
        canvas,
        gpu,
        last_instant: Instant::now(),
    }));
    frame::start_loop(frame_ctx);
    Ok(())
}
