use eye_core::SceneState;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn is_hotspot_toggle_key(key: &str) -> bool {
    key == "h" || key == "H"
}

// Wire an 'H' key handler to toggle the hotspot's debug visibility
pub fn wire_hotspot_toggle_h(state: Rc<RefCell<SceneState>>) {
    if let Some(window) = web::window() {
        let closure =
            wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
                if is_hotspot_toggle_key(&ev.key()) {
                    state.borrow_mut().toggle_hotspot_visible();
                    ev.prevent_default();
                }
            }) as Box<dyn FnMut(_)>);
        let _ =
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}
