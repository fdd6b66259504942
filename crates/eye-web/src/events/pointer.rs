use eye_core::SceneState;
use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
fn client_pos(ev: &web::PointerEvent) -> Vec2 {
    Vec2::new(ev.client_x() as f32, ev.client_y() as f32)
}

/// Pointer move/down/leave on the whole document, like the page-wide
/// listeners of the scene: the eye follows the pointer anywhere in the window.
pub fn wire_pointer_handlers(document: &web::Document, state: Rc<RefCell<SceneState>>) {
    wire_pointermove(document, state.clone());
    wire_pointerdown(document, state.clone());
    wire_pointerout(document, state);
}

fn wire_pointermove(document: &web::Document, state: Rc<RefCell<SceneState>>) {
    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        state.borrow_mut().on_pointer_move(client_pos(&ev));
    }) as Box<dyn FnMut(_)>);
    _ = document.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointerdown(document: &web::Document, state: Rc<RefCell<SceneState>>) {
    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        if state.borrow_mut().on_pointer_down(client_pos(&ev)) {
            log::debug!("[input] hotspot clicked");
        }
    }) as Box<dyn FnMut(_)>);
    _ = document.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointerout(document: &web::Document, state: Rc<RefCell<SceneState>>) {
    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        // No related target means the pointer left the window itself.
        if ev.related_target().is_none() {
            state.borrow_mut().on_pointer_leave();
        }
    }) as Box<dyn FnMut(_)>);
    _ = document.add_event_listener_with_callback("pointerout", closure.as_ref().unchecked_ref());
    closure.forget();
}
