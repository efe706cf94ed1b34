use crate::dom::Listeners;
use pano_core::PanoramaViewer;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

fn typing_in_form(ev: &web::KeyboardEvent) -> bool {
    ev.target()
        .and_then(|t| t.dyn_into::<web::Element>().ok())
        .is_some_and(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT"))
}

/// Arrow/WASD/zoom keys on the window; releasing focus drops every held key.
pub fn wire_keyboard(
    listeners: &mut Listeners,
    window: &web::Window,
    viewer: &Rc<RefCell<PanoramaViewer>>,
) {
    let target: &web::EventTarget = window.as_ref();
    {
        let viewer = viewer.clone();
        listeners.add(target, "keydown", move |ev: web::KeyboardEvent| {
            if ev.ctrl_key() || ev.meta_key() || ev.alt_key() || typing_in_form(&ev) {
                return;
            }
            if viewer.borrow_mut().key_down(&ev.key()) {
                ev.prevent_default();
            }
        });
    }
    {
        let viewer = viewer.clone();
        listeners.add(target, "keyup", move |ev: web::KeyboardEvent| {
            viewer.borrow_mut().key_up(&ev.key());
        });
    }
    {
        let viewer = viewer.clone();
        listeners.add(target, "blur", move |_: web::Event| {
            log::debug!("[keys] window blur; releasing held keys");
            viewer.borrow_mut().release_all_keys();
        });
    }
}
