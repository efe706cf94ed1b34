use pano_core::{QualityPreset, ViewLimits, ViewerConfig};
use std::str::FromStr;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

/// Sizes the canvas backing store to CSS size x `scale` (pixel ratio times
/// render scale).
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement, scale: f32) {
    let rect = canvas.get_bounding_client_rect();
    let scale = scale.max(0.1) as f64;
    let w_px = (rect.width() * scale) as u32;
    let h_px = (rect.height() * scale) as u32;
    if canvas.width() != w_px.max(1) {
        canvas.set_width(w_px.max(1));
    }
    if canvas.height() != h_px.max(1) {
        canvas.set_height(h_px.max(1));
    }
}

/// Canvas-relative CSS pixel position of a mouse or pointer event.
#[inline]
pub fn event_canvas_px(ev: &web::MouseEvent, canvas: &web::HtmlCanvasElement) -> glam::Vec2 {
    let rect = canvas.get_bounding_client_rect();
    glam::Vec2::new(
        ev.client_x() as f32 - rect.left() as f32,
        ev.client_y() as f32 - rect.top() as f32,
    )
}

/// Dispatches a `CustomEvent` carrying `detail` on `target`.
pub fn dispatch_custom_event(target: &web::EventTarget, name: &str, detail: &JsValue) {
    let init = web::CustomEventInit::new();
    init.set_detail(detail);
    match web::CustomEvent::new_with_event_init_dict(name, &init) {
        Ok(ev) => {
            if let Err(e) = target.dispatch_event(&ev) {
                log::error!("[view] dispatch {} failed: {:?}", name, e);
            }
        }
        Err(e) => log::error!("[view] could not create {}: {:?}", name, e),
    }
}

/// Builds a plain JS object from key/value pairs.
pub fn js_object(fields: &[(&str, JsValue)]) -> JsValue {
    let obj = js_sys::Object::new();
    for (key, value) in fields {
        let _ = js_sys::Reflect::set(&obj, &JsValue::from_str(key), value);
    }
    obj.into()
}

/// Every DOM listener added for one mounted viewer, so they can all be
/// removed again on dispose.
#[derive(Default)]
pub struct Listeners {
    entries: Vec<(web::EventTarget, &'static str, Closure<dyn FnMut(web::Event)>)>,
}

impl Listeners {
    pub fn add<E, F>(&mut self, target: &web::EventTarget, kind: &'static str, mut handler: F)
    where
        E: JsCast + 'static,
        F: FnMut(E) + 'static,
    {
        let closure = Closure::wrap(Box::new(move |ev: web::Event| {
            if let Ok(ev) = ev.dyn_into::<E>() {
                handler(ev);
            }
        }) as Box<dyn FnMut(web::Event)>);
        if let Err(e) = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
        {
            log::error!("[view] addEventListener({}) failed: {:?}", kind, e);
            return;
        }
        self.entries.push((target.clone(), kind, closure));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn remove_all(&mut self) {
        for (target, kind, closure) in self.entries.drain(..) {
            let _ = target.remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        }
    }
}

fn parse_attr<T: FromStr>(el: &web::Element, name: &str) -> Option<T> {
    let raw = el.get_attribute(name)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("[view] ignoring {}={:?}", name, raw);
            None
        }
    }
}

fn parse_degrees(el: &web::Element, name: &str) -> Option<f32> {
    parse_attr::<f32>(el, name)
        .filter(|v| v.is_finite())
        .map(f32::to_radians)
}

/// Viewer configuration with overrides from the canvas `data-*` attributes.
/// Angles in attributes are degrees.
pub fn viewer_config_from_attributes(canvas: &web::HtmlCanvasElement) -> ViewerConfig {
    let el: &web::Element = canvas.as_ref();
    let mut config = ViewerConfig::default();

    if let Some(preset) = parse_attr::<QualityPreset>(el, "data-preset") {
        config.preset = preset;
    }
    if let Some(fps) = parse_attr::<f32>(el, "data-target-fps").filter(|f| *f > 0.0) {
        config.governor.target_fps = fps;
    }
    if let Some(fov) = parse_attr::<f32>(el, "data-fov").filter(|f| f.is_finite()) {
        config.controller.initial.fov = fov;
    }
    if let Some(on) = el.get_attribute("data-auto-rotate") {
        config.controller.auto_rotate = !matches!(on.trim(), "false" | "0" | "off");
    }

    let limits = ViewLimits {
        min_yaw: parse_degrees(el, "data-min-yaw"),
        max_yaw: parse_degrees(el, "data-max-yaw"),
        min_pitch: parse_degrees(el, "data-min-pitch"),
        max_pitch: parse_degrees(el, "data-max-pitch"),
    };
    if limits != ViewLimits::default() {
        config.limits = Some(limits);
    }
    config
}
