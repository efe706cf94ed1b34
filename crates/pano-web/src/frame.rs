use crate::dom::{dispatch_custom_event, js_object, sync_canvas_backing_size};
use pano_core::{GestureEvent, Orientation, PanoramaViewer, QualitySettings, RenderTarget};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

/// Latest view published by the controller. Events are dispatched after the
/// viewer borrow is released so page listeners may call back into it.
#[derive(Clone, Default)]
pub struct ViewSlot(Rc<Cell<Option<Orientation>>>);

impl RenderTarget for ViewSlot {
    fn set_view(&mut self, view: &Orientation) {
        self.0.set(Some(*view));
    }
}

#[derive(Clone, Default)]
pub struct QualitySlot(Rc<Cell<Option<QualitySettings>>>);

impl QualitySlot {
    pub fn publish(&self, settings: QualitySettings) {
        self.0.set(Some(settings));
    }
}

pub struct FrameContext {
    pub viewer: Rc<RefCell<PanoramaViewer>>,
    pub canvas: web::HtmlCanvasElement,
    pub view: ViewSlot,
    pub quality: QualitySlot,
    pub gestures: Vec<GestureEvent>,
    pub last_view: Option<Orientation>,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = instant::now();
        self.gestures.clear();
        self.viewer.borrow_mut().frame(now, &mut self.gestures);

        let target: &web::EventTarget = self.canvas.as_ref();
        for g in &self.gestures {
            let p = g.position();
            let mut fields = vec![
                ("type", JsValue::from_str(g.name())),
                ("x", JsValue::from_f64(p.x as f64)),
                ("y", JsValue::from_f64(p.y as f64)),
            ];
            match *g {
                GestureEvent::Swipe { delta, .. } => {
                    fields.push(("dx", JsValue::from_f64(delta.x as f64)));
                    fields.push(("dy", JsValue::from_f64(delta.y as f64)));
                }
                GestureEvent::PinchRotate {
                    rotation_deg,
                    scale,
                    ..
                } => {
                    fields.push(("rotation", JsValue::from_f64(rotation_deg as f64)));
                    fields.push(("scale", JsValue::from_f64(scale as f64)));
                }
                _ => {}
            }
            dispatch_custom_event(target, "pano-gesture", &js_object(&fields));
        }

        if let Some(view) = self.view.0.take() {
            if self.last_view != Some(view) {
                self.last_view = Some(view);
                let detail = js_object(&[
                    ("yaw", JsValue::from_f64(view.yaw as f64)),
                    ("pitch", JsValue::from_f64(view.pitch as f64)),
                    ("fov", JsValue::from_f64(view.fov as f64)),
                ]);
                dispatch_custom_event(target, "pano-view", &detail);
            }
        }

        if let Some(q) = self.quality.0.take() {
            sync_canvas_backing_size(&self.canvas, q.effective_scale());
            let detail = js_object(&[
                ("pixelRatio", JsValue::from_f64(q.pixel_ratio as f64)),
                ("renderScale", JsValue::from_f64(q.render_scale as f64)),
                ("antialiasing", JsValue::from_bool(q.antialiasing)),
                ("textureQuality", JsValue::from_f64(q.texture_quality as f64)),
            ]);
            dispatch_custom_event(target, "pano-quality", &detail);
        }
    }
}

/// Handle to a running `requestAnimationFrame` loop.
pub struct FrameLoop {
    tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
    request_id: Rc<Cell<Option<i32>>>,
    running: Rc<Cell<bool>>,
    in_tick: Rc<Cell<bool>>,
}

impl FrameLoop {
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Cancels the pending frame. The tick closure is dropped here unless the
    /// call comes from inside the tick itself, which then drops it on exit.
    pub fn stop(&self) {
        self.running.set(false);
        if let (Some(id), Some(w)) = (self.request_id.take(), web::window()) {
            let _ = w.cancel_animation_frame(id);
        }
        if !self.in_tick.get() {
            self.tick.borrow_mut().take();
        }
    }
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) -> Option<i32> {
    let w = web::window()?;
    let tick = tick.borrow();
    let closure = tick.as_ref()?;
    match w.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(id) => Some(id),
        Err(e) => {
            log::error!("[view] requestAnimationFrame failed: {:?}", e);
            None
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) -> FrameLoop {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let request_id = Rc::new(Cell::new(None));
    let running = Rc::new(Cell::new(true));
    let in_tick = Rc::new(Cell::new(false));

    let tick_clone = tick.clone();
    let request_id_tick = request_id.clone();
    let running_tick = running.clone();
    let in_tick_tick = in_tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if !running_tick.get() {
            return;
        }
        in_tick_tick.set(true);
        frame_ctx.borrow_mut().frame();
        in_tick_tick.set(false);
        if running_tick.get() {
            request_id_tick.set(request_frame(&tick_clone));
        } else {
            // Stopped from a page listener during this frame; break the cycle
            // on the next turn of the event loop.
            let tick_drop = tick_clone.clone();
            wasm_bindgen_futures::spawn_local(async move {
                tick_drop.borrow_mut().take();
            });
        }
    }) as Box<dyn FnMut()>));
    request_id.set(request_frame(&tick));
    FrameLoop {
        tick,
        request_id,
        running,
        in_tick,
    }
}
