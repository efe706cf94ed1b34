use crate::dom::{event_canvas_px, Listeners};
use pano_core::{PanoramaViewer, PointerSample};
use std::cell::RefCell;
use std::rc::Rc;
use web_sys as web;

fn sample(ev: &web::PointerEvent, canvas: &web::HtmlCanvasElement) -> PointerSample {
    let p = event_canvas_px(ev, canvas);
    PointerSample::new(ev.pointer_id(), p.x, p.y, instant::now())
}

/// Pointer down/move/up/cancel and wheel on the canvas.
pub fn wire_pointer_handlers(
    listeners: &mut Listeners,
    canvas: &web::HtmlCanvasElement,
    viewer: &Rc<RefCell<PanoramaViewer>>,
) {
    let target: &web::EventTarget = canvas.as_ref();

    {
        let viewer = viewer.clone();
        let canvas_c = canvas.clone();
        listeners.add(target, "pointerdown", move |ev: web::PointerEvent| {
            let _ = canvas_c.set_pointer_capture(ev.pointer_id());
            viewer.borrow_mut().pointer_down(sample(&ev, &canvas_c));
            ev.prevent_default();
        });
    }
    {
        let viewer = viewer.clone();
        let canvas_c = canvas.clone();
        listeners.add(target, "pointermove", move |ev: web::PointerEvent| {
            viewer.borrow_mut().pointer_move(sample(&ev, &canvas_c));
        });
    }
    {
        let viewer = viewer.clone();
        let canvas_c = canvas.clone();
        listeners.add(target, "pointerup", move |ev: web::PointerEvent| {
            let _ = canvas_c.release_pointer_capture(ev.pointer_id());
            viewer.borrow_mut().pointer_up(sample(&ev, &canvas_c));
        });
    }
    {
        let viewer = viewer.clone();
        listeners.add(target, "pointercancel", move |ev: web::PointerEvent| {
            viewer.borrow_mut().pointer_cancel(ev.pointer_id());
        });
    }
    {
        let viewer = viewer.clone();
        listeners.add(target, "wheel", move |ev: web::WheelEvent| {
            // Line and page modes report small counts; bring them to pixels.
            let scale = match ev.delta_mode() {
                web::WheelEvent::DOM_DELTA_LINE => 16.0,
                web::WheelEvent::DOM_DELTA_PAGE => 400.0,
                _ => 1.0,
            };
            viewer.borrow_mut().wheel((ev.delta_y() * scale) as f32);
            ev.prevent_default();
        });
    }
}
