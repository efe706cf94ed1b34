use crate::dom::Listeners;
use pano_core::{DeviceReading, PanoramaViewer, PermissionOutcome};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// Current screen rotation in degrees, 0 when the browser does not say.
fn screen_angle(window: &web::Window) -> f32 {
    window
        .screen()
        .ok()
        .and_then(|s| s.orientation().angle().ok())
        .map(|a| a as f32)
        .unwrap_or(0.0)
}

/// Feeds `deviceorientation` readings to the viewer. Readings are dropped by
/// the core until device orientation has been enabled.
pub fn wire_device_orientation(
    listeners: &mut Listeners,
    window: &web::Window,
    viewer: &Rc<RefCell<PanoramaViewer>>,
) {
    let target: &web::EventTarget = window.as_ref();
    let viewer = viewer.clone();
    let window_c = window.clone();
    listeners.add(target, "deviceorientation", move |ev: web::DeviceOrientationEvent| {
        let (Some(alpha), Some(beta), Some(gamma)) = (ev.alpha(), ev.beta(), ev.gamma()) else {
            return;
        };
        let reading = DeviceReading::new(
            alpha as f32,
            beta as f32,
            gamma as f32,
            screen_angle(&window_c),
        );
        viewer.borrow_mut().device_orientation(reading);
    });
}

/// Asks for sensor access where the platform gates it behind
/// `DeviceOrientationEvent.requestPermission()`; elsewhere the presence of
/// the event type is enough.
pub async fn request_orientation_permission(window: &web::Window) -> PermissionOutcome {
    let ctor = match js_sys::Reflect::get(window, &JsValue::from_str("DeviceOrientationEvent")) {
        Ok(c) if !c.is_undefined() && !c.is_null() => c,
        _ => return PermissionOutcome::Unavailable,
    };
    let request = js_sys::Reflect::get(&ctor, &JsValue::from_str("requestPermission"))
        .ok()
        .and_then(|f| f.dyn_into::<js_sys::Function>().ok());
    let Some(request) = request else {
        return PermissionOutcome::Granted;
    };

    let promise = match request.call0(&ctor) {
        Ok(p) => js_sys::Promise::resolve(&p),
        Err(e) => {
            log::warn!("[gyro] requestPermission threw: {:?}", e);
            return PermissionOutcome::Denied;
        }
    };
    match JsFuture::from(promise).await {
        Ok(state) if state.as_string().as_deref() == Some("granted") => PermissionOutcome::Granted,
        Ok(state) => {
            log::info!("[gyro] permission {:?}", state.as_string());
            PermissionOutcome::Denied
        }
        Err(e) => {
            log::warn!("[gyro] permission request failed: {:?}", e);
            PermissionOutcome::Denied
        }
    }
}
