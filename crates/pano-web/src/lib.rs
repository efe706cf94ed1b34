#![cfg(target_arch = "wasm32")]
use pano_core::{PanoramaViewer, QualitySettings, ViewCommand, ViewLimits};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

mod dom;
mod events;
mod frame;

use frame::{FrameContext, FrameLoop, QualitySlot, ViewSlot};

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("pano-web starting");
    Ok(())
}

/// Attaches a viewer to the canvas with the given id and starts its frame
/// loop. Configuration is read from the canvas `data-*` attributes.
#[wasm_bindgen]
pub fn mount(canvas_id: &str) -> Result<ViewerHandle, JsValue> {
    init(canvas_id).map_err(|e| {
        log::error!("[view] mount failed: {:?}", e);
        JsValue::from_str(&e.to_string())
    })
}

fn init(canvas_id: &str) -> anyhow::Result<ViewerHandle> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", canvas_id))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("#{} is not a canvas: {:?}", canvas_id, e)))?;

    let config = dom::viewer_config_from_attributes(&canvas);
    log::info!(
        "[view] mounting #{} preset={} target_fps={}",
        canvas_id,
        config.preset,
        config.governor.target_fps
    );

    let view = ViewSlot::default();
    let quality = QualitySlot::default();
    let mut viewer = PanoramaViewer::new(config);
    viewer
        .governor_mut()
        .set_max_pixel_ratio(window.device_pixel_ratio() as f32);
    viewer.set_render_target(Box::new(view.clone()));
    {
        let quality = quality.clone();
        viewer.set_quality_callback(Box::new(move |s: QualitySettings| quality.publish(s)));
    }
    dom::sync_canvas_backing_size(&canvas, viewer.quality().effective_scale());
    quality.publish(viewer.quality());
    let viewer = Rc::new(RefCell::new(viewer));

    let mut listeners = dom::Listeners::default();
    events::wire_pointer_handlers(&mut listeners, &canvas, &viewer);
    events::wire_keyboard(&mut listeners, &window, &viewer);
    events::wire_device_orientation(&mut listeners, &window, &viewer);
    {
        let viewer = viewer.clone();
        let canvas_resize = canvas.clone();
        listeners.add(&window, "resize", move |_: web::Event| {
            let scale = viewer.borrow().quality().effective_scale();
            dom::sync_canvas_backing_size(&canvas_resize, scale);
        });
    }
    log::info!("[view] {} listeners attached", listeners.len());

    let frame_ctx = Rc::new(RefCell::new(FrameContext {
        viewer: viewer.clone(),
        canvas: canvas.clone(),
        view,
        quality,
        gestures: Vec::new(),
        last_view: None,
    }));
    let frame_loop = frame::start_loop(frame_ctx);

    Ok(ViewerHandle {
        viewer,
        window,
        listeners,
        frame_loop,
    })
}

/// JavaScript-facing handle for one mounted viewer. Angles are radians,
/// field of view is degrees.
#[wasm_bindgen]
pub struct ViewerHandle {
    viewer: Rc<RefCell<PanoramaViewer>>,
    window: web::Window,
    listeners: dom::Listeners,
    frame_loop: FrameLoop,
}

#[wasm_bindgen]
impl ViewerHandle {
    /// Returns `false` for an unknown preset name.
    #[wasm_bindgen(js_name = setPreset)]
    pub fn set_preset(&self, name: &str) -> bool {
        match self.viewer.borrow_mut().set_preset_by_name(name) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("[quality] {}", e);
                false
            }
        }
    }

    #[wasm_bindgen(js_name = setTargetFps)]
    pub fn set_target_fps(&self, fps: f32) {
        self.viewer.borrow_mut().governor_mut().set_target_fps(fps);
    }

    #[wasm_bindgen(js_name = setAdaptiveQuality)]
    pub fn set_adaptive_quality(&self, enabled: bool) {
        self.viewer.borrow_mut().governor_mut().set_enabled(enabled);
    }

    /// Any bound left out is unconstrained (pitch falls back to +-pi/2).
    #[wasm_bindgen(js_name = setViewLimits)]
    pub fn set_view_limits(
        &self,
        min_pitch: Option<f32>,
        max_pitch: Option<f32>,
        min_yaw: Option<f32>,
        max_yaw: Option<f32>,
    ) {
        let limits = ViewLimits {
            min_yaw,
            max_yaw,
            min_pitch,
            max_pitch,
        };
        let limits = (limits != ViewLimits::default()).then_some(limits);
        self.viewer.borrow_mut().set_view_limits(limits);
    }

    #[wasm_bindgen(js_name = setEnabled)]
    pub fn set_enabled(&self, enabled: bool) {
        self.viewer.borrow_mut().set_enabled(enabled);
    }

    #[wasm_bindgen(js_name = setAutoRotate)]
    pub fn set_auto_rotate(&self, enabled: bool) {
        self.viewer
            .borrow_mut()
            .controller_mut()
            .set_auto_rotate(enabled);
    }

    #[wasm_bindgen(js_name = lookAt)]
    pub fn look_at(&self, yaw: f32, pitch: f32) {
        self.viewer
            .borrow_mut()
            .controller_mut()
            .push(ViewCommand::LookAt { yaw, pitch });
    }

    #[wasm_bindgen(js_name = setFov)]
    pub fn set_fov(&self, fov: f32) {
        self.viewer
            .borrow_mut()
            .controller_mut()
            .push(ViewCommand::SetFov(fov));
    }

    #[wasm_bindgen(js_name = resetView)]
    pub fn reset_view(&self) {
        self.viewer
            .borrow_mut()
            .controller_mut()
            .push(ViewCommand::Reset);
    }

    pub fn yaw(&self) -> f32 {
        self.viewer.borrow().orientation().yaw
    }

    pub fn pitch(&self) -> f32 {
        self.viewer.borrow().orientation().pitch
    }

    pub fn fov(&self) -> f32 {
        self.viewer.borrow().orientation().fov
    }

    pub fn fps(&self) -> Option<f32> {
        self.viewer.borrow().sampler().fps()
    }

    /// Must be called from a user gesture on platforms that gate sensor
    /// access. Resolves to `true` once readings drive the view.
    #[wasm_bindgen(js_name = enableGyro)]
    pub fn enable_gyro(&self) -> js_sys::Promise {
        let viewer = self.viewer.clone();
        let window = self.window.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            let outcome = events::request_orientation_permission(&window).await;
            let ok = viewer.borrow_mut().enable_device_orientation(outcome);
            Ok(JsValue::from_bool(ok))
        })
    }

    #[wasm_bindgen(js_name = disableGyro)]
    pub fn disable_gyro(&self) {
        self.viewer.borrow_mut().disable_device_orientation();
    }

    /// Removes every listener and stops the frame loop. Safe to call twice.
    pub fn dispose(&mut self) {
        if !self.frame_loop.is_running() && self.listeners.is_empty() {
            return;
        }
        self.frame_loop.stop();
        self.listeners.remove_all();
        self.viewer.borrow_mut().dispose();
        log::info!("[view] viewer unmounted");
    }
}

impl Drop for ViewerHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}
