//! Teachable Machine bindings and the browser vision loop
//!
//! `tmImage` is loaded by the page as a global script; everything here goes
//! through a handful of inline JS shims so the Rust side only sees opaque
//! handles and JSON.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, CustomEvent, CustomEventInit, Document, HtmlCanvasElement};

use super::classes::Prediction;
use super::poller::{VisionPoller, VisionReadout};
use crate::consts::{WEBCAM_HEIGHT, WEBCAM_WIDTH};
use crate::error::InitError;
use crate::platform::dom;
use crate::platform::frame_loop::FrameLoop;
use crate::tuning::VisionTuning;

#[wasm_bindgen(inline_js = "
    export async function tm_load(modelUrl, metadataUrl) {
        return await tmImage.load(modelUrl, metadataUrl);
    }

    export function tm_total_classes(model) {
        return model.getTotalClasses();
    }

    export async function tm_webcam(width, height, flip) {
        const webcam = new tmImage.Webcam(width, height, flip);
        await webcam.setup();
        await webcam.play();
        return webcam;
    }

    export function tm_update(webcam) {
        webcam.update();
    }

    export function tm_canvas(webcam) {
        return webcam.canvas;
    }

    export async function tm_predict(model, webcam) {
        const prediction = await model.predict(webcam.canvas);
        return JSON.stringify(prediction.map(p => ({
            className: p.className,
            probability: p.probability,
        })));
    }
")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn tm_load(model_url: &str, metadata_url: &str) -> Result<JsValue, JsValue>;
    fn tm_total_classes(model: &JsValue) -> u32;
    #[wasm_bindgen(catch)]
    async fn tm_webcam(width: u32, height: u32, flip: bool) -> Result<JsValue, JsValue>;
    fn tm_update(webcam: &JsValue);
    fn tm_canvas(webcam: &JsValue) -> JsValue;
    #[wasm_bindgen(catch)]
    async fn tm_predict(model: &JsValue, webcam: &JsValue) -> Result<JsValue, JsValue>;
}

/// Name of the DOM event re-dispatched for page scripts on every gesture
pub const HAND_JUMP_EVENT: &str = "handJump";

/// Loaded classifier plus a playing webcam
pub struct TeachableVision {
    model: JsValue,
    webcam: JsValue,
    webcam_canvas: HtmlCanvasElement,
    preview: CanvasRenderingContext2d,
    document: Document,
}

impl TeachableVision {
    /// Load the model, open the camera and grab the preview canvas
    pub async fn init(tuning: &VisionTuning) -> Result<Self, InitError> {
        let document = dom::document()?;

        let model = tm_load(&tuning.model_url, &tuning.metadata_url)
            .await
            .map_err(|e| InitError::Model(js_error_text(&e)))?;
        log::info!("Classifier loaded with {} classes", tm_total_classes(&model));

        let webcam = tm_webcam(WEBCAM_WIDTH, WEBCAM_HEIGHT, tuning.flip_webcam)
            .await
            .map_err(|e| InitError::Camera(js_error_text(&e)))?;
        let webcam_canvas: HtmlCanvasElement = tm_canvas(&webcam)
            .dyn_into()
            .map_err(|_| InitError::Camera("webcam has no canvas".to_string()))?;

        let preview_canvas: HtmlCanvasElement = dom::element(&document, "webcam-canvas")?;
        preview_canvas.set_width(WEBCAM_WIDTH);
        preview_canvas.set_height(WEBCAM_HEIGHT);
        let preview: CanvasRenderingContext2d = preview_canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into().ok())
            .ok_or_else(|| InitError::MissingElement("webcam-canvas 2d context".to_string()))?;

        log::info!("Webcam playing ({}x{})", WEBCAM_WIDTH, WEBCAM_HEIGHT);
        Ok(Self {
            model,
            webcam,
            webcam_canvas,
            preview,
            document,
        })
    }

    /// Start polling on animation frames. A frame that arrives while the
    /// previous prediction is still pending is skipped.
    pub fn start(self, poller: Rc<RefCell<VisionPoller>>) -> Result<FrameLoop, InitError> {
        let vision = Rc::new(self);
        let in_flight = Rc::new(Cell::new(false));

        FrameLoop::start(move |_time| {
            if in_flight.get() {
                return;
            }
            in_flight.set(true);
            vision.capture();

            let vision = vision.clone();
            let poller = poller.clone();
            let in_flight = in_flight.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match vision.predict().await {
                    Ok(predictions) => {
                        let readout = poller
                            .borrow_mut()
                            .process(&predictions, js_sys::Date::now());
                        vision.show(&readout);
                    }
                    Err(e) => log::warn!("Prediction failed: {}", e),
                }
                in_flight.set(false);
            });
        })
        .map_err(|e| InitError::Camera(js_error_text(&e)))
    }

    /// Grab the next webcam frame and mirror it onto the preview canvas
    fn capture(&self) {
        tm_update(&self.webcam);
        if let Err(e) = self
            .preview
            .draw_image_with_html_canvas_element_and_dw_and_dh(
                &self.webcam_canvas,
                0.0,
                0.0,
                WEBCAM_WIDTH as f64,
                WEBCAM_HEIGHT as f64,
            )
        {
            log::debug!("Preview draw failed: {:?}", e);
        }
    }

    async fn predict(&self) -> Result<Vec<Prediction>, String> {
        let json = tm_predict(&self.model, &self.webcam)
            .await
            .map_err(|e| js_error_text(&e))?
            .as_string()
            .ok_or_else(|| "prediction was not a string".to_string())?;
        serde_json::from_str(&json).map_err(|e| e.to_string())
    }

    fn show(&self, readout: &VisionReadout) {
        let (open, closed) = readout.formatted();
        dom::set_text(&self.document, "prob-open", &open);
        dom::set_text(&self.document, "prob-closed", &closed);

        if let Some(gesture) = readout.gesture {
            self.dispatch_hand_jump(gesture.open_probability);
        }
    }

    fn dispatch_hand_jump(&self, probability: f32) {
        let init = CustomEventInit::new();
        init.set_detail(&JsValue::from_f64(probability as f64));
        match CustomEvent::new_with_event_init_dict(HAND_JUMP_EVENT, &init) {
            Ok(event) => {
                if let Err(e) = self.document.dispatch_event(&event) {
                    log::debug!("{} dispatch failed: {:?}", HAND_JUMP_EVENT, e);
                }
            }
            Err(e) => log::debug!("{} dispatch failed: {:?}", HAND_JUMP_EVENT, e),
        }
    }
}

/// Initialise vision and start its loop. Any failure is reported once with
/// an alert and the game carries on without gestures.
pub async fn launch(tuning: VisionTuning, poller: Rc<RefCell<VisionPoller>>) -> Option<FrameLoop> {
    let started = match TeachableVision::init(&tuning).await {
        Ok(vision) => vision.start(poller),
        Err(e) => Err(e),
    };
    match started {
        Ok(frame_loop) => {
            log::info!("Vision loop running");
            Some(frame_loop)
        }
        Err(e) => {
            log::error!("Vision init failed: {}", e);
            dom::alert(&format!("Camera or model error: {}", e));
            None
        }
    }
}

fn js_error_text(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{:?}", value)
}
