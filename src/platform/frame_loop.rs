//! Cancellable requestAnimationFrame loop

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Handle for a running loop; dropping it stops the loop
pub struct FrameLoop {
    cancelled: Rc<Cell<bool>>,
    pending: Rc<Cell<Option<i32>>>,
    // Keeps the re-arming closure alive for the lifetime of the handle
    _callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl FrameLoop {
    /// Call `on_frame` with the rAF timestamp every animation frame
    pub fn start(mut on_frame: impl FnMut(f64) + 'static) -> Result<Self, JsValue> {
        let cancelled = Rc::new(Cell::new(false));
        let pending = Rc::new(Cell::new(None));
        let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));

        let weak = Rc::downgrade(&callback);
        let stop = cancelled.clone();
        let next = pending.clone();
        *callback.borrow_mut() = Some(Closure::new(move |time: f64| {
            next.set(None);
            if stop.get() {
                return;
            }
            on_frame(time);
            if stop.get() {
                return;
            }
            if let Some(callback) = weak.upgrade()
                && let Some(closure) = callback.borrow().as_ref()
            {
                match request_frame(closure) {
                    Ok(handle) => next.set(Some(handle)),
                    Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
                }
            }
        }));

        let handle = {
            let borrowed = callback.borrow();
            let closure = borrowed
                .as_ref()
                .ok_or_else(|| JsValue::from_str("frame callback missing"))?;
            request_frame(closure)?
        };
        pending.set(Some(handle));

        Ok(Self {
            cancelled,
            pending,
            _callback: callback,
        })
    }

    pub fn stop(&self) {
        self.cancelled.set(true);
        if let Some(handle) = self.pending.take()
            && let Some(window) = web_sys::window()
        {
            let _ = window.cancel_animation_frame(handle);
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn request_frame(closure: &FrameCallback) -> Result<i32, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    window.request_animation_frame(closure.as_ref().unchecked_ref())
}
