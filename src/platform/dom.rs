//! DOM helpers: HUD overlay, text updates, alerts

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::director::HudView;
use crate::error::InitError;

pub fn document() -> Result<Document, InitError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or(InitError::NoWindow)
}

/// Look up an element by id and cast it
pub fn element<T: JsCast>(document: &Document, id: &str) -> Result<T, InitError> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<T>().ok())
        .ok_or_else(|| InitError::MissingElement(id.to_string()))
}

/// Set an element's text if it exists
pub fn set_text(document: &Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

pub fn alert(message: &str) {
    if let Some(window) = web_sys::window()
        && let Err(e) = window.alert_with_message(message)
    {
        log::warn!("alert failed: {:?}", e);
    }
}

/// Text overlay drawn over the game canvas
pub struct Hud {
    score: HtmlElement,
    message: HtmlElement,
    banner: HtmlElement,
    last: HudView,
}

impl Hud {
    /// Create the HUD elements inside `container`
    pub fn new(document: &Document, container: &HtmlElement) -> Result<Self, InitError> {
        let make = |id: &str, css: &str| -> Result<HtmlElement, InitError> {
            let el: HtmlElement = document
                .create_element("div")
                .map_err(|e| InitError::MissingElement(format!("{}: {:?}", id, e)))?
                .dyn_into()
                .map_err(|_| InitError::MissingElement(id.to_string()))?;
            el.set_id(id);
            let _ = el.set_attribute("style", css);
            container
                .append_child(&el)
                .map_err(|e| InitError::MissingElement(format!("{}: {:?}", id, e)))?;
            Ok(el)
        };

        let score = make(
            "hud-score",
            "position:absolute;top:16px;left:16px;font:bold 28px sans-serif;color:#000;",
        )?;
        let message = make(
            "hud-message",
            "position:absolute;top:50%;left:50%;transform:translate(-50%,-50%);\
             font:bold 36px sans-serif;color:#000;text-align:center;white-space:pre-line;",
        )?;
        let banner = make(
            "hud-banner",
            "position:absolute;top:33%;left:50%;transform:translate(-50%,-50%);\
             font:bold 40px sans-serif;color:#ff4d4d;",
        )?;

        let hud = Self {
            score,
            message,
            banner,
            last: HudView::default(),
        };
        hud.apply(&HudView::default());
        Ok(hud)
    }

    /// Update the overlay, touching the DOM only when text changed
    pub fn show(&mut self, view: HudView) {
        if view != self.last {
            self.apply(&view);
            self.last = view;
        }
    }

    fn apply(&self, view: &HudView) {
        for (el, text) in [
            (&self.score, &view.score),
            (&self.message, &view.message),
            (&self.banner, &view.banner),
        ] {
            el.set_text_content(text.as_deref());
            let display = if text.is_some() { "block" } else { "none" };
            let _ = el.style().set_property("display", display);
        }
    }
}
