//! Initialization errors
//!
//! The only failure class the game recognises. Everything that can go wrong
//! after startup is guarded and ignored.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    /// No browser window/document available
    NoWindow,
    /// A required page element is missing or has the wrong type
    MissingElement(String),
    /// Webcam setup failed (usually permission denied)
    Camera(String),
    /// Classifier model could not be loaded
    Model(String),
    /// WebGPU/WebGL surface, adapter or device could not be created
    Graphics(String),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::NoWindow => write!(f, "no browser window"),
            InitError::MissingElement(id) => write!(f, "missing page element #{}", id),
            InitError::Camera(msg) => write!(f, "camera error: {}", msg),
            InitError::Model(msg) => write!(f, "model error: {}", msg),
            InitError::Graphics(msg) => write!(f, "graphics error: {}", msg),
        }
    }
}

impl std::error::Error for InitError {}

#[cfg(target_arch = "wasm32")]
impl From<InitError> for wasm_bindgen::JsValue {
    fn from(err: InitError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
