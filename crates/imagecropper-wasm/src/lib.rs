//! Image Cropper WASM - WebAssembly bindings for the crop client
//!
//! This crate exposes the imagecropper-core functionality to the browser
//! front-end. Network calls stay in JavaScript: the bindings hand out
//! prepared requests and interpret the responses.
//!
//! # Module Structure
//!
//! - `mapping` - Display-to-natural crop mapping and widget conversion
//! - `types` - WASM-compatible wrappers for the source image and requests
//! - `session` - Authentication session backed by local storage
//! - `api` - Backend request builders and response handling
//! - `workspace` - Crop page state (upload, select, preview, generate)
//! - `logging` - `log` backend writing to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsApiClient, JsSession, JsCropWorkspace, JsSourceImage } from '@imagecropper/wasm';
//!
//! await init();
//!
//! const client = new JsApiClient({ api_base_url: import.meta.env.VITE_API_BASE_URL });
//! const session = new JsSession();
//! const workspace = new JsCropWorkspace(session);
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! workspace.pick(new JsSourceImage(bytes, file.type, file.name, client.max_upload_bytes));
//! ```

use wasm_bindgen::prelude::*;

mod api;
mod logging;
mod mapping;
mod session;
mod types;
mod workspace;

// Re-export public types
pub use api::JsApiClient;
pub use logging::set_log_level;
pub use mapping::{
    crop_fractions, default_widget_crop, is_selection, to_natural_crop, widget_crop_to_display,
};
pub use session::{is_token_expired, now_ms, BrowserStore, JsSession};
pub use types::{JsApiRequest, JsSourceImage};
pub use workspace::JsCropWorkspace;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logging::install(log::LevelFilter::Info);
    log::debug!("imagecropper wasm {} ready", version());
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
