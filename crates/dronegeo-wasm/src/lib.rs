//! dronegeo WASM - WebAssembly bindings for dronegeo
//!
//! This crate exposes geotag reading, angle conversion and target marking to
//! a browser front end, where a canvas replaces the desktop click handler.
//!
//! # Module Structure
//!
//! - `geotag` - GPS fix and capture time from photo bytes
//! - `angle` - Decimal degree / DMS conversion
//! - `projection` - One-shot pixel-to-ground projection
//! - `session` - Click collection and target accumulation across photos
//!
//! # Usage
//!
//! ```typescript
//! import init, { read_gps_fix, JsTargetSession } from '@dronegeo/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const fix = read_gps_fix(bytes);
//!
//! const session = new JsTargetSession(100, 25, 17.3, 13);
//! session.on_click(1204, 877);
//! session.commit_photo(file.name, bytes);
//! download(session.to_csv());
//! ```

use wasm_bindgen::prelude::*;

mod angle;
mod geotag;
mod projection;
mod session;

pub use angle::{deg_to_dms, dms_to_deg, JsDmsAngle};
pub use geotag::{read_capture_time, read_gps_fix, JsGpsFix};
pub use projection::{project_pixel, JsProjection};
pub use session::JsTargetSession;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
