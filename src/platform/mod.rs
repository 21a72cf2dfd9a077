//! Platform layer
//!
//! Browser presentation lives in `web` (wasm32 only): canvas blitting with
//! image smoothing off, DOM event wiring, `requestAnimationFrame` frame
//! hosting and the wasm-bindgen exports. Native builds use the core crate
//! directly.

#[cfg(target_arch = "wasm32")]
pub mod web;
