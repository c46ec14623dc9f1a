//! Platform bindings
//!
//! Browser-only glue lives in `web`:
//! - sessionStorage-backed profile and progress
//! - HTTP high score submission
//! - Wall-clock driver for the virtual scheduler

#[cfg(target_arch = "wasm32")]
pub mod web;
