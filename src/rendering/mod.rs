//! # Rendering Module
//!
//! The macroquad shell around the engine core. The core never calls into
//! this module; the shell reads the scene and draws it, and translates
//! window key codes into the engine's device-independent input events.

pub mod display;

pub use display::Display;
