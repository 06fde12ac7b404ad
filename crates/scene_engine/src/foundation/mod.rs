//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - 2D math types and angle helpers
//! - Frame timing with a fixed-step accumulator
//! - Logging utilities

pub mod logging;
pub mod math;
pub mod time;
