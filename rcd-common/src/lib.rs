//! # RCD Common Library
//!
//! Shared code for the recording pipeline services including:
//! - Signal table model and its JSON representation
//! - IMU sample model
//! - Configuration loading and logging setup
//! - Time and numeric utilities
//! - Artifact store abstraction

pub mod config;
pub mod error;
pub mod imu;
pub mod logging;
pub mod signals;
pub mod stats;
pub mod store;
pub mod time;

pub use error::{Error, Result};
pub use signals::{SignalFrame, SignalTable, SignalValue};
