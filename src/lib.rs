//! # Ampswitch - home energy source controller
//!
//! Decides which supply feeds the house (grid or battery bank), whether
//! surplus should be sold back to the grid, and how the manual override
//! interacts with automatic switching. Inputs are four battery threshold
//! bits, grid/solar/wind levels, two daily peak-pricing windows and two
//! asynchronous hardware edges (grid loss and the manual switch).
//!
//! ## Architecture
//!
//! - `peak`: recurring daily peak-window evaluation
//! - `battery`: charge-band predicates from the threshold bits
//! - `export`: sell-back relay decision
//! - `controller`: the source/mode state machine as a pure transition function
//! - `dispatcher`: single-owner event loop serializing ticks and hardware events
//! - `hardware`, `clock`, `presentation`: collaborator seams and simulated adapters
//! - `config`: YAML configuration and validation
//! - `logging`: structured logging and tracing

pub mod battery;
pub mod clock;
pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod export;
pub mod hardware;
pub mod logging;
pub mod peak;
pub mod presentation;

// Re-export commonly used types
pub use config::Config;
pub use controller::{PowerMode, PowerSource, PowerSourceController};
pub use dispatcher::EventDispatcher;
pub use error::{AmpswitchError, Result};
