//! CLI-specific utilities for campus-route
//!
//! Terminal feedback only; nothing here is part of the library.

pub mod progress;

pub use progress::Spinner;
