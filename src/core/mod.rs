//! Core library modules for campus-route
//!
//! One module per component. Leaf modules (`map`, `locale`, `store`) know
//! nothing about routing; `session` ties everything together.

pub mod config;
pub mod error;
pub mod headless;
pub mod http;
pub mod landmark;
pub mod layers;
pub mod locale;
pub mod map;
pub mod pipeline;
pub mod resolver;
pub mod selection;
pub mod session;
pub mod store;
pub mod style;
