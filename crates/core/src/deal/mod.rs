//! Sales deals and the stage pipeline.

mod model;
mod service;

pub use model::*;
