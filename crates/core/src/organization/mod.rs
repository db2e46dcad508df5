//! Organizations and their media gallery.
//!
//! Organizations are shared: any authenticated user may read or change them.

mod model;
mod service;

pub use model::*;
