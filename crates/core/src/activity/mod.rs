//! Logged interactions (calls, meetings, emails) and to-do tasks.

mod model;
mod service;

pub use model::*;
