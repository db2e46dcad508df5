//! Free-text notes on contacts, with @mention notifications.

mod mention;
mod model;
mod service;

pub use mention::extract_mentions;
pub use model::{Note, NoteDraft};
