//! File attachments on contacts and organizations.

mod model;
mod service;

pub use model::{FileParent, FileRecord};
