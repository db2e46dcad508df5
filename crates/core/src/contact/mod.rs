//! Contacts, the people the CRM is built around.

mod import;
mod model;
mod service;

pub use import::ImportSummary;
pub use model::*;
