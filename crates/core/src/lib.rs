//! Core library for the CRM backend
//!
//! This crate contains the business logic, including:
//! - Document collections and persistence
//! - Ownership-based authorization
//! - Contacts, organizations, deals, activities, notes, notifications and files
//! - CSV contact import and @mention notifications

pub mod access;
pub mod activity;
pub mod contact;
mod crm;
pub mod deal;
pub mod email;
pub mod error;
pub mod file;
pub mod media;
pub mod note;
pub mod notification;
pub mod organization;
pub mod serde_util;
pub mod store;
pub mod user;

#[cfg(test)]
mod test_support;

pub use access::{Caller, Role};
pub use crm::Crm;
pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
