//! User accounts, credentials and Admin account management.

mod model;
mod password;
mod service;

pub use model::*;
pub use password::{hash_password, validate_password, verify_password};
