//! In-app notifications.

mod model;
mod service;

pub use model::Notification;
pub use service::NOTIFICATION_PAGE_SIZE;
