//! Job lifecycle notifications for the meshgen backend.

pub mod notifier;

pub use notifier::{JobNotification, Notifier, NotificationStatus};
