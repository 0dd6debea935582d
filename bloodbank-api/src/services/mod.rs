pub mod lifecycle;
pub mod notification_service;
pub mod profile_service;
