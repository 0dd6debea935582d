pub mod admin;
pub mod dashboard;
pub mod donors;
pub mod health;
pub mod notifications;
pub mod profile;
pub mod requests;
