pub mod api;
pub mod auth;
pub mod blood;
pub mod pagination;

pub use api::*;
pub use auth::*;
pub use blood::*;
pub use pagination::*;
