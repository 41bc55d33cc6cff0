//! HTTP request handlers.

pub mod auth_handler;
pub mod employee_handler;
pub mod field_handler;
pub mod web_handler;

pub use auth_handler::{account_routes, auth_routes};
pub use employee_handler::employee_routes;
pub use field_handler::field_routes;
pub use web_handler::web_routes;
