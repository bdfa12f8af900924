// handlers/mod.rs - View and service handlers
//
// Views are mounted only after the navigation guard has run
// (see middleware::guard). Service endpoints sit outside the route table.

pub mod health;
pub mod not_found;
pub mod views;

pub use health::health;
pub use not_found::not_found;
pub use views::{admin, catalog};
