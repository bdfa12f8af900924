pub mod backend;
pub mod config;
pub mod resolve;
pub mod routes;
