pub mod api;
pub mod artifact;
pub mod cli;
pub mod config;
pub mod errors;
pub mod execution;
pub mod library;
pub mod models;
pub mod notify;
pub mod render;
pub mod session;
pub mod stream;
pub mod utils;
