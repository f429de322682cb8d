pub mod commands;
pub mod context;
pub mod execute;
pub mod generate;
pub mod health;
pub mod library;

pub use commands::{Cli, Commands};
pub use context::AppContext;
