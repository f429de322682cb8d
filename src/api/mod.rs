pub mod backend;
pub mod client;
pub mod models;
#[cfg(test)]
pub mod testing;

pub use backend::{ByteStream, PocBackend};
pub use client::HttpBackend;
pub use models::{SearchQuery, ServerStatistics, VulnTypeCount};
