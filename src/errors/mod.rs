pub mod types;
pub mod classification;

pub use types::PocForgeError;
pub use classification::{ErrorClassification, Surface};
