pub mod generation;
pub mod guide;
pub mod poc;
pub mod timestamp;
pub mod verdict;

pub use generation::*;
pub use guide::*;
pub use poc::*;
pub use verdict::*;
