pub mod cache;
pub mod query;

pub use cache::{LibraryState, PocLibrary, DEFAULT_PAGE_SIZE};
pub use query::{Category, LibraryFilter, LibraryStatistics, SortKey};
