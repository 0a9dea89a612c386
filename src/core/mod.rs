pub mod error;
pub mod matcher;
pub mod types;

pub use error::{CleanerError, Result};
pub use matcher::PrefixMatcher;
pub use types::{Machine, RemoteInstance};
