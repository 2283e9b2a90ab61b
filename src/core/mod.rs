// Public modules
pub mod error;
pub mod executor;
pub mod ledger;
pub mod local_files;
pub mod transforms;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
