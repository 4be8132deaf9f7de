//! Public API for the mapping store
//!
//! External modules should import from here rather than directly from
//! internal modules. The store is constructed by the application with a
//! configured path; mutation serialization is the caller's responsibility
//! (keep one instance behind a `tokio::sync::Mutex`).

pub use crate::mappings::error::{MappingError, MappingResult};
pub use crate::mappings::store::MappingStore;
