//! File storage layer for metabackup.
//!
//! The copier only needs two operations from the filesystem: copy a file and
//! check whether one exists. `FileStorage` abstracts them so the batch engine
//! can run against the local disk or an in-memory store.

mod local;
mod memory;
mod traits;

pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use traits::FileStorage;
