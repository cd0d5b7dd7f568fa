//! Key-value store adapters.

mod atomic_write;
mod file;
mod memory;

pub use file::FileKeyValueStore;
pub use memory::InMemoryKeyValueStore;
