//! History store implementations for Minion.

pub mod noop;
pub mod in_memory;
pub mod file_backend;

pub use noop::NoopHistory;
pub use in_memory::InMemoryHistory;
pub use file_backend::FileHistory;
