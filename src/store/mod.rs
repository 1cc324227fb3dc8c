//! Persistence layer: task storage behind the `TaskBackend` trait.

pub mod libsql_backend;
pub mod memory;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use memory::MemoryBackend;
pub use traits::TaskBackend;
