//! Store backends that are not tied to one record type.

pub mod memory;

pub use memory::{MemoryPlaceRepository, MemoryUserRepository};
